//! Scheduled tick types.

use std::cmp::Ordering;

use brook_utils::BlockPos;

/// A scheduled update for a cell.
#[derive(Debug, Clone)]
pub struct ScheduledTick<T> {
    /// The behaviour that runs the update.
    pub tick_type: T,
    /// The position of the cell.
    pub pos: BlockPos,
    /// The absolute game tick when this should fire.
    pub trigger_tick: u64,
    /// Registration order, used for ticks with the same `trigger_tick`.
    /// Lower values run first.
    pub sub_tick_order: u64,
}

impl<T> ScheduledTick<T> {
    /// Creates a new scheduled tick.
    pub fn new(tick_type: T, pos: BlockPos, trigger_tick: u64, sub_tick_order: u64) -> Self {
        Self {
            tick_type,
            pos,
            trigger_tick,
            sub_tick_order,
        }
    }
}

impl<T: PartialEq> PartialEq for ScheduledTick<T> {
    fn eq(&self, other: &Self) -> bool {
        self.trigger_tick == other.trigger_tick && self.sub_tick_order == other.sub_tick_order
    }
}

impl<T: Eq> Eq for ScheduledTick<T> {}

impl<T: Eq> PartialOrd for ScheduledTick<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Eq> Ord for ScheduledTick<T> {
    /// Reversed so the max-heap pops the earliest trigger, then the earliest
    /// registration.
    fn cmp(&self, other: &Self) -> Ordering {
        match other.trigger_tick.cmp(&self.trigger_tick) {
            Ordering::Equal => other.sub_tick_order.cmp(&self.sub_tick_order),
            ord => ord,
        }
    }
}

/// Identity of a pending update in the queue: one per cell and behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickKey<T> {
    /// The position of the cell.
    pub pos: BlockPos,
    /// The behaviour that runs the update.
    pub tick_type: T,
}

impl<T: Copy> From<&ScheduledTick<T>> for TickKey<T> {
    fn from(tick: &ScheduledTick<T>) -> Self {
        Self {
            pos: tick.pos,
            tick_type: tick.tick_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_ordering() {
        let pos = BlockPos::new(0, 0, 0);

        let tick1 = ScheduledTick::new(1u32, pos, 100, 0);
        let tick2 = ScheduledTick::new(1u32, pos, 200, 0);
        assert!(tick1 > tick2);

        // Same trigger tick: first registered pops first.
        let tick3 = ScheduledTick::new(1u32, pos, 100, 5);
        let tick4 = ScheduledTick::new(1u32, pos, 100, 10);
        assert!(tick3 > tick4);
    }
}
