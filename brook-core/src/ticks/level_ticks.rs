//! The scheduled-update queue.

use std::collections::BinaryHeap;
use std::hash::Hash;

use rustc_hash::FxHashMap;
use brook_utils::BlockPos;

use super::{ScheduledTick, TickKey};

/// Queue of scheduled updates, unique per `(pos, type)`.
///
/// Scheduling a key that is already pending replaces the pending entry, so a
/// burst of triggers collapses into one update that fires after the delay of
/// the last trigger.
///
/// # Architecture
///
/// - `tick_queue` holds every entry ever pushed, ordered by trigger time
/// - `pending` maps each live key to the `sub_tick_order` of its current entry
/// - Heap entries whose order no longer matches `pending` were superseded and
///   are discarded when they reach the top
pub struct LevelTicks<T: Copy + Eq + Hash> {
    tick_queue: BinaryHeap<ScheduledTick<T>>,
    pending: FxHashMap<TickKey<T>, u64>,
    /// Counter for generating unique sub-tick order values.
    sub_tick_counter: u64,
}

impl<T: Copy + Eq + Hash> LevelTicks<T> {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tick_queue: BinaryHeap::new(),
            pending: FxHashMap::default(),
            sub_tick_counter: 0,
        }
    }

    /// Schedules an update at `current_tick + delay`.
    ///
    /// Returns `true` if the key had nothing pending, `false` if a pending
    /// update was replaced.
    pub fn schedule_tick(
        &mut self,
        pos: BlockPos,
        tick_type: T,
        current_tick: u64,
        delay: u32,
    ) -> bool {
        let trigger_tick = current_tick + u64::from(delay);
        let sub_tick_order = self.sub_tick_counter;
        self.sub_tick_counter += 1;

        let tick = ScheduledTick::new(tick_type, pos, trigger_tick, sub_tick_order);
        let replaced = self
            .pending
            .insert(TickKey::from(&tick), sub_tick_order)
            .is_some();
        self.tick_queue.push(tick);

        if self.tick_queue.len() > 2 * self.pending.len() + 64 {
            self.compact();
        }
        !replaced
    }

    /// Checks if an update is pending for the given position and type.
    #[must_use]
    pub fn has_scheduled_tick(&self, pos: BlockPos, tick_type: T) -> bool {
        self.pending.contains_key(&TickKey { pos, tick_type })
    }

    /// The trigger tick of the pending update for a key.
    #[must_use]
    pub fn scheduled_trigger(&self, pos: BlockPos, tick_type: T) -> Option<u64> {
        let order = *self.pending.get(&TickKey { pos, tick_type })?;
        self.tick_queue
            .iter()
            .find(|tick| tick.sub_tick_order == order)
            .map(|tick| tick.trigger_tick)
    }

    /// Removes and returns up to `max_ticks` updates due at or before
    /// `current_tick`, earliest first.
    #[must_use]
    pub fn tick(&mut self, current_tick: u64, max_ticks: usize) -> Vec<(BlockPos, T)> {
        let mut result = Vec::new();
        while result.len() < max_ticks {
            let Some(top) = self.tick_queue.peek() else {
                break;
            };
            if top.trigger_tick > current_tick {
                break;
            }
            let Some(tick) = self.tick_queue.pop() else {
                break;
            };
            let key = TickKey::from(&tick);
            if self.pending.get(&key) == Some(&tick.sub_tick_order) {
                self.pending.remove(&key);
                result.push((tick.pos, tick.tick_type));
            }
        }
        result
    }

    /// Returns the number of pending updates.
    #[must_use]
    pub fn count(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drops superseded heap entries.
    fn compact(&mut self) {
        let pending = &self.pending;
        self.tick_queue
            .retain(|tick| pending.get(&TickKey::from(tick)) == Some(&tick.sub_tick_order));
    }
}

impl<T: Copy + Eq + Hash> Default for LevelTicks<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_and_tick() {
        let mut level_ticks: LevelTicks<u32> = LevelTicks::new();

        let pos1 = BlockPos::new(5, 64, 5);
        let pos2 = BlockPos::new(10, 64, 10);

        level_ticks.schedule_tick(pos1, 1, 100, 10); // fires at tick 110
        level_ticks.schedule_tick(pos2, 2, 100, 5); // fires at tick 105

        assert_eq!(level_ticks.count(), 2);

        // Tick at 104 - nothing should fire
        let fired = level_ticks.tick(104, 100);
        assert!(fired.is_empty());

        // Tick at 105 - pos2 should fire
        let fired = level_ticks.tick(105, 100);
        assert_eq!(fired, vec![(pos2, 2)]);

        // Tick at 110 - pos1 should fire
        let fired = level_ticks.tick(110, 100);
        assert_eq!(fired, vec![(pos1, 1)]);

        assert!(level_ticks.is_empty());
    }

    #[test]
    fn test_last_registration_wins() {
        let mut level_ticks: LevelTicks<u32> = LevelTicks::new();
        let pos = BlockPos::new(5, 64, 5);

        assert!(level_ticks.schedule_tick(pos, 1, 100, 10));
        assert!(!level_ticks.schedule_tick(pos, 1, 100, 20));
        assert_eq!(level_ticks.count(), 1);
        assert_eq!(level_ticks.scheduled_trigger(pos, 1), Some(120));

        // The superseded entry at 110 must not fire
        assert!(level_ticks.tick(110, 100).is_empty());
        assert!(level_ticks.has_scheduled_tick(pos, 1));

        assert_eq!(level_ticks.tick(120, 100), vec![(pos, 1)]);
        assert!(level_ticks.tick(200, 100).is_empty());
    }

    #[test]
    fn test_shorter_delay_replaces_longer() {
        let mut level_ticks: LevelTicks<u32> = LevelTicks::new();
        let pos = BlockPos::new(0, 0, 0);

        level_ticks.schedule_tick(pos, 1, 0, 50);
        level_ticks.schedule_tick(pos, 1, 0, 5);

        assert_eq!(level_ticks.tick(5, 100), vec![(pos, 1)]);
        assert!(level_ticks.tick(50, 100).is_empty());
    }

    #[test]
    fn test_types_are_separate_keys() {
        let mut level_ticks: LevelTicks<u32> = LevelTicks::new();
        let pos = BlockPos::new(0, 0, 0);

        assert!(level_ticks.schedule_tick(pos, 1, 0, 5));
        assert!(level_ticks.schedule_tick(pos, 2, 0, 5));
        assert_eq!(level_ticks.count(), 2);
        assert_eq!(level_ticks.tick(5, 100), vec![(pos, 1), (pos, 2)]);
    }

    #[test]
    fn test_budget_limits_drain() {
        let mut level_ticks: LevelTicks<u32> = LevelTicks::new();
        for x in 0..5 {
            level_ticks.schedule_tick(BlockPos::new(x, 0, 0), 1, 0, 1);
        }

        let fired = level_ticks.tick(1, 3);
        assert_eq!(fired.len(), 3);
        assert_eq!(fired[0].0, BlockPos::new(0, 0, 0));
        assert_eq!(level_ticks.count(), 2);

        assert_eq!(level_ticks.tick(1, 3).len(), 2);
    }

    #[test]
    fn test_compaction_keeps_live_entries() {
        let mut level_ticks: LevelTicks<u32> = LevelTicks::new();
        let pos = BlockPos::new(3, 3, 3);
        for delay in 0..500 {
            level_ticks.schedule_tick(pos, 1, 0, delay);
        }
        assert_eq!(level_ticks.count(), 1);
        assert!(level_ticks.tick_queue.len() < 100);
        assert_eq!(level_ticks.scheduled_trigger(pos, 1), Some(499));
        assert_eq!(level_ticks.tick(499, 10), vec![(pos, 1)]);
    }
}
