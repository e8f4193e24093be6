//! Liquid behaviours and the context they run in.

use rustc_hash::FxHashMap;

use brook_utils::random::Random;
use brook_utils::{BlockPos, BlockStateId};

use crate::block::Block;
use crate::events::LiquidEvents;
use crate::grid::{BlockLayer, BulkBlockAccessor, GridAccess};
use crate::ticks::LevelTicks;

/// Index of a behaviour in a [`Behaviours`] table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BehaviourId(pub u16);

/// Strategy object attached to every block of one liquid.
///
/// Triggers never run an update inline; they schedule one through the
/// context and the driver runs it once it is due.
pub trait BlockBehaviour {
    /// The liquid this behaviour drives.
    fn liquid_code(&self) -> &str;

    /// Delay in ticks between a trigger and the update it schedules.
    fn tick_delay(&self) -> u32;

    /// Called after a cell of this liquid was placed by the host.
    fn on_placed(&self, ctx: &mut LiquidContext<'_>, pos: BlockPos) {
        ctx.schedule(pos, ctx.behaviour);
    }

    /// Called when a face neighbour of a cell of this liquid changed.
    fn handle_neighbor_changed(
        &self,
        ctx: &mut LiquidContext<'_>,
        pos: BlockPos,
        _neighbor: BlockPos,
    ) {
        ctx.schedule(pos, ctx.behaviour);
    }

    /// Runs a due update for the cell at `pos`.
    fn on_scheduled_tick(&self, ctx: &mut LiquidContext<'_>, pos: BlockPos);

    /// Whether `block`, a cell of this liquid, may be replaced by `by_block`.
    fn is_replaceable_by(&self, block: &Block, by_block: &Block) -> bool;
}

/// Behaviours keyed by liquid code.
#[derive(Default)]
pub struct Behaviours {
    entries: Vec<Box<dyn BlockBehaviour>>,
    by_liquid: FxHashMap<String, BehaviourId>,
}

impl Behaviours {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a behaviour. A behaviour for an already covered liquid replaces
    /// the previous one under the same id.
    pub fn insert(&mut self, behaviour: Box<dyn BlockBehaviour>) -> BehaviourId {
        if let Some(&id) = self.by_liquid.get(behaviour.liquid_code()) {
            log::warn!(
                "Replacing the behaviour of liquid {}",
                behaviour.liquid_code()
            );
            self.entries[usize::from(id.0)] = behaviour;
            return id;
        }
        let id = BehaviourId(self.entries.len() as u16);
        self.by_liquid
            .insert(behaviour.liquid_code().to_owned(), id);
        self.entries.push(behaviour);
        id
    }

    /// The behaviour with the given id.
    #[must_use]
    pub fn get(&self, id: BehaviourId) -> Option<&dyn BlockBehaviour> {
        self.entries.get(usize::from(id.0)).map(|entry| &**entry)
    }

    /// The behaviour driving a liquid.
    #[must_use]
    pub fn for_liquid(&self, liquid: &str) -> Option<BehaviourId> {
        self.by_liquid.get(liquid).copied()
    }

    /// The behaviour driving a block, if it is a liquid with one.
    #[must_use]
    pub fn for_block(&self, block: &Block) -> Option<BehaviourId> {
        block.liquid_code().and_then(|liquid| self.for_liquid(liquid))
    }

    /// Number of behaviours.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no behaviour was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything an update may touch.
///
/// Reads go to `grid`, which only shows committed state. Writes are staged
/// in `bulk` until [`LiquidContext::commit`]. Every position whose stored
/// identity changes is recorded in `changed` so the driver can notify its
/// neighbours afterwards.
pub struct LiquidContext<'a> {
    /// The grid.
    pub grid: &'a mut dyn GridAccess,
    /// Staged writes of the running update.
    pub bulk: &'a mut BulkBlockAccessor,
    /// The scheduled-update queue.
    pub ticks: &'a mut LevelTicks<BehaviourId>,
    /// All registered behaviours.
    pub behaviours: &'a Behaviours,
    /// Random source for the remainder shuffle.
    pub random: &'a mut dyn Random,
    /// Event sink.
    pub events: &'a mut dyn LiquidEvents,
    /// Positions changed so far.
    pub changed: &'a mut Vec<BlockPos>,
    /// The behaviour being run.
    pub behaviour: BehaviourId,
    /// Current game tick.
    pub game_time: u64,
}

impl LiquidContext<'_> {
    /// The record stored in one layer of a cell.
    #[must_use]
    pub fn block(&self, pos: &BlockPos, layer: BlockLayer) -> &Block {
        self.grid.get_block(pos, layer)
    }

    /// The behaviour driving the liquid at `pos`, if any.
    #[must_use]
    pub fn behaviour_at(&self, pos: &BlockPos) -> Option<BehaviourId> {
        self.behaviours
            .for_block(self.grid.get_block(pos, BlockLayer::Fluid))
    }

    /// Schedules an update of `pos` run by `behaviour`, after that
    /// behaviour's delay.
    pub fn schedule(&mut self, pos: BlockPos, behaviour: BehaviourId) {
        let Some(delay) = self.behaviours.get(behaviour).map(|entry| entry.tick_delay()) else {
            log::warn!("Attempted to schedule {pos} with unknown behaviour {behaviour:?}");
            return;
        };
        self.ticks
            .schedule_tick(pos, behaviour, self.game_time, delay);
    }

    /// Schedules an update of the liquid at `pos`. Returns false if the cell
    /// holds no liquid with a behaviour.
    pub fn schedule_liquid(&mut self, pos: BlockPos) -> bool {
        match self.behaviour_at(&pos) {
            Some(behaviour) => {
                self.schedule(pos, behaviour);
                true
            }
            None => false,
        }
    }

    /// Applies the staged writes.
    pub fn commit(&mut self) {
        let changed = self.bulk.commit(&mut *self.grid);
        self.changed.extend(changed);
    }

    /// Writes one layer of a cell immediately, bypassing the bulk buffer.
    pub fn set_block_now(&mut self, pos: BlockPos, layer: BlockLayer, id: BlockStateId) -> bool {
        let changed = self.grid.set_block_id(&pos, layer, id);
        if changed {
            self.changed.push(pos);
        }
        changed
    }
}
