//! The tick driver.
//!
//! [`LiquidSimulation`] owns a grid, the scheduled-update queue and the liquid
//! behaviours. Hosts edit the grid through it so every change notifies the
//! liquids around it, then advance it one game tick at a time.

use std::mem;

use brook_utils::random::Xoroshiro;
use brook_utils::{BlockPos, BlockStateId, Direction};

use crate::behaviour::{BehaviourId, Behaviours, BlockBehaviour, LiquidContext};
use crate::block::{FlowDirection, MAX_LEVEL, REPLACEABLE_THRESHOLD};
use crate::config::{BrookConfig, LiquidConfig, SimulationConfig};
use crate::error::ConfigError;
use crate::events::{LiquidEvents, NoopEvents};
use crate::fluid::FiniteSpreadingLiquid;
use crate::grid::{BlockLayer, BulkBlockAccessor, GridAccess};
use crate::ticks::LevelTicks;

/// A liquid simulation over one grid.
///
/// Every trigger (placement, a changed neighbour, a committed spread) only
/// schedules an update. Updates run when [`LiquidSimulation::tick`] reaches
/// their trigger tick, at most `max_ticks_per_tick` of them per tick. The
/// behaviour that runs is looked up from the cell's liquid when the update
/// fires, so a cell that changed liquid in the meantime runs its new one.
pub struct LiquidSimulation<G: GridAccess, E: LiquidEvents = NoopEvents> {
    grid: G,
    ticks: LevelTicks<BehaviourId>,
    bulk: BulkBlockAccessor,
    behaviours: Behaviours,
    random: Xoroshiro,
    events: E,
    /// Positions changed since the last notification pass.
    changed: Vec<BlockPos>,
    game_time: u64,
    max_ticks_per_tick: usize,
}

impl<G: GridAccess> LiquidSimulation<G> {
    /// A simulation without behaviours that drops every event.
    #[must_use]
    pub fn new(grid: G) -> Self {
        Self::with_events(grid, NoopEvents)
    }
}

impl<G: GridAccess, E: LiquidEvents> LiquidSimulation<G, E> {
    /// A simulation without behaviours reporting to `events`, seeded from entropy.
    #[must_use]
    pub fn with_events(grid: G, events: E) -> Self {
        Self {
            grid,
            ticks: LevelTicks::new(),
            bulk: BulkBlockAccessor::new(),
            behaviours: Behaviours::new(),
            random: Xoroshiro::from_entropy(),
            events,
            changed: Vec::new(),
            game_time: 0,
            max_ticks_per_tick: SimulationConfig::default().max_ticks_per_tick,
        }
    }

    /// A simulation with one behaviour per configured liquid.
    ///
    /// # Errors
    /// Returns an error if the config is invalid or names blocks the grid's
    /// registry does not know.
    pub fn from_config(grid: G, events: E, config: &BrookConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut simulation = Self::with_events(grid, events);
        simulation.max_ticks_per_tick = config.simulation.max_ticks_per_tick;
        if let Some(seed) = config.simulation.seed {
            simulation.set_seed(seed);
        }
        for liquid in &config.liquids {
            simulation.add_liquid(liquid.clone())?;
        }
        log::debug!(
            "Simulation ready with {} liquid behaviours",
            simulation.behaviours.len()
        );
        Ok(simulation)
    }

    /// Reseeds the random source.
    pub fn set_seed(&mut self, seed: u64) {
        self.random = Xoroshiro::from_seed(seed);
    }

    /// Limits the number of updates run per game tick.
    pub fn set_max_ticks_per_tick(&mut self, max_ticks_per_tick: usize) {
        self.max_ticks_per_tick = max_ticks_per_tick.max(1);
    }

    /// Adds a behaviour, replacing any earlier one for the same liquid.
    pub fn add_behaviour(&mut self, behaviour: Box<dyn BlockBehaviour>) -> BehaviourId {
        self.behaviours.insert(behaviour)
    }

    /// Builds and adds a finite spreading liquid.
    ///
    /// # Errors
    /// Returns an error if the liquid or its replacement blocks are not registered.
    pub fn add_liquid(&mut self, config: LiquidConfig) -> Result<BehaviourId, ConfigError> {
        let liquid = FiniteSpreadingLiquid::new(config, self.grid.registry())?;
        Ok(self.add_behaviour(Box::new(liquid)))
    }

    /// The behaviour driving a liquid.
    #[must_use]
    pub fn behaviour_id(&self, liquid: &str) -> Option<BehaviourId> {
        self.behaviours.for_liquid(liquid)
    }

    /// Places a still cell of `liquid` at `level` (clamped to 7) and lets its
    /// behaviour schedule the first update.
    ///
    /// Returns false if the liquid has no variants, the level is below 1 or
    /// the cell already held exactly that block.
    pub fn place_liquid(&mut self, pos: BlockPos, liquid: &str, level: i32) -> bool {
        if level < 1 {
            return false;
        }
        let variant = self.grid.registry().resolve_variant(
            liquid,
            level.min(MAX_LEVEL),
            FlowDirection::Still,
        );
        let Some(id) = variant else {
            log::warn!("Cannot place unknown liquid {liquid} at {pos}");
            return false;
        };
        if !self.grid.set_block_id(&pos, BlockLayer::Fluid, id) {
            return false;
        }
        self.changed.push(pos);

        if let Some(behaviour) = self.behaviours.for_liquid(liquid) {
            self.run_behaviour(behaviour, |entry, ctx| entry.on_placed(ctx, pos));
        }
        self.notify_changes();
        true
    }

    /// Writes one layer of a cell as a host edit and notifies the liquids
    /// around it. Returns true if the cell changed.
    pub fn set_block(&mut self, pos: BlockPos, layer: BlockLayer, id: BlockStateId) -> bool {
        if !self.grid.set_block_id(&pos, layer, id) {
            return false;
        }
        self.changed.push(pos);
        self.notify_changes();
        true
    }

    /// Places a block where the cell allows it.
    ///
    /// Liquids go into the fluid layer. Anything else needs an open solid
    /// layer and, over a liquid, must be allowed to replace it; the liquid is
    /// then removed. Returns true if the block was placed.
    pub fn try_place_block(&mut self, pos: BlockPos, id: BlockStateId) -> bool {
        let by_block = self.grid.registry().get(id);
        let fluid = self.grid.get_block(&pos, BlockLayer::Fluid);
        let solid = self.grid.get_block(&pos, BlockLayer::Solid);

        let liquid_allows = match self.behaviours.for_block(fluid) {
            Some(behaviour) => self
                .behaviours
                .get(behaviour)
                .is_some_and(|entry| entry.is_replaceable_by(fluid, by_block)),
            None => !fluid.is_liquid() || by_block.replaceable <= fluid.replaceable,
        };
        if !liquid_allows {
            return false;
        }

        if by_block.is_liquid() {
            return self.set_block(pos, BlockLayer::Fluid, id);
        }
        if solid.replaceable < REPLACEABLE_THRESHOLD {
            return false;
        }
        let replaces_liquid = fluid.is_liquid();
        let placed = self.grid.set_block_id(&pos, BlockLayer::Solid, id);
        let drained = replaces_liquid
            && self
                .grid
                .set_block_id(&pos, BlockLayer::Fluid, BlockStateId::AIR);
        if placed || drained {
            self.changed.push(pos);
            self.notify_changes();
        }
        placed || drained
    }

    /// Advances one game tick and runs every due update within the budget.
    ///
    /// Returns the number of updates taken from the queue.
    pub fn tick(&mut self) -> usize {
        self.game_time += 1;
        let due = self.ticks.tick(self.game_time, self.max_ticks_per_tick);
        for &(pos, scheduled) in &due {
            let current = self
                .behaviours
                .for_block(self.grid.get_block(&pos, BlockLayer::Fluid));
            let Some(behaviour) = current else {
                log::trace!("Skipped update at {pos}: the cell holds no liquid anymore");
                continue;
            };
            if behaviour != scheduled {
                log::trace!("Cell at {pos} changed liquid since it was scheduled");
            }
            self.run_behaviour(behaviour, |entry, ctx| entry.on_scheduled_tick(ctx, pos));
            self.notify_changes();
        }
        due.len()
    }

    /// Runs `ticks` game ticks. Returns the total number of updates run.
    pub fn run_for(&mut self, ticks: u64) -> usize {
        (0..ticks).map(|_| self.tick()).sum()
    }

    /// Runs the update of the cell at `pos` right away, outside the queue.
    ///
    /// Returns false if the cell holds no liquid with a behaviour.
    pub fn run_update(&mut self, pos: BlockPos) -> bool {
        let Some(behaviour) = self
            .behaviours
            .for_block(self.grid.get_block(&pos, BlockLayer::Fluid))
        else {
            return false;
        };
        self.run_behaviour(behaviour, |entry, ctx| entry.on_scheduled_tick(ctx, pos));
        self.notify_changes();
        true
    }

    /// The grid.
    #[must_use]
    pub const fn grid(&self) -> &G {
        &self.grid
    }

    /// The grid, for edits that should not notify any liquid.
    pub const fn grid_mut(&mut self) -> &mut G {
        &mut self.grid
    }

    /// The event sink.
    #[must_use]
    pub const fn events(&self) -> &E {
        &self.events
    }

    /// The event sink, mutably.
    pub const fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }

    /// Game ticks run so far.
    #[must_use]
    pub const fn game_time(&self) -> u64 {
        self.game_time
    }

    /// Number of pending updates.
    #[must_use]
    pub fn pending_updates(&self) -> usize {
        self.ticks.count()
    }

    /// Returns true if an update is pending for `pos` under any behaviour.
    #[must_use]
    pub fn is_scheduled(&self, pos: BlockPos) -> bool {
        (0..self.behaviours.len())
            .any(|index| self.ticks.has_scheduled_tick(pos, BehaviourId(index as u16)))
    }

    /// Runs `run` with a context for `behaviour`, then commits anything it
    /// left staged.
    fn run_behaviour(
        &mut self,
        behaviour: BehaviourId,
        run: impl FnOnce(&dyn BlockBehaviour, &mut LiquidContext<'_>),
    ) {
        let Self {
            grid,
            ticks,
            bulk,
            behaviours,
            random,
            events,
            changed,
            game_time,
            ..
        } = self;
        let Some(entry) = behaviours.get(behaviour) else {
            log::warn!("No behaviour registered as {behaviour:?}");
            return;
        };

        let mut ctx = LiquidContext {
            grid,
            bulk,
            ticks,
            behaviours,
            random,
            events,
            changed,
            behaviour,
            game_time: *game_time,
        };
        run(entry, &mut ctx);

        if !ctx.bulk.is_empty() {
            log::debug!("Committing writes left staged by {}", entry.liquid_code());
            ctx.commit();
        }
    }

    /// Schedules every changed liquid cell and notifies the liquids on the
    /// six faces of each change, until no notification changes anything.
    fn notify_changes(&mut self) {
        while !self.changed.is_empty() {
            let batch = mem::take(&mut self.changed);
            for pos in batch {
                if let Some(behaviour) = self
                    .behaviours
                    .for_block(self.grid.get_block(&pos, BlockLayer::Fluid))
                {
                    self.run_behaviour(behaviour, |_, ctx| ctx.schedule(pos, behaviour));
                }

                for face in Direction::ALL {
                    let neighbour = face.relative(&pos);
                    let Some(behaviour) = self
                        .behaviours
                        .for_block(self.grid.get_block(&neighbour, BlockLayer::Fluid))
                    else {
                        continue;
                    };
                    self.run_behaviour(behaviour, |entry, ctx| {
                        entry.handle_neighbor_changed(ctx, neighbour, pos);
                    });
                }
            }
        }
    }
}
