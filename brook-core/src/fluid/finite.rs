//! The finite spreading liquid behaviour.

use std::iter;

use brook_utils::{BlockPos, BlockStateId, Direction};

use crate::behaviour::{BlockBehaviour, LiquidContext};
use crate::block::{Block, BlockRegistry, FlowDirection, REPLACEABLE_THRESHOLD};
use crate::config::LiquidConfig;
use crate::error::ConfigError;
use crate::fluid::classifier::{barrier_allows, liquid_block_id, max_neighbour_liquid_level};
use crate::fluid::spreading::spread_and_update_liquid_levels;
use crate::grid::BlockLayer;

/// Faces a cell reacts through: the floor and the four sides.
const REACTION_FACES: [Direction; 5] = [
    Direction::Down,
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

/// A liquid whose cells hold a finite volume that only ever moves.
///
/// One scheduled update runs, in order: reactions with a colliding liquid,
/// the optional lowering pass, the spread, the commit, and a refresh of the
/// flow tags around the cell.
pub struct FiniteSpreadingLiquid {
    config: LiquidConfig,
    source_replacement: Option<BlockStateId>,
    flowing_replacement: Option<BlockStateId>,
}

impl FiniteSpreadingLiquid {
    /// Builds the behaviour, resolving the replacement blocks in `registry`.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownBlock`] if the liquid or a configured
    /// replacement is not registered.
    pub fn new(config: LiquidConfig, registry: &BlockRegistry) -> Result<Self, ConfigError> {
        if !registry.has_liquid(&config.code) {
            return Err(ConfigError::UnknownBlock {
                liquid: config.code.clone(),
                code: config.code.clone(),
            });
        }
        let resolve = |code: Option<&str>| {
            code.map(|code| {
                registry
                    .resolve_code(code)
                    .ok_or_else(|| ConfigError::UnknownBlock {
                        liquid: config.code.clone(),
                        code: code.to_owned(),
                    })
            })
            .transpose()
        };
        let source_replacement = resolve(config.source_replacement_code.as_deref())?;
        let flowing_replacement = resolve(config.flowing_replacement_code.as_deref())?;

        log::debug!(
            "Built liquid behaviour for {} (delay {}, collides with {:?})",
            config.code,
            config.spread_delay,
            config.collides_with
        );
        Ok(Self {
            config,
            source_replacement,
            flowing_replacement,
        })
    }

    /// The settings this behaviour was built from.
    #[must_use]
    pub const fn config(&self) -> &LiquidConfig {
        &self.config
    }

    /// Lowers a cell that no neighbour feeds by one level and reschedules it.
    ///
    /// Sources never lower. Returns true if the cell was lowered; the write is
    /// staged and lands with the next commit.
    pub fn try_lowering_liquid_level(
        &self,
        ctx: &mut LiquidContext<'_>,
        pos: BlockPos,
        our: &Block,
    ) -> bool {
        if our.is_source() {
            return false;
        }
        let level = our.liquid_level();
        if max_neighbour_liquid_level(&*ctx.grid, &pos, our) > level {
            return false;
        }

        let lowered = liquid_block_id(&*ctx.grid, &pos, our, level - 1);
        ctx.bulk.set_block(pos, BlockLayer::Fluid, lowered);
        ctx.schedule(pos, ctx.behaviour);
        log::trace!("Lowered {} at {pos} to {}", our.code, level - 1);
        true
    }

    fn replacement_for(&self, neighbour: &Block) -> Option<BlockStateId> {
        if neighbour.is_source() {
            self.source_replacement
        } else {
            self.flowing_replacement
        }
    }

    /// Turns touching cells of the colliding liquid into their replacement
    /// blocks. Returns the number of cells replaced.
    fn react_with_neighbours(&self, ctx: &mut LiquidContext<'_>, pos: BlockPos, our: &Block) -> usize {
        let Some(collides_with) = self.config.collides_with.as_deref() else {
            return 0;
        };

        let mut replaced = 0;
        for face in REACTION_FACES {
            let neighbour_pos = face.relative(&pos);
            let neighbour = ctx.block(&neighbour_pos, BlockLayer::Fluid);
            if neighbour.liquid_code() != Some(collides_with)
                || !barrier_allows(&*ctx.grid, our.liquid_level(), &pos, &neighbour_pos, face)
            {
                continue;
            }
            let Some(result) = self.replacement_for(neighbour) else {
                continue;
            };

            ctx.bulk.delete(neighbour_pos, BlockLayer::Fluid);
            ctx.bulk.set_block(neighbour_pos, BlockLayer::Solid, result);
            ctx.events.on_collision_replace(neighbour_pos, result);
            log::debug!("{} at {pos} turned {collides_with} at {neighbour_pos} into {result:?}", our.code);

            for around in [neighbour_pos.below(), neighbour_pos.above()] {
                ctx.schedule_liquid(around);
            }
            for x in -1..=1 {
                for z in -1..=1 {
                    if x != 0 || z != 0 {
                        ctx.schedule_liquid(neighbour_pos.offset(x, 0, z));
                    }
                }
            }
            replaced += 1;
        }
        replaced
    }

    /// Rewrites the flow tags of `pos` and its four sides from the committed grid.
    fn refresh_flow_directions(ctx: &mut LiquidContext<'_>, pos: BlockPos) {
        let around = Direction::HORIZONTALS.map(|face| face.relative(&pos));
        for target in iter::once(pos).chain(around) {
            let block = ctx.block(&target, BlockLayer::Fluid);
            if ctx.behaviours.for_block(block).is_none() {
                continue;
            }
            let current = block.id;
            let updated = liquid_block_id(&*ctx.grid, &target, block, block.liquid_level());
            if updated != current {
                ctx.set_block_now(target, BlockLayer::Fluid, updated);
            }
        }
    }
}

impl BlockBehaviour for FiniteSpreadingLiquid {
    fn liquid_code(&self) -> &str {
        &self.config.code
    }

    fn tick_delay(&self) -> u32 {
        self.config.spread_delay
    }

    fn on_scheduled_tick(&self, ctx: &mut LiquidContext<'_>, pos: BlockPos) {
        let our = ctx.block(&pos, BlockLayer::Fluid).clone();
        if our.liquid_code() != Some(self.config.code.as_str()) {
            return;
        }

        self.react_with_neighbours(ctx, pos, &our);
        let lowered = self.config.drain_isolated && self.try_lowering_liquid_level(ctx, pos, &our);
        if !lowered {
            spread_and_update_liquid_levels(&*ctx.grid, ctx.bulk, ctx.random, &self.config, &pos);
        }
        ctx.commit();

        Self::refresh_flow_directions(ctx, pos);
        if ctx
            .block(&pos, BlockLayer::Fluid)
            .flow()
            .is_some_and(|flow| flow != FlowDirection::Still)
        {
            ctx.events.on_still_flowing(pos);
        }
    }

    fn is_replaceable_by(&self, block: &Block, by_block: &Block) -> bool {
        (block.is_liquid() || block.replaceable >= REPLACEABLE_THRESHOLD)
            && by_block.replaceable <= block.replaceable
    }
}
