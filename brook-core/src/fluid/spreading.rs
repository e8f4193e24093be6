//! Volume redistribution for one liquid cell.

use smallvec::SmallVec;

use brook_utils::random::{Random, shuffle};
use brook_utils::{BlockPos, Direction};

use crate::block::{Block, MAX_LEVEL};
use crate::config::LiquidConfig;
use crate::fluid::classifier::{can_cross_face, flow_bias, liquid_block_id};
use crate::fluid::paths::find_downward_paths;
use crate::grid::{BlockLayer, BulkBlockAccessor, GridAccess};

/// What one spread step did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpreadOutcome {
    /// Units moved into the cell below.
    pub moved_down: i32,
    /// Units moved into horizontal neighbours.
    pub moved_sideways: i32,
    /// Units left in the cell.
    pub remaining: i32,
    /// The cell below was refilled as a source.
    pub refilled: bool,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    pos: BlockPos,
    level: i32,
    bias: i32,
}

/// Redistributes the volume of the liquid cell at `pos`.
///
/// Reads only committed state from `grid` and stages every write in `bulk`;
/// the caller commits. Volume first falls into the cell below, then at most
/// all but one of the remaining units is split between the horizontal
/// neighbours, highest bias first. The cell keeps what is left and is only
/// written if its identity changes.
pub fn spread_and_update_liquid_levels(
    grid: &dyn GridAccess,
    bulk: &mut BulkBlockAccessor,
    random: &mut dyn Random,
    config: &LiquidConfig,
    pos: &BlockPos,
) -> SpreadOutcome {
    let our = grid.get_block(pos, BlockLayer::Fluid);
    let level = our.liquid_level();
    let mut outcome = SpreadOutcome::default();
    if level < 1 {
        return outcome;
    }
    let mut total_volume = level;

    let down = pos.below();
    let down_level = grid.get_block(&down, BlockLayer::Fluid).liquid_level();
    if down_level < MAX_LEVEL && can_cross_face(grid, our, pos, &down, Direction::Down) {
        if config.source_refill && should_refill_below(grid, our, pos) {
            bulk.set_block(down, BlockLayer::Fluid, liquid_block_id(grid, &down, our, MAX_LEVEL));
            outcome.refilled = true;
        } else {
            let fill_amount = (MAX_LEVEL - down_level).min(total_volume);
            bulk.set_block(
                down,
                BlockLayer::Fluid,
                liquid_block_id(grid, &down, our, down_level + fill_amount),
            );
            total_volume -= fill_amount;
            outcome.moved_down = fill_amount;

            if total_volume <= 0 {
                bulk.delete(*pos, BlockLayer::Fluid);
                log::trace!("{} at {pos} fell entirely", our.code);
                return outcome;
            }
        }
    }

    if total_volume > 1 {
        let mut candidates = horizontal_candidates(grid, our, pos);
        if config.seek_drops && outcome.moved_down == 0 && !outcome.refilled {
            restrict_to_drops(grid, pos, level, &mut candidates);
        }

        if !candidates.is_empty() {
            candidates.sort_by(|a, b| b.bias.cmp(&a.bias));

            let capacity: i32 = candidates.iter().map(|c| MAX_LEVEL - c.level).sum();
            let volume_to_spread = (total_volume - 1).min(capacity);

            if volume_to_spread > 0 {
                let count = candidates.len() as i32;
                let volume_per_block = volume_to_spread / count;
                let mut remainder = volume_to_spread % count;

                if config.shuffle_remainder {
                    shuffle(&mut candidates, random);
                }

                for candidate in &candidates {
                    let fill_amount = (volume_per_block + i32::from(remainder > 0))
                        .min(MAX_LEVEL - candidate.level);
                    if remainder > 0 {
                        remainder -= 1;
                    }
                    if fill_amount > 0 {
                        bulk.set_block(
                            candidate.pos,
                            BlockLayer::Fluid,
                            liquid_block_id(grid, &candidate.pos, our, candidate.level + fill_amount),
                        );
                        total_volume -= fill_amount;
                        outcome.moved_sideways += fill_amount;
                    }
                    if total_volume <= 0 {
                        break;
                    }
                }
            }
        }
    }

    if total_volume > 0 {
        let updated = liquid_block_id(grid, pos, our, total_volume);
        if updated != our.id {
            bulk.set_block(*pos, BlockLayer::Fluid, updated);
        }
    } else {
        bulk.delete(*pos, BlockLayer::Fluid);
    }
    outcome.remaining = total_volume;

    if outcome.moved_down > 0 || outcome.moved_sideways > 0 || outcome.refilled {
        log::trace!(
            "{} at {pos}: {} down, {} sideways, {} left{}",
            our.code,
            outcome.moved_down,
            outcome.moved_sideways,
            outcome.remaining,
            if outcome.refilled { ", refilled below" } else { "" }
        );
    }
    outcome
}

fn horizontal_candidates(
    grid: &dyn GridAccess,
    our: &Block,
    pos: &BlockPos,
) -> SmallVec<[Candidate; 4]> {
    let mut candidates = SmallVec::new();
    for face in Direction::HORIZONTALS {
        let neighbour = face.relative(pos);
        if !can_cross_face(grid, our, pos, &neighbour, face) {
            continue;
        }
        let level = grid.get_block(&neighbour, BlockLayer::Fluid).liquid_level();
        if level < MAX_LEVEL {
            candidates.push(Candidate {
                pos: neighbour,
                level,
                bias: flow_bias(grid, pos, face),
            });
        }
    }
    candidates
}

/// Keeps only the candidates that lead to the nearest drops, if any does.
fn restrict_to_drops(
    grid: &dyn GridAccess,
    pos: &BlockPos,
    level: i32,
    candidates: &mut SmallVec<[Candidate; 4]>,
) {
    let paths = find_downward_paths(grid, pos, level);
    let leads_to_drop =
        |candidate: &Candidate| paths.iter().any(|path| path.entry == candidate.pos);
    if candidates.iter().any(leads_to_drop) {
        candidates.retain(|candidate| leads_to_drop(candidate));
    }
}

/// A source over a supported drop, or over a cell already flanked by
/// sources, turns the drop into a new source instead of draining into it.
fn should_refill_below(grid: &dyn GridAccess, our: &Block, pos: &BlockPos) -> bool {
    if !our.is_source() {
        return false;
    }
    let down = pos.below();
    if count_nearby_sources(grid, &down, our) > 1 {
        return true;
    }
    let two_below = down.below();
    let supported = grid
        .get_most_solid_block(&two_below)
        .side_is_solid(Direction::Up)
        || {
            let floor = grid.get_block(&two_below, BlockLayer::Fluid);
            floor.is_same_liquid(our) && floor.is_source()
        };
    supported && count_nearby_sources(grid, pos, our) >= 2
}

fn count_nearby_sources(grid: &dyn GridAccess, pos: &BlockPos, our: &Block) -> usize {
    Direction::HORIZONTALS
        .into_iter()
        .filter(|face| {
            let block = grid.get_block(&face.relative(pos), BlockLayer::Fluid);
            block.is_same_liquid(our) && block.is_source()
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use brook_utils::random::Xoroshiro;

    use crate::block::FlowDirection;
    use crate::fluid::test_support::Scene;

    fn settings() -> LiquidConfig {
        LiquidConfig {
            source_refill: false,
            seek_drops: false,
            shuffle_remainder: false,
            ..LiquidConfig::new("water")
        }
    }

    fn spread(scene: &mut Scene, config: &LiquidConfig, pos: BlockPos) -> SpreadOutcome {
        let mut bulk = BulkBlockAccessor::new();
        let mut random = Xoroshiro::from_seed(1);
        let outcome =
            spread_and_update_liquid_levels(&scene.grid, &mut bulk, &mut random, config, &pos);
        bulk.commit(&mut scene.grid);
        outcome
    }

    #[test]
    fn test_falls_entirely_into_empty_cell() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 5, 0);
        scene.water(origin, 4);

        let outcome = spread(&mut scene, &settings(), origin);
        assert_eq!(outcome.moved_down, 4);
        assert_eq!(outcome.remaining, 0);
        assert_eq!(scene.level(origin), 0);
        assert_eq!(scene.level(origin.below()), 4);
    }

    #[test]
    fn test_falls_partially_into_filled_cell() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 5, 0);
        scene.stone(BlockPos::new(0, 3, 0));
        for face in Direction::HORIZONTALS {
            scene.stone(face.relative(&origin));
        }
        scene.water(origin, 6);
        scene.water(origin.below(), 4);

        let outcome = spread(&mut scene, &settings(), origin);
        assert_eq!(outcome.moved_down, 3);
        assert_eq!(scene.level(origin.below()), 7);
        assert_eq!(scene.level(origin), 3);
    }

    #[test]
    fn test_even_split_keeps_one_unit() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 1, 0);
        scene.floor(0, 3);
        scene.stone(BlockPos::new(0, 1, -1));
        scene.stone(BlockPos::new(0, 1, 1));
        scene.water(origin, 7);

        let outcome = spread(&mut scene, &settings(), origin);
        assert_eq!(outcome.moved_down, 0);
        assert_eq!(outcome.moved_sideways, 6);
        assert_eq!(scene.level(origin), 1);
        assert_eq!(scene.level(BlockPos::new(1, 1, 0)), 3);
        assert_eq!(scene.level(BlockPos::new(-1, 1, 0)), 3);
    }

    #[test]
    fn test_remainder_goes_to_highest_bias_without_shuffle() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 1, 0);
        scene.floor(0, 3);
        // Water below the west neighbour lowers its bias.
        scene.dig(BlockPos::new(-1, 0, 0));
        scene.water(BlockPos::new(-1, 0, 0), 7);
        scene.stone(BlockPos::new(0, 1, -1));
        scene.stone(BlockPos::new(0, 1, 1));
        scene.water(origin, 4);

        let outcome = spread(&mut scene, &settings(), origin);
        assert_eq!(outcome.moved_sideways, 3);
        assert_eq!(scene.level(BlockPos::new(1, 1, 0)), 2);
        assert_eq!(scene.level(BlockPos::new(-1, 1, 0)), 1);
        assert_eq!(scene.level(origin), 1);
    }

    #[test]
    fn test_single_unit_stays() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 1, 0);
        scene.floor(0, 2);
        scene.water(origin, 1);

        let outcome = spread(&mut scene, &settings(), origin);
        assert_eq!(outcome, SpreadOutcome {
            remaining: 1,
            ..SpreadOutcome::default()
        });
        assert_eq!(scene.level(origin), 1);
    }

    #[test]
    fn test_equilibrium_stages_nothing() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 1, 0);
        scene.floor(0, 2);
        for face in Direction::HORIZONTALS {
            scene.water(face.relative(&origin), 6);
        }
        scene.water(origin, 6);
        scene.water(origin.below(), 7);
        let before = scene.fluid(origin).id;

        let mut bulk = BulkBlockAccessor::new();
        let mut random = Xoroshiro::from_seed(1);
        let outcome = spread_and_update_liquid_levels(
            &scene.grid,
            &mut bulk,
            &mut random,
            &settings(),
            &origin,
        );
        assert!(bulk.is_empty());
        assert_eq!(outcome.remaining, 6);
        assert_eq!(before, scene.fluid(origin).id);
    }

    #[test]
    fn test_conservation_over_a_step() {
        let mut scene = Scene::new();
        scene.floor(0, 4);
        scene.dig(BlockPos::new(2, 0, 0));
        scene.stone(BlockPos::new(2, -1, 0));
        let cells = [
            (BlockPos::new(0, 1, 0), 7),
            (BlockPos::new(1, 1, 0), 3),
            (BlockPos::new(0, 1, 1), 5),
            (BlockPos::new(0, 2, 0), 2),
        ];
        for (pos, level) in cells {
            scene.water(pos, level);
        }
        let before = scene.grid.liquid_volume("water");

        let config = LiquidConfig {
            source_refill: false,
            ..LiquidConfig::new("water")
        };
        for (pos, _) in cells {
            spread(&mut scene, &config, pos);
            assert_eq!(scene.grid.liquid_volume("water"), before);
        }
    }

    #[test]
    fn test_default_settings_split_evenly_at_a_ledge() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 1, 0);
        scene.floor(0, 3);
        scene.dig(BlockPos::new(1, 0, 0));
        scene.stone(BlockPos::new(0, 1, -1));
        scene.stone(BlockPos::new(0, 1, 1));
        scene.water(origin, 7);

        let config = LiquidConfig {
            shuffle_remainder: false,
            ..LiquidConfig::new("water")
        };
        assert!(!config.seek_drops);
        let outcome = spread(&mut scene, &config, origin);
        assert_eq!(outcome.moved_sideways, 6);
        assert_eq!(scene.level(BlockPos::new(1, 1, 0)), 3);
        assert_eq!(scene.level(BlockPos::new(-1, 1, 0)), 3);
        assert_eq!(scene.level(origin), 1);
    }

    #[test]
    fn test_seek_drops_restricts_spread() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 1, 0);
        scene.floor(0, 4);
        scene.dig(BlockPos::new(2, 0, 0));
        scene.stone(BlockPos::new(2, -1, 0));
        scene.water(origin, 5);

        let config = LiquidConfig {
            seek_drops: true,
            ..settings()
        };
        let outcome = spread(&mut scene, &config, origin);
        assert_eq!(outcome.moved_sideways, 4);
        assert_eq!(scene.level(BlockPos::new(1, 1, 0)), 4);
        assert_eq!(scene.level(BlockPos::new(-1, 1, 0)), 0);
        assert_eq!(scene.level(origin), 1);
    }

    #[test]
    fn test_source_refills_supported_drop() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 2, 0);
        scene.floor(0, 3);
        scene.fill_stone(BlockPos::new(-3, 1, -3), BlockPos::new(3, 1, 3));
        scene.dig(BlockPos::new(0, 1, 0));
        scene.stone(BlockPos::new(0, 2, -1));
        scene.stone(BlockPos::new(0, 2, 1));
        scene.water(origin, 7);
        scene.water(BlockPos::new(1, 2, 0), 7);
        scene.water(BlockPos::new(-1, 2, 0), 7);

        let config = LiquidConfig {
            source_refill: true,
            ..settings()
        };
        let outcome = spread(&mut scene, &config, origin);
        assert!(outcome.refilled);
        assert_eq!(scene.level(origin.below()), 7);
        assert_eq!(scene.level(origin), 7);
    }

    #[test]
    fn test_lone_source_does_not_refill() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 2, 0);
        scene.floor(0, 3);
        scene.fill_stone(BlockPos::new(-3, 1, -3), BlockPos::new(3, 1, 3));
        scene.dig(BlockPos::new(0, 1, 0));
        scene.water(origin, 7);

        let config = LiquidConfig {
            source_refill: true,
            ..settings()
        };
        let outcome = spread(&mut scene, &config, origin);
        assert!(!outcome.refilled);
        assert_eq!(outcome.moved_down, 7);
        assert_eq!(scene.level(origin), 0);
    }

    #[test]
    fn test_spread_target_flow_is_derived() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 1, 0);
        scene.floor(0, 3);
        scene.stone(BlockPos::new(0, 1, -1));
        scene.stone(BlockPos::new(0, 1, 1));
        scene.stone(BlockPos::new(-1, 1, 0));
        scene.water(origin, 7);

        spread(&mut scene, &settings(), origin);
        let east = scene.fluid(BlockPos::new(1, 1, 0));
        assert_eq!(east.liquid_level(), 6);
        // Derived before commit: the source still reads 7 to the west.
        assert_eq!(east.flow(), Some(FlowDirection::East));
    }
}
