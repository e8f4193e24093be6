//! Face crossing rules and flow-direction derivation.

use brook_utils::{BlockPos, BlockStateId, Cardinal, Direction};

use crate::block::{Block, FlowDirection, LIQUID_REPLACEABILITY, MAX_LEVEL};
use crate::grid::{BlockLayer, GridAccess};

/// Bias of a downward candidate.
pub const DOWN_BIAS: i32 = 100;
/// Bias of a sideways candidate with room below it.
pub const DROP_BIAS: i32 = 80;
/// Bias of any other sideways candidate.
pub const BASE_BIAS: i32 = 30;

/// Same-liquid neighbours at or above this level take no more inflow.
const MERGE_LIMIT: i32 = 6;

/// Returns true if neither side of the face between `from` and `to` is
/// barriered up to `level / 7`.
#[must_use]
pub fn barrier_allows(
    grid: &dyn GridAccess,
    level: i32,
    from: &BlockPos,
    to: &BlockPos,
    face: Direction,
) -> bool {
    let reach = level as f32 / MAX_LEVEL as f32;
    grid.get_block(from, BlockLayer::Solid).barrier_height(face) < reach
        && grid
            .get_block(to, BlockLayer::Solid)
            .barrier_height(face.opposite())
            < reach
}

/// Whether liquid from `our` at `from` may flow through `face` into `to`.
///
/// The barrier gate comes first. Past it, a same-liquid target must be below
/// level 6 and any other target must not be a liquid and be at least as
/// replaceable as `our`.
#[must_use]
pub fn can_cross_face(
    grid: &dyn GridAccess,
    our: &Block,
    from: &BlockPos,
    to: &BlockPos,
    face: Direction,
) -> bool {
    if !barrier_allows(grid, our.liquid_level(), from, to, face) {
        return false;
    }

    let target = grid.get_block(to, BlockLayer::Fluid);
    if target.is_same_liquid(our) {
        return target.liquid_level() < MERGE_LIMIT;
    }
    !target.is_liquid() && target.replaceable >= our.replaceable
}

/// Spread priority of the neighbour through `face`.
#[must_use]
pub fn flow_bias(grid: &dyn GridAccess, pos: &BlockPos, face: Direction) -> i32 {
    if face == Direction::Down {
        return DOWN_BIAS;
    }
    let below_neighbour = face.relative(pos).below();
    if grid.get_block(&below_neighbour, BlockLayer::Fluid).liquid_level() < MAX_LEVEL {
        DROP_BIAS
    } else {
        BASE_BIAS
    }
}

/// The flow tag a cell of `our`'s liquid at `level` would show at `pos`.
///
/// Neighbours on all eight sides whose level differs push the flow towards
/// the lower side. Only a clear cardinal result is used; otherwise a falling
/// liquid directly above or below, or an open side towards a contributing
/// neighbour, makes the cell fall, and anything else is still.
#[must_use]
pub fn derive_flow_direction(
    grid: &dyn GridAccess,
    pos: &BlockPos,
    our: &Block,
    level: i32,
) -> FlowDirection {
    let mut dx = 0;
    let mut dz = 0;
    let mut any_side_free = false;

    for cardinal in Cardinal::ALL {
        let neighbour_pos = cardinal.relative(pos);
        let neighbour = grid.get_block(&neighbour_pos, BlockLayer::Fluid);
        if !neighbour.is_liquid()
            || neighbour.liquid_level() == level
            || neighbour.replaceable < LIQUID_REPLACEABILITY
        {
            continue;
        }

        let (nx, nz) = if neighbour.liquid_level() < level {
            cardinal.normal()
        } else {
            cardinal.opposite().normal()
        };
        if let Some(face) = cardinal.as_direction() {
            let solid = grid.get_block(&neighbour_pos, BlockLayer::Solid);
            any_side_free |= !solid.side_is_solid(face.opposite());
        }
        dx += nx;
        dz += nz;
    }

    if dx.abs() > dz.abs() {
        dz = 0;
    } else if dz.abs() > dx.abs() {
        dx = 0;
    }
    if let Some(flow) =
        Cardinal::from_normal(dx.signum(), dz.signum()).and_then(FlowDirection::from_cardinal)
    {
        return flow;
    }

    let falls = |vertical: BlockPos| {
        let block = grid.get_block(&vertical, BlockLayer::Fluid);
        block.is_same_liquid(our) && block.flow() == Some(FlowDirection::Down)
    };
    if falls(pos.below()) || falls(pos.above()) || any_side_free {
        FlowDirection::Down
    } else {
        FlowDirection::Still
    }
}

/// The identity of `our`'s liquid at `level` with its flow tag derived for `pos`.
///
/// Levels below 1 resolve to air; levels above 7 are clamped.
#[must_use]
pub fn liquid_block_id(
    grid: &dyn GridAccess,
    pos: &BlockPos,
    our: &Block,
    level: i32,
) -> BlockStateId {
    if level < 1 {
        return BlockStateId::AIR;
    }
    let Some(liquid) = our.liquid_code() else {
        return BlockStateId::AIR;
    };
    let level = level.min(MAX_LEVEL);
    let flow = derive_flow_direction(grid, pos, our, level);
    grid.registry()
        .resolve_variant(liquid, level, flow)
        .unwrap_or_else(|| {
            log::warn!("No variant registered for {liquid} level {level} flow {flow:?}");
            BlockStateId::AIR
        })
}

/// The highest level among same-liquid neighbours that can feed `pos`.
///
/// A same-liquid cell directly above with no barrier on the top face counts
/// as a full feed.
#[must_use]
pub fn max_neighbour_liquid_level(grid: &dyn GridAccess, pos: &BlockPos, our: &Block) -> i32 {
    let own_solid = grid.get_block(pos, BlockLayer::Solid);
    let above = grid.get_block(&pos.above(), BlockLayer::Fluid);
    if above.is_same_liquid(our) && own_solid.barrier_height(Direction::Up) <= 0.0 {
        return MAX_LEVEL;
    }

    let mut level = 0;
    for face in Direction::HORIZONTALS {
        let neighbour_pos = face.relative(pos);
        let neighbour = grid.get_block(&neighbour_pos, BlockLayer::Fluid);
        if neighbour.is_same_liquid(our)
            && barrier_allows(grid, neighbour.liquid_level(), pos, &neighbour_pos, face)
        {
            level = level.max(neighbour.liquid_level());
        }
    }
    level
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockRegistry;
    use crate::fluid::test_support::Scene;

    #[test]
    fn test_cross_into_empty_and_low_same_liquid() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 1, 0);
        scene.water(origin, 7);
        scene.water(BlockPos::new(1, 1, 0), 5);
        let source = scene.fluid(origin);

        assert!(can_cross_face(
            &scene.grid,
            &source,
            &origin,
            &BlockPos::new(0, 1, -1),
            Direction::North
        ));
        assert!(can_cross_face(
            &scene.grid,
            &source,
            &origin,
            &BlockPos::new(1, 1, 0),
            Direction::East
        ));
    }

    #[test]
    fn test_full_neighbours_block_inflow() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 1, 0);
        scene.water(origin, 7);
        scene.water(BlockPos::new(1, 1, 0), 6);
        scene.water(BlockPos::new(-1, 1, 0), 7);
        let source = scene.fluid(origin);

        assert!(!can_cross_face(
            &scene.grid,
            &source,
            &origin,
            &BlockPos::new(1, 1, 0),
            Direction::East
        ));
        assert!(!can_cross_face(
            &scene.grid,
            &source,
            &origin,
            &BlockPos::new(-1, 1, 0),
            Direction::West
        ));
    }

    #[test]
    fn test_other_liquid_and_solids_block() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 1, 0);
        scene.water(origin, 7);
        scene.lava(BlockPos::new(1, 1, 0), 3);
        scene.stone(BlockPos::new(0, 0, 0));
        let source = scene.fluid(origin);

        assert!(!can_cross_face(
            &scene.grid,
            &source,
            &origin,
            &BlockPos::new(1, 1, 0),
            Direction::East
        ));
        assert!(!can_cross_face(
            &scene.grid,
            &source,
            &origin,
            &BlockPos::new(0, 0, 0),
            Direction::Down
        ));
    }

    #[test]
    fn test_slab_barrier_scales_with_level() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 1, 0);
        let east = BlockPos::new(1, 1, 0);
        scene.slab(east);

        // A slab side blocks up to half height: 3/7 is below it, 4/7 above.
        scene.water(origin, 3);
        let low = scene.fluid(origin);
        assert!(!can_cross_face(&scene.grid, &low, &origin, &east, Direction::East));

        scene.water(origin, 4);
        let high = scene.fluid(origin);
        assert!(can_cross_face(&scene.grid, &high, &origin, &east, Direction::East));
    }

    #[test]
    fn test_flow_bias() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 1, 0);
        scene.stone(BlockPos::new(1, 0, 0));
        scene.water(BlockPos::new(0, 0, 1), 7);

        assert_eq!(flow_bias(&scene.grid, &origin, Direction::Down), DOWN_BIAS);
        // Stone below the east neighbour holds no liquid, so the drop reads as open.
        assert_eq!(flow_bias(&scene.grid, &origin, Direction::East), DROP_BIAS);
        assert_eq!(flow_bias(&scene.grid, &origin, Direction::South), BASE_BIAS);
        assert_eq!(flow_bias(&scene.grid, &origin, Direction::West), DROP_BIAS);
    }

    #[test]
    fn test_flow_points_to_lower_neighbour() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 1, 0);
        scene.water(origin, 5);
        scene.water(BlockPos::new(1, 1, 0), 2);
        let cell = scene.fluid(origin);

        assert_eq!(
            derive_flow_direction(&scene.grid, &origin, &cell, 5),
            FlowDirection::East
        );
    }

    #[test]
    fn test_flow_points_away_from_higher_neighbour() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 1, 0);
        scene.water(origin, 3);
        scene.water(BlockPos::new(0, 1, -1), 6);
        scene.water(BlockPos::new(1, 1, -1), 6);
        scene.water(BlockPos::new(-1, 1, -1), 6);
        let cell = scene.fluid(origin);

        assert_eq!(
            derive_flow_direction(&scene.grid, &origin, &cell, 3),
            FlowDirection::South
        );
    }

    #[test]
    fn test_diagonal_gradient_falls_through() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 1, 0);
        scene.water(origin, 5);
        scene.water(BlockPos::new(1, 1, 1), 2);
        let cell = scene.fluid(origin);

        // The only contributor is diagonal, so no side is checked: still.
        assert_eq!(
            derive_flow_direction(&scene.grid, &origin, &cell, 5),
            FlowDirection::Still
        );

        scene.water_with_flow(origin.below(), 7, FlowDirection::Down);
        assert_eq!(
            derive_flow_direction(&scene.grid, &origin, &cell, 5),
            FlowDirection::Down
        );
    }

    #[test]
    fn test_balanced_gradient_with_open_side_falls() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 1, 0);
        scene.water(origin, 4);
        scene.water(BlockPos::new(1, 1, 0), 2);
        scene.water(BlockPos::new(-1, 1, 0), 2);
        let cell = scene.fluid(origin);

        assert_eq!(
            derive_flow_direction(&scene.grid, &origin, &cell, 4),
            FlowDirection::Down
        );
    }

    #[test]
    fn test_isolated_cell_is_still() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 1, 0);
        scene.water(origin, 7);
        let cell = scene.fluid(origin);

        assert_eq!(
            derive_flow_direction(&scene.grid, &origin, &cell, 7),
            FlowDirection::Still
        );
        assert_eq!(liquid_block_id(&scene.grid, &origin, &cell, 7), cell.id);
    }

    #[test]
    fn test_liquid_block_id_clamps() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 1, 0);
        scene.water(origin, 7);
        let cell = scene.fluid(origin);

        assert_eq!(liquid_block_id(&scene.grid, &origin, &cell, 0), BlockStateId::AIR);
        assert_eq!(liquid_block_id(&scene.grid, &origin, &cell, -3), BlockStateId::AIR);
        assert_eq!(liquid_block_id(&scene.grid, &origin, &cell, 9), cell.id);

        let registry = BlockRegistry::with_default_blocks();
        let stone = registry.get(registry.resolve_code("stone").expect("stone")).clone();
        assert_eq!(liquid_block_id(&scene.grid, &origin, &stone, 3), BlockStateId::AIR);
    }

    #[test]
    fn test_max_neighbour_level() {
        let mut scene = Scene::new();
        let origin = BlockPos::new(0, 1, 0);
        scene.water(origin, 3);
        scene.water(BlockPos::new(1, 1, 0), 5);
        scene.water(BlockPos::new(0, 1, 1), 2);
        scene.lava(BlockPos::new(-1, 1, 0), 7);
        let cell = scene.fluid(origin);

        assert_eq!(max_neighbour_liquid_level(&scene.grid, &origin, &cell), 5);

        scene.water(origin.above(), 1);
        assert_eq!(max_neighbour_liquid_level(&scene.grid, &origin, &cell), MAX_LEVEL);
    }
}
