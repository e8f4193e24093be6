//! Search for nearby drops a liquid can reach sideways.

use std::collections::VecDeque;
use std::sync::LazyLock;

use rustc_hash::FxHashSet;

use brook_utils::math::Vector2;
use brook_utils::shape::square_points_sorted_by_manhattan;
use brook_utils::{BlockPos, Direction};

use crate::block::{MAX_LEVEL, REPLACEABLE_THRESHOLD};
use crate::grid::{BlockLayer, GridAccess};

/// How far out, per axis, drops are searched for.
pub const SEARCH_RADIUS: i32 = 3;

/// Horizontal offsets around a cell, nearest first.
static DOWN_PATHS: LazyLock<Vec<Vector2<i32>>> =
    LazyLock::new(|| square_points_sorted_by_manhattan(SEARCH_RADIUS));

/// A reachable drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownwardPath {
    /// The neighbour of the searching cell through which the drop is reached.
    pub entry: BlockPos,
    /// Manhattan distance from the searching cell to the drop.
    pub dist: i32,
}

/// Finds the nearest drops a liquid at `pos` with `level` can reach.
///
/// A drop is a cell with an open floor below it, an open solid layer and less
/// liquid than `level`. A non-full liquid that finds a drop right next to it
/// returns only that one. Otherwise every path at the shortest distance found
/// is returned, all equally eligible.
#[must_use]
pub fn find_downward_paths(grid: &dyn GridAccess, pos: &BlockPos, level: i32) -> Vec<DownwardPath> {
    let mut paths = Vec::new();
    let mut shortest = i32::MAX;

    for offset in DOWN_PATHS.iter() {
        let candidate = pos.offset(offset.x, 0, offset.y);
        if !is_drop(grid, &candidate, level) {
            continue;
        }
        let Some(entry) = bfs_search_path(grid, candidate, pos, level) else {
            continue;
        };

        let dist = pos.manhattan_distance(&candidate);
        let path = DownwardPath { entry, dist };
        if dist == 1 && level < MAX_LEVEL {
            return vec![path];
        }
        shortest = shortest.min(dist);
        paths.push(path);
    }

    paths.retain(|path| path.dist <= shortest);
    paths
}

fn is_drop(grid: &dyn GridAccess, candidate: &BlockPos, level: i32) -> bool {
    grid.get_most_solid_block(&candidate.below()).replaceable >= REPLACEABLE_THRESHOLD
        && grid.get_block(candidate, BlockLayer::Fluid).liquid_level() < level
        && grid.get_block(candidate, BlockLayer::Solid).replaceable >= REPLACEABLE_THRESHOLD
}

/// Walks from `start` back towards `target`, one horizontal step at a time,
/// never moving away from it. Each step must clear the barrier of the cell
/// it enters, and the reach shrinks with the distance walked from `start`.
///
/// Returns the last cell before `target`.
fn bfs_search_path(
    grid: &dyn GridAccess,
    start: BlockPos,
    target: &BlockPos,
    level: i32,
) -> Option<BlockPos> {
    let mut queue = VecDeque::from([start]);
    let mut visited = FxHashSet::default();
    visited.insert(start);

    while let Some(current) = queue.pop_front() {
        let current_dist = current.manhattan_distance(target);
        let reach = (level - current.manhattan_distance(&start)) as f32 / MAX_LEVEL as f32;

        for face in Direction::HORIZONTALS {
            let next = face.relative(&current);
            if next.manhattan_distance(target) > current_dist {
                continue;
            }
            if next == *target {
                return Some(current);
            }
            if grid
                .get_most_solid_block(&next)
                .barrier_height(face.opposite())
                < reach
                && visited.insert(next)
            {
                queue.push_back(next);
            }
        }
    }
    None
}
