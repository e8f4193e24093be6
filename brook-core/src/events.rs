//! Hooks fired by liquid updates.
//!
//! Effects such as sounds and particles belong to the host; the simulation
//! only reports where they should happen.

use brook_utils::{BlockPos, BlockStateId};

/// Receives liquid update events.
pub trait LiquidEvents {
    /// A colliding liquid at `pos` was replaced by `result`.
    fn on_collision_replace(&mut self, _pos: BlockPos, _result: BlockStateId) {}

    /// The cell at `pos` finished an update still holding flowing liquid.
    fn on_still_flowing(&mut self, _pos: BlockPos) {}
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEvents;

impl LiquidEvents for NoopEvents {}

/// Keeps every event in arrival order.
#[derive(Debug, Clone, Default)]
pub struct RecordedEvents {
    /// Collision replacements as `(position, result)`.
    pub collisions: Vec<(BlockPos, BlockStateId)>,
    /// Positions reported as still flowing.
    pub still_flowing: Vec<BlockPos>,
}

impl LiquidEvents for RecordedEvents {
    fn on_collision_replace(&mut self, pos: BlockPos, result: BlockStateId) {
        self.collisions.push((pos, result));
    }

    fn on_still_flowing(&mut self, pos: BlockPos) {
        self.still_flowing.push(pos);
    }
}
