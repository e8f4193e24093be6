//! Grid access: the two block layers of every cell and the staged write buffer.

mod bulk;
mod voxel_grid;

pub use bulk::{BulkBlockAccessor, Staged};
pub use voxel_grid::VoxelGrid;

use brook_utils::{BlockPos, BlockStateId};

use crate::block::{Block, BlockRegistry};
use crate::block_entity::LiquidBlockEntity;

/// The storage layers of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockLayer {
    /// Terrain, slabs and other solids.
    Solid,
    /// Liquids.
    Fluid,
}

/// Read and write access to a voxel grid.
///
/// Reads of cells that were never written, or that lie outside the grid,
/// return air.
pub trait GridAccess {
    /// The registry resolving this grid's identities.
    fn registry(&self) -> &BlockRegistry;

    /// The identity stored in one layer of a cell.
    fn get_block_id(&self, pos: &BlockPos, layer: BlockLayer) -> BlockStateId;

    /// Stores an identity. Returns true if the stored value changed.
    ///
    /// Clearing the fluid layer also drops the cell's block entity.
    fn set_block_id(&mut self, pos: &BlockPos, layer: BlockLayer, id: BlockStateId) -> bool;

    /// The cell's block entity, if one was created.
    fn block_entity(&self, pos: &BlockPos) -> Option<&LiquidBlockEntity>;

    /// The cell's block entity, created on first access.
    fn block_entity_or_insert(&mut self, pos: &BlockPos) -> &mut LiquidBlockEntity;

    /// The record stored in one layer of a cell.
    fn get_block(&self, pos: &BlockPos, layer: BlockLayer) -> &Block {
        self.registry().get(self.get_block_id(pos, layer))
    }

    /// The solid layer, or the fluid layer where the solid layer is air.
    fn get_most_solid_block(&self, pos: &BlockPos) -> &Block {
        let solid = self.get_block_id(pos, BlockLayer::Solid);
        if solid.is_air() {
            self.get_block(pos, BlockLayer::Fluid)
        } else {
            self.registry().get(solid)
        }
    }
}
