use rustc_hash::FxHashMap;

use brook_utils::{BlockPos, BlockStateId};

use super::{BlockLayer, GridAccess};
use crate::block::BlockRegistry;
use crate::block_entity::LiquidBlockEntity;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Cell {
    solid: BlockStateId,
    fluid: BlockStateId,
}

impl Cell {
    const fn get(self, layer: BlockLayer) -> BlockStateId {
        match layer {
            BlockLayer::Solid => self.solid,
            BlockLayer::Fluid => self.fluid,
        }
    }

    const fn is_empty(self) -> bool {
        self.solid.is_air() && self.fluid.is_air()
    }
}

/// A sparse in-memory grid.
///
/// Only non-empty cells are stored. An optional height range turns
/// everything outside it into read-only air, so liquid that falls out of the
/// range is lost.
pub struct VoxelGrid {
    registry: BlockRegistry,
    cells: FxHashMap<BlockPos, Cell>,
    entities: FxHashMap<BlockPos, LiquidBlockEntity>,
    height_range: Option<(i32, i32)>,
}

impl VoxelGrid {
    /// An unbounded empty grid.
    #[must_use]
    pub fn new(registry: BlockRegistry) -> Self {
        Self {
            registry,
            cells: FxHashMap::default(),
            entities: FxHashMap::default(),
            height_range: None,
        }
    }

    /// Limits writes to `min_y..=max_y`.
    #[must_use]
    pub fn with_height_range(mut self, min_y: i32, max_y: i32) -> Self {
        self.height_range = Some((min_y, max_y));
        self
    }

    /// Returns true if the position can hold blocks.
    #[must_use]
    pub fn is_in_bounds(&self, pos: &BlockPos) -> bool {
        self.height_range
            .is_none_or(|(min_y, max_y)| (min_y..=max_y).contains(&pos.y()))
    }

    /// Writes `id` into one layer of every cell in the box spanned by `from` and `to`.
    pub fn fill(&mut self, from: BlockPos, to: BlockPos, layer: BlockLayer, id: BlockStateId) {
        for x in from.x().min(to.x())..=from.x().max(to.x()) {
            for y in from.y().min(to.y())..=from.y().max(to.y()) {
                for z in from.z().min(to.z())..=from.z().max(to.z()) {
                    self.set_block_id(&BlockPos::new(x, y, z), layer, id);
                }
            }
        }
    }

    /// Sum of the liquid levels of every cell holding `liquid`.
    #[must_use]
    pub fn liquid_volume(&self, liquid: &str) -> i64 {
        self.liquid_cells()
            .filter(|(_, block_id)| self.registry.get(*block_id).liquid_code() == Some(liquid))
            .map(|(_, block_id)| i64::from(self.registry.get(block_id).liquid_level()))
            .sum()
    }

    /// Every cell with a non-empty fluid layer, in no particular order.
    pub fn liquid_cells(&self) -> impl Iterator<Item = (BlockPos, BlockStateId)> + '_ {
        self.cells
            .iter()
            .filter(|(_, cell)| !cell.fluid.is_air())
            .map(|(pos, cell)| (*pos, cell.fluid))
    }

    /// Number of non-empty cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

impl GridAccess for VoxelGrid {
    fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    fn get_block_id(&self, pos: &BlockPos, layer: BlockLayer) -> BlockStateId {
        self.cells
            .get(pos)
            .map_or(BlockStateId::AIR, |cell| cell.get(layer))
    }

    fn set_block_id(&mut self, pos: &BlockPos, layer: BlockLayer, id: BlockStateId) -> bool {
        if !self.is_in_bounds(pos) {
            log::trace!("Dropped write of {id:?} outside the grid at {pos}");
            return false;
        }

        let mut cell = self.cells.get(pos).copied().unwrap_or_default();
        if cell.get(layer) == id {
            return false;
        }
        match layer {
            BlockLayer::Solid => cell.solid = id,
            BlockLayer::Fluid => {
                cell.fluid = id;
                if id.is_air() {
                    self.entities.remove(pos);
                }
            }
        }

        if cell.is_empty() {
            self.cells.remove(pos);
        } else {
            self.cells.insert(*pos, cell);
        }
        true
    }

    fn block_entity(&self, pos: &BlockPos) -> Option<&LiquidBlockEntity> {
        self.entities.get(pos)
    }

    fn block_entity_or_insert(&mut self, pos: &BlockPos) -> &mut LiquidBlockEntity {
        self.entities.entry(*pos).or_default()
    }
}
