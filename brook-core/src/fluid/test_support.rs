//! Small grid scenes for liquid tests.

use brook_utils::{BlockPos, BlockStateId};

use crate::block::{Block, BlockRegistry, FlowDirection};
use crate::grid::{BlockLayer, GridAccess, VoxelGrid};

pub(crate) struct Scene {
    pub grid: VoxelGrid,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            grid: VoxelGrid::new(BlockRegistry::with_default_blocks()),
        }
    }

    fn code(&self, code: &str) -> BlockStateId {
        self.grid
            .registry()
            .resolve_code(code)
            .expect("block is registered")
    }

    pub fn liquid_id(&self, liquid: &str, level: i32, flow: FlowDirection) -> BlockStateId {
        self.grid
            .registry()
            .resolve_variant(liquid, level, flow)
            .expect("liquid is registered")
    }

    pub fn water(&mut self, pos: BlockPos, level: i32) {
        self.water_with_flow(pos, level, FlowDirection::Still);
    }

    pub fn water_with_flow(&mut self, pos: BlockPos, level: i32, flow: FlowDirection) {
        let id = self.liquid_id("water", level, flow);
        self.grid.set_block_id(&pos, BlockLayer::Fluid, id);
    }

    pub fn lava(&mut self, pos: BlockPos, level: i32) {
        let id = self.liquid_id("lava", level, FlowDirection::Still);
        self.grid.set_block_id(&pos, BlockLayer::Fluid, id);
    }

    pub fn stone(&mut self, pos: BlockPos) {
        let id = self.code("stone");
        self.grid.set_block_id(&pos, BlockLayer::Solid, id);
    }

    pub fn slab(&mut self, pos: BlockPos) {
        let id = self.code("stone-slab");
        self.grid.set_block_id(&pos, BlockLayer::Solid, id);
    }

    pub fn dig(&mut self, pos: BlockPos) {
        self.grid
            .set_block_id(&pos, BlockLayer::Solid, BlockStateId::AIR);
    }

    pub fn fill_stone(&mut self, from: BlockPos, to: BlockPos) {
        let id = self.code("stone");
        self.grid.fill(from, to, BlockLayer::Solid, id);
    }

    /// A square stone floor at height `y` reaching `radius` out on both axes.
    pub fn floor(&mut self, y: i32, radius: i32) {
        self.fill_stone(
            BlockPos::new(-radius, y, -radius),
            BlockPos::new(radius, y, radius),
        );
    }

    pub fn fluid(&self, pos: BlockPos) -> Block {
        self.grid.get_block(&pos, BlockLayer::Fluid).clone()
    }

    pub fn level(&self, pos: BlockPos) -> i32 {
        self.grid.get_block(&pos, BlockLayer::Fluid).liquid_level()
    }
}
