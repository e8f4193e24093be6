use rustc_hash::FxHashMap;

use brook_utils::BlockStateId;

use super::{AIR_REPLACEABILITY, Block, FlowDirection, MAX_LEVEL};

/// Identities of one liquid's variant family, indexed by flow then level.
struct LiquidFamily {
    variants: [[BlockStateId; MAX_LEVEL as usize]; 6],
}

/// Maps identities to block records and back.
///
/// Identity `0` is always air. Unknown identities resolve to air as well.
pub struct BlockRegistry {
    blocks: Vec<Block>,
    by_code: FxHashMap<String, BlockStateId>,
    liquids: FxHashMap<String, LiquidFamily>,
}

impl BlockRegistry {
    /// A registry holding only air.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            blocks: Vec::new(),
            by_code: FxHashMap::default(),
            liquids: FxHashMap::default(),
        };
        registry.register(Block::new("air", AIR_REPLACEABILITY));
        registry
    }

    /// Air, stone, a slab, the collision products and the water and lava families.
    #[must_use]
    pub fn with_default_blocks() -> Self {
        let mut registry = Self::new();
        registry.register(Block::full_solid("stone"));
        registry.register(Block::bottom_slab("stone-slab"));
        registry.register(Block::full_solid("rock-obsidian"));
        registry.register(Block::full_solid("rock-basalt"));
        registry.register_liquid("water");
        registry.register_liquid("lava");
        registry
    }

    /// Registers a block and returns its identity.
    ///
    /// Registering a code twice keeps the first record.
    pub fn register(&mut self, mut block: Block) -> BlockStateId {
        if let Some(&id) = self.by_code.get(&block.code) {
            log::warn!("Block {} is already registered as {id:?}", block.code);
            return id;
        }
        let id = BlockStateId(self.blocks.len() as u16);
        block.id = id;
        self.by_code.insert(block.code.clone(), id);
        self.blocks.push(block);
        id
    }

    /// Registers every `{code}-{flow}-{level}` variant of a liquid and returns
    /// the identity of its still source.
    pub fn register_liquid(&mut self, code: &str) -> BlockStateId {
        if let Some(id) = self.resolve_variant(code, MAX_LEVEL, FlowDirection::Still) {
            return id;
        }
        let mut variants = [[BlockStateId::AIR; MAX_LEVEL as usize]; 6];
        for flow in FlowDirection::ALL {
            for level in 1..=MAX_LEVEL {
                variants[flow.index()][(level - 1) as usize] =
                    self.register(Block::liquid_variant(code, level, flow));
            }
        }
        let source = variants[FlowDirection::Still.index()][(MAX_LEVEL - 1) as usize];
        self.liquids.insert(code.to_owned(), LiquidFamily { variants });
        source
    }

    /// The record for an identity.
    #[must_use]
    pub fn get(&self, id: BlockStateId) -> &Block {
        self.blocks
            .get(usize::from(id.0))
            .unwrap_or(&self.blocks[0])
    }

    /// The identity registered under a block code.
    #[must_use]
    pub fn resolve_code(&self, code: &str) -> Option<BlockStateId> {
        self.by_code.get(code).copied()
    }

    /// The identity of a liquid variant. `level` must be in `1..=7`.
    #[must_use]
    pub fn resolve_variant(
        &self,
        liquid: &str,
        level: i32,
        flow: FlowDirection,
    ) -> Option<BlockStateId> {
        if !(1..=MAX_LEVEL).contains(&level) {
            return None;
        }
        self.liquids
            .get(liquid)
            .map(|family| family.variants[flow.index()][(level - 1) as usize])
    }

    /// Returns true if the liquid's variants are registered.
    #[must_use]
    pub fn has_liquid(&self, liquid: &str) -> bool {
        self.liquids.contains_key(liquid)
    }

    /// Number of registered records, air included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; air is registered on construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
