//! Block records: replaceability, per-face barriers and liquid properties.

mod registry;

pub use registry::BlockRegistry;

use brook_utils::{BlockStateId, Cardinal, Direction};

/// Level of a full source cell.
pub const MAX_LEVEL: i32 = 7;

/// Replaceability at or above which a cell counts as open.
pub const REPLACEABLE_THRESHOLD: i32 = 5000;

/// Replaceability of every liquid variant. Flow-direction neighbours must be
/// at least this replaceable to contribute to the gradient.
pub const LIQUID_REPLACEABILITY: i32 = 6000;

/// Replaceability of air.
pub const AIR_REPLACEABILITY: i32 = 9999;

/// The flow tag carried by a liquid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowDirection {
    /// No visible flow.
    Still,
    /// Flowing towards -Z.
    North,
    /// Flowing towards +X.
    East,
    /// Flowing towards +Z.
    South,
    /// Flowing towards -X.
    West,
    /// Falling.
    Down,
}

impl FlowDirection {
    /// Every flow tag.
    pub const ALL: [FlowDirection; 6] = [
        FlowDirection::Still,
        FlowDirection::North,
        FlowDirection::East,
        FlowDirection::South,
        FlowDirection::West,
        FlowDirection::Down,
    ];

    /// Code part used in variant codes.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Still => "still",
            Self::North => "n",
            Self::East => "e",
            Self::South => "s",
            Self::West => "w",
            Self::Down => "d",
        }
    }

    /// Parses a code part.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flow| flow.code() == code)
    }

    /// The flow tag for a horizontal compass direction. Diagonals have none.
    #[must_use]
    pub const fn from_cardinal(cardinal: Cardinal) -> Option<Self> {
        match cardinal {
            Cardinal::North => Some(Self::North),
            Cardinal::East => Some(Self::East),
            Cardinal::South => Some(Self::South),
            Cardinal::West => Some(Self::West),
            _ => None,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// The liquid part of a block record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidProperties {
    /// Liquid type, e.g. `water`.
    pub code: String,
    /// Volume in `1..=7`.
    pub level: i32,
    /// Flow tag.
    pub flow: FlowDirection,
}

/// A block record. Identities resolve to these through the [`BlockRegistry`].
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Identity assigned by the registry.
    pub id: BlockStateId,
    /// Unique block code.
    pub code: String,
    /// How easily spreading liquid or placement displaces this block.
    pub replaceable: i32,
    /// Liquid barrier height per face, indexed by [`Direction::index`].
    pub barrier: [f32; 6],
    /// Whether each face is solid, indexed by [`Direction::index`].
    pub side_solid: [bool; 6],
    /// Set for liquid variants.
    pub liquid: Option<LiquidProperties>,
}

impl Block {
    /// A record with no barriers and no solid faces.
    #[must_use]
    pub fn new(code: impl Into<String>, replaceable: i32) -> Self {
        Self {
            id: BlockStateId::AIR,
            code: code.into(),
            replaceable,
            barrier: [0.0; 6],
            side_solid: [false; 6],
            liquid: None,
        }
    }

    /// A full cube: every face blocks liquid and is solid.
    #[must_use]
    pub fn full_solid(code: impl Into<String>) -> Self {
        Self {
            barrier: [1.0; 6],
            side_solid: [true; 6],
            ..Self::new(code, 0)
        }
    }

    /// A bottom slab: the floor is solid, the sides block liquid up to half height.
    #[must_use]
    pub fn bottom_slab(code: impl Into<String>) -> Self {
        let mut block = Self::new(code, 0).with_barrier(Direction::Down, 1.0);
        for face in Direction::HORIZONTALS {
            block = block.with_barrier(face, 0.5);
        }
        block.side_solid[Direction::Down.index()] = true;
        block
    }

    fn liquid_variant(code: &str, level: i32, flow: FlowDirection) -> Self {
        Self {
            liquid: Some(LiquidProperties {
                code: code.to_owned(),
                level,
                flow,
            }),
            ..Self::new(format!("{code}-{}-{level}", flow.code()), LIQUID_REPLACEABILITY)
        }
    }

    /// Sets the barrier height of one face.
    #[must_use]
    pub fn with_barrier(mut self, face: Direction, height: f32) -> Self {
        self.barrier[face.index()] = height.clamp(0.0, 1.0);
        self
    }

    /// Marks one face as solid.
    #[must_use]
    pub fn with_solid_side(mut self, face: Direction) -> Self {
        self.side_solid[face.index()] = true;
        self
    }

    /// Liquid level, `0` for anything that is not a liquid.
    #[inline]
    #[must_use]
    pub fn liquid_level(&self) -> i32 {
        self.liquid.as_ref().map_or(0, |liquid| liquid.level)
    }

    /// Liquid code, if this is a liquid.
    #[must_use]
    pub fn liquid_code(&self) -> Option<&str> {
        self.liquid.as_ref().map(|liquid| liquid.code.as_str())
    }

    /// Flow tag, if this is a liquid.
    #[must_use]
    pub fn flow(&self) -> Option<FlowDirection> {
        self.liquid.as_ref().map(|liquid| liquid.flow)
    }

    /// Returns true for liquid variants.
    #[inline]
    #[must_use]
    pub const fn is_liquid(&self) -> bool {
        self.liquid.is_some()
    }

    /// Returns true for a full liquid cell.
    #[must_use]
    pub fn is_source(&self) -> bool {
        self.liquid_level() == MAX_LEVEL
    }

    /// Returns true if both blocks are liquids of the same type.
    #[must_use]
    pub fn is_same_liquid(&self, other: &Block) -> bool {
        self.liquid_code()
            .is_some_and(|code| other.liquid_code() == Some(code))
    }

    /// Barrier height of a face in `[0, 1]`.
    #[inline]
    #[must_use]
    pub const fn barrier_height(&self, face: Direction) -> f32 {
        self.barrier[face.index()]
    }

    /// Returns true if the face is solid.
    #[inline]
    #[must_use]
    pub const fn side_is_solid(&self, face: Direction) -> bool {
        self.side_solid[face.index()]
    }
}
