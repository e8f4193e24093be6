//! Face and compass directions.

use crate::types::BlockPos;

/// The six faces of a cell.
///
/// The ordinal values (0-5) index per-face tables such as barrier heights.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Downward (-Y direction) - ordinal 0
    Down = 0,
    /// Upward (+Y direction) - ordinal 1
    Up = 1,
    /// North (-Z direction) - ordinal 2
    North = 2,
    /// South (+Z direction) - ordinal 3
    South = 3,
    /// West (-X direction) - ordinal 4
    West = 4,
    /// East (+X direction) - ordinal 5
    East = 5,
}

impl Direction {
    /// All six directions in array form for iteration.
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// The four horizontal directions in clockwise order starting north.
    ///
    /// Spread candidates are collected in this order, so it is also the
    /// tie-break order before any shuffling.
    pub const HORIZONTALS: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Index into per-face tables.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Down => Self::Up,
            Self::Up => Self::Down,
            Self::North => Self::South,
            Self::South => Self::North,
            Self::West => Self::East,
            Self::East => Self::West,
        }
    }

    /// Returns true for the four side faces.
    #[must_use]
    pub const fn is_horizontal(self) -> bool {
        !matches!(self, Self::Down | Self::Up)
    }

    /// Gets the offset in the given direction.
    ///
    /// Returns (dx, dy, dz) for this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32, i32) {
        match self {
            Self::Down => (0, -1, 0),
            Self::Up => (0, 1, 0),
            Self::North => (0, 0, -1),
            Self::South => (0, 0, 1),
            Self::West => (-1, 0, 0),
            Self::East => (1, 0, 0),
        }
    }

    /// Returns a new `BlockPos` relative to the given position in this direction.
    #[must_use]
    pub const fn relative(self, pos: &BlockPos) -> BlockPos {
        let (dx, dy, dz) = self.offset();
        pos.offset(dx, dy, dz)
    }

    /// The face through which `to` is entered when stepping from `from`.
    ///
    /// Returns `None` unless the two positions share a face.
    #[must_use]
    pub fn between(from: &BlockPos, to: &BlockPos) -> Option<Self> {
        let delta = (to.x() - from.x(), to.y() - from.y(), to.z() - from.z());
        Self::ALL.into_iter().find(|dir| dir.offset() == delta)
    }
}

/// The eight horizontal compass directions, diagonals included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinal {
    /// -Z
    North,
    /// +X -Z
    NorthEast,
    /// +X
    East,
    /// +X +Z
    SouthEast,
    /// +Z
    South,
    /// -X +Z
    SouthWest,
    /// -X
    West,
    /// -X -Z
    NorthWest,
}

impl Cardinal {
    /// All eight directions, clockwise from north.
    pub const ALL: [Cardinal; 8] = [
        Cardinal::North,
        Cardinal::NorthEast,
        Cardinal::East,
        Cardinal::SouthEast,
        Cardinal::South,
        Cardinal::SouthWest,
        Cardinal::West,
        Cardinal::NorthWest,
    ];

    /// Horizontal unit normal as (dx, dz).
    #[must_use]
    pub const fn normal(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
            Self::East => (1, 0),
            Self::SouthEast => (1, 1),
            Self::South => (0, 1),
            Self::SouthWest => (-1, 1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, -1),
        }
    }

    /// Returns true for the four diagonal directions.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Self::NorthEast | Self::SouthEast | Self::SouthWest | Self::NorthWest
        )
    }

    /// Returns the opposite direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::NorthEast => Self::SouthWest,
            Self::East => Self::West,
            Self::SouthEast => Self::NorthWest,
            Self::South => Self::North,
            Self::SouthWest => Self::NorthEast,
            Self::West => Self::East,
            Self::NorthWest => Self::SouthEast,
        }
    }

    /// The face direction for a non-diagonal cardinal.
    #[must_use]
    pub const fn as_direction(self) -> Option<Direction> {
        match self {
            Self::North => Some(Direction::North),
            Self::East => Some(Direction::East),
            Self::South => Some(Direction::South),
            Self::West => Some(Direction::West),
            _ => None,
        }
    }

    /// Looks up the cardinal matching a horizontal normal.
    ///
    /// Each component must be -1, 0 or 1; `(0, 0)` has no cardinal.
    #[must_use]
    pub fn from_normal(dx: i32, dz: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.normal() == (dx, dz))
    }

    /// Returns a new `BlockPos` relative to the given position in this direction.
    #[must_use]
    pub const fn relative(self, pos: &BlockPos) -> BlockPos {
        let (dx, dz) = self.normal();
        pos.offset(dx, 0, dz)
    }
}
