// Wrapper types making it harder to accidentaly use the wrong underlying type.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::math::Vector3;

/// A raw block state id. Using the registry this id resolves to a block record
/// with its liquid type, level and flow tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockStateId(pub u16);

impl BlockStateId {
    /// The identity of the empty cell.
    pub const AIR: BlockStateId = BlockStateId(0);

    /// Returns true for the empty cell.
    #[must_use]
    pub const fn is_air(self) -> bool {
        self.0 == 0
    }
}

/// A block position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockPos(pub Vector3<i32>);

impl BlockPos {
    /// Creates a position from its coordinates.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self(Vector3::new(x, y, z))
    }

    /// X coordinate.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.0.x
    }

    /// Y coordinate.
    #[inline]
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.0.y
    }

    /// Z coordinate.
    #[inline]
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.0.z
    }

    /// Returns a new position offset by the given amounts.
    #[must_use]
    pub const fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.0.x + dx, self.0.y + dy, self.0.z + dz)
    }

    /// The position directly above.
    #[must_use]
    pub const fn above(&self) -> Self {
        self.offset(0, 1, 0)
    }

    /// The position directly below.
    #[must_use]
    pub const fn below(&self) -> Self {
        self.offset(0, -1, 0)
    }

    /// Sum of absolute coordinate differences.
    #[must_use]
    pub const fn manhattan_distance(&self, other: &BlockPos) -> i32 {
        (self.0.x - other.0.x).abs() + (self.0.y - other.0.y).abs() + (self.0.z - other.0.z).abs()
    }
}

impl Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0.x, self.0.y, self.0.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manhattan_distance() {
        let a = BlockPos::new(0, 64, 0);
        assert_eq!(a.manhattan_distance(&BlockPos::new(2, 64, -1)), 3);
        assert_eq!(a.manhattan_distance(&a.below()), 1);
        assert_eq!(a.manhattan_distance(&a), 0);
    }

    #[test]
    fn test_offsets() {
        let pos = BlockPos::new(5, 10, -3);
        assert_eq!(pos.above(), BlockPos::new(5, 11, -3));
        assert_eq!(pos.below(), BlockPos::new(5, 9, -3));
        assert_eq!(pos.offset(1, 0, 1), BlockPos::new(6, 10, -2));
        assert_eq!(pos.to_string(), "(5, 10, -3)");
    }
}
