//! Shared value types for the brook liquid simulation.
//!
//! Positions, identities, directions and the seeded random source used by
//! `brook-core`. Nothing in here knows about liquids.

pub mod direction;
pub mod math;
pub mod random;
pub mod shape;
pub mod types;

pub use direction::{Cardinal, Direction};
pub use types::{BlockPos, BlockStateId};
