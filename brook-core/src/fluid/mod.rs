//! Finite liquid rules.
//!
//! Every liquid cell holds a level in `1..=7`. Updates move that volume down
//! and sideways without ever creating or destroying it, with one exception:
//! a source over a supported drop may refill the drop as a new source.
//!
//! - [`classifier`] decides which faces liquid may cross and which way it flows
//! - [`paths`] finds nearby drops a blocked cell can reach
//! - [`spreading`] redistributes one cell's volume
//! - [`finite`] ties them into the [`BlockBehaviour`](crate::behaviour::BlockBehaviour)
//!   attached to every cell of one liquid

pub mod classifier;
pub mod finite;
pub mod paths;
pub mod spreading;

#[cfg(test)]
pub(crate) mod test_support;

pub use finite::FiniteSpreadingLiquid;
pub use spreading::{SpreadOutcome, spread_and_update_liquid_levels};
