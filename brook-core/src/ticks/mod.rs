//! Scheduled updates.
//!
//! - [`ScheduledTick`] - A single scheduled update entry
//! - [`LevelTicks`] - The queue, unique per position and type, where the
//!   latest registration replaces any pending one

mod level_ticks;
mod scheduled_tick;

pub use level_ticks::LevelTicks;
pub use scheduled_tick::{ScheduledTick, TickKey};
