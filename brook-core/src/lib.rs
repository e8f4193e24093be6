//! # Brook Core
//!
//! A finite-volume liquid simulation for voxel grids. Every liquid cell holds
//! between one and seven units of volume; scheduled updates move that volume
//! down and sideways, reshape flow tags and react with colliding liquids.
//!
//! The entry point for hosts is [`simulation::LiquidSimulation`], which owns a
//! grid, the scheduled-tick queue and the liquid behaviours.

pub mod behaviour;
pub mod block;
pub mod block_entity;
pub mod config;
pub mod error;
pub mod events;
pub mod fluid;
pub mod grid;
pub mod simulation;
pub mod ticks;

pub use behaviour::{BehaviourId, BlockBehaviour, LiquidContext};
pub use config::{BrookConfig, LiquidConfig};
pub use error::ConfigError;
pub use simulation::LiquidSimulation;
