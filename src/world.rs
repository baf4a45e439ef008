//! src/world.rs
//!
//! Top-level `world` module: grid model, level descriptors and generation.

pub mod generate;
pub mod grid;
pub mod level;

/// Re-exports
pub use grid::{Direction, MoveError, Position, World};
pub use level::{Level, LevelError};
