//! src/game.rs
//!
//! Top-level `game` module exposing configuration, shared state and run history.

pub mod config;
pub mod history;
pub mod shared;

/// Re-exports
pub use config::GameConfig;
pub use shared::{GameError, GameShared, SharedGame};
