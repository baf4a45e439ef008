//! src/game/config.rs
//!
//! Configuration values for the run loop, pacing and the control server.
//!
//! Loaded from an optional `robo.toml` in the working directory, then the
//! file named by `ROBO_CONFIG`, then `ROBO__*` environment variables
//! (`ROBO__STEP_DELAY_MS=200`). Every key has a default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::program::DEFAULT_MAX_STEPS;
use crate::world::level::{self, Level, LevelError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Built-in level to start on (1-based).
    pub level: usize,

    /// JSON level descriptor to load instead of a built-in level.
    pub level_file: Option<PathBuf>,

    /// Leaf commands a run may execute before it is stopped.
    pub max_steps: usize,

    /// Pause after each command, in milliseconds.
    pub step_delay_ms: u64,

    /// Duration of the robot's move animation, in milliseconds.
    pub move_duration_ms: u64,

    /// Target frame time of the UI loop.
    pub frame_ms: u64,

    /// Runs kept in the history panel.
    pub history_len: usize,

    pub remote_addr: String,
    pub remote_enabled: bool,
}

impl GameConfig {
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    pub fn move_duration(&self) -> Duration {
        Duration::from_millis(self.move_duration_ms)
    }

    pub fn frame_time(&self) -> Duration {
        Duration::from_millis(self.frame_ms.max(1))
    }

    /// The level to start on, with a label for the title bar.
    pub fn initial_level(&self) -> Result<(Level, String), LevelError> {
        match &self.level_file {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                let level = Level::from_json(&text)?;
                Ok((level, file_label(path)))
            }
            None => {
                let level = level::builtin_level(self.level)?;
                Ok((level, format!("Level {}", self.level)))
            }
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Custom level".into())
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            level: 1,
            level_file: None,
            max_steps: DEFAULT_MAX_STEPS,
            step_delay_ms: 500,
            move_duration_ms: 500,
            frame_ms: 50,
            history_len: 50,
            remote_addr: "127.0.0.1:4000".into(),
            remote_enabled: true,
        }
    }
}

/// Layer the config sources; `path` is required to exist when given.
pub fn load_config(path: Option<&Path>) -> Result<GameConfig, config::ConfigError> {
    let mut builder =
        config::Config::builder().add_source(config::File::with_name("robo").required(false));

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("ROBO")
            .separator("__")
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}

/// `load_config` with the path taken from `ROBO_CONFIG`.
pub fn load_from_env() -> Result<GameConfig, config::ConfigError> {
    let path = std::env::var_os("ROBO_CONFIG").map(PathBuf::from);
    load_config(path.as_deref())
}
