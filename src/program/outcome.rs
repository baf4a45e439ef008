//! src/program/outcome.rs
//!
//! Run results: the failure variants, scoring, and the external report
//! `{success, score?, error?}`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::{MoveError, Position};

/// Every way a run can end without reaching the goal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("the program is empty")]
    EmptyProgram,

    #[error("the program ran more than {0} steps")]
    StepLimitExceeded(usize),

    #[error("cannot leave the grid at ({}, {})", .0.x, .0.y)]
    OutOfBounds(Position),

    #[error("blocked by a wall at ({}, {})", .0.x, .0.y)]
    WallCollision(Position),

    #[error("the robot did not reach the goal")]
    GoalNotReached,

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

impl From<MoveError> for RunError {
    fn from(err: MoveError) -> Self {
        match err {
            MoveError::OutOfBounds(pos) => RunError::OutOfBounds(pos),
            MoveError::Wall(pos) => RunError::WallCollision(pos),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Success {
    pub score: u32,
    /// Leaf commands executed, the move that reached the goal included.
    pub steps: usize,
}

pub type RunResult = Result<Success, RunError>;

/// `max(100 - 5 * steps, 10)`.
pub fn score_for(steps: usize) -> u32 {
    let penalty = u32::try_from(steps).unwrap_or(u32::MAX).saturating_mul(5);
    100u32.saturating_sub(penalty).max(10)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunReport {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"success":false}"#.into())
    }
}

impl From<&RunResult> for RunReport {
    fn from(result: &RunResult) -> Self {
        match result {
            Ok(success) => Self {
                success: true,
                score: Some(success.score),
                error: None,
            },
            Err(err) => Self {
                success: false,
                score: None,
                error: Some(err.to_string()),
            },
        }
    }
}
