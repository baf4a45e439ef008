//! src/program.rs
//!
//! Top-level `program` module: command tree, editor workspace and interpreter.

pub mod command;
pub mod interp;
pub mod outcome;
pub mod workspace;

/// Re-exports
pub use command::{Command, Program};
pub use interp::{Action, DEFAULT_MAX_STEPS, Execution, StepEvent};
pub use outcome::{RunError, RunReport, RunResult};
pub use workspace::{BlockKind, EditError, Workspace};
