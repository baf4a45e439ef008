//! src/panels.rs
//!
//! Top-level panels module and re-exports.

pub mod grid;
pub mod help;
pub mod history;
pub mod program;
pub mod status;
pub mod title;

pub use grid::GridPanel;
pub use help::HelpPanel;
pub use history::HistoryPanel;
pub use program::ProgramPanel;
pub use status::StatusPanel;
pub use title::TitlePanel;
