//! src/program/workspace.rs
//!
//! The block workspace: the editable program the player assembles.
//!
//! Blocks are appended at the top level, or into the selected repeat while
//! nest mode is on. A repeat may not be dropped inside another repeat, though
//! programs loaded from JSON can nest them freely.

use thiserror::Error;

use super::command::{Command, DEFAULT_REPEAT_COUNT, Program};

pub const MIN_REPEAT_COUNT: u32 = 1;
pub const MAX_REPEAT_COUNT: u32 = 10;

/// Palette entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    MoveForward,
    TurnLeft,
    TurnRight,
    Repeat,
    IfWall,
}

impl BlockKind {
    pub fn command(self) -> Command {
        match self {
            BlockKind::MoveForward => Command::MoveForward,
            BlockKind::TurnLeft => Command::TurnLeft,
            BlockKind::TurnRight => Command::TurnRight,
            BlockKind::Repeat => Command::repeat(DEFAULT_REPEAT_COUNT, Vec::new()),
            BlockKind::IfWall => Command::IfWall,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditError {
    #[error("a repeat cannot go inside another repeat")]
    NestedRepeat,

    #[error("this level allows at most {0} blocks")]
    OverBudget(usize),

    #[error("select a repeat block first")]
    NoRepeatSelected,

    #[error("nothing to remove")]
    Empty,
}

#[derive(Clone, Debug, Default)]
pub struct Workspace {
    blocks: Vec<Command>,
    selected: Option<usize>,
    nest: bool,
    max_blocks: Option<usize>,
}

fn count_blocks(commands: &[Command]) -> usize {
    commands
        .iter()
        .map(|c| match c {
            Command::Repeat { children, .. } => 1 + count_blocks(children),
            _ => 1,
        })
        .sum()
}

impl Workspace {
    pub fn new(max_blocks: Option<usize>) -> Self {
        Self {
            max_blocks,
            ..Self::default()
        }
    }

    pub fn blocks(&self) -> &[Command] {
        &self.blocks
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_nesting(&self) -> bool {
        self.nest
    }

    pub fn max_blocks(&self) -> Option<usize> {
        self.max_blocks
    }

    pub fn set_max_blocks(&mut self, max_blocks: Option<usize>) {
        self.max_blocks = max_blocks;
    }

    /// Every block on the workspace, nested ones included.
    pub fn block_count(&self) -> usize {
        count_blocks(&self.blocks)
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn selected_repeat(&mut self) -> Option<&mut Vec<Command>> {
        match self.selected.and_then(|i| self.blocks.get_mut(i)) {
            Some(Command::Repeat { children, .. }) => Some(children),
            _ => None,
        }
    }

    pub fn add(&mut self, kind: BlockKind) -> Result<(), EditError> {
        if let Some(max) = self.max_blocks {
            if self.block_count() >= max {
                return Err(EditError::OverBudget(max));
            }
        }
        if self.nest {
            if kind == BlockKind::Repeat {
                return Err(EditError::NestedRepeat);
            }
            let children = self.selected_repeat().ok_or(EditError::NoRepeatSelected)?;
            children.push(kind.command());
            return Ok(());
        }
        self.blocks.push(kind.command());
        self.selected = Some(self.blocks.len() - 1);
        Ok(())
    }

    /// Remove the selected block, or the last block inside the selected
    /// repeat while nesting.
    pub fn remove(&mut self) -> Result<Command, EditError> {
        if self.nest {
            let children = self.selected_repeat().ok_or(EditError::NoRepeatSelected)?;
            return children.pop().ok_or(EditError::Empty);
        }
        let idx = self.selected.ok_or(EditError::Empty)?;
        if idx >= self.blocks.len() {
            return Err(EditError::Empty);
        }
        let removed = self.blocks.remove(idx);
        self.selected = match self.blocks.len() {
            0 => None,
            len => Some(idx.min(len - 1)),
        };
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.selected = None;
        self.nest = false;
    }

    pub fn select_prev(&mut self) {
        self.nest = false;
        self.selected = match self.selected {
            Some(i) => Some(i.saturating_sub(1)),
            None if !self.blocks.is_empty() => Some(self.blocks.len() - 1),
            None => None,
        };
    }

    pub fn select_next(&mut self) {
        self.nest = false;
        self.selected = match self.selected {
            Some(i) if i + 1 < self.blocks.len() => Some(i + 1),
            Some(i) => Some(i),
            None if !self.blocks.is_empty() => Some(0),
            None => None,
        };
    }

    /// Toggle nest mode. Turning it on needs a selected repeat.
    pub fn toggle_nest(&mut self) -> Result<bool, EditError> {
        if self.nest {
            self.nest = false;
            return Ok(false);
        }
        self.selected_repeat().ok_or(EditError::NoRepeatSelected)?;
        self.nest = true;
        Ok(true)
    }

    /// Change the selected repeat's count, clamped to the editor range.
    pub fn adjust_count(&mut self, delta: i32) -> Result<u32, EditError> {
        let block = self.selected.and_then(|i| self.blocks.get_mut(i));
        let Some(Command::Repeat { count, .. }) = block else {
            return Err(EditError::NoRepeatSelected);
        };
        let next = (*count as i64 + delta as i64)
            .clamp(MIN_REPEAT_COUNT as i64, MAX_REPEAT_COUNT as i64);
        *count = next as u32;
        Ok(*count)
    }

    /// The program the blocks spell out.
    pub fn program(&self) -> Program {
        Program::new(self.blocks.clone())
    }

    /// Replace the workspace contents with a loaded program.
    pub fn load(&mut self, program: Program) {
        self.blocks = program.commands;
        self.selected = self.blocks.len().checked_sub(1);
        self.nest = false;
    }
}
