//! src/program/command.rs
//!
//! The command tree and its JSON block format `{type, count?, children?}`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Iterations used when a repeat block carries no count.
pub const DEFAULT_REPEAT_COUNT: u32 = 2;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    MoveForward,
    TurnLeft,
    TurnRight,
    Repeat { count: u32, children: Vec<Command> },
    /// Conditional placeholder; runs as a no-op.
    IfWall,
    /// A block type this interpreter does not know; fails when executed.
    Unknown(String),
}

impl Command {
    pub fn repeat(count: u32, children: Vec<Command>) -> Self {
        Command::Repeat { count, children }
    }

    /// The `type` tag used in the JSON form.
    pub fn kind(&self) -> &str {
        match self {
            Command::MoveForward => "move-forward",
            Command::TurnLeft => "turn-left",
            Command::TurnRight => "turn-right",
            Command::Repeat { .. } => "repeat",
            Command::IfWall => "if-wall",
            Command::Unknown(kind) => kind,
        }
    }

    /// Leaf commands met in one pass over this subtree. A repeat that never
    /// runs its body contributes nothing.
    pub fn leaf_count(&self) -> usize {
        match self {
            Command::Repeat { count: 0, .. } => 0,
            Command::Repeat { children, .. } => leaf_count(children),
            _ => 1,
        }
    }
}

pub fn leaf_count(commands: &[Command]) -> usize {
    commands
        .iter()
        .fold(0usize, |acc, c| acc.saturating_add(c.leaf_count()))
}

/// Wire shape of a single block.
#[derive(Serialize, Deserialize)]
struct RawBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<Command>>,
}

impl From<RawBlock> for Command {
    fn from(raw: RawBlock) -> Self {
        match raw.kind.as_str() {
            "move-forward" => Command::MoveForward,
            "turn-left" => Command::TurnLeft,
            "turn-right" => Command::TurnRight,
            "if-wall" => Command::IfWall,
            "repeat" => Command::Repeat {
                // absent and zero both mean the default
                count: match raw.count {
                    None | Some(0) => DEFAULT_REPEAT_COUNT,
                    Some(n) => n,
                },
                children: raw.children.unwrap_or_default(),
            },
            _ => Command::Unknown(raw.kind),
        }
    }
}

impl<'de> Deserialize<'de> for Command {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawBlock::deserialize(deserializer).map(Command::from)
    }
}

impl Serialize for Command {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let raw = match self {
            Command::Repeat { count, children } => RawBlock {
                kind: self.kind().to_string(),
                count: Some(*count),
                children: Some(children.clone()),
            },
            _ => RawBlock {
                kind: self.kind().to_string(),
                count: None,
                children: None,
            },
        };
        raw.serialize(serializer)
    }
}

/// An ordered sequence of commands, serialized as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Program {
    pub commands: Vec<Command>,
}

impl Program {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> String {
        // a Vec of plain enums cannot fail to serialize
        serde_json::to_string(self).unwrap_or_else(|_| "[]".into())
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        leaf_count(&self.commands)
    }
}

impl From<Vec<Command>> for Program {
    fn from(commands: Vec<Command>) -> Self {
        Self::new(commands)
    }
}
