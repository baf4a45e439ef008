//! src/world/level.rs
//!
//! Level descriptors: grid size, start, goal and walls, plus the optional
//! metadata used for the editor budget and star rating.
//!
//! The JSON form is
//! `{size:{width,height}, player:{x,y,direction}, goal:{x,y}, walls:[{x,y}]}`
//! with `objective`, `maxBlocks` and `targetSteps` optional.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::grid::{Direction, Position};

/// Largest accepted grid side.
pub const MAX_GRID_SIDE: u32 = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }
}

/// Starting cell and facing of the robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Start {
    pub x: i32,
    pub y: i32,
    pub direction: Direction,
}

impl Start {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub size: GridSize,
    pub player: Start,
    pub goal: Position,
    #[serde(default)]
    pub walls: Vec<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    /// Block budget enforced by the workspace editor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_blocks: Option<usize>,
    /// Par used for the star rating.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_steps: Option<u32>,
}

#[derive(Error, Debug)]
pub enum LevelError {
    #[error("cannot read level file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid level JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },

    #[error("grid is at most {max}x{max}, got {width}x{height}", max = MAX_GRID_SIDE)]
    GridTooLarge { width: u32, height: u32 },

    #[error("player start ({}, {}) is outside the grid", .0.x, .0.y)]
    PlayerOutside(Position),

    #[error("goal ({}, {}) is outside the grid", .0.x, .0.y)]
    GoalOutside(Position),

    #[error("wall ({}, {}) is outside the grid", .0.x, .0.y)]
    WallOutside(Position),

    #[error("player starts inside a wall")]
    PlayerOnWall,

    #[error("goal is inside a wall")]
    GoalOnWall,

    #[error("no built-in level {0}")]
    UnknownLevel(usize),
}

impl Level {
    /// Parse and validate a JSON level descriptor.
    pub fn from_json(text: &str) -> Result<Self, LevelError> {
        let level: Level = serde_json::from_str(text)?;
        level.validate()?;
        Ok(level)
    }

    pub fn validate(&self) -> Result<(), LevelError> {
        let GridSize { width, height } = self.size;
        if width == 0 || height == 0 {
            return Err(LevelError::EmptyGrid { width, height });
        }
        if width > MAX_GRID_SIDE || height > MAX_GRID_SIDE {
            return Err(LevelError::GridTooLarge { width, height });
        }
        let start = self.player.position();
        if !self.size.contains(start) {
            return Err(LevelError::PlayerOutside(start));
        }
        if !self.size.contains(self.goal) {
            return Err(LevelError::GoalOutside(self.goal));
        }
        if let Some(wall) = self.walls.iter().find(|w| !self.size.contains(**w)) {
            return Err(LevelError::WallOutside(*wall));
        }
        if self.walls.contains(&start) {
            return Err(LevelError::PlayerOnWall);
        }
        if self.walls.contains(&self.goal) {
            return Err(LevelError::GoalOnWall);
        }
        Ok(())
    }

    /// Star rating for a successful run, when the level declares a par.
    ///
    /// Efficiency is `score / (target_steps * 10)`: 1.5 or better earns three
    /// stars, 1.0 or better two, anything else one.
    pub fn stars(&self, score: u32) -> Option<u8> {
        let target = self.target_steps.filter(|t| *t > 0)?;
        let efficiency = score as f64 / (target as f64 * 10.0);
        Some(if efficiency >= 1.5 {
            3
        } else if efficiency >= 1.0 {
            2
        } else {
            1
        })
    }
}

fn wall(x: i32, y: i32) -> Position {
    Position::new(x, y)
}

/// The levels shipped with the game, in play order.
pub fn builtin() -> Vec<Level> {
    vec![
        Level {
            size: GridSize {
                width: 5,
                height: 5,
            },
            player: Start {
                x: 0,
                y: 0,
                direction: Direction::East,
            },
            goal: Position::new(4, 0),
            walls: Vec::new(),
            objective: Some("Reach the treasure chest!".into()),
            max_blocks: Some(5),
            target_steps: Some(4),
        },
        Level {
            size: GridSize {
                width: 5,
                height: 5,
            },
            player: Start {
                x: 0,
                y: 0,
                direction: Direction::East,
            },
            goal: Position::new(4, 2),
            walls: vec![wall(2, 0), wall(2, 1)],
            objective: Some("Get around the wall to the treasure chest!".into()),
            max_blocks: Some(8),
            target_steps: Some(6),
        },
        Level {
            size: GridSize {
                width: 6,
                height: 4,
            },
            player: Start {
                x: 0,
                y: 0,
                direction: Direction::East,
            },
            goal: Position::new(5, 3),
            walls: vec![wall(1, 1), wall(2, 1), wall(3, 1), wall(4, 1)],
            objective: Some("Use repeat to move efficiently!".into()),
            max_blocks: Some(6),
            target_steps: Some(8),
        },
    ]
}

/// Look up a built-in level by its 1-based number.
pub fn builtin_level(number: usize) -> Result<Level, LevelError> {
    number
        .checked_sub(1)
        .and_then(|idx| builtin().into_iter().nth(idx))
        .ok_or(LevelError::UnknownLevel(number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_descriptor_with_defaults() {
        let level = Level::from_json(
            r#"{"size":{"width":5,"height":5},
                "player":{"x":0,"y":0,"direction":"east"},
                "goal":{"x":3,"y":0}}"#,
        )
        .unwrap();
        assert!(level.walls.is_empty());
        assert_eq!(level.player.direction, Direction::East);
        assert_eq!(level.goal, Position::new(3, 0));
        assert_eq!(level.max_blocks, None);
    }

    #[test]
    fn test_parse_camel_case_metadata() {
        let level = Level::from_json(
            r#"{"size":{"width":4,"height":2},
                "player":{"x":0,"y":1,"direction":"north"},
                "goal":{"x":3,"y":0},
                "walls":[{"x":1,"y":1}],
                "maxBlocks":7,"targetSteps":5}"#,
        )
        .unwrap();
        assert_eq!(level.max_blocks, Some(7));
        assert_eq!(level.target_steps, Some(5));
        assert_eq!(level.walls, vec![Position::new(1, 1)]);
    }

    #[test]
    fn test_bad_direction_is_rejected() {
        let err = Level::from_json(
            r#"{"size":{"width":2,"height":2},
                "player":{"x":0,"y":0,"direction":"up"},
                "goal":{"x":1,"y":1}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, LevelError::Json(_)));
    }

    #[test]
    fn test_validation_errors() {
        let mut level = builtin_level(1).unwrap();
        level.goal = Position::new(5, 0);
        assert!(matches!(level.validate(), Err(LevelError::GoalOutside(_))));

        let mut level = builtin_level(1).unwrap();
        level.walls.push(Position::new(0, 0));
        assert!(matches!(level.validate(), Err(LevelError::PlayerOnWall)));

        let mut level = builtin_level(1).unwrap();
        level.walls.push(Position::new(4, 0));
        assert!(matches!(level.validate(), Err(LevelError::GoalOnWall)));

        let mut level = builtin_level(1).unwrap();
        level.size.height = 0;
        assert!(matches!(level.validate(), Err(LevelError::EmptyGrid { .. })));
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        let err = Level::from_json(
            r#"{"size":{"width":4294967295,"height":1},
                "player":{"x":2147483647,"y":0,"direction":"east"},
                "goal":{"x":0,"y":0}}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LevelError::GridTooLarge {
                width: 4294967295,
                height: 1
            }
        ));

        let mut level = builtin_level(1).unwrap();
        level.size.width = MAX_GRID_SIDE;
        level.size.height = MAX_GRID_SIDE;
        level.validate().unwrap();
        level.size.height = MAX_GRID_SIDE + 1;
        assert!(matches!(
            level.validate(),
            Err(LevelError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn test_builtin_levels_are_valid() {
        for level in builtin() {
            level.validate().unwrap();
        }
        assert!(matches!(builtin_level(0), Err(LevelError::UnknownLevel(0))));
        assert!(matches!(builtin_level(4), Err(LevelError::UnknownLevel(4))));
    }

    #[test]
    fn test_stars() {
        let level = builtin_level(1).unwrap();
        // par 4: 80 / 40 = 2.0
        assert_eq!(level.stars(80), Some(3));
        assert_eq!(level.stars(40), Some(2));
        assert_eq!(level.stars(10), Some(1));

        let mut no_par = level.clone();
        no_par.target_steps = None;
        assert_eq!(no_par.stars(80), None);
    }
}
