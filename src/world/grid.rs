//! src/world/grid.rs
//!
//! Grid coordinates, facing, and the mutable world the robot lives in.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::level::Level;

/// A cell on the grid. `x` grows east, `y` grows south.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step towards `dir`, or `None` past the
    /// coordinate range.
    pub fn offset(self, dir: Direction) -> Option<Self> {
        let (dx, dy) = dir.delta();
        Some(Self::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
            Direction::North => (0, -1),
            Direction::South => (0, 1),
        }
    }

    /// Counter-clockwise: north -> west -> south -> east -> north.
    pub fn turn_left(self) -> Self {
        match self {
            Direction::North => Direction::West,
            Direction::West => Direction::South,
            Direction::South => Direction::East,
            Direction::East => Direction::North,
        }
    }

    /// Clockwise: north -> east -> south -> west -> north.
    pub fn turn_right(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }

    /// Glyph used to draw the robot facing this way.
    pub fn arrow(self) -> &'static str {
        match self {
            Direction::North => "▲",
            Direction::East => "▶",
            Direction::South => "▼",
            Direction::West => "◀",
        }
    }
}

/// Why a forward move was refused. The world is left untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("cannot leave the grid at ({}, {})", .0.x, .0.y)]
    OutOfBounds(Position),

    #[error("blocked by a wall at ({}, {})", .0.x, .0.y)]
    Wall(Position),
}

/// The single in-memory world instance: a level plus where the robot is now.
#[derive(Clone, Debug)]
pub struct World {
    level: Level,
    walls: HashSet<Position>,
    pub player: Position,
    pub facing: Direction,
}

impl World {
    pub fn new(level: Level) -> Self {
        let walls = level.walls.iter().copied().collect();
        let player = level.player.position();
        let facing = level.player.direction;
        Self {
            level,
            walls,
            player,
            facing,
        }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    /// Put the robot back on its starting cell and facing.
    pub fn reset(&mut self) {
        self.player = self.level.player.position();
        self.facing = self.level.player.direction;
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        self.level.size.contains(pos)
    }

    pub fn is_wall(&self, pos: Position) -> bool {
        self.walls.contains(&pos)
    }

    pub fn at_goal(&self) -> bool {
        self.player == self.level.goal
    }

    /// Step one cell forward, committing only when the target is open.
    pub fn try_move_forward(&mut self) -> Result<Position, MoveError> {
        let Some(target) = self.player.offset(self.facing) else {
            return Err(MoveError::OutOfBounds(self.player));
        };
        if !self.in_bounds(target) {
            return Err(MoveError::OutOfBounds(target));
        }
        if self.is_wall(target) {
            return Err(MoveError::Wall(target));
        }
        self.player = target;
        Ok(target)
    }

    pub fn turn_left(&mut self) -> Direction {
        self.facing = self.facing.turn_left();
        self.facing
    }

    pub fn turn_right(&mut self) -> Direction {
        self.facing = self.facing.turn_right();
        self.facing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::level::{GridSize, Start};

    fn open_level(width: u32, height: u32) -> Level {
        Level {
            size: GridSize { width, height },
            player: Start {
                x: 0,
                y: 0,
                direction: Direction::East,
            },
            goal: Position::new(width as i32 - 1, height as i32 - 1),
            walls: Vec::new(),
            objective: None,
            max_blocks: None,
            target_steps: None,
        }
    }

    #[test]
    fn test_turns_cycle_back_after_four() {
        for dir in Direction::ALL {
            let mut d = dir;
            for _ in 0..4 {
                d = d.turn_left();
            }
            assert_eq!(d, dir);
            assert_eq!(dir.turn_left().turn_right(), dir);
        }
        assert_eq!(Direction::North.turn_left(), Direction::West);
        assert_eq!(Direction::North.turn_right(), Direction::East);
        assert_eq!(Direction::East.turn_right(), Direction::South);
    }

    #[test]
    fn test_move_forward_commits_position() {
        let mut world = World::new(open_level(5, 5));
        assert_eq!(world.try_move_forward(), Ok(Position::new(1, 0)));
        assert_eq!(world.player, Position::new(1, 0));
    }

    #[test]
    fn test_move_off_grid_leaves_position_untouched() {
        let mut world = World::new(open_level(5, 5));
        world.facing = Direction::North;
        assert_eq!(
            world.try_move_forward(),
            Err(MoveError::OutOfBounds(Position::new(0, -1)))
        );
        assert_eq!(world.player, Position::new(0, 0));
        assert_eq!(world.facing, Direction::North);
    }

    #[test]
    fn test_move_into_wall_leaves_position_untouched() {
        let mut level = open_level(5, 5);
        level.walls.push(Position::new(1, 0));
        let mut world = World::new(level);
        assert_eq!(
            world.try_move_forward(),
            Err(MoveError::Wall(Position::new(1, 0)))
        );
        assert_eq!(world.player, Position::new(0, 0));
    }

    #[test]
    fn test_offset_stops_at_coordinate_range() {
        let edge = Position::new(i32::MAX, i32::MIN);
        assert_eq!(edge.offset(Direction::East), None);
        assert_eq!(edge.offset(Direction::North), None);
        assert_eq!(
            edge.offset(Direction::West),
            Some(Position::new(i32::MAX - 1, i32::MIN))
        );
    }

    #[test]
    fn test_move_past_coordinate_range_is_out_of_bounds() {
        let mut world = World::new(open_level(2, 1));
        world.player = Position::new(i32::MAX, 0);
        assert_eq!(
            world.try_move_forward(),
            Err(MoveError::OutOfBounds(Position::new(i32::MAX, 0)))
        );
        assert_eq!(world.player, Position::new(i32::MAX, 0));
    }

    #[test]
    fn test_reset_restores_start() {
        let mut world = World::new(open_level(3, 3));
        world.try_move_forward().unwrap();
        world.turn_right();
        world.reset();
        assert_eq!(world.player, Position::new(0, 0));
        assert_eq!(world.facing, Direction::East);
    }
}
