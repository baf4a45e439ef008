//! src/world/generate.rs
//!
//! Random practice levels. Every generated level is solvable: the goal is
//! reachable from the start through open cells.

use std::collections::{HashSet, VecDeque};

use rand::Rng;
use rand::seq::SliceRandom;

use super::grid::{Direction, Position};
use super::level::{GridSize, Level, Start};

const MAX_ATTEMPTS: usize = 32;

/// Build a random `width` x `height` level with up to `wall_count` walls.
///
/// Falls back to an open grid if no solvable layout turns up within a few
/// attempts. Grids smaller than 2 cells are widened to 2x1.
pub fn generate<R: Rng + ?Sized>(
    rng: &mut R,
    width: u32,
    height: u32,
    wall_count: usize,
) -> Level {
    let size = if width as u64 * height as u64 >= 2 {
        GridSize { width, height }
    } else {
        GridSize {
            width: 2,
            height: 1,
        }
    };

    let mut cells: Vec<Position> = (0..size.height as i32)
        .flat_map(|y| (0..size.width as i32).map(move |x| Position::new(x, y)))
        .collect();

    for attempt in 0..MAX_ATTEMPTS {
        cells.shuffle(rng);
        // the first two cells stay open for the start and goal
        let walls: Vec<Position> = cells[2..]
            .iter()
            .copied()
            .take(wall_count.min(cells.len() - 2))
            .collect();
        if reachable(size, cells[0], cells[1], &walls) {
            tracing::debug!(attempt, walls = walls.len(), "generated level");
            return assemble(rng, size, cells[0], cells[1], walls);
        }
    }

    tracing::debug!("no solvable wall layout, generating an open grid");
    cells.shuffle(rng);
    assemble(rng, size, cells[0], cells[1], Vec::new())
}

fn assemble<R: Rng + ?Sized>(
    rng: &mut R,
    size: GridSize,
    start: Position,
    goal: Position,
    walls: Vec<Position>,
) -> Level {
    let direction = Direction::ALL[rng.random_range(0..Direction::ALL.len())];
    Level {
        size,
        player: Start {
            x: start.x,
            y: start.y,
            direction,
        },
        goal,
        walls,
        objective: Some("Reach the treasure chest on a random map!".into()),
        max_blocks: None,
        target_steps: None,
    }
}

/// Breadth-first search over open cells; facing is irrelevant because turns
/// are free to make.
pub fn reachable(size: GridSize, start: Position, goal: Position, walls: &[Position]) -> bool {
    let walls: HashSet<Position> = walls.iter().copied().collect();
    let mut seen = HashSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(cell) = queue.pop_front() {
        if cell == goal {
            return true;
        }
        for dir in Direction::ALL {
            let Some(next) = cell.offset(dir) else {
                continue;
            };
            if size.contains(next) && !walls.contains(&next) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}
