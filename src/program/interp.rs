//! src/program/interp.rs
//!
//! Resumable interpreter for command trees.
//!
//! An [`Execution`] keeps an explicit frame stack instead of recursing, so each
//! call to [`Execution::step`] runs exactly one leaf command against the world
//! and hands control back. The frame loop decides how long to wait before the
//! next step, which is what lets the robot animate between commands.
//!
//! Rules:
//! - a run of an empty program fails immediately;
//! - every leaf (move, turn, if-wall, unknown) counts as one step and the run
//!   fails once it would exceed `max_steps`;
//! - the goal is checked after every leaf, and reaching it ends the run with
//!   `score_for(steps)`;
//! - the first failing command ends the run, leaving the world where the
//!   previous command put it;
//! - running out of commands off the goal fails with `GoalNotReached`.

use crate::world::{Direction, Level, Position, World};

use super::command::{Command, Program, leaf_count};
use super::outcome::{RunError, RunResult, Success, score_for};

/// Leaf commands a single run may execute.
pub const DEFAULT_MAX_STEPS: usize = 50;

/// What one step did to the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Moved { from: Position, to: Position },
    Turned(Direction),
    /// A no-op leaf such as the `if-wall` placeholder.
    Idle,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepEvent {
    Acted {
        action: Action,
        /// Steps executed so far, this one included.
        step: usize,
    },
    Finished(RunResult),
}

/// One level of the command tree being walked.
#[derive(Debug)]
struct Frame {
    commands: Vec<Command>,
    next: usize,
    /// Passes left over `commands`, the current one included.
    remaining: u32,
}

#[derive(Debug)]
pub struct Execution {
    frames: Vec<Frame>,
    steps: usize,
    max_steps: usize,
    done: Option<RunResult>,
}

impl Execution {
    /// Prepare a run. Empty programs are rejected before anything executes.
    pub fn start(program: &Program, max_steps: usize) -> Result<Self, RunError> {
        if program.is_empty() {
            return Err(RunError::EmptyProgram);
        }
        Ok(Self {
            frames: vec![Frame {
                commands: program.commands.clone(),
                next: 0,
                remaining: 1,
            }],
            steps: 0,
            max_steps,
            done: None,
        })
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_finished(&self) -> bool {
        self.done.is_some()
    }

    /// Index of the top-level block that issued the latest step.
    pub fn current_block(&self) -> Option<usize> {
        self.frames.first().and_then(|f| f.next.checked_sub(1))
    }

    /// Run one leaf command, or report how the run ended.
    ///
    /// Once finished, further calls keep returning the same result without
    /// touching the world.
    pub fn step(&mut self, world: &mut World) -> StepEvent {
        if let Some(result) = &self.done {
            return StepEvent::Finished(result.clone());
        }
        match self.advance(world) {
            Ok(action) => {
                if world.at_goal() {
                    let steps = self.steps;
                    self.done = Some(Ok(Success {
                        score: score_for(steps),
                        steps,
                    }));
                }
                StepEvent::Acted {
                    action,
                    step: self.steps,
                }
            }
            Err(err) => {
                let result = Err(err);
                self.done = Some(result.clone());
                StepEvent::Finished(result)
            }
        }
    }

    /// Walk the frame stack to the next leaf and execute it.
    fn advance(&mut self, world: &mut World) -> Result<Action, RunError> {
        loop {
            let Some(frame) = self.frames.last_mut() else {
                return Err(RunError::GoalNotReached);
            };
            if frame.next >= frame.commands.len() {
                if frame.remaining > 1 {
                    frame.remaining -= 1;
                    frame.next = 0;
                } else {
                    self.frames.pop();
                }
                continue;
            }

            let command = frame.commands[frame.next].clone();
            frame.next += 1;

            if let Command::Repeat { count, children } = command {
                // bodies with no reachable leaf would spin without ever
                // hitting the step limit
                if count > 0 && leaf_count(&children) > 0 {
                    self.frames.push(Frame {
                        commands: children,
                        next: 0,
                        remaining: count,
                    });
                }
                continue;
            }

            if self.steps >= self.max_steps {
                return Err(RunError::StepLimitExceeded(self.max_steps));
            }
            let action = match command {
                Command::MoveForward => {
                    let from = world.player;
                    let to = world.try_move_forward()?;
                    Action::Moved { from, to }
                }
                Command::TurnLeft => Action::Turned(world.turn_left()),
                Command::TurnRight => Action::Turned(world.turn_right()),
                Command::IfWall => Action::Idle,
                Command::Unknown(kind) => return Err(RunError::UnknownCommand(kind)),
                Command::Repeat { .. } => continue,
            };
            self.steps += 1;
            tracing::debug!(step = self.steps, ?action, "step");
            return Ok(action);
        }
    }
}

/// Run `program` from the level start with no pauses between steps.
pub fn run_to_end(level: &Level, program: &Program, max_steps: usize) -> RunResult {
    let mut world = World::new(level.clone());
    run_in(&mut world, program, max_steps)
}

/// Run `program` against an existing world, resetting it first.
pub fn run_in(world: &mut World, program: &Program, max_steps: usize) -> RunResult {
    world.reset();
    let mut execution = Execution::start(program, max_steps)?;
    loop {
        if let StepEvent::Finished(result) = execution.step(world) {
            return result;
        }
    }
}
