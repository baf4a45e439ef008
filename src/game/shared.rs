//! src/game/shared.rs
//!
//! Shared game state: the world, the workspace, the active run and its
//! pacing, and the run history. One instance lives behind `SharedGame` and is
//! touched by the UI thread and the control-server threads.
//!
//! Runs are cooperative. The UI loop calls [`GameShared::tick`] every frame;
//! the active run executes one step when its deadline has passed and then
//! waits `move_duration + step_delay` after a move, or `step_delay` after
//! anything else. While a run is active the workspace and world are locked
//! against edits and a second run is refused.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use thiserror::Error;

use super::config::GameConfig;
use super::history::{RunLog, RunRecord};
use crate::program::interp::{self, Action, Execution, StepEvent};
use crate::program::{EditError, Program, RunError, RunReport, RunResult, Workspace};
use crate::world::{Level, LevelError, Position, World};

#[derive(Error, Debug)]
pub enum GameError {
    #[error("a program is already running")]
    Busy,

    #[error(transparent)]
    Run(#[from] RunError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Level(#[from] LevelError),
}

/// An in-flight move animation between two cells.
#[derive(Clone, Copy, Debug)]
pub struct Motion {
    pub from: Position,
    pub to: Position,
    pub started: Instant,
    pub duration: Duration,
}

impl Motion {
    /// Eased position at `now`, in cell units.
    pub fn position_at(&self, now: Instant) -> (f64, f64) {
        let elapsed = now.saturating_duration_since(self.started).as_secs_f64();
        let total = self.duration.as_secs_f64();
        let progress = if total <= 0.0 {
            1.0
        } else {
            (elapsed / total).min(1.0)
        };
        let eased = ease_out_cubic(progress);
        (
            lerp(self.from.x as f64, self.to.x as f64, eased),
            lerp(self.from.y as f64, self.to.y as f64, eased),
        )
    }
}

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t.clamp(0.0, 1.0)).powi(3)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

#[derive(Debug)]
pub struct ActiveRun {
    pub execution: Execution,
    pub next_step_at: Instant,
    pub motion: Option<Motion>,
}

pub struct GameShared {
    pub config: GameConfig,
    pub world: World,
    pub workspace: Workspace,
    /// Shown in the title bar and history, e.g. "Level 2".
    pub level_label: String,
    pub run: Option<ActiveRun>,
    pub history: RunLog,
    pub total_score: u32,
    /// Last notice for the status panel (edit refusals, load results).
    pub notice: Option<String>,
}

impl GameShared {
    pub fn new(config: GameConfig, level: Level, level_label: impl Into<String>) -> Self {
        let history = RunLog::new(config.history_len);
        let workspace = Workspace::new(level.max_blocks);
        Self {
            config,
            world: World::new(level),
            workspace,
            level_label: level_label.into(),
            run: None,
            history,
            total_score: 0,
            notice: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub fn level(&self) -> &Level {
        self.world.level()
    }

    /// Swap in a new level; the workspace keeps its blocks but takes the new
    /// block budget.
    pub fn load_level(&mut self, level: Level, label: impl Into<String>) -> Result<(), GameError> {
        if self.is_running() {
            return Err(GameError::Busy);
        }
        level.validate()?;
        self.workspace.set_max_blocks(level.max_blocks);
        self.world = World::new(level);
        self.level_label = label.into();
        tracing::info!(level = %self.level_label, "level loaded");
        Ok(())
    }

    /// Apply an edit to the workspace unless a run is in progress.
    pub fn edit<T>(
        &mut self,
        f: impl FnOnce(&mut Workspace) -> Result<T, EditError>,
    ) -> Result<T, GameError> {
        if self.is_running() {
            return Err(GameError::Busy);
        }
        Ok(f(&mut self.workspace)?)
    }

    pub fn load_program(&mut self, program: Program) -> Result<(), GameError> {
        self.edit(|ws| {
            ws.load(program);
            Ok(())
        })
    }

    /// Put the robot back on the start cell.
    pub fn reset(&mut self) -> Result<(), GameError> {
        if self.is_running() {
            return Err(GameError::Busy);
        }
        self.world.reset();
        Ok(())
    }

    /// Begin an animated run of the workspace program.
    ///
    /// A program that cannot start (empty) is recorded as a failed run and
    /// its error returned.
    pub fn start_run(&mut self, now: Instant) -> Result<(), GameError> {
        if self.is_running() {
            return Err(GameError::Busy);
        }
        self.world.reset();
        let program = self.workspace.program();
        match Execution::start(&program, self.config.max_steps) {
            Ok(execution) => {
                tracing::info!(
                    level = %self.level_label,
                    blocks = self.workspace.block_count(),
                    leaves = program.leaf_count(),
                    program = %program.to_json(),
                    "run started"
                );
                self.run = Some(ActiveRun {
                    execution,
                    next_step_at: now,
                    motion: None,
                });
                Ok(())
            }
            Err(err) => {
                self.finish(Err(err.clone()), 0);
                Err(err.into())
            }
        }
    }

    /// Advance the active run if its next step is due.
    ///
    /// Returns the report when the run finishes on this tick.
    pub fn tick(&mut self, now: Instant) -> Option<RunReport> {
        let move_duration = self.config.move_duration();
        let step_delay = self.config.step_delay();

        let run = self.run.as_mut()?;
        if now < run.next_step_at {
            return None;
        }
        match run.execution.step(&mut self.world) {
            StepEvent::Acted { action, .. } => {
                match action {
                    Action::Moved { from, to } => {
                        run.motion = Some(Motion {
                            from,
                            to,
                            started: now,
                            duration: move_duration,
                        });
                        run.next_step_at = now + move_duration + step_delay;
                    }
                    Action::Turned(_) | Action::Idle => {
                        run.motion = None;
                        run.next_step_at = now + step_delay;
                    }
                }
                None
            }
            StepEvent::Finished(result) => {
                let steps = run.execution.steps();
                Some(self.finish(result, steps))
            }
        }
    }

    fn finish(&mut self, result: RunResult, steps: usize) -> RunReport {
        self.run = None;
        let report = RunReport::from(&result);
        let stars = match &result {
            Ok(success) => {
                self.total_score = self.total_score.saturating_add(success.score);
                self.level().stars(success.score)
            }
            Err(_) => None,
        };
        match &result {
            Ok(success) => {
                tracing::info!(score = success.score, steps, ?stars, "run succeeded")
            }
            Err(err) => tracing::info!(error = %err, steps, "run failed"),
        }
        self.history.push(RunRecord {
            number: self.history.next_number(),
            level: self.level_label.clone(),
            report: report.clone(),
            steps,
            stars,
        });
        report
    }

    /// Run a program to completion against the current level without
    /// touching the displayed world.
    pub fn evaluate(&self, program: &Program) -> RunReport {
        let result = interp::run_to_end(self.level(), program, self.config.max_steps);
        RunReport::from(&result)
    }

    /// Where to draw the robot at `now`, in cell units.
    pub fn robot_position(&self, now: Instant) -> (f64, f64) {
        match self.run.as_ref().and_then(|r| r.motion) {
            Some(motion) => motion.position_at(now),
            None => (self.world.player.x as f64, self.world.player.y as f64),
        }
    }

    /// Top-level block currently executing, for highlighting.
    pub fn active_block(&self) -> Option<usize> {
        self.run.as_ref().and_then(|r| r.execution.current_block())
    }
}

/// Alias: Arc<RwLock<GameShared>>
pub type SharedGame = Arc<RwLock<GameShared>>;

/// Alias for a write guard.
pub type GameGuard<'a> = RwLockWriteGuard<'a, GameShared>;

pub fn shared(game: GameShared) -> SharedGame {
    Arc::new(RwLock::new(game))
}

/// Write-lock the game, recovering the state if a holder panicked.
pub fn write(game: &SharedGame) -> GameGuard<'_> {
    game.write().unwrap_or_else(PoisonError::into_inner)
}

pub fn read(game: &SharedGame) -> RwLockReadGuard<'_, GameShared> {
    game.read().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{BlockKind, Command};
    use crate::world::level::builtin_level;

    fn game() -> GameShared {
        let config = GameConfig {
            step_delay_ms: 100,
            move_duration_ms: 200,
            ..GameConfig::default()
        };
        GameShared::new(config, builtin_level(1).unwrap(), "Level 1")
    }

    /// Tick until the run finishes, jumping straight to each deadline.
    fn run_out(g: &mut GameShared, mut now: Instant) -> (RunReport, Instant) {
        loop {
            if let Some(report) = g.tick(now) {
                return (report, now);
            }
            now = g.run.as_ref().map(|r| r.next_step_at).unwrap_or(now);
        }
    }

    #[test]
    fn test_run_paces_moves_and_turns() {
        let mut g = game();
        g.workspace.load(Program::new(vec![Command::TurnLeft, Command::MoveForward]));
        let t0 = Instant::now();
        g.start_run(t0).unwrap();
        assert!(g.is_running());

        // turn at t0, then wait only the step delay
        assert_eq!(g.tick(t0), None);
        let next = g.run.as_ref().unwrap().next_step_at;
        assert_eq!(next, t0 + Duration::from_millis(100));
        assert_eq!(g.tick(t0 + Duration::from_millis(50)), None);

        // move north off the grid ends the run
        let report = g.tick(next).unwrap();
        assert!(!report.success);
        assert!(!g.is_running());
        assert_eq!(g.world.player, Position::new(0, 0));
        assert_eq!(g.history.len(), 1);
    }

    #[test]
    fn test_successful_run_scores_and_rates() {
        let mut g = game();
        g.workspace.load(Program::new(vec![Command::repeat(
            4,
            vec![Command::MoveForward],
        )]));
        let t0 = Instant::now();
        g.start_run(t0).unwrap();

        assert_eq!(g.tick(t0), None);
        let motion = g.run.as_ref().unwrap().motion.unwrap();
        assert_eq!(motion.to, Position::new(1, 0));
        assert_eq!(
            g.run.as_ref().unwrap().next_step_at,
            t0 + Duration::from_millis(300)
        );

        let (report, _) = run_out(&mut g, t0);
        assert_eq!(report.score, Some(80));
        assert!(report.success);
        assert_eq!(g.total_score, 80);
        let record = g.history.latest().unwrap();
        assert_eq!(record.stars, Some(3));
        assert_eq!(record.steps, 4);
        assert_eq!(g.world.player, Position::new(4, 0));
    }

    #[test]
    fn test_busy_guard() {
        let mut g = game();
        g.edit(|ws| ws.add(BlockKind::MoveForward)).unwrap();
        let t0 = Instant::now();
        g.start_run(t0).unwrap();
        assert!(matches!(g.start_run(t0), Err(GameError::Busy)));
        assert!(matches!(g.reset(), Err(GameError::Busy)));
        assert!(matches!(
            g.edit(|ws| ws.add(BlockKind::TurnLeft)),
            Err(GameError::Busy)
        ));
        assert!(matches!(
            g.load_level(builtin_level(2).unwrap(), "Level 2"),
            Err(GameError::Busy)
        ));
    }

    #[test]
    fn test_empty_program_is_recorded() {
        let mut g = game();
        let err = g.start_run(Instant::now()).unwrap_err();
        assert!(matches!(err, GameError::Run(RunError::EmptyProgram)));
        assert!(!g.is_running());
        let record = g.history.latest().unwrap();
        assert_eq!(record.report.error.as_deref(), Some("the program is empty"));
    }

    #[test]
    fn test_robot_position_eases_between_cells() {
        let mut g = game();
        g.workspace.load(Program::new(vec![Command::MoveForward, Command::MoveForward]));
        let t0 = Instant::now();
        g.start_run(t0).unwrap();
        g.tick(t0);

        assert_eq!(g.robot_position(t0), (0.0, 0.0));
        let (mid_x, mid_y) = g.robot_position(t0 + Duration::from_millis(100));
        // cubic ease-out is past the halfway mark at half time
        assert!(mid_x > 0.5 && mid_x < 1.0, "{mid_x}");
        assert_eq!(mid_y, 0.0);
        assert_eq!(g.robot_position(t0 + Duration::from_secs(5)), (1.0, 0.0));
    }

    #[test]
    fn test_evaluate_leaves_world_alone() {
        let mut g = game();
        g.world.player = Position::new(2, 2);
        let report = g.evaluate(&Program::new(vec![Command::repeat(
            4,
            vec![Command::MoveForward],
        )]));
        assert_eq!(report.score, Some(80));
        assert_eq!(g.world.player, Position::new(2, 2));
    }

    #[test]
    fn test_load_level_validates_and_sets_budget() {
        let mut g = game();
        let mut bad = builtin_level(2).unwrap();
        bad.goal = Position::new(9, 9);
        assert!(matches!(
            g.load_level(bad, "bad"),
            Err(GameError::Level(LevelError::GoalOutside(_)))
        ));
        g.load_level(builtin_level(2).unwrap(), "Level 2").unwrap();
        assert_eq!(g.workspace.max_blocks(), Some(8));
        assert_eq!(g.level_label, "Level 2");
    }
}
