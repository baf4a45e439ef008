//! src/app.rs
//!
//! Block-programming robot game in the terminal.
//!
//! # Top-Level Application (`app.rs`)
//!
//! Loads configuration and the starting level, starts the remote control
//! thread, and runs the UI main loop.
//!
//! ## Overview
//! The application:
//! - Draws the grid world, the robot and the treasure chest on a canvas.
//! - Lets the player assemble a program from blocks with the keyboard.
//! - Runs the program one command at a time, animating each move.
//! - Spawns a TCP control server that accepts line-based ASCII commands.
//!
//! # Running
//!
//! ```text
//! cargo run --release
//! ```
//!
//! Settings come from `robo.toml`, the file named by `ROBO_CONFIG`, and
//! `ROBO__*` environment variables (see `game::config`). Logs are written to
//! `$ROBO_LOG_DIR/robo-blocks.log.<date>`; filter with `RUST_LOG`.
//!
//! # Keyboard Controls
//!
//! - **f / l / r / i**: Add Move Forward, Turn Left, Turn Right, If Wall.
//! - **p**: Add a Repeat block (2 iterations).
//! - **Tab**: With a repeat selected, toggle adding blocks inside it.
//!   Repeats cannot go inside repeats.
//! - **Up / Down**: Select a block.
//! - **+ / -**: Change the selected repeat's count (1 to 10).
//! - **Backspace**: Remove the selected block (or the last block inside the
//!   repeat while adding inside it).
//! - **c**: Clear the workspace.
//! - **Space / Enter**: Run the program.
//! - **Esc**: Put the robot back on its start cell.
//! - **1..9**: Switch to a built-in level.
//! - **g**: Generate a random practice level.
//! - **q**: Quit and restore terminal state.
//!
//! Edits, resets and level switches are refused while a program runs.
//!
//! # Remote TCP Protocol (ASCII, Line-Based)
//!
//! **Default bind address:** `127.0.0.1:4000`
//!
//! ```text
//! $ nc 127.0.0.1 4000
//! eval [{"type":"repeat","count":4,"children":[{"type":"move-forward"}]}]
//! OK {"success":true,"score":80}
//! program [{"type":"turn-right"},{"type":"move-forward"}]
//! OK
//! run
//! OK started
//! result
//! OK {"success":false,"error":"the robot did not reach the goal"}
//! ```
//!
//! See `net::remote` for the full command list.
//!
//! # Scoring
//!
//! Reaching the goal after `n` steps scores `max(100 - 5n, 10)`. Built-in
//! levels also award one to three stars against their par.

use std::thread;
use std::time::{Duration, Instant};

use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use rand::Rng;
use ratatui::DefaultTerminal;
use ratatui::layout::{Constraint, Direction};

use crate::game::shared::{self, GameError, GameShared, SharedGame};
use crate::game::{GameConfig, config};
use crate::logging;
use crate::net::remote::remote_server;
use crate::panels::help::KEYS;
use crate::panels::{
    GridPanel, HelpPanel, HistoryPanel, ProgramPanel, StatusPanel, TitlePanel,
};
use crate::program::BlockKind;
use crate::ui::{Node, Scene, group, leaf};
use crate::world::generate::generate;
use crate::world::level::builtin_level;

/// Screen layout. Panels read everything from the per-frame scene, so the
/// tree is built once.
fn layout() -> Node {
    group(
        Direction::Vertical,
        vec![
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(4),
        ],
        vec![
            leaf(TitlePanel::new("Robo Blocks")),
            group(
                // world on the left, program and status on the right
                Direction::Horizontal,
                vec![Constraint::Percentage(55), Constraint::Percentage(45)],
                vec![
                    group(
                        Direction::Vertical,
                        vec![Constraint::Percentage(75), Constraint::Percentage(25)],
                        vec![leaf(GridPanel), leaf(HistoryPanel)],
                    ),
                    group(
                        Direction::Vertical,
                        vec![Constraint::Percentage(65), Constraint::Percentage(35)],
                        vec![leaf(ProgramPanel), leaf(StatusPanel)],
                    ),
                ],
            ),
            leaf(HelpPanel::new(KEYS)),
        ],
    )
}

/// Apply one key press. Returns `false` when the player quits.
fn handle_key<R: Rng + ?Sized>(
    g: &mut GameShared,
    code: KeyCode,
    now: Instant,
    rng: &mut R,
) -> bool {
    let outcome: Result<Option<String>, GameError> = match code {
        KeyCode::Char('q') => return false,
        KeyCode::Char('f') => g.edit(|ws| ws.add(BlockKind::MoveForward)).map(|_| None),
        KeyCode::Char('l') => g.edit(|ws| ws.add(BlockKind::TurnLeft)).map(|_| None),
        KeyCode::Char('r') => g.edit(|ws| ws.add(BlockKind::TurnRight)).map(|_| None),
        KeyCode::Char('p') => g.edit(|ws| ws.add(BlockKind::Repeat)).map(|_| None),
        KeyCode::Char('i') => g.edit(|ws| ws.add(BlockKind::IfWall)).map(|_| None),
        KeyCode::Tab => g.edit(|ws| ws.toggle_nest()).map(|on| {
            Some(if on {
                "Adding blocks inside the repeat".into()
            } else {
                "Adding blocks to the program".into()
            })
        }),
        KeyCode::Up => g
            .edit(|ws| {
                ws.select_prev();
                Ok(())
            })
            .map(|_| None),
        KeyCode::Down => g
            .edit(|ws| {
                ws.select_next();
                Ok(())
            })
            .map(|_| None),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            g.edit(|ws| ws.adjust_count(1)).map(|_| None)
        }
        KeyCode::Char('-') => g.edit(|ws| ws.adjust_count(-1)).map(|_| None),
        KeyCode::Backspace | KeyCode::Delete => g.edit(|ws| ws.remove()).map(|_| None),
        KeyCode::Char('c') => g
            .edit(|ws| {
                ws.clear();
                Ok(())
            })
            .map(|_| None),
        KeyCode::Char(' ') | KeyCode::Enter => g.start_run(now).map(|_| None),
        KeyCode::Esc => g.reset().map(|_| None),
        KeyCode::Char(d @ '1'..='9') => {
            let number = d as usize - '0' as usize;
            builtin_level(number)
                .map_err(GameError::from)
                .and_then(|level| g.load_level(level, format!("Level {number}")))
                .map(|_| None)
        }
        KeyCode::Char('g') => {
            let width = rng.random_range(4..=7);
            let height = rng.random_range(3..=6);
            let walls = (width * height / 4) as usize;
            let level = generate(rng, width, height, walls);
            g.load_level(level, "Random")
                .map(|_| Some("New random level".into()))
        }
        _ => Ok(None),
    };
    g.notice = match outcome {
        Ok(notice) => notice,
        Err(e) => Some(e.to_string()),
    };
    true
}

fn event_loop(terminal: &mut DefaultTerminal, game: &SharedGame, cfg: &GameConfig) -> Result<()> {
    let root = layout();
    let frame_time = cfg.frame_time();
    let mut rng = rand::rng();
    let mut running = true;

    while running {
        let frame_start = Instant::now();

        shared::write(game).tick(frame_start);

        {
            let g = shared::read(game);
            let scene = Scene {
                game: &g,
                now: frame_start,
            };
            terminal.draw(|f| {
                let area = f.area();
                root.draw(f, area, &scene);
            })?;
        }

        // Keyboard controls
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let mut g = shared::write(game);
                if !handle_key(&mut g, key.code, Instant::now(), &mut rng) {
                    running = false;
                }
            }
        }

        let elapsed = frame_start.elapsed();
        if running && elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let _logging = logging::init();

    let cfg = config::load_from_env()?;
    let (level, label) = cfg.initial_level()?;
    tracing::info!(level = %label, max_steps = cfg.max_steps, "starting");

    let game = shared::shared(GameShared::new(cfg.clone(), level, label));

    // Remote control thread
    if cfg.remote_enabled {
        let game_for_thread = game.clone();
        let addr = cfg.remote_addr.clone();
        thread::spawn(move || remote_server(&addr, game_for_thread));
    }

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &game, &cfg);
    ratatui::restore();
    tracing::info!("exiting");
    result
}
