//! src/panels/grid.rs
//!
//! World panel: draws the grid, walls, goal and the robot on a canvas.
//!
//! Canvas y grows upward while grid y grows south, so cell `(x, y)` occupies
//! `[x, x+1] x [h-y-1, h-y]`. The robot is drawn at its eased position
//! while a move animates.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols,
    text::Span,
    widgets::{
        Block, Borders,
        canvas::{Canvas, Line as CanvasLine, Rectangle},
    },
};

use crate::ui::{Panel, Scene};

pub struct GridPanel;

impl GridPanel {
    /// Canvas coordinates of the centre of a (possibly fractional) cell.
    fn cell_center(height: f64, x: f64, y: f64) -> (f64, f64) {
        (x + 0.5, height - y - 0.5)
    }
}

impl Panel for GridPanel {
    fn draw(&self, f: &mut Frame<'_>, area: Rect, scene: &Scene<'_>) {
        let game = scene.game;
        let level = game.level();
        let width = level.size.width as f64;
        let height = level.size.height as f64;

        let (rx, ry) = game.robot_position(scene.now);
        let robot = Self::cell_center(height, rx, ry);
        let goal = Self::cell_center(height, level.goal.x as f64, level.goal.y as f64);
        let arrow = game.world.facing.arrow();
        let walls: Vec<(f64, f64)> = level
            .walls
            .iter()
            .map(|w| (w.x as f64, height - w.y as f64 - 1.0))
            .collect();

        let robot_style = if game.is_running() {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };

        let title = format!(
            "World {}x{}  robot ({}, {}) facing {}",
            level.size.width,
            level.size.height,
            game.world.player.x,
            game.world.player.y,
            game.world.facing.name()
        );

        let canvas = Canvas::default()
            .block(Block::default().title(title).borders(Borders::ALL))
            .marker(symbols::Marker::Braille)
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(move |ctx| {
                for i in 0..=level.size.width {
                    let x = i as f64;
                    ctx.draw(&CanvasLine::new(x, 0.0, x, height, Color::DarkGray));
                }
                for j in 0..=level.size.height {
                    let y = j as f64;
                    ctx.draw(&CanvasLine::new(0.0, y, width, y, Color::DarkGray));
                }
                for &(x, y) in &walls {
                    ctx.draw(&Rectangle {
                        x: x + 0.1,
                        y: y + 0.1,
                        width: 0.8,
                        height: 0.8,
                        color: Color::Gray,
                    });
                }
                ctx.layer();

                for &(x, y) in &walls {
                    ctx.print(
                        x + 0.35,
                        y + 0.5,
                        Span::styled("##", Style::default().fg(Color::Gray)),
                    );
                }
                ctx.print(
                    goal.0,
                    goal.1,
                    Span::styled(
                        "$",
                        Style::default()
                            .fg(Color::Yellow)
                            .add_modifier(Modifier::BOLD),
                    ),
                );
                ctx.print(robot.0, robot.1, Span::styled(arrow, robot_style));
            });

        f.render_widget(canvas, area);
    }
}
