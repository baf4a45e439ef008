//! src/panels/history.rs
//!
//! History panel: renders the most recent runs, newest at the bottom.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::status::stars;
use crate::ui::{Panel, Scene};

pub struct HistoryPanel;

impl Panel for HistoryPanel {
    fn draw(&self, f: &mut Frame<'_>, area: Rect, scene: &Scene<'_>) {
        let log = &scene.game.history;
        let height = area.height.saturating_sub(2) as usize;
        let start = log.len().saturating_sub(height);
        let last_index = log.len().saturating_sub(1);

        let mut lines: Vec<Line> = log
            .entries
            .iter()
            .enumerate()
            .skip(start)
            .map(|(i, record)| {
                let emphasis = if i == last_index {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                };
                let outcome = if record.report.success {
                    let mut text = format!("ok {:>3}", record.report.score.unwrap_or(0));
                    if let Some(n) = record.stars {
                        text.push(' ');
                        text.push_str(&stars(n));
                    }
                    Span::styled(
                        text,
                        Style::default().fg(Color::Green).add_modifier(emphasis),
                    )
                } else {
                    Span::styled(
                        format!("x {}", record.report.error.as_deref().unwrap_or("")),
                        Style::default().fg(Color::Red).add_modifier(emphasis),
                    )
                };
                Line::from(vec![
                    Span::styled(
                        format!("#{:<3}", record.number),
                        Style::default().fg(Color::Yellow),
                    ),
                    Span::styled(
                        format!("{:<12} ", record.level),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(format!("{:>2} steps  ", record.steps)),
                    outcome,
                ])
            })
            .collect();
        if log.is_empty() {
            lines.push(Line::from(Span::styled(
                "No runs yet",
                Style::default().fg(Color::DarkGray),
            )));
        }

        let block = Block::default().title("Runs").borders(Borders::ALL);
        f.render_widget(Paragraph::new(lines).block(block), area);
    }
}
