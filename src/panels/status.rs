//! src/panels/status.rs
//!
//! Status panel: run state, block budget, score and the last result.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::ui::{Panel, Scene};

pub struct StatusPanel;

pub fn stars(n: u8) -> String {
    "★".repeat(n as usize)
}

impl Panel for StatusPanel {
    fn draw(&self, f: &mut Frame<'_>, area: Rect, scene: &Scene<'_>) {
        let g = scene.game;
        let bold = Style::default().add_modifier(Modifier::BOLD);

        let state = match &g.run {
            Some(run) => Span::styled(
                format!(
                    "{}  step {}/{}",
                    if run.execution.is_finished() {
                        "Finishing"
                    } else {
                        "Running"
                    },
                    run.execution.steps(),
                    g.config.max_steps
                ),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            None => Span::raw("Ready"),
        };

        let mut lines = vec![
            Line::from(vec![Span::styled("State: ", bold), state]),
            Line::from(vec![
                Span::styled("Goal: ", bold),
                Span::raw(format!("({}, {})", g.level().goal.x, g.level().goal.y)),
            ]),
            Line::from(vec![
                Span::styled("Score: ", bold),
                Span::raw(g.total_score.to_string()),
            ]),
        ];

        if let Some(record) = g.history.latest() {
            let result = if record.report.success {
                let mut text = format!("Level complete! +{}", record.report.score.unwrap_or(0));
                if let Some(n) = record.stars {
                    text.push(' ');
                    text.push_str(&stars(n));
                }
                Span::styled(text, Style::default().fg(Color::Green))
            } else {
                Span::styled(
                    record.report.error.clone().unwrap_or_default(),
                    Style::default().fg(Color::Red),
                )
            };
            lines.push(Line::from(vec![Span::styled("Last run: ", bold), result]));
        }

        if let Some(notice) = &g.notice {
            lines.push(Line::from(Span::styled(
                notice.clone(),
                Style::default().fg(Color::Yellow),
            )));
        }

        let block = Block::default().title("Status").borders(Borders::ALL);
        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(block),
            area,
        );
    }
}
