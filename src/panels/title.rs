//! src/panels/title.rs
//!
//! Title bar: level name and objective.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::ui::{Panel, Scene};

pub struct TitlePanel {
    pub title: String,
}

impl TitlePanel {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
        }
    }
}

impl Panel for TitlePanel {
    fn draw(&self, f: &mut Frame<'_>, area: Rect, scene: &Scene<'_>) {
        let game = scene.game;
        let objective = game
            .level()
            .objective
            .as_deref()
            .unwrap_or("Reach the treasure chest!");
        let line = Line::from(vec![
            Span::styled(
                game.level_label.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  Objective: {objective}")),
        ]);
        let p = Paragraph::new(line)
            .block(Block::default().title(self.title.clone()).borders(Borders::ALL));
        f.render_widget(p, area);
    }
}
