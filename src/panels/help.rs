//! src/panels/help.rs
//!
//! Key binding reference.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::ui::{Panel, Scene};

pub const KEYS: &[(&str, &str)] = &[
    ("f", "move forward"),
    ("l", "turn left"),
    ("r", "turn right"),
    ("p", "repeat"),
    ("i", "if wall"),
    ("Tab", "add inside repeat"),
    ("Up/Down", "select"),
    ("+/-", "repeat count"),
    ("Bksp", "remove"),
    ("c", "clear"),
    ("Space", "run"),
    ("Esc", "reset"),
    ("1-3", "level"),
    ("g", "random level"),
    ("q", "quit"),
];

pub struct HelpPanel {
    pub keys: &'static [(&'static str, &'static str)],
}

impl HelpPanel {
    pub fn new(keys: &'static [(&'static str, &'static str)]) -> Self {
        Self { keys }
    }
}

impl Panel for HelpPanel {
    fn draw(&self, f: &mut Frame<'_>, area: Rect, _scene: &Scene<'_>) {
        let key_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        let spans: Vec<Span> = self
            .keys
            .iter()
            .flat_map(|(key, action)| {
                [
                    Span::styled(*key, key_style),
                    Span::raw(format!("={action}  ")),
                ]
            })
            .collect();
        let p = Paragraph::new(Line::from(spans))
            .wrap(Wrap { trim: true })
            .block(Block::default().title("Controls").borders(Borders::ALL));
        f.render_widget(p, area);
    }
}
