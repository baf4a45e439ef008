//! src/panels/program.rs
//!
//! Workspace panel: the assembled blocks, the selection, and the block that
//! is executing during a run.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::program::Command;
use crate::ui::{Panel, Scene};

pub struct ProgramPanel;

/// Human-readable block label.
pub fn label(command: &Command) -> String {
    match command {
        Command::MoveForward => "Move Forward".into(),
        Command::TurnLeft => "Turn Left".into(),
        Command::TurnRight => "Turn Right".into(),
        Command::Repeat { count, .. } => format!("Repeat {count}x"),
        Command::IfWall => "If Wall".into(),
        Command::Unknown(kind) => format!("Unknown '{kind}'"),
    }
}

fn block_color(command: &Command) -> Color {
    match command {
        Command::MoveForward => Color::Blue,
        Command::TurnLeft | Command::TurnRight => Color::Magenta,
        Command::Repeat { .. } => Color::Yellow,
        Command::IfWall => Color::Cyan,
        Command::Unknown(_) => Color::Red,
    }
}

/// Push `children` indented under their repeat.
fn push_children(lines: &mut Vec<Line<'static>>, children: &[Command], depth: usize) {
    for child in children {
        lines.push(Line::from(vec![
            Span::raw(format!("{}  └ ", "   ".repeat(depth))),
            Span::styled(label(child), Style::default().fg(block_color(child))),
        ]));
        if let Command::Repeat { children, .. } = child {
            push_children(lines, children, depth + 1);
        }
    }
}

impl Panel for ProgramPanel {
    fn draw(&self, f: &mut Frame<'_>, area: Rect, scene: &Scene<'_>) {
        let game = scene.game;
        let ws = &game.workspace;
        let active = game.active_block();

        let mut lines: Vec<Line> = Vec::new();
        if ws.is_empty() {
            lines.push(Line::from(Span::styled(
                "Add blocks with f / l / r / p / i",
                Style::default().fg(Color::DarkGray),
            )));
        }

        for (i, command) in ws.blocks().iter().enumerate() {
            let mut style = Style::default().fg(block_color(command));
            if ws.selected() == Some(i) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            let marker = if active == Some(i) { "▶" } else { " " };
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{marker}{:>2}. ", i + 1),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(label(command), style),
            ]));
            if let Command::Repeat { children, .. } = command {
                if children.is_empty() {
                    lines.push(Line::from(Span::styled(
                        "     (empty: Tab to add blocks inside)",
                        Style::default().fg(Color::DarkGray),
                    )));
                }
                push_children(&mut lines, children, 1);
            }
        }

        let budget = match ws.max_blocks() {
            Some(max) => format!("{}/{}", ws.block_count(), max),
            None => ws.block_count().to_string(),
        };
        let mode = if ws.is_nesting() {
            "  [adding inside repeat]"
        } else {
            ""
        };
        let mut block = Block::default()
            .title(format!("Your Program ({budget} blocks){mode}"))
            .borders(Borders::ALL);
        if ws.is_nesting() {
            block = block.border_style(Style::default().fg(Color::Yellow));
        }

        // show the tail when the list overflows
        let inner_height = area.height.saturating_sub(2) as usize;
        let scroll = lines.len().saturating_sub(inner_height) as u16;
        f.render_widget(Paragraph::new(lines).block(block).scroll((scroll, 0)), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(label(&Command::repeat(3, vec![])), "Repeat 3x");
        assert_eq!(label(&Command::Unknown("jump".into())), "Unknown 'jump'");
    }

    #[test]
    fn test_children_are_indented_recursively() {
        let mut lines = Vec::new();
        push_children(
            &mut lines,
            &[
                Command::MoveForward,
                Command::repeat(2, vec![Command::TurnLeft]),
            ],
            1,
        );
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].spans[0].content, "     └ ");
        assert_eq!(lines[2].spans[0].content, "        └ ");
    }
}
