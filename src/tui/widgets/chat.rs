// ABOUTME: Chat widget: renders chat messages into styled ratatui Lines.
// ABOUTME: Each message kind (user, agent, system, error) has distinct visual styling.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::tui::state::{ChatMessage, ChatMessageKind};

/// Render a slice of chat messages into styled Lines for display.
pub fn render_chat_lines(messages: &[ChatMessage]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (idx, msg) in messages.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(""));
        }

        match msg.kind {
            ChatMessageKind::User => {
                lines.push(Line::from(vec![
                    Span::styled(
                        "❯ ",
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(msg.content.clone()),
                ]));
            }
            ChatMessageKind::Agent => {
                // First line gets the prefix, subsequent lines are plain.
                for (i, text) in msg.content.split('\n').enumerate() {
                    if i == 0 {
                        lines.push(Line::from(vec![
                            Span::styled(
                                "⏺ ",
                                Style::default()
                                    .fg(Color::Cyan)
                                    .add_modifier(Modifier::BOLD),
                            ),
                            Span::raw(text.to_string()),
                        ]));
                    } else {
                        lines.push(Line::from(Span::raw(text.to_string())));
                    }
                }
            }
            ChatMessageKind::System => {
                for (i, text) in msg.content.split('\n').enumerate() {
                    let content = if i == 0 {
                        format!("[system] {}", text)
                    } else {
                        format!("         {}", text)
                    };
                    lines.push(Line::from(Span::styled(
                        content,
                        Style::default()
                            .fg(Color::DarkGray)
                            .add_modifier(Modifier::ITALIC),
                    )));
                }
            }
            ChatMessageKind::Error => {
                lines.push(Line::from(Span::styled(
                    format!("✗ {}", msg.content),
                    Style::default().fg(Color::Red),
                )));
            }
        }
    }

    lines
}
