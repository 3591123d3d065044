// ABOUTME: Agents pane widget: numbered agent list with the current selection highlighted.
// ABOUTME: Blend agents follow the aigent list under their own heading.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::backend::{BlendAgent, UserAgent};
use crate::display::short_hash;

/// Render the agents pane contents.
pub fn agent_lines(
    agents: &[UserAgent],
    selected: Option<usize>,
    blend_agents: &[BlendAgent],
    selected_blend: Option<usize>,
) -> Vec<Line<'static>> {
    let heading = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);
    let mut lines = vec![Line::from(Span::styled("Agents", heading))];

    if agents.is_empty() {
        lines.push(Line::from(Span::styled("  (none)", dim)));
    }
    for (idx, agent) in agents.iter().enumerate() {
        let marker = if selected == Some(idx) { "▸" } else { " " };
        let style = if selected == Some(idx) {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker}{}. {}", idx + 1, agent.label()), style),
            Span::styled(format!(" {}", short_hash(&agent.nft_hash, 6)), dim),
        ]));
    }

    if !blend_agents.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Blend", heading)));
        for (idx, agent) in blend_agents.iter().enumerate() {
            let marker = if selected_blend == Some(idx) { "▸" } else { " " };
            lines.push(Line::from(vec![
                Span::raw(format!("{marker}{}. {}", idx + 1, agent.name)),
                Span::styled(format!(" ({} fns)", agent.functions.len()), dim),
            ]));
        }
    }

    lines
}
