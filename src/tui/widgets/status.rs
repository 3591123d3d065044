// ABOUTME: Header badge and status bar widgets: wallet state, backend, selected agent, busy indicator.
// ABOUTME: Both render as single-line summaries at the top and bottom of the TUI.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::display::format_address;
use crate::wallet::SessionStatus;

/// Header line: product name followed by the wallet badge.
pub fn header_line(status: &SessionStatus) -> Line<'static> {
    let mut spans = vec![Span::styled(
        " chainclaw ",
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::styled("| ", Style::default().fg(Color::DarkGray)));
    spans.push(wallet_badge(status));
    Line::from(spans)
}

/// The wallet badge: the connect call-to-action, a connecting notice, or the short address.
pub fn wallet_badge(status: &SessionStatus) -> Span<'static> {
    match status {
        SessionStatus::Disconnected => {
            Span::styled("Connect Wallet (/connect)", Style::default().fg(Color::Yellow))
        }
        SessionStatus::Connecting => {
            Span::styled("Connecting...", Style::default().fg(Color::Yellow))
        }
        SessionStatus::Connected(account) => Span::styled(
            format!("● {}", format_address(account)),
            Style::default().fg(Color::Green),
        ),
    }
}

pub struct StatusBarParams<'a> {
    pub backend_url: &'a str,
    pub agent_label: Option<&'a str>,
    pub history_label: Option<&'a str>,
    pub busy: bool,
}

/// Render the status bar line.
pub fn status_line(params: &StatusBarParams<'_>) -> Line<'static> {
    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = vec![
        Span::styled(
            format!(" {} ", params.backend_url),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled("| ", dim),
        Span::styled(
            format!("agent: {} ", params.agent_label.unwrap_or("none")),
            Style::default().fg(Color::White),
        ),
    ];

    if let Some(history) = params.history_label {
        spans.push(Span::styled("| ", dim));
        spans.push(Span::styled(
            format!("history {} ", history),
            Style::default().fg(Color::White),
        ));
    }

    if params.busy {
        spans.push(Span::styled("| ", dim));
        spans.push(Span::styled(
            "working... ",
            Style::default().fg(Color::Yellow),
        ));
    }

    Line::from(spans)
}
