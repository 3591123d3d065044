// ABOUTME: Main TUI rendering function: assembles header, agents pane, chat, input, and status bar.
// ABOUTME: Splits the terminal frame into layout chunks and delegates to widgets.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::tui::state::TuiState;
use crate::tui::widgets::agents::agent_lines;
use crate::tui::widgets::chat::render_chat_lines;
use crate::tui::widgets::status::{StatusBarParams, header_line, status_line};

const AGENTS_PANE_WIDTH: u16 = 28;

/// Render the full TUI screen layout to the given frame.
pub fn render(frame: &mut Frame, state: &mut TuiState) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(3),    // Agents + chat
            Constraint::Length(3), // Input area
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    frame.render_widget(
        Paragraph::new(header_line(&state.wallet_status())),
        chunks[0],
    );

    // Narrow terminals drop the agents pane.
    let body = chunks[1];
    let (agents_chunk, chat_chunk) = if body.width > AGENTS_PANE_WIDTH * 2 {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(AGENTS_PANE_WIDTH), Constraint::Min(10)])
            .split(body);
        (Some(split[0]), split[1])
    } else {
        (None, body)
    };

    if let Some(agents_chunk) = agents_chunk {
        let lines = agent_lines(
            &state.agents,
            state.selected_agent,
            &state.blend_agents,
            state.selected_blend,
        );
        let block = Block::default()
            .borders(Borders::RIGHT)
            .border_style(Style::default().fg(Color::DarkGray));
        frame.render_widget(Paragraph::new(lines).block(block), agents_chunk);
    }

    let chat_paragraph =
        Paragraph::new(render_chat_lines(&state.messages)).wrap(Wrap { trim: false });
    let inner_width = if agents_chunk.is_some() {
        chat_chunk.width.saturating_sub(1)
    } else {
        chat_chunk.width
    };
    let total_lines = chat_paragraph.line_count(inner_width) as u16;
    let max_scroll = total_lines.saturating_sub(chat_chunk.height);

    // Cap scroll_offset so it can't go past the top of the content.
    if state.scroll_offset > max_scroll {
        state.scroll_offset = max_scroll;
    }

    // scroll_offset is lines scrolled up from the bottom (0 = at bottom)
    let scroll = max_scroll.saturating_sub(state.scroll_offset);
    let chat_area = if agents_chunk.is_some() {
        Rect {
            x: chat_chunk.x + 1,
            width: inner_width,
            ..chat_chunk
        }
    } else {
        chat_chunk
    };
    frame.render_widget(chat_paragraph.scroll((scroll, 0)), chat_area);

    // Input area
    let input_chunk = chunks[2];
    let mut input_block = Block::default().borders(Borders::TOP | Borders::BOTTOM);
    if state.is_busy() {
        input_block = input_block.title(Span::styled(
            " waiting for backend... ",
            Style::default().fg(Color::DarkGray),
        ));
    }
    let input = Paragraph::new(state.input.clone()).block(input_block);
    frame.render_widget(input, input_chunk);

    if input_chunk.width > 0 && input_chunk.height > 1 {
        state.clamp_cursor();
        let prefix: String = state.input.chars().take(state.cursor_pos).collect();
        let visual_col = UnicodeWidthStr::width(prefix.as_str());
        let max_visual_col = input_chunk.width.saturating_sub(1) as usize;
        let cursor_x = input_chunk
            .x
            .saturating_add(visual_col.min(max_visual_col) as u16);
        // +1 for the top border.
        let cursor_y = input_chunk.y.saturating_add(1);
        frame.set_cursor_position(Position::new(cursor_x, cursor_y));
    }

    // Status bar
    let agent_label = state.selected().map(|agent| agent.label());
    let history_label = state.history.as_ref().map(|h| h.pagination.label());
    let status = status_line(&StatusBarParams {
        backend_url: &state.backend_url,
        agent_label: agent_label.as_deref(),
        history_label: history_label.as_deref(),
        busy: state.is_busy(),
    });
    frame.render_widget(Paragraph::new(status), chunks[3]);
}
