// ABOUTME: E2E tests for TUI rendering using ratatui's TestBackend.
// ABOUTME: Verifies the wallet badge, agents pane, chat messages, status bar, and scrolling.

use ratatui::Terminal;
use ratatui::backend::TestBackend;

use chainclaw::backend::{ConversationHistory, UserAgent};
use chainclaw::tui::state::{ChatMessageKind, TuiState};
use chainclaw::tui::ui;
use chainclaw::wallet::WalletSession;

/// Extract a single row of text from the terminal buffer as a String.
fn row_text(terminal: &Terminal<TestBackend>, y: u16) -> String {
    let buf = terminal.backend().buffer();
    let width = buf.area.width;
    (0..width)
        .map(|x| {
            buf.cell((x, y))
                .map(|c| c.symbol().chars().next().unwrap_or(' '))
                .unwrap_or(' ')
        })
        .collect()
}

/// Extract all text from the terminal buffer as a single string (rows joined by newlines).
fn all_text(terminal: &Terminal<TestBackend>) -> String {
    let buf = terminal.backend().buffer();
    let height = buf.area.height;
    (0..height)
        .map(|y| row_text(terminal, y))
        .collect::<Vec<_>>()
        .join("\n")
}

fn draw(terminal: &mut Terminal<TestBackend>, state: &mut TuiState) {
    terminal.draw(|frame| ui::render(frame, state)).unwrap();
}

fn state() -> TuiState {
    TuiState::new("http://localhost:8080".to_string(), 5)
}

fn agent(hash: &str, description: &str) -> UserAgent {
    serde_json::from_value(serde_json::json!({
        "nft_hash": hash,
        "personality": { "description": description },
    }))
    .unwrap()
}

/// A fresh state shows the product name and the connect call-to-action.
#[test]
fn renders_disconnected_header() {
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    let mut state = state();
    draw(&mut terminal, &mut state);

    let header = row_text(&terminal, 0);
    assert!(header.contains("chainclaw"), "got: {header:?}");
    assert!(header.contains("Connect Wallet"), "got: {header:?}");
}

/// The badge follows the wallet snapshot through connecting and connected.
#[test]
fn renders_wallet_badge_transitions() {
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    let mut state = state();

    state.set_wallet(WalletSession {
        account: None,
        connecting: true,
    });
    draw(&mut terminal, &mut state);
    assert!(row_text(&terminal, 0).contains("Connecting..."));

    state.set_wallet(WalletSession {
        account: Some("0x1234567890abcdef1234567890abcdef12345678".to_string()),
        connecting: false,
    });
    draw(&mut terminal, &mut state);
    let header = row_text(&terminal, 0);
    assert!(header.contains("0x1234...5678"), "got: {header:?}");
    assert!(!header.contains("Connect Wallet"));
}

/// User, agent, and system messages all reach the buffer with their prefixes.
#[test]
fn renders_chat_messages() {
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    let mut state = state();
    state.push_message(ChatMessageKind::User, "Hello agent!".to_string());
    state.push_message(ChatMessageKind::Agent, "Hi, how can I help?".to_string());
    state.push_system("Connected as 0x1234...5678");
    draw(&mut terminal, &mut state);

    let text = all_text(&terminal);
    assert!(text.contains("❯ Hello agent!"), "got:\n{text}");
    assert!(text.contains("⏺"), "got:\n{text}");
    assert!(text.contains("Hi, how can I help?"), "got:\n{text}");
    assert!(text.contains("[system] Connected as"), "got:\n{text}");
}

/// The agents pane lists agents and marks the selected one.
#[test]
fn renders_agents_pane_with_selection() {
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    let mut state = state();
    state.set_agents(vec![
        agent("aaaaaaaaaaaa", "Portfolio rebalancer"),
        agent("bbbbbbbbbbbb", "Gas watcher"),
    ]);
    state.select_agent(&chainclaw::tui::AgentRef::Index(2));
    draw(&mut terminal, &mut state);

    let text = all_text(&terminal);
    assert!(text.contains("Agents"), "got:\n{text}");
    assert!(text.contains(" 1. Portfolio rebalancer"), "got:\n{text}");
    assert!(text.contains("▸2. Gas watcher"), "got:\n{text}");

    let status = row_text(&terminal, 23);
    assert!(status.contains("agent: Gas watcher"), "got: {status:?}");
}

/// The status bar shows the backend, the history page, and the busy indicator.
#[test]
fn renders_status_bar() {
    let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
    let mut state = state();
    let empty: ConversationHistory = serde_json::from_value(serde_json::json!({
        "nft_hash": "hash",
        "total_conversations": 0,
        "conversations": [],
    }))
    .unwrap();
    state.set_history("hash".to_string(), empty);
    state.begin_task();
    draw(&mut terminal, &mut state);

    let status = row_text(&terminal, 23);
    assert!(status.contains("http://localhost:8080"), "got: {status:?}");
    assert!(status.contains("agent: none"), "got: {status:?}");
    assert!(status.contains("history no pages"), "got: {status:?}");
    assert!(status.contains("working..."), "got: {status:?}");

    let input_border = row_text(&terminal, 20);
    assert!(input_border.contains("waiting for backend"), "got: {input_border:?}");
}

/// Wrapped chat lines should contribute to scroll bounds so long responses
/// don't appear clipped by the input area.
#[test]
fn scroll_clamp_accounts_for_wrapped_chat_height() {
    let mut terminal = Terminal::new(TestBackend::new(24, 10)).unwrap();
    let mut state = state();
    let greek = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu nu xi omicron pi rho sigma tau upsilon phi chi psi omega";
    state.push_message(ChatMessageKind::Agent, format!("{greek} {greek}"));
    state.scroll_offset = 100;
    draw(&mut terminal, &mut state);

    assert!(state.scroll_offset > 0);
    assert!(state.scroll_offset < 100);
}

/// New messages keep the viewport pinned to the bottom when not scrolled.
#[test]
fn auto_scroll_stays_pinned_to_bottom() {
    let mut terminal = Terminal::new(TestBackend::new(24, 10)).unwrap();
    let mut state = state();
    state.push_message(
        ChatMessageKind::Agent,
        "line1\nline2\nline3\nline4".to_string(),
    );
    draw(&mut terminal, &mut state);

    state.push_message(
        ChatMessageKind::Agent,
        "line5\nline6\nline7\nline8".to_string(),
    );
    draw(&mut terminal, &mut state);

    let text = all_text(&terminal);
    assert!(text.contains("line8"), "got:\n{text}");
    assert!(!text.contains("line1"), "got:\n{text}");
}

/// Cursor should be clamped to the input viewport when the input text exceeds available width.
#[test]
fn cursor_is_clamped_inside_input_viewport_for_long_input() {
    let mut terminal = Terminal::new(TestBackend::new(12, 8)).unwrap();
    let mut state = state();
    state.input = "abcdefghijklmnopqrstuvwxyz".to_string();
    state.cursor_pos = state.input.chars().count();
    draw(&mut terminal, &mut state);

    let cursor = terminal.get_cursor_position().unwrap();
    assert!(cursor.x < 12, "got {cursor:?}");
}
