// ABOUTME: TUI module: ratatui full-screen interface for chainclaw.
// ABOUTME: Wallet badge, agents pane, chat display, slash-command input, and status bar.

pub mod command;
pub mod input;
pub mod state;
pub mod ui;
pub mod widgets;

pub use state::*;
