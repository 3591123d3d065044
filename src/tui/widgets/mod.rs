// ABOUTME: TUI widget sub-modules for chat, agents pane, header badge, and status bar.
// ABOUTME: Each widget is a pure rendering function over plain data.

pub mod agents;
pub mod chat;
pub mod status;
