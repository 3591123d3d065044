// ABOUTME: Library root for chainclaw: re-exports all modules for integration testing.
// ABOUTME: The binary entry point is in main.rs, which uses this crate as a library.

pub mod app;
pub mod backend;
pub mod config;
pub mod display;
pub mod identifier;
pub mod logging;
pub mod tui;
pub mod wallet;
