// ABOUTME: Tracing subscriber setup: log lines go to a file because the TUI owns the terminal.
// ABOUTME: RUST_LOG selects the filter; CHAINCLAW_LOG_JSON=1 switches to JSON lines.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_JSON_ENV: &str = "CHAINCLAW_LOG_JSON";

/// Install the global subscriber, appending to `log_path`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(log_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let use_json = std::env::var(LOG_JSON_ENV)
        .map(|value| value == "1")
        .unwrap_or(false);

    if use_json {
        let _ = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .json()
            .with_writer(Mutex::new(file))
            .try_init();
    } else {
        let _ = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .try_init();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_log_file_and_parent_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("chainclaw.log");
        init_logging(&path).unwrap();
        assert!(path.exists());
        // Second call is a no-op rather than an error.
        init_logging(&path).unwrap();
    }
}
