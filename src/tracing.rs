//! Debug tracing infrastructure for development diagnostics
//!
//! Provides structured logging with scoped filtering for debugging event
//! dispatch, modal operators and handler-stack transitions.
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=kraken_wm::wm=debug` - dispatch traces only
//! - `RUST_LOG=kraken_wm::msgbus=trace` - message bus publish/notify
//!
//! # Log Files
//!
//! Logs are written to `~/.config/kraken-wm/logs/kraken-wm.log` with daily rotation.
//! File logging uses debug level by default for more verbose troubleshooting.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config_paths::LOG_FILE_PREFIX;
use crate::wm::Window;

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG env var (default `warn`). File logging
/// writes to `~/.config/kraken-wm/logs/kraken-wm.log` with daily rotation.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {}", e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

/// Lightweight snapshot of a window's handler stacks for diffing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerSnapshot {
    pub modal: Vec<String>,
    pub window: usize,
    pub areas: usize,
    pub regions: usize,
    pub queued: usize,
}

impl HandlerSnapshot {
    pub fn from_window(win: &Window) -> Self {
        Self {
            modal: win
                .modalhandlers
                .iter()
                .map(|h| h.describe())
                .collect(),
            window: win.handlers.len(),
            areas: win.areas.iter().map(|a| a.handlers.len()).sum(),
            regions: win
                .areas
                .iter()
                .flat_map(|a| a.regions.iter())
                .map(|r| r.handlers.len())
                .sum(),
            queued: win.queue.len(),
        }
    }

    /// Describe what changed between two snapshots
    pub fn diff(&self, other: &HandlerSnapshot) -> Option<String> {
        let mut changes = Vec::new();

        if self.modal != other.modal {
            changes.push(format!("modal: {:?} → {:?}", self.modal, other.modal));
        }
        if self.window != other.window {
            changes.push(format!("window handlers: {} → {}", self.window, other.window));
        }
        if self.areas != other.areas {
            changes.push(format!("area handlers: {} → {}", self.areas, other.areas));
        }
        if self.regions != other.regions {
            changes.push(format!("region handlers: {} → {}", self.regions, other.regions));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_reports_modal_changes() {
        let before = HandlerSnapshot {
            modal: vec![],
            window: 2,
            areas: 0,
            regions: 1,
            queued: 0,
        };
        let after = HandlerSnapshot {
            modal: vec!["operator(wm.gesture_box)".to_string()],
            ..before.clone()
        };
        let diff = before.diff(&after).unwrap();
        assert!(diff.contains("wm.gesture_box"));
        assert!(before.diff(&before.clone()).is_none());
    }
}
