//! Centralized configuration paths for kraken-wm
//!
//! All config files live under:
//! - Unix/macOS: `~/.config/kraken-wm/`
//! - Windows: `%APPDATA%\kraken-wm\`
//!
//! This module is the single source of truth for config paths.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

const APP_DIR: &str = "kraken-wm";

/// Prefix of the daily rolling log files (`kraken-wm.log.YYYY-MM-DD`).
pub const LOG_FILE_PREFIX: &str = "kraken-wm.log";

/// Base config directory for kraken-wm
///
/// Unix/macOS:
///   - If XDG_CONFIG_HOME is set: `$XDG_CONFIG_HOME/kraken-wm`
///   - Else: `~/.config/kraken-wm`
///
/// Windows:
///   - `%APPDATA%\kraken-wm`
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|config| config.join(APP_DIR))
    }
}

/// `~/.config/kraken-wm/config.yaml`
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

/// `~/.config/kraken-wm/keymap.yaml`
pub fn keymap_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("keymap.yaml"))
}

/// `~/.config/kraken-wm/logs/`
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

/// Returns the most recent log file in `~/.config/kraken-wm/logs/`
/// (e.g., `kraken-wm.log.2026-01-07`)
pub fn log_file() -> Option<PathBuf> {
    let logs_dir = logs_dir()?;
    Some(newest_log_in(&logs_dir).unwrap_or_else(|| logs_dir.join(LOG_FILE_PREFIX)))
}

fn newest_log_in(logs_dir: &Path) -> Option<PathBuf> {
    let mut log_files: Vec<PathBuf> = fs::read_dir(logs_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX))
        })
        .collect();

    // YYYY-MM-DD sorts naturally
    log_files.sort_by(|a, b| b.cmp(a));
    log_files.into_iter().next()
}

fn ensure_dir(path: &Path) -> Result<(), String> {
    fs::create_dir_all(path)
        .map_err(|e| format!("Failed to create directory {}: {}", path.display(), e))
}

/// Ensure the base config dir exists, returning it
pub fn ensure_config_dir() -> Result<PathBuf, String> {
    let dir = config_dir().ok_or_else(|| "No config directory available".to_string())?;
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Ensure logs dir exists, returning it
pub fn ensure_logs_dir() -> Result<PathBuf, String> {
    let config = ensure_config_dir()?;
    let logs = config.join("logs");
    ensure_dir(&logs)?;
    Ok(logs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_log_wins() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "kraken-wm.log.2026-01-05",
            "kraken-wm.log.2026-01-07",
            "kraken-wm.log.2026-01-06",
            "other.txt",
        ] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let newest = newest_log_in(dir.path()).unwrap();
        assert!(newest.ends_with("kraken-wm.log.2026-01-07"));
    }

    #[test]
    fn test_no_logs() {
        let dir = tempfile::tempdir().unwrap();
        assert!(newest_log_in(dir.path()).is_none());
        assert!(newest_log_in(&dir.path().join("missing")).is_none());
    }
}
