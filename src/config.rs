//! Window-manager preferences
//!
//! Stored in `~/.config/kraken-wm/config.yaml`. Every field has a default, so
//! partial files are fine.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config directory available")]
    NoConfigDir,

    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Input and timing preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WmConfig {
    /// Maximum time between two presses forming a double click.
    pub double_click_time_ms: u64,
    /// Drag threshold after a keyboard (or other non-mouse) press, in pixels.
    pub drag_threshold: i32,
    pub drag_threshold_mouse: i32,
    pub drag_threshold_tablet: i32,
    /// Cursor motion that dismisses a tooltip, in pixels.
    pub move_threshold: i32,
    pub dpi_fac: f32,
    pub tooltip_delay_secs: f64,
    /// Pressure reaching full strength, before the softness curve.
    pub pressure_threshold_max: f32,
    pub pressure_softness: f32,
    /// Alt + left mouse acts as middle mouse.
    pub emulate_3_button: bool,
    /// Top-row digits act as numpad keys.
    pub emulate_numpad: bool,
    /// Keep the last skipped cursor position when motion coalesces.
    pub use_inbetween_mousemove: bool,
    /// Render shortcuts with symbol glyphs; platform default when unset.
    pub keymap_glyphs: Option<bool>,
}

impl Default for WmConfig {
    fn default() -> Self {
        Self {
            double_click_time_ms: 350,
            drag_threshold: 30,
            drag_threshold_mouse: 3,
            drag_threshold_tablet: 10,
            move_threshold: 3,
            dpi_fac: 1.0,
            tooltip_delay_secs: 0.5,
            pressure_threshold_max: 1.0,
            pressure_softness: 0.0,
            emulate_3_button: false,
            emulate_numpad: false,
            use_inbetween_mousemove: false,
            keymap_glyphs: None,
        }
    }
}

impl WmConfig {
    /// Load config from the config directory, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::read(path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Save config to the config directory
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = crate::config_paths::config_file().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_yaml::to_string(self)?)?;
        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn double_click_time(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.double_click_time_ms)
    }

    /// Map raw tablet pressure through the threshold and softness curve.
    pub fn pressure_curve(&self, pressure: f32) -> f32 {
        let mut pressure = pressure;
        if self.pressure_threshold_max != 0.0 {
            pressure /= self.pressure_threshold_max;
        }
        pressure = pressure.clamp(0.0, 1.0);
        if self.pressure_softness != 0.0 {
            pressure = pressure.powf(4.0_f32.powf(-self.pressure_softness));
        }
        pressure
    }
}
