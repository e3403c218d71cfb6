//! Application configuration
//!
//! JSON file under the platform config dir. Missing fields take their
//! defaults, out-of-range values are clamped with a warning.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::drag::{AutoscrollConfig, GestureThresholds};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Used when LOG_LEVEL is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Show admin-only tiles
    #[serde(default)]
    pub privileged: bool,
    #[serde(default)]
    pub gesture: GestureThresholds,
    #[serde(default)]
    pub autoscroll: AutoscrollConfig,
    #[serde(default)]
    pub window: WindowSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindowSettings {
    #[serde(default = "default_window_width")]
    pub width: f32,
    #[serde(default = "default_window_height")]
    pub height: f32,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_window_width() -> f32 {
    crate::gui::constants::WINDOW_WIDTH
}

fn default_window_height() -> f32 {
    crate::gui::constants::WINDOW_HEIGHT
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            privileged: false,
            gesture: GestureThresholds::default(),
            autoscroll: AutoscrollConfig::default(),
            window: WindowSettings::default(),
        }
    }
}

fn clamp_distance(name: &str, value: &mut f32) {
    use crate::constants::validation::MAX_DISTANCE;

    if !value.is_finite() || *value < 0.0 {
        warn!(field = name, value = *value, "Invalid distance, clamping to 0");
        *value = 0.0;
    } else if *value > MAX_DISTANCE {
        warn!(field = name, value = *value, max = MAX_DISTANCE, "Distance exceeds maximum, clamping");
        *value = MAX_DISTANCE;
    }
}

impl AppConfig {
    pub fn path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::FILENAME);
        path
    }

    /// Load from the default location, writing defaults if the file is missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    /// Read only `log_level` from the file at `path`, without logging
    ///
    /// Lets the subscriber be installed before [`AppConfig::load`] runs, so its
    /// own events are not lost. Missing or unreadable files yield `None`.
    pub fn peek_log_level(path: &Path) -> Option<String> {
        let contents = fs::read_to_string(path).ok()?;
        let value: serde_json::Value = serde_json::from_str(&contents).ok()?;
        value.get("log_level")?.as_str().map(str::to_string)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Config file not found, creating default config at {:?}", path);
            let config = AppConfig::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        let mut config: AppConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON from {:?}", path))?;
        config.validate_and_clamp();

        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;

        fs::write(path, json).with_context(|| format!("Failed to write config to {:?}", path))?;

        info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Validate and clamp values to sane ranges
    pub fn validate_and_clamp(&mut self) {
        use crate::constants::validation::*;

        let gesture = &mut self.gesture;
        clamp_distance("gesture.drag_min_dy", &mut gesture.drag_min_dy);
        clamp_distance("gesture.small_dx_bound", &mut gesture.small_dx_bound);
        clamp_distance("gesture.small_dx_min_dy", &mut gesture.small_dx_min_dy);
        clamp_distance("gesture.scroll_cancel_dy", &mut gesture.scroll_cancel_dy);
        clamp_distance("gesture.scroll_cancel_dx", &mut gesture.scroll_cancel_dx);

        let autoscroll = &mut self.autoscroll;
        clamp_distance("autoscroll.edge_margin", &mut autoscroll.edge_margin);
        if autoscroll.edge_margin == 0.0 {
            warn!("autoscroll.edge_margin is 0, autoscroll disabled");
        }

        for (name, speed) in [
            ("autoscroll.max_speed", &mut autoscroll.max_speed),
            ("autoscroll.min_speed", &mut autoscroll.min_speed),
        ] {
            if !speed.is_finite() || *speed < 0.0 {
                warn!(field = name, value = *speed, "Invalid speed, clamping to 0");
                *speed = 0.0;
            } else if *speed > MAX_SPEED {
                warn!(field = name, value = *speed, max = MAX_SPEED, "Speed exceeds maximum, clamping");
                *speed = MAX_SPEED;
            }
        }
        if autoscroll.min_speed > autoscroll.max_speed {
            warn!(
                min_speed = autoscroll.min_speed,
                max_speed = autoscroll.max_speed,
                "min_speed exceeds max_speed, lowering min_speed"
            );
            autoscroll.min_speed = autoscroll.max_speed;
        }

        if autoscroll.tick_ms < MIN_TICK_MS {
            warn!(tick_ms = autoscroll.tick_ms, min = MIN_TICK_MS, "tick_ms below minimum, clamping");
            autoscroll.tick_ms = MIN_TICK_MS;
        } else if autoscroll.tick_ms > MAX_TICK_MS {
            warn!(tick_ms = autoscroll.tick_ms, max = MAX_TICK_MS, "tick_ms exceeds maximum, clamping");
            autoscroll.tick_ms = MAX_TICK_MS;
        }

        let min_width = crate::gui::constants::WINDOW_MIN_WIDTH;
        let min_height = crate::gui::constants::WINDOW_MIN_HEIGHT;
        if self.window.width.is_nan() || self.window.width < min_width {
            warn!(width = self.window.width, min = min_width, "Window width below minimum, clamping");
            self.window.width = min_width;
        }
        if self.window.height.is_nan() || self.window.height < min_height {
            warn!(height = self.window.height, min = min_height, "Window height below minimum, clamping");
            self.window.height = min_height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::validation::*;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"log_level": "debug", "gesture": {"drag_min_dy": 12.0}}"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.gesture.drag_min_dy, 12.0);
        assert_eq!(config.gesture.scroll_cancel_dx, GestureThresholds::default().scroll_cancel_dx);
        assert_eq!(config.autoscroll, AutoscrollConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.privileged = true;
        config.autoscroll.tick_ms = 33;
        config.save_to(&path).unwrap();

        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_peek_log_level() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert_eq!(AppConfig::peek_log_level(&path), None);
        assert!(!path.exists());

        fs::write(&path, r#"{"log_level": "warn", "window": {"width": 1.0}}"#).unwrap();
        assert_eq!(AppConfig::peek_log_level(&path).as_deref(), Some("warn"));

        fs::write(&path, r#"{"privileged": true}"#).unwrap();
        assert_eq!(AppConfig::peek_log_level(&path), None);

        fs::write(&path, r#"{"log_level": 3}"#).unwrap();
        assert_eq!(AppConfig::peek_log_level(&path), None);

        fs::write(&path, "{ not json").unwrap();
        assert_eq!(AppConfig::peek_log_level(&path), None);
    }

    #[test]
    fn test_validate_and_clamp() {
        let mut config = AppConfig::default();
        config.gesture.drag_min_dy = -3.0;
        config.gesture.scroll_cancel_dx = f32::NAN;
        config.autoscroll.edge_margin = 5000.0;
        config.autoscroll.max_speed = 10.0;
        config.autoscroll.min_speed = 50.0;
        config.autoscroll.tick_ms = 0;
        config.window.width = 10.0;

        config.validate_and_clamp();

        assert_eq!(config.gesture.drag_min_dy, 0.0);
        assert_eq!(config.gesture.scroll_cancel_dx, 0.0);
        assert_eq!(config.autoscroll.edge_margin, MAX_DISTANCE);
        assert_eq!(config.autoscroll.min_speed, 10.0);
        assert_eq!(config.autoscroll.tick_ms, MIN_TICK_MS);
        assert_eq!(config.window.width, crate::gui::constants::WINDOW_MIN_WIDTH);
    }
}
