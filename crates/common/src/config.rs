//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Crop follow parameters.
    pub stabilizer: StabilizerDefaults,

    /// Per-tick telemetry / preview cadence.
    pub telemetry: TelemetryDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default crop follow parameters.
///
/// These are fixed for the lifetime of a run; the stabilizer copies them
/// into its own configuration at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerDefaults {
    /// Horizontal distance between the box centre and the crop's left edge.
    pub margin_x: f64,

    /// Vertical distance between the box top and the crop's top edge.
    pub margin_y: f64,

    /// Crop window width in pixels.
    pub output_width: u32,

    /// Crop window height in pixels.
    pub output_height: u32,

    /// Divisor applied to the remaining gap each frame (larger = slower follow).
    pub smoothing_rate: f64,

    /// Snap the window onto the target after every re-acquisition instead of
    /// only on the first tracked frame.
    pub reset_on_reacquire: bool,
}

/// Telemetry defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryDefaults {
    /// Emit a preview line every N frames.
    pub preview_every: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "followcrop=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for StabilizerDefaults {
    fn default() -> Self {
        Self {
            margin_x: 392.0,
            margin_y: 40.0,
            output_width: 784,
            output_height: 851,
            smoothing_rate: 16.0,
            reset_on_reacquire: false,
        }
    }
}

impl Default for TelemetryDefaults {
    fn default() -> Self {
        Self { preview_every: 16 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &std::path::Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(&config_path, json)?;
        Ok(config_path)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("followcrop").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let raw = r#"{ "stabilizer": { "smoothing_rate": 4.0 } }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.stabilizer.smoothing_rate, 4.0);
        assert_eq!(config.stabilizer.output_width, 784);
        assert_eq!(config.telemetry.preview_every, 16);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("followcrop-does-not-exist").join("config.json");
        let config = AppConfig::load_from(&path);
        assert_eq!(config.stabilizer, StabilizerDefaults::default());
    }

    #[test]
    fn test_unparseable_file_gives_defaults() {
        let dir = std::env::temp_dir().join(format!("followcrop-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config.stabilizer, StabilizerDefaults::default());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
