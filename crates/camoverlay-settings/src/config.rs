//! Configuration for CamOverlay
//!
//! Provides configuration file handling and validation. Supports JSON and
//! TOML file formats; the default file lives in the platform config
//! directory.
//!
//! Configuration is organized into sections:
//! - Polling (interval, request timeout)
//! - Display (scale, axis orientation)
//! - Calibration reference box
//! - Machine defaults (EBB resolution, tool diameter)

use camoverlay_core::constants::{DEFAULT_TOOL_DIAMETER, EBB_STEPS_PER_MM};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// Command source polling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    /// Time between polls in milliseconds
    pub interval_ms: u64,
    /// A fetch running longer than this is abandoned
    pub request_timeout_ms: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            request_timeout_ms: 5000,
        }
    }
}

/// Projector display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Display units per millimeter
    pub scale_factor: f64,
    /// Render with the y axis pointing up
    pub flip_y: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            scale_factor: 1.0,
            flip_y: true,
        }
    }
}

/// Calibration reference box
///
/// Dimensions and offsets are in inches; `scale_factor` converts them to
/// display units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationSettings {
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale_factor: f64,
    /// How close a click must be to a corner to grab it, in display units
    pub hit_tolerance: f64,
}

impl Default for CalibrationSettings {
    fn default() -> Self {
        Self {
            width: 16.75,
            height: 16.0,
            offset_x: 1.0,
            offset_y: 0.625,
            scale_factor: 10.0,
            hit_tolerance: 25.0,
        }
    }
}

/// Machine defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineSettings {
    /// Stepper resolution used to lower EBB programs
    pub ebb_steps_per_mm: f64,
    /// Tool diameter in mm when a toolpath mark does not give one
    pub default_tool_diameter: f64,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            ebb_steps_per_mm: EBB_STEPS_PER_MM,
            default_tool_diameter: DEFAULT_TOOL_DIAMETER,
        }
    }
}

/// Complete overlay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Directory for the file-backed command source
    pub spool_dir: Option<PathBuf>,
    pub polling: PollingSettings,
    pub display: DisplaySettings,
    pub calibration: CalibrationSettings,
    pub machine: MachineSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        _ => Err(ConfigError::UnsupportedExtension {
            path: path.to_path_buf(),
        }
        .into()),
    }
}

fn require_positive(key: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(key, value))
    }
}

/// `<config dir>/camoverlay/config.toml`
pub fn default_config_path() -> SettingsResult<PathBuf> {
    let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDirectory)?;
    path.push("camoverlay");
    path.push("config.toml");
    Ok(path)
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Load the given file, or the default file if it exists, or defaults
    pub fn load_or_default(path: Option<&Path>) -> SettingsResult<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }
        match default_config_path() {
            Ok(path) if path.exists() => Self::load_from_file(&path),
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.polling.interval_ms == 0 {
            return Err(ConfigError::out_of_range("polling.interval_ms", 0));
        }
        if self.polling.request_timeout_ms == 0 {
            return Err(ConfigError::out_of_range("polling.request_timeout_ms", 0));
        }

        require_positive("display.scale_factor", self.display.scale_factor)?;

        require_positive("calibration.width", self.calibration.width)?;
        require_positive("calibration.height", self.calibration.height)?;
        require_positive("calibration.scale_factor", self.calibration.scale_factor)?;
        require_positive("calibration.hit_tolerance", self.calibration.hit_tolerance)?;
        for (key, value) in [
            ("calibration.offset_x", self.calibration.offset_x),
            ("calibration.offset_y", self.calibration.offset_y),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::out_of_range(key, value));
            }
        }

        require_positive("machine.ebb_steps_per_mm", self.machine.ebb_steps_per_mm)?;
        require_positive(
            "machine.default_tool_diameter",
            self.machine.default_tool_diameter,
        )?;

        Ok(())
    }
}
