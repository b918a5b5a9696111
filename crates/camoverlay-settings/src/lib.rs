//! CamOverlay Settings Crate
//!
//! Handles overlay configuration: polling cadence, display scaling, the
//! calibration reference box, and machine defaults.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, CalibrationSettings, Config, DisplaySettings, MachineSettings,
    PollingSettings,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
