//! # CamOverlay
//!
//! Projects CAM toolpaths and setup marks onto the machine bed through a
//! calibrated projector overlay.
//!
//! ## Architecture
//!
//! CamOverlay is organized as a workspace with multiple crates:
//!
//! 1. **camoverlay-core** - Geometry, hull, homography engine, wire data model, errors
//! 2. **camoverlay-visualizer** - Instruction lowering, visualization strategies, scene, SVG
//! 3. **camoverlay-communication** - Command sources (in-process mailbox, spool directory)
//! 4. **camoverlay-settings** - Configuration files and validation
//! 5. **camoverlay-ui** - Compositor, calibration tool, poll loop
//! 6. **camoverlay** - Command-line binary that integrates all crates

use std::path::Path;

use anyhow::Context;

pub use camoverlay_communication::{CommandSource, OverlayMailbox, SpoolDirectory};

pub use camoverlay_core::{
    Error, Homography, HomographyEnvelope, HomographyError, HomographyRecord, Mark, Result,
    SourceError, Step, StepType, Units, Vec2,
};

pub use camoverlay_settings::{Config, SettingsError};

pub use camoverlay_ui::{
    mark_context, persist_calibration, run_poll_loop, CalibrationTool, Compositor, FetchedStep,
    OverlayState,
};

pub use camoverlay_visualizer::{compile_step, render_svg, DrawingSurface, Group, SvgSurface};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Logs go to stderr so rendered SVG can be piped from stdout. `RUST_LOG`
/// overrides the default `info` level.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(())
}

/// Read a step from a JSON file
pub fn load_step(path: &Path) -> anyhow::Result<Step> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read step file {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid step file {}", path.display()))
}

/// Read a homography from a JSON file
///
/// Accepts either a bare `{srcPts, dstPts}` record or the
/// `{"homography": "<record json>"}` envelope.
pub fn load_homography(path: &Path) -> anyhow::Result<Homography> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read homography file {}", path.display()))?;

    let record = match serde_json::from_str::<HomographyEnvelope>(&json) {
        Ok(envelope) => envelope.unwrap_record(),
        Err(_) => HomographyRecord::from_json(&json),
    }
    .with_context(|| format!("Invalid homography file {}", path.display()))?;

    Homography::from_record(&record)
        .with_context(|| format!("Cannot solve homography from {}", path.display()))
}
