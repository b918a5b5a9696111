//! # CamOverlay UI
//!
//! The overlay itself: the compositor that turns polled steps into a warped
//! scene, the draggable calibration box, and the poll loop that feeds them.

pub mod overlay;

pub use camoverlay_settings::{Config, DisplaySettings, PollingSettings};

pub use overlay::{
    calibration::{persist_calibration, CalibrationTool},
    compositor::{mark_context, Compositor, OverlayState},
    poller::{fetch_step, run_poll_loop, FetchedStep, PendingStep, RequestSequencer},
};
