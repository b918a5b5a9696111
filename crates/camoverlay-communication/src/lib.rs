//! # CamOverlay Communication
//!
//! Command sources the overlay polls for steps and persists calibration to.
//! The in-process [`OverlayMailbox`] backs embedded use; [`SpoolDirectory`]
//! exchanges JSON files with an external producer.

pub mod source;

pub use source::{
    mailbox::OverlayMailbox, spool::SpoolDirectory, CommandSource, HOMOGRAPHY_FILE, STEP_FILE,
};
