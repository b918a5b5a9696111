//! Command source interface
//!
//! A command source hands out at most one pending [`Step`] per poll and
//! stores the calibration correspondences. Reads are cheap and may be
//! repeated; `poll` is read-and-clear.

pub mod mailbox;
pub mod spool;

use std::sync::Arc;

use async_trait::async_trait;
use camoverlay_core::{HomographyRecord, Result, Step};

/// Step file consumed by the spool source
pub const STEP_FILE: &str = "step.json";

/// Homography envelope persisted by the spool source
pub const HOMOGRAPHY_FILE: &str = "homography.json";

/// Source of overlay steps and calibration state
#[async_trait]
pub trait CommandSource: Send + Sync {
    /// Take the pending step, if any. A second poll without a new post
    /// returns `None`.
    async fn poll(&self) -> Result<Option<Step>>;

    /// The stored calibration correspondences, if calibrated
    async fn get_homography(&self) -> Result<Option<HomographyRecord>>;

    /// Validate and store new correspondences
    ///
    /// Invalid records are rejected and leave the stored record untouched.
    async fn put_homography(&self, record: &HomographyRecord) -> Result<()>;
}

#[async_trait]
impl<T: CommandSource + ?Sized> CommandSource for Arc<T> {
    async fn poll(&self) -> Result<Option<Step>> {
        (**self).poll().await
    }

    async fn get_homography(&self) -> Result<Option<HomographyRecord>> {
        (**self).get_homography().await
    }

    async fn put_homography(&self, record: &HomographyRecord) -> Result<()> {
        (**self).put_homography(record).await
    }
}
