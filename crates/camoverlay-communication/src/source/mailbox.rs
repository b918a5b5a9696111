//! In-process mailbox
//!
//! Holds the latest posted step and the stored homography record. Each post
//! replaces the previous step; polling clears it.

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info};

use camoverlay_core::{Error, HomographyRecord, Result, SourceError, Step};

use super::CommandSource;

/// Process-wide overlay state shared between producers and the overlay
#[derive(Debug, Default)]
pub struct OverlayMailbox {
    latest_step: RwLock<Option<Step>>,
    homography: RwLock<Option<HomographyRecord>>,
}

impl OverlayMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending step
    pub fn post_step(&self, step: Step) {
        debug!("Posted step '{}' ({})", step.name, step.step_type);
        *self.latest_step.write() = Some(step);
    }

    /// Whether a step is waiting to be polled
    pub fn has_pending_step(&self) -> bool {
        self.latest_step.read().is_some()
    }

    /// Synchronous store used by producers that are not async
    pub fn set_homography(&self, record: HomographyRecord) -> Result<()> {
        record
            .validate()
            .map_err(|e| Error::from(SourceError::Rejected(e)))?;
        *self.homography.write() = Some(record);
        info!("Stored homography correspondences");
        Ok(())
    }

    pub fn homography(&self) -> Option<HomographyRecord> {
        self.homography.read().clone()
    }
}

#[async_trait]
impl CommandSource for OverlayMailbox {
    async fn poll(&self) -> Result<Option<Step>> {
        Ok(self.latest_step.write().take())
    }

    async fn get_homography(&self) -> Result<Option<HomographyRecord>> {
        Ok(self.homography())
    }

    async fn put_homography(&self, record: &HomographyRecord) -> Result<()> {
        self.set_homography(record.clone())
    }
}
