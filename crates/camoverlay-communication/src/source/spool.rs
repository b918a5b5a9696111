//! File-backed command source
//!
//! A producer drops `step.json` into the spool directory; polling reads and
//! removes it. Calibration is kept in `homography.json` as the same
//! `{"homography": "<record json>"}` envelope the HTTP source serves.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use camoverlay_core::{
    Error, HomographyEnvelope, HomographyRecord, Result, SourceError, Step,
};

use super::{CommandSource, HOMOGRAPHY_FILE, STEP_FILE};

fn io_error(path: &Path, err: std::io::Error) -> Error {
    SourceError::Io {
        reason: format!("{}: {}", path.display(), err),
    }
    .into()
}

fn decode_error(what: &str, err: impl std::fmt::Display) -> Error {
    SourceError::Decode {
        what: what.to_string(),
        reason: err.to_string(),
    }
    .into()
}

/// Spool directory command source
#[derive(Debug, Clone)]
pub struct SpoolDirectory {
    root: PathBuf,
}

impl SpoolDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn step_path(&self) -> PathBuf {
        self.root.join(STEP_FILE)
    }

    pub fn homography_path(&self) -> PathBuf {
        self.root.join(HOMOGRAPHY_FILE)
    }

    /// Write a step for the next poll to pick up
    pub async fn post_step(&self, step: &Step) -> Result<()> {
        let json = serde_json::to_string_pretty(step)?;
        self.write_atomic(&self.step_path(), &json).await
    }

    /// `None` when the file does not exist
    async fn read_optional(&self, path: &Path) -> Result<Option<String>> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(path, e)),
        }
    }

    /// Write through a temporary sibling so readers never see half a file
    async fn write_atomic(&self, path: &Path, contents: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_error(&self.root, e))?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| io_error(path, e))
    }
}

#[async_trait]
impl CommandSource for SpoolDirectory {
    async fn poll(&self) -> Result<Option<Step>> {
        let path = self.step_path();
        let Some(contents) = self.read_optional(&path).await? else {
            return Ok(None);
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(io_error(&path, e)),
        }

        let step: Step = serde_json::from_str(&contents).map_err(|e| decode_error("step", e))?;
        debug!("Consumed step '{}' from {}", step.name, path.display());
        Ok(Some(step))
    }

    async fn get_homography(&self) -> Result<Option<HomographyRecord>> {
        let path = self.homography_path();
        let Some(contents) = self.read_optional(&path).await? else {
            return Ok(None);
        };
        let envelope: HomographyEnvelope =
            serde_json::from_str(&contents).map_err(|e| decode_error("homography envelope", e))?;
        let record = envelope
            .unwrap_record()
            .map_err(|e| decode_error("homography record", e))?;
        Ok(Some(record))
    }

    async fn put_homography(&self, record: &HomographyRecord) -> Result<()> {
        record
            .validate()
            .map_err(|e| Error::from(SourceError::Rejected(e)))?;
        let json = serde_json::to_string_pretty(&HomographyEnvelope::wrap(record))?;
        self.write_atomic(&self.homography_path(), &json).await?;
        info!("Saved homography to {}", self.homography_path().display());
        Ok(())
    }
}
