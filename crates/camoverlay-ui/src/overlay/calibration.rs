//! Calibration box interaction
//!
//! The operator drags the corners of the reference box until they line up
//! with the physical reference on the bed. Releasing the mouse produces the
//! correspondence record (original corners to dragged corners) that the
//! command source persists.

use tracing::{debug, info, warn};

use camoverlay_communication::CommandSource;
use camoverlay_core::{HomographyRecord, Vec2};
use camoverlay_visualizer::{calibration_outline, CalibrationBox, Group, CALIBRATION_HANDLE};

/// Draggable calibration box, in display units
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationTool {
    original: [Vec2; 4],
    corners: [Vec2; 4],
    active: Option<usize>,
    hit_tolerance: f64,
}

impl CalibrationTool {
    pub fn new(reference: &CalibrationBox, hit_tolerance: f64) -> Self {
        let corners = reference.corners();
        Self {
            original: corners,
            corners,
            active: None,
            hit_tolerance,
        }
    }

    /// Corners in paper order, as currently dragged
    pub fn corners(&self) -> &[Vec2; 4] {
        &self.corners
    }

    pub fn original_corners(&self) -> &[Vec2; 4] {
        &self.original
    }

    pub fn active_corner(&self) -> Option<usize> {
        self.active
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Put the corners back on the reference box
    pub fn reset(&mut self) {
        self.corners = self.original;
        self.active = None;
    }

    /// Replace the dragged corners outright
    pub fn set_corners(&mut self, corners: [Vec2; 4]) {
        self.corners = corners;
    }

    /// Grab the nearest corner within the hit tolerance
    pub fn on_mouse_down(&mut self, point: Vec2) -> Option<usize> {
        self.active = self
            .corners
            .iter()
            .enumerate()
            .map(|(i, corner)| (i, corner.distance(point)))
            .filter(|(_, distance)| *distance <= self.hit_tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i);
        if let Some(i) = self.active {
            debug!("Grabbed calibration corner {}", i);
        }
        self.active
    }

    /// Move the grabbed corner by `delta`
    pub fn on_mouse_drag(&mut self, delta: Vec2) {
        if let Some(i) = self.active {
            self.corners[i] += delta;
        }
    }

    /// Release the corner; returns the record to persist if one was grabbed
    pub fn on_mouse_up(&mut self) -> Option<HomographyRecord> {
        self.active.take()?;
        Some(self.record())
    }

    /// Correspondences from the reference box to the dragged corners
    pub fn record(&self) -> HomographyRecord {
        HomographyRecord::from_points(&self.original, &self.corners)
    }

    /// The box with its handles; the grabbed handle is highlighted
    pub fn scene(&self) -> Group {
        calibration_outline(&self.corners, CALIBRATION_HANDLE, self.active)
    }
}

/// Store a calibration record through the command source
///
/// Failures are logged and reported; the local drag state is kept either way.
pub async fn persist_calibration(
    source: &dyn CommandSource,
    record: &HomographyRecord,
) -> camoverlay_core::Result<()> {
    match source.put_homography(record).await {
        Ok(()) => {
            info!("Calibration saved");
            Ok(())
        }
        Err(e) => {
            warn!("Failed to save calibration: {}", e);
            Err(e)
        }
    }
}
