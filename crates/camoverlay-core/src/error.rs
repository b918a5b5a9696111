//! Error handling for CamOverlay
//!
//! Provides the error types shared across the workspace:
//! - Homography errors (correspondence validation and solving)
//! - Source errors (polling the command source, persisting calibration)
//!
//! Instruction lowering never fails: unknown or malformed instructions are
//! skipped, so there is no parse error type here.

use thiserror::Error;

/// Homography error type
///
/// Raised when a correspondence payload is malformed or the points cannot
/// define a projective transform.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HomographyError {
    /// A correspondence list is absent from the payload
    #[error("Missing correspondence field '{field}'")]
    MissingField {
        /// The absent field name (`srcPts` or `dstPts`).
        field: String,
    },

    /// A flattened point list does not contain whole (x, y) pairs
    #[error("Correspondence field '{field}' has odd length {len}")]
    OddLength {
        /// The offending field name.
        field: String,
        /// The number of values supplied.
        len: usize,
    },

    /// Source and destination lists disagree in size
    #[error("Source has {src} points but destination has {dst}")]
    LengthMismatch {
        /// Number of source points.
        src: usize,
        /// Number of destination points.
        dst: usize,
    },

    /// Fewer correspondences than a projective transform needs
    #[error("Need at least {required} point pairs, got {actual}")]
    TooFewPoints {
        /// Minimum number of pairs.
        required: usize,
        /// Number of pairs supplied.
        actual: usize,
    },

    /// A coordinate is NaN or infinite
    #[error("Non-finite coordinate in '{field}'")]
    NonFinite {
        /// The offending field name.
        field: String,
    },

    /// The points are coincident or collinear
    #[error("Degenerate correspondences: {reason}")]
    Degenerate {
        /// Why the points cannot define a transform.
        reason: String,
    },

    /// The payload could not be decoded at all
    #[error("Malformed homography payload: {reason}")]
    Malformed {
        /// The decoder message.
        reason: String,
    },
}

/// Command source error type
///
/// Represents failures talking to the external command source.
#[derive(Error, Debug, Clone)]
pub enum SourceError {
    /// The source could not be reached
    #[error("Command source unavailable: {reason}")]
    Unavailable {
        /// The reason the source is unreachable.
        reason: String,
    },

    /// The request did not complete in time
    #[error("Command source timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// The response body could not be decoded
    #[error("Failed to decode {what}: {reason}")]
    Decode {
        /// What was being decoded.
        what: String,
        /// The decoder message.
        reason: String,
    },

    /// The source rejected a homography payload
    #[error("Homography rejected: {0}")]
    Rejected(#[from] HomographyError),

    /// Storage I/O failure
    #[error("I/O error: {reason}")]
    Io {
        /// The reason for the I/O error.
        reason: String,
    },
}

/// Main error type for CamOverlay
#[derive(Error, Debug)]
pub enum Error {
    /// Homography error
    #[error(transparent)]
    Homography(#[from] HomographyError),

    /// Command source error
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Source(SourceError::Timeout { .. }))
    }

    /// Check if this is a homography validation error
    pub fn is_homography_error(&self) -> bool {
        matches!(
            self,
            Error::Homography(_) | Error::Source(SourceError::Rejected(_))
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_homography_error_display() {
        let err = HomographyError::MissingField {
            field: "srcPts".to_string(),
        };
        assert_eq!(err.to_string(), "Missing correspondence field 'srcPts'");

        let err = HomographyError::TooFewPoints {
            required: 4,
            actual: 3,
        };
        assert_eq!(err.to_string(), "Need at least 4 point pairs, got 3");
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = HomographyError::Degenerate {
            reason: "collinear".to_string(),
        }
        .into();
        assert!(err.is_homography_error());

        let err: Error = SourceError::Timeout { timeout_ms: 500 }.into();
        assert!(err.is_timeout());
        assert!(!err.is_homography_error());

        let rejected: SourceError = HomographyError::OddLength {
            field: "dstPts".to_string(),
            len: 7,
        }
        .into();
        assert!(Error::from(rejected).is_homography_error());
    }
}
