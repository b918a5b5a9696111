//! Homography engine
//!
//! Computes the planar projective transform that maps idealized machine
//! coordinates onto the projector surface. The transform is defined by point
//! correspondences between the calibration box corners and the corners the
//! operator dragged them to.
//!
//! The correspondences, not the matrix, are what gets persisted
//! ([`HomographyRecord`]). Solving is deterministic, so rebuilding from the
//! same record always yields the same matrix.

use nalgebra::{DMatrix, DVector, Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::constants::MIN_CORRESPONDENCES;
use crate::error::HomographyError;
use crate::geometry::Vec2;

/// Ratio between smallest and largest singular value below which the
/// correspondence system is treated as singular.
const SINGULAR_RATIO: f64 = 1e-12;

/// Persisted correspondence record (`PUT /overlay/homography` body)
///
/// Points are flattened `x, y` pairs; four corners give eight numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomographyRecord {
    pub src_pts: Vec<f64>,
    pub dst_pts: Vec<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    src_pts: Option<Vec<f64>>,
    dst_pts: Option<Vec<f64>>,
}

impl HomographyRecord {
    /// Build a record from point lists
    pub fn from_points(src: &[Vec2], dst: &[Vec2]) -> Self {
        Self {
            src_pts: flatten(src),
            dst_pts: flatten(dst),
        }
    }

    /// Decode and validate a record from JSON.
    ///
    /// A payload missing `srcPts` or `dstPts` is rejected here instead of
    /// being stored half-filled.
    pub fn from_json(json: &str) -> Result<Self, HomographyError> {
        let raw: RawRecord =
            serde_json::from_str(json).map_err(|e| HomographyError::Malformed {
                reason: e.to_string(),
            })?;
        let record = Self {
            src_pts: raw.src_pts.ok_or_else(|| HomographyError::MissingField {
                field: "srcPts".to_string(),
            })?,
            dst_pts: raw.dst_pts.ok_or_else(|| HomographyError::MissingField {
                field: "dstPts".to_string(),
            })?,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Check shape and values without solving
    pub fn validate(&self) -> Result<(), HomographyError> {
        for (field, values) in [("srcPts", &self.src_pts), ("dstPts", &self.dst_pts)] {
            if values.len() % 2 != 0 {
                return Err(HomographyError::OddLength {
                    field: field.to_string(),
                    len: values.len(),
                });
            }
            if values.iter().any(|v| !v.is_finite()) {
                return Err(HomographyError::NonFinite {
                    field: field.to_string(),
                });
            }
        }
        if self.src_pts.len() != self.dst_pts.len() {
            return Err(HomographyError::LengthMismatch {
                src: self.src_pts.len() / 2,
                dst: self.dst_pts.len() / 2,
            });
        }
        if self.src_pts.len() / 2 < MIN_CORRESPONDENCES {
            return Err(HomographyError::TooFewPoints {
                required: MIN_CORRESPONDENCES,
                actual: self.src_pts.len() / 2,
            });
        }
        Ok(())
    }

    pub fn src_points(&self) -> Vec<Vec2> {
        unflatten(&self.src_pts)
    }

    pub fn dst_points(&self) -> Vec<Vec2> {
        unflatten(&self.dst_pts)
    }
}

/// `GET /overlay/homography` response: the record as a JSON string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomographyEnvelope {
    pub homography: String,
}

impl HomographyEnvelope {
    pub fn wrap(record: &HomographyRecord) -> Self {
        Self {
            homography: record.to_json(),
        }
    }

    pub fn unwrap_record(&self) -> Result<HomographyRecord, HomographyError> {
        HomographyRecord::from_json(&self.homography)
    }
}

fn flatten(points: &[Vec2]) -> Vec<f64> {
    points.iter().flat_map(|p| [p.x, p.y]).collect()
}

fn unflatten(values: &[f64]) -> Vec<Vec2> {
    values
        .chunks_exact(2)
        .map(|pair| Vec2::new(pair[0], pair[1]))
        .collect()
}

/// Planar projective transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    matrix: Matrix3<f64>,
}

impl Default for Homography {
    fn default() -> Self {
        Self::identity()
    }
}

impl Homography {
    /// The pre-calibration transform
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
        }
    }

    pub fn from_matrix(matrix: Matrix3<f64>) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    pub fn is_identity(&self) -> bool {
        self.matrix == Matrix3::identity()
    }

    /// Rebuild the transform from a persisted record
    pub fn from_record(record: &HomographyRecord) -> Result<Self, HomographyError> {
        record.validate()?;
        Self::from_correspondences(&record.src_points(), &record.dst_points())
    }

    /// Solve the direct linear transform for `src[i] -> dst[i]`.
    ///
    /// Points are Hartley-normalized before solving. Exactly four pairs give
    /// the exact solution; more pairs give the least-squares fit. Identical
    /// point sets short-circuit to the exact identity.
    pub fn from_correspondences(src: &[Vec2], dst: &[Vec2]) -> Result<Self, HomographyError> {
        if src.len() != dst.len() {
            return Err(HomographyError::LengthMismatch {
                src: src.len(),
                dst: dst.len(),
            });
        }
        if src.len() < MIN_CORRESPONDENCES {
            return Err(HomographyError::TooFewPoints {
                required: MIN_CORRESPONDENCES,
                actual: src.len(),
            });
        }
        if src == dst {
            trace!("Identical correspondences, using identity homography");
            return Ok(Self::identity());
        }

        let (t_src, src_n) = normalize(src, "srcPts")?;
        let (t_dst, dst_n) = normalize(dst, "dstPts")?;

        let rows = src.len() * 2;
        let mut a = DMatrix::<f64>::zeros(rows, 8);
        let mut b = DVector::<f64>::zeros(rows);
        for (i, (s, d)) in src_n.iter().zip(dst_n.iter()).enumerate() {
            let r = 2 * i;
            a[(r, 0)] = s.x;
            a[(r, 1)] = s.y;
            a[(r, 2)] = 1.0;
            a[(r, 6)] = -d.x * s.x;
            a[(r, 7)] = -d.x * s.y;
            b[r] = d.x;

            a[(r + 1, 3)] = s.x;
            a[(r + 1, 4)] = s.y;
            a[(r + 1, 5)] = 1.0;
            a[(r + 1, 6)] = -d.y * s.x;
            a[(r + 1, 7)] = -d.y * s.y;
            b[r + 1] = d.y;
        }

        let svd = a.svd(true, true);
        let max_sv = svd.singular_values.max();
        let min_sv = svd.singular_values.min();
        if max_sv <= 0.0 || min_sv / max_sv < SINGULAR_RATIO {
            return Err(HomographyError::Degenerate {
                reason: "correspondence system is singular (collinear points?)".to_string(),
            });
        }
        let h = svd
            .solve(&b, SINGULAR_RATIO * max_sv)
            .map_err(|e| HomographyError::Degenerate {
                reason: e.to_string(),
            })?;

        let normalized = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0);
        let t_dst_inv = t_dst.try_inverse().ok_or_else(|| HomographyError::Degenerate {
            reason: "destination normalization is not invertible".to_string(),
        })?;
        let mut matrix = t_dst_inv * normalized * t_src;

        let scale = matrix[(2, 2)];
        if scale.abs() > f64::EPSILON {
            matrix /= scale;
        }
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(HomographyError::Degenerate {
                reason: "solution is not finite".to_string(),
            });
        }

        debug!("Solved homography from {} correspondences", src.len());
        Ok(Self { matrix })
    }

    /// Map `(x, y)` through the transform.
    ///
    /// Points that map to infinity are returned unchanged.
    pub fn transform(&self, x: f64, y: f64) -> (f64, f64) {
        let v = self.matrix * Vector3::new(x, y, 1.0);
        if v.z.abs() < f64::EPSILON || !v.z.is_finite() {
            trace!("Point ({}, {}) maps to infinity, leaving it in place", x, y);
            return (x, y);
        }
        (v.x / v.z, v.y / v.z)
    }

    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        let (x, y) = self.transform(p.x, p.y);
        Vec2::new(x, y)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }
}

/// Hartley normalization: centroid to the origin, mean distance sqrt(2).
fn normalize(points: &[Vec2], field: &str) -> Result<(Matrix3<f64>, Vec<Vec2>), HomographyError> {
    let n = points.len() as f64;
    let centroid = points.iter().fold(Vec2::ZERO, |acc, p| acc + *p) / n;
    let mean_dist = points.iter().map(|p| p.distance(centroid)).sum::<f64>() / n;
    if mean_dist < f64::EPSILON {
        return Err(HomographyError::Degenerate {
            reason: format!("all points in '{}' coincide", field),
        });
    }
    let s = std::f64::consts::SQRT_2 / mean_dist;
    let t = Matrix3::new(
        s,
        0.0,
        -s * centroid.x,
        0.0,
        s,
        -s * centroid.y,
        0.0,
        0.0,
        1.0,
    );
    let normalized = points.iter().map(|p| (*p - centroid) * s).collect();
    Ok((t, normalized))
}
