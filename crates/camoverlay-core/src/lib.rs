//! # CamOverlay Core
//!
//! Core types shared by every CamOverlay crate:
//! geometric primitives, the convex hull utility, the homography engine,
//! unit handling, error types, and the wire data model polled from the
//! command source.

pub mod constants;
pub mod data;
pub mod error;
pub mod geometry;
pub mod homography;
pub mod hull;
pub mod units;

pub use data::{
    ArrowMark, BoxMark, CircleMark, Isa, Location, Mark, PlainMark, ScrewPositionMark,
    SectionAnnotationMark, SectionAnnotationName, Step, StepType, TextMark, ToolType,
    ToolpathMark, TssName,
};

pub use error::{Error, HomographyError, Result, SourceError};

pub use geometry::{circle_through, Intersect, Plane3, Segment3, Vec2, Vec3};

pub use homography::{Homography, HomographyEnvelope, HomographyRecord};

pub use hull::{make_hull, make_hull_presorted};

pub use units::Units;
