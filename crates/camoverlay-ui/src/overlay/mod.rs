//! Overlay runtime
//!
//! - `compositor`: applies steps to a drawing surface
//! - `calibration`: corner dragging and homography capture
//! - `poller`: interval polling with cancellation and stale-result dropping

pub mod calibration;
pub mod compositor;
pub mod poller;
