//! Scene compilation
//!
//! This module provides:
//! - Toolpath visualization strategies (toolpath)
//! - Depth slicing (slicer)
//! - Section annotation diagrams (section)
//! - Mark generators and step compilation (marks)
//! - SVG output surface (svg_surface)

pub mod marks;
pub mod section;
pub mod slicer;
pub mod svg_surface;
pub mod toolpath;

pub use marks::{
    calibration_outline, compile_mark, compile_step, CalibrationBox, MarkContext, CALIBRATION_HANDLE,
};
pub use section::{pass_depths, viz_pass_depths, viz_screw_depth, visualize_section, z_move_depth};
pub use slicer::{find_intersect, segments_from_irs, slice, Slice};
pub use svg_surface::{path_data, render_svg, SvgSurface};
pub use toolpath::{
    basic_vis, bore_vis, bounding_box_vis, depth_map_vis, face_ghost, locate_dowel_holes,
    outline_vis, visualize_toolpath,
};
