//! # CamOverlay Visualizer
//!
//! Instruction lowering, toolpath visualization, and scene compilation for
//! CamOverlay. Includes the three dialect lowerers, the scene graph, the
//! visualization strategies, and the SVG drawing surface.

pub mod ir;
pub mod scene;
pub mod utils;
pub mod viewport;
pub mod visualizer;

pub use ir::{
    absolute_positions, lower, lower_ebb, lower_ebb_with, lower_gcode, lower_sbp, unit_scale,
    ArcGeometry, IrArgs, IrNode, IrState, LoweringOptions, Op, Winding,
};

pub use scene::{Color, DrawingSurface, Embedded, Group, Item, PathCommand, SceneText, ScenePath, Style};

pub use viewport::Bounds;

pub use visualizer::{
    basic_vis, bore_vis, bounding_box_vis, calibration_outline, compile_mark, compile_step,
    depth_map_vis, face_ghost, find_intersect, locate_dowel_holes, outline_vis, pass_depths,
    path_data, render_svg,
    segments_from_irs, slice, visualize_section, visualize_toolpath, viz_pass_depths,
    viz_screw_depth, z_move_depth, CalibrationBox, MarkContext, Slice, SvgSurface,
    CALIBRATION_HANDLE,
};
