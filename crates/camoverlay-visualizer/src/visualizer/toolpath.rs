//! Toolpath visualization strategies
//!
//! Every strategy takes lowered IR and returns a [`Group`] in millimeters.
//! Inch streams (decided by the first node) are scaled by 25.4 at the end.

use camoverlay_core::constants::VERTEX_EPSILON;
use camoverlay_core::{make_hull, ToolType, ToolpathMark, TssName, Vec2};

use super::slicer::slice;
use crate::ir::{absolute_positions, lower, unit_scale, IrNode, LoweringOptions, Op};
use crate::scene::{Color, Group, ScenePath, Style};
use crate::utils::{circle_polygon, ARC_TOLERANCE};
use crate::viewport::Bounds;

/// Stroke width of drawn toolpaths, in millimeters
pub const TOOLPATH_STROKE_WIDTH: f64 = 0.5;

/// Opacity of the tool-width ghost drawn under face-mill paths
pub const GHOST_OPACITY: f64 = 0.3;

fn toolpath_style() -> Style {
    Style::stroked(Color::BLUE, TOOLPATH_STROKE_WIDTH)
}

/// Collects paths while walking the IR
struct PathBuilder {
    finished: Vec<ScenePath>,
    active: ScenePath,
}

impl PathBuilder {
    fn new() -> Self {
        Self {
            finished: Vec::new(),
            active: ScenePath::new(toolpath_style()),
        }
    }

    fn flush(&mut self) {
        let done = std::mem::replace(&mut self.active, ScenePath::new(toolpath_style()));
        if done.vertices().len() >= 2 {
            self.finished.push(done);
        }
    }

    fn start_at(&mut self, p: Vec2) {
        self.flush();
        self.active.move_to(p);
    }

    fn extend_to(&mut self, p: Vec2) {
        match self.active.vertices().last() {
            None => self.active.move_to(p),
            Some(last) if last.distance(p) > VERTEX_EPSILON => self.active.line_to(p),
            Some(_) => {}
        }
    }

    fn push_arc(&mut self, from: Vec2, through: Vec2, to: Vec2) {
        self.flush();
        let mut arc = ScenePath::new(toolpath_style());
        arc.move_to(from);
        arc.arc_to(through, to);
        self.finished.push(arc);
        self.active.move_to(to);
    }

    fn finish(mut self) -> Vec<ScenePath> {
        self.flush();
        self.finished
    }
}

/// Draw the path itself
///
/// A move with the tool off the bed ends the active path and starts a new
/// one at its target. Each arc is drawn as its own three-point path.
pub fn basic_vis(irs: &[IrNode]) -> Group {
    let mut builder = PathBuilder::new();
    let mut current = camoverlay_core::Vec3::ZERO;

    for ir in irs {
        let target = ir.resolve(current);
        match ir.op {
            Op::Move if !ir.state.tool_on_bed => builder.start_at(target.truncate()),
            Op::Move => builder.extend_to(target.truncate()),
            Op::Arc => {
                let geom = ir.arc_geometry(current.truncate());
                builder.push_arc(current.truncate(), geom.through, target.truncate());
            }
        }
        current = target;
    }

    let mut group = Group::new("basic").with_paths(builder.finish());
    group.scale(unit_scale(irs));
    group
}

/// Semi-transparent copy of every path at the tool's cutting width
pub fn face_ghost(paths: &Group, tool_diameter: f64) -> Group {
    let ghost_style = Style::stroked(Color::BLUE, tool_diameter).with_opacity(GHOST_OPACITY);
    Group::new("ghost").with_paths(paths.paths().into_iter().map(|path| ScenePath {
        commands: path.commands.clone(),
        style: ghost_style.clone(),
    }))
}

/// Find the two dowel holes of a bore toolpath
///
/// The first hole is the first node with explicit, non-zero x and y. The
/// second is the first later position with negative x. This matches how the
/// bore programs are generated and is not a general hole detector.
pub fn locate_dowel_holes(irs: &[IrNode]) -> (Option<Vec2>, Option<Vec2>) {
    let positions = absolute_positions(irs);
    let first = irs.iter().position(|ir| {
        matches!((ir.args.x, ir.args.y), (Some(x), Some(y)) if x != 0.0 && y != 0.0)
    });
    let Some(first) = first else {
        return (None, None);
    };
    let second = positions[first + 1..]
        .iter()
        .find(|p| p.x < 0.0)
        .map(|p| p.truncate());
    (Some(positions[first].truncate()), second)
}

/// Filled circles at the dowel holes
///
/// `diameter` is in the units of the instruction stream, so an inch program
/// takes an inch dowel diameter.
pub fn bore_vis(irs: &[IrNode], diameter: f64) -> Group {
    let (first, second) = locate_dowel_holes(irs);
    let style = Style::filled(Color::RED);
    let mut group = Group::new("bore").with_paths([first, second].into_iter().flatten().map(|hole| {
        let outline = circle_polygon(hole, diameter / 2.0, ARC_TOLERANCE);
        ScenePath::polygon(&outline, style.clone())
    }));
    group.scale(unit_scale(irs));
    group
}

/// Convex silhouette of all path vertices
pub fn outline_vis(irs: &[IrNode]) -> Group {
    let points: Vec<Vec2> = absolute_positions(irs)
        .into_iter()
        .map(|p| p.truncate())
        .collect();
    let hull = make_hull(&points);
    let mut group = Group::new("outline").with_paths([ScenePath::polygon(&hull, toolpath_style())]);
    group.scale(unit_scale(irs));
    group
}

/// Axis-aligned bounding rectangle of the path
pub fn bounding_box_vis(irs: &[IrNode]) -> Group {
    let points: Vec<Vec2> = absolute_positions(irs)
        .into_iter()
        .map(|p| p.truncate())
        .collect();
    let bounds = Bounds::from_points(&points);
    let mut group = Group::new("boundingBox");
    if bounds.is_valid() {
        group.push_path(ScenePath::polygon(&bounds.corners(), toolpath_style()));
    }
    group.scale(unit_scale(irs));
    group
}

/// One filled silhouette per cutting depth; deeper slices are more opaque
pub fn depth_map_vis(irs: &[IrNode]) -> Group {
    let slices = slice(irs);
    let deepest = slices
        .iter()
        .map(|s| s.depth.abs())
        .fold(0.0_f64, f64::max);

    let mut group = Group::new("depthMap");
    for s in &slices {
        let opacity = if deepest > 0.0 { s.depth.abs() / deepest } else { 1.0 };
        let style = Style::filled(Color::BLUE).with_opacity(opacity.max(0.1));
        group.push_path(ScenePath::polygon(&s.hull, style));
    }
    group.scale(unit_scale(irs));
    group
}

/// Lower and draw a toolpath mark with its strategy
pub fn visualize_toolpath(
    mark: &ToolpathMark,
    options: &LoweringOptions,
    default_tool_diameter: f64,
) -> Group {
    let Some(irs) = lower(&mark.isa, &mark.instructions, options) else {
        return Group::new("toolpath");
    };

    let drawn = match &mark.tss_name {
        TssName::Basic => basic_vis(&irs),
        TssName::Bore => {
            // The fallback diameter is in millimeters
            let diameter = mark
                .dowel_diam
                .unwrap_or_else(|| default_tool_diameter / unit_scale(&irs));
            bore_vis(&irs, diameter)
        }
        TssName::Outline => outline_vis(&irs),
        TssName::DepthMap => depth_map_vis(&irs),
        TssName::BoundingBox => bounding_box_vis(&irs),
        TssName::Unknown(name) => {
            tracing::warn!("Unknown toolpath strategy '{}', drawing nothing", name);
            Group::new("toolpath")
        }
    };

    let mut group = Group::new("toolpath");
    if mark.tool_type == Some(ToolType::Face) && mark.tss_name == TssName::Basic {
        let diameter = mark.tool_diam.unwrap_or(default_tool_diameter);
        group.push_group(face_ghost(&drawn, diameter));
    }
    group.push_group(drawn);
    group.translate(mark.location.to_vec2());
    group
}
