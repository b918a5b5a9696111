//! Mark generators
//!
//! [`compile_mark`] is total: every mark kind maps to a generator, and kinds
//! with nothing to draw (arrow, unknown) produce an empty group.

use camoverlay_core::constants::{DEFAULT_TOOL_DIAMETER, LARGE_EXTENT};
use camoverlay_core::{
    BoxMark, CircleMark, Mark, PlainMark, ScrewPositionMark, Step, TextMark, Vec2,
};

use super::section::visualize_section;
use super::toolpath::visualize_toolpath;
use crate::ir::LoweringOptions;
use crate::scene::{Color, Embedded, Group, SceneText, ScenePath, Style};
use crate::utils::{circle_polygon, ARC_TOLERANCE};

/// Font size of text marks
pub const TEXT_FONT_SIZE: f64 = 25.0;

/// Radius of the screw holes drawn by screw position marks
pub const SCREW_HOLE_RADIUS: f64 = 2.0;

/// Size of the square corner handles, in display units
pub const CALIBRATION_HANDLE: f64 = 4.0;

const MARK_STROKE: f64 = 1.0;

/// Reference rectangle used for calibration, in display units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationBox {
    pub width: f64,
    pub height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale_factor: f64,
}

impl Default for CalibrationBox {
    fn default() -> Self {
        Self {
            width: 16.75,
            height: 16.0,
            offset_x: 1.0,
            offset_y: 0.625,
            scale_factor: 10.0,
        }
    }
}

impl CalibrationBox {
    /// Corners in paper order: bottom-left, top-left, top-right,
    /// bottom-right (with y growing downward before the view flip)
    pub fn corners(&self) -> [Vec2; 4] {
        let s = self.scale_factor;
        let x = s * (self.offset_x + self.width / 2.0);
        let y = s * (self.offset_y + self.height / 2.0);
        let w = s * self.width;
        let h = s * self.height;
        [
            Vec2::new(x, y + h),
            Vec2::new(x, y),
            Vec2::new(x + w, y),
            Vec2::new(x + w, y + h),
        ]
    }
}

/// Everything a generator needs besides the mark itself
#[derive(Debug, Clone, PartialEq)]
pub struct MarkContext {
    pub calibration: CalibrationBox,
    /// Display units per millimeter applied by the compositor
    pub display_scale: f64,
    pub default_tool_diameter: f64,
    pub lowering: LoweringOptions,
}

impl Default for MarkContext {
    fn default() -> Self {
        Self {
            calibration: CalibrationBox::default(),
            display_scale: 1.0,
            default_tool_diameter: DEFAULT_TOOL_DIAMETER,
            lowering: LoweringOptions::default(),
        }
    }
}

/// Red lines through the location along both axes
pub fn crosshair(mark: &PlainMark) -> Group {
    let Vec2 { x, y } = mark.location.to_vec2();
    let style = Style::stroked(Color::RED, MARK_STROKE);
    Group::new("crosshair").with_paths([
        ScenePath::line(Vec2::new(x, 0.0), Vec2::new(x, LARGE_EXTENT), style.clone()),
        ScenePath::line(Vec2::new(0.0, y), Vec2::new(LARGE_EXTENT, y), style),
    ])
}

/// Red filled rectangle
pub fn filled_box(mark: &BoxMark) -> Group {
    Group::new("box").with_paths([ScenePath::rect(
        mark.location.to_vec2(),
        mark.width,
        mark.height,
        Style::filled(Color::RED),
    )])
}

/// Red rectangle outline
pub fn box_outline(mark: &BoxMark) -> Group {
    Group::new("boxOutline").with_paths([ScenePath::rect(
        mark.location.to_vec2(),
        mark.width,
        mark.height,
        Style::stroked(Color::RED, MARK_STROKE),
    )])
}

/// Red circle, polygonized so projective warps keep its shape
pub fn circle(mark: &CircleMark) -> Group {
    let outline = circle_polygon(mark.location.to_vec2(), mark.radius, ARC_TOLERANCE);
    Group::new("circle").with_paths([ScenePath::polygon(
        &outline,
        Style::stroked(Color::RED, MARK_STROKE),
    )])
}

/// Red bold monospace text
pub fn text(mark: &TextMark) -> Group {
    let mut group = Group::new("text");
    group.push_text(
        SceneText::new(mark.location.to_vec2(), mark.text.clone(), TEXT_FONT_SIZE, Color::RED).bold(),
    );
    group
}

/// Foreign SVG markup placed at the location
pub fn svg(mark: &TextMark) -> Group {
    let mut group = Group::new("svg");
    group.push_embedded(Embedded {
        anchor: mark.location.to_vec2(),
        markup: mark.text.clone(),
    });
    group
}

/// The calibration rectangle with a handle at each corner
///
/// Corners are divided by the display scale so they land on the display-unit
/// box once the compositor scales the scene.
pub fn calibration_box(ctx: &MarkContext) -> Group {
    let scale = if ctx.display_scale > 0.0 { ctx.display_scale } else { 1.0 };
    let corners = ctx.calibration.corners().map(|c| c / scale);
    calibration_outline(&corners, CALIBRATION_HANDLE / scale, None)
}

/// White quadrilateral through `corners` with a square handle on each
///
/// The handle at `active` is drawn in green.
pub fn calibration_outline(corners: &[Vec2; 4], handle: f64, active: Option<usize>) -> Group {
    let mut group = Group::new("calibrationBox");
    group.push_path(ScenePath::polygon(corners, Style::stroked(Color::WHITE, MARK_STROKE)));
    let half = handle / 2.0;
    for (i, corner) in corners.iter().enumerate() {
        let color = if active == Some(i) { Color::GREEN } else { Color::BLUE };
        group.push_path(ScenePath::rect(
            *corner - Vec2::splat(half),
            handle,
            handle,
            Style::filled(color),
        ));
    }
    group
}

/// Outline of the part with a screw hole inset from each corner
pub fn screw_position(mark: &ScrewPositionMark) -> Group {
    let origin = mark.location.to_vec2();
    let style = Style::stroked(Color::RED, MARK_STROKE);
    let mut group = Group::new("screwPosition");
    group.push_path(ScenePath::rect(origin, mark.width, mark.height, style.clone()));

    let inset = mark.offset;
    let holes = [
        Vec2::new(inset, inset),
        Vec2::new(mark.width - inset, inset),
        Vec2::new(mark.width - inset, mark.height - inset),
        Vec2::new(inset, mark.height - inset),
    ];
    for hole in holes {
        let outline = circle_polygon(origin + hole, SCREW_HOLE_RADIUS, ARC_TOLERANCE);
        group.push_path(ScenePath::polygon(&outline, style.clone()));
    }
    group
}

/// Stock outline with a dashed flip axis and a label
pub fn flip_stock(mark: &BoxMark) -> Group {
    let origin = mark.location.to_vec2();
    let mut group = Group::new("flipStock");
    group.push_path(ScenePath::rect(
        origin,
        mark.width,
        mark.height,
        Style::stroked(Color::RED, MARK_STROKE),
    ));
    group.push_path(ScenePath::line(
        origin + Vec2::new(mark.width / 2.0, 0.0),
        origin + Vec2::new(mark.width / 2.0, mark.height),
        Style::stroked(Color::RED, MARK_STROKE).dashed(&[6.0, 4.0]),
    ));
    group.push_text(
        SceneText::new(
            origin + Vec2::new(mark.width / 2.0, mark.height / 2.0),
            "FLIP",
            TEXT_FONT_SIZE,
            Color::RED,
        )
        .bold(),
    );
    group
}

/// Compile one mark into a scene group
pub fn compile_mark(mark: &Mark, ctx: &MarkContext) -> Group {
    match mark {
        Mark::Crosshair(m) => crosshair(m),
        Mark::Box(m) => filled_box(m),
        Mark::BoxOutline(m) => box_outline(m),
        Mark::Circle(m) => circle(m),
        Mark::Text(m) => text(m),
        Mark::Svg(m) => svg(m),
        Mark::CalibrationBox(_) => calibration_box(ctx),
        Mark::Toolpath(m) => visualize_toolpath(m, &ctx.lowering, ctx.default_tool_diameter),
        Mark::ScrewPosition(m) => screw_position(m),
        Mark::SectionAnnotation(m) => visualize_section(m),
        Mark::FlipStock(m) => flip_stock(m),
        Mark::Arrow(_) => Group::new("arrow"),
        Mark::Unknown => {
            tracing::debug!("Skipping mark of unknown kind");
            Group::new("unknown")
        }
    }
}

/// Compile every mark of a step, in order
pub fn compile_step(step: &Step, ctx: &MarkContext) -> Group {
    let mut group = Group::new(step.name.clone());
    for mark in &step.marks {
        group.push_group(compile_mark(mark, ctx));
    }
    group
}
