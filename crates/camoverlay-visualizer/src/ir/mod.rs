//! Instruction lowering
//!
//! Each dialect lowers a list of raw instruction lines into a flat,
//! time-ordered sequence of [`IrNode`]s. A null axis argument means "hold the
//! current value"; [`IrNode::resolve`] carries the cursor forward.
//!
//! Lowering never fails. Unrecognized instructions are skipped and malformed
//! numbers become unspecified arguments.

mod ebb;
mod gcode;
mod sbp;

pub use ebb::{lower_ebb, lower_ebb_with, EbbCursor};
pub use gcode::lower_gcode;
pub use sbp::lower_sbp;

use camoverlay_core::{Isa, Units, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Kind of motion an IR node describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Move,
    Arc,
}

/// Arc winding
///
/// On the wire this is the SBP direction number: `1` is clockwise, `-1`
/// counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum Winding {
    Clockwise,
    CounterClockwise,
}

impl From<i64> for Winding {
    fn from(direction: i64) -> Self {
        if direction == 1 {
            Winding::Clockwise
        } else {
            Winding::CounterClockwise
        }
    }
}

impl From<Winding> for i64 {
    fn from(winding: Winding) -> Self {
        match winding {
            Winding::Clockwise => 1,
            Winding::CounterClockwise => -1,
        }
    }
}

/// Motion arguments; `None` means unspecified
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IrArgs {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    /// Feed rate
    pub f: Option<f64>,
    /// Arc center offset from the current position
    pub dx: Option<f64>,
    pub dy: Option<f64>,
}

impl IrArgs {
    pub fn xyz(x: Option<f64>, y: Option<f64>, z: Option<f64>) -> Self {
        Self {
            x,
            y,
            z,
            ..Self::default()
        }
    }
}

/// State in effect when the node was produced
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrState {
    pub units: Option<Units>,
    pub tool_on_bed: bool,
    pub clockwise: Option<Winding>,
}

impl Default for IrState {
    fn default() -> Self {
        Self {
            units: None,
            tool_on_bed: true,
            clockwise: None,
        }
    }
}

/// Canonical motion record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrNode {
    pub op: Op,
    #[serde(rename = "opCode")]
    pub opcode: String,
    pub args: IrArgs,
    pub state: IrState,
}

impl IrNode {
    pub fn new(op: Op, opcode: impl Into<String>, args: IrArgs, state: IrState) -> Self {
        Self {
            op,
            opcode: opcode.into(),
            args,
            state,
        }
    }

    /// Absolute position after this node, starting from `current`
    pub fn resolve(&self, current: Vec3) -> Vec3 {
        Vec3::new(
            self.args.x.unwrap_or(current.x),
            self.args.y.unwrap_or(current.y),
            self.args.z.unwrap_or(current.z),
        )
    }

    pub fn is_arc(&self) -> bool {
        self.op == Op::Arc
    }

    /// Arc center offset, zero-filled
    pub fn arc_offset(&self) -> (f64, f64) {
        (self.args.dx.unwrap_or(0.0), self.args.dy.unwrap_or(0.0))
    }

    /// Center, radius and through-point of an arc started at `current`
    pub fn arc_geometry(&self, current: Vec2) -> ArcGeometry {
        let (dx, dy) = self.arc_offset();
        let radius = dx.hypot(dy);
        let center = current + Vec2::new(dx, dy);
        let through = match self.state.clockwise {
            Some(Winding::Clockwise) => Vec2::new(center.x - radius, center.y),
            _ => Vec2::new(center.x + radius, center.y),
        };
        ArcGeometry {
            center,
            radius,
            through,
        }
    }
}

/// Three-point description of an arc node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcGeometry {
    pub center: Vec2,
    pub radius: f64,
    pub through: Vec2,
}

/// Unit scale to millimeters, decided by the first node's units
pub fn unit_scale(irs: &[IrNode]) -> f64 {
    irs.first()
        .and_then(|ir| ir.state.units)
        .map_or(1.0, Units::to_mm_factor)
}

/// Absolute position after every node, starting at the origin
pub fn absolute_positions(irs: &[IrNode]) -> Vec<Vec3> {
    irs.iter()
        .scan(Vec3::ZERO, |cursor, ir| {
            *cursor = ir.resolve(*cursor);
            Some(*cursor)
        })
        .collect()
}

/// Options that affect lowering
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoweringOptions {
    pub ebb_steps_per_mm: f64,
}

impl Default for LoweringOptions {
    fn default() -> Self {
        Self {
            ebb_steps_per_mm: camoverlay_core::constants::EBB_STEPS_PER_MM,
        }
    }
}

/// Lower instructions of the given dialect
///
/// Returns `None` for a dialect this build does not know.
pub fn lower(isa: &Isa, instructions: &[String], options: &LoweringOptions) -> Option<Vec<IrNode>> {
    let irs = match isa {
        Isa::Gcode => lower_gcode(instructions),
        Isa::Sbp => lower_sbp(instructions),
        Isa::Ebb => lower_ebb_with(instructions, options.ebb_steps_per_mm),
        Isa::Unknown(name) => {
            tracing::warn!("No lowering for instruction set '{}'", name);
            return None;
        }
    };
    tracing::debug!(
        "Lowered {} {} instructions into {} IR nodes",
        instructions.len(),
        isa,
        irs.len()
    );
    Some(irs)
}

/// Parse a number, treating anything malformed or non-finite as unspecified
pub(crate) fn parse_number(token: &str) -> Option<f64> {
    token.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
