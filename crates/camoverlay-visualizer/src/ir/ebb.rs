//! EiBotBoard (EBB) lowering
//!
//! EBB is incremental: `SM,duration,a,b` moves the two steppers by `a` and
//! `b` steps and `SP,value` raises or lowers the pen. The cursor is threaded
//! through a single left-to-right fold.

use camoverlay_core::constants::EBB_STEPS_PER_MM;
use camoverlay_core::Vec3;

use super::{parse_number, IrArgs, IrNode, IrState, Op};

/// Fold state: absolute position and pen state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EbbCursor {
    pub position: Vec3,
    pub tool_on_bed: bool,
}

impl Default for EbbCursor {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            tool_on_bed: false,
        }
    }
}

impl EbbCursor {
    fn node(&self, opcode: &str, tool_on_bed: bool) -> IrNode {
        let p = self.position;
        IrNode::new(
            Op::Move,
            opcode,
            IrArgs::xyz(Some(p.x), Some(p.y), Some(p.z)),
            IrState {
                units: None,
                tool_on_bed,
                clockwise: None,
            },
        )
    }

    /// Apply one instruction, returning the next cursor and the node it emits
    pub fn step(self, instruction: &str, steps_per_mm: f64) -> (Self, Option<IrNode>) {
        let tokens: Vec<&str> = instruction.trim().split(',').map(str::trim).collect();
        match tokens[0].to_ascii_uppercase().as_str() {
            "SM" => {
                let a = tokens.get(2).and_then(|t| parse_number(t));
                let b = tokens.get(3).and_then(|t| parse_number(t));
                let (Some(a), Some(b)) = (a, b) else {
                    tracing::trace!("Skipping malformed EBB move: {}", instruction);
                    return (self, None);
                };
                let (dx, dy) = steps_to_mm(a, b, steps_per_mm);
                let next = Self {
                    position: self.position + Vec3::new(dx, dy, 0.0),
                    ..self
                };
                // Tagged with the pen state in effect before the move
                let node = next.node("SM", self.tool_on_bed);
                (next, Some(node))
            }
            "SP" => {
                let Some(value) = tokens.get(1).and_then(|t| parse_number(t)) else {
                    tracing::trace!("Skipping malformed EBB pen command: {}", instruction);
                    return (self, None);
                };
                let next = Self {
                    tool_on_bed: value == 0.0,
                    ..self
                };
                let node = next.node("SP", next.tool_on_bed);
                (next, Some(node))
            }
            other => {
                tracing::trace!("Skipping EBB opcode {}", other);
                (self, None)
            }
        }
    }
}

/// Convert mixed-axis stepper deltas into an XY displacement in millimeters
pub fn steps_to_mm(a_steps: f64, b_steps: f64, steps_per_mm: f64) -> (f64, f64) {
    let x = 0.5 * (a_steps + b_steps);
    let y = -0.5 * (a_steps - b_steps);
    (x / steps_per_mm, y / steps_per_mm)
}

/// Lower EBB lines at the default 80 steps per millimeter
pub fn lower_ebb(instructions: &[String]) -> Vec<IrNode> {
    lower_ebb_with(instructions, EBB_STEPS_PER_MM)
}

/// Lower EBB lines with an explicit steps-per-millimeter calibration
pub fn lower_ebb_with(instructions: &[String], steps_per_mm: f64) -> Vec<IrNode> {
    let (_, irs) = instructions.iter().fold(
        (EbbCursor::default(), Vec::new()),
        |(cursor, mut irs), instruction| {
            let (next, node) = cursor.step(instruction, steps_per_mm);
            irs.extend(node);
            (next, irs)
        },
    );
    irs
}
