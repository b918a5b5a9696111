//! ShopBot (SBP) lowering
//!
//! SBP instructions are comma separated: `opcode,arg1,arg2,...`. Unlike
//! G-code, axes a move does not mention are zero-filled rather than held.

use super::{parse_number, IrArgs, IrNode, IrState, Op, Winding};

fn token(tokens: &[&str], index: usize) -> Option<f64> {
    tokens.get(index).and_then(|t| parse_number(t))
}

fn zero() -> Option<f64> {
    Some(0.0)
}

/// `CG,diameter,x,y,dx,dy,outin,direction,...`; direction `1` is clockwise
fn lower_arc(tokens: &[&str]) -> IrNode {
    let clockwise = token(tokens, 7).map(|dir| {
        if dir == 1.0 {
            Winding::Clockwise
        } else {
            Winding::CounterClockwise
        }
    });
    let args = IrArgs {
        x: token(tokens, 2),
        y: token(tokens, 3),
        z: zero(),
        f: None,
        dx: token(tokens, 4),
        dy: token(tokens, 5),
    };
    let state = IrState {
        units: None,
        tool_on_bed: true,
        clockwise,
    };
    IrNode::new(Op::Arc, "CG", args, state)
}

/// Lower SBP lines
pub fn lower_sbp(instructions: &[String]) -> Vec<IrNode> {
    let mut irs = Vec::new();

    for instruction in instructions {
        let line = instruction.trim();
        if line.is_empty() || line.starts_with('\'') {
            continue;
        }
        let tokens: Vec<&str> = line.split(',').map(str::trim).collect();
        let opcode = tokens[0].to_ascii_uppercase();

        let args = match opcode.as_str() {
            "M2" | "J2" => IrArgs::xyz(token(&tokens, 1), token(&tokens, 2), zero()),
            "M3" | "J3" => IrArgs::xyz(token(&tokens, 1), token(&tokens, 2), token(&tokens, 3)),
            "MZ" | "JZ" => IrArgs::xyz(zero(), zero(), token(&tokens, 1)),
            "MX" | "JX" => IrArgs::xyz(token(&tokens, 1), zero(), zero()),
            "MY" | "JY" => IrArgs::xyz(zero(), token(&tokens, 1), zero()),
            "CG" => {
                irs.push(lower_arc(&tokens));
                continue;
            }
            _ => {
                tracing::trace!("Skipping SBP opcode {}", opcode);
                continue;
            }
        };
        irs.push(IrNode::new(Op::Move, opcode, args, IrState::default()));
    }

    irs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lower(src: &[&str]) -> Vec<IrNode> {
        lower_sbp(&src.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn test_m2_zero_fills_z() {
        let irs = lower(&["M2,3.0,4.0"]);
        assert_eq!(irs.len(), 1);
        assert_eq!(irs[0].op, Op::Move);
        assert_eq!(irs[0].args.x, Some(3.0));
        assert_eq!(irs[0].args.y, Some(4.0));
        assert_eq!(irs[0].args.z, Some(0.0));
    }

    #[test]
    fn test_single_axis_moves() {
        let irs = lower(&["MZ,-0.25", "JX,2", "MY,7"]);
        assert_eq!(irs[0].args.x, Some(0.0));
        assert_eq!(irs[0].args.z, Some(-0.25));
        assert_eq!(irs[1].args.x, Some(2.0));
        assert_eq!(irs[1].args.y, Some(0.0));
        assert_eq!(irs[2].args.y, Some(7.0));
        assert_eq!(irs[2].opcode, "MY");
    }

    #[test]
    fn test_m3_reads_all_axes() {
        let irs = lower(&["M3, 1.0, 2.0, -0.5"]);
        assert_eq!(irs[0].args.z, Some(-0.5));
    }

    #[test]
    fn test_arc_tokens() {
        let irs = lower(&["CG,10,10.0,0.0,5.0,0.0,T,1"]);
        assert_eq!(irs.len(), 1);
        let arc = &irs[0];
        assert!(arc.is_arc());
        assert_eq!(arc.args.x, Some(10.0));
        assert_eq!(arc.args.y, Some(0.0));
        assert_eq!(arc.arc_offset(), (5.0, 0.0));
        assert_eq!(arc.state.clockwise, Some(Winding::Clockwise));

        let irs = lower(&["CG,10,10.0,0.0,5.0,0.0,T,-1"]);
        assert_eq!(irs[0].state.clockwise, Some(Winding::CounterClockwise));
    }

    #[test]
    fn test_malformed_numbers_unspecified() {
        let irs = lower(&["M2,abc,4.0", "M2"]);
        assert_eq!(irs.len(), 2);
        assert_eq!(irs[0].args.x, None);
        assert_eq!(irs[0].args.y, Some(4.0));
        assert_eq!(irs[1].args.x, None);
    }

    #[test]
    fn test_unknown_and_comment_lines_skipped() {
        let irs = lower(&["'' header", "SA", "VS,1,1", "", "TR,12000"]);
        assert!(irs.is_empty());
    }
}
