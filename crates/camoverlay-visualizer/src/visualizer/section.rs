//! Section annotations
//!
//! Side-view diagrams drawn next to the stock. In these diagrams x runs
//! along the stock and y is depth, with the stock top at the anchor.

use camoverlay_core::{SectionAnnotationMark, SectionAnnotationName, Vec2};

use crate::scene::{Color, Group, SceneText, ScenePath, Style};

/// Horizontal extent of section diagrams, in millimeters
pub const SECTION_WIDTH: f64 = 60.0;

/// Font size of section labels
pub const SECTION_FONT_SIZE: f64 = 4.0;

const SECTION_STROKE: f64 = 0.4;
const DASH: [f64; 2] = [2.0, 1.5];

/// Depth targeted by a Z move, if the line is one
///
/// G-code lines count when the word right after the opcode is a `Z` word;
/// ShopBot lines count for `MZ`/`JZ`.
pub fn z_move_depth(instruction: &str) -> Option<f64> {
    let line = instruction.trim();
    if line.contains(',') {
        let mut tokens = line.split(',').map(str::trim);
        let opcode = tokens.next()?.to_ascii_uppercase();
        if opcode == "MZ" || opcode == "JZ" {
            return tokens.next()?.parse().ok();
        }
        return None;
    }

    let mut words = line.split_whitespace();
    let opcode = words.next()?;
    if !(opcode.starts_with('G') || opcode.starts_with('g')) {
        return None;
    }
    let word = words.next()?;
    let value = word.strip_prefix('Z').or_else(|| word.strip_prefix('z'))?;
    value.parse().ok()
}

/// Distinct cutting depths (negative Z moves), shallowest first
pub fn pass_depths(instructions: &[String]) -> Vec<f64> {
    super::slicer::cutting_depths(instructions.iter().filter_map(|i| z_move_depth(i)))
}

fn depth_line(anchor: Vec2, depth: f64, style: Style) -> ScenePath {
    ScenePath::line(
        anchor + Vec2::new(0.0, depth),
        anchor + Vec2::new(SECTION_WIDTH, depth),
        style,
    )
}

/// One dashed line per cutting pass, between solid stock top and bottom
pub fn viz_pass_depths(instructions: &[String], thickness: f64, anchor: Vec2) -> Group {
    let solid = Style::stroked(Color::WHITE, SECTION_STROKE);
    let dashed = Style::stroked(Color::ORANGE, SECTION_STROKE).dashed(&DASH);

    let mut group = Group::new("passDepths");
    group.push_path(depth_line(anchor, 0.0, solid.clone()));
    group.push_path(depth_line(anchor, -thickness, solid));

    for depth in pass_depths(instructions) {
        group.push_path(depth_line(anchor, depth, dashed.clone()));
        group.push_text(SceneText::new(
            anchor + Vec2::new(SECTION_WIDTH + 1.0, depth),
            format!("{:.2}", depth),
            SECTION_FONT_SIZE,
            Color::ORANGE,
        ));
    }
    group
}

/// Stock lines, a drill bit reaching the minimum screw depth, and its label
pub fn viz_screw_depth(stock_depth: f64, model_depth: f64, anchor: Vec2) -> Group {
    const BIT_HALF_WIDTH: f64 = 2.0;
    const TIP_LENGTH: f64 = 2.0;
    const SHANK_ABOVE: f64 = 10.0;

    let screw_depth = stock_depth - model_depth;
    let solid = Style::stroked(Color::WHITE, SECTION_STROKE);
    let dashed = Style::stroked(Color::RED, SECTION_STROKE).dashed(&DASH);

    let mut group = Group::new("screwDepth");
    group.push_path(depth_line(anchor, 0.0, solid.clone()));
    group.push_path(depth_line(anchor, -stock_depth, solid.clone()));
    group.push_path(depth_line(anchor, -screw_depth, dashed));

    let bit_x = SECTION_WIDTH / 2.0;
    let tip = -screw_depth;
    let taper_start = tip + TIP_LENGTH.min(screw_depth.abs());
    let bit = [
        Vec2::new(bit_x - BIT_HALF_WIDTH, SHANK_ABOVE),
        Vec2::new(bit_x + BIT_HALF_WIDTH, SHANK_ABOVE),
        Vec2::new(bit_x + BIT_HALF_WIDTH, taper_start),
        Vec2::new(bit_x, tip),
        Vec2::new(bit_x - BIT_HALF_WIDTH, taper_start),
    ]
    .map(|p| anchor + p);
    group.push_path(ScenePath::polygon(&bit, Style::stroked(Color::RED, SECTION_STROKE)));

    let dim_x = SECTION_WIDTH + 2.0;
    group.push_path(ScenePath::line(
        anchor + Vec2::new(dim_x, 0.0),
        anchor + Vec2::new(dim_x, tip),
        solid,
    ));
    group.push_text(SceneText::new(
        anchor + Vec2::new(dim_x + 1.0, tip / 2.0),
        format!("{:.2}", screw_depth),
        SECTION_FONT_SIZE,
        Color::WHITE,
    ));
    group
}

/// Draw a section annotation mark from its arguments
pub fn visualize_section(mark: &SectionAnnotationMark) -> Group {
    let anchor = mark.location.to_vec2();
    match &mark.annotation_name {
        SectionAnnotationName::PassDepths => {
            let Some(thickness) = mark.arg_f64("thickness") else {
                tracing::warn!("passDepths annotation without a thickness argument");
                return Group::new("sectionAnnotation");
            };
            viz_pass_depths(&mark.instructions, thickness, anchor)
        }
        SectionAnnotationName::ScrewDepth => {
            match (mark.arg_f64("stockDepth"), mark.arg_f64("modelDepth")) {
                (Some(stock), Some(model)) => viz_screw_depth(stock, model, anchor),
                _ => {
                    tracing::warn!("screwDepth annotation needs stockDepth and modelDepth");
                    Group::new("sectionAnnotation")
                }
            }
        }
        SectionAnnotationName::Unknown(name) => {
            tracing::warn!("Unknown section annotation '{}'", name);
            Group::new("sectionAnnotation")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_z_move_detection() {
        assert_eq!(z_move_depth("G1 Z-1.5 F100"), Some(-1.5));
        assert_eq!(z_move_depth("G0 X1 Z-1"), None);
        assert_eq!(z_move_depth("MZ,-0.25"), Some(-0.25));
        assert_eq!(z_move_depth("JZ, 1"), Some(1.0));
        assert_eq!(z_move_depth("M3,1,1,-1"), None);
        assert_eq!(z_move_depth(""), None);
    }

    #[test]
    fn test_pass_depth_lines() {
        let group = viz_pass_depths(&lines(&["G1 Z-1", "G1 Z-2", "G0 Z0.5"]), 3.0, Vec2::ZERO);
        let paths = group.paths();
        let dashed = paths.iter().filter(|p| p.style.is_dashed()).count();
        let solid = paths.len() - dashed;
        assert_eq!(dashed, 2);
        assert_eq!(solid, 2);
        assert_eq!(group.texts().len(), 2);
    }

    #[test]
    fn test_repeated_depths_drawn_once() {
        let group = viz_pass_depths(&lines(&["MZ,-1", "MZ,-1", "JZ,0.5", "MZ,-1"]), 2.0, Vec2::ZERO);
        assert_eq!(group.paths().iter().filter(|p| p.style.is_dashed()).count(), 1);
    }

    #[test]
    fn test_screw_depth_label() {
        let group = viz_screw_depth(19.0, 12.5, Vec2::new(10.0, 100.0));
        let texts = group.texts();
        assert_eq!(texts.len(), 1);
        assert_eq!(texts[0].content, "6.50");

        let dashed: Vec<_> = group.paths().into_iter().filter(|p| p.style.is_dashed()).collect();
        assert_eq!(dashed.len(), 1);
        assert_eq!(dashed[0].vertices()[0], Vec2::new(10.0, 93.5));
    }

    #[test]
    fn test_section_mark_missing_args() {
        let mark: SectionAnnotationMark = serde_json::from_str(
            r#"{"annotationName":"passDepths","instructions":["G1 Z-1"],"args":{}}"#,
        )
        .unwrap();
        assert!(visualize_section(&mark).is_empty());
    }
}
