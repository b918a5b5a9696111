//! SVG drawing surface
//!
//! Renders a finished scene as a standalone SVG document, optionally written
//! to a file on every present. Arcs are flattened to line segments so the
//! output matches the warped geometry exactly.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use camoverlay_core::Vec2;

use crate::scene::{
    Color, DrawingSurface, Embedded, Group, Item, PathCommand, SceneText, ScenePath, Style,
};
use crate::utils::{flatten_three_point_arc, ARC_TOLERANCE};

const VIEWBOX_PADDING: f64 = 0.05;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// SVG `d` attribute for a path
pub fn path_data(path: &ScenePath) -> String {
    let mut d = String::with_capacity(path.commands.len() * 20);
    let mut current = Vec2::ZERO;
    let mut subpath_start = Vec2::ZERO;

    for command in &path.commands {
        match *command {
            PathCommand::MoveTo(p) => {
                let _ = write!(d, "M {:.3} {:.3} ", p.x, p.y);
                current = p;
                subpath_start = p;
            }
            PathCommand::LineTo(p) => {
                let _ = write!(d, "L {:.3} {:.3} ", p.x, p.y);
                current = p;
            }
            PathCommand::ArcTo { through, to } => {
                for p in flatten_three_point_arc(current, through, to, ARC_TOLERANCE)
                    .into_iter()
                    .skip(1)
                {
                    let _ = write!(d, "L {:.3} {:.3} ", p.x, p.y);
                }
                current = to;
            }
            PathCommand::Close => {
                d.push_str("Z ");
                current = subpath_start;
            }
        }
    }
    d.trim_end().to_string()
}

fn style_attributes(style: &Style) -> String {
    let mut attrs = String::new();
    let paint = |c: Option<Color>| c.map_or("none".to_string(), |c| c.to_string());
    let _ = write!(
        attrs,
        r#"stroke="{}" fill="{}" stroke-width="{:.3}""#,
        paint(style.stroke),
        paint(style.fill),
        style.stroke_width
    );
    if style.is_dashed() {
        let pattern: Vec<String> = style.dash.iter().map(|v| format!("{:.3}", v)).collect();
        let _ = write!(attrs, r#" stroke-dasharray="{}""#, pattern.join(" "));
    }
    if style.opacity < 1.0 {
        let _ = write!(attrs, r#" opacity="{:.3}""#, style.opacity);
    }
    attrs
}

fn write_text(out: &mut String, text: &SceneText, flip_y: bool) {
    let flip = if flip_y { " scale(1,-1)" } else { "" };
    let _ = writeln!(
        out,
        r#"<text transform="translate({:.3},{:.3}){}" font-family="{}" font-size="{:.3}" font-weight="{}" fill="{}">{}</text>"#,
        text.anchor.x,
        text.anchor.y,
        flip,
        escape(&text.font_family),
        text.font_size,
        if text.bold { "bold" } else { "normal" },
        text.color,
        escape(&text.content)
    );
}

fn write_embedded(out: &mut String, embedded: &Embedded) {
    let _ = writeln!(
        out,
        r#"<g transform="translate({:.3},{:.3})">{}</g>"#,
        embedded.anchor.x, embedded.anchor.y, embedded.markup
    );
}

fn write_group(out: &mut String, group: &Group, flip_y: bool) {
    let _ = writeln!(out, r#"<g id="{}">"#, escape(&group.name));
    for item in &group.items {
        match item {
            Item::Path(path) => {
                let _ = writeln!(
                    out,
                    r#"<path d="{}" {}/>"#,
                    path_data(path),
                    style_attributes(&path.style)
                );
            }
            Item::Text(text) => write_text(out, text, flip_y),
            Item::Embedded(embedded) => write_embedded(out, embedded),
            Item::Group(child) => write_group(out, child, flip_y),
        }
    }
    out.push_str("</g>\n");
}

/// Render a scene as an SVG document
///
/// With `flip_y` the scene's y axis points up, matching the projector view.
pub fn render_svg(scene: &Group, flip_y: bool) -> String {
    let (min_x, min_y, width, height) = scene.bounds().viewbox_with_padding(VIEWBOX_PADDING);
    let view_min_y = if flip_y { -(min_y + height) } else { min_y };

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{:.3} {:.3} {:.3} {:.3}" style="background:black">"#,
        min_x, view_min_y, width, height
    );
    if flip_y {
        out.push_str("<g transform=\"scale(1,-1)\">\n");
    }
    write_group(&mut out, scene, flip_y);
    if flip_y {
        out.push_str("</g>\n");
    }
    out.push_str("</svg>\n");
    out
}

/// Drawing surface that keeps the latest SVG document and optionally mirrors
/// it to a file
#[derive(Debug, Default)]
pub struct SvgSurface {
    output: Option<PathBuf>,
    flip_y: bool,
    document: String,
    presented: usize,
}

impl SvgSurface {
    pub fn new(flip_y: bool) -> Self {
        Self {
            flip_y,
            ..Self::default()
        }
    }

    /// Write every presented scene to `path`
    pub fn with_output(mut self, path: impl AsRef<Path>) -> Self {
        self.output = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    /// Number of scenes presented so far
    pub fn presented(&self) -> usize {
        self.presented
    }
}

impl DrawingSurface for SvgSurface {
    fn clear(&mut self) {
        self.document.clear();
    }

    fn present(&mut self, scene: &Group) -> anyhow::Result<()> {
        self.document = render_svg(scene, self.flip_y);
        self.presented += 1;
        if let Some(path) = &self.output {
            std::fs::write(path, &self.document)
                .with_context(|| format!("Failed to write SVG to {}", path.display()))?;
            debug!("Wrote overlay SVG to {}", path.display());
        }
        Ok(())
    }
}
