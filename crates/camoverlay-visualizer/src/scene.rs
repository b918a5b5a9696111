//! Scene graph and drawing backend contract
//!
//! Generators build named, nestable [`Group`]s of paths, text and embedded
//! markup in millimeter space. The compositor then mutates every point in
//! place (scale, homography) and hands the finished group to a
//! [`DrawingSurface`].

use camoverlay_core::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::viewport::Bounds;

/// RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 200, 0);
    pub const BLUE: Color = Color::rgb(0, 102, 255);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const ORANGE: Color = Color::rgb(255, 140, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Paint attributes of a path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub stroke: Option<Color>,
    pub fill: Option<Color>,
    pub stroke_width: f64,
    /// Dash pattern; empty means solid
    pub dash: Vec<f64>,
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke: Some(Color::BLACK),
            fill: None,
            stroke_width: 1.0,
            dash: Vec::new(),
            opacity: 1.0,
        }
    }
}

impl Style {
    pub fn stroked(color: Color, width: f64) -> Self {
        Self {
            stroke: Some(color),
            stroke_width: width,
            ..Self::default()
        }
    }

    pub fn filled(color: Color) -> Self {
        Self {
            stroke: None,
            fill: Some(color),
            ..Self::default()
        }
    }

    pub fn dashed(mut self, pattern: &[f64]) -> Self {
        self.dash = pattern.to_vec();
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    pub fn is_dashed(&self) -> bool {
        !self.dash.is_empty()
    }
}

/// One path drawing command
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    /// Circular arc from the current point through `through` to `to`
    ArcTo { through: Vec2, to: Vec2 },
    Close,
}

impl PathCommand {
    fn points_mut(&mut self) -> impl Iterator<Item = &mut Vec2> {
        let (a, b) = match self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => (Some(p), None),
            PathCommand::ArcTo { through, to } => (Some(through), Some(to)),
            PathCommand::Close => (None, None),
        };
        a.into_iter().chain(b)
    }

    fn points(&self) -> impl Iterator<Item = Vec2> {
        let (a, b) = match *self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => (Some(p), None),
            PathCommand::ArcTo { through, to } => (Some(through), Some(to)),
            PathCommand::Close => (None, None),
        };
        a.into_iter().chain(b)
    }

    /// End point of the command, if it moves the pen
    pub fn end_point(&self) -> Option<Vec2> {
        match self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(*p),
            PathCommand::ArcTo { to, .. } => Some(*to),
            PathCommand::Close => None,
        }
    }
}

/// A styled path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePath {
    pub commands: Vec<PathCommand>,
    pub style: Style,
}

impl ScenePath {
    pub fn new(style: Style) -> Self {
        Self {
            commands: Vec::new(),
            style,
        }
    }

    /// Open polyline through the points
    pub fn polyline(points: &[Vec2], style: Style) -> Self {
        let commands = points
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                if i == 0 {
                    PathCommand::MoveTo(p)
                } else {
                    PathCommand::LineTo(p)
                }
            })
            .collect();
        Self { commands, style }
    }

    /// Closed polygon through the points
    pub fn polygon(points: &[Vec2], style: Style) -> Self {
        let mut path = Self::polyline(points, style);
        if !path.commands.is_empty() {
            path.commands.push(PathCommand::Close);
        }
        path
    }

    pub fn line(from: Vec2, to: Vec2, style: Style) -> Self {
        Self::polyline(&[from, to], style)
    }

    /// Axis-aligned rectangle with `origin` as its minimum corner
    pub fn rect(origin: Vec2, width: f64, height: f64, style: Style) -> Self {
        Self::polygon(
            &[
                origin,
                origin + Vec2::new(width, 0.0),
                origin + Vec2::new(width, height),
                origin + Vec2::new(0.0, height),
            ],
            style,
        )
    }

    pub fn move_to(&mut self, p: Vec2) {
        self.commands.push(PathCommand::MoveTo(p));
    }

    pub fn line_to(&mut self, p: Vec2) {
        self.commands.push(PathCommand::LineTo(p));
    }

    pub fn arc_to(&mut self, through: Vec2, to: Vec2) {
        self.commands.push(PathCommand::ArcTo { through, to });
    }

    pub fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.commands.last(), Some(PathCommand::Close))
    }

    /// Points the pen stops at, in order (arc through-points excluded)
    pub fn vertices(&self) -> Vec<Vec2> {
        self.commands.iter().filter_map(PathCommand::end_point).collect()
    }

    pub fn has_arc(&self) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, PathCommand::ArcTo { .. }))
    }
}

/// Text anchored at its baseline start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneText {
    pub anchor: Vec2,
    pub content: String,
    pub font_size: f64,
    pub font_family: String,
    pub bold: bool,
    pub color: Color,
}

impl SceneText {
    pub fn new(anchor: Vec2, content: impl Into<String>, font_size: f64, color: Color) -> Self {
        Self {
            anchor,
            content: content.into(),
            font_size,
            font_family: "Courier New".to_string(),
            bold: false,
            color,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// Foreign SVG markup placed at an anchor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedded {
    pub anchor: Vec2,
    pub markup: String,
}

/// Any scene node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    Path(ScenePath),
    Text(SceneText),
    Embedded(Embedded),
    Group(Group),
}

/// Named, recursive collection of scene items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub items: Vec<Item>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    pub fn push_path(&mut self, path: ScenePath) {
        if !path.is_empty() {
            self.items.push(Item::Path(path));
        }
    }

    pub fn push_text(&mut self, text: SceneText) {
        self.items.push(Item::Text(text));
    }

    pub fn push_embedded(&mut self, embedded: Embedded) {
        self.items.push(Item::Embedded(embedded));
    }

    /// Append a child group; empty groups are dropped
    pub fn push_group(&mut self, group: Group) {
        if !group.is_empty() {
            self.items.push(Item::Group(group));
        }
    }

    pub fn with_paths(mut self, paths: impl IntoIterator<Item = ScenePath>) -> Self {
        for path in paths {
            self.push_path(path);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Visit every point of every path, text anchor and embedded anchor
    pub fn for_each_point_mut(&mut self, f: &mut impl FnMut(&mut Vec2)) {
        for item in &mut self.items {
            match item {
                Item::Path(path) => {
                    for command in &mut path.commands {
                        command.points_mut().for_each(&mut *f);
                    }
                }
                Item::Text(text) => f(&mut text.anchor),
                Item::Embedded(embedded) => f(&mut embedded.anchor),
                Item::Group(group) => group.for_each_point_mut(f),
            }
        }
    }

    /// Visit every point without mutating
    pub fn for_each_point(&self, f: &mut impl FnMut(Vec2)) {
        for item in &self.items {
            match item {
                Item::Path(path) => {
                    for command in &path.commands {
                        command.points().for_each(&mut *f);
                    }
                }
                Item::Text(text) => f(text.anchor),
                Item::Embedded(embedded) => f(embedded.anchor),
                Item::Group(group) => group.for_each_point(f),
            }
        }
    }

    /// Uniform scale about the origin
    ///
    /// Only geometry moves; stroke widths stay as they are.
    pub fn scale(&mut self, factor: f64) {
        self.for_each_point_mut(&mut |p| *p *= factor);
    }

    /// Visit the style of every path
    pub fn for_each_style_mut(&mut self, f: &mut impl FnMut(&mut Style)) {
        for item in &mut self.items {
            match item {
                Item::Path(path) => f(&mut path.style),
                Item::Group(group) => group.for_each_style_mut(f),
                Item::Text(_) | Item::Embedded(_) => {}
            }
        }
    }

    /// Scale geometry together with stroke widths and dash lengths
    ///
    /// Used when changing from millimeters to display units, where a stroke
    /// that stands for a physical width has to grow with the drawing.
    pub fn zoom(&mut self, factor: f64) {
        self.scale(factor);
        self.for_each_style_mut(&mut |style| {
            style.stroke_width *= factor;
            style.dash.iter_mut().for_each(|d| *d *= factor);
        });
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.for_each_point_mut(&mut |p| *p += offset);
    }

    /// All paths in depth-first order
    pub fn paths(&self) -> Vec<&ScenePath> {
        let mut out = Vec::new();
        self.collect_paths(&mut out);
        out
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a ScenePath>) {
        for item in &self.items {
            match item {
                Item::Path(path) => out.push(path),
                Item::Group(group) => group.collect_paths(out),
                Item::Text(_) | Item::Embedded(_) => {}
            }
        }
    }

    /// All text nodes in depth-first order
    pub fn texts(&self) -> Vec<&SceneText> {
        let mut out = Vec::new();
        self.collect_texts(&mut out);
        out
    }

    fn collect_texts<'a>(&'a self, out: &mut Vec<&'a SceneText>) {
        for item in &self.items {
            match item {
                Item::Text(text) => out.push(text),
                Item::Group(group) => group.collect_texts(out),
                Item::Path(_) | Item::Embedded(_) => {}
            }
        }
    }

    /// Find a direct or nested child group by name
    pub fn find_group(&self, name: &str) -> Option<&Group> {
        self.items.iter().find_map(|item| match item {
            Item::Group(group) if group.name == name => Some(group),
            Item::Group(group) => group.find_group(name),
            _ => None,
        })
    }

    /// Bounds over every point, including arc through-points
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::new();
        self.for_each_point(&mut |p| bounds.update(p.x, p.y));
        bounds
    }
}

/// Minimal drawing backend
pub trait DrawingSurface {
    /// Remove everything currently drawn
    fn clear(&mut self);

    /// Draw a finished scene, replacing the previous one
    fn present(&mut self, scene: &Group) -> anyhow::Result<()>;
}
