use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::geometry::Vec2;

/// Declares a wire enum that round-trips through its string name and keeps
/// unrecognized names in an `Unknown` variant.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// A name this build does not recognize
            Unknown(String),
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                match s.as_str() {
                    $($wire => Self::$variant,)+
                    _ => Self::Unknown(s),
                }
            }
        }

        impl From<$name> for String {
            fn from(v: $name) -> Self {
                match v {
                    $($name::$variant => $wire.to_string(),)+
                    $name::Unknown(s) => s,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $wire),)+
                    Self::Unknown(s) => write!(f, "{}", s),
                }
            }
        }
    };
}

wire_enum! {
    /// Instruction dialect of a toolpath
    Isa {
        /// EiBotBoard stepper pen-plotter protocol
        Ebb => "ebb",
        /// Standard G-code
        Gcode => "gcode",
        /// ShopBot part files
        Sbp => "sbp",
    }
}

wire_enum! {
    /// Visualization strategy for a toolpath mark
    TssName {
        /// The path itself
        Basic => "basic",
        /// Dowel-hole pair of a bore toolpath
        Bore => "bore",
        /// Convex hull silhouette of the path
        Outline => "outline",
        /// Per-depth slice silhouettes
        DepthMap => "depthMap",
        /// Axis-aligned bounding rectangle
        BoundingBox => "boundingBox",
    }
}

wire_enum! {
    /// Cutting tool family
    ToolType {
        /// Flat face mill
        Face => "face",
        /// Ball end mill
        Ball => "ball",
    }
}

wire_enum! {
    /// Section annotation diagram kind
    SectionAnnotationName {
        /// Minimum screw depth diagram
        ScrewDepth => "screwDepth",
        /// One line per cutting pass depth
        PassDepths => "passDepths",
    }
}

/// Placement offset shared by every mark
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Mark that only carries a location (crosshair, calibration box)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlainMark {
    #[serde(default)]
    pub location: Location,
}

/// Arrow placeholder; not drawn yet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArrowMark {
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub to: Location,
}

/// Rectangular mark (box, boxOutline, flipStock)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxMark {
    #[serde(default)]
    pub location: Location,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CircleMark {
    #[serde(default)]
    pub location: Location,
    pub radius: f64,
}

/// Text or embedded SVG markup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextMark {
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrewPositionMark {
    #[serde(default)]
    pub location: Location,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub offset: f64,
}

/// A toolpath to lower and visualize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolpathMark {
    #[serde(default)]
    pub location: Location,
    pub tss_name: TssName,
    pub isa: Isa,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub tool_type: Option<ToolType>,
    #[serde(default)]
    pub dowel_diam: Option<f64>,
    #[serde(default)]
    pub tool_diam: Option<f64>,
}

impl ToolpathMark {
    pub fn new(tss_name: TssName, isa: Isa, instructions: Vec<String>) -> Self {
        Self {
            location: Location::default(),
            tss_name,
            isa,
            instructions,
            tool_type: None,
            dowel_diam: None,
            tool_diam: None,
        }
    }
}

/// Auxiliary section diagram derived from raw instructions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionAnnotationMark {
    #[serde(default)]
    pub location: Location,
    pub annotation_name: SectionAnnotationName,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub args: Map<String, Value>,
}

impl SectionAnnotationMark {
    /// Numeric argument by key; numbers encoded as strings are accepted
    pub fn arg_f64(&self, key: &str) -> Option<f64> {
        match self.args.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// One drawable unit of a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mark {
    Arrow(ArrowMark),
    Crosshair(PlainMark),
    Box(BoxMark),
    BoxOutline(BoxMark),
    Circle(CircleMark),
    Text(TextMark),
    Svg(TextMark),
    CalibrationBox(PlainMark),
    Toolpath(ToolpathMark),
    ScrewPosition(ScrewPositionMark),
    SectionAnnotation(SectionAnnotationMark),
    FlipStock(BoxMark),
    /// A kind sent by a newer command source
    #[serde(other)]
    Unknown,
}

impl Mark {
    /// Wire name of the mark kind
    pub fn kind(&self) -> &'static str {
        match self {
            Mark::Arrow(_) => "arrow",
            Mark::Crosshair(_) => "crosshair",
            Mark::Box(_) => "box",
            Mark::BoxOutline(_) => "boxOutline",
            Mark::Circle(_) => "circle",
            Mark::Text(_) => "text",
            Mark::Svg(_) => "svg",
            Mark::CalibrationBox(_) => "calibrationBox",
            Mark::Toolpath(_) => "toolpath",
            Mark::ScrewPosition(_) => "screwPosition",
            Mark::SectionAnnotation(_) => "sectionAnnotation",
            Mark::FlipStock(_) => "flipStock",
            Mark::Unknown => "unknown",
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Mark::Arrow(m) => m.location,
            Mark::Crosshair(m) | Mark::CalibrationBox(m) => m.location,
            Mark::Box(m) | Mark::BoxOutline(m) | Mark::FlipStock(m) => m.location,
            Mark::Circle(m) => m.location,
            Mark::Text(m) | Mark::Svg(m) => m.location,
            Mark::Toolpath(m) => m.location,
            Mark::ScrewPosition(m) => m.location,
            Mark::SectionAnnotation(m) => m.location,
            Mark::Unknown => Location::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolpath_mark_wire_format() {
        let json = r#"{
            "type": "toolpath",
            "tssName": "bore",
            "isa": "sbp",
            "instructions": ["M2,1.0,2.0"],
            "toolType": "face",
            "dowelDiam": 6.35,
            "location": {"x": 1, "y": 2}
        }"#;
        let mark: Mark = serde_json::from_str(json).unwrap();
        match mark {
            Mark::Toolpath(tp) => {
                assert_eq!(tp.tss_name, TssName::Bore);
                assert_eq!(tp.isa, Isa::Sbp);
                assert_eq!(tp.tool_type, Some(ToolType::Face));
                assert_eq!(tp.dowel_diam, Some(6.35));
                assert_eq!(tp.location, Location::new(1.0, 2.0));
            }
            other => panic!("expected toolpath, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_mark_kind_degrades() {
        let mark: Mark =
            serde_json::from_str(r#"{"type":"hologram","location":{"x":0,"y":0}}"#).unwrap();
        assert_eq!(mark, Mark::Unknown);
        assert_eq!(mark.kind(), "unknown");
    }

    #[test]
    fn test_unknown_strategy_is_kept() {
        let json = r#"{"type":"toolpath","tssName":"heatmap","isa":"gcode"}"#;
        let mark: Mark = serde_json::from_str(json).unwrap();
        match mark {
            Mark::Toolpath(tp) => assert_eq!(tp.tss_name, TssName::Unknown("heatmap".into())),
            other => panic!("expected toolpath, got {:?}", other),
        }
    }

    #[test]
    fn test_section_annotation_args() {
        let json = r#"{
            "type": "sectionAnnotation",
            "annotationName": "screwDepth",
            "location": {"x": 0, "y": 0},
            "instructions": [],
            "args": {"stockDepth": 19.05, "modelDepth": "12.7"}
        }"#;
        let mark: Mark = serde_json::from_str(json).unwrap();
        let Mark::SectionAnnotation(annotation) = mark else {
            panic!("expected section annotation");
        };
        assert_eq!(annotation.annotation_name, SectionAnnotationName::ScrewDepth);
        assert_eq!(annotation.arg_f64("stockDepth"), Some(19.05));
        assert_eq!(annotation.arg_f64("modelDepth"), Some(12.7));
        assert_eq!(annotation.arg_f64("thickness"), None);
    }

    #[test]
    fn test_mark_serializes_with_type_tag() {
        let mark = Mark::Circle(CircleMark {
            location: Location::new(3.0, 4.0),
            radius: 2.0,
        });
        let json = serde_json::to_value(&mark).unwrap();
        assert_eq!(json["type"], "circle");
        assert_eq!(json["radius"], 2.0);
    }
}
