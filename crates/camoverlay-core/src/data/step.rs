use serde::{Deserialize, Serialize};
use std::fmt;

use super::Mark;

/// What the overlay should do with a polled step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StepType {
    /// Draw nothing, keep the current scene
    Standby,
    /// Render the step's marks through the homography
    Step,
    /// Show the draggable calibration box
    Calibration,
    /// A type this build does not know; handled like standby
    Unknown(String),
}

impl From<String> for StepType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "standby" => Self::Standby,
            "step" => Self::Step,
            "calibration" => Self::Calibration,
            _ => Self::Unknown(s),
        }
    }
}

impl From<StepType> for String {
    fn from(t: StepType) -> Self {
        match t {
            StepType::Standby => "standby".to_string(),
            StepType::Step => "step".to_string(),
            StepType::Calibration => "calibration".to_string(),
            StepType::Unknown(s) => s,
        }
    }
}

impl fmt::Display for StepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standby => write!(f, "standby"),
            Self::Step => write!(f, "step"),
            Self::Calibration => write!(f, "calibration"),
            Self::Unknown(s) => write!(f, "unknown ({})", s),
        }
    }
}

/// One complete scene description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub step_type: StepType,
    #[serde(default)]
    pub marks: Vec<Mark>,
}

impl Step {
    pub fn new(name: impl Into<String>, step_type: StepType, marks: Vec<Mark>) -> Self {
        Self {
            name: name.into(),
            step_type,
            marks,
        }
    }

    pub fn standby() -> Self {
        Self::new("standby", StepType::Standby, Vec::new())
    }

    pub fn calibration() -> Self {
        Self::new("calibration", StepType::Calibration, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_step() {
        let json = r#"{
            "name": "drill dowels",
            "type": "step",
            "marks": [
                {"type": "crosshair", "location": {"x": 10, "y": 20}},
                {"type": "text", "location": {"x": 0, "y": 0}, "text": "hello"}
            ]
        }"#;
        let step: Step = serde_json::from_str(json).unwrap();
        assert_eq!(step.name, "drill dowels");
        assert_eq!(step.step_type, StepType::Step);
        assert_eq!(step.marks.len(), 2);
    }

    #[test]
    fn test_unknown_step_type_is_preserved() {
        let step: Step = serde_json::from_str(r#"{"name":"x","type":"teleport"}"#).unwrap();
        assert_eq!(step.step_type, StepType::Unknown("teleport".to_string()));
        assert!(step.marks.is_empty());
    }

    #[test]
    fn test_step_type_wire_name() {
        let json = serde_json::to_string(&Step::standby()).unwrap();
        assert!(json.contains(r#""type":"standby""#));
    }
}
