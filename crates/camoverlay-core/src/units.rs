//! Unit handling
//!
//! Toolpaths arrive in either millimeters or inches. Everything drawn is in
//! millimeters, so inch streams are scaled by [`MM_PER_INCH`] once at the end
//! of visualization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use crate::constants::MM_PER_INCH;

/// Length units carried by an instruction stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Units {
    /// Millimeters (G21)
    #[serde(rename = "mm")]
    Millimeters,
    /// Inches (G20)
    #[serde(rename = "in")]
    Inches,
}

impl Units {
    /// Factor that converts a length in these units to millimeters
    pub fn to_mm_factor(self) -> f64 {
        match self {
            Self::Millimeters => 1.0,
            Self::Inches => MM_PER_INCH,
        }
    }

    /// Convert a length in these units to millimeters
    pub fn to_mm(self, value: f64) -> f64 {
        value * self.to_mm_factor()
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Millimeters => write!(f, "mm"),
            Self::Inches => write!(f, "in"),
        }
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mm" | "millimeters" | "metric" => Ok(Self::Millimeters),
            "in" | "inch" | "inches" | "imperial" => Ok(Self::Inches),
            _ => Err(format!("Unknown units: {}", s)),
        }
    }
}

/// Format a millimeter length for display in the given units
pub fn format_length(value_mm: f64, units: Units) -> String {
    match units {
        Units::Millimeters => format!("{:.3}", value_mm),
        Units::Inches => format!("{:.3}", value_mm / MM_PER_INCH),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_mm() {
        assert_eq!(Units::Millimeters.to_mm(3.0), 3.0);
        assert!((Units::Inches.to_mm(2.0) - 50.8).abs() < 1e-12);
    }

    #[test]
    fn test_parse_units() {
        assert_eq!("mm".parse::<Units>(), Ok(Units::Millimeters));
        assert_eq!("Inches".parse::<Units>(), Ok(Units::Inches));
        assert!("furlong".parse::<Units>().is_err());
    }

    #[test]
    fn test_serde_wire_names() {
        assert_eq!(serde_json::to_string(&Units::Inches).unwrap(), "\"in\"");
        let units: Units = serde_json::from_str("\"mm\"").unwrap();
        assert_eq!(units, Units::Millimeters);
    }

    #[test]
    fn test_format_length() {
        assert_eq!(format_length(25.4, Units::Inches), "1.000");
        assert_eq!(format_length(1.5, Units::Millimeters), "1.500");
    }
}
