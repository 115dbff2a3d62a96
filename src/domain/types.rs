//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed by value into the engine and returned transformed
//! - printed as JSON by the CLI
//! - written to CSV by the batch exporter

use std::fmt;

use clap::ValueEnum;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A 3-D point in metres: planimetric position plus height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    pub easting: f64,
    pub northing: f64,
    pub height: f64,
}

impl Point3D {
    pub fn new(easting: f64, northing: f64, height: f64) -> Self {
        Self {
            easting,
            northing,
            height,
        }
    }

    /// Horizontal position only.
    pub fn planar(&self) -> Point2<f64> {
        Point2::new(self.easting, self.northing)
    }

    /// Rebuild a point from a planar position and a height.
    pub fn from_planar(position: Point2<f64>, height: f64) -> Self {
        Self::new(position.x, position.y, height)
    }
}

/// Horizontal reference frame.
///
/// The two legacy variants differ by a fixed origin offset only; the modern
/// frame is reached through the correction grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PlanimetricFrame {
    /// LV03 with the origin at Bern (E 0 / N 0).
    #[value(name = "lv03-civil")]
    #[serde(rename = "lv03-civil")]
    LegacyCivilian,
    /// LV03 with the conventional false origin (Bern near E 600000 / N 200000).
    #[value(name = "lv03-military")]
    #[serde(rename = "lv03-military")]
    LegacyMilitary,
    /// LV95.
    #[value(name = "lv95")]
    #[serde(rename = "lv95")]
    Modern,
}

impl PlanimetricFrame {
    pub const ALL: [PlanimetricFrame; 3] = [
        PlanimetricFrame::LegacyCivilian,
        PlanimetricFrame::LegacyMilitary,
        PlanimetricFrame::Modern,
    ];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            PlanimetricFrame::LegacyCivilian => "LV03 (civil)",
            PlanimetricFrame::LegacyMilitary => "LV03 (military)",
            PlanimetricFrame::Modern => "LV95",
        }
    }

    pub fn is_legacy(self) -> bool {
        !matches!(self, PlanimetricFrame::Modern)
    }
}

/// Height reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AltimetricFrame {
    /// LN02 levelling heights.
    #[value(name = "ln02")]
    #[serde(rename = "ln02")]
    LegacyLeveling,
    /// LHN95 orthometric heights.
    #[value(name = "lhn95")]
    #[serde(rename = "lhn95")]
    ModernLeveling,
}

impl AltimetricFrame {
    pub const ALL: [AltimetricFrame; 2] = [AltimetricFrame::LegacyLeveling, AltimetricFrame::ModernLeveling];

    pub fn display_name(self) -> &'static str {
        match self {
            AltimetricFrame::LegacyLeveling => "LN02",
            AltimetricFrame::ModernLeveling => "LHN95",
        }
    }
}

/// Where a position falls relative to the supported perimeter.
///
/// `Inside` positions are transformed normally. `Fallback` positions are
/// outside the perimeter but within the configured tolerance: the planimetric
/// result is translated and flagged, heights cannot be converted. `Rejected`
/// positions are too far away for either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerimeterZone {
    Inside,
    Fallback,
    Rejected,
}

impl fmt::Display for PerimeterZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PerimeterZone::Inside => "inside the perimeter",
            PerimeterZone::Fallback => "outside the perimeter, within the fallback tolerance",
            PerimeterZone::Rejected => "outside the fallback tolerance",
        };
        f.write_str(label)
    }
}

/// Input field named by a range error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Easting,
    Northing,
    Height,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Field::Easting => "easting",
            Field::Northing => "northing",
            Field::Height => "height",
        };
        f.write_str(label)
    }
}

/// Output of a successful transformation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformResult {
    pub point: Point3D,
    pub inside_perimeter: bool,
    /// `Inside` or `Fallback`; rejected positions never produce a result.
    pub zone: PerimeterZone,
}

impl TransformResult {
    pub fn new(point: Point3D, zone: PerimeterZone) -> Self {
        Self {
            point,
            inside_perimeter: zone == PerimeterZone::Inside,
            zone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_flag_follows_zone() {
        let p = Point3D::new(1.0, 2.0, 3.0);
        assert!(TransformResult::new(p, PerimeterZone::Inside).inside_perimeter);

        let fallback = TransformResult::new(p, PerimeterZone::Fallback);
        assert!(!fallback.inside_perimeter);
        assert_eq!(fallback.zone, PerimeterZone::Fallback);
    }

    #[test]
    fn frames_serialize_with_cli_names() {
        let json = serde_json::to_string(&PlanimetricFrame::LegacyMilitary).unwrap();
        assert_eq!(json, "\"lv03-military\"");
        let json = serde_json::to_string(&AltimetricFrame::ModernLeveling).unwrap();
        assert_eq!(json, "\"lhn95\"");
    }
}
