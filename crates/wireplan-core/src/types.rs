//! Shared value types
//!
//! Device kinds, wire gauges, and the two point types used across the
//! pipeline: [`Point2`] for raw drawing coordinates and [`GridPoint`] for
//! integer lattice positions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of annotated device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Wall receptacle
    Outlet,
    /// Wall switch controlling one or more lights
    Switch,
    /// Ceiling light, reached through its switch
    Light,
    /// Per-room aggregation point
    #[serde(alias = "junction box")]
    JunctionBox,
    /// Service panel, endpoint of every home run
    #[serde(alias = "electrical panel")]
    ElectricalPanel,
}

impl DeviceKind {
    /// All kinds in annotation order
    pub const ALL: [DeviceKind; 5] = [
        DeviceKind::Outlet,
        DeviceKind::Switch,
        DeviceKind::Light,
        DeviceKind::JunctionBox,
        DeviceKind::ElectricalPanel,
    ];
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Outlet => write!(f, "outlet"),
            Self::Switch => write!(f, "switch"),
            Self::Light => write!(f, "light"),
            Self::JunctionBox => write!(f, "junction box"),
            Self::ElectricalPanel => write!(f, "electrical panel"),
        }
    }
}

impl FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', " ").as_str() {
            "outlet" => Ok(Self::Outlet),
            "switch" => Ok(Self::Switch),
            "light" => Ok(Self::Light),
            "junction box" => Ok(Self::JunctionBox),
            "electrical panel" | "panel" => Ok(Self::ElectricalPanel),
            _ => Err(format!("Unknown device kind: {}", s)),
        }
    }
}

/// Wire cross-section class
///
/// Ordered from the thinnest conductor to the sentinel that needs manual
/// sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Gauge {
    #[serde(rename = "14 AWG")]
    Awg14,
    #[serde(rename = "12 AWG")]
    Awg12,
    #[serde(rename = "10 AWG")]
    Awg10,
    #[serde(rename = "8 AWG")]
    Awg8,
    /// Load exceeds the automatic brackets
    #[serde(rename = "Consult engineer")]
    ConsultEngineer,
}

impl Gauge {
    /// Whether a gauge was picked automatically
    pub fn is_sized(&self) -> bool {
        !matches!(self, Self::ConsultEngineer)
    }
}

impl fmt::Display for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Awg14 => write!(f, "14 AWG"),
            Self::Awg12 => write!(f, "12 AWG"),
            Self::Awg10 => write!(f, "10 AWG"),
            Self::Awg8 => write!(f, "8 AWG"),
            Self::ConsultEngineer => write!(f, "Consult engineer"),
        }
    }
}

/// Raw drawing coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Integer position with each axis truncated toward zero
    pub fn truncate(&self) -> GridPoint {
        GridPoint::new(self.x as i64, self.y as i64)
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point2) -> f64 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

impl From<GridPoint> for Point2 {
    fn from(p: GridPoint) -> Self {
        Self::new(p.x as f64, p.y as f64)
    }
}

/// Integer lattice position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i64,
    pub y: i64,
}

impl GridPoint {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to a drawing coordinate
    pub fn squared_distance_to(&self, p: &Point2) -> f64 {
        (self.x as f64 - p.x).powi(2) + (self.y as f64 - p.y).powi(2)
    }

    /// Euclidean distance to another lattice point
    pub fn distance_to(&self, other: &GridPoint) -> f64 {
        Point2::from(*self).distance_to(&Point2::from(*other))
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
