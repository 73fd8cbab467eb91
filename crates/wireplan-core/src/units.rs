//! Unit conversion utilities
//!
//! Handles the drawing-to-real-world scale (feet per drawing unit) and
//! length formatting for reports.

use crate::types::Point2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Real-world units per drawing unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scale(f64);

impl Default for Scale {
    fn default() -> Self {
        Self(1.0)
    }
}

impl Scale {
    /// Create a scale, rejecting zero, negative, and non-finite factors
    pub fn new(factor: f64) -> Result<Self, String> {
        if factor.is_finite() && factor > 0.0 {
            Ok(Self(factor))
        } else {
            Err(format!("Scale must be a positive finite number, got {}", factor))
        }
    }

    /// Derive the scale from two picked points and their known real distance
    ///
    /// * `a`, `b` - Points in drawing units
    /// * `real_distance` - Real-world distance between them (feet)
    pub fn from_calibration(a: Point2, b: Point2, real_distance: f64) -> Result<Self, String> {
        let drawing_distance = a.distance_to(&b);
        if drawing_distance <= 0.0 {
            return Err("Calibration points must be distinct".to_string());
        }
        if !real_distance.is_finite() || real_distance <= 0.0 {
            return Err(format!("Invalid calibration distance: {}", real_distance));
        }
        Self::new(real_distance / drawing_distance)
    }

    pub fn factor(&self) -> f64 {
        self.0
    }

    /// Convert a drawing-unit length to real-world units
    pub fn apply(&self, drawing_length: f64) -> f64 {
        drawing_length * self.0
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4} ft/unit", self.0)
    }
}

/// Format length value for display
///
/// * `value_ft` - Value in feet
pub fn format_length(value_ft: f64) -> String {
    format!("{:.2} ft", value_ft)
}
