//! Configuration management for Wireplan
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML file formats.
//!
//! Configuration is organized into logical sections:
//! - Planner settings (clustering threshold, grid scale, polygon tolerance)
//! - Device defaults (amperage and mount height per device kind)
//! - Pricing (wire per gauge, junction boxes, breakers, panel tiers)

use crate::error::{ConfigError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use wireplan_core::{DeviceKind, Gauge};

/// Ceiling height used to derive the default mount heights
pub const CEILING_HEIGHT: f64 = 8.0;

/// Pipeline parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// Axis clustering distance (drawing units, absolute)
    pub cluster_threshold: i64,
    /// Multiplier applied to drawing coordinates before clustering
    pub grid_scale: f64,
    /// Boundary tolerance radius for the point-in-polygon test
    pub room_tolerance: f64,
    /// Real-world units per drawing unit when a plan carries none
    pub default_scale: f64,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            cluster_threshold: 10,
            grid_scale: 1.0,
            room_tolerance: 1e-6,
            default_scale: 1.0,
        }
    }
}

/// Amperage and mount height assigned to a newly placed device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceDefault {
    #[serde(default)]
    pub amperage: Option<f64>,
    pub height: f64,
}

impl DeviceDefault {
    pub fn new(amperage: Option<f64>, height: f64) -> Self {
        Self { amperage, height }
    }
}

/// Per-kind device defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceDefaults {
    pub outlet: DeviceDefault,
    pub switch: DeviceDefault,
    pub light: DeviceDefault,
    pub junction_box: DeviceDefault,
    pub electrical_panel: DeviceDefault,
}

impl Default for DeviceDefaults {
    fn default() -> Self {
        Self {
            outlet: DeviceDefault::new(Some(15.0), CEILING_HEIGHT - 1.0),
            switch: DeviceDefault::new(Some(15.0), CEILING_HEIGHT - 4.0),
            light: DeviceDefault::new(Some(1.0), CEILING_HEIGHT),
            junction_box: DeviceDefault::new(None, CEILING_HEIGHT),
            electrical_panel: DeviceDefault::new(None, 6.0),
        }
    }
}

impl DeviceDefaults {
    /// Defaults for a given device kind
    pub fn for_kind(&self, kind: DeviceKind) -> DeviceDefault {
        match kind {
            DeviceKind::Outlet => self.outlet,
            DeviceKind::Switch => self.switch,
            DeviceKind::Light => self.light,
            DeviceKind::JunctionBox => self.junction_box,
            DeviceKind::ElectricalPanel => self.electrical_panel,
        }
    }
}

/// Unit prices used by the cost engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceTable {
    /// 14 AWG, per unit length
    pub awg14: f64,
    /// 12 AWG, per unit length
    pub awg12: f64,
    /// 10 AWG, per unit length
    pub awg10: f64,
    /// 8 AWG, per unit length
    pub awg8: f64,
    /// Per junction box
    pub junction_box: f64,
    /// Per breaker
    pub breaker: f64,
    /// Panel rated 100-150A
    pub panel_100_150a: f64,
    /// Panel rated 200A
    pub panel_200a: f64,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self {
            awg14: 0.5,
            awg12: 0.6,
            awg10: 0.8,
            awg8: 1.0,
            junction_box: 3.0,
            breaker: 5.0,
            panel_100_150a: 150.0,
            panel_200a: 250.0,
        }
    }
}

impl PriceTable {
    /// Unit price of a gauge; `None` for gauges that need manual sizing
    pub fn wire_price(&self, gauge: Gauge) -> Option<f64> {
        match gauge {
            Gauge::Awg14 => Some(self.awg14),
            Gauge::Awg12 => Some(self.awg12),
            Gauge::Awg10 => Some(self.awg10),
            Gauge::Awg8 => Some(self.awg8),
            Gauge::ConsultEngineer => None,
        }
    }

    fn entries(&self) -> [(&'static str, f64); 8] {
        [
            ("pricing.awg14", self.awg14),
            ("pricing.awg12", self.awg12),
            ("pricing.awg10", self.awg10),
            ("pricing.awg8", self.awg8),
            ("pricing.junction_box", self.junction_box),
            ("pricing.breaker", self.breaker),
            ("pricing.panel_100_150a", self.panel_100_150a),
            ("pricing.panel_200a", self.panel_200a),
        ]
    }
}

/// Complete planner configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Pipeline parameters
    pub planner: PlannerSettings,
    /// Device defaults
    pub defaults: DeviceDefaults,
    /// Price table
    pub pricing: PriceTable,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-user config file location
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDirectory)?;
        Ok(dir.join("wireplan").join("config.toml"))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match Format::of(path)? {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load the config at `path`, or defaults when the file does not exist
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let planner = &self.planner;
        if planner.cluster_threshold < 0 {
            return Err(out_of_range(
                "planner.cluster_threshold",
                planner.cluster_threshold,
            ));
        }
        if !(planner.grid_scale.is_finite() && planner.grid_scale > 0.0) {
            return Err(out_of_range("planner.grid_scale", planner.grid_scale));
        }
        if !(planner.room_tolerance.is_finite() && planner.room_tolerance >= 0.0) {
            return Err(out_of_range("planner.room_tolerance", planner.room_tolerance));
        }
        if !(planner.default_scale.is_finite() && planner.default_scale > 0.0) {
            return Err(out_of_range("planner.default_scale", planner.default_scale));
        }

        for kind in DeviceKind::ALL {
            let default = self.defaults.for_kind(kind);
            if !(default.height.is_finite() && default.height >= 0.0) {
                return Err(out_of_range(&format!("defaults.{kind}.height"), default.height));
            }
            if let Some(amps) = default.amperage {
                if !(amps.is_finite() && amps >= 0.0) {
                    return Err(out_of_range(&format!("defaults.{kind}.amperage"), amps));
                }
            }
        }

        for (key, price) in self.pricing.entries() {
            if !(price.is_finite() && price >= 0.0) {
                return Err(out_of_range(key, price));
            }
        }

        Ok(())
    }
}

enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}

fn out_of_range(key: &str, value: impl ToString) -> ConfigError {
    ConfigError::ValueOutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}
