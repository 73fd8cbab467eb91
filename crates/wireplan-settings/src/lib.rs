//! Wireplan Settings Crate
//!
//! Handles planner configuration: clustering and routing parameters,
//! per-kind device defaults, and the price table used for costing.

pub mod config;
pub mod error;

pub use config::{Config, DeviceDefault, DeviceDefaults, PlannerSettings, PriceTable};
pub use error::{ConfigError, SettingsError, SettingsResult};
