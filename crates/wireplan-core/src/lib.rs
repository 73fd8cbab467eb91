//! # Wireplan Core
//!
//! Core types, units, and error handling for Wireplan.
//! Provides the value types shared by the settings and designer crates:
//! device kinds, wire gauges, lattice points, and the error hierarchy.

pub mod error;
pub mod types;
pub mod units;

pub use error::{EditError, Error, Result, RoomError, RoutingError, TopologyError};

pub use types::{DeviceKind, Gauge, GridPoint, Point2};

pub use units::{format_length, Scale};
