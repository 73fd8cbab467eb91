//! # Wireplan
//!
//! Floor-plan wiring synthesis: turns device annotations into a routed,
//! sized and priced wiring design.
//!
//! ## Architecture
//!
//! Wireplan is organized as a workspace with multiple crates:
//!
//! 1. **wireplan-core** - Value types, units and the error hierarchy
//! 2. **wireplan-settings** - Planner configuration, device defaults, prices
//! 3. **wireplan-designer** - Lattice, rooms, topology, routing, sizing, costing
//! 4. **wireplan** - Headless binary that runs a plan file end to end
//!
//! ## Features
//!
//! - **Axis Clustering**: Near-duplicate coordinates merged per axis
//! - **Routing Lattice**: Full rectilinear grid with device nodes flagged
//! - **Room Assignment**: Polygon outlines label the devices they enclose
//! - **Circuit Topology**: Switch/light sub-circuits and home runs to the panel
//! - **Wire Sizing**: Gauge by amperage and run length, derated room demand
//! - **Bill of Materials**: Wire per gauge, boxes, breakers and panel tier

pub mod cli;

pub use wireplan_designer as designer;

pub use wireplan_core::{
    format_length, DeviceKind, EditError, Error, Gauge, GridPoint, Point2, Result, RoomError,
    RoutingError, Scale, TopologyError,
};

pub use wireplan_designer::{
    BillOfMaterials, CircuitKey, CircuitTopology, CostEngine, DesignReport, Device, DeviceId,
    DeviceSet, Lattice, PlanContext, PlanFile, RoomOutline, Wire, WireCategory, WiringDesign,
    WiringNetwork,
};

pub use wireplan_settings::{Config, DeviceDefaults, PlannerSettings, PriceTable};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr, keeping stdout free for the design report
/// - RUST_LOG environment variable support
/// - INFO as the default level
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
