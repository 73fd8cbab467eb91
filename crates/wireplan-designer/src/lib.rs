//! # Wireplan Designer
//!
//! This crate turns device annotations on a floor plan into a complete
//! wiring design: a routing lattice, room membership, circuit topology,
//! sized wires, circuit loading and a priced bill of materials.
//!
//! ## Core Components
//!
//! ### Geometry
//! - **Devices**: Outlets, switches, lights, junction boxes and the panel
//! - **Clustering**: Per-axis merging of near-duplicate coordinates
//! - **Lattice**: Full rectilinear grid over the clustered axes
//! - **Rooms**: Polygon outlines that label the devices they enclose
//!
//! ### Wiring
//! - **Topology**: Light to switch, device to junction box, junction box to panel
//! - **Routing**: Shortest rectilinear paths over the lattice
//! - **Sizing**: Gauge by amperage and run length, room demand derating
//! - **Costing**: Wire per gauge, boxes, breakers and panel tier
//!
//! ## Architecture
//!
//! ```text
//! DeviceSet ──> Lattice (snaps devices) ──> RoomAssigner (labels devices)
//!                                              │
//!   CostEngine <── WiringNetwork <── Router <── CircuitTopology
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wireplan_designer::{PlanContext, PlanFile};
//!
//! let plan = PlanFile::load_from_file("plan.json")?;
//! let (mut context, outlines) = PlanContext::from_plan(plan, config);
//! let design = context.run(&outlines)?;
//! println!("total: {:.2}", design.bom.total);
//! ```

pub mod bom;
pub mod cluster;
pub mod device;
pub mod lattice;
pub mod load;
pub mod network;
pub mod pipeline;
pub mod rooms;
pub mod router;
pub mod serialization;
pub mod topology;
pub mod wire;

pub use bom::{gauge_totals, BillOfMaterials, BomRow, BomWarning, CostEngine};
pub use cluster::{cluster_axis, AxisMap};
pub use device::{Device, DeviceId, DeviceSet, MAX_COORDINATE};
pub use lattice::{Lattice, LatticeNode, LatticeView};
pub use load::{derate, PanelSizing, PanelTier, RoomLoad};
pub use network::{InstructionRow, RoomBomEntry, RouteFailure, WiringNetwork};
pub use pipeline::{DesignReport, PlanContext, WiringDesign};
pub use rooms::{polygon_contains, RoomAssigner, RoomAssignment, RoomPolygon};
pub use router::Router;
pub use serialization::{PlanFile, RoomOutline, SymbolRecord};
pub use topology::{CircuitKey, CircuitTopology, PathRequest, RoomCircuit};
pub use wire::{path_length, select_gauge, Wire, WireCategory};
