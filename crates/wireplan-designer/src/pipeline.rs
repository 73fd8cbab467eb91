//! # Pipeline
//!
//! [`PlanContext`] owns everything one run needs: the device set, the
//! real-world scale and the configuration. Each stage is a method so callers
//! can drive the steps one at a time (as an editor does after each user
//! action) or all at once with [`PlanContext::run`].

use serde::Serialize;
use tracing::{info, warn};
use wireplan_core::{Result, RoomError, Scale, TopologyError};
use wireplan_settings::Config;

use crate::bom::{BillOfMaterials, CostEngine};
use crate::device::{DeviceId, DeviceSet};
use crate::lattice::{Lattice, LatticeView};
use crate::load::{PanelSizing, RoomLoad};
use crate::network::{InstructionRow, RouteFailure, RoomBomEntry, WiringNetwork};
use crate::rooms::{RoomAssigner, RoomAssignment, RoomPolygon};
use crate::serialization::{PlanFile, RoomOutline};
use crate::topology::CircuitTopology;

/// State scoped to a single pipeline run
#[derive(Debug, Clone)]
pub struct PlanContext {
    pub devices: DeviceSet,
    pub scale: Scale,
    pub config: Config,
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct WiringDesign {
    pub lattice: Lattice,
    pub rooms: Vec<RoomAssignment>,
    pub topology: CircuitTopology,
    pub network: WiringNetwork,
    pub bom: BillOfMaterials,
}

/// Serializable summary of a design for downstream renderers and reports
#[derive(Debug, Clone, Serialize)]
pub struct DesignReport {
    pub scale: f64,
    pub lattice: LatticeView,
    pub rooms: Vec<RoomAssignment>,
    pub unassigned: Vec<DeviceId>,
    pub uncontrolled_lights: Vec<DeviceId>,
    pub instructions: Vec<InstructionRow>,
    pub room_breakdown: Vec<RoomBomEntry>,
    pub loads: Vec<RoomLoad>,
    pub panel: PanelSizing,
    pub failures: Vec<RouteFailure>,
    pub bom: BillOfMaterials,
}

impl PlanContext {
    /// Create a context; a missing or invalid scale falls back to the configured default
    pub fn new(devices: DeviceSet, scale: Option<Scale>, config: Config) -> Self {
        let scale = resolve_scale(scale, &config);
        Self {
            devices,
            scale,
            config,
        }
    }

    /// Create a context from a loaded plan; returns the plan's pending room outlines
    pub fn from_plan(mut plan: PlanFile, config: Config) -> (Self, Vec<RoomOutline>) {
        let outlines = std::mem::take(&mut plan.rooms);
        let scale = plan.scale;
        (Self::new(plan.into_devices(), scale, config), outlines)
    }

    /// Snap devices and rebuild the lattice
    pub fn build_lattice(&mut self) -> Lattice {
        let planner = &self.config.planner;
        Lattice::build(&mut self.devices, planner.grid_scale, planner.cluster_threshold)
    }

    /// Apply room outlines in order; rejected outlines are logged and skipped
    pub fn assign_rooms(
        &mut self,
        lattice: &Lattice,
        outlines: &[RoomOutline],
    ) -> Vec<RoomAssignment> {
        let mut assigner = RoomAssigner::new(self.config.planner.room_tolerance);
        let mut assignments = Vec::with_capacity(outlines.len());
        for outline in outlines {
            match self.polygon(lattice, outline) {
                Ok(polygon) => {
                    assignments.push(assigner.assign(polygon, lattice, &mut self.devices))
                }
                Err(e) => warn!("Rejected room outline '{}': {}", outline.label, e),
            }
        }
        assignments
    }

    fn polygon(
        &self,
        lattice: &Lattice,
        outline: &RoomOutline,
    ) -> std::result::Result<RoomPolygon, RoomError> {
        RoomPolygon::from_picks(outline.label.clone(), &outline.picks(), lattice)
    }

    pub fn synthesize(&self) -> std::result::Result<CircuitTopology, TopologyError> {
        CircuitTopology::synthesize(&self.devices)
    }

    /// Run every stage; fails only on configuration errors
    pub fn run(&mut self, outlines: &[RoomOutline]) -> Result<WiringDesign> {
        let lattice = self.build_lattice();
        let rooms = self.assign_rooms(&lattice, outlines);
        let topology = self.synthesize()?;
        let network = WiringNetwork::build(&self.devices, &lattice, &topology, self.scale)?;
        let bom = CostEngine::new(&self.config.pricing).price(&network, &self.devices);

        info!(
            "Design complete: {} device(s), {} room(s), total ${:.2}",
            self.devices.len(),
            topology.rooms.len(),
            bom.total
        );

        Ok(WiringDesign {
            lattice,
            rooms,
            topology,
            network,
            bom,
        })
    }
}

impl WiringDesign {
    pub fn report(&self, context: &PlanContext) -> DesignReport {
        DesignReport {
            scale: context.scale.factor(),
            lattice: self.lattice.view(),
            rooms: self.rooms.clone(),
            unassigned: self.topology.unassigned.clone(),
            uncontrolled_lights: self.topology.uncontrolled_lights.clone(),
            instructions: self.network.instructions(),
            room_breakdown: self.network.room_breakdown(&context.devices),
            loads: self.network.loads().cloned().collect(),
            panel: self.network.panel(),
            failures: self.network.failures().to_vec(),
            bom: self.bom.clone(),
        }
    }
}

fn resolve_scale(scale: Option<Scale>, config: &Config) -> Scale {
    if let Some(scale) = scale {
        match Scale::new(scale.factor()) {
            Ok(scale) => return scale,
            Err(e) => warn!("Ignoring plan scale: {}", e),
        }
    }
    Scale::new(config.planner.default_scale).unwrap_or_default()
}
