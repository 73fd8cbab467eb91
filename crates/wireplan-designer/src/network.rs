//! # Wiring Network
//!
//! Resolves a [`CircuitTopology`] against a lattice: every path request is
//! routed, sized into a [`Wire`], and grouped by circuit. Room demand is
//! aggregated from the devices that received a wire, derated, and carried by
//! the room's home run.
//!
//! A routing failure only drops the affected wire. A device that does not sit
//! exactly on a lattice node is rejected before any routing starts.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};
use wireplan_core::{DeviceKind, Gauge, GridPoint, Point2, RoutingError, Scale, TopologyError};

use crate::device::{Device, DeviceId, DeviceSet};
use crate::lattice::Lattice;
use crate::load::{PanelSizing, RoomLoad};
use crate::router::Router;
use crate::topology::{CircuitKey, CircuitTopology, PathRequest};
use crate::wire::{Wire, WireCategory};

/// A request that could not be routed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteFailure {
    pub circuit: CircuitKey,
    pub start: DeviceId,
    pub end: DeviceId,
    #[serde(serialize_with = "serialize_display")]
    pub error: RoutingError,
}

/// One line of the per-wire installation listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstructionRow {
    pub circuit: String,
    pub device_kind: DeviceKind,
    pub start: GridPoint,
    pub end: GridPoint,
    pub gauge: Gauge,
    pub length: f64,
}

/// One line of the per-room material breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomBomEntry {
    pub room: String,
    pub device_kind: DeviceKind,
    pub amperage: Option<f64>,
    pub length: f64,
    pub gauge: Gauge,
}

/// Routed and sized wiring for a whole plan
#[derive(Debug, Clone, Default)]
pub struct WiringNetwork {
    circuits: BTreeMap<CircuitKey, Vec<Wire>>,
    loads: BTreeMap<String, RoomLoad>,
    failures: Vec<RouteFailure>,
    panel: Option<PanelSizing>,
}

impl WiringNetwork {
    /// Route every request of `topology` over `lattice`
    ///
    /// * `scale` - Real-world units per lattice unit, applied to wire lengths
    pub fn build(
        devices: &DeviceSet,
        lattice: &Lattice,
        topology: &CircuitTopology,
        scale: Scale,
    ) -> Result<Self, TopologyError> {
        check_on_lattice(devices, lattice, topology)?;

        let router = Router::new(lattice);
        let mut network = Self::default();

        for room in &topology.rooms {
            let key = CircuitKey::Room(room.room.clone());
            let mut wires = Vec::with_capacity(room.requests.len());
            for request in &room.requests {
                if let Some(wire) = network.route(&router, devices, &key, request, scale, 0.0)? {
                    wires.push(wire);
                }
            }

            let load = RoomLoad::new(room.room.clone(), connected_amps(devices, &wires));
            debug!(
                "Room '{}': {} wire(s), {:.2} A connected, {:.2} A effective",
                room.room,
                wires.len(),
                load.connected_amps,
                load.effective_amps
            );
            network.loads.insert(room.room.clone(), load);
            network.circuits.insert(key, wires);
        }

        let key = CircuitKey::PanelConnections;
        let mut home_runs = Vec::with_capacity(topology.home_runs.len());
        for request in &topology.home_runs {
            let demand = network.home_run_demand(devices, topology, &request.start);
            if let Some(wire) = network.route(&router, devices, &key, request, scale, demand)? {
                home_runs.push(wire);
            }
        }
        network.circuits.insert(key, home_runs);

        let panel = PanelSizing::from_loads(network.loads.values());
        info!(
            "Wiring network: {} wire(s), {} room circuit(s), {} failure(s), panel {} ({:.2} A)",
            network.all_wires().count(),
            network.breaker_count(),
            network.failures.len(),
            panel.tier,
            panel.max_amps
        );
        network.panel = Some(panel);
        Ok(network)
    }

    fn route(
        &mut self,
        router: &Router<'_>,
        devices: &DeviceSet,
        circuit: &CircuitKey,
        request: &PathRequest,
        scale: Scale,
        room_demand: f64,
    ) -> Result<Option<Wire>, TopologyError> {
        let start = lookup(devices, &request.start)?;
        let end = lookup(devices, &request.end)?;

        match router.route(start.node(), end.node()) {
            Ok(path) => Ok(Some(Wire::new(path, start, end, scale, room_demand))),
            Err(error) => {
                warn!(
                    "Skipping wire {} -> {} in '{}': {}",
                    start.id, end.id, circuit, error
                );
                self.failures.push(RouteFailure {
                    circuit: circuit.clone(),
                    start: start.id.clone(),
                    end: end.id.clone(),
                    error,
                });
                Ok(None)
            }
        }
    }

    /// Effective amps carried by a junction box's home run
    fn home_run_demand(
        &self,
        devices: &DeviceSet,
        topology: &CircuitTopology,
        junction: &DeviceId,
    ) -> f64 {
        let Some(room) = devices.get(junction).and_then(|d| d.room.as_deref()) else {
            return 0.0;
        };
        let selected = topology.room(room).is_some_and(|r| &r.junction == junction);
        match self.loads.get(room) {
            Some(load) if selected => load.effective_amps,
            _ => 0.0,
        }
    }

    pub fn circuits(&self) -> &BTreeMap<CircuitKey, Vec<Wire>> {
        &self.circuits
    }

    /// Wires of one circuit; empty when the circuit is unknown
    pub fn wires(&self, circuit: &CircuitKey) -> &[Wire] {
        self.circuits.get(circuit).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn room_wires(&self, room: &str) -> &[Wire] {
        self.wires(&CircuitKey::Room(room.to_string()))
    }

    pub fn home_runs(&self) -> &[Wire] {
        self.wires(&CircuitKey::PanelConnections)
    }

    pub fn all_wires(&self) -> impl Iterator<Item = (&CircuitKey, &Wire)> {
        self.circuits
            .iter()
            .flat_map(|(key, wires)| wires.iter().map(move |w| (key, w)))
    }

    pub fn loads(&self) -> impl Iterator<Item = &RoomLoad> {
        self.loads.values()
    }

    pub fn load(&self, room: &str) -> Option<&RoomLoad> {
        self.loads.get(room)
    }

    pub fn failures(&self) -> &[RouteFailure] {
        &self.failures
    }

    pub fn panel(&self) -> PanelSizing {
        self.panel
            .clone()
            .unwrap_or_else(|| PanelSizing::from_loads(self.loads.values()))
    }

    /// Rooms that produced at least one wire
    pub fn breaker_count(&self) -> usize {
        self.circuits
            .iter()
            .filter(|(key, wires)| key.room().is_some() && !wires.is_empty())
            .count()
    }

    /// Wires whose load is beyond the automatic gauge brackets
    pub fn gauge_warnings(&self) -> Vec<(&CircuitKey, &Wire)> {
        self.all_wires().filter(|(_, w)| w.needs_engineer()).collect()
    }

    /// Per-wire listing with lattice endpoints
    pub fn instructions(&self) -> Vec<InstructionRow> {
        self.all_wires()
            .filter_map(|(key, wire)| {
                let (start, end) = (*wire.path().first()?, *wire.path().last()?);
                Some(InstructionRow {
                    circuit: key.to_string(),
                    device_kind: wire.start_kind(),
                    start,
                    end,
                    gauge: wire.gauge(),
                    length: wire.length(),
                })
            })
            .collect()
    }

    /// Room wires with the amperage of the device they serve
    pub fn room_breakdown(&self, devices: &DeviceSet) -> Vec<RoomBomEntry> {
        self.all_wires()
            .filter(|(_, wire)| wire.category() == WireCategory::RoomWire)
            .filter_map(|(key, wire)| {
                Some(RoomBomEntry {
                    room: key.room()?.to_string(),
                    device_kind: wire.start_kind(),
                    amperage: devices.get(wire.start()).and_then(|d| d.amperage),
                    length: wire.length(),
                    gauge: wire.gauge(),
                })
            })
            .collect()
    }
}

fn lookup<'a>(devices: &'a DeviceSet, id: &DeviceId) -> Result<&'a Device, TopologyError> {
    devices
        .get(id)
        .ok_or_else(|| TopologyError::UnknownDevice { id: id.to_string() })
}

/// Every routed endpoint must sit exactly on a lattice node
fn check_on_lattice(
    devices: &DeviceSet,
    lattice: &Lattice,
    topology: &CircuitTopology,
) -> Result<(), TopologyError> {
    let endpoints: BTreeSet<&DeviceId> = topology
        .rooms
        .iter()
        .flat_map(|r| r.requests.iter())
        .chain(topology.home_runs.iter())
        .flat_map(|r| [&r.start, &r.end])
        .collect();

    for id in endpoints {
        let device = lookup(devices, id)?;
        let node = device.node();
        if Point2::from(node) != device.coords || !lattice.contains(node) {
            return Err(TopologyError::OffLattice {
                device: id.to_string(),
                x: device.coords.x,
                y: device.coords.y,
            });
        }
    }
    Ok(())
}

/// Sum of amperages over the distinct devices that start a room wire
fn connected_amps(devices: &DeviceSet, wires: &[Wire]) -> f64 {
    let starts: BTreeSet<&DeviceId> = wires.iter().map(|w| w.start()).collect();
    starts
        .into_iter()
        .filter_map(|id| devices.get(id))
        .map(|device| {
            if device.amperage.is_none() {
                warn!("{} {} has no amperage; counting 0 A", device.kind, device.id);
            }
            device.amperage_or_zero()
        })
        .sum()
}

fn serialize_display<S: serde::Serializer>(
    value: &RoutingError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wireplan_settings::DeviceDefaults;

    struct Plan {
        devices: DeviceSet,
        lattice: Lattice,
        topology: CircuitTopology,
    }

    fn plan(layout: &[(DeviceKind, f64, f64, Option<&str>)], links: &[(usize, usize)]) -> Plan {
        let defaults = DeviceDefaults::default();
        let mut devices = DeviceSet::new();
        let ids: Vec<DeviceId> = layout
            .iter()
            .map(|&(kind, x, y, room)| {
                let id = devices.add(kind, Point2::new(x, y), &defaults);
                if let Some(room) = room {
                    devices.set_room(&id, room).unwrap();
                }
                id
            })
            .collect();
        for &(s, l) in links {
            devices.link_control(&ids[s], &ids[l]).unwrap();
        }
        let lattice = Lattice::build(&mut devices, 1.0, 1);
        let topology = CircuitTopology::synthesize(&devices).unwrap();
        Plan {
            devices,
            lattice,
            topology,
        }
    }

    #[test]
    fn test_room_and_home_run_wires() {
        let p = plan(
            &[
                (DeviceKind::Switch, 0.0, 0.0, Some("Den")),
                (DeviceKind::Light, 0.0, 20.0, Some("Den")),
                (DeviceKind::Light, 20.0, 20.0, Some("Den")),
                (DeviceKind::JunctionBox, 20.0, 0.0, Some("Den")),
                (DeviceKind::ElectricalPanel, 40.0, 0.0, None),
            ],
            &[(0, 1), (0, 2)],
        );
        let network =
            WiringNetwork::build(&p.devices, &p.lattice, &p.topology, Scale::default()).unwrap();

        assert_eq!(network.room_wires("Den").len(), 3);
        assert_eq!(network.home_runs().len(), 1);
        assert_eq!(network.breaker_count(), 1);
        assert!(network.failures().is_empty());

        // switch 15 A + two lights at 1 A each
        let load = network.load("Den").unwrap();
        assert_eq!(load.connected_amps, 17.0);
        assert!((load.effective_amps - 5.1).abs() < 1e-9);

        let home_run = &network.home_runs()[0];
        assert_eq!(home_run.category(), WireCategory::HomeRunWire);
        // 20 units across plus the panel's 6 unit mount height
        assert_eq!(home_run.length(), 26.0);
        assert!((home_run.amperage() - 5.1).abs() < 1e-9);
    }

    #[test]
    fn test_heavy_room_home_run_uses_capped_demand() {
        let p = plan(
            &[
                (DeviceKind::Outlet, 0.0, 0.0, Some("Shop")),
                (DeviceKind::Outlet, 0.0, 10.0, Some("Shop")),
                (DeviceKind::JunctionBox, 10.0, 0.0, Some("Shop")),
                (DeviceKind::ElectricalPanel, 100.0, 0.0, None),
            ],
            &[],
        );
        let mut devices = p.devices;
        let outlets: Vec<DeviceId> = devices
            .of_kind(DeviceKind::Outlet)
            .map(|d| d.id.clone())
            .collect();
        for outlet in &outlets {
            devices.set_amperage(outlet, "40").unwrap();
        }
        let network =
            WiringNetwork::build(&devices, &p.lattice, &p.topology, Scale::default()).unwrap();

        assert_eq!(network.load("Shop").unwrap().effective_amps, 20.0);
        let home_run = &network.home_runs()[0];
        assert_eq!(home_run.amperage(), 20.0);
        // 90 units + 6 rise, over the long-run threshold
        assert_eq!(home_run.gauge(), Gauge::Awg10);
        assert_eq!(network.gauge_warnings().len(), 2);
    }

    #[test]
    fn test_off_lattice_device_is_rejected() {
        let p = plan(
            &[
                (DeviceKind::Outlet, 0.0, 0.0, Some("Den")),
                (DeviceKind::JunctionBox, 10.0, 0.0, Some("Den")),
                (DeviceKind::ElectricalPanel, 20.0, 0.0, None),
            ],
            &[],
        );
        let mut devices = p.devices;
        let outlet = devices.of_kind(DeviceKind::Outlet).map(|d| d.id.clone()).next().unwrap();
        devices.set_coords(&outlet, "0.5", "0").unwrap();

        let result = WiringNetwork::build(&devices, &p.lattice, &p.topology, Scale::default());
        assert!(matches!(result, Err(TopologyError::OffLattice { .. })));
    }

    #[test]
    fn test_instructions_and_breakdown() {
        let p = plan(
            &[
                (DeviceKind::Outlet, 0.0, 0.0, Some("Den")),
                (DeviceKind::JunctionBox, 10.0, 0.0, Some("Den")),
                (DeviceKind::ElectricalPanel, 10.0, 30.0, None),
            ],
            &[],
        );
        let scale = Scale::new(2.0).unwrap();
        let network = WiringNetwork::build(&p.devices, &p.lattice, &p.topology, scale).unwrap();

        let rows = network.instructions();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].circuit, "Den");
        assert_eq!(rows[0].start, GridPoint::new(0, 0));
        assert_eq!(rows[0].end, GridPoint::new(10, 0));
        // 10 units * 2 + outlet height 7
        assert_eq!(rows[0].length, 27.0);
        assert_eq!(rows[1].circuit, "panel_connections");
        assert_eq!(rows[1].device_kind, DeviceKind::JunctionBox);

        let breakdown = network.room_breakdown(&p.devices);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].amperage, Some(15.0));
        assert_eq!(breakdown[0].gauge, Gauge::Awg14);
    }

    #[test]
    fn test_room_without_wires_takes_no_breaker() {
        let p = plan(
            &[
                (DeviceKind::JunctionBox, 0.0, 0.0, Some("Closet")),
                (DeviceKind::ElectricalPanel, 10.0, 0.0, None),
            ],
            &[],
        );
        let network =
            WiringNetwork::build(&p.devices, &p.lattice, &p.topology, Scale::default()).unwrap();
        assert_eq!(network.breaker_count(), 0);
        assert_eq!(network.home_runs().len(), 1);
        assert_eq!(network.panel().max_amps, 0.0);
    }
}
