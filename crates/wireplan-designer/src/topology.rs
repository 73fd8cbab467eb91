//! # Circuit Topology
//!
//! Turns a room-labeled device set into path requests: light to switch,
//! switch or outlet to the room's junction box, and one home run from every
//! junction box to the electrical panel. No geometry is involved here; the
//! requests are resolved by the router afterwards.

use serde::Serialize;
use std::fmt;
use tracing::{debug, error, warn};
use wireplan_core::{DeviceKind, TopologyError};

use crate::device::{Device, DeviceId, DeviceSet};

/// Circuit a wire belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CircuitKey {
    /// Wiring inside a labeled room
    Room(String),
    /// Home runs from junction boxes to the panel
    PanelConnections,
}

impl CircuitKey {
    pub fn room(&self) -> Option<&str> {
        match self {
            Self::Room(label) => Some(label),
            Self::PanelConnections => None,
        }
    }
}

impl fmt::Display for CircuitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Room(label) => f.write_str(label),
            Self::PanelConnections => f.write_str("panel_connections"),
        }
    }
}

/// A wire to be routed from `start` to `end`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathRequest {
    pub start: DeviceId,
    pub end: DeviceId,
}

impl PathRequest {
    pub fn new(start: &DeviceId, end: &DeviceId) -> Self {
        Self {
            start: start.clone(),
            end: end.clone(),
        }
    }
}

/// Requests for one room
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomCircuit {
    pub room: String,
    /// Junction box every room wire aggregates into
    pub junction: DeviceId,
    pub requests: Vec<PathRequest>,
}

/// Complete set of path requests for a plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircuitTopology {
    /// Rooms in order of first appearance
    pub rooms: Vec<RoomCircuit>,
    pub panel: DeviceId,
    /// One request per junction box in a labeled room
    pub home_runs: Vec<PathRequest>,
    /// Non-panel devices left out because they have no room
    pub unassigned: Vec<DeviceId>,
    /// Lights no switch controls; they receive no wire
    pub uncontrolled_lights: Vec<DeviceId>,
}

impl CircuitTopology {
    /// Build path requests for every room and the panel home runs
    ///
    /// Fails when there is not exactly one electrical panel or when a room
    /// has no junction box. Nothing is produced on failure.
    pub fn synthesize(devices: &DeviceSet) -> Result<Self, TopologyError> {
        Self::build(devices).map_err(|e| {
            error!("Topology synthesis failed: {}", e);
            e
        })
    }

    fn build(devices: &DeviceSet) -> Result<Self, TopologyError> {
        let panel = single_panel(devices)?;

        let mut labels: Vec<&str> = Vec::new();
        for device in devices.iter().filter(|d| !d.is_panel()) {
            if let Some(room) = device.room.as_deref() {
                if !labels.contains(&room) {
                    labels.push(room);
                }
            }
        }

        let mut rooms = Vec::with_capacity(labels.len());
        let mut home_runs = Vec::new();
        for label in labels {
            let members: Vec<&Device> = devices
                .iter()
                .filter(|d| !d.is_panel() && d.room.as_deref() == Some(label))
                .collect();
            let circuit = room_circuit(label, &members, devices)?;

            home_runs.extend(
                members
                    .iter()
                    .filter(|d| d.kind == DeviceKind::JunctionBox)
                    .map(|jb| PathRequest::new(&jb.id, &panel.id)),
            );
            debug!("Room '{}': {} request(s)", label, circuit.requests.len());
            rooms.push(circuit);
        }

        // a roomless light is still wired when its switch has a room
        let unassigned: Vec<DeviceId> = devices
            .iter()
            .filter(|d| !d.is_panel() && d.room.is_none() && !wired_through_switch(d, devices))
            .map(|d| d.id.clone())
            .collect();
        if !unassigned.is_empty() {
            warn!("{} device(s) have no room and are not wired", unassigned.len());
        }

        let uncontrolled_lights = devices.uncontrolled_lights();
        for light in &uncontrolled_lights {
            warn!("Light {} is not controlled by any switch and is not wired", light);
        }

        Ok(Self {
            rooms,
            panel: panel.id.clone(),
            home_runs,
            unassigned,
            uncontrolled_lights,
        })
    }

    /// Total number of requests including home runs
    pub fn request_count(&self) -> usize {
        self.rooms.iter().map(|r| r.requests.len()).sum::<usize>() + self.home_runs.len()
    }

    pub fn room(&self, label: &str) -> Option<&RoomCircuit> {
        self.rooms.iter().find(|r| r.room == label)
    }
}

fn single_panel(devices: &DeviceSet) -> Result<&Device, TopologyError> {
    let panels: Vec<&Device> = devices.of_kind(DeviceKind::ElectricalPanel).collect();
    match panels.as_slice() {
        [] => Err(TopologyError::NoPanel),
        [panel] => Ok(*panel),
        many => Err(TopologyError::MultiplePanels { count: many.len() }),
    }
}

fn wired_through_switch(device: &Device, devices: &DeviceSet) -> bool {
    device.kind == DeviceKind::Light
        && devices
            .controller_of(&device.id)
            .and_then(|switch| devices.get(switch))
            .is_some_and(|switch| switch.room.is_some())
}

fn room_circuit(
    label: &str,
    members: &[&Device],
    devices: &DeviceSet,
) -> Result<RoomCircuit, TopologyError> {
    let junction = members
        .iter()
        .find(|d| d.kind == DeviceKind::JunctionBox)
        .map(|d| d.id.clone())
        .ok_or_else(|| TopologyError::MissingJunctionBox {
            room: label.to_string(),
        })?;

    let mut requests = Vec::new();
    for device in members {
        match device.kind {
            DeviceKind::Switch => {
                for light in device.controls() {
                    if devices.get(light).is_none() {
                        return Err(TopologyError::UnknownDevice {
                            id: light.to_string(),
                        });
                    }
                    requests.push(PathRequest::new(light, &device.id));
                }
                requests.push(PathRequest::new(&device.id, &junction));
            }
            // lights are reached through their switch
            DeviceKind::Light | DeviceKind::JunctionBox | DeviceKind::ElectricalPanel => {}
            DeviceKind::Outlet => requests.push(PathRequest::new(&device.id, &junction)),
        }
    }

    Ok(RoomCircuit {
        room: label.to_string(),
        junction,
        requests,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wireplan_core::Point2;
    use wireplan_settings::DeviceDefaults;

    fn place(set: &mut DeviceSet, kind: DeviceKind, x: f64, room: Option<&str>) -> DeviceId {
        let id = set.add(kind, Point2::new(x, 0.0), &DeviceDefaults::default());
        if let Some(room) = room {
            set.set_room(&id, room).unwrap();
        }
        id
    }

    #[test]
    fn test_switch_with_two_lights() {
        let mut set = DeviceSet::new();
        let switch = place(&mut set, DeviceKind::Switch, 0.0, Some("Den"));
        let l1 = place(&mut set, DeviceKind::Light, 10.0, Some("Den"));
        let l2 = place(&mut set, DeviceKind::Light, 20.0, Some("Den"));
        let jb = place(&mut set, DeviceKind::JunctionBox, 30.0, Some("Den"));
        let panel = place(&mut set, DeviceKind::ElectricalPanel, 40.0, None);
        set.link_control(&switch, &l1).unwrap();
        set.link_control(&switch, &l2).unwrap();

        let topology = CircuitTopology::synthesize(&set).unwrap();
        let den = topology.room("Den").unwrap();
        assert_eq!(
            den.requests,
            vec![
                PathRequest::new(&l1, &switch),
                PathRequest::new(&l2, &switch),
                PathRequest::new(&switch, &jb),
            ]
        );
        assert_eq!(topology.home_runs, vec![PathRequest::new(&jb, &panel)]);
        assert_eq!(topology.request_count(), 4);
        assert!(topology.uncontrolled_lights.is_empty());
    }

    #[test]
    fn test_no_panel_is_fatal() {
        let mut set = DeviceSet::new();
        place(&mut set, DeviceKind::Outlet, 0.0, Some("Den"));
        place(&mut set, DeviceKind::JunctionBox, 10.0, Some("Den"));
        assert_eq!(CircuitTopology::synthesize(&set), Err(TopologyError::NoPanel));
    }

    #[test]
    fn test_multiple_panels_rejected() {
        let mut set = DeviceSet::new();
        place(&mut set, DeviceKind::ElectricalPanel, 0.0, None);
        place(&mut set, DeviceKind::ElectricalPanel, 10.0, None);
        assert_eq!(
            CircuitTopology::synthesize(&set),
            Err(TopologyError::MultiplePanels { count: 2 })
        );
    }

    #[test]
    fn test_room_without_junction_box_is_fatal() {
        let mut set = DeviceSet::new();
        place(&mut set, DeviceKind::Outlet, 0.0, Some("Bath"));
        place(&mut set, DeviceKind::ElectricalPanel, 10.0, None);
        assert_eq!(
            CircuitTopology::synthesize(&set),
            Err(TopologyError::MissingJunctionBox {
                room: "Bath".to_string()
            })
        );
    }

    #[test]
    fn test_first_junction_box_is_selected_and_all_get_home_runs() {
        let mut set = DeviceSet::new();
        let outlet = place(&mut set, DeviceKind::Outlet, 0.0, Some("Den"));
        let jb1 = place(&mut set, DeviceKind::JunctionBox, 10.0, Some("Den"));
        let jb2 = place(&mut set, DeviceKind::JunctionBox, 20.0, Some("Den"));
        place(&mut set, DeviceKind::ElectricalPanel, 30.0, None);

        let topology = CircuitTopology::synthesize(&set).unwrap();
        let den = topology.room("Den").unwrap();
        assert_eq!(den.junction, jb1);
        assert_eq!(den.requests, vec![PathRequest::new(&outlet, &jb1)]);
        let starts: Vec<&DeviceId> = topology.home_runs.iter().map(|r| &r.start).collect();
        assert_eq!(starts, vec![&jb1, &jb2]);
    }

    #[test]
    fn test_roomless_and_uncontrolled_are_reported() {
        let mut set = DeviceSet::new();
        place(&mut set, DeviceKind::JunctionBox, 0.0, Some("Den"));
        let stray = place(&mut set, DeviceKind::Outlet, 5.0, None);
        let lonely = place(&mut set, DeviceKind::Light, 7.0, Some("Den"));
        place(&mut set, DeviceKind::ElectricalPanel, 10.0, None);

        let topology = CircuitTopology::synthesize(&set).unwrap();
        assert_eq!(topology.unassigned, vec![stray]);
        assert_eq!(topology.uncontrolled_lights, vec![lonely]);
        assert!(topology.room("Den").unwrap().requests.is_empty());
    }

    #[test]
    fn test_roomless_light_on_roomed_switch_is_wired() {
        let mut set = DeviceSet::new();
        let switch = place(&mut set, DeviceKind::Switch, 0.0, Some("Den"));
        let light = place(&mut set, DeviceKind::Light, 5.0, None);
        place(&mut set, DeviceKind::JunctionBox, 10.0, Some("Den"));
        place(&mut set, DeviceKind::ElectricalPanel, 20.0, None);
        set.link_control(&switch, &light).unwrap();

        let hall_switch = place(&mut set, DeviceKind::Switch, 30.0, None);
        let hall_light = place(&mut set, DeviceKind::Light, 35.0, None);
        set.link_control(&hall_switch, &hall_light).unwrap();

        let topology = CircuitTopology::synthesize(&set).unwrap();
        let den = topology.room("Den").unwrap();
        assert!(den.requests.contains(&PathRequest::new(&light, &switch)));
        assert_eq!(topology.unassigned, vec![hall_switch, hall_light]);
    }

    #[test]
    fn test_circuit_key_order_and_display() {
        assert!(CircuitKey::Room("Zed".into()) < CircuitKey::PanelConnections);
        assert_eq!(CircuitKey::PanelConnections.to_string(), "panel_connections");
        assert_eq!(CircuitKey::Room("Den".into()).room(), Some("Den"));
    }
}
