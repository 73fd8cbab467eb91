//! # Room Assignment
//!
//! A room is drawn as a closed polygon whose vertices are lattice nodes. Every
//! device node inside the polygon (boundary included, within a small
//! tolerance) is recorded under the room label, and every device sitting on
//! such a node takes the label unless it already has one or is the panel.

use geo::{Coord, EuclideanDistance, Intersects, LineString, Point, Polygon};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};
use wireplan_core::{GridPoint, Point2, RoomError};

use crate::cluster::floor_mean;
use crate::device::{DeviceId, DeviceSet};
use crate::lattice::Lattice;

/// A closed room outline over lattice nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomPolygon {
    label: String,
    vertices: Vec<GridPoint>,
}

impl RoomPolygon {
    /// Validate and build a polygon; needs a label and at least 3 vertices
    pub fn new(label: impl Into<String>, vertices: Vec<GridPoint>) -> Result<Self, RoomError> {
        let label = label.into().trim().to_string();
        if label.is_empty() {
            return Err(RoomError::EmptyLabel);
        }
        if vertices.len() < 3 {
            return Err(RoomError::TooFewVertices {
                count: vertices.len(),
            });
        }
        Ok(Self { label, vertices })
    }

    /// Build a polygon from picked points, snapping each to its nearest node
    pub fn from_picks(
        label: impl Into<String>,
        picks: &[Point2],
        lattice: &Lattice,
    ) -> Result<Self, RoomError> {
        let vertices = picks
            .iter()
            .filter_map(|&p| lattice.nearest_node(p))
            .collect();
        Self::new(label, vertices)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn vertices(&self) -> &[GridPoint] {
        &self.vertices
    }

    /// Integer centroid of the vertices, where the label is drawn
    pub fn label_anchor(&self) -> GridPoint {
        let xs: Vec<i64> = self.vertices.iter().map(|p| p.x).collect();
        let ys: Vec<i64> = self.vertices.iter().map(|p| p.y).collect();
        GridPoint::new(floor_mean(&xs), floor_mean(&ys))
    }

    pub fn contains(&self, candidate: GridPoint, tolerance: f64) -> bool {
        polygon_contains(&self.vertices, candidate, tolerance)
    }
}

/// Point-in-polygon test that admits points within `tolerance` of the boundary
pub fn polygon_contains(vertices: &[GridPoint], candidate: GridPoint, tolerance: f64) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let ring: Vec<Coord<f64>> = vertices
        .iter()
        .map(|v| Coord {
            x: v.x as f64,
            y: v.y as f64,
        })
        .collect();
    let polygon = Polygon::new(LineString::from(ring), vec![]);
    let point = Point::new(candidate.x as f64, candidate.y as f64);

    polygon.intersects(&point) || point.euclidean_distance(polygon.exterior()) <= tolerance
}

/// Outcome of applying one room polygon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomAssignment {
    pub label: String,
    /// Where the label is drawn
    pub anchor: GridPoint,
    /// Device nodes recorded under this room
    pub dots: Vec<GridPoint>,
    /// Devices that received the label
    pub labeled: Vec<DeviceId>,
}

/// Accumulates room polygons and the node-to-room map across a session
#[derive(Debug, Clone)]
pub struct RoomAssigner {
    tolerance: f64,
    dot_rooms: BTreeMap<GridPoint, String>,
    polygons: Vec<RoomPolygon>,
}

impl RoomAssigner {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            dot_rooms: BTreeMap::new(),
            polygons: Vec::new(),
        }
    }

    /// Apply a finished room polygon
    ///
    /// Labels are first-write-wins on devices; panels are never labeled.
    pub fn assign(
        &mut self,
        polygon: RoomPolygon,
        lattice: &Lattice,
        devices: &mut DeviceSet,
    ) -> RoomAssignment {
        let dots: Vec<GridPoint> = lattice
            .dots()
            .filter(|&node| polygon.contains(node, self.tolerance))
            .collect();
        for &node in &dots {
            self.dot_rooms.insert(node, polygon.label.clone());
        }

        let mut labeled = Vec::new();
        for device in devices.iter_mut() {
            if device.is_panel() || device.room.is_some() {
                continue;
            }
            if let Some(room) = self.dot_rooms.get(&device.node()) {
                device.room = Some(room.clone());
                labeled.push(device.id.clone());
            }
        }

        info!(
            "Room '{}': {} node(s), {} device(s) labeled, {} still roomless",
            polygon.label,
            dots.len(),
            labeled.len(),
            devices.roomless_count()
        );
        debug!("Room '{}' vertices: {:?}", polygon.label, polygon.vertices);

        let assignment = RoomAssignment {
            label: polygon.label.clone(),
            anchor: polygon.label_anchor(),
            dots,
            labeled,
        };
        self.polygons.push(polygon);
        assignment
    }

    /// Room recorded for a device node
    pub fn room_of(&self, node: GridPoint) -> Option<&str> {
        self.dot_rooms.get(&node).map(String::as_str)
    }

    pub fn polygons(&self) -> &[RoomPolygon] {
        &self.polygons
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wireplan_core::DeviceKind;
    use wireplan_settings::DeviceDefaults;

    fn square(label: &str, min: i64, max: i64) -> RoomPolygon {
        RoomPolygon::new(
            label,
            vec![
                GridPoint::new(min, min),
                GridPoint::new(max, min),
                GridPoint::new(max, max),
                GridPoint::new(min, max),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_polygon_needs_three_vertices_and_label() {
        let two = vec![GridPoint::new(0, 0), GridPoint::new(1, 1)];
        assert_eq!(
            RoomPolygon::new("Den", two),
            Err(RoomError::TooFewVertices { count: 2 })
        );
        let three = vec![GridPoint::new(0, 0), GridPoint::new(1, 0), GridPoint::new(0, 1)];
        assert_eq!(RoomPolygon::new("  ", three), Err(RoomError::EmptyLabel));
    }

    #[test]
    fn test_contains_interior_and_boundary() {
        let room = square("Den", 0, 10);
        assert!(room.contains(GridPoint::new(5, 5), 1e-6));
        assert!(room.contains(GridPoint::new(0, 5), 1e-6));
        assert!(room.contains(GridPoint::new(10, 10), 1e-6));
        assert!(!room.contains(GridPoint::new(11, 5), 1e-6));
    }

    #[test]
    fn test_tolerance_widens_boundary() {
        let room = square("Den", 0, 10);
        assert!(!room.contains(GridPoint::new(12, 5), 1.0));
        assert!(room.contains(GridPoint::new(12, 5), 2.0));
    }

    #[test]
    fn test_label_anchor() {
        assert_eq!(square("Den", 0, 10).label_anchor(), GridPoint::new(5, 5));
    }

    #[test]
    fn test_assign_first_write_wins_and_skips_panel() {
        let defaults = DeviceDefaults::default();
        let mut devices = DeviceSet::new();
        let outlet = devices.add(DeviceKind::Outlet, Point2::new(5.0, 5.0), &defaults);
        let panel = devices.add(DeviceKind::ElectricalPanel, Point2::new(0.0, 0.0), &defaults);
        let far = devices.add(DeviceKind::Outlet, Point2::new(50.0, 50.0), &defaults);
        let lattice = Lattice::build(&mut devices, 1.0, 1);

        let mut assigner = RoomAssigner::new(1e-6);
        let first = assigner.assign(square("Kitchen", 0, 10), &lattice, &mut devices);
        assert_eq!(first.labeled, vec![outlet.clone()]);
        assert_eq!(first.dots.len(), 2);
        assert_eq!(first.anchor, GridPoint::new(5, 5));

        let second = assigner.assign(square("Pantry", 0, 60), &lattice, &mut devices);
        assert_eq!(second.labeled, vec![far.clone()]);

        assert_eq!(devices.get(&outlet).unwrap().room.as_deref(), Some("Kitchen"));
        assert_eq!(devices.get(&far).unwrap().room.as_deref(), Some("Pantry"));
        assert_eq!(devices.get(&panel).unwrap().room, None);
        assert_eq!(devices.roomless_count(), 0);
        assert_eq!(assigner.polygons().len(), 2);
    }

    #[test]
    fn test_from_picks_snaps_to_nearest_nodes() {
        let lattice = Lattice::from_axes(vec![0, 10], vec![0, 10], &Default::default());
        let picks = [
            Point2::new(1.0, 1.0),
            Point2::new(9.0, 2.0),
            Point2::new(8.0, 9.0),
        ];
        let polygon = RoomPolygon::from_picks("Hall", &picks, &lattice).unwrap();
        assert_eq!(
            polygon.vertices(),
            &[GridPoint::new(0, 0), GridPoint::new(10, 0), GridPoint::new(10, 10)]
        );
    }
}
