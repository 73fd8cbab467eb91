//! # Routing Lattice
//!
//! Builds the Hanan grid over the clustered device coordinates: every
//! combination of a snapped x value and a snapped y value becomes a node, and
//! nodes are connected to their row and column neighbours only. Wires are
//! routed over this graph, so any pair of devices has a rectilinear path.
//!
//! The lattice is rebuilt wholesale from the current device set; it is never
//! patched in place.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;
use wireplan_core::{GridPoint, Point2};

use crate::cluster::AxisMap;
use crate::device::DeviceSet;

/// A lattice node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatticeNode {
    pub point: GridPoint,
    /// A device snapped onto this node
    pub is_dot: bool,
}

/// Immutable routing lattice snapshot
#[derive(Debug, Clone)]
pub struct Lattice {
    graph: UnGraph<LatticeNode, ()>,
    xs: Vec<i64>,
    ys: Vec<i64>,
}

/// Serializable lattice view for renderers
#[derive(Debug, Clone, Serialize)]
pub struct LatticeView {
    pub x_coords: Vec<i64>,
    pub y_coords: Vec<i64>,
    pub nodes: Vec<LatticeNode>,
    pub edges: Vec<(GridPoint, GridPoint)>,
    pub dots: Vec<GridPoint>,
}

impl Lattice {
    /// Snap devices onto clustered axes and build the lattice over them
    ///
    /// Device coordinates are overwritten with their snapped positions.
    /// Rebuilding from already snapped devices with the same threshold
    /// reproduces the same lattice.
    ///
    /// * `grid_scale` - Multiplier applied to raw coordinates before truncation
    /// * `threshold` - Axis clustering distance
    pub fn build(devices: &mut DeviceSet, grid_scale: f64, threshold: i64) -> Self {
        let raw: Vec<GridPoint> = devices
            .iter()
            .map(|d| scaled(d.coords, grid_scale))
            .collect();

        let raw_x: Vec<i64> = raw.iter().map(|p| p.x).collect();
        let raw_y: Vec<i64> = raw.iter().map(|p| p.y).collect();
        let x_map = AxisMap::cluster(&raw_x, threshold);
        let y_map = AxisMap::cluster(&raw_y, threshold);

        let mut dots = BTreeSet::new();
        for (device, r) in devices.iter_mut().zip(&raw) {
            // every raw value was fed to the clusterer, so both lookups hit
            let snapped = GridPoint::new(
                x_map.snap(r.x).unwrap_or(r.x),
                y_map.snap(r.y).unwrap_or(r.y),
            );
            device.coords = Point2::from(snapped);
            dots.insert(snapped);
        }

        let lattice = Self::from_axes(x_map.snapped_values(), y_map.snapped_values(), &dots);
        debug!(
            "Built {}x{} lattice ({} nodes, {} edges, {} dots) from {} devices",
            lattice.xs.len(),
            lattice.ys.len(),
            lattice.node_count(),
            lattice.edge_count(),
            dots.len(),
            devices.len()
        );
        lattice
    }

    /// Build the complete lattice over sorted, distinct axis values
    pub fn from_axes(xs: Vec<i64>, ys: Vec<i64>, dots: &BTreeSet<GridPoint>) -> Self {
        let (nx, ny) = (xs.len(), ys.len());
        let mut graph = UnGraph::with_capacity(nx * ny, 2 * nx * ny);

        // node index = i * ny + j
        for &x in &xs {
            for &y in &ys {
                let point = GridPoint::new(x, y);
                graph.add_node(LatticeNode {
                    point,
                    is_dot: dots.contains(&point),
                });
            }
        }

        for i in 0..nx {
            for j in 0..ny {
                let here = NodeIndex::new(i * ny + j);
                if i + 1 < nx {
                    graph.add_edge(here, NodeIndex::new((i + 1) * ny + j), ());
                }
                if j + 1 < ny {
                    graph.add_edge(here, NodeIndex::new(i * ny + j + 1), ());
                }
            }
        }

        Self { graph, xs, ys }
    }

    pub fn x_coords(&self) -> &[i64] {
        &self.xs
    }

    pub fn y_coords(&self) -> &[i64] {
        &self.ys
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Column and row index of a point, if it is a lattice node
    pub fn axis_indices(&self, point: GridPoint) -> Option<(usize, usize)> {
        let i = self.xs.binary_search(&point.x).ok()?;
        let j = self.ys.binary_search(&point.y).ok()?;
        Some((i, j))
    }

    pub(crate) fn node_index(&self, point: GridPoint) -> Option<NodeIndex> {
        self.axis_indices(point)
            .map(|(i, j)| NodeIndex::new(i * self.ys.len() + j))
    }

    pub(crate) fn indices_of(&self, index: NodeIndex) -> (usize, usize) {
        let ny = self.ys.len().max(1);
        (index.index() / ny, index.index() % ny)
    }

    pub(crate) fn graph(&self) -> &UnGraph<LatticeNode, ()> {
        &self.graph
    }

    pub fn contains(&self, point: GridPoint) -> bool {
        self.axis_indices(point).is_some()
    }

    pub fn node(&self, point: GridPoint) -> Option<LatticeNode> {
        self.node_index(point).map(|idx| self.graph[idx])
    }

    pub fn is_dot(&self, point: GridPoint) -> bool {
        self.node(point).is_some_and(|n| n.is_dot)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &LatticeNode> {
        self.graph.node_weights()
    }

    /// Nodes that coincide with a device
    pub fn dots(&self) -> impl Iterator<Item = GridPoint> + '_ {
        self.nodes().filter(|n| n.is_dot).map(|n| n.point)
    }

    pub fn edges(&self) -> Vec<(GridPoint, GridPoint)> {
        self.graph
            .edge_references()
            .map(|e| (self.graph[e.source()].point, self.graph[e.target()].point))
            .collect()
    }

    /// Node closest to a picked point (minimum squared distance)
    pub fn nearest_node(&self, pick: Point2) -> Option<GridPoint> {
        self.nodes()
            .map(|n| n.point)
            .min_by(|a, b| a.squared_distance_to(&pick).total_cmp(&b.squared_distance_to(&pick)))
    }

    pub fn view(&self) -> LatticeView {
        LatticeView {
            x_coords: self.xs.clone(),
            y_coords: self.ys.clone(),
            nodes: self.nodes().copied().collect(),
            edges: self.edges(),
            dots: self.dots().collect(),
        }
    }
}

fn scaled(p: Point2, factor: f64) -> GridPoint {
    Point2::new(p.x * factor, p.y * factor).truncate()
}
