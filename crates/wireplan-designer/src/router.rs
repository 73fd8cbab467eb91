//! Shortest-path routing over the lattice.
//!
//! Edges only join axis neighbours, so the hop count of a path is its
//! rectilinear length in lattice steps. Paths are found with A* using the
//! index-space Manhattan distance as heuristic, which is exact on a full grid
//! and keeps tie-breaking deterministic for a given lattice.

use petgraph::algo::astar;
use wireplan_core::{GridPoint, RoutingError};

use crate::lattice::Lattice;

/// Routes wires between lattice nodes
#[derive(Debug, Clone, Copy)]
pub struct Router<'a> {
    lattice: &'a Lattice,
}

impl<'a> Router<'a> {
    pub fn new(lattice: &'a Lattice) -> Self {
        Self { lattice }
    }

    /// Shortest path from `from` to `to`, both endpoints included
    pub fn route(&self, from: GridPoint, to: GridPoint) -> Result<Vec<GridPoint>, RoutingError> {
        let start = self.index_of(from)?;
        let goal = self.index_of(to)?;
        let (gi, gj) = self.lattice.indices_of(goal);

        let graph = self.lattice.graph();
        let (_, nodes) = astar(
            graph,
            start,
            |n| n == goal,
            |_| 1u32,
            |n| {
                let (i, j) = self.lattice.indices_of(n);
                (i.abs_diff(gi) + j.abs_diff(gj)) as u32
            },
        )
        .ok_or(RoutingError::NoPath {
            from_x: from.x,
            from_y: from.y,
            to_x: to.x,
            to_y: to.y,
        })?;

        Ok(nodes.into_iter().map(|n| graph[n].point).collect())
    }

    fn index_of(&self, point: GridPoint) -> Result<petgraph::graph::NodeIndex, RoutingError> {
        self.lattice
            .node_index(point)
            .ok_or(RoutingError::NodeNotInLattice {
                x: point.x,
                y: point.y,
            })
    }
}
