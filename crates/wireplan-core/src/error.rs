//! Error handling for Wireplan
//!
//! Provides error types for every stage of the wiring pipeline:
//! - Topology errors (fatal configuration problems in the device set)
//! - Routing errors (per-wire path failures, non-fatal to a run)
//! - Edit errors (rejected user edits at the edit boundary)
//! - Room errors (rejected room polygons)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Topology error type
///
/// Configuration problems that make circuit synthesis impossible. These abort
/// synthesis; a partial network is never produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TopologyError {
    /// No electrical panel in the device set
    #[error("No electrical panel found; home-run wiring needs exactly one panel")]
    NoPanel,

    /// More than one electrical panel in the device set
    #[error("Found {count} electrical panels; only a single panel is supported")]
    MultiplePanels {
        /// Number of panels found.
        count: usize,
    },

    /// A room has devices but no junction box
    #[error("Room '{room}' has no junction box")]
    MissingJunctionBox {
        /// The room label.
        room: String,
    },

    /// A device does not sit on a lattice node
    #[error("Device {device} at ({x}, {y}) is not on a lattice node")]
    OffLattice {
        /// The device id.
        device: String,
        /// The device x coordinate.
        x: f64,
        /// The device y coordinate.
        y: f64,
    },

    /// A referenced device does not exist
    #[error("Unknown device: {id}")]
    UnknownDevice {
        /// The missing device id.
        id: String,
    },
}

/// Routing error type
///
/// Reported per wire. The wire is skipped and the run continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// No path between the two lattice nodes
    #[error("No path between ({from_x}, {from_y}) and ({to_x}, {to_y})")]
    NoPath {
        /// Start node x.
        from_x: i64,
        /// Start node y.
        from_y: i64,
        /// End node x.
        to_x: i64,
        /// End node y.
        to_y: i64,
    },

    /// Endpoint is not a node of the lattice
    #[error("Node ({x}, {y}) is not part of the lattice")]
    NodeNotInLattice {
        /// Node x.
        x: i64,
        /// Node y.
        y: i64,
    },
}

/// Edit error type
///
/// Rejected edits leave the prior valid value in place.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// A numeric field received text that is not a finite number
    #[error("Invalid value for {field}: '{value}'")]
    InvalidNumber {
        /// The field being edited.
        field: String,
        /// The rejected input.
        value: String,
    },

    /// The device id is not in the set
    #[error("Unknown device: {id}")]
    UnknownDevice {
        /// The missing device id.
        id: String,
    },

    /// A control link was requested on a device of the wrong kind
    #[error("Device {id} is a {actual}, expected a {expected}")]
    WrongKind {
        /// The device id.
        id: String,
        /// The kind the operation needs.
        expected: String,
        /// The kind the device has.
        actual: String,
    },

    /// The light is already controlled by another switch
    #[error("Light {light} is already controlled by switch {switch}")]
    AlreadyControlled {
        /// The light id.
        light: String,
        /// The switch that already controls it.
        switch: String,
    },

    /// Another device already uses this id
    #[error("Duplicate device id: {id}")]
    DuplicateId {
        /// The repeated id.
        id: String,
    },
}

/// Room polygon error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// Polygon has fewer than three vertices
    #[error("Room polygon needs at least 3 vertices, got {count}")]
    TooFewVertices {
        /// Number of vertices supplied.
        count: usize,
    },

    /// Room label is blank
    #[error("Room label must not be empty")]
    EmptyLabel,
}

/// Main error type for Wireplan
///
/// A unified error type that can represent any error from the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Topology error
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// Routing error
    #[error(transparent)]
    Routing(#[from] RoutingError),

    /// Edit error
    #[error(transparent)]
    Edit(#[from] EditError),

    /// Room error
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a fatal configuration error
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Error::Topology(_))
    }

    /// Check if this is a routing error
    pub fn is_routing_error(&self) -> bool {
        matches!(self, Error::Routing(_))
    }

    /// Check if this is an edit error
    pub fn is_edit_error(&self) -> bool {
        matches!(self, Error::Edit(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
