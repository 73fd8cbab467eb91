//! Wire records and conductor sizing.
//!
//! A [`Wire`] is built once from a routed path and its two endpoint devices;
//! its category, length, and gauge are derived at construction and never
//! change afterwards. Rebuild the wire when its inputs change.

use serde::Serialize;
use std::fmt;
use uuid::Uuid;
use wireplan_core::{DeviceKind, Gauge, GridPoint, Scale};

use crate::device::{Device, DeviceId};

/// Run length above which the next heavier gauge is used
pub const LONG_RUN_THRESHOLD: f64 = 50.0;

/// Kind of wire run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum WireCategory {
    /// Device to device or device to junction box inside a room
    RoomWire,
    /// Junction box to the panel
    HomeRunWire,
}

impl fmt::Display for WireCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoomWire => write!(f, "Room Wire"),
            Self::HomeRunWire => write!(f, "Home Run Wire"),
        }
    }
}

/// Pick a gauge from the governing amperage and the run length
pub fn select_gauge(amperage: f64, length: f64) -> Gauge {
    let long = length > LONG_RUN_THRESHOLD;
    if amperage <= 15.0 {
        if long { Gauge::Awg12 } else { Gauge::Awg14 }
    } else if amperage <= 20.0 {
        if long { Gauge::Awg10 } else { Gauge::Awg12 }
    } else if amperage <= 30.0 {
        if long { Gauge::Awg8 } else { Gauge::Awg10 }
    } else {
        Gauge::ConsultEngineer
    }
}

/// Sum of Euclidean segment lengths along a path, in drawing units
pub fn path_length(path: &[GridPoint]) -> f64 {
    path.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// A sized wire run between two devices
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wire {
    id: String,
    path: Vec<GridPoint>,
    start: DeviceId,
    end: DeviceId,
    start_kind: DeviceKind,
    end_kind: DeviceKind,
    scale: Scale,
    category: WireCategory,
    amperage: f64,
    length: f64,
    gauge: Gauge,
}

impl Wire {
    /// Build a wire from a routed path
    ///
    /// * `room_demand` - Derated room amperage; governs home runs only
    pub fn new(
        path: Vec<GridPoint>,
        start: &Device,
        end: &Device,
        scale: Scale,
        room_demand: f64,
    ) -> Self {
        let category = if start.kind == DeviceKind::JunctionBox {
            WireCategory::HomeRunWire
        } else {
            WireCategory::RoomWire
        };

        let (rise, amperage) = match category {
            WireCategory::RoomWire => (start.height, start.amperage_or_zero()),
            WireCategory::HomeRunWire => (end.height, room_demand),
        };
        let length = scale.apply(path_length(&path)) + rise;
        let gauge = select_gauge(amperage, length);

        let hex = Uuid::new_v4().simple().to_string();
        Self {
            id: hex[..6].to_string(),
            path,
            start: start.id.clone(),
            end: end.id.clone(),
            start_kind: start.kind,
            end_kind: end.kind,
            scale,
            category,
            amperage,
            length,
            gauge,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &[GridPoint] {
        &self.path
    }

    pub fn start(&self) -> &DeviceId {
        &self.start
    }

    pub fn end(&self) -> &DeviceId {
        &self.end
    }

    pub fn start_kind(&self) -> DeviceKind {
        self.start_kind
    }

    pub fn end_kind(&self) -> DeviceKind {
        self.end_kind
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    pub fn category(&self) -> WireCategory {
        self.category
    }

    /// Amperage the gauge was chosen against
    pub fn amperage(&self) -> f64 {
        self.amperage
    }

    /// Real-world length including the vertical rise
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn gauge(&self) -> Gauge {
        self.gauge
    }

    /// Gauge could not be chosen automatically
    pub fn needs_engineer(&self) -> bool {
        !self.gauge.is_sized()
    }
}
