//! Room demand and panel sizing.

use serde::Serialize;
use std::fmt;
use wireplan_settings::PriceTable;

/// Fraction of connected amperage assumed to draw at once
pub const DERATE_FACTOR: f64 = 0.3;
/// Ceiling on a single room's effective demand
pub const ROOM_DEMAND_CAP: f64 = 20.0;
/// Largest total demand served by the small panel tier
pub const PANEL_SMALL_TIER_MAX: f64 = 150.0;

/// Effective amperage of a room from its connected amperage
pub fn derate(connected: f64) -> f64 {
    (connected * DERATE_FACTOR).min(ROOM_DEMAND_CAP)
}

/// Demand of one room
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomLoad {
    pub room: String,
    /// Sum of amperages of every wired device in the room
    pub connected_amps: f64,
    /// Derated demand carried by the room's home run
    pub effective_amps: f64,
}

impl RoomLoad {
    pub fn new(room: impl Into<String>, connected_amps: f64) -> Self {
        Self {
            room: room.into(),
            connected_amps,
            effective_amps: derate(connected_amps),
        }
    }
}

/// Panel rating class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PanelTier {
    #[serde(rename = "100–150A")]
    Amp100To150,
    #[serde(rename = "200A")]
    Amp200,
}

impl PanelTier {
    pub fn for_demand(max_amps: f64) -> Self {
        if max_amps <= PANEL_SMALL_TIER_MAX {
            Self::Amp100To150
        } else {
            Self::Amp200
        }
    }

    pub fn price(&self, prices: &PriceTable) -> f64 {
        match self {
            Self::Amp100To150 => prices.panel_100_150a,
            Self::Amp200 => prices.panel_200a,
        }
    }
}

impl fmt::Display for PanelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amp100To150 => write!(f, "100–150A"),
            Self::Amp200 => write!(f, "200A"),
        }
    }
}

/// Panel demand summed over every room
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSizing {
    pub max_amps: f64,
    pub tier: PanelTier,
}

impl PanelSizing {
    pub fn from_loads<'a>(loads: impl IntoIterator<Item = &'a RoomLoad>) -> Self {
        let max_amps: f64 = loads.into_iter().map(|l| l.effective_amps).sum();
        Self {
            max_amps,
            tier: PanelTier::for_demand(max_amps),
        }
    }
}
