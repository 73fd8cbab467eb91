//! Plan file persistence.
//!
//! A plan is stored as JSON: the real-world scale plus one record per
//! device. Switch records carry the ids of the lights they control; links are
//! restored in a second pass once every device exists.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};
use wireplan_core::{DeviceKind, Point2, Scale};

use crate::device::{Device, DeviceId, DeviceSet};

/// Stored device record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub id: DeviceId,
    #[serde(rename = "type")]
    pub kind: DeviceKind,
    pub coords: [f64; 2],
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_number")]
    pub amperage: Option<f64>,
    #[serde(deserialize_with = "de_lenient_height")]
    pub height: f64,
    #[serde(default)]
    pub controls: Vec<DeviceId>,
}

/// Room outline drawn by picking points; each pick snaps to a lattice node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomOutline {
    pub label: String,
    pub points: Vec<[f64; 2]>,
}

impl RoomOutline {
    pub fn new(label: impl Into<String>, points: &[(f64, f64)]) -> Self {
        Self {
            label: label.into(),
            points: points.iter().map(|&(x, y)| [x, y]).collect(),
        }
    }

    pub fn picks(&self) -> Vec<Point2> {
        self.points.iter().map(|p| Point2::new(p[0], p[1])).collect()
    }
}

/// Complete plan file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanFile {
    #[serde(default)]
    pub scale: Option<Scale>,
    pub symbols: Vec<SymbolRecord>,
    /// Outlines still to be applied on the next run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rooms: Vec<RoomOutline>,
}

impl PlanFile {
    /// Snapshot a device set
    pub fn from_devices(devices: &DeviceSet, scale: Option<Scale>) -> Self {
        let symbols = devices
            .iter()
            .map(|d| SymbolRecord {
                id: d.id.clone(),
                kind: d.kind,
                coords: [d.coords.x, d.coords.y],
                room: d.room.clone(),
                amperage: d.amperage,
                height: d.height,
                controls: if d.kind == DeviceKind::Switch {
                    d.controls().to_vec()
                } else {
                    Vec::new()
                },
            })
            .collect();
        Self {
            scale,
            symbols,
            rooms: Vec::new(),
        }
    }

    /// Rebuild the device set, re-linking switch controls after all devices load
    pub fn into_devices(self) -> DeviceSet {
        let mut devices = DeviceSet::new();
        let mut links = Vec::new();

        for record in self.symbols {
            let kind = record.kind;
            let mut device = Device::new(
                record.id.clone(),
                kind,
                Point2::new(record.coords[0], record.coords[1]),
                record.amperage,
                record.height,
            );
            // panels never belong to a room
            device.room = record
                .room
                .filter(|r| !r.trim().is_empty() && kind != DeviceKind::ElectricalPanel);

            if let Err(e) = devices.insert(device) {
                warn!("Skipping {} {}: {}", kind, record.id, e);
                continue;
            }
            if !record.controls.is_empty() {
                if kind == DeviceKind::Switch {
                    links.push((record.id, record.controls));
                } else {
                    warn!("Ignoring controls on non-switch {} {}", kind, record.id);
                }
            }
        }

        for (switch, lights) in links {
            devices.restore_controls(&switch, lights);
        }
        debug!("Loaded {} device(s) from plan", devices.len());
        devices
    }

    /// Save plan to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize plan")?;
        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write plan file {}", path.as_ref().display()))?;
        Ok(())
    }

    /// Load plan from file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read plan file {}", path.as_ref().display()))?;
        let plan: PlanFile = serde_json::from_str(&content).context("Failed to parse plan file")?;
        Ok(plan)
    }
}

/// Numbers may have been stored as text by older editors
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
}

impl LenientNumber {
    fn value<E: serde::de::Error>(self) -> Result<Option<f64>, E> {
        match self {
            Self::Number(n) => Ok(Some(n)),
            Self::Text(s) if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("none") => {
                Ok(None)
            }
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| E::custom(format!("invalid number: {s}"))),
        }
    }
}

fn de_lenient_number<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    match Option::<LenientNumber>::deserialize(deserializer)? {
        Some(n) => n.value(),
        None => Ok(None),
    }
}

fn de_lenient_height<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    LenientNumber::deserialize(deserializer)?
        .value()?
        .ok_or_else(|| serde::de::Error::custom("height is required"))
}
