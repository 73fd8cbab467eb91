//! Device annotations and the device arena.
//!
//! Devices are stored in placement order inside a [`DeviceSet`]. Switches
//! refer to the lights they control by [`DeviceId`]; the set keeps those
//! references consistent across edits and deletions.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;
use wireplan_core::{DeviceKind, EditError, GridPoint, Point2};
use wireplan_settings::DeviceDefaults;

/// Largest accepted drawing coordinate magnitude
pub const MAX_COORDINATE: f64 = 1.0e9;

/// Short random identifier for a device
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh six-hex-digit id
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(hex[..6].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An annotated device on the floor plan
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    pub id: DeviceId,
    pub kind: DeviceKind,
    /// Drawing coordinates; overwritten with the lattice position by snapping
    pub coords: Point2,
    pub room: Option<String>,
    pub amperage: Option<f64>,
    /// Mount height, added to every wire that rises from this device
    pub height: f64,
    controls: Vec<DeviceId>,
}

impl Device {
    pub fn new(
        id: DeviceId,
        kind: DeviceKind,
        coords: Point2,
        amperage: Option<f64>,
        height: f64,
    ) -> Self {
        Self {
            id,
            kind,
            coords,
            room: None,
            amperage,
            height,
            controls: Vec::new(),
        }
    }

    /// Lights controlled by this device (always empty unless a switch)
    pub fn controls(&self) -> &[DeviceId] {
        &self.controls
    }

    /// Lattice node this device sits on, by integer truncation
    pub fn node(&self) -> GridPoint {
        self.coords.truncate()
    }

    /// Amperage with missing values counted as zero
    pub fn amperage_or_zero(&self) -> f64 {
        self.amperage.unwrap_or(0.0)
    }

    pub fn is_panel(&self) -> bool {
        self.kind == DeviceKind::ElectricalPanel
    }
}

/// Ordered collection of devices with switch/light bookkeeping
#[derive(Debug, Clone, Default)]
pub struct DeviceSet {
    devices: Vec<Device>,
}

impl DeviceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a new device using the configured defaults for its kind
    pub fn add(&mut self, kind: DeviceKind, coords: Point2, defaults: &DeviceDefaults) -> DeviceId {
        let default = defaults.for_kind(kind);
        let id = self.unused_id();
        debug!("Placed {} {} at ({}, {})", kind, id, coords.x, coords.y);
        self.devices.push(Device::new(
            id.clone(),
            kind,
            coords,
            default.amperage,
            default.height,
        ));
        id
    }

    /// Insert a fully built device; any control links it carries are dropped
    ///
    /// The id must be unused and the coordinates within [`MAX_COORDINATE`].
    pub fn insert(&mut self, mut device: Device) -> Result<DeviceId, EditError> {
        if self.get(&device.id).is_some() {
            return Err(EditError::DuplicateId {
                id: device.id.to_string(),
            });
        }
        check_coordinate("x", device.coords.x)?;
        check_coordinate("y", device.coords.y)?;

        device.controls.clear();
        let id = device.id.clone();
        self.devices.push(device);
        Ok(id)
    }

    fn unused_id(&self) -> DeviceId {
        loop {
            let id = DeviceId::generate();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    pub fn get(&self, id: &DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| &d.id == id)
    }

    fn get_mut(&mut self, id: &DeviceId) -> Result<&mut Device, EditError> {
        self.devices
            .iter_mut()
            .find(|d| &d.id == id)
            .ok_or_else(|| unknown(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Device> {
        self.devices.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Devices of a given kind, in placement order
    pub fn of_kind(&self, kind: DeviceKind) -> impl Iterator<Item = &Device> {
        self.devices.iter().filter(move |d| d.kind == kind)
    }

    /// Record that `switch` controls `light`
    pub fn link_control(&mut self, switch: &DeviceId, light: &DeviceId) -> Result<(), EditError> {
        expect_kind(self.get(switch), switch, DeviceKind::Switch)?;
        expect_kind(self.get(light), light, DeviceKind::Light)?;

        if let Some(owner) = self.controller_of(light) {
            if owner == switch {
                return Ok(());
            }
            return Err(EditError::AlreadyControlled {
                light: light.to_string(),
                switch: owner.to_string(),
            });
        }

        self.get_mut(switch)?.controls.push(light.clone());
        debug!("Linked switch {} -> light {}", switch, light);
        Ok(())
    }

    /// The switch controlling `light`, if any
    pub fn controller_of(&self, light: &DeviceId) -> Option<&DeviceId> {
        self.devices
            .iter()
            .find(|d| d.controls.contains(light))
            .map(|d| &d.id)
    }

    /// Lights that no switch controls; these never receive a wire
    pub fn uncontrolled_lights(&self) -> Vec<DeviceId> {
        self.of_kind(DeviceKind::Light)
            .filter(|light| self.controller_of(&light.id).is_none())
            .map(|light| light.id.clone())
            .collect()
    }

    /// Remove a device with cascading cleanup
    ///
    /// Removing a switch also removes the lights it controls. Removing a light
    /// unlinks it from its switch. Returns every removed device.
    pub fn remove(&mut self, id: &DeviceId) -> Result<Vec<Device>, EditError> {
        let device = self.get(id).ok_or_else(|| unknown(id))?;

        let mut doomed = vec![id.clone()];
        if device.kind == DeviceKind::Switch {
            doomed.extend(device.controls.iter().cloned());
        }

        for d in self.devices.iter_mut() {
            d.controls.retain(|c| !doomed.contains(c));
        }

        let (removed, kept): (Vec<Device>, Vec<Device>) = std::mem::take(&mut self.devices)
            .into_iter()
            .partition(|d| doomed.contains(&d.id));
        self.devices = kept;

        debug!("Removed {} device(s) starting at {}", removed.len(), id);
        Ok(removed)
    }

    /// Move a device; both coordinates must parse
    pub fn set_coords(&mut self, id: &DeviceId, x: &str, y: &str) -> Result<(), EditError> {
        let x = check_coordinate("x", parse_number("x", x)?)?;
        let y = check_coordinate("y", parse_number("y", y)?)?;
        self.get_mut(id)?.coords = Point2::new(x, y);
        Ok(())
    }

    /// Set amperage from text; blank clears it
    pub fn set_amperage(&mut self, id: &DeviceId, value: &str) -> Result<(), EditError> {
        let amperage = if value.trim().is_empty() {
            None
        } else {
            Some(parse_non_negative("amperage", value)?)
        };
        self.get_mut(id)?.amperage = amperage;
        Ok(())
    }

    /// Set mount height from text
    pub fn set_height(&mut self, id: &DeviceId, value: &str) -> Result<(), EditError> {
        let height = parse_non_negative("height", value)?;
        self.get_mut(id)?.height = height;
        Ok(())
    }

    /// Set or clear (blank) the room label directly
    pub fn set_room(&mut self, id: &DeviceId, value: &str) -> Result<(), EditError> {
        let label = value.trim();
        let device = self.get_mut(id)?;
        if device.is_panel() && !label.is_empty() {
            warn!("Ignoring room '{}' for electrical panel {}", label, id);
            return Ok(());
        }
        device.room = (!label.is_empty()).then(|| label.to_string());
        Ok(())
    }

    /// Number of devices still waiting for a room (panels never get one)
    pub fn roomless_count(&self) -> usize {
        self.devices
            .iter()
            .filter(|d| d.room.is_none() && !d.is_panel())
            .count()
    }

    /// Re-establish control links after a bulk load
    pub(crate) fn restore_controls(&mut self, switch: &DeviceId, lights: Vec<DeviceId>) {
        for light in lights {
            if let Err(e) = self.link_control(switch, &light) {
                warn!("Dropping control link {} -> {}: {}", switch, light, e);
            }
        }
    }
}

fn unknown(id: &DeviceId) -> EditError {
    EditError::UnknownDevice { id: id.to_string() }
}

fn expect_kind(
    device: Option<&Device>,
    id: &DeviceId,
    expected: DeviceKind,
) -> Result<(), EditError> {
    let device = device.ok_or_else(|| unknown(id))?;
    if device.kind != expected {
        return Err(EditError::WrongKind {
            id: id.to_string(),
            expected: expected.to_string(),
            actual: device.kind.to_string(),
        });
    }
    Ok(())
}

fn parse_number(field: &str, value: &str) -> Result<f64, EditError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| EditError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        })
}

fn check_coordinate(field: &str, value: f64) -> Result<f64, EditError> {
    if value.is_finite() && value.abs() <= MAX_COORDINATE {
        Ok(value)
    } else {
        Err(EditError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        })
    }
}

fn parse_non_negative(field: &str, value: &str) -> Result<f64, EditError> {
    let v = parse_number(field, value)?;
    if v < 0.0 {
        return Err(EditError::InvalidNumber {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(v)
}
