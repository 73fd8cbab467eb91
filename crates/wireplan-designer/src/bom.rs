//! # Bill of Materials
//!
//! Prices a [`WiringNetwork`]: wire length per gauge, junction boxes, one
//! breaker per wired room, and the panel tier. Wires that need manual sizing
//! are listed without a price and raised as warnings; they never count as a
//! zero-cost line.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};
use wireplan_core::{format_length, DeviceKind, Gauge};
use wireplan_settings::PriceTable;

use crate::device::{DeviceId, DeviceSet};
use crate::network::WiringNetwork;

/// Material line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BomRow {
    /// 1 for wire lines, 0 for hardware
    pub level: u8,
    pub item: String,
    /// Length for wire, count for hardware
    pub quantity: f64,
    pub unit_price: Option<f64>,
    pub extended_price: Option<f64>,
}

impl BomRow {
    fn priced(level: u8, item: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        Self {
            level,
            item: item.into(),
            quantity,
            unit_price: Some(unit_price),
            extended_price: Some(quantity * unit_price),
        }
    }
}

/// A wire that could not be sized automatically
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BomWarning {
    pub circuit: String,
    pub wire: String,
    pub device: DeviceId,
    pub amperage: f64,
    pub length: f64,
}

/// Priced material list
#[derive(Debug, Clone, Serialize)]
pub struct BillOfMaterials {
    pub rows: Vec<BomRow>,
    pub total: f64,
    pub warnings: Vec<BomWarning>,
    pub generated_at: DateTime<Utc>,
}

impl BillOfMaterials {
    pub fn row(&self, item: &str) -> Option<&BomRow> {
        self.rows.iter().find(|r| r.item == item)
    }

    /// Whether any wire still needs an engineer's sizing
    pub fn needs_review(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Wire length summed per gauge, in gauge order
pub fn gauge_totals(network: &WiringNetwork) -> BTreeMap<Gauge, f64> {
    let mut totals = BTreeMap::new();
    for (_, wire) in network.all_wires() {
        *totals.entry(wire.gauge()).or_insert(0.0) += wire.length();
    }
    totals
}

/// Prices networks against a price table
#[derive(Debug, Clone, Copy)]
pub struct CostEngine<'a> {
    prices: &'a PriceTable,
}

impl<'a> CostEngine<'a> {
    pub fn new(prices: &'a PriceTable) -> Self {
        Self { prices }
    }

    pub fn price(&self, network: &WiringNetwork, devices: &DeviceSet) -> BillOfMaterials {
        let mut rows = Vec::new();

        for (gauge, length) in gauge_totals(network) {
            match self.prices.wire_price(gauge) {
                Some(unit) => rows.push(BomRow::priced(1, gauge.to_string(), length, unit)),
                None => rows.push(BomRow {
                    level: 1,
                    item: gauge.to_string(),
                    quantity: length,
                    unit_price: None,
                    extended_price: None,
                }),
            }
        }

        let junction_boxes = devices.of_kind(DeviceKind::JunctionBox).count();
        rows.push(BomRow::priced(
            0,
            "Junction Box",
            junction_boxes as f64,
            self.prices.junction_box,
        ));
        rows.push(BomRow::priced(
            0,
            "Breaker",
            network.breaker_count() as f64,
            self.prices.breaker,
        ));

        let panel = network.panel();
        rows.push(BomRow::priced(
            0,
            format!("Electrical Panel ({})", panel.tier),
            1.0,
            panel.tier.price(self.prices),
        ));

        let warnings: Vec<BomWarning> = network
            .gauge_warnings()
            .into_iter()
            .map(|(circuit, wire)| {
                warn!(
                    "Wire {} in '{}' carries {:.1} A over {}; consult an engineer",
                    wire.id(),
                    circuit,
                    wire.amperage(),
                    format_length(wire.length())
                );
                BomWarning {
                    circuit: circuit.to_string(),
                    wire: wire.id().to_string(),
                    device: wire.start().clone(),
                    amperage: wire.amperage(),
                    length: wire.length(),
                }
            })
            .collect();

        let total = rows.iter().filter_map(|r| r.extended_price).sum();
        info!(
            "Bill of materials: {} row(s), total ${:.2}, {} warning(s)",
            rows.len(),
            total,
            warnings.len()
        );

        BillOfMaterials {
            rows,
            total,
            warnings,
            generated_at: Utc::now(),
        }
    }
}
