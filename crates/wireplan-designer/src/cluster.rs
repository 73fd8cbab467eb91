//! # Axis Clustering
//!
//! Merges near-duplicate coordinates along a single axis so devices that were
//! annotated slightly off a shared row or column end up on the same lattice
//! line.
//!
//! Clusters grow by chained distance: a value joins the current cluster when
//! it is closer than the threshold to the last value accepted into that
//! cluster. Each cluster collapses to the floored integer mean of its members.
//! The two axes are clustered independently.

use std::collections::BTreeMap;

/// Group sorted distinct values into chained-distance clusters
///
/// * `values` - Raw axis values; duplicates and order are irrelevant
/// * `threshold` - Absolute distance; neighbours closer than this merge
pub fn cluster_axis(values: &[i64], threshold: i64) -> Vec<Vec<i64>> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let threshold = i128::from(threshold);
    let mut clusters: Vec<Vec<i64>> = Vec::new();
    for v in sorted {
        match clusters.last_mut() {
            Some(current) if current.last().is_some_and(|&last| gap(last, v) < threshold) => {
                current.push(v)
            }
            _ => clusters.push(vec![v]),
        }
    }
    clusters
}

// widened so extreme axis values cannot overflow
fn gap(lower: i64, upper: i64) -> i128 {
    i128::from(upper) - i128::from(lower)
}

/// Floored integer mean, computed without overflow
pub(crate) fn floor_mean(values: &[i64]) -> i64 {
    let sum: i128 = values.iter().copied().map(i128::from).sum();
    let mean = sum.div_euclid(values.len().max(1) as i128);
    // the mean of i64 values always fits back into i64
    i64::try_from(mean).unwrap_or(if mean < 0 { i64::MIN } else { i64::MAX })
}

/// Snap mapping for one axis: raw value to canonical cluster value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisMap {
    map: BTreeMap<i64, i64>,
}

impl AxisMap {
    /// Build the mapping from clusters; every member maps to the cluster mean
    pub fn from_clusters(clusters: &[Vec<i64>]) -> Self {
        let mut map = BTreeMap::new();
        for cluster in clusters.iter().filter(|c| !c.is_empty()) {
            let canonical = floor_mean(cluster);
            for &v in cluster {
                map.insert(v, canonical);
            }
        }
        Self { map }
    }

    /// Cluster `values` and build the mapping in one step
    pub fn cluster(values: &[i64], threshold: i64) -> Self {
        Self::from_clusters(&cluster_axis(values, threshold))
    }

    /// Canonical value for a raw value seen during clustering
    pub fn snap(&self, raw: i64) -> Option<i64> {
        self.map.get(&raw).copied()
    }

    /// Sorted distinct canonical values
    pub fn snapped_values(&self) -> Vec<i64> {
        let mut values: Vec<i64> = self.map.values().copied().collect();
        values.sort_unstable();
        values.dedup();
        values
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.map.iter().map(|(&raw, &snapped)| (raw, snapped))
    }
}
