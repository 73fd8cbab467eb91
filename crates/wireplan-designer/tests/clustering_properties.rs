// Property tests for axis clustering and lattice construction

use proptest::prelude::*;
use wireplan_core::{DeviceKind, Point2};
use wireplan_designer::{cluster_axis, AxisMap, DeviceSet, Lattice};
use wireplan_settings::DeviceDefaults;

fn device_set(points: &[(f64, f64)]) -> DeviceSet {
    let defaults = DeviceDefaults::default();
    let mut set = DeviceSet::new();
    for &(x, y) in points {
        set.add(DeviceKind::Outlet, Point2::new(x, y), &defaults);
    }
    set
}

proptest! {
    #[test]
    fn clusters_partition_sorted_distinct_input(
        values in prop::collection::vec(-1000i64..1000, 0..60),
        threshold in 0i64..50,
    ) {
        let clusters = cluster_axis(&values, threshold);

        let mut expected = values.clone();
        expected.sort_unstable();
        expected.dedup();
        let flattened: Vec<i64> = clusters.iter().flatten().copied().collect();
        prop_assert_eq!(flattened, expected);
        prop_assert!(clusters.iter().all(|c| !c.is_empty()));
    }

    #[test]
    fn clusters_follow_chained_distance(
        values in prop::collection::vec(-1000i64..1000, 1..60),
        threshold in 1i64..50,
    ) {
        let clusters = cluster_axis(&values, threshold);

        for cluster in &clusters {
            for pair in cluster.windows(2) {
                prop_assert!(pair[1] - pair[0] < threshold);
            }
        }
        for pair in clusters.windows(2) {
            let last = *pair[0].last().unwrap();
            let first = pair[1][0];
            prop_assert!(first - last >= threshold);
        }
    }

    #[test]
    fn every_member_maps_inside_its_cluster(
        values in prop::collection::vec(-1000i64..1000, 1..60),
        threshold in 0i64..50,
    ) {
        let clusters = cluster_axis(&values, threshold);
        let map = AxisMap::from_clusters(&clusters);

        for cluster in &clusters {
            let snapped = map.snap(cluster[0]).unwrap();
            for &member in cluster {
                prop_assert_eq!(map.snap(member), Some(snapped));
            }
            prop_assert!(snapped >= cluster[0] && snapped <= *cluster.last().unwrap());
        }
        for &v in &values {
            prop_assert!(map.snap(v).is_some());
        }
    }

    #[test]
    fn lattice_is_complete_and_four_connected(
        points in prop::collection::vec((-500.0f64..500.0, -500.0f64..500.0), 1..30),
        threshold in 0i64..40,
    ) {
        let mut set = device_set(&points);
        let lattice = Lattice::build(&mut set, 1.0, threshold);
        let (nx, ny) = (lattice.x_coords().len(), lattice.y_coords().len());

        prop_assert_eq!(lattice.node_count(), nx * ny);
        prop_assert_eq!(lattice.edge_count(), (nx - 1) * ny + nx * (ny - 1));
        for (a, b) in lattice.edges() {
            let (ai, aj) = lattice.axis_indices(a).unwrap();
            let (bi, bj) = lattice.axis_indices(b).unwrap();
            prop_assert_eq!(ai.abs_diff(bi) + aj.abs_diff(bj), 1);
        }
    }

    #[test]
    fn snapped_devices_are_dots(
        points in prop::collection::vec((-500.0f64..500.0, -500.0f64..500.0), 1..30),
        threshold in 0i64..40,
    ) {
        let mut set = device_set(&points);
        let lattice = Lattice::build(&mut set, 1.0, threshold);

        for device in set.iter() {
            let node = device.node();
            prop_assert_eq!(Point2::from(node), device.coords);
            prop_assert!(lattice.is_dot(node));
        }
    }

    #[test]
    fn rebuilding_is_idempotent(
        points in prop::collection::vec((-500.0f64..500.0, -500.0f64..500.0), 1..30),
        threshold in 0i64..40,
    ) {
        let mut set = device_set(&points);
        let first = Lattice::build(&mut set, 1.0, threshold);
        let snapped: Vec<Point2> = set.iter().map(|d| d.coords).collect();

        let second = Lattice::build(&mut set, 1.0, threshold);
        let resnapped: Vec<Point2> = set.iter().map(|d| d.coords).collect();

        prop_assert_eq!(snapped, resnapped);
        prop_assert_eq!(first.x_coords(), second.x_coords());
        prop_assert_eq!(first.y_coords(), second.y_coords());
    }
}
