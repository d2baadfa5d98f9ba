//! Aggregated arc usage of a master-problem solution.

use std::collections::BTreeMap;

use crate::models::{Arc, Route};

/// Sums, over routes whose value exceeds `tolerance`, the value of every
/// customer-to-customer arc they drive, and keeps the arcs whose total is
/// farther than `tolerance` from an integer.
///
/// Depot legs are not aggregated: every route has them, so they carry no
/// branching information.
///
/// # Examples
///
/// ```
/// use u_bnp::colgen::fractional_arcs;
/// use u_bnp::models::{Arc, Route};
///
/// let routes = vec![
///     Route::with_cost(vec![0, 1, 2], 1.0),
///     Route::with_cost(vec![0, 2, 1], 1.0),
///     Route::with_cost(vec![0, 3, 1, 2], 1.0),
/// ];
/// let map = fractional_arcs(&routes, &[0.5, 0.5, 0.5], 1e-4);
/// // (1, 2) is used by two halves: integral, dropped.
/// assert!(!map.contains_key(&Arc::new(1, 2)));
/// assert_eq!(map.get(&Arc::new(2, 1)), Some(&0.5));
/// assert_eq!(map.get(&Arc::new(3, 1)), Some(&0.5));
/// ```
pub fn fractional_arcs(routes: &[Route], values: &[f64], tolerance: f64) -> BTreeMap<Arc, f64> {
    let mut usage: BTreeMap<Arc, f64> = BTreeMap::new();
    for (route, &value) in routes.iter().zip(values) {
        if value <= tolerance {
            continue;
        }
        for arc in route.customer_arcs() {
            *usage.entry(arc).or_insert(0.0) += value;
        }
    }
    usage.retain(|_, v| (*v - v.round()).abs() > tolerance);
    usage
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_integral_solution_has_no_fractional_arcs() {
        let routes = vec![
            Route::with_cost(vec![0, 1, 2], 1.0),
            Route::with_cost(vec![0, 3], 1.0),
        ];
        assert!(fractional_arcs(&routes, &[1.0, 1.0], 1e-4).is_empty());
    }

    #[test]
    fn test_values_below_tolerance_ignored() {
        let routes = vec![Route::with_cost(vec![0, 1, 2], 1.0)];
        assert!(fractional_arcs(&routes, &[5e-5], 1e-4).is_empty());
        let map = fractional_arcs(&routes, &[0.3], 1e-4);
        assert_eq!(map.len(), 1);
        assert!((map[&Arc::new(1, 2)] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_depot_legs_excluded() {
        let routes = vec![Route::with_cost(vec![0, 4], 1.0)];
        assert!(fractional_arcs(&routes, &[0.5], 1e-4).is_empty());
    }

    #[test]
    fn test_near_integral_sum_dropped() {
        let routes = vec![
            Route::with_cost(vec![0, 1, 2], 1.0),
            Route::with_cost(vec![0, 3, 1, 2], 1.0),
        ];
        let map = fractional_arcs(&routes, &[0.33334, 0.66666], 1e-4);
        assert!(!map.contains_key(&Arc::new(1, 2)));
        assert!(map.contains_key(&Arc::new(3, 1)));
    }

    proptest! {
        #[test]
        fn prop_entries_never_integral(
            paths in prop::collection::vec(prop::collection::vec(1usize..5, 1..5), 1..6),
            raw in prop::collection::vec(0.0f64..1.0, 6),
        ) {
            let routes: Vec<Route> = paths
                .into_iter()
                .map(|mut p| { p.insert(0, 0); Route::with_cost(p, 1.0) })
                .collect();
            let tol = 1e-4;
            for (_, v) in fractional_arcs(&routes, &raw[..routes.len()], tol) {
                prop_assert!((v - v.round()).abs() > tol);
                prop_assert!(v > 0.0);
            }
        }
    }
}
