//! Arc selection and child construction.

use std::collections::{BTreeMap, VecDeque};

use super::node::{BranchDecision, NodeId};
use super::tree::SearchTree;
use crate::models::{Arc, ArcSet, Instance, Route, DEPOT};

/// Distances to one half closer than this are ties.
const TIE_EPS: f64 = 1e-9;

/// The fractional arc whose value is closest to one half. Ties go to the
/// smallest arc in `(tail, head)` order.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use u_bnp::branch::select_branching_arc;
/// use u_bnp::models::Arc;
///
/// let map: BTreeMap<Arc, f64> = [
///     (Arc::new(1, 2), 0.2),
///     (Arc::new(2, 3), 0.6),
///     (Arc::new(3, 1), 1.4),
/// ]
/// .into_iter()
/// .collect();
/// // 0.6 and 1.4 are both 0.1 away from a half: the smaller arc wins.
/// assert_eq!(select_branching_arc(&map), Some(Arc::new(2, 3)));
/// ```
pub fn select_branching_arc(fractional: &BTreeMap<Arc, f64>) -> Option<Arc> {
    let mut best: Option<(Arc, f64)> = None;
    for (&arc, &v) in fractional {
        let distance = ((v - v.floor()) - 0.5).abs();
        if best.map_or(true, |(_, d)| distance < d - TIE_EPS) {
            best = Some((arc, distance));
        }
    }
    best.map(|(arc, _)| arc)
}

/// Splits `parent` on `arc`: first the child without the arc, then the
/// child forced to use it. Returns both ids in that order.
///
/// The inclusion child is seeded with a route through `arc` when one can be
/// assembled from the arcs it has left, so its master stays feasible.
pub fn branch_on_arc(
    tree: &mut SearchTree,
    instance: &Instance,
    parent: NodeId,
    arc: Arc,
) -> [NodeId; 2] {
    let exclude = tree.add_child(parent, BranchDecision::Exclude(arc), None);
    let include = BranchDecision::Include(arc);
    let forced = include.restrict(tree.node(parent).arcs());
    let seed = seed_route(instance, &forced, arc);
    let include = tree.add_child(parent, include, seed);
    [exclude, include]
}

/// A route driving `arc`, extended backwards and forwards along arcs that
/// are the only way into (out of) their node until the depot is reachable.
fn seed_route(instance: &Instance, arcs: &ArcSet, arc: Arc) -> Option<Route> {
    let mut path = VecDeque::from([arc.tail, arc.head]);

    while let Some(&front) = path.front().filter(|&&f| !arcs.contains(Arc::new(DEPOT, f))) {
        let mut preds = instance
            .customers()
            .filter(|&p| arcs.contains(Arc::new(p, front)));
        let pred = preds.next()?;
        if preds.next().is_some() || path.contains(&pred) {
            return None;
        }
        path.push_front(pred);
    }

    while let Some(&back) = path.back().filter(|&&b| !arcs.contains(Arc::new(b, DEPOT))) {
        let (&succ, rest) = arcs.outgoing(back).split_first()?;
        if !rest.is_empty() || path.contains(&succ) {
            return None;
        }
        path.push_back(succ);
    }

    let load: f64 = path.iter().map(|&c| instance.demand(c)).sum();
    if load > instance.capacity() {
        return None;
    }
    path.push_front(DEPOT);
    Route::new(path.into(), instance).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{scenario_a, triangle_instance};

    #[test]
    fn test_select_closest_to_half() {
        let map: BTreeMap<Arc, f64> = [
            (Arc::new(1, 3), 0.9),
            (Arc::new(2, 3), 0.45),
            (Arc::new(3, 2), 0.2),
        ]
        .into_iter()
        .collect();
        assert_eq!(select_branching_arc(&map), Some(Arc::new(2, 3)));
        assert_eq!(select_branching_arc(&BTreeMap::new()), None);
    }

    #[test]
    fn test_select_ties_symmetric_about_half() {
        // 0.3 and 0.7 differ from 0.5 only by rounding noise.
        let map: BTreeMap<Arc, f64> = [(Arc::new(1, 2), 0.3), (Arc::new(2, 1), 0.7)]
            .into_iter()
            .collect();
        assert_eq!(select_branching_arc(&map), Some(Arc::new(1, 2)));

        let map: BTreeMap<Arc, f64> = [
            (Arc::new(1, 4), 1.6),
            (Arc::new(3, 1), 0.4),
            (Arc::new(4, 2), 0.6),
        ]
        .into_iter()
        .collect();
        assert_eq!(select_branching_arc(&map), Some(Arc::new(1, 4)));
    }

    #[test]
    fn test_branch_on_arc() {
        let inst = triangle_instance();
        let mut tree = SearchTree::new(&inst);
        let root = tree.root();
        let [out, inc] = branch_on_arc(&mut tree, &inst, root, Arc::new(1, 2));

        assert_eq!(tree.node(root).children(), &[out, inc]);
        assert_eq!(tree.node(out).decision(), Some(BranchDecision::Exclude(Arc::new(1, 2))));
        assert!(!tree.node(out).arcs().contains(Arc::new(1, 2)));
        assert_eq!(tree.node(out).routes().len(), 3);

        let inc = tree.node(inc);
        assert_eq!(inc.arcs().outgoing(1), &[2]);
        let paths: Vec<&[usize]> = inc.routes().iter().map(Route::path).collect();
        assert_eq!(paths, vec![&[0, 3][..], &[0, 1, 2][..]]);
    }

    #[test]
    fn test_seed_route_follows_forced_chain() {
        let inst = scenario_a();
        let arcs = inst.arcs().forcing(Arc::new(1, 2)).forcing(Arc::new(2, 3));
        // 0 -> 2 and 2 -> 0 are gone: the chain must run 1 -> 2 -> 3.
        let route = seed_route(&inst, &arcs, Arc::new(2, 3)).expect("chain exists");
        assert_eq!(route.path(), &[0, 1, 2, 3]);
        assert!(route.arcs().all(|a| arcs.contains(a)));
    }

    #[test]
    fn test_seed_route_respects_capacity() {
        let inst = triangle_instance();
        let arcs = inst.arcs().forcing(Arc::new(1, 2)).forcing(Arc::new(2, 3));
        assert!(seed_route(&inst, &arcs, Arc::new(2, 3)).is_none());
    }
}
