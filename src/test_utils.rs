//! Helpers for unit tests: scripted solver and oracle doubles, instance
//! fixtures and a brute-force reduced cost.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::distance::ArcCosts;
use crate::error::{BnpError, Result};
use crate::lp::{LpModel, LpOutcome, LpSolver};
use crate::models::{ArcSet, Customer, Instance, Route, DEPOT};
use crate::pricing::PricingOracle;

/// Replays canned solver answers and records the size of every model seen.
pub struct ScriptedSolver {
    script: VecDeque<Result<LpOutcome>>,
    /// `(num_vars, num_rows)` per call.
    pub calls: Vec<(usize, usize)>,
}

impl ScriptedSolver {
    pub fn new(script: Vec<Result<LpOutcome>>) -> Self {
        Self {
            script: script.into(),
            calls: Vec::new(),
        }
    }
}

impl LpSolver for ScriptedSolver {
    fn solve(&mut self, model: &LpModel) -> Result<LpOutcome> {
        self.calls.push((model.num_vars(), model.num_rows()));
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(BnpError::solver("script exhausted")))
    }
}

/// Returns canned route batches, then nothing; records duals and caps.
#[derive(Default)]
pub struct MockOracle {
    batches: VecDeque<Vec<Route>>,
    /// `(duals, max_routes)` per call.
    pub calls: Vec<(Vec<f64>, usize)>,
}

impl MockOracle {
    pub fn new(batches: Vec<Vec<Route>>) -> Self {
        Self {
            batches: batches.into(),
            calls: Vec::new(),
        }
    }
}

impl PricingOracle for MockOracle {
    fn find_routes(&mut self, _arcs: &ArcSet, duals: &[f64], max_routes: usize) -> Result<Vec<Route>> {
        self.calls.push((duals.to_vec(), max_routes));
        Ok(self.batches.pop_front().unwrap_or_default())
    }
}

/// Depot and three unit-demand customers, capacity 3. The cycle
/// 0 → 1 → 2 → 3 → 0 costs 10 per arc, its reverse 12 per arc, the
/// diagonals 0 ↔ 2 and 1 ↔ 3 cost 15. The tour 0-1-2-3 (cost 40) is the
/// unique optimum and the LP relaxation is integral.
pub fn scenario_a() -> Instance {
    let mut costs = ArcCosts::new(4);
    for i in 0..4 {
        let j = (i + 1) % 4;
        costs.set(i, j, 10.0);
        costs.set(j, i, 12.0);
    }
    for (i, j) in [(0, 2), (1, 3)] {
        costs.set(i, j, 15.0);
        costs.set(j, i, 15.0);
    }
    Instance::new(vec![0.0, 1.0, 1.0, 1.0], 3.0, costs).expect("valid fixture")
}

/// Two customers whose demand equals the capacity; round trips cost 10 and 20.
pub fn scenario_b() -> Instance {
    let customers = vec![
        Customer::depot(0.0, 0.0),
        Customer::new(1, 3.0, 4.0, 5.0),
        Customer::new(2, 6.0, 8.0, 5.0),
    ];
    Instance::euclidean(&customers, 5.0).expect("valid fixture")
}

/// Three unit-demand customers on a circle of radius 10 around the depot,
/// capacity 2. The LP relaxation takes every pair at 1/2; the optimum is one
/// pair plus one round trip, `40 + 10·√3`.
pub fn triangle_instance() -> Instance {
    let h = 10.0 * 3f64.sqrt() / 2.0;
    let customers = vec![
        Customer::depot(0.0, 0.0),
        Customer::new(1, 0.0, 10.0, 1.0),
        Customer::new(2, -h, -5.0, 1.0),
        Customer::new(3, h, -5.0, 1.0),
    ];
    Instance::euclidean(&customers, 2.0).expect("valid fixture")
}

/// Three zero-demand customers close to the depot.
pub fn zero_demand_instance() -> Instance {
    let customers = vec![
        Customer::depot(0.0, 0.0),
        Customer::new(1, 0.0, 1.0, 0.0),
        Customer::new(2, 1.0, 1.0, 0.0),
        Customer::new(3, 1.0, 0.0, 0.0),
    ];
    Instance::euclidean(&customers, 1.0).expect("valid fixture")
}

/// Random Euclidean instance with demands in `1..=4` and capacity 8.
pub fn random_instance(seed: u64, customers: usize) -> Instance {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut nodes = vec![Customer::depot(50.0, 50.0)];
    for id in 1..=customers {
        let x = rng.random_range(0.0..100.0);
        let y = rng.random_range(0.0..100.0);
        let demand = rng.random_range(1..=4) as f64;
        nodes.push(Customer::new(id, x, y, demand));
    }
    Instance::euclidean(&nodes, 8.0).expect("valid fixture")
}

/// Smallest reduced cost over every closed walk the label-setting search
/// may complete: never straight back to the predecessor, within capacity,
/// at most `node_count` visits per customer. `INFINITY` if there is none.
pub fn walk_reduced_cost(instance: &Instance, duals: &[f64]) -> f64 {
    fn extend(
        instance: &Instance,
        duals: &[f64],
        path: &mut Vec<usize>,
        pred: Option<usize>,
        cost: f64,
        load: f64,
        best: &mut f64,
    ) {
        let node = path[path.len() - 1];
        for &succ in instance.arcs().outgoing(node) {
            if pred == Some(succ) {
                continue;
            }
            let arc = instance.arc_cost(node, succ).unwrap_or_default();
            if succ == DEPOT {
                *best = best.min(cost + arc);
                continue;
            }
            let next_load = load + instance.demand(succ);
            if next_load > instance.capacity()
                || path.iter().filter(|&&v| v == succ).count() >= instance.node_count()
            {
                continue;
            }
            path.push(succ);
            extend(instance, duals, path, Some(node), cost + arc - duals[succ], next_load, best);
            path.pop();
        }
    }

    let mut best = f64::INFINITY;
    extend(instance, duals, &mut vec![DEPOT], None, 0.0, 0.0, &mut best);
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_reduced_cost() {
        let inst = scenario_a();
        assert!(walk_reduced_cost(&inst, &[0.0; 4]) > 0.0);
        let best = walk_reduced_cost(&inst, &[0.0, 22.0, 30.0, 22.0]);
        assert!((best + 34.0).abs() < 1e-9);
    }
}
