//! Exact pricing through an arc-flow MIP.

use logging_timer::time;

use super::PricingOracle;
use crate::error::{BnpError, Result};
use crate::lp::{LpModel, LpOutcome, LpSolver, Sense, VarId, VarKind};
use crate::models::{Arc, ArcSet, Instance, Route, DEPOT};

/// Exact pricing oracle: finds the single most negative elementary route
/// by solving a compact MIP.
///
/// The model has one binary per arc and one continuous position per node.
/// Flow is conserved at every node, the depot is left exactly once, each
/// customer at most once, Miller–Tucker–Zemlin rows forbid cycles that avoid
/// the depot, and the demand of the arc heads fits in the vehicle. The
/// objective is `Σ (cost(arc) − dual(head)) · x(arc)`.
///
/// At most one route is returned per call, whatever `max_routes` is (as long
/// as it is positive).
pub struct CompactOracle<'a, S> {
    instance: &'a Instance,
    solver: S,
}

impl<'a, S: LpSolver> CompactOracle<'a, S> {
    /// Creates an oracle solving its MIPs with `solver`.
    pub fn new(instance: &'a Instance, solver: S) -> Self {
        Self { instance, solver }
    }

    fn build(&self, arcs: &[Arc], duals: &[f64]) -> (LpModel, Vec<VarId>) {
        let n = self.instance.node_count();
        let mut model = LpModel::new("compact_pricing");

        let x: Vec<VarId> = arcs
            .iter()
            .map(|&arc| {
                let cost = self.instance.cost(arc).unwrap_or_default();
                model.add_var(cost - duals[arc.head], 0.0, 1.0, VarKind::Binary)
            })
            .collect();
        let u: Vec<VarId> = (0..n)
            .map(|_| model.add_var(0.0, 0.0, f64::INFINITY, VarKind::Continuous))
            .collect();

        for node in 0..n {
            let out: Vec<(VarId, f64)> = arcs
                .iter()
                .zip(&x)
                .filter(|(a, _)| a.tail == node)
                .map(|(_, &v)| (v, 1.0))
                .collect();
            let mut balance = out.clone();
            balance.extend(
                arcs.iter()
                    .zip(&x)
                    .filter(|(a, _)| a.head == node)
                    .map(|(_, &v)| (v, -1.0)),
            );
            model.add_row(balance, Sense::Eq, 0.0);
            if node == DEPOT {
                model.add_row(out, Sense::Eq, 1.0);
            } else {
                model.add_row(out, Sense::Le, 1.0);
            }
        }

        model.add_row(vec![(u[DEPOT], 1.0)], Sense::Eq, 0.0);
        let big = n as f64;
        let mut load = Vec::new();
        for (arc, &v) in arcs.iter().zip(&x) {
            if arc.head == DEPOT {
                continue;
            }
            model.add_row(
                vec![(u[arc.tail], 1.0), (u[arc.head], -1.0), (v, big)],
                Sense::Le,
                big - 1.0,
            );
            load.push((v, self.instance.demand(arc.head)));
        }
        model.add_row(load, Sense::Le, self.instance.capacity());

        (model, x)
    }

    #[time]
    fn search(&mut self, arcs: &ArcSet, duals: &[f64]) -> Result<Option<Route>> {
        let arc_list: Vec<Arc> = arcs.iter().collect();
        let (model, x) = self.build(&arc_list, duals);

        let solution = match self.solver.solve(&model)? {
            LpOutcome::Optimal(solution) => solution,
            LpOutcome::Infeasible => return Ok(None),
        };
        if solution.objective >= -self.instance.tolerance() {
            return Ok(None);
        }

        let mut selected: Vec<Arc> = arc_list
            .iter()
            .zip(&x)
            .filter(|(_, &v)| solution.value(v) > 0.5)
            .map(|(&a, _)| a)
            .collect();

        let mut path = vec![DEPOT];
        let mut current = DEPOT;
        while !selected.is_empty() {
            let Some(pos) = selected.iter().position(|a| a.tail == current) else {
                return Err(BnpError::solver(format!(
                    "pricing solution leaves no arc out of node {current}"
                )));
            };
            current = selected.swap_remove(pos).head;
            path.push(current);
        }
        if path.pop() != Some(DEPOT) {
            return Err(BnpError::solver("pricing solution does not return to the depot"));
        }

        Route::new(path, self.instance).map(Some)
    }
}

impl<S: LpSolver> PricingOracle for CompactOracle<'_, S> {
    fn find_routes(&mut self, arcs: &ArcSet, duals: &[f64], max_routes: usize) -> Result<Vec<Route>> {
        if max_routes == 0 {
            return Ok(Vec::new());
        }
        Ok(self.search(arcs, duals)?.into_iter().collect())
    }
}
