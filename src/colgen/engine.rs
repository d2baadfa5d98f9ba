//! Column generation over one branch node.

use std::collections::HashSet;

use log::{debug, info, warn};
use logging_timer::time;

use super::fractional_arcs;
use crate::branch::BranchNode;
use crate::config::ColumnGenerationConfig;
use crate::error::{BnpError, Result};
use crate::lp::{LpModel, LpOutcome, LpSolution, LpSolver, RowId, Sense};
use crate::models::{Instance, Route, DEPOT};
use crate::pricing::PricingOracle;

/// Per-round history of one node solve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnGenerationStats {
    /// Master objective after each LP solve.
    pub objective_trace: Vec<f64>,
    /// Routes added by each pricing round.
    pub columns_per_round: Vec<usize>,
}

impl ColumnGenerationStats {
    /// Number of pricing rounds run.
    pub fn rounds(&self) -> usize {
        self.columns_per_round.len()
    }

    /// Total routes added.
    pub fn columns_added(&self) -> usize {
        self.columns_per_round.iter().sum()
    }
}

/// Outcome of [`ColumnGeneration::solve`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodeReport {
    /// `false` when the master LP had no solution.
    pub feasible: bool,
    /// `true` when the last pricing round found nothing new.
    pub converged: bool,
    /// Final master objective; `None` for infeasible nodes.
    pub objective: Option<f64>,
    /// Node lower bound after the solve.
    pub lower_bound: f64,
    /// Round history.
    pub stats: ColumnGenerationStats,
}

/// Solves the LP relaxation of a branch node by column generation.
///
/// The restricted master has one `[0, 1]` variable per pool route priced at
/// the route cost, and one row per customer forcing the visits of that
/// customer to sum to one. After each LP solve the customer duals go to the
/// pricing oracle; returned routes join the pool and the model as new
/// columns. A round that adds nothing ends the loop.
///
/// # Examples
///
/// ```
/// # fn main() -> u_bnp::error::Result<()> {
/// use u_bnp::branch::BranchNode;
/// use u_bnp::colgen::ColumnGeneration;
/// use u_bnp::lp::ScipSolver;
/// use u_bnp::models::{Customer, Instance};
/// use u_bnp::pricing::LabelSettingOracle;
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 3.0, 4.0, 1.0),
///     Customer::new(2, 6.0, 8.0, 1.0),
/// ];
/// let instance = Instance::euclidean(&customers, 2.0)?;
/// let mut engine = ColumnGeneration::new(
///     &instance,
///     ScipSolver::new(),
///     LabelSettingOracle::new(&instance),
/// );
/// let mut root = BranchNode::root(&instance);
/// let report = engine.solve(&mut root)?;
/// assert!(report.feasible);
/// # Ok(())
/// # }
/// ```
pub struct ColumnGeneration<'a, S, O> {
    instance: &'a Instance,
    solver: S,
    oracle: O,
    config: ColumnGenerationConfig,
}

impl<'a, S: LpSolver, O: PricingOracle> ColumnGeneration<'a, S, O> {
    /// Creates an engine with the default [`ColumnGenerationConfig`].
    pub fn new(instance: &'a Instance, solver: S, oracle: O) -> Self {
        Self {
            instance,
            solver,
            oracle,
            config: ColumnGenerationConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: ColumnGenerationConfig) -> Self {
        self.config = config;
        self
    }

    /// Round caps and pricing limits in use.
    pub fn config(&self) -> &ColumnGenerationConfig {
        &self.config
    }

    /// The pricing oracle.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// The LP solver.
    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Runs column generation on `node` and stores the results in it.
    ///
    /// An infeasible master marks the node infeasible and is not an error.
    /// Solver and oracle failures are returned unchanged.
    #[time]
    pub fn solve(&mut self, node: &mut BranchNode) -> Result<NodeReport> {
        let mut stats = ColumnGenerationStats::default();
        match self.generate(node, &mut stats) {
            Ok((solution, converged)) => {
                self.record(node, &solution, converged);
                info!(
                    "node {} solved: objective {:.4}, bound {:.4}, {} routes in pool, {} fractional arcs",
                    node.id,
                    solution.objective,
                    node.lower_bound,
                    node.routes.len(),
                    node.fractional_arcs.len()
                );
                Ok(NodeReport {
                    feasible: true,
                    converged,
                    objective: Some(solution.objective),
                    lower_bound: node.lower_bound,
                    stats,
                })
            }
            Err(BnpError::MasterInfeasible) => {
                info!("node {} infeasible after {} rounds", node.id, stats.rounds());
                node.feasible = false;
                node.objective = None;
                node.solution.clear();
                node.fractional_arcs.clear();
                Ok(NodeReport {
                    feasible: false,
                    converged: true,
                    objective: None,
                    lower_bound: node.lower_bound,
                    stats,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Pricing loop. Returns the last master solution and whether pricing
    /// converged.
    fn generate(
        &mut self,
        node: &mut BranchNode,
        stats: &mut ColumnGenerationStats,
    ) -> Result<(LpSolution, bool)> {
        let mut master = LpModel::new(format!("master_{}", node.id.0));
        let rows: Vec<RowId> = self
            .instance
            .customers()
            .map(|_| master.add_row(Vec::new(), Sense::Eq, 1.0))
            .collect();
        for route in &node.routes {
            add_route_column(&mut master, &rows, route, self.instance.node_count());
        }
        let mut known: HashSet<Vec<usize>> = node.routes.iter().map(|r| r.path().to_vec()).collect();

        loop {
            let solution = match self.solver.solve(&master)? {
                LpOutcome::Optimal(solution) => solution,
                LpOutcome::Infeasible => return Err(BnpError::MasterInfeasible),
            };
            if solution.values.len() != master.num_vars() {
                return Err(BnpError::solver(format!(
                    "master LP returned {} values for {} columns",
                    solution.values.len(),
                    master.num_vars()
                )));
            }
            stats.objective_trace.push(solution.objective);

            let round = stats.rounds();
            if self.config.max_rounds.is_some_and(|max| round >= max) {
                warn!(
                    "node {} stopped after {round} pricing rounds without converging",
                    node.id
                );
                return Ok((solution, false));
            }

            let duals = node_duals(&solution, &rows)?;
            let cap = self.config.cap_for_round(round);
            let found = self.oracle.find_routes(&node.arcs, &duals, cap)?;
            let mut added = 0;
            for route in found {
                if !known.insert(route.path().to_vec()) {
                    continue;
                }
                add_route_column(&mut master, &rows, &route, self.instance.node_count());
                node.routes.push(route);
                added += 1;
            }
            stats.columns_per_round.push(added);
            debug!(
                "node {} round {round}: objective {:.6}, {added} new routes (cap {cap})",
                node.id, solution.objective
            );

            if added == 0 {
                return Ok((solution, true));
            }
        }
    }

    fn record(&self, node: &mut BranchNode, solution: &LpSolution, converged: bool) {
        let tol = self.instance.tolerance();
        node.feasible = true;
        node.objective = Some(solution.objective);
        if converged {
            node.lower_bound = node.lower_bound.max(solution.objective);
        }
        // Variables were added in pool order.
        let values = &solution.values[..node.routes.len()];
        node.solution = node
            .routes
            .iter()
            .zip(values)
            .filter(|(_, &v)| v > tol)
            .map(|(r, &v)| (r.clone(), v))
            .collect();
        node.fractional_arcs = fractional_arcs(&node.routes, values, tol);
    }
}

fn add_route_column(master: &mut LpModel, rows: &[RowId], route: &Route, node_count: usize) {
    let column = route.column(node_count);
    master.add_column(
        route.cost(),
        0.0,
        1.0,
        rows.iter().copied().zip(column),
    );
}

/// Node-indexed duals with the depot priced at zero.
fn node_duals(solution: &LpSolution, rows: &[RowId]) -> Result<Vec<f64>> {
    let mut duals = vec![0.0; rows.len() + 1];
    for (slot, &row) in duals.iter_mut().skip(DEPOT + 1).zip(rows) {
        *slot = solution
            .dual(row)
            .ok_or_else(|| BnpError::solver("master LP solution carries no duals"))?;
    }
    Ok(duals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::ScipSolver;
    use crate::models::Arc;
    use crate::pricing::{CompactOracle, LabelSettingOracle};
    use crate::test_utils::{
        random_instance, scenario_a, scenario_b, triangle_instance, MockOracle,
        ScriptedSolver,
    };
    use proptest::prelude::*;

    #[test]
    fn test_scenario_a_single_integral_route() {
        let inst = scenario_a();
        let mut engine =
            ColumnGeneration::new(&inst, ScipSolver::new(), LabelSettingOracle::new(&inst));
        let mut root = BranchNode::root(&inst);
        let report = engine.solve(&mut root).expect("solved");

        assert!(report.feasible);
        assert!(report.converged);
        assert!((report.objective.unwrap() - 40.0).abs() < 1e-6);
        assert!((root.lower_bound() - 40.0).abs() < 1e-6);
        assert!(root.fractional_arcs().is_empty());
        assert_eq!(root.solution().len(), 1);
        assert_eq!(root.solution()[0].0.path(), &[0, 1, 2, 3]);
        assert!((root.solution()[0].1 - 1.0).abs() < 1e-6);
        assert!(root.is_integral(inst.tolerance()));
        assert_eq!(report.stats.columns_per_round.last(), Some(&0));
    }

    #[test]
    fn test_scenario_a_with_compact_oracle() {
        let inst = scenario_a();
        let oracle = CompactOracle::new(&inst, ScipSolver::new());
        let mut engine = ColumnGeneration::new(&inst, ScipSolver::new(), oracle);
        let mut root = BranchNode::root(&inst);
        let report = engine.solve(&mut root).expect("solved");
        assert!((report.objective.unwrap() - 40.0).abs() < 1e-6);
        assert!(root.fractional_arcs().is_empty());
        assert!(root.solution().iter().all(|(r, _)| r.is_elementary()));
    }

    #[test]
    fn test_scenario_b_two_round_trips() {
        let inst = scenario_b();
        let mut engine =
            ColumnGeneration::new(&inst, ScipSolver::new(), LabelSettingOracle::new(&inst));
        let mut root = BranchNode::root(&inst);
        let report = engine.solve(&mut root).expect("solved");

        assert!(report.feasible && report.converged);
        assert!((report.objective.unwrap() - 30.0).abs() < 1e-6);
        assert_eq!(report.stats.rounds(), 1);
        assert_eq!(report.stats.columns_added(), 0);
        assert_eq!(root.solution().len(), 2);
        assert!(root.is_integral(inst.tolerance()));
        assert!(root.fractional_arcs().is_empty());
    }

    #[test]
    fn test_triangle_relaxation_is_fractional() {
        let inst = triangle_instance();
        let mut engine =
            ColumnGeneration::new(&inst, ScipSolver::new(), LabelSettingOracle::new(&inst));
        let mut root = BranchNode::root(&inst);
        let report = engine.solve(&mut root).expect("solved");

        let side = 10.0 * 3f64.sqrt();
        assert!((report.objective.unwrap() - (30.0 + 1.5 * side)).abs() < 1e-6);
        assert!(!root.fractional_arcs().is_empty());
        assert!(!root.is_integral(inst.tolerance()));
        for &v in root.fractional_arcs().values() {
            assert!((v - v.round()).abs() > inst.tolerance());
        }
    }

    #[test]
    fn test_round_caps_and_dual_vector() {
        let inst = scenario_a();
        let oracle = MockOracle::new(vec![
            vec![Route::new(vec![0, 1, 2], &inst).expect("valid")],
            vec![Route::new(vec![0, 1, 2, 3], &inst).expect("valid")],
        ]);
        let config = ColumnGenerationConfig::default()
            .with_first_round_cap(7)
            .with_round_cap(3);
        let mut engine = ColumnGeneration::new(&inst, ScipSolver::new(), oracle).with_config(config);
        let mut root = BranchNode::root(&inst);
        let report = engine.solve(&mut root).expect("solved");

        let calls = &engine.oracle().calls;
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0].1, 7);
        assert_eq!(calls[1].1, 3);
        assert_eq!(calls[2].1, 3);
        assert!(calls.iter().all(|(duals, _)| duals.len() == 4 && duals[0] == 0.0));
        // Trivial master: each customer row priced at its round trip.
        assert!((calls[0].0[2] - 30.0).abs() < 1e-6);
        assert_eq!(report.stats.columns_per_round, vec![1, 1, 0]);
        assert_eq!(root.routes().len(), 5);
        assert!((report.objective.unwrap() - 40.0).abs() < 1e-6);
    }

    #[test]
    fn test_duplicate_routes_count_as_convergence() {
        let inst = scenario_a();
        let oracle = MockOracle::new(vec![vec![Route::new(vec![0, 2], &inst).expect("valid")]]);
        let mut engine = ColumnGeneration::new(&inst, ScipSolver::new(), oracle);
        let mut root = BranchNode::root(&inst);
        let report = engine.solve(&mut root).expect("solved");
        assert!(report.converged);
        assert_eq!(report.stats.columns_per_round, vec![0]);
        assert_eq!(root.routes().len(), 3);
    }

    #[test]
    fn test_max_rounds_leaves_bound_untouched() {
        let inst = scenario_a();
        let oracle = MockOracle::new(vec![
            vec![Route::new(vec![0, 1, 2], &inst).expect("valid")],
            vec![Route::new(vec![0, 2, 3], &inst).expect("valid")],
        ]);
        let config = ColumnGenerationConfig::default().with_max_rounds(1);
        let mut engine = ColumnGeneration::new(&inst, ScipSolver::new(), oracle).with_config(config);
        let mut root = BranchNode::root(&inst);
        let report = engine.solve(&mut root).expect("solved");

        assert!(report.feasible);
        assert!(!report.converged);
        assert_eq!(report.stats.rounds(), 1);
        assert_eq!(report.stats.objective_trace.len(), 2);
        assert_eq!(root.lower_bound(), 0.0);
        assert!(root.objective().is_some());
    }

    #[test]
    fn test_infeasible_master_marks_node() {
        let inst = scenario_a();
        let oracle = MockOracle::default();
        let mut engine = ColumnGeneration::new(&inst, ScipSolver::new(), oracle);
        let mut root = BranchNode::root(&inst);
        // Customer 2 loses every route.
        root.routes.retain(|r| !r.customers().contains(&2));
        let report = engine.solve(&mut root).expect("not an error");

        assert!(!report.feasible);
        assert!(!root.is_feasible());
        assert_eq!(root.objective(), None);
        assert!(engine.oracle().calls.is_empty());
    }

    #[test]
    fn test_solver_error_is_not_infeasibility() {
        let inst = scenario_a();
        let solver = ScriptedSolver::new(vec![Err(BnpError::solver("connection lost"))]);
        let mut engine = ColumnGeneration::new(&inst, solver, MockOracle::default());
        let mut root = BranchNode::root(&inst);
        let err = engine.solve(&mut root).unwrap_err();
        assert!(matches!(err, BnpError::Solver { .. }));
        assert!(root.is_feasible());
    }

    #[test]
    fn test_missing_duals_is_solver_error() {
        let inst = scenario_a();
        let outcome = LpOutcome::Optimal(LpSolution {
            objective: 74.0,
            values: vec![1.0; 3],
            duals: None,
        });
        let solver = ScriptedSolver::new(vec![Ok(outcome)]);
        let mut engine = ColumnGeneration::new(&inst, solver, MockOracle::default());
        let mut root = BranchNode::root(&inst);
        assert!(matches!(engine.solve(&mut root), Err(BnpError::Solver { .. })));
    }

    #[test]
    fn test_master_grows_by_columns() {
        let inst = scenario_a();
        let first = LpOutcome::Optimal(LpSolution {
            objective: 74.0,
            values: vec![1.0; 3],
            duals: Some(vec![22.0, 30.0, 22.0]),
        });
        let second = LpOutcome::Optimal(LpSolution {
            objective: 40.0,
            values: vec![0.0, 0.0, 0.0, 1.0],
            duals: Some(vec![10.0, 20.0, 10.0]),
        });
        let solver = ScriptedSolver::new(vec![Ok(first), Ok(second)]);
        let oracle = MockOracle::new(vec![vec![Route::new(vec![0, 1, 2, 3], &inst).expect("valid")]]);
        let mut engine = ColumnGeneration::new(&inst, solver, oracle);
        let mut root = BranchNode::root(&inst);
        engine.solve(&mut root).expect("solved");

        assert_eq!(engine.solver().calls, vec![(3, 3), (4, 3)]);
        assert_eq!(root.solution().len(), 1);
        assert!(root.fractional_arcs().is_empty());
        assert!(root.arcs().contains(Arc::new(1, 2)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_objective_never_increases(seed in any::<u64>(), customers in 2usize..6) {
            let inst = random_instance(seed, customers);
            let mut engine =
                ColumnGeneration::new(&inst, ScipSolver::new(), LabelSettingOracle::new(&inst));
            let mut root = BranchNode::root(&inst);
            let report = engine.solve(&mut root).expect("solved");

            prop_assert!(report.feasible && report.converged);
            for pair in report.stats.objective_trace.windows(2) {
                prop_assert!(pair[1] <= pair[0] + 1e-7);
            }
            prop_assert_eq!(report.stats.columns_per_round.last(), Some(&0));
            for (route, _) in root.solution() {
                prop_assert!(route.demand(&inst) <= inst.capacity() + 1e-9);
            }
            let trivial: f64 = inst.trivial_routes().iter().map(Route::cost).sum();
            prop_assert!(report.objective.unwrap() <= trivial + 1e-7);
        }
    }
}
