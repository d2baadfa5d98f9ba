//! Best-bound-first branch-and-price.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

use log::{debug, info, warn};
use logging_timer::time;
use serde::{Deserialize, Serialize};

use super::node::NodeId;
use super::policy::{branch_on_arc, select_branching_arc};
use super::tree::SearchTree;
use crate::colgen::{ColumnGeneration, NodeReport};
use crate::config::SearchConfig;
use crate::error::Result;
use crate::evaluation::RouteEvaluator;
use crate::lp::LpSolver;
use crate::models::{Arc, Instance, Solution};
use crate::pricing::PricingOracle;

/// Why a search stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStatus {
    /// Every node was solved and then pruned, branched or accepted.
    Completed,
    /// [`SearchConfig::node_limit`] was reached.
    NodeLimit,
    /// [`SearchConfig::time_limit`] was reached.
    TimeLimit,
    /// The tree ran out, but some fractional node had no fractional customer
    /// arc to branch on. Its bound stays in [`SearchResult::best_bound`].
    Stalled,
}

/// Result of [`BranchAndPrice::run`].
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Why the search stopped.
    pub status: SearchStatus,
    /// Best integral solution found.
    pub incumbent: Option<Solution>,
    /// Smallest bound over the unexplored part of the tree. Equals the
    /// incumbent cost once the search completes, and is infinite when it
    /// completes without one.
    pub best_bound: f64,
    /// Nodes handed to column generation.
    pub nodes_solved: usize,
    /// Nodes in the tree, solved or not.
    pub nodes_created: usize,
}

impl SearchResult {
    /// Cost of the incumbent, infinite without one.
    pub fn upper_bound(&self) -> f64 {
        self.incumbent
            .as_ref()
            .map_or(f64::INFINITY, Solution::total_cost)
    }

    /// Relative optimality gap, `None` without an incumbent.
    pub fn gap(&self) -> Option<f64> {
        let upper = self.incumbent.as_ref()?.total_cost();
        let denom = upper.abs().max(f64::EPSILON);
        Some(((upper - self.best_bound) / denom).max(0.0))
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenNode {
    bound: f64,
    id: NodeId,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Reversed: the max-heap pops the smallest bound, then the oldest node.
impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .bound
            .total_cmp(&self.bound)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Branch-and-price driver.
///
/// Nodes are explored smallest bound first. Each node is solved by column
/// generation; infeasible nodes and nodes that cannot beat the incumbent are
/// pruned, integral nodes update the incumbent, and the rest are split on
/// the fractional arc closest to one half.
pub struct BranchAndPrice<'a, S, O> {
    instance: &'a Instance,
    engine: ColumnGeneration<'a, S, O>,
    config: SearchConfig,
    tree: SearchTree,
}

impl<'a, S: LpSolver, O: PricingOracle> BranchAndPrice<'a, S, O> {
    /// A search over `instance` whose nodes are solved by `engine`, with the
    /// default [`SearchConfig`].
    pub fn new(instance: &'a Instance, engine: ColumnGeneration<'a, S, O>) -> Self {
        Self {
            instance,
            engine,
            config: SearchConfig::default(),
            tree: SearchTree::new(instance),
        }
    }

    /// Replaces the node and time limits.
    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// The nodes created so far.
    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    /// The column generation engine solving each node.
    pub fn engine(&self) -> &ColumnGeneration<'a, S, O> {
        &self.engine
    }

    /// Runs the search until the tree is exhausted or a limit is hit.
    ///
    /// Nodes that leave the open set drop their route pool and solution;
    /// the tree keeps their arcs, bounds and links. Solver and oracle errors
    /// abort the search.
    #[time]
    pub fn run(&mut self) -> Result<SearchResult> {
        let start = Instant::now();
        let tol = self.instance.tolerance();
        let evaluator = RouteEvaluator::new(self.instance);

        let mut open = BinaryHeap::new();
        let root = self.tree.root();
        open.push(OpenNode {
            bound: self.tree.node(root).lower_bound(),
            id: root,
        });
        let mut incumbent: Option<Solution> = None;
        let mut upper = f64::INFINITY;
        // Bounds of nodes left fractional without a branching arc.
        let mut stalled = f64::INFINITY;
        let mut nodes_solved = 0;
        let mut status = SearchStatus::Completed;

        while let Some(entry) = open.pop() {
            if entry.bound >= upper - tol {
                debug!("node {} pruned by bound {:.4}", entry.id, entry.bound);
                self.tree.node_mut(entry.id).release();
                continue;
            }
            if self.config.node_limit.is_some_and(|limit| nodes_solved >= limit) {
                status = SearchStatus::NodeLimit;
                open.push(entry);
                break;
            }
            if self.config.time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                status = SearchStatus::TimeLimit;
                open.push(entry);
                break;
            }

            let report = self.engine.solve(self.tree.node_mut(entry.id))?;
            nodes_solved += 1;
            if report.feasible {
                let arc = self.visit(
                    entry.id,
                    &report,
                    &evaluator,
                    &mut upper,
                    &mut incumbent,
                    &mut stalled,
                );
                if let Some(arc) = arc {
                    let bound = self.tree.node(entry.id).lower_bound();
                    debug!("node {} branches on {arc:?}", entry.id);
                    for id in branch_on_arc(&mut self.tree, self.instance, entry.id, arc) {
                        open.push(OpenNode { bound, id });
                    }
                }
            }
            self.tree.node_mut(entry.id).release();
        }
        if status == SearchStatus::Completed && stalled.is_finite() {
            status = SearchStatus::Stalled;
        }

        let open_bound = open
            .iter()
            .filter(|e| e.bound < upper - tol)
            .map(|e| e.bound)
            .fold(f64::INFINITY, f64::min);
        let best_bound = open_bound.min(stalled).min(upper);

        match status {
            SearchStatus::Completed => info!(
                "search completed: {nodes_solved} nodes, best {:.4}",
                upper
            ),
            _ => warn!(
                "search stopped ({status:?}) after {nodes_solved} nodes: incumbent {upper:.4}, bound {best_bound:.4}"
            ),
        }

        Ok(SearchResult {
            status,
            incumbent,
            best_bound,
            nodes_solved,
            nodes_created: self.tree.len(),
        })
    }

    /// Classifies a solved, feasible node. Returns the arc to branch on, or
    /// `None` when the node is closed.
    fn visit(
        &self,
        id: NodeId,
        report: &NodeReport,
        evaluator: &RouteEvaluator<'_>,
        upper: &mut f64,
        incumbent: &mut Option<Solution>,
        stalled: &mut f64,
    ) -> Option<Arc> {
        let tol = self.instance.tolerance();
        let node = self.tree.node(id);
        if node.lower_bound() >= *upper - tol {
            debug!("node {id} pruned by bound {:.4}", node.lower_bound());
            return None;
        }

        if node.is_integral(tol) {
            if !report.converged {
                warn!("node {id} integral before pricing converged");
            }
            let candidate =
                Solution::from_routes(node.solution().iter().map(|(r, _)| r.clone()).collect());
            let (cost, violations) = evaluator.evaluate_solution(&candidate);
            if !violations.is_empty() {
                warn!("node {id} integral solution rejected: {} violations", violations.len());
            } else if cost < *upper - tol {
                info!("new incumbent {cost:.4} at node {id} (depth {})", node.depth());
                *upper = cost;
                *incumbent = Some(candidate);
            }
            return None;
        }

        let arc = select_branching_arc(node.fractional_arcs());
        if arc.is_none() {
            warn!("node {id} is fractional but has no fractional customer arc");
            *stalled = stalled.min(node.lower_bound());
        }
        arc
    }
}
