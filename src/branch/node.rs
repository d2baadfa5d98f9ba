//! Branch-and-price tree nodes.

use std::collections::BTreeMap;
use std::fmt;

use crate::models::{Arc, ArcSet, Instance, Route};

/// Index of a node in its [`SearchTree`](super::SearchTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The restriction that created a node from its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchDecision {
    /// The arc is removed from the arc set.
    Exclude(Arc),
    /// The arc is the only way out of its tail and into its head.
    Include(Arc),
}

impl BranchDecision {
    /// The arc branched on.
    pub fn arc(&self) -> Arc {
        match *self {
            BranchDecision::Exclude(arc) | BranchDecision::Include(arc) => arc,
        }
    }

    /// The child's arc set.
    pub fn restrict(&self, arcs: &ArcSet) -> ArcSet {
        match *self {
            BranchDecision::Exclude(arc) => arcs.without(arc),
            BranchDecision::Include(arc) => arcs.forcing(arc),
        }
    }

    /// Returns `true` if `route` is still valid under this decision.
    pub fn admits(&self, route: &Route) -> bool {
        match *self {
            BranchDecision::Exclude(arc) => !route.contains_arc(arc),
            BranchDecision::Include(arc) => !route.conflicts_with_arc(arc),
        }
    }
}

/// One subproblem of the search: a restricted arc set, its route pool, and
/// what column generation made of them.
#[derive(Debug, Clone)]
pub struct BranchNode {
    pub(crate) id: NodeId,
    pub(crate) arcs: ArcSet,
    pub(crate) routes: Vec<Route>,
    pub(crate) objective: Option<f64>,
    pub(crate) lower_bound: f64,
    pub(crate) fractional_arcs: BTreeMap<Arc, f64>,
    pub(crate) solution: Vec<(Route, f64)>,
    pub(crate) feasible: bool,
    pub(crate) depth: usize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) decision: Option<BranchDecision>,
}

impl BranchNode {
    /// The root: every instance arc and one round trip per customer.
    pub fn root(instance: &Instance) -> Self {
        Self {
            id: NodeId(0),
            arcs: instance.arcs().clone(),
            routes: instance.trivial_routes(),
            objective: None,
            lower_bound: 0.0,
            fractional_arcs: BTreeMap::new(),
            solution: Vec::new(),
            feasible: true,
            depth: 0,
            parent: None,
            children: Vec::new(),
            decision: None,
        }
    }

    /// A child of `parent` restricted by `decision`, inheriting the parent's
    /// bound and the routes the decision admits.
    pub(crate) fn child(id: NodeId, parent: &BranchNode, decision: BranchDecision) -> Self {
        Self {
            id,
            arcs: decision.restrict(&parent.arcs),
            routes: parent
                .routes
                .iter()
                .filter(|r| decision.admits(r))
                .cloned()
                .collect(),
            objective: None,
            lower_bound: parent.lower_bound,
            fractional_arcs: BTreeMap::new(),
            solution: Vec::new(),
            feasible: true,
            depth: parent.depth + 1,
            parent: Some(parent.id),
            children: Vec::new(),
            decision: Some(decision),
        }
    }

    /// Position in the tree; the root is `NodeId(0)`.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Arcs routes in this subtree may use.
    pub fn arcs(&self) -> &ArcSet {
        &self.arcs
    }

    /// The route pool. Empty once the node is closed.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Final master LP objective, once solved.
    pub fn objective(&self) -> Option<f64> {
        self.objective
    }

    /// Lower bound on any integral solution in this subtree. Never below the
    /// parent's.
    pub fn lower_bound(&self) -> f64 {
        self.lower_bound
    }

    /// Non-integral aggregated usage of customer-to-customer arcs.
    pub fn fractional_arcs(&self) -> &BTreeMap<Arc, f64> {
        &self.fractional_arcs
    }

    /// Routes with a positive value in the last master solution. Empty once
    /// the node is closed.
    pub fn solution(&self) -> &[(Route, f64)] {
        &self.solution
    }

    /// `false` once column generation found the master infeasible.
    pub fn is_feasible(&self) -> bool {
        self.feasible
    }

    /// Returns `true` if every route of the solution takes value one. Only
    /// meaningful between solving and closing the node.
    pub fn is_integral(&self, tolerance: f64) -> bool {
        self.objective.is_some()
            && self.feasible
            && self.solution.iter().all(|(_, v)| (v - 1.0).abs() <= tolerance)
    }

    /// Branching decisions between this node and the root.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// `None` at the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Exclusion child first, then inclusion child; empty unless branched.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// How this node was derived from its parent; `None` at the root.
    pub fn decision(&self) -> Option<BranchDecision> {
        self.decision
    }

    /// Drops the route pool and master solution of a closed node. Arcs,
    /// bounds, fractional arcs and tree links stay.
    pub(crate) fn release(&mut self) {
        self.routes = Vec::new();
        self.solution = Vec::new();
    }
}
