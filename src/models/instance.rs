//! Immutable CVRP instance data.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::{Arc, ArcSet, Customer, Route, DEPOT};
use crate::distance::ArcCosts;
use crate::error::{BnpError, Result};

/// Default numeric tolerance for feasibility, integrality and reduced-cost
/// cutoffs.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// A validated CVRP instance: a directed graph with arc costs, customer
/// demands and one vehicle capacity.
///
/// Node 0 is the depot, nodes `1..node_count` are customers. Construction
/// fails fast with [`BnpError::MalformedInstance`] when the data could not
/// support a search: every component downstream relies on the checks made
/// here and never re-validates.
///
/// # Examples
///
/// ```
/// use u_bnp::models::{Customer, Instance};
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 3.0, 4.0, 10.0),
///     Customer::new(2, 6.0, 8.0, 20.0),
/// ];
/// let instance = Instance::euclidean(&customers, 50.0).unwrap();
/// assert_eq!(instance.node_count(), 3);
/// assert_eq!(instance.num_customers(), 2);
/// assert!((instance.arc_cost(0, 1).unwrap() - 5.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct Instance {
    costs: ArcCosts,
    arcs: ArcSet,
    demands: Vec<f64>,
    capacity: f64,
    tolerance: f64,
}

impl Instance {
    /// Creates an instance from per-node demands (index 0 = depot) and an
    /// arc-cost matrix. Every defined matrix entry becomes an arc.
    pub fn new(demands: Vec<f64>, capacity: f64, costs: ArcCosts) -> Result<Self> {
        let arcs = ArcSet::new(costs.size(), costs.arcs().map(|(arc, _)| arc));
        let instance = Self {
            costs,
            arcs,
            demands,
            capacity,
            tolerance: DEFAULT_TOLERANCE,
        };
        instance.validate()?;
        Ok(instance)
    }

    /// Creates a complete Euclidean instance from customer coordinates.
    ///
    /// `customers[i]` must have id `i`; customer 0 is the depot.
    pub fn euclidean(customers: &[Customer], capacity: f64) -> Result<Self> {
        if let Some((idx, c)) = customers.iter().enumerate().find(|(i, c)| c.id() != *i) {
            return Err(BnpError::malformed(format!(
                "customer at position {idx} has id {}",
                c.id()
            )));
        }
        let demands = customers.iter().map(Customer::demand).collect();
        Self::new(demands, capacity, ArcCosts::from_customers(customers))
    }

    /// Replaces the numeric tolerance (default [`DEFAULT_TOLERANCE`]).
    pub fn with_tolerance(mut self, tolerance: f64) -> Result<Self> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(BnpError::malformed(format!(
                "tolerance must be positive, got {tolerance}"
            )));
        }
        self.tolerance = tolerance;
        Ok(self)
    }

    /// Parses the JSON layout `{ "demand": {...}, "arcs": [[i, j], ...],
    /// "cost": [...], "capacity": q }`.
    #[cfg(feature = "json")]
    pub fn from_json_str(json: &str) -> Result<Self> {
        let data: InstanceData = serde_json::from_str(json)?;
        Self::try_from(data)
    }

    fn validate(&self) -> Result<()> {
        let n = self.demands.len();
        if n < 2 {
            return Err(BnpError::malformed(format!(
                "need a depot and at least one customer, got {n} nodes"
            )));
        }
        if self.costs.size() != n {
            return Err(BnpError::malformed(format!(
                "cost matrix covers {} nodes but {n} demands were given",
                self.costs.size()
            )));
        }
        if !self.capacity.is_finite() || self.capacity <= 0.0 {
            return Err(BnpError::malformed(format!(
                "capacity must be positive, got {}",
                self.capacity
            )));
        }
        if self.demands[DEPOT] != 0.0 {
            return Err(BnpError::malformed("depot demand must be zero"));
        }
        for (node, &d) in self.demands.iter().enumerate().skip(1) {
            if !d.is_finite() || d < 0.0 {
                return Err(BnpError::malformed(format!(
                    "customer {node} has invalid demand {d}"
                )));
            }
            if d > self.capacity {
                return Err(BnpError::malformed(format!(
                    "customer {node} demands {d}, more than capacity {}",
                    self.capacity
                )));
            }
        }
        for (arc, cost) in self.costs.arcs() {
            if arc.tail == arc.head {
                return Err(BnpError::malformed(format!("self loop at node {}", arc.tail)));
            }
            if !cost.is_finite() || cost < 0.0 {
                return Err(BnpError::malformed(format!(
                    "arc {arc} has invalid cost {cost}"
                )));
            }
        }
        for customer in self.customers() {
            if !self.arcs.contains(Arc::new(DEPOT, customer))
                || !self.arcs.contains(Arc::new(customer, DEPOT))
            {
                return Err(BnpError::malformed(format!(
                    "customer {customer} cannot be served by a round trip from the depot"
                )));
            }
        }
        Ok(())
    }

    /// Number of nodes, depot included.
    pub fn node_count(&self) -> usize {
        self.demands.len()
    }

    /// Number of customers (excluding depot).
    pub fn num_customers(&self) -> usize {
        self.demands.len() - 1
    }

    /// Customer node ids.
    pub fn customers(&self) -> Range<usize> {
        1..self.demands.len()
    }

    /// The full arc set.
    pub fn arcs(&self) -> &ArcSet {
        &self.arcs
    }

    /// The underlying cost matrix.
    pub fn costs(&self) -> &ArcCosts {
        &self.costs
    }

    /// Cost of `arc`, or `None` if the arc is not part of the instance.
    #[inline]
    pub fn cost(&self, arc: Arc) -> Option<f64> {
        self.arc_cost(arc.tail, arc.head)
    }

    /// Cost of arc `tail → head`, or `None` if undefined or out of range.
    #[inline]
    pub fn arc_cost(&self, tail: usize, head: usize) -> Option<f64> {
        let n = self.node_count();
        if tail >= n || head >= n {
            return None;
        }
        self.costs.get(tail, head)
    }

    /// Demand of `node` (zero for the depot).
    #[inline]
    pub fn demand(&self, node: usize) -> f64 {
        self.demands[node]
    }

    /// Vehicle capacity.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Numeric tolerance for feasibility, integrality and cost cutoffs.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// One depot → customer → depot route per customer.
    ///
    /// These seed the root node's route pool and keep every master problem
    /// that still contains them feasible.
    pub fn trivial_routes(&self) -> Vec<Route> {
        self.customers()
            .map(|c| {
                let cost = self.costs.get(DEPOT, c).unwrap_or_default()
                    + self.costs.get(c, DEPOT).unwrap_or_default();
                Route::with_cost(vec![DEPOT, c], cost)
            })
            .collect()
    }
}

/// Raw, unvalidated instance layout as stored on disk.
///
/// `demand` maps customer ids `1..n` to their demand (the depot is implied),
/// `arcs[k]` is priced by `cost[k]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceData {
    /// Customer id → demand.
    pub demand: BTreeMap<usize, f64>,
    /// Arcs as `[tail, head]` pairs.
    pub arcs: Vec<[usize; 2]>,
    /// Cost of each arc, aligned with `arcs`.
    pub cost: Vec<f64>,
    /// Vehicle capacity.
    pub capacity: f64,
    /// Optional numeric tolerance override.
    #[serde(default)]
    pub tolerance: Option<f64>,
}

impl TryFrom<InstanceData> for Instance {
    type Error = BnpError;

    fn try_from(data: InstanceData) -> Result<Self> {
        let node_count = data.demand.len() + 1;
        let mut demands = vec![0.0; node_count];
        for node in 1..node_count {
            demands[node] = *data
                .demand
                .get(&node)
                .ok_or_else(|| BnpError::malformed(format!("no demand for customer {node}")))?;
        }
        if data.arcs.len() != data.cost.len() {
            return Err(BnpError::malformed(format!(
                "{} arcs but {} costs",
                data.arcs.len(),
                data.cost.len()
            )));
        }
        let mut costs = ArcCosts::new(node_count);
        for (&[tail, head], &cost) in data.arcs.iter().zip(&data.cost) {
            if tail >= node_count || head >= node_count {
                return Err(BnpError::malformed(format!(
                    "arc ({tail}, {head}) references a node outside 0..{node_count}"
                )));
            }
            if tail == head {
                return Err(BnpError::malformed(format!("self loop at node {tail}")));
            }
            if costs.get(tail, head).is_some() {
                return Err(BnpError::malformed(format!("arc ({tail}, {head}) listed twice")));
            }
            costs.set(tail, head, cost);
        }
        let instance = Instance::new(demands, data.capacity, costs)?;
        match data.tolerance {
            Some(tol) => instance.with_tolerance(tol),
            None => Ok(instance),
        }
    }
}
