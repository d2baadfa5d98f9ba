//! Route entity.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Arc, Instance, DEPOT};
use crate::error::{BnpError, Result};

/// A vehicle route: a path that starts at the depot and implicitly returns
/// to it after its last entry.
///
/// `path[0]` is always the depot and the closing arc back to the depot is
/// never stored. Routes are immutable once built; a branch node's pool owns
/// them for the node's lifetime.
///
/// # Examples
///
/// ```
/// use u_bnp::models::{Customer, Instance, Route};
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 3.0, 4.0, 10.0),
///     Customer::new(2, 6.0, 8.0, 20.0),
/// ];
/// let instance = Instance::euclidean(&customers, 100.0).unwrap();
///
/// let route = Route::new(vec![0, 1, 2], &instance).unwrap();
/// // 0→1 = 5, 1→2 = 5, 2→0 = 10
/// assert!((route.cost() - 20.0).abs() < 1e-10);
/// assert_eq!(route.column(3), vec![1.0, 1.0]);
/// assert_eq!(route.to_string(), "0 -> 1 -> 2 -> 0");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    path: Vec<usize>,
    cost: f64,
}

impl Route {
    /// Builds a route and prices it by summing arc costs, closing arc
    /// included.
    ///
    /// Fails with [`BnpError::UndefinedArc`] if the path uses an arc the
    /// instance does not define.
    pub fn new(path: Vec<usize>, instance: &Instance) -> Result<Self> {
        let mut cost = 0.0;
        for arc in traversed_arcs(&path) {
            cost += instance.cost(arc).ok_or(BnpError::UndefinedArc {
                tail: arc.tail,
                head: arc.head,
            })?;
        }
        Ok(Self { path, cost })
    }

    /// Builds a route with an explicitly supplied cost.
    pub fn with_cost(path: Vec<usize>, cost: f64) -> Self {
        Self { path, cost }
    }

    /// Node sequence starting at the depot (closing depot not repeated).
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Route cost.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Customers in visit order.
    pub fn customers(&self) -> &[usize] {
        self.path.get(1..).unwrap_or(&[])
    }

    /// Number of customer visits.
    pub fn len(&self) -> usize {
        self.customers().len()
    }

    /// Returns `true` if the route visits no customer.
    pub fn is_empty(&self) -> bool {
        self.customers().is_empty()
    }

    /// Total demand served.
    pub fn demand(&self, instance: &Instance) -> f64 {
        self.customers().iter().map(|&c| instance.demand(c)).sum()
    }

    /// Returns `true` if no customer is visited twice.
    pub fn is_elementary(&self) -> bool {
        let customers = self.customers();
        let mut seen = vec![false; customers.iter().max().map_or(0, |&m| m + 1)];
        for &c in customers {
            if std::mem::replace(&mut seen[c], true) {
                return false;
            }
        }
        true
    }

    /// Master-problem column: entry `i - 1` counts the visits to customer `i`.
    pub fn column(&self, node_count: usize) -> Vec<f64> {
        let mut column = vec![0.0; node_count.saturating_sub(1)];
        for &c in self.customers() {
            if let Some(entry) = c.checked_sub(1).and_then(|i| column.get_mut(i)) {
                *entry += 1.0;
            }
        }
        column
    }

    /// Every arc the vehicle drives, depot legs and closing arc included.
    pub fn arcs(&self) -> impl Iterator<Item = Arc> + '_ {
        traversed_arcs(&self.path)
    }

    /// Arcs between two consecutive customers.
    pub fn customer_arcs(&self) -> impl Iterator<Item = Arc> + '_ {
        self.customers().windows(2).map(|w| Arc::new(w[0], w[1]))
    }

    /// Returns `true` if `arc` appears as two consecutive path entries.
    pub fn contains_arc(&self, arc: Arc) -> bool {
        self.path
            .windows(2)
            .any(|w| w[0] == arc.tail && w[1] == arc.head)
    }

    /// Returns `true` if the route visits an endpoint of `arc` without
    /// driving it: it leaves `arc.tail` towards another node, or reaches
    /// `arc.head` from another node.
    ///
    /// The successor of the last entry is the depot. The depot side of an arc
    /// never conflicts since every route passes through the depot.
    pub fn conflicts_with_arc(&self, arc: Arc) -> bool {
        self.path.iter().enumerate().any(|(k, &node)| {
            if node == DEPOT {
                return false;
            }
            let succ = self.path.get(k + 1).copied().unwrap_or(DEPOT);
            let pred = if k == 0 { DEPOT } else { self.path[k - 1] };
            (node == arc.tail && succ != arc.head) || (node == arc.head && pred != arc.tail)
        })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.path {
            write!(f, "{node} -> ")?;
        }
        write!(f, "{DEPOT}")
    }
}

fn traversed_arcs(path: &[usize]) -> impl Iterator<Item = Arc> + '_ {
    let closing = path.last().map(|&last| Arc::new(last, DEPOT));
    path.windows(2)
        .map(|w| Arc::new(w[0], w[1]))
        .chain(closing)
}
