//! Integral solutions and violation types.

use serde::{Deserialize, Serialize};

use super::{Arc, Route};

/// A type of constraint violation in a route or solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Vehicle capacity exceeded.
    CapacityExceeded {
        /// Route index in the solution.
        route_index: usize,
        /// Load that exceeded capacity.
        load: f64,
        /// Vehicle capacity.
        capacity: f64,
    },
    /// The route drives an arc the instance does not define.
    UndefinedArc {
        /// Route index in the solution.
        route_index: usize,
        /// The missing arc.
        arc: Arc,
    },
    /// The route does not start at the depot.
    NotStartingAtDepot {
        /// Route index in the solution.
        route_index: usize,
    },
    /// A customer is served by no route.
    NotCovered {
        /// Customer id.
        customer_id: usize,
    },
    /// A customer is served more than once.
    CoveredTwice {
        /// Customer id.
        customer_id: usize,
        /// Number of visits found.
        visits: usize,
    },
}

/// A constraint violation in a solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// The type of violation.
    pub kind: ViolationType,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationType) -> Self {
        Self { kind }
    }
}

/// An integral CVRP solution: a set of routes covering every customer once.
///
/// # Examples
///
/// ```
/// use u_bnp::models::{Route, Solution};
///
/// let mut sol = Solution::new();
/// sol.add_route(Route::with_cost(vec![0, 1, 2], 12.0));
/// sol.add_route(Route::with_cost(vec![0, 3], 4.0));
/// assert_eq!(sol.num_routes(), 2);
/// assert_eq!(sol.num_served(), 3);
/// assert!((sol.total_cost() - 16.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    routes: Vec<Route>,
}

impl Solution {
    /// Creates an empty solution.
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Builds a solution from its routes.
    pub fn from_routes(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Adds a route to this solution.
    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Returns the routes in this solution.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Returns the number of routes (vehicles used).
    pub fn num_routes(&self) -> usize {
        self.routes.len()
    }

    /// Sum of route costs.
    pub fn total_cost(&self) -> f64 {
        self.routes.iter().map(Route::cost).sum()
    }

    /// Total number of customer visits across all routes.
    pub fn num_served(&self) -> usize {
        self.routes.iter().map(Route::len).sum()
    }
}
