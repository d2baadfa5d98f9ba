//! Route evaluator that checks feasibility against an instance.

use crate::models::{Instance, Route, Solution, Violation, ViolationType, DEPOT};

/// Checks routes and solutions against the instance: capacity, arc
/// existence, depot anchoring and (for solutions) exact customer coverage.
///
/// # Examples
///
/// ```
/// use u_bnp::models::{Customer, Instance, Route, Solution};
/// use u_bnp::evaluation::RouteEvaluator;
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 3.0, 4.0, 10.0),
///     Customer::new(2, 6.0, 8.0, 20.0),
/// ];
/// let instance = Instance::euclidean(&customers, 100.0).unwrap();
/// let evaluator = RouteEvaluator::new(&instance);
///
/// let route = Route::new(vec![0, 1, 2], &instance).unwrap();
/// assert!(evaluator.check_route(&route, 0).is_empty());
///
/// let (cost, violations) = evaluator.evaluate_solution(&Solution::from_routes(vec![route]));
/// assert!((cost - 20.0).abs() < 1e-10);
/// assert!(violations.is_empty());
/// ```
pub struct RouteEvaluator<'a> {
    instance: &'a Instance,
}

impl<'a> RouteEvaluator<'a> {
    /// Creates a new evaluator for the given instance.
    pub fn new(instance: &'a Instance) -> Self {
        Self { instance }
    }

    /// Returns the violations of a single route; `route_index` is copied into
    /// the reported violations.
    pub fn check_route(&self, route: &Route, route_index: usize) -> Vec<Violation> {
        let mut violations = Vec::new();

        if route.path().first() != Some(&DEPOT) {
            violations.push(Violation::new(ViolationType::NotStartingAtDepot { route_index }));
        }

        for arc in route.arcs() {
            if self.instance.cost(arc).is_none() {
                violations.push(Violation::new(ViolationType::UndefinedArc { route_index, arc }));
            }
        }

        let load = route
            .customers()
            .iter()
            .filter(|&&c| c < self.instance.node_count())
            .map(|&c| self.instance.demand(c))
            .sum::<f64>();
        if load > self.instance.capacity() + self.instance.tolerance() {
            violations.push(Violation::new(ViolationType::CapacityExceeded {
                route_index,
                load,
                capacity: self.instance.capacity(),
            }));
        }

        violations
    }

    /// Evaluates an entire solution, returning its cost and every violation,
    /// including customers served zero or several times.
    pub fn evaluate_solution(&self, solution: &Solution) -> (f64, Vec<Violation>) {
        let mut violations = Vec::new();
        let mut visits = vec![0usize; self.instance.node_count()];

        for (idx, route) in solution.routes().iter().enumerate() {
            violations.extend(self.check_route(route, idx));
            for &c in route.customers() {
                if let Some(v) = visits.get_mut(c) {
                    *v += 1;
                }
            }
        }

        for customer_id in self.instance.customers() {
            match visits[customer_id] {
                0 => violations.push(Violation::new(ViolationType::NotCovered { customer_id })),
                1 => {}
                n => violations.push(Violation::new(ViolationType::CoveredTwice {
                    customer_id,
                    visits: n,
                })),
            }
        }

        (solution.total_cost(), violations)
    }
}
