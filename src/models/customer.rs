//! Customer locations for building Euclidean instances.

use serde::{Deserialize, Serialize};

use super::DEPOT;

/// A point in the plane with a demand. Position [`DEPOT`] in a customer list
/// is the depot.
///
/// Coordinates only feed [`ArcCosts::from_customers`](crate::distance::ArcCosts::from_customers);
/// the search works on the resulting [`Instance`](super::Instance).
///
/// # Examples
///
/// ```
/// use u_bnp::models::Customer;
///
/// let depot = Customer::depot(35.0, 35.0);
/// let c = Customer::new(1, 38.0, 39.0, 10.0);
/// assert!(depot.is_depot());
/// assert_eq!(c.position(), (38.0, 39.0));
/// assert!((depot.distance_to(&c) - 5.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    id: usize,
    x: f64,
    y: f64,
    demand: f64,
}

impl Customer {
    pub fn new(id: usize, x: f64, y: f64, demand: f64) -> Self {
        Self { id, x, y, demand }
    }

    /// The depot: id [`DEPOT`], no demand.
    pub fn depot(x: f64, y: f64) -> Self {
        Self::new(DEPOT, x, y, 0.0)
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_depot(&self) -> bool {
        self.id == DEPOT
    }

    /// `(x, y)` coordinates.
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn demand(&self) -> f64 {
        self.demand
    }

    /// Straight-line distance, used as the cost of both arcs between the two
    /// points.
    pub fn distance_to(&self, other: &Customer) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}
