//! Dense arc-cost matrix with undefined entries.

use crate::models::{Arc, Customer};

/// A dense n×n arc-cost matrix stored in row-major order.
///
/// Unlike a plain distance matrix, entries may be undefined: an instance's
/// arc set is usually a subset of all ordered pairs, and an undefined entry
/// means the arc does not exist.
///
/// # Examples
///
/// ```
/// use u_bnp::models::Customer;
/// use u_bnp::distance::ArcCosts;
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 3.0, 4.0, 10.0),
///     Customer::new(2, 6.0, 8.0, 20.0),
/// ];
/// let costs = ArcCosts::from_customers(&customers);
/// assert!((costs.get(0, 1).unwrap() - 5.0).abs() < 1e-10);
/// assert_eq!(costs.get(1, 1), None);
/// assert_eq!(costs.size(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ArcCosts {
    data: Vec<Option<f64>>,
    size: usize,
}

impl ArcCosts {
    /// Creates a matrix of the given size with every arc undefined.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![None; size * size],
            size,
        }
    }

    /// Euclidean costs between every ordered pair of distinct locations.
    pub fn from_customers(customers: &[Customer]) -> Self {
        let n = customers.len();
        let mut costs = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let d = customers[i].distance_to(&customers[j]);
                costs.set(i, j, d);
                costs.set(j, i, d);
            }
        }
        costs
    }

    /// Creates a complete matrix from an explicit n×n grid.
    ///
    /// Diagonal entries are ignored (self loops are never arcs). Returns
    /// `None` if the data length doesn't match `size * size`.
    pub fn from_data(size: usize, data: &[f64]) -> Option<Self> {
        if data.len() != size * size {
            return None;
        }
        let mut costs = Self::new(size);
        for i in 0..size {
            for j in 0..size {
                if i != j {
                    costs.set(i, j, data[i * size + j]);
                }
            }
        }
        Some(costs)
    }

    /// Cost of arc `from → to`, or `None` if the arc is undefined.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> Option<f64> {
        self.data[from * self.size + to]
    }

    /// Defines the cost of arc `from → to`.
    pub fn set(&mut self, from: usize, to: usize, cost: f64) {
        self.data[from * self.size + to] = Some(cost);
    }

    /// Removes arc `from → to`.
    pub fn unset(&mut self, from: usize, to: usize) {
        self.data[from * self.size + to] = None;
    }

    /// Number of locations in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Iterates over every defined arc with its cost, in row-major order.
    pub fn arcs(&self) -> impl Iterator<Item = (Arc, f64)> + '_ {
        self.data.iter().enumerate().filter_map(move |(idx, c)| {
            c.map(|cost| (Arc::new(idx / self.size, idx % self.size), cost))
        })
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    ///
    /// An arc defined in one direction only breaks symmetry.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                match (self.get(i, j), self.get(j, i)) {
                    (Some(a), Some(b)) if (a - b).abs() <= tol => {}
                    (None, None) => {}
                    _ => return false,
                }
            }
        }
        true
    }
}
