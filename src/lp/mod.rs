//! Linear and mixed-integer models handed to an external optimizer.
//!
//! [`LpModel`] is a solver-independent description: variables with bounds,
//! objective coefficient and kind, plus linear rows with a sense and a
//! right-hand side. An [`LpSolver`] turns it into an [`LpOutcome`]. The
//! master problem grows one column at a time through
//! [`LpModel::add_column`], so a solver may keep its own copy of a model
//! between calls and only append what changed (see [`LpModel::id`]).
//!
//! [`ScipSolver`] solves models with SCIP and is always available;
//! `GurobiSolver` needs the `gurobi` feature and a license.
//!
//! # Examples
//!
//! ```
//! use u_bnp::lp::{LpModel, Sense, VarKind};
//!
//! let mut model = LpModel::new("cover");
//! let x = model.add_var(3.0, 0.0, 1.0, VarKind::Continuous);
//! let row = model.add_row(vec![(x, 1.0)], Sense::Eq, 1.0);
//! let y = model.add_column(2.0, 0.0, 1.0, [(row, 1.0)]);
//!
//! assert_eq!(model.num_vars(), 2);
//! assert_eq!(model.rows()[row.0].terms, vec![(x, 1.0), (y, 1.0)]);
//! assert!(!model.is_mip());
//! ```

#[cfg(feature = "gurobi")]
mod gurobi;
mod scip;

#[cfg(feature = "gurobi")]
pub use gurobi::GurobiSolver;
pub use scip::ScipSolver;

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;

static NEXT_MODEL_ID: AtomicU64 = AtomicU64::new(0);

/// Index of a variable in its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

/// Index of a row in its model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(pub usize);

/// Domain of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Any real value within the bounds.
    Continuous,
    /// 0 or 1.
    Binary,
}

/// Sense of a linear row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// `Σ a·x ≤ rhs`
    Le,
    /// `Σ a·x = rhs`
    Eq,
    /// `Σ a·x ≥ rhs`
    Ge,
}

/// A decision variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Objective coefficient (minimized).
    pub obj: f64,
    /// Lower bound.
    pub lb: f64,
    /// Upper bound, possibly `f64::INFINITY`.
    pub ub: f64,
    /// Domain.
    pub kind: VarKind,
}

/// A linear row `Σ coef·var (sense) rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Non-zero coefficients.
    pub terms: Vec<(VarId, f64)>,
    /// Row sense.
    pub sense: Sense,
    /// Right-hand side.
    pub rhs: f64,
}

/// A minimization model.
#[derive(Debug)]
pub struct LpModel {
    id: u64,
    name: String,
    vars: Vec<Variable>,
    rows: Vec<Row>,
}

impl LpModel {
    /// Creates an empty model with a process-unique id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            vars: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Process-unique identity of this model. Two solves of a model with the
    /// same id see the same rows and a superset of the earlier variables.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Model name, forwarded to the optimizer.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a variable that does not appear in any row yet.
    pub fn add_var(&mut self, obj: f64, lb: f64, ub: f64, kind: VarKind) -> VarId {
        self.vars.push(Variable { obj, lb, ub, kind });
        VarId(self.vars.len() - 1)
    }

    /// Adds a row over existing variables.
    pub fn add_row(&mut self, terms: Vec<(VarId, f64)>, sense: Sense, rhs: f64) -> RowId {
        self.rows.push(Row { terms, sense, rhs });
        RowId(self.rows.len() - 1)
    }

    /// Adds a continuous variable together with its coefficients in existing
    /// rows. Zero coefficients are skipped.
    pub fn add_column(
        &mut self,
        obj: f64,
        lb: f64,
        ub: f64,
        coeffs: impl IntoIterator<Item = (RowId, f64)>,
    ) -> VarId {
        let var = self.add_var(obj, lb, ub, VarKind::Continuous);
        for (row, coef) in coeffs {
            if coef != 0.0 {
                self.rows[row.0].terms.push((var, coef));
            }
        }
        var
    }

    /// The variables, indexed by [`VarId`].
    pub fn variables(&self) -> &[Variable] {
        &self.vars
    }

    /// The rows, indexed by [`RowId`].
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of variables.
    pub fn num_vars(&self) -> usize {
        self.vars.len()
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if any variable is binary.
    pub fn is_mip(&self) -> bool {
        self.vars.iter().any(|v| v.kind == VarKind::Binary)
    }
}

/// An optimal primal (and, for pure LPs, dual) solution.
#[derive(Debug, Clone, PartialEq)]
pub struct LpSolution {
    /// Objective value.
    pub objective: f64,
    /// Primal value per variable.
    pub values: Vec<f64>,
    /// Dual value per row; `None` for mixed-integer models.
    pub duals: Option<Vec<f64>>,
}

impl LpSolution {
    /// Primal value of `var`.
    pub fn value(&self, var: VarId) -> f64 {
        self.values[var.0]
    }

    /// Dual value of `row`, if duals are available.
    pub fn dual(&self, row: RowId) -> Option<f64> {
        self.duals.as_ref().map(|d| d[row.0])
    }
}

/// Result of a successful optimizer call.
#[derive(Debug, Clone, PartialEq)]
pub enum LpOutcome {
    /// Solved to optimality.
    Optimal(LpSolution),
    /// The model has no feasible point.
    Infeasible,
}

/// An optimizer able to solve [`LpModel`]s.
///
/// Any failure other than proven infeasibility (licensing, numerical
/// trouble, unboundedness) is an error, reported as
/// [`BnpError::Solver`](crate::error::BnpError::Solver).
pub trait LpSolver {
    /// Solves `model` to optimality.
    fn solve(&mut self, model: &LpModel) -> Result<LpOutcome>;
}

impl<S: LpSolver + ?Sized> LpSolver for &mut S {
    fn solve(&mut self, model: &LpModel) -> Result<LpOutcome> {
        (**self).solve(model)
    }
}

impl<S: LpSolver + ?Sized> LpSolver for Box<S> {
    fn solve(&mut self, model: &LpModel) -> Result<LpOutcome> {
        (**self).solve(model)
    }
}
