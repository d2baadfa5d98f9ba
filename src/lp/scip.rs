//! [`LpSolver`] backed by SCIP through the `russcip` crate.

use log::trace;
use russcip::prelude::*;
use russcip::{Model, ParamSetting, ProblemCreated, Retcode, Status, Variable};

use super::{LpModel, LpOutcome, LpSolution, LpSolver, Sense, VarKind};
use crate::error::{BnpError, Result};

fn solver_err(e: Retcode) -> BnpError {
    BnpError::solver(format!("SCIP returned {e:?}"))
}

fn row_name(i: usize) -> String {
    format!("r{i}")
}

/// Solves models with SCIP.
///
/// Every call builds a fresh SCIP problem. Continuous models are solved with
/// presolving, propagation, separation and heuristics switched off so that
/// the root LP is the model itself and its row duals can be read back.
/// Models with binary variables go through the full branch-and-cut and come
/// back without duals.
///
/// # Examples
///
/// ```
/// use u_bnp::lp::{LpModel, LpOutcome, LpSolver, ScipSolver, Sense, VarKind};
///
/// // min 2x + 3y  s.t.  x + y >= 3,  x <= 2
/// let mut model = LpModel::new("demo");
/// let x = model.add_var(2.0, 0.0, f64::INFINITY, VarKind::Continuous);
/// let y = model.add_var(3.0, 0.0, f64::INFINITY, VarKind::Continuous);
/// let cover = model.add_row(vec![(x, 1.0), (y, 1.0)], Sense::Ge, 3.0);
/// model.add_row(vec![(x, 1.0)], Sense::Le, 2.0);
///
/// let LpOutcome::Optimal(solution) = ScipSolver::new().solve(&model)? else {
///     panic!("feasible model");
/// };
/// assert!((solution.objective - 7.0).abs() < 1e-6);
/// assert!((solution.dual(cover).unwrap() - 3.0).abs() < 1e-6);
/// # Ok::<(), u_bnp::error::BnpError>(())
/// ```
#[derive(Debug, Default)]
pub struct ScipSolver {
    solves: usize,
}

impl ScipSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of models solved so far.
    pub fn solves(&self) -> usize {
        self.solves
    }

    fn settings(lp: &LpModel) -> Result<Model<ProblemCreated>> {
        let model = Model::default().hide_output().minimize();
        if lp.is_mip() {
            return Ok(model);
        }
        model
            .set_presolving(ParamSetting::Off)
            .set_separating(ParamSetting::Off)
            .set_heuristics(ParamSetting::Off)
            .set_int_param("propagating/maxrounds", 0)
            .and_then(|m| m.set_int_param("propagating/maxroundsroot", 0))
            .map_err(solver_err)
    }
}

impl LpSolver for ScipSolver {
    fn solve(&mut self, lp: &LpModel) -> Result<LpOutcome> {
        self.solves += 1;
        let mut model = Self::settings(lp)?;

        let vars: Vec<Variable> = lp
            .variables()
            .iter()
            .enumerate()
            .map(|(j, v)| {
                let name = format!("x{j}");
                let builder = match v.kind {
                    VarKind::Continuous => var().cont(v.lb..=v.ub),
                    VarKind::Binary => var().bin(),
                };
                model.add(builder.obj(v.obj).name(&name))
            })
            .collect();

        for (i, row) in lp.rows().iter().enumerate() {
            let name = row_name(i);
            let builder = cons()
                .name(&name)
                .expr(row.terms.iter().map(|&(var, coef)| (&vars[var.0], coef)));
            match row.sense {
                Sense::Le => model.add(builder.le(row.rhs)),
                Sense::Eq => model.add(builder.eq(row.rhs)),
                Sense::Ge => model.add(builder.ge(row.rhs)),
            };
        }

        let solved = model.solve();
        let status = solved.status();
        trace!("SCIP finished {} with status {status:?}", lp.name());
        match status {
            Status::Optimal => {}
            Status::Infeasible | Status::Inforunbd => return Ok(LpOutcome::Infeasible),
            status => {
                return Err(BnpError::solver(format!(
                    "model {} ended with status {status:?}",
                    lp.name()
                )))
            }
        }

        let solution = solved
            .best_sol()
            .ok_or_else(|| BnpError::solver(format!("model {} is optimal without a solution", lp.name())))?;
        let values = vars.iter().map(|v| solution.val(v)).collect();
        let duals = if lp.is_mip() {
            None
        } else {
            let duals = (0..lp.num_rows())
                .map(|i| {
                    solved
                        .find_cons(&row_name(i))
                        .map(|c| c.dual_sol())
                        .ok_or_else(|| BnpError::solver(format!("row {i} vanished from the SCIP model")))
                })
                .collect::<Result<Vec<f64>>>()?;
            Some(duals)
        };

        Ok(LpOutcome::Optimal(LpSolution {
            objective: solved.obj_val(),
            values,
            duals,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::{RowId, VarId};

    #[test]
    fn test_lp_duals() {
        // min -x - y  s.t.  x + 2y <= 4,  3x + y <= 6
        let mut model = LpModel::new("lp");
        let x = model.add_var(-1.0, 0.0, f64::INFINITY, VarKind::Continuous);
        let y = model.add_var(-1.0, 0.0, f64::INFINITY, VarKind::Continuous);
        model.add_row(vec![(x, 1.0), (y, 2.0)], Sense::Le, 4.0);
        model.add_row(vec![(x, 3.0), (y, 1.0)], Sense::Le, 6.0);
        let mut solver = ScipSolver::new();
        let LpOutcome::Optimal(sol) = solver.solve(&model).expect("ok") else {
            panic!("expected optimum");
        };
        assert_eq!(solver.solves(), 1);
        assert!((sol.value(x) - 1.6).abs() < 1e-6);
        assert!((sol.value(y) - 1.2).abs() < 1e-6);
        assert!((sol.objective + 2.8).abs() < 1e-6);
        // Minimization with <= rows: non-positive prices.
        assert!((sol.dual(RowId(0)).unwrap() + 0.4).abs() < 1e-6);
        assert!((sol.dual(RowId(1)).unwrap() + 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_equality_row_price() {
        // min 3a + 2b  s.t.  a + b = 1, both in [0, 1]
        let mut model = LpModel::new("eq");
        let row = model.add_row(Vec::new(), Sense::Eq, 1.0);
        model.add_column(3.0, 0.0, 1.0, [(row, 1.0)]);
        let b = model.add_column(2.0, 0.0, 1.0, [(row, 1.0)]);
        let LpOutcome::Optimal(sol) = ScipSolver::new().solve(&model).expect("ok") else {
            panic!("expected optimum");
        };
        assert!((sol.objective - 2.0).abs() < 1e-6);
        assert!((sol.value(b) - 1.0).abs() < 1e-6);
        // The bound on b is degenerate: any price in [2, 3] is optimal.
        let y = sol.dual(row).unwrap();
        assert!((2.0 - 1e-6..=3.0 + 1e-6).contains(&y));
    }

    #[test]
    fn test_infeasible_model() {
        let mut model = LpModel::new("inf");
        let x = model.add_var(1.0, 0.0, 1.0, VarKind::Continuous);
        model.add_row(vec![(x, 1.0)], Sense::Ge, 2.0);
        assert_eq!(ScipSolver::new().solve(&model).expect("ok"), LpOutcome::Infeasible);
    }

    #[test]
    fn test_empty_equality_row_is_infeasible() {
        let mut model = LpModel::new("uncovered");
        let row = model.add_row(Vec::new(), Sense::Eq, 1.0);
        model.add_column(1.0, 0.0, 1.0, [(row, 1.0)]);
        model.add_row(Vec::new(), Sense::Eq, 1.0);
        assert_eq!(ScipSolver::new().solve(&model).expect("ok"), LpOutcome::Infeasible);
    }

    #[test]
    fn test_binary_knapsack() {
        // max 5a + 4b + 3c  s.t.  2a + 3b + c <= 4
        let mut model = LpModel::new("knap");
        let vars: Vec<VarId> = [-5.0, -4.0, -3.0]
            .iter()
            .map(|&c| model.add_var(c, 0.0, 1.0, VarKind::Binary))
            .collect();
        model.add_row(
            vec![(vars[0], 2.0), (vars[1], 3.0), (vars[2], 1.0)],
            Sense::Le,
            4.0,
        );
        let LpOutcome::Optimal(sol) = ScipSolver::new().solve(&model).expect("ok") else {
            panic!("expected optimum");
        };
        assert!((sol.objective + 8.0).abs() < 1e-6);
        let rounded: Vec<f64> = sol.values.iter().map(|v| v.round()).collect();
        assert_eq!(rounded, vec![1.0, 0.0, 1.0]);
        assert_eq!(sol.duals, None);
    }
}
