//! [`LpSolver`] backed by Gurobi through the `grb` crate.

use grb::prelude::*;

use super::{LpModel, LpOutcome, LpSolution, LpSolver, Sense, VarKind};
use crate::error::{BnpError, Result};

fn solver_err(e: grb::Error) -> BnpError {
    BnpError::solver(e.to_string())
}

/// A Gurobi model mirroring one [`LpModel`].
struct Mirror {
    model_id: u64,
    model: Model,
    vars: Vec<Var>,
    constrs: Vec<Constr>,
}

/// Solves models with Gurobi.
///
/// The last built model is kept. When the next call passes the same
/// [`LpModel`] (same [`id`](LpModel::id), same rows) with extra variables,
/// only the new columns are appended, so the master problem is warm started
/// from the previous basis.
pub struct GurobiSolver {
    env: Env,
    mirror: Option<Mirror>,
}

impl GurobiSolver {
    /// Starts a silent Gurobi environment.
    pub fn new() -> Result<Self> {
        let mut env = Env::empty().map_err(solver_err)?;
        env.set(param::OutputFlag, 0).map_err(solver_err)?;
        let env = env.start().map_err(solver_err)?;
        Ok(Self { env, mirror: None })
    }

    fn build(&self, lp: &LpModel) -> Result<Mirror> {
        let mut model = Model::with_env(lp.name(), &self.env).map_err(solver_err)?;
        let mut vars = Vec::with_capacity(lp.num_vars());
        for (j, v) in lp.variables().iter().enumerate() {
            let vtype = match v.kind {
                VarKind::Continuous => VarType::Continuous,
                VarKind::Binary => VarType::Binary,
            };
            let var = model
                .add_var(&format!("x{j}"), vtype, v.obj, v.lb, v.ub, [])
                .map_err(solver_err)?;
            vars.push(var);
        }
        let mut constrs = Vec::with_capacity(lp.num_rows());
        for (i, row) in lp.rows().iter().enumerate() {
            let mut expr = grb::expr::LinExpr::new();
            for &(var, coef) in &row.terms {
                expr.add_term(coef, vars[var.0]);
            }
            let name = format!("r{i}");
            let constr = match row.sense {
                Sense::Le => model.add_constr(&name, c!(expr <= row.rhs)),
                Sense::Eq => model.add_constr(&name, c!(expr == row.rhs)),
                Sense::Ge => model.add_constr(&name, c!(expr >= row.rhs)),
            }
            .map_err(solver_err)?;
            constrs.push(constr);
        }
        Ok(Mirror {
            model_id: lp.id(),
            model,
            vars,
            constrs,
        })
    }

    fn extend(mirror: &mut Mirror, lp: &LpModel) -> Result<()> {
        let known = mirror.vars.len();
        let mut columns: Vec<Vec<(Constr, f64)>> = vec![Vec::new(); lp.num_vars() - known];
        for (i, row) in lp.rows().iter().enumerate() {
            for &(var, coef) in &row.terms {
                if var.0 >= known {
                    columns[var.0 - known].push((mirror.constrs[i], coef));
                }
            }
        }
        for (offset, column) in columns.into_iter().enumerate() {
            let j = known + offset;
            let v = &lp.variables()[j];
            let vtype = match v.kind {
                VarKind::Continuous => VarType::Continuous,
                VarKind::Binary => VarType::Binary,
            };
            let var = mirror
                .model
                .add_var(&format!("x{j}"), vtype, v.obj, v.lb, v.ub, column)
                .map_err(solver_err)?;
            mirror.vars.push(var);
        }
        Ok(())
    }
}

impl LpSolver for GurobiSolver {
    fn solve(&mut self, lp: &LpModel) -> Result<LpOutcome> {
        let reusable = self.mirror.as_ref().is_some_and(|m| {
            m.model_id == lp.id() && m.constrs.len() == lp.num_rows() && m.vars.len() <= lp.num_vars()
        });
        let mut mirror = match self.mirror.take() {
            Some(mut m) if reusable => {
                Self::extend(&mut m, lp)?;
                m
            }
            _ => self.build(lp)?,
        };

        mirror.model.optimize().map_err(solver_err)?;
        let outcome = match mirror.model.status().map_err(solver_err)? {
            Status::Optimal => {
                let objective = mirror.model.get_attr(attr::ObjVal).map_err(solver_err)?;
                let values = mirror
                    .model
                    .get_obj_attr_batch(attr::X, mirror.vars.clone())
                    .map_err(solver_err)?;
                let duals = if lp.is_mip() {
                    None
                } else {
                    Some(
                        mirror
                            .model
                            .get_obj_attr_batch(attr::Pi, mirror.constrs.clone())
                            .map_err(solver_err)?,
                    )
                };
                LpOutcome::Optimal(LpSolution {
                    objective,
                    values,
                    duals,
                })
            }
            Status::Infeasible | Status::InfOrUnbd => LpOutcome::Infeasible,
            status => {
                return Err(BnpError::solver(format!(
                    "model {} ended with status {status:?}",
                    lp.name()
                )))
            }
        };
        self.mirror = Some(mirror);
        Ok(outcome)
    }
}
