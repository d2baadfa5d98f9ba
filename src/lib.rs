//! # u-bnp
//!
//! Branch-and-price for the capacitated vehicle routing problem (CVRP).
//!
//! Every node of the search tree solves the LP relaxation of a set
//! partitioning master by column generation. New routes come from a
//! pricing oracle: a label-setting search over the node's arcs, or an exact
//! arc-flow model handed to the LP solver. Fractional nodes are split on a
//! customer-to-customer arc.
//!
//! ## Modules
//!
//! - [`models`]: instance, arcs, routes and integral solutions
//! - [`distance`]: arc cost matrix
//! - [`evaluation`]: route and solution feasibility checking
//! - [`lp`]: LP/MIP model and the solver contract (Gurobi behind `gurobi`)
//! - [`pricing`]: label-setting and compact pricing oracles
//! - [`colgen`]: column generation over one branch node
//! - [`branch`]: branch nodes, arc branching and best-bound search
//! - [`config`]: tuning knobs for all of the above
//! - [`error`]: the crate error type

pub mod branch;
pub mod colgen;
pub mod config;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod lp;
pub mod models;
pub mod pricing;

#[cfg(test)]
pub(crate) mod test_utils;
