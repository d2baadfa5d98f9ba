//! Arc costs.
//!
//! Provides a dense arc-cost matrix where missing arcs stay undefined.

mod matrix;

pub use matrix::ArcCosts;
