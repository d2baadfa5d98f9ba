//! Column generation: the restricted master loop run at every branch node,
//! and the extraction of fractional arc usage from its solution.

mod engine;
mod fractional;

pub use engine::{ColumnGeneration, ColumnGenerationStats, NodeReport};
pub use fractional::fractional_arcs;
