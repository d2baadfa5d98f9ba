//! Domain model types for capacitated vehicle routing.
//!
//! Provides the immutable instance data (graph, costs, demands, capacity),
//! arcs and restricted arc sets, routes as priced depot-anchored paths, and
//! integral solutions.

mod arc;
mod customer;
mod instance;
mod route;
mod solution;

pub use arc::{Arc, ArcSet, DEPOT};
pub use customer::Customer;
pub use instance::{Instance, InstanceData, DEFAULT_TOLERANCE};
pub use route::Route;
pub use solution::{Solution, Violation, ViolationType};
