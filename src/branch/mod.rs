//! Branch-and-price over arc decisions.
//!
//! A [`SearchTree`] holds every [`BranchNode`]. Nodes are split on a
//! fractional customer arc into an exclusion child and an inclusion child,
//! and [`BranchAndPrice`] explores them smallest bound first.

mod node;
mod policy;
mod search;
mod tree;

pub use node::{BranchDecision, BranchNode, NodeId};
pub use policy::{branch_on_arc, select_branching_arc};
pub use search::{BranchAndPrice, SearchResult, SearchStatus};
pub use tree::SearchTree;
