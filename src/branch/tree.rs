//! Arena of branch nodes.

use super::node::{BranchDecision, BranchNode, NodeId};
use crate::models::{Instance, Route};

/// All nodes created during a search, addressed by [`NodeId`].
///
/// Nodes refer to their parent and children by id only.
#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: Vec<BranchNode>,
}

impl SearchTree {
    /// A tree holding only the root node of `instance`.
    pub fn new(instance: &Instance) -> Self {
        Self {
            nodes: vec![BranchNode::root(instance)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Panics if `id` was not issued by this tree.
    pub fn node(&self, id: NodeId) -> &BranchNode {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut BranchNode {
        &mut self.nodes[id.0]
    }

    /// Creates a child of `parent` restricted by `decision`. `seed` routes
    /// join the child's pool unless the pool already has their path.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        decision: BranchDecision,
        seed: impl IntoIterator<Item = Route>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut child = BranchNode::child(id, &self.nodes[parent.0], decision);
        for route in seed {
            if !child.routes.iter().any(|r| r.path() == route.path()) {
                child.routes.push(route);
            }
        }
        self.nodes[parent.0].children.push(id);
        self.nodes.push(child);
        id
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &BranchNode> {
        self.nodes.iter()
    }
}
