//! Arcs and restricted arc sets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Node id of the depot.
pub const DEPOT: usize = 0;

/// A directed arc `tail → head`.
///
/// Arcs order lexicographically by `(tail, head)`, which keeps maps keyed by
/// arc deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Arc {
    /// Node the arc leaves.
    pub tail: usize,
    /// Node the arc enters.
    pub head: usize,
}

impl Arc {
    /// Creates the arc `tail → head`.
    pub const fn new(tail: usize, head: usize) -> Self {
        Self { tail, head }
    }

    /// Returns `true` if either endpoint is the depot.
    pub fn touches_depot(&self) -> bool {
        self.tail == DEPOT || self.head == DEPOT
    }
}

impl fmt::Display for Arc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.tail, self.head)
    }
}

/// The arcs a branch node may use, indexed by tail node.
///
/// Children of a branch node derive their arc set from the parent through
/// [`without`](ArcSet::without) or [`forcing`](ArcSet::forcing), so a child's
/// set is always a subset of its parent's.
///
/// # Examples
///
/// ```
/// use u_bnp::models::{Arc, ArcSet};
///
/// let arcs = ArcSet::complete(3);
/// assert_eq!(arcs.len(), 6);
///
/// let excluded = arcs.without(Arc::new(1, 2));
/// assert!(!excluded.contains(Arc::new(1, 2)));
/// assert!(excluded.is_subset_of(&arcs));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcSet {
    outgoing: Vec<Vec<usize>>,
    len: usize,
}

impl ArcSet {
    /// Builds an arc set over `node_count` nodes.
    ///
    /// Duplicate arcs collapse; self loops and out-of-range arcs are dropped
    /// (instances reject them before an arc set is ever built).
    pub fn new(node_count: usize, arcs: impl IntoIterator<Item = Arc>) -> Self {
        let mut outgoing = vec![Vec::new(); node_count];
        for arc in arcs {
            if arc.tail == arc.head || arc.tail >= node_count || arc.head >= node_count {
                continue;
            }
            outgoing[arc.tail].push(arc.head);
        }
        let mut len = 0;
        for heads in &mut outgoing {
            heads.sort_unstable();
            heads.dedup();
            len += heads.len();
        }
        Self { outgoing, len }
    }

    /// Every ordered pair of distinct nodes.
    pub fn complete(node_count: usize) -> Self {
        Self::new(
            node_count,
            (0..node_count)
                .flat_map(|i| (0..node_count).map(move |j| Arc::new(i, j)))
                .filter(|a| a.tail != a.head),
        )
    }

    /// Number of nodes the set is defined over.
    pub fn node_count(&self) -> usize {
        self.outgoing.len()
    }

    /// Number of arcs.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if there are no arcs.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if `arc` belongs to the set.
    pub fn contains(&self, arc: Arc) -> bool {
        self.outgoing
            .get(arc.tail)
            .is_some_and(|heads| heads.binary_search(&arc.head).is_ok())
    }

    /// Heads of the arcs leaving `node`, in increasing order.
    pub fn outgoing(&self, node: usize) -> &[usize] {
        self.outgoing.get(node).map_or(&[], Vec::as_slice)
    }

    /// Iterates over the arcs in `(tail, head)` order.
    pub fn iter(&self) -> impl Iterator<Item = Arc> + '_ {
        self.outgoing
            .iter()
            .enumerate()
            .flat_map(|(tail, heads)| heads.iter().map(move |&head| Arc::new(tail, head)))
    }

    /// The same set with `arc` removed.
    pub fn without(&self, arc: Arc) -> Self {
        Self::new(self.node_count(), self.iter().filter(|&a| a != arc))
    }

    /// The set restricted so that `arc` is the only way out of its tail and
    /// the only way into its head.
    pub fn forcing(&self, arc: Arc) -> Self {
        Self::new(
            self.node_count(),
            self.iter().filter(|a| {
                let other_out = a.tail == arc.tail && a.head != arc.head;
                let other_in = a.head == arc.head && a.tail != arc.tail;
                !other_out && !other_in
            }),
        )
    }

    /// Returns `true` if every arc of `self` is also in `other`.
    pub fn is_subset_of(&self, other: &ArcSet) -> bool {
        self.iter().all(|a| other.contains(a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arc_order_and_display() {
        let mut arcs = vec![Arc::new(2, 1), Arc::new(0, 3), Arc::new(2, 0)];
        arcs.sort();
        assert_eq!(arcs, vec![Arc::new(0, 3), Arc::new(2, 0), Arc::new(2, 1)]);
        assert_eq!(Arc::new(4, 7).to_string(), "(4, 7)");
        assert!(Arc::new(0, 3).touches_depot());
        assert!(!Arc::new(1, 3).touches_depot());
    }

    #[test]
    fn test_new_drops_invalid_and_duplicates() {
        let set = ArcSet::new(
            3,
            vec![
                Arc::new(0, 1),
                Arc::new(0, 1),
                Arc::new(1, 1),
                Arc::new(1, 5),
                Arc::new(2, 0),
            ],
        );
        assert_eq!(set.len(), 2);
        assert!(set.contains(Arc::new(0, 1)));
        assert!(set.contains(Arc::new(2, 0)));
        assert!(!set.contains(Arc::new(1, 1)));
        assert!(!set.contains(Arc::new(9, 0)));
    }

    #[test]
    fn test_complete() {
        let set = ArcSet::complete(4);
        assert_eq!(set.len(), 12);
        assert_eq!(set.outgoing(2), &[0, 1, 3]);
        assert!(set.outgoing(10).is_empty());
    }

    #[test]
    fn test_without() {
        let set = ArcSet::complete(4);
        let child = set.without(Arc::new(1, 2));
        assert_eq!(child.len(), 11);
        assert!(!child.contains(Arc::new(1, 2)));
        assert!(child.contains(Arc::new(2, 1)));
        assert!(child.is_subset_of(&set));
        assert!(!set.is_subset_of(&child));
    }

    #[test]
    fn test_forcing() {
        let set = ArcSet::complete(4);
        let child = set.forcing(Arc::new(1, 2));
        // Only 1→2 leaves 1 and only 1→2 enters 2.
        assert_eq!(child.outgoing(1), &[2]);
        assert!(!child.contains(Arc::new(0, 2)));
        assert!(!child.contains(Arc::new(3, 2)));
        assert!(child.contains(Arc::new(2, 1)));
        assert!(child.contains(Arc::new(0, 1)));
        assert!(child.is_subset_of(&set));
        // 12 arcs - 2 other arcs out of 1 - 2 other arcs into 2
        assert_eq!(child.len(), 8);
    }

    #[test]
    fn test_iter_order() {
        let set = ArcSet::new(3, vec![Arc::new(2, 1), Arc::new(0, 2), Arc::new(0, 1)]);
        let arcs: Vec<_> = set.iter().collect();
        assert_eq!(arcs, vec![Arc::new(0, 1), Arc::new(0, 2), Arc::new(2, 1)]);
    }
}
