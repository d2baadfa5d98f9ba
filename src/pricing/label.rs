//! Partial paths of the label-setting search and their dominance rule.

use std::cmp::Ordering;

/// How a kept label ranks against the labels already stored at its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRank {
    /// First label at its node, or a non-dominated label whose load leaves no
    /// room for another visit of its predecessor. Dominates unconditionally.
    Strong,
    /// No stored label was lexicographically smaller or equal.
    Undominated,
    /// Dominated, but only by labels that are not strong and that reached
    /// the node from a different predecessor.
    Tolerated,
}

/// Outcome of comparing two labels at the same node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dominance {
    /// The first label is lexicographically smaller or equal.
    Dominates,
    /// The second label is strictly smaller.
    Dominated,
    /// A resource is not a number.
    Incomparable,
}

/// A partial path from the depot.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    /// Node the label was extended from; `None` for the depot label.
    pub pred: Option<usize>,
    /// Accumulated reduced cost.
    pub cost: f64,
    /// Accumulated demand.
    pub load: f64,
    /// Visited nodes, starting at the depot.
    pub path: Vec<usize>,
    /// Rank assigned when the label was stored.
    pub rank: LabelRank,
}

impl Label {
    /// The empty path at the depot.
    pub fn depot() -> Self {
        Self {
            pred: None,
            cost: 0.0,
            load: 0.0,
            path: vec![crate::models::DEPOT],
            rank: LabelRank::Strong,
        }
    }

    /// Node the label currently sits at.
    pub fn node(&self) -> usize {
        self.path[self.path.len() - 1]
    }

    /// Total order on `(cost, load)` used to pick the next node to expand.
    pub fn lex_cmp(&self, other: &Label) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.load.total_cmp(&other.load))
    }
}

/// Compares `a` against `b` on `(cost, load)`.
///
/// `a` dominates when its cost is smaller, or equal with a load that is not
/// larger. Equal labels dominate each other.
///
/// # Examples
///
/// ```
/// use u_bnp::pricing::{dominance, Dominance, Label};
///
/// let mut a = Label::depot();
/// let mut b = Label::depot();
/// a.cost = -3.0;
/// b.cost = -1.0;
/// assert_eq!(dominance(&a, &b), Dominance::Dominates);
/// assert_eq!(dominance(&b, &a), Dominance::Dominated);
/// ```
pub fn dominance(a: &Label, b: &Label) -> Dominance {
    if a.cost.is_nan() || b.cost.is_nan() || a.load.is_nan() || b.load.is_nan() {
        return Dominance::Incomparable;
    }
    if a.cost < b.cost || (a.cost == b.cost && a.load <= b.load) {
        Dominance::Dominates
    } else {
        Dominance::Dominated
    }
}

/// Decides whether `candidate`, extended from `pred`, joins the labels
/// already stored at its node, and with which rank. `tight` tells whether
/// the candidate's load plus the demand of `pred` exceeds the capacity.
///
/// Returns `None` when some stored label dominates the candidate and is
/// either [`LabelRank::Strong`] or came from the same predecessor.
pub(crate) fn classify(
    stored: &[Label],
    candidate: &Label,
    pred: usize,
    tight: bool,
) -> Option<LabelRank> {
    if stored.is_empty() {
        return Some(LabelRank::Strong);
    }
    let mut dominators = stored
        .iter()
        .filter(|l| dominance(l, candidate) == Dominance::Dominates)
        .peekable();
    if dominators.peek().is_none() {
        return Some(if tight {
            LabelRank::Strong
        } else {
            LabelRank::Undominated
        });
    }
    let blocked = dominators.any(|l| l.rank == LabelRank::Strong || l.pred == Some(pred));
    if blocked {
        None
    } else {
        Some(LabelRank::Tolerated)
    }
}
