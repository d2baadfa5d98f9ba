//! Tuning parameters for column generation, label-setting pricing and the
//! tree search.
//!
//! Every config is plain data: `Default` gives the documented values and the
//! `with_*` methods override one field at a time.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Column-generation loop parameters.
///
/// # Examples
///
/// ```
/// use u_bnp::config::ColumnGenerationConfig;
///
/// let config = ColumnGenerationConfig::default().with_round_cap(20);
/// assert_eq!(config.first_round_cap, 200);
/// assert_eq!(config.round_cap, 20);
/// assert_eq!(config.max_rounds, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnGenerationConfig {
    /// Maximum number of routes accepted from the first pricing round.
    pub first_round_cap: usize,
    /// Maximum number of routes accepted from every later round.
    pub round_cap: usize,
    /// Optional limit on pricing rounds per node. A node that hits it is
    /// reported as not converged.
    pub max_rounds: Option<usize>,
}

impl Default for ColumnGenerationConfig {
    fn default() -> Self {
        Self {
            first_round_cap: 200,
            round_cap: 50,
            max_rounds: None,
        }
    }
}

impl ColumnGenerationConfig {
    /// Sets the first-round route cap.
    pub fn with_first_round_cap(mut self, cap: usize) -> Self {
        self.first_round_cap = cap;
        self
    }

    /// Sets the route cap for rounds after the first.
    pub fn with_round_cap(mut self, cap: usize) -> Self {
        self.round_cap = cap;
        self
    }

    /// Limits the number of pricing rounds per node.
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = Some(rounds);
        self
    }

    /// Route cap for the given zero-based round.
    pub fn cap_for_round(&self, round: usize) -> usize {
        if round == 0 {
            self.first_round_cap
        } else {
            self.round_cap
        }
    }
}

/// Label-setting oracle parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelingConfig {
    /// A completed path becomes a route only if its reduced cost is below
    /// this value.
    pub reduced_cost_threshold: f64,
    /// Maximum visits of one customer on a single path; `None` means the
    /// node count of the instance.
    pub max_customer_visits: Option<usize>,
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            reduced_cost_threshold: -0.1,
            max_customer_visits: None,
        }
    }
}

impl LabelingConfig {
    /// Sets the reduced-cost threshold for route completion.
    pub fn with_reduced_cost_threshold(mut self, threshold: f64) -> Self {
        self.reduced_cost_threshold = threshold;
        self
    }

    /// Bounds how often a path may visit the same customer.
    pub fn with_max_customer_visits(mut self, visits: usize) -> Self {
        self.max_customer_visits = Some(visits);
        self
    }
}

/// Branch-and-price search budgets.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use u_bnp::config::SearchConfig;
///
/// let config = SearchConfig::default()
///     .with_node_limit(500)
///     .with_time_limit(Duration::from_secs(60));
/// assert_eq!(config.node_limit, Some(500));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of nodes to solve.
    pub node_limit: Option<usize>,
    /// Wall-clock budget, checked between node solves.
    pub time_limit: Option<Duration>,
}

impl SearchConfig {
    /// Limits the number of solved nodes.
    pub fn with_node_limit(mut self, nodes: usize) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    /// Limits the wall-clock time of the search.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}
