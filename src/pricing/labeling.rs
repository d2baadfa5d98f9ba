//! Label-setting pricing: a best-first resource-constrained shortest path
//! search over (reduced cost, load).

use log::trace;
use logging_timer::time;

use super::label::{classify, Label, LabelRank};
use super::PricingOracle;
use crate::config::LabelingConfig;
use crate::error::Result;
use crate::models::{ArcSet, Instance, Route, DEPOT};

/// Heuristic pricing oracle generating negative reduced-cost routes.
///
/// Every node keeps the labels ever stored there (used for dominance) and
/// the labels still waiting for expansion. Each step picks the node holding
/// the lexicographically smallest waiting label and extends all of its
/// waiting labels along the node's outgoing arcs, never straight back to the
/// label's predecessor. Paths are not forced to be elementary.
///
/// # Examples
///
/// ```
/// use u_bnp::models::{Customer, Instance};
/// use u_bnp::pricing::{LabelSettingOracle, PricingOracle};
///
/// let customers = vec![
///     Customer::depot(0.0, 0.0),
///     Customer::new(1, 0.0, 10.0, 1.0),
///     Customer::new(2, 10.0, 10.0, 1.0),
/// ];
/// let instance = Instance::euclidean(&customers, 2.0).unwrap();
/// let mut oracle = LabelSettingOracle::new(&instance);
///
/// let duals = vec![0.0, 20.0, 30.0];
/// let routes = oracle.find_routes(instance.arcs(), &duals, 10).unwrap();
/// assert!(!routes.is_empty());
/// assert!(routes.iter().all(|r| r.demand(&instance) <= instance.capacity()));
/// ```
pub struct LabelSettingOracle<'a> {
    instance: &'a Instance,
    config: LabelingConfig,
}

impl<'a> LabelSettingOracle<'a> {
    /// Creates an oracle with the default [`LabelingConfig`].
    pub fn new(instance: &'a Instance) -> Self {
        Self {
            instance,
            config: LabelingConfig::default(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: LabelingConfig) -> Self {
        self.config = config;
        self
    }

    /// Node holding the smallest waiting label; ties go to the lowest node.
    fn next_node(pending: &[Vec<Label>]) -> Option<usize> {
        pending
            .iter()
            .enumerate()
            .filter_map(|(node, labels)| {
                labels
                    .iter()
                    .min_by(|a, b| a.lex_cmp(b))
                    .map(|best| (node, best))
            })
            .min_by(|(_, a), (_, b)| a.lex_cmp(b))
            .map(|(node, _)| node)
    }

    #[time]
    fn search(&self, arcs: &ArcSet, duals: &[f64], max_routes: usize) -> Result<Vec<Route>> {
        let mut routes = Vec::new();
        if max_routes == 0 {
            return Ok(routes);
        }

        let n = self.instance.node_count();
        let capacity = self.instance.capacity();
        let max_visits = self.config.max_customer_visits.unwrap_or(n);
        let mut stored: Vec<Vec<Label>> = vec![Vec::new(); n];
        let mut pending: Vec<Vec<Label>> = vec![Vec::new(); n];
        pending[DEPOT].push(Label::depot());

        let mut created = 0usize;
        let mut discarded = 0usize;

        while let Some(node) = Self::next_node(&pending) {
            let mut labels = std::mem::take(&mut pending[node]);
            labels.sort_by(|a, b| a.lex_cmp(b));

            for label in &labels {
                for &succ in arcs.outgoing(node) {
                    if label.pred == Some(succ) {
                        continue;
                    }
                    let Some(arc_cost) = self.instance.arc_cost(node, succ) else {
                        continue;
                    };

                    if succ == DEPOT {
                        let cost = label.cost + arc_cost;
                        if cost < self.config.reduced_cost_threshold {
                            routes.push(Route::new(label.path.clone(), self.instance)?);
                            if routes.len() >= max_routes {
                                trace!(
                                    "labeling stopped at route cap {max_routes}: {created} labels kept, {discarded} discarded"
                                );
                                return Ok(routes);
                            }
                        }
                        continue;
                    }

                    let load = label.load + self.instance.demand(succ);
                    if load > capacity {
                        continue;
                    }
                    if label.path.iter().filter(|&&v| v == succ).count() >= max_visits {
                        continue;
                    }

                    let mut path = label.path.clone();
                    path.push(succ);
                    let mut candidate = Label {
                        pred: Some(node),
                        cost: label.cost + arc_cost - duals[succ],
                        load,
                        path,
                        rank: LabelRank::Tolerated,
                    };
                    let tight = load + self.instance.demand(node) > capacity;
                    match classify(&stored[succ], &candidate, node, tight) {
                        Some(rank) => {
                            candidate.rank = rank;
                            stored[succ].push(candidate.clone());
                            pending[succ].push(candidate);
                            created += 1;
                        }
                        None => discarded += 1,
                    }
                }
            }
        }

        trace!(
            "labeling exhausted: {} routes, {created} labels kept, {discarded} discarded",
            routes.len()
        );
        Ok(routes)
    }
}

impl PricingOracle for LabelSettingOracle<'_> {
    fn find_routes(&mut self, arcs: &ArcSet, duals: &[f64], max_routes: usize) -> Result<Vec<Route>> {
        self.search(arcs, duals, max_routes)
    }
}
