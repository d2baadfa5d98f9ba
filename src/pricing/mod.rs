//! Pricing oracles: procedures that search for routes with negative reduced
//! cost under the duals of the restricted master problem.
//!
//! - [`LabelSettingOracle`]: label-setting search with dominance (fast, heuristic)
//! - [`CompactOracle`]: arc-flow MIP with MTZ subtour elimination (exact, slow)

mod compact;
mod label;
mod labeling;

pub use compact::CompactOracle;
pub use label::{dominance, Dominance, Label, LabelRank};
pub use labeling::LabelSettingOracle;

use crate::error::Result;
use crate::models::{ArcSet, Route};

/// A source of new master-problem columns.
///
/// `duals` is indexed by node, with `duals[0] = 0` for the depot. The reduced
/// cost of a route is its cost minus the duals of the customers it visits,
/// counted with multiplicity. Implementations return at most `max_routes`
/// routes, all using arcs of `arcs` only and within vehicle capacity. An
/// empty result means the oracle found no improving route.
pub trait PricingOracle {
    /// Searches for improving routes.
    fn find_routes(&mut self, arcs: &ArcSet, duals: &[f64], max_routes: usize) -> Result<Vec<Route>>;
}

impl<O: PricingOracle + ?Sized> PricingOracle for &mut O {
    fn find_routes(&mut self, arcs: &ArcSet, duals: &[f64], max_routes: usize) -> Result<Vec<Route>> {
        (**self).find_routes(arcs, duals, max_routes)
    }
}

impl<O: PricingOracle + ?Sized> PricingOracle for Box<O> {
    fn find_routes(&mut self, arcs: &ArcSet, duals: &[f64], max_routes: usize) -> Result<Vec<Route>> {
        (**self).find_routes(arcs, duals, max_routes)
    }
}
