//! Travel-cost lookup surfaces.
//!
//! - [`TravelCostIndex`] — read-only directed costs keyed by stop id
//! - [`CostMatrix`] — dense per-cluster copy used by the heuristics
//! - [`LegLookup`] — leg/site access shared by schedule evaluation

mod index;
mod legs;
mod matrix;

pub use index::{TravelCost, TravelCostIndex};
pub use legs::{IndexLegs, LegLookup, Site};
pub use matrix::{objective_value, CostMatrix};
