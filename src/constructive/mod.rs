//! Constructive heuristics for building initial cluster routes.
//!
//! - [`RouteBuilder`] — Time-window-aware nearest-neighbor (Solomon, 1987), O(n²)
//! - [`cheapest_feasible_insertion`] — Slack-checked insertion, O(n) per stop

mod insertion;
mod nearest_neighbor;

pub use insertion::{cheapest_feasible_insertion, Insertion};
pub use nearest_neighbor::{Construction, RouteBuilder};
