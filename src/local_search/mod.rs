//! Local search for improving cluster routes.
//!
//! - [`two_opt_moves`] — Intra-route 2-opt edge reversal (asymmetric-exact)
//! - [`or_opt_moves`] — Intra-route segment relocation (lengths 1-3)
//! - [`RouteRefiner`] — Budgeted first/best-improvement driver over both

mod or_opt;
mod refiner;
mod two_opt;

pub use or_opt::{or_opt_moves, MAX_SEGMENT};
pub use refiner::{Move, RefineOptions, RefineReport, RouteRefiner};
pub use two_opt::two_opt_moves;
