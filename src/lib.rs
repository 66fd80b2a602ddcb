//! # hybrid-routing
//!
//! Single-route delivery planning over a precomputed travel-cost matrix.
//! Large stop sets are split into spatial clusters, every cluster is built
//! by a time-window-aware nearest-neighbor heuristic and refined by 2-opt
//! and Or-opt, and the cluster routes are stitched into one route.
//!
//! ## Modules
//!
//! - [`models`] — Domain model types (Stop, StopSet, Anchors, Route, Solution)
//! - [`distance`] — Travel-cost index and dense per-cluster cost matrix
//! - [`partition`] — Spatial partitioning (median bisection, k-means)
//! - [`constructive`] — Nearest-neighbor construction and cheapest insertion
//! - [`local_search`] — 2-opt, Or-opt, and the budgeted refiner
//! - [`evaluation`] — Schedules, time-window feasibility, and route cost
//! - [`assembly`] — Cluster ordering, seam repair, and final metrics
//!
//! ## Quick start
//!
//! ```
//! use hybrid_routing::distance::TravelCostIndex;
//! use hybrid_routing::models::{Anchors, Stop, StopSet, TimeWindow};
//! use hybrid_routing::{HybridSolver, SolverConfig};
//!
//! let depot = Stop::new("depot", 0.0, 0.0);
//! let stops = StopSet::new(vec![
//!     Stop::new("a", 2.0, 0.0).with_service_duration(1.0),
//!     Stop::new("b", 0.0, 2.0)
//!         .with_time_window(TimeWindow::new(0.0, 3.0).unwrap()),
//! ]).unwrap();
//! let mut located: Vec<Stop> = stops.iter().cloned().collect();
//! located.push(depot.clone());
//! let index = TravelCostIndex::from_coordinates(&located, 1.0).unwrap();
//!
//! let solution = HybridSolver::new(SolverConfig::default())
//!     .solve(&stops, &index, &Anchors::round_trip(depot))
//!     .unwrap();
//! assert_eq!(solution.route().visits()[0].stop_id.as_str(), "b");
//! assert!(solution.is_complete());
//! ```

pub mod assembly;
pub mod config;
pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod local_search;
pub mod models;
pub mod partition;
mod solver;

pub use config::{
    Acceptance, CostModel, DurationPolicy, Objective, PartitionStrategy, SolverConfig,
};
pub use error::{Result, SolveError};
pub use solver::HybridSolver;
