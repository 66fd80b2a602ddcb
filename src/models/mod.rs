//! Domain model types for single-route delivery planning.
//!
//! Provides the core abstractions: stops with demands, service times and
//! time windows, the validated stop set, route anchors, routes as ordered
//! sequences of visits, and the solution returned to callers.

mod anchors;
mod route;
mod solution;
mod stop;
mod stop_set;

pub use anchors::{Anchors, RouteEnd};
pub use route::{Route, Visit};
pub use solution::{Diagnostic, InfeasibleReason, InfeasibleStop, Solution, SolutionStatus};
pub use stop::{Coordinates, Stop, StopId, TimeWindow};
pub use stop_set::StopSet;

pub(crate) use stop_set::validate_stop;
