//! Route evaluation: schedules, feasibility, and cost.
//!
//! Two views over the same timing model:
//! - [`RoutingContext`] — dense, per-cluster, indexed by node number
//! - [`RouteEvaluator`] — sparse, over whole routes, backed by the index

mod context;
mod evaluator;
mod schedule;

pub use context::{RoutingContext, Terminal};
pub use evaluator::RouteEvaluator;
pub use schedule::{evaluate_schedule, latest_arrivals, ScheduleEval, Timing};
