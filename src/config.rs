//! Solver configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolveError};

/// Which leg cost the solver minimizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Objective {
    /// Minimize travel distance.
    #[default]
    Distance,
    /// Minimize travel duration.
    Duration,
}

/// How large stop sets are split into clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PartitionStrategy {
    /// Recursive median split along the wider coordinate axis.
    #[default]
    Bisection,
    /// Seeded k-means, oversized clusters bisected afterwards.
    KMeans,
}

/// Move-acceptance policy of the local search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Acceptance {
    /// Apply the first improving move found in scan order.
    #[default]
    FirstImprovement,
    /// Scan the whole neighborhood and apply the best move.
    BestImprovement,
}

/// How [`SolverConfig::max_route_duration`] is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DurationPolicy {
    /// Keep every stop and attach a diagnostic when the limit is exceeded.
    #[default]
    Report,
    /// Drop stops until the route fits; dropped stops are reported
    /// infeasible.
    Enforce,
}

/// Fleet cost parameters used for [`Solution::total_cost`](crate::models::Solution::total_cost).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostModel {
    /// Fixed cost of dispatching the vehicle (charged when the route has visits).
    pub fixed_cost: f64,
    /// Cost per unit of travelled distance.
    pub cost_per_distance: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            fixed_cost: 0.0,
            cost_per_distance: 1.0,
        }
    }
}

impl CostModel {
    /// Cost of a route of the given length.
    pub fn route_cost(&self, distance: f64, has_visits: bool) -> f64 {
        let fixed = if has_visits { self.fixed_cost } else { 0.0 };
        fixed + distance * self.cost_per_distance
    }
}

/// Configuration for [`HybridSolver`](crate::HybridSolver).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use hybrid_routing::{Acceptance, SolverConfig};
///
/// let config = SolverConfig {
///     max_cluster_size: 25,
///     acceptance: Acceptance::BestImprovement,
///     time_limit: Some(Duration::from_millis(200)),
///     ..SolverConfig::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Stop sets larger than this are partitioned; also the upper bound on
    /// cluster size.
    pub max_cluster_size: usize,
    /// Partitioning strategy above the threshold.
    pub partition: PartitionStrategy,
    /// Seed for every randomized step.
    pub seed: u64,
    /// Improvement passes allowed per cluster; `None` is unbounded.
    pub max_passes: Option<usize>,
    /// Wall-clock refinement budget per cluster; `None` is unbounded.
    pub time_limit: Option<Duration>,
    /// First- or best-improvement.
    pub acceptance: Acceptance,
    /// Accept moves that leave the cost unchanged (at most one per pass).
    pub accept_equal_moves: bool,
    /// Maximum moves applied by the cross-cluster seam pass.
    pub seam_moves: usize,
    /// Positions on each side of a cluster boundary the seam pass may touch.
    pub seam_radius: usize,
    /// Leg cost being minimized.
    pub objective: Objective,
    /// Clock value when the route leaves its start anchor.
    pub departure_time: f64,
    /// Limit on the route's completion time minus departure time.
    pub max_route_duration: Option<f64>,
    /// Whether `max_route_duration` only reports or also drops stops.
    pub duration_policy: DurationPolicy,
    /// Total demand the vehicle can carry; `None` is unbounded.
    pub vehicle_capacity: Option<f64>,
    /// Fleet cost parameters.
    pub cost_model: CostModel,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_cluster_size: 40,
            partition: PartitionStrategy::default(),
            seed: 0,
            max_passes: Some(1_000),
            time_limit: None,
            acceptance: Acceptance::default(),
            accept_equal_moves: false,
            seam_moves: 64,
            seam_radius: 3,
            objective: Objective::default(),
            departure_time: 0.0,
            max_route_duration: None,
            duration_policy: DurationPolicy::default(),
            vehicle_capacity: None,
            cost_model: CostModel::default(),
        }
    }
}

impl SolverConfig {
    /// Rejects values the solver cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_cluster_size == 0 {
            return Err(SolveError::invalid_config("max_cluster_size must be positive"));
        }
        if !self.departure_time.is_finite() {
            return Err(SolveError::invalid_config("departure_time must be finite"));
        }
        if let Some(limit) = self.max_route_duration {
            if !limit.is_finite() || limit < 0.0 {
                return Err(SolveError::invalid_config(
                    "max_route_duration must be finite and non-negative",
                ));
            }
        }
        if let Some(capacity) = self.vehicle_capacity {
            if !capacity.is_finite() || capacity < 0.0 {
                return Err(SolveError::invalid_config(
                    "vehicle_capacity must be finite and non-negative",
                ));
            }
        }
        if !self.cost_model.fixed_cost.is_finite() || !self.cost_model.cost_per_distance.is_finite()
        {
            return Err(SolveError::invalid_config("cost model must be finite"));
        }
        Ok(())
    }
}
