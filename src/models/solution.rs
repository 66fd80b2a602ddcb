//! Solution, infeasibility and diagnostic types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Route, StopId};

/// Why a stop was left out of the route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InfeasibleReason {
    /// No tested position reaches the stop before its window closes.
    TimeWindow {
        /// Closing time of the stop's window.
        latest: f64,
    },
    /// Serving the stop would overload the vehicle.
    Capacity {
        /// Demand of the stop.
        demand: f64,
        /// Configured vehicle capacity.
        capacity: f64,
    },
    /// Keeping the stop would break the enforced route duration limit.
    RouteDuration {
        /// Configured limit.
        limit: f64,
    },
}

/// A stop excluded from the route, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfeasibleStop {
    /// The excluded stop.
    pub stop_id: StopId,
    /// Why it could not be placed.
    pub reason: InfeasibleReason,
}

/// Non-fatal conditions attached to a solution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// Refinement of a cluster stopped on its budget before reaching a
    /// local optimum.
    BudgetExceeded {
        /// Cluster index in partition order.
        cluster: usize,
        /// Improvement passes completed.
        passes: usize,
        /// Time spent refining.
        elapsed: Duration,
    },
    /// The route runs longer than the configured soft limit.
    RouteDurationExceeded {
        /// Completion time minus departure time.
        duration: f64,
        /// Configured limit.
        limit: f64,
    },
}

/// Coverage and convergence summary of a solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolutionStatus {
    /// Every stop is routed and every cluster reached a local optimum.
    LocallyOptimal,
    /// Some stops are infeasible; the rest is locally optimal.
    Partial,
    /// Every stop is routed but some refinement hit its budget.
    BudgetLimited,
    /// Some stops are infeasible and some refinement hit its budget.
    PartialBudgetLimited,
}

/// The solver's output: one route over the stop set plus its metrics.
///
/// Results are near-optimal: the route is a local optimum of 2-opt and
/// or-opt moves over a greedy construction, not a proven optimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    route: Route,
    infeasible: Vec<InfeasibleStop>,
    diagnostics: Vec<Diagnostic>,
    total_demand: f64,
    total_cost: f64,
    clusters: usize,
    converged: bool,
}

impl Solution {
    /// Creates a solution around a route.
    pub fn new(route: Route) -> Self {
        Self {
            route,
            infeasible: Vec::new(),
            diagnostics: Vec::new(),
            total_demand: 0.0,
            total_cost: 0.0,
            clusters: 1,
            converged: true,
        }
    }

    /// The route.
    pub fn route(&self) -> &Route {
        &self.route
    }

    /// Stops left out of the route.
    pub fn infeasible(&self) -> &[InfeasibleStop] {
        &self.infeasible
    }

    /// Non-fatal conditions.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Total travel distance of the route.
    pub fn total_distance(&self) -> f64 {
        self.route.total_distance()
    }

    /// Total travel duration of the route.
    pub fn total_duration(&self) -> f64 {
        self.route.total_duration()
    }

    /// Sum of demand over routed stops.
    pub fn total_demand(&self) -> f64 {
        self.total_demand
    }

    /// Route cost under the configured cost model.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Number of clusters the stop set was split into.
    pub fn num_clusters(&self) -> usize {
        self.clusters
    }

    /// Number of routed stops.
    pub fn num_served(&self) -> usize {
        self.route.len()
    }

    /// Number of stops that had to be dropped.
    pub fn num_infeasible(&self) -> usize {
        self.infeasible.len()
    }

    /// Returns `true` if every stop was routed.
    pub fn is_complete(&self) -> bool {
        self.infeasible.is_empty()
    }

    /// Returns `true` if no refinement stopped on its budget.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Coverage and convergence summary.
    pub fn status(&self) -> SolutionStatus {
        match (self.is_complete(), self.converged) {
            (true, true) => SolutionStatus::LocallyOptimal,
            (false, true) => SolutionStatus::Partial,
            (true, false) => SolutionStatus::BudgetLimited,
            (false, false) => SolutionStatus::PartialBudgetLimited,
        }
    }

    pub(crate) fn set_infeasible(&mut self, infeasible: Vec<InfeasibleStop>) {
        self.infeasible = infeasible;
    }

    pub(crate) fn push_diagnostic(&mut self, diagnostic: Diagnostic) {
        if matches!(diagnostic, Diagnostic::BudgetExceeded { .. }) {
            self.converged = false;
        }
        self.diagnostics.push(diagnostic);
    }

    pub(crate) fn set_metrics(&mut self, total_demand: f64, total_cost: f64, clusters: usize) {
        self.total_demand = total_demand;
        self.total_cost = total_cost;
        self.clusters = clusters;
    }
}
