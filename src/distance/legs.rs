//! Leg lookups shared by the dense and index-backed evaluators.

use super::{TravelCost, TravelCostIndex};
use crate::config::Objective;
use crate::error::Result;
use crate::models::{Stop, TimeWindow};

/// Service constraints of a node, as seen by schedule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Site {
    /// Time window, if any.
    pub window: Option<TimeWindow>,
    /// Time spent on site.
    pub service: f64,
}

impl Site {
    /// Site data of a stop.
    pub fn of(stop: &Stop) -> Self {
        Self {
            window: stop.time_window().copied(),
            service: stop.service_duration(),
        }
    }
}

/// Source of leg costs and site data over some node type.
///
/// Implemented by the dense per-cluster context (`usize` nodes, infallible)
/// and by [`IndexLegs`] (`&Stop` nodes, backed by the travel-cost index).
pub trait LegLookup {
    /// Node handle.
    type Node: Copy;

    /// Cost of the leg `from → to`.
    fn leg(&self, from: Self::Node, to: Self::Node) -> Result<TravelCost>;

    /// Service constraints at `node`.
    fn site(&self, node: Self::Node) -> Site;

    /// Objective being minimized.
    fn objective(&self) -> Objective;
}

/// [`LegLookup`] over stops, resolving every leg in the [`TravelCostIndex`].
#[derive(Debug, Clone, Copy)]
pub struct IndexLegs<'a> {
    costs: &'a TravelCostIndex,
    objective: Objective,
}

impl<'a> IndexLegs<'a> {
    /// Wraps an index.
    pub fn new(costs: &'a TravelCostIndex, objective: Objective) -> Self {
        Self { costs, objective }
    }
}

impl<'a> LegLookup for IndexLegs<'a> {
    type Node = &'a Stop;

    fn leg(&self, from: &'a Stop, to: &'a Stop) -> Result<TravelCost> {
        self.costs.cost(from.id(), to.id())
    }

    fn site(&self, node: &'a Stop) -> Site {
        Site::of(node)
    }

    fn objective(&self) -> Objective {
        self.objective
    }
}
