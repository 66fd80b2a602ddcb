//! Dense routing context for one cluster.

use std::ops::RangeInclusive;

use super::schedule::{evaluate_schedule, ScheduleEval};
use crate::config::Objective;
use crate::distance::{CostMatrix, LegLookup, Site, TravelCost, TravelCostIndex};
use crate::error::Result;
use crate::models::{Stop, StopId};

/// Where a cluster route terminates.
#[derive(Debug, Clone, Copy)]
pub enum Terminal<'a> {
    /// Back at the start node.
    Start,
    /// At a separate fixed stop.
    At(&'a Stop),
    /// Nowhere: the route ends after its last visit.
    Open,
}

/// A small, fully materialized routing problem.
///
/// Node 0 is the start anchor, nodes `1..=k` are the stops to visit sorted by
/// identifier, and node `k + 1` is the fixed end anchor when there is one.
/// Because visit nodes follow identifier order, "lowest node" and "lowest
/// stop identifier" are the same tie-break.
///
/// # Examples
///
/// ```
/// use hybrid_routing::distance::TravelCostIndex;
/// use hybrid_routing::evaluation::{RoutingContext, Terminal};
/// use hybrid_routing::models::Stop;
/// use hybrid_routing::Objective;
///
/// let stops = vec![
///     Stop::new("depot", 0.0, 0.0),
///     Stop::new("b", 2.0, 0.0),
///     Stop::new("a", 1.0, 0.0),
/// ];
/// let index = TravelCostIndex::from_coordinates(&stops, 1.0).unwrap();
/// let ctx = RoutingContext::new(
///     &stops[0], &[&stops[1], &stops[2]], Terminal::Start, &index, Objective::Distance, 0.0,
/// ).unwrap();
/// assert_eq!(ctx.num_visits(), 2);
/// assert_eq!(ctx.id(1).as_str(), "a");
/// assert!((ctx.path_cost(&[1, 2]) - 4.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct RoutingContext {
    ids: Vec<StopId>,
    sites: Vec<Site>,
    matrix: CostMatrix,
    end: Option<usize>,
    departure_time: f64,
    has_windows: bool,
}

impl RoutingContext {
    /// Materializes the context from the travel-cost index.
    ///
    /// Fails with [`SolveError::UnreachableEdge`](crate::SolveError::UnreachableEdge)
    /// if any ordered pair among the nodes has no entry.
    pub fn new(
        start: &Stop,
        members: &[&Stop],
        terminal: Terminal<'_>,
        costs: &TravelCostIndex,
        objective: Objective,
        departure_time: f64,
    ) -> Result<Self> {
        let mut visits: Vec<&Stop> = members.to_vec();
        visits.sort_by(|a, b| a.id().cmp(b.id()));

        let mut nodes: Vec<&Stop> = Vec::with_capacity(visits.len() + 2);
        nodes.push(start);
        nodes.extend(visits.iter().copied());
        let end = match terminal {
            Terminal::Start => Some(0),
            Terminal::At(stop) if stop.id() == start.id() => Some(0),
            Terminal::At(stop) => {
                nodes.push(stop);
                Some(nodes.len() - 1)
            }
            Terminal::Open => None,
        };

        let ids: Vec<&StopId> = nodes.iter().map(|s| s.id()).collect();
        let matrix = CostMatrix::materialize(&ids, costs, objective)?;
        let mut sites: Vec<Site> = nodes.iter().map(|s| Site::of(s)).collect();
        // Anchors impose no service constraints.
        sites[0] = Site::default();
        if let Some(e) = end {
            sites[e] = Site::default();
        }
        let has_windows = sites.iter().any(|s| s.window.is_some());

        Ok(Self {
            ids: ids.into_iter().cloned().collect(),
            sites,
            matrix,
            end,
            departure_time,
            has_windows,
        })
    }

    /// Start node (always 0).
    pub fn start(&self) -> usize {
        0
    }

    /// End node, if the route has one.
    pub fn end(&self) -> Option<usize> {
        self.end
    }

    /// Number of stops to visit.
    pub fn num_visits(&self) -> usize {
        let anchors = match self.end {
            Some(e) if e != 0 => 2,
            _ => 1,
        };
        self.ids.len() - anchors
    }

    /// Visit nodes in identifier order.
    pub fn visit_nodes(&self) -> RangeInclusive<usize> {
        1..=self.num_visits()
    }

    /// Stop identifier of a node.
    pub fn id(&self, node: usize) -> &StopId {
        &self.ids[node]
    }

    /// Dense cost matrix.
    pub fn matrix(&self) -> &CostMatrix {
        &self.matrix
    }

    /// Clock value at departure from the start node.
    pub fn departure_time(&self) -> f64 {
        self.departure_time
    }

    /// Returns `true` if any visit carries a time window.
    pub fn has_time_windows(&self) -> bool {
        self.has_windows
    }

    /// Objective cost of `start → seq… → end`.
    pub fn path_cost(&self, seq: &[usize]) -> f64 {
        let mut prev = 0;
        let mut total = 0.0;
        for &node in seq {
            total += self.matrix.get(prev, node);
            prev = node;
        }
        if let Some(end) = self.end {
            total += self.matrix.get(prev, end);
        }
        total
    }

    /// Returns `true` if every time window along `seq` is met.
    pub fn is_feasible(&self, seq: &[usize]) -> bool {
        if !self.has_windows {
            return true;
        }
        let mut clock = self.departure_time;
        let mut prev = 0;
        for &node in seq {
            let arrival = clock + self.matrix.leg(prev, node).duration;
            let site = &self.sites[node];
            clock = match site.window {
                Some(tw) if tw.is_violated(arrival) => return false,
                Some(tw) => arrival + tw.waiting_time(arrival) + site.service,
                None => arrival + site.service,
            };
            prev = node;
        }
        true
    }

    /// Full schedule of `seq`.
    pub fn schedule(&self, seq: &[usize]) -> Result<ScheduleEval> {
        evaluate_schedule(self, 0, seq, self.end, self.departure_time)
    }
}

impl LegLookup for RoutingContext {
    type Node = usize;

    fn leg(&self, from: usize, to: usize) -> Result<TravelCost> {
        Ok(self.matrix.leg(from, to))
    }

    fn site(&self, node: usize) -> Site {
        self.sites[node]
    }

    fn objective(&self) -> Objective {
        self.matrix.objective()
    }
}
