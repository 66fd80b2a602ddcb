//! Time-window-aware nearest-neighbor construction with insertion repair.
//!
//! # Algorithm
//!
//! Starting at the start anchor, repeatedly append the cheapest unvisited
//! stop that can still be reached inside its time window. Stops that
//! cannot are deferred and re-tested at every later step. Once no
//! reachable stop remains, each deferred stop is placed by cheapest
//! feasible insertion anywhere in the built route; a stop with no feasible
//! position is reported infeasible.
//!
//! # Complexity
//!
//! O(n²) for the greedy pass plus O(n) per deferred stop.
//!
//! # Reference
//!
//! Solomon, M.M. (1987). "Algorithms for the Vehicle Routing and Scheduling
//! Problems with Time Window Constraints", *Operations Research* 35(2), 254-265.

use super::insertion::cheapest_feasible_insertion;
use crate::distance::LegLookup;
use crate::error::Result;
use crate::evaluation::RoutingContext;
use crate::models::{InfeasibleReason, InfeasibleStop};

/// Output of [`RouteBuilder::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct Construction {
    /// Visit nodes in route order.
    pub sequence: Vec<usize>,
    /// Visit nodes that could not be placed, ascending.
    pub infeasible: Vec<usize>,
}

impl Construction {
    /// Infeasible nodes as reportable stops.
    pub fn infeasible_stops(&self, ctx: &RoutingContext) -> Vec<InfeasibleStop> {
        self.infeasible
            .iter()
            .map(|&node| InfeasibleStop {
                stop_id: ctx.id(node).clone(),
                reason: InfeasibleReason::TimeWindow {
                    latest: ctx
                        .site(node)
                        .window
                        .map_or(f64::INFINITY, |tw| tw.latest()),
                },
            })
            .collect()
    }
}

/// Builds the initial route of one cluster.
///
/// # Examples
///
/// ```
/// use hybrid_routing::constructive::RouteBuilder;
/// use hybrid_routing::distance::TravelCostIndex;
/// use hybrid_routing::evaluation::{RoutingContext, Terminal};
/// use hybrid_routing::models::Stop;
/// use hybrid_routing::Objective;
///
/// let stops = vec![
///     Stop::new("depot", 0.0, 0.0),
///     Stop::new("a", 3.0, 0.0),
///     Stop::new("b", 1.0, 0.0),
///     Stop::new("c", 2.0, 0.0),
/// ];
/// let index = TravelCostIndex::from_coordinates(&stops, 1.0).unwrap();
/// let members: Vec<&Stop> = stops[1..].iter().collect();
/// let ctx = RoutingContext::new(
///     &stops[0], &members, Terminal::Start, &index, Objective::Distance, 0.0,
/// ).unwrap();
///
/// let built = RouteBuilder::new(&ctx).build().unwrap();
/// // Nodes follow id order: a = 1, b = 2, c = 3.
/// assert_eq!(built.sequence, vec![2, 3, 1]);
/// assert!(built.infeasible.is_empty());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RouteBuilder<'a> {
    ctx: &'a RoutingContext,
}

impl<'a> RouteBuilder<'a> {
    /// Creates a builder over a cluster context.
    pub fn new(ctx: &'a RoutingContext) -> Self {
        Self { ctx }
    }

    /// Runs the greedy pass followed by insertion repair.
    pub fn build(&self) -> Result<Construction> {
        let ctx = self.ctx;
        let matrix = ctx.matrix();
        let mut infeasible = Vec::new();
        // Durations need not obey the triangle inequality, so a stop late on
        // its direct leg may still be reachable through another stop.
        let mut pending: Vec<usize> = ctx.visit_nodes().collect();

        let mut sequence = Vec::with_capacity(pending.len());
        let mut current = ctx.start();
        let mut clock = ctx.departure_time();
        loop {
            let reachable: Vec<usize> = pending
                .iter()
                .copied()
                .filter(|&node| {
                    let arrival = clock + matrix.leg(current, node).duration;
                    ctx.site(node)
                        .window
                        .is_none_or(|tw| !tw.is_violated(arrival))
                })
                .collect();
            let Some(next) = matrix.nearest_neighbor(current, &reachable) else {
                break;
            };

            let arrival = clock + matrix.leg(current, next).duration;
            let site = ctx.site(next);
            let wait = site.window.map_or(0.0, |tw| tw.waiting_time(arrival));
            clock = arrival + wait + site.service;
            pending.retain(|&node| node != next);
            sequence.push(next);
            current = next;
        }

        // Deferred stops, in id order.
        for node in pending {
            let slot = cheapest_feasible_insertion(
                ctx,
                ctx.start(),
                &sequence,
                ctx.end(),
                node,
                ctx.departure_time(),
            )?;
            match slot {
                Some(slot) => sequence.insert(slot.position, node),
                None => infeasible.push(node),
            }
        }
        infeasible.sort_unstable();

        Ok(Construction {
            sequence,
            infeasible,
        })
    }
}
