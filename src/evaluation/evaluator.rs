//! Route evaluator that computes timing, cumulative costs, and feasibility.

use super::schedule::{evaluate_schedule, latest_arrivals, ScheduleEval};
use crate::config::Objective;
use crate::distance::{IndexLegs, TravelCostIndex};
use crate::error::Result;
use crate::models::{Anchors, Route, RouteEnd, Stop, Visit};

/// Evaluates full routes between a pair of anchors, resolving every leg
/// directly in the [`TravelCostIndex`].
///
/// Used once the per-cluster routes are stitched together, where a dense
/// matrix over the whole stop set would be wasteful.
///
/// # Examples
///
/// ```
/// use hybrid_routing::distance::TravelCostIndex;
/// use hybrid_routing::evaluation::RouteEvaluator;
/// use hybrid_routing::models::{Anchors, Stop};
/// use hybrid_routing::Objective;
///
/// let stops = vec![
///     Stop::new("depot", 0.0, 0.0),
///     Stop::new("a", 3.0, 4.0),
///     Stop::new("b", 6.0, 8.0),
/// ];
/// let index = TravelCostIndex::from_coordinates(&stops, 1.0).unwrap();
/// let anchors = Anchors::round_trip(stops[0].clone());
/// let evaluator = RouteEvaluator::new(&index, &anchors, Objective::Distance, 0.0);
///
/// let (route, eval) = evaluator.build_route(&[&stops[1], &stops[2]]).unwrap();
/// assert_eq!(route.len(), 2);
/// assert!((route.total_distance() - 20.0).abs() < 1e-10);
/// assert!(eval.is_feasible());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RouteEvaluator<'a> {
    legs: IndexLegs<'a>,
    start: &'a Stop,
    end: Option<&'a Stop>,
    departure_time: f64,
}

impl<'a> RouteEvaluator<'a> {
    /// Creates a new evaluator for the given anchors.
    pub fn new(
        costs: &'a TravelCostIndex,
        anchors: &'a Anchors,
        objective: Objective,
        departure_time: f64,
    ) -> Self {
        let end = match anchors.end() {
            RouteEnd::ReturnToStart => Some(anchors.start()),
            RouteEnd::Fixed(stop) => Some(stop),
            RouteEnd::Open => None,
        };
        Self {
            legs: IndexLegs::new(costs, objective),
            start: anchors.start(),
            end,
            departure_time,
        }
    }

    /// Leg lookup used by this evaluator.
    pub fn legs(&self) -> &IndexLegs<'a> {
        &self.legs
    }

    /// The start anchor.
    pub fn start(&self) -> &'a Stop {
        self.start
    }

    /// The end anchor, if the route has one.
    pub fn end(&self) -> Option<&'a Stop> {
        self.end
    }

    /// Clock value at departure from the start anchor.
    pub fn departure_time(&self) -> f64 {
        self.departure_time
    }

    /// Schedule of `start → seq… → end`.
    pub fn evaluate(&self, seq: &[&'a Stop]) -> Result<ScheduleEval> {
        evaluate_schedule(&self.legs, self.start, seq, self.end, self.departure_time)
    }

    /// Latest feasible arrival at each position of `seq`.
    pub fn latest_arrivals(&self, seq: &[&'a Stop]) -> Result<Vec<f64>> {
        latest_arrivals(&self.legs, seq, self.end)
    }

    /// Builds a [`Route`] from a visit sequence, computing timing and totals.
    ///
    /// Returns the route together with the schedule it was built from, so
    /// callers can inspect window violations.
    pub fn build_route(&self, seq: &[&'a Stop]) -> Result<(Route, ScheduleEval)> {
        let eval = self.evaluate(seq)?;
        let visits = seq
            .iter()
            .zip(&eval.timings)
            .map(|(stop, t)| Visit {
                stop_id: stop.id().clone(),
                arrival_time: t.arrival,
                service_start: t.service_start,
                departure_time: t.departure,
                cumulative_distance: t.distance,
                cumulative_duration: t.duration,
            })
            .collect();
        let mut route = Route::new(
            self.start.id().clone(),
            visits,
            self.end.map(|s| s.id().clone()),
        );
        route.set_totals(self.departure_time, eval.distance, eval.duration, eval.completion);
        Ok((route, eval))
    }
}
