//! Forward/backward schedule passes over a visit sequence.
//!
//! Timing model: the route leaves its start at the departure time. At each
//! visit, `arrival = previous departure + leg duration`; arriving before a
//! window opens waits, arriving after it closes is a violation; departure is
//! service start plus service duration.

use crate::distance::{objective_value, LegLookup, Site};
use crate::error::Result;

/// Timing of one visit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    /// Arrival at the stop.
    pub arrival: f64,
    /// Service start (arrival plus any waiting).
    pub service_start: f64,
    /// Departure (service start plus service duration).
    pub departure: f64,
    /// Travel distance accumulated on arrival.
    pub distance: f64,
    /// Travel duration accumulated on arrival.
    pub duration: f64,
}

/// Result of evaluating a full sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEval {
    /// Per-visit timings, in sequence order.
    pub timings: Vec<Timing>,
    /// Total travel distance, including the final leg.
    pub distance: f64,
    /// Total travel duration, including the final leg.
    pub duration: f64,
    /// Total objective cost.
    pub objective: f64,
    /// Arrival at the end anchor, or the last departure for open routes.
    pub completion: f64,
    /// Positions whose time window is missed.
    pub violations: Vec<usize>,
}

impl ScheduleEval {
    /// Returns `true` if no time window is missed.
    pub fn is_feasible(&self) -> bool {
        self.violations.is_empty()
    }
}

fn visit<L: LegLookup>(legs: &L, node: L::Node, arrival: f64) -> (Timing, bool) {
    let Site { window, service } = legs.site(node);
    let (wait, violated) = match window {
        Some(tw) => (tw.waiting_time(arrival), tw.is_violated(arrival)),
        None => (0.0, false),
    };
    let timing = Timing {
        arrival,
        service_start: arrival + wait,
        departure: arrival + wait + service,
        distance: 0.0,
        duration: 0.0,
    };
    (timing, violated)
}

/// Evaluates `start → seq… → end`.
pub fn evaluate_schedule<L: LegLookup>(
    legs: &L,
    start: L::Node,
    seq: &[L::Node],
    end: Option<L::Node>,
    departure_time: f64,
) -> Result<ScheduleEval> {
    let objective = legs.objective();
    let mut timings = Vec::with_capacity(seq.len());
    let mut violations = Vec::new();
    let mut distance = 0.0;
    let mut duration = 0.0;
    let mut total = 0.0;
    let mut clock = departure_time;
    let mut prev = start;

    for (pos, &node) in seq.iter().enumerate() {
        let leg = legs.leg(prev, node)?;
        distance += leg.distance;
        duration += leg.duration;
        total += objective_value(&leg, objective);
        let (mut timing, violated) = visit(legs, node, clock + leg.duration);
        timing.distance = distance;
        timing.duration = duration;
        if violated {
            violations.push(pos);
        }
        clock = timing.departure;
        timings.push(timing);
        prev = node;
    }

    if let Some(end) = end {
        let leg = legs.leg(prev, end)?;
        distance += leg.distance;
        duration += leg.duration;
        total += objective_value(&leg, objective);
        clock += leg.duration;
    }

    Ok(ScheduleEval {
        timings,
        distance,
        duration,
        objective: total,
        completion: clock,
        violations,
    })
}

/// Latest arrival at each position that keeps every later window satisfied.
///
/// Only meaningful for a sequence that is currently feasible.
pub fn latest_arrivals<L: LegLookup>(
    legs: &L,
    seq: &[L::Node],
    end: Option<L::Node>,
) -> Result<Vec<f64>> {
    let mut latest = vec![f64::INFINITY; seq.len()];
    let mut bound_next = f64::INFINITY;
    for pos in (0..seq.len()).rev() {
        let node = seq[pos];
        let site = legs.site(node);
        let next = seq.get(pos + 1).copied().or(end);
        let bound = match next {
            Some(next) => bound_next - legs.leg(node, next)?.duration - site.service,
            None => f64::INFINITY,
        };
        let own = site.window.map_or(f64::INFINITY, |tw| tw.latest());
        latest[pos] = own.min(bound);
        bound_next = latest[pos];
    }
    Ok(latest)
}
