//! Cheapest feasible insertion.
//!
//! # Algorithm
//!
//! One forward pass records the departure time at every position and one
//! backward pass records the latest arrival each position tolerates
//! without breaking a later window. Each insertion slot is then checked in
//! O(1): the new stop must be reached inside its own window, and the stop
//! it displaces must still be reached by its latest arrival.
//!
//! # Complexity
//!
//! O(n) per stop inserted, n = route length.
//!
//! # Reference
//!
//! Savelsbergh, M.W.P. (1992). "The Vehicle Routing Problem with Time
//! Windows: Minimizing Route Duration", *ORSA Journal on Computing* 4(2).

use crate::distance::{objective_value, LegLookup};
use crate::error::Result;
use crate::evaluation::{evaluate_schedule, latest_arrivals};

/// Best slot found for a stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insertion {
    /// Index in the visit sequence the stop is inserted at.
    pub position: usize,
    /// Objective increase caused by the insertion.
    pub delta: f64,
}

/// Finds the cheapest position for `node` in `start → seq… → end` that
/// keeps every time window satisfied.
///
/// `seq` must itself be feasible. Ties go to the earliest position.
/// Returns `Ok(None)` if no position is feasible.
///
/// # Examples
///
/// ```
/// use hybrid_routing::constructive::cheapest_feasible_insertion;
/// use hybrid_routing::distance::{IndexLegs, TravelCostIndex};
/// use hybrid_routing::models::Stop;
/// use hybrid_routing::Objective;
///
/// let stops = vec![
///     Stop::new("depot", 0.0, 0.0),
///     Stop::new("a", 1.0, 0.0),
///     Stop::new("b", 3.0, 0.0),
///     Stop::new("c", 2.0, 0.0),
/// ];
/// let index = TravelCostIndex::from_coordinates(&stops, 1.0).unwrap();
/// let legs = IndexLegs::new(&index, Objective::Distance);
///
/// let best = cheapest_feasible_insertion(
///     &legs, &stops[0], &[&stops[1], &stops[2]], Some(&stops[0]), &stops[3], 0.0,
/// ).unwrap().unwrap();
/// assert_eq!(best.position, 1);
/// assert!(best.delta.abs() < 1e-10);
/// ```
pub fn cheapest_feasible_insertion<L: LegLookup>(
    legs: &L,
    start: L::Node,
    seq: &[L::Node],
    end: Option<L::Node>,
    node: L::Node,
    departure_time: f64,
) -> Result<Option<Insertion>> {
    let objective = legs.objective();
    let schedule = evaluate_schedule(legs, start, seq, end, departure_time)?;
    let latest = latest_arrivals(legs, seq, end)?;
    let site = legs.site(node);
    let mut best: Option<Insertion> = None;

    for position in 0..=seq.len() {
        let (prev, leave) = match position {
            0 => (start, departure_time),
            p => (seq[p - 1], schedule.timings[p - 1].departure),
        };
        let inbound = legs.leg(prev, node)?;
        let arrival = leave + inbound.duration;
        let departure = match site.window {
            Some(tw) if tw.is_violated(arrival) => continue,
            Some(tw) => arrival + tw.waiting_time(arrival) + site.service,
            None => arrival + site.service,
        };

        let mut delta = objective_value(&inbound, objective);
        if let Some(next) = seq.get(position).copied().or(end) {
            let outbound = legs.leg(node, next)?;
            if position < seq.len() && departure + outbound.duration > latest[position] {
                continue;
            }
            delta += objective_value(&outbound, objective);
            delta -= objective_value(&legs.leg(prev, next)?, objective);
        }

        if best.is_none_or(|b| delta < b.delta) {
            best = Some(Insertion { position, delta });
        }
    }

    Ok(best)
}
