//! Route and visit types.

use serde::{Deserialize, Serialize};

use super::StopId;

/// A single visit within a route.
///
/// Tracks the stop along with its estimated timing and the travel totals
/// accumulated on arrival.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    /// Stop being visited.
    pub stop_id: StopId,
    /// Estimated arrival time.
    pub arrival_time: f64,
    /// Service start (arrival plus waiting for the window to open).
    pub service_start: f64,
    /// Departure time (service start plus service duration).
    pub departure_time: f64,
    /// Travel distance from the start anchor to this stop.
    pub cumulative_distance: f64,
    /// Travel duration from the start anchor to this stop.
    pub cumulative_duration: f64,
}

/// An ordered, duplicate-free sequence of visits between fixed anchors.
///
/// The anchors are not stored in `visits`. `total_distance` and
/// `total_duration` are the sums of the travel-cost lookups along
/// `start → visits… → end`.
///
/// # Examples
///
/// ```
/// use hybrid_routing::models::{Route, StopId, Visit};
///
/// let route = Route::new(
///     StopId::from("depot"),
///     vec![Visit {
///         stop_id: StopId::from("a"),
///         arrival_time: 10.0,
///         service_start: 10.0,
///         departure_time: 15.0,
///         cumulative_distance: 4.0,
///         cumulative_duration: 10.0,
///     }],
///     Some(StopId::from("depot")),
/// );
/// assert_eq!(route.len(), 1);
/// assert_eq!(route.stop_ids(), vec![StopId::from("a")]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    start: StopId,
    visits: Vec<Visit>,
    end: Option<StopId>,
    departure_time: f64,
    total_distance: f64,
    total_duration: f64,
    completion_time: f64,
}

impl Route {
    /// Creates a route with zeroed totals.
    pub fn new(start: StopId, visits: Vec<Visit>, end: Option<StopId>) -> Self {
        Self {
            start,
            visits,
            end,
            departure_time: 0.0,
            total_distance: 0.0,
            total_duration: 0.0,
            completion_time: 0.0,
        }
    }

    /// Start anchor.
    pub fn start(&self) -> &StopId {
        &self.start
    }

    /// End anchor, if the route has one.
    pub fn end(&self) -> Option<&StopId> {
        self.end.as_ref()
    }

    /// Ordered visits (anchors excluded).
    pub fn visits(&self) -> &[Visit] {
        &self.visits
    }

    /// Number of visits.
    pub fn len(&self) -> usize {
        self.visits.len()
    }

    /// Returns `true` if the route has no visits.
    pub fn is_empty(&self) -> bool {
        self.visits.is_empty()
    }

    /// Visited stop identifiers in order.
    pub fn stop_ids(&self) -> Vec<StopId> {
        self.visits.iter().map(|v| v.stop_id.clone()).collect()
    }

    /// Full sequence: start anchor, visits, then end anchor if any.
    pub fn sequence(&self) -> Vec<StopId> {
        let mut seq = Vec::with_capacity(self.visits.len() + 2);
        seq.push(self.start.clone());
        seq.extend(self.visits.iter().map(|v| v.stop_id.clone()));
        if let Some(end) = &self.end {
            seq.push(end.clone());
        }
        seq
    }

    /// Clock value when the route leaves its start.
    pub fn departure_time(&self) -> f64 {
        self.departure_time
    }

    /// Total travel distance.
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    /// Total travel duration.
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    /// Arrival at the end anchor (or last departure for open routes),
    /// including waiting and service time.
    pub fn completion_time(&self) -> f64 {
        self.completion_time
    }

    pub(crate) fn set_totals(
        &mut self,
        departure_time: f64,
        distance: f64,
        duration: f64,
        completion: f64,
    ) {
        self.departure_time = departure_time;
        self.total_distance = distance;
        self.total_duration = duration;
        self.completion_time = completion;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit(id: &str) -> Visit {
        Visit {
            stop_id: StopId::from(id),
            arrival_time: 0.0,
            service_start: 0.0,
            departure_time: 0.0,
            cumulative_distance: 0.0,
            cumulative_duration: 0.0,
        }
    }

    #[test]
    fn test_route_empty() {
        let r = Route::new(StopId::from("depot"), Vec::new(), None);
        assert!(r.is_empty());
        assert_eq!(r.len(), 0);
        assert_eq!(r.total_distance(), 0.0);
        assert_eq!(r.sequence(), vec![StopId::from("depot")]);
    }

    #[test]
    fn test_route_sequence_includes_anchors() {
        let r = Route::new(
            StopId::from("s"),
            vec![visit("a"), visit("b")],
            Some(StopId::from("e")),
        );
        let seq: Vec<String> = r.sequence().iter().map(|id| id.to_string()).collect();
        assert_eq!(seq, vec!["s", "a", "b", "e"]);
    }

    #[test]
    fn test_set_totals() {
        let mut r = Route::new(StopId::from("s"), vec![visit("a")], None);
        r.set_totals(5.0, 10.0, 20.0, 30.0);
        assert_eq!(r.departure_time(), 5.0);
        assert_eq!(r.total_distance(), 10.0);
        assert_eq!(r.total_duration(), 20.0);
        assert_eq!(r.completion_time(), 30.0);
    }
}
