//! Route anchors: where a route starts and how it ends.

use serde::{Deserialize, Serialize};

use super::{Stop, StopId};

/// How a route terminates after its last visit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum RouteEnd {
    /// Travel back to the start anchor (closed tour).
    #[default]
    ReturnToStart,
    /// Travel to a fixed end location.
    Fixed(Stop),
    /// Stop after the last visit.
    Open,
}

/// Fixed start (and optional fixed end) of a route.
///
/// When the stop set also contains the start or end identifier, that stop
/// is served by the anchor itself and is not visited twice.
///
/// # Examples
///
/// ```
/// use hybrid_routing::models::{Anchors, RouteEnd, Stop};
///
/// let depot = Stop::new("depot", 0.0, 0.0);
/// let anchors = Anchors::round_trip(depot);
/// assert_eq!(anchors.start().id().as_str(), "depot");
/// assert_eq!(anchors.end_id().map(|id| id.as_str()), Some("depot"));
///
/// let open = Anchors::open(Stop::new("depot", 0.0, 0.0));
/// assert!(open.end_id().is_none());
/// assert_eq!(open.end(), &RouteEnd::Open);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchors {
    start: Stop,
    end: RouteEnd,
}

impl Anchors {
    /// Creates anchors with an explicit end policy.
    pub fn new(start: Stop, end: RouteEnd) -> Self {
        Self { start, end }
    }

    /// Start and finish at the same location.
    pub fn round_trip(start: Stop) -> Self {
        Self::new(start, RouteEnd::ReturnToStart)
    }

    /// Start at `start` and finish at `end`.
    pub fn fixed_end(start: Stop, end: Stop) -> Self {
        Self::new(start, RouteEnd::Fixed(end))
    }

    /// Start at `start` with no return leg.
    pub fn open(start: Stop) -> Self {
        Self::new(start, RouteEnd::Open)
    }

    /// The start anchor.
    pub fn start(&self) -> &Stop {
        &self.start
    }

    /// The end policy.
    pub fn end(&self) -> &RouteEnd {
        &self.end
    }

    /// Identifier of the final location, if the route has one.
    pub fn end_id(&self) -> Option<&StopId> {
        match &self.end {
            RouteEnd::ReturnToStart => Some(self.start.id()),
            RouteEnd::Fixed(stop) => Some(stop.id()),
            RouteEnd::Open => None,
        }
    }

    /// Returns `true` if `id` names one of the anchors.
    pub fn is_anchor(&self, id: &StopId) -> bool {
        self.start.id() == id || self.end_id() == Some(id)
    }
}
