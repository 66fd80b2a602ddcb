//! Stop, identifier and time window types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a stop, unique within a [`StopSet`](super::StopSet).
///
/// Identifiers are totally ordered; every deterministic tie-break in the
/// solver falls back to the lowest identifier.
///
/// # Examples
///
/// ```
/// use hybrid_routing::models::StopId;
///
/// let a = StopId::from("A");
/// let b = StopId::from("B");
/// assert!(a < b);
/// assert_eq!(a.as_str(), "A");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(String);

impl StopId {
    /// Creates an identifier from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StopId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for StopId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Planar coordinates of a stop.
///
/// Geographic input uses longitude as `x` and latitude as `y`. Coordinates
/// only steer partitioning and cluster ordering; route costs always come
/// from the travel-cost index.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    /// Horizontal component (longitude for geographic data).
    pub x: f64,
    /// Vertical component (latitude for geographic data).
    pub y: f64,
}

impl Coordinates {
    /// Creates a coordinate pair.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A time window constraint for service at a stop.
///
/// Arrival must happen no later than `latest`. Arriving before `earliest`
/// is allowed and the vehicle waits.
///
/// # Examples
///
/// ```
/// use hybrid_routing::models::TimeWindow;
///
/// let tw = TimeWindow::new(100.0, 200.0).unwrap();
/// assert!(tw.earliest() <= tw.latest());
/// assert!(tw.contains(150.0));
/// assert!(!tw.contains(250.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    earliest: f64,
    latest: f64,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// Returns `None` if `earliest > latest` or either value is non-finite.
    pub fn new(earliest: f64, latest: f64) -> Option<Self> {
        if !earliest.is_finite() || !latest.is_finite() || earliest > latest {
            return None;
        }
        Some(Self { earliest, latest })
    }

    /// Earliest allowable service start.
    pub fn earliest(&self) -> f64 {
        self.earliest
    }

    /// Latest allowable arrival.
    pub fn latest(&self) -> f64 {
        self.latest
    }

    /// Returns `true` if the given time falls within this window.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.earliest && time <= self.latest
    }

    /// Waiting time when arriving at `arrival`; zero once the window is open.
    pub fn waiting_time(&self, arrival: f64) -> f64 {
        if arrival < self.earliest {
            self.earliest - arrival
        } else {
            0.0
        }
    }

    /// Returns `true` if arriving at the given time misses this window.
    pub fn is_violated(&self, arrival: f64) -> bool {
        arrival > self.latest
    }

    // Deserialized windows bypass `new`.
    pub(crate) fn is_valid(&self) -> bool {
        self.earliest.is_finite() && self.latest.is_finite() && self.earliest <= self.latest
    }
}

/// A location to be visited.
///
/// Stops are immutable once built; the `with_*` builders consume and
/// return the stop.
///
/// # Examples
///
/// ```
/// use hybrid_routing::models::{Stop, TimeWindow};
///
/// let stop = Stop::new("bakery", 12.5, 41.9)
///     .with_demand(3.0)
///     .with_service_duration(300.0)
///     .with_time_window(TimeWindow::new(0.0, 3_600.0).unwrap());
/// assert_eq!(stop.id().as_str(), "bakery");
/// assert_eq!(stop.demand(), 3.0);
/// assert!(stop.time_window().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    id: StopId,
    location: Coordinates,
    #[serde(default)]
    demand: f64,
    #[serde(default)]
    service_duration: f64,
    #[serde(default)]
    time_window: Option<TimeWindow>,
    #[serde(default)]
    priority: i32,
}

impl Stop {
    /// Creates a stop with no demand, service time, window or priority.
    pub fn new(id: impl Into<StopId>, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            location: Coordinates::new(x, y),
            demand: 0.0,
            service_duration: 0.0,
            time_window: None,
            priority: 0,
        }
    }

    /// Sets the demand weight.
    pub fn with_demand(mut self, demand: f64) -> Self {
        self.demand = demand;
        self
    }

    /// Sets the time spent on site.
    pub fn with_service_duration(mut self, duration: f64) -> Self {
        self.service_duration = duration;
        self
    }

    /// Sets a time window.
    pub fn with_time_window(mut self, tw: TimeWindow) -> Self {
        self.time_window = Some(tw);
        self
    }

    /// Sets the priority reported alongside the stop.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Stop identifier.
    pub fn id(&self) -> &StopId {
        &self.id
    }

    /// Location of the stop.
    pub fn location(&self) -> Coordinates {
        self.location
    }

    /// Demand weight (units delivered).
    pub fn demand(&self) -> f64 {
        self.demand
    }

    /// Service duration spent at the stop.
    pub fn service_duration(&self) -> f64 {
        self.service_duration
    }

    /// Time window constraint, if any.
    pub fn time_window(&self) -> Option<&TimeWindow> {
        self.time_window.as_ref()
    }

    /// Caller-assigned priority.
    pub fn priority(&self) -> i32 {
        self.priority
    }
}
