//! Validated stop collection.

use std::collections::HashMap;

use super::{Stop, StopId};
use crate::distance::TravelCostIndex;
use crate::error::{Result, SolveError};

/// A validated, duplicate-free collection of stops to visit.
///
/// Stops are kept sorted by identifier so that every iteration over the set
/// is deterministic regardless of input order.
///
/// # Examples
///
/// ```
/// use hybrid_routing::models::{Stop, StopSet};
///
/// let set = StopSet::new(vec![
///     Stop::new("b", 1.0, 0.0),
///     Stop::new("a", 0.0, 0.0),
/// ]).unwrap();
/// assert_eq!(set.len(), 2);
/// assert!(set.contains(&"a".into()));
/// assert_eq!(set.iter().next().unwrap().id().as_str(), "a");
///
/// assert!(StopSet::new(vec![Stop::new("a", 0.0, 0.0), Stop::new("a", 1.0, 1.0)]).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct StopSet {
    stops: Vec<Stop>,
    positions: HashMap<StopId, usize>,
}

impl StopSet {
    /// Validates and builds a stop set.
    ///
    /// Fails with [`SolveError::InvalidStopSet`] on duplicate identifiers,
    /// non-finite coordinates, or negative/non-finite demand and service
    /// durations.
    pub fn new(stops: Vec<Stop>) -> Result<Self> {
        let mut stops = stops;
        stops.sort_by(|a, b| a.id().cmp(b.id()));

        let mut positions = HashMap::with_capacity(stops.len());
        for (idx, stop) in stops.iter().enumerate() {
            validate_stop(stop)?;
            if positions.insert(stop.id().clone(), idx).is_some() {
                return Err(SolveError::invalid_stop_set(format!(
                    "duplicate stop id `{}`",
                    stop.id()
                )));
            }
        }

        Ok(Self { stops, positions })
    }

    /// Checks that every stop is known to the travel-cost index.
    ///
    /// Missing individual pairs are detected later, when a cluster's costs
    /// are materialized, and reported as [`SolveError::UnreachableEdge`].
    pub fn validate_against(&self, costs: &TravelCostIndex) -> Result<()> {
        match self.stops.iter().find(|s| !costs.contains(s.id())) {
            Some(stop) => Err(SolveError::invalid_stop_set(format!(
                "stop `{}` is not present in the travel-cost index",
                stop.id()
            ))),
            None => Ok(()),
        }
    }

    /// Number of stops.
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Returns `true` if the set holds no stops.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Iterates stops in ascending identifier order.
    pub fn iter(&self) -> std::slice::Iter<'_, Stop> {
        self.stops.iter()
    }

    /// Returns `true` if a stop with this identifier is present.
    pub fn contains(&self, id: &StopId) -> bool {
        self.positions.contains_key(id)
    }

    /// Looks up a stop by identifier.
    pub fn get(&self, id: &StopId) -> Option<&Stop> {
        self.positions.get(id).map(|&idx| &self.stops[idx])
    }

    /// All stops in ascending identifier order.
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }
}

impl<'a> IntoIterator for &'a StopSet {
    type Item = &'a Stop;
    type IntoIter = std::slice::Iter<'a, Stop>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub(crate) fn validate_stop(stop: &Stop) -> Result<()> {
    if !stop.location().is_finite() {
        return Err(SolveError::invalid_stop_set(format!(
            "stop `{}` has non-finite coordinates",
            stop.id()
        )));
    }
    if !stop.demand().is_finite() || stop.demand() < 0.0 {
        return Err(SolveError::invalid_stop_set(format!(
            "stop `{}` has invalid demand {}",
            stop.id(),
            stop.demand()
        )));
    }
    if !stop.service_duration().is_finite() || stop.service_duration() < 0.0 {
        return Err(SolveError::invalid_stop_set(format!(
            "stop `{}` has invalid service duration {}",
            stop.id(),
            stop.service_duration()
        )));
    }
    if let Some(tw) = stop.time_window().filter(|tw| !tw.is_valid()) {
        return Err(SolveError::invalid_stop_set(format!(
            "stop `{}` has invalid time window [{}, {}]",
            stop.id(),
            tw.earliest(),
            tw.latest()
        )));
    }
    Ok(())
}
