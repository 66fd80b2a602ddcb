//! Read-only travel-cost lookup keyed by stop identifier.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolveError};
use crate::models::{Stop, StopId};

/// Distance and duration of a single directed leg.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TravelCost {
    /// Travel distance.
    pub distance: f64,
    /// Travel duration, on the same clock as time windows.
    pub duration: f64,
}

impl TravelCost {
    /// Creates a leg cost.
    pub const fn new(distance: f64, duration: f64) -> Self {
        Self { distance, duration }
    }

    fn is_valid(&self) -> bool {
        self.distance.is_finite()
            && self.duration.is_finite()
            && self.distance >= 0.0
            && self.duration >= 0.0
    }
}

/// Precomputed directed travel costs between stops.
///
/// Entries need not be symmetric. A missing ordered pair is a hard error on
/// lookup, never an implicit infinite cost. The diagonal (`a → a`) is zero
/// unless given explicitly.
///
/// Lookups resolve both identifiers through a hash table and then index a
/// dense row-major table, so each lookup is O(1).
///
/// # Examples
///
/// ```
/// use hybrid_routing::distance::{TravelCost, TravelCostIndex};
/// use hybrid_routing::models::StopId;
///
/// let index = TravelCostIndex::from_entries(vec![
///     ("a".into(), "b".into(), TravelCost::new(3.0, 60.0)),
///     ("b".into(), "a".into(), TravelCost::new(4.0, 80.0)),
/// ]).unwrap();
///
/// let a = StopId::from("a");
/// let b = StopId::from("b");
/// assert_eq!(index.cost(&a, &b).unwrap().distance, 3.0);
/// assert_eq!(index.cost(&b, &a).unwrap().duration, 80.0);
/// assert!(index.cost(&a, &"c".into()).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct TravelCostIndex {
    ids: Vec<StopId>,
    positions: HashMap<StopId, usize>,
    entries: Vec<Option<TravelCost>>,
}

impl TravelCostIndex {
    /// Builds an index from `(from, to, cost)` triples.
    ///
    /// Fails with [`SolveError::InvalidStopSet`] on a repeated ordered pair
    /// or a negative/non-finite cost.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (StopId, StopId, TravelCost)>,
    {
        let entries: Vec<(StopId, StopId, TravelCost)> = entries.into_iter().collect();
        let ids: BTreeSet<&StopId> = entries
            .iter()
            .flat_map(|(from, to, _)| [from, to])
            .collect();
        let mut index = Self::empty(ids.into_iter().cloned().collect());

        for (from, to, cost) in &entries {
            if !cost.is_valid() {
                return Err(SolveError::invalid_stop_set(format!(
                    "invalid travel cost from `{from}` to `{to}`"
                )));
            }
            let slot = index.slot(from, to);
            if index.entries[slot].replace(*cost).is_some() {
                return Err(SolveError::invalid_stop_set(format!(
                    "duplicate travel cost from `{from}` to `{to}`"
                )));
            }
        }
        Ok(index)
    }

    /// Builds a complete index from a dense row-major grid over `ids`.
    ///
    /// `grid[i * n + j]` is the cost from `ids[i]` to `ids[j]`.
    pub fn from_grid(ids: Vec<StopId>, grid: Vec<TravelCost>) -> Result<Self> {
        let n = ids.len();
        if grid.len() != n * n {
            return Err(SolveError::invalid_stop_set(format!(
                "travel-cost grid has {} entries, expected {}",
                grid.len(),
                n * n
            )));
        }
        let mut entries = Vec::with_capacity(grid.len());
        for (i, from) in ids.iter().enumerate() {
            for (j, to) in ids.iter().enumerate() {
                entries.push((from.clone(), to.clone(), grid[i * n + j]));
            }
        }
        Self::from_entries(entries)
    }

    /// Builds a complete Euclidean index from stop coordinates.
    ///
    /// Duration is distance divided by `speed`. Fails with
    /// [`SolveError::InvalidStopSet`] if `speed` is not a positive finite
    /// number, if two stops share an id, or if a computed leg is invalid.
    pub fn from_coordinates(stops: &[Stop], speed: f64) -> Result<Self> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(SolveError::invalid_stop_set(format!(
                "speed must be positive and finite, got {speed}"
            )));
        }
        let mut ids: Vec<StopId> = stops.iter().map(|s| s.id().clone()).collect();
        ids.sort();
        if let Some(pair) = ids.windows(2).find(|w| w[0] == w[1]) {
            return Err(SolveError::invalid_stop_set(format!(
                "duplicate stop id `{}`",
                pair[0]
            )));
        }

        let mut index = Self::empty(ids);
        for from in stops {
            for to in stops {
                let d = from.location().distance_to(&to.location());
                let cost = TravelCost::new(d, d / speed);
                if !cost.is_valid() {
                    return Err(SolveError::invalid_stop_set(format!(
                        "invalid travel cost from `{}` to `{}`",
                        from.id(),
                        to.id()
                    )));
                }
                let slot = index.slot(from.id(), to.id());
                index.entries[slot] = Some(cost);
            }
        }
        Ok(index)
    }

    fn empty(ids: Vec<StopId>) -> Self {
        let positions = ids
            .iter()
            .enumerate()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();
        let n = ids.len();
        Self {
            ids,
            positions,
            entries: vec![None; n * n],
        }
    }

    // Both ids must be known.
    fn slot(&self, from: &StopId, to: &StopId) -> usize {
        self.positions[from] * self.ids.len() + self.positions[to]
    }

    /// Cost of travelling from `from` to `to`.
    ///
    /// Fails with [`SolveError::UnreachableEdge`] naming the pair when no
    /// entry exists.
    pub fn cost(&self, from: &StopId, to: &StopId) -> Result<TravelCost> {
        self.get(from, to)
            .ok_or_else(|| SolveError::unreachable(from, to))
    }

    /// Cost of travelling from `from` to `to`, if known.
    pub fn get(&self, from: &StopId, to: &StopId) -> Option<TravelCost> {
        let i = *self.positions.get(from)?;
        let j = *self.positions.get(to)?;
        match self.entries[i * self.ids.len() + j] {
            None if i == j => Some(TravelCost::default()),
            entry => entry,
        }
    }

    /// Returns `true` if the identifier appears in any entry.
    pub fn contains(&self, id: &StopId) -> bool {
        self.positions.contains_key(id)
    }

    /// Number of distinct stops referenced by the index.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if the index references no stops.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Referenced identifiers in ascending order.
    pub fn ids(&self) -> &[StopId] {
        &self.ids
    }

    /// Returns `true` if every ordered pair of distinct stops has an entry.
    pub fn is_complete(&self) -> bool {
        let n = self.ids.len();
        (0..n).all(|i| (0..n).all(|j| i == j || self.entries[i * n + j].is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line() -> Vec<Stop> {
        vec![
            Stop::new("a", 0.0, 0.0),
            Stop::new("b", 3.0, 4.0),
            Stop::new("c", 0.0, 8.0),
        ]
    }

    #[test]
    fn test_from_coordinates() {
        let index = TravelCostIndex::from_coordinates(&line(), 2.0).expect("valid");
        assert_eq!(index.len(), 3);
        let c = index
            .cost(&StopId::from("a"), &StopId::from("b"))
            .expect("present");
        assert!((c.distance - 5.0).abs() < 1e-10);
        assert!((c.duration - 2.5).abs() < 1e-10);
        assert!(index.is_complete());
    }

    #[test]
    fn test_asymmetric_entries() {
        let index = TravelCostIndex::from_entries(vec![
            (StopId::from("a"), StopId::from("b"), TravelCost::new(10.0, 1.0)),
            (StopId::from("b"), StopId::from("a"), TravelCost::new(15.0, 2.0)),
        ])
        .expect("valid");
        let ab = index.get(&StopId::from("a"), &StopId::from("b"));
        let ba = index.get(&StopId::from("b"), &StopId::from("a"));
        assert_eq!(ab.map(|c| c.distance), Some(10.0));
        assert_eq!(ba.map(|c| c.distance), Some(15.0));
    }

    #[test]
    fn test_missing_pair_is_error() {
        let index = TravelCostIndex::from_entries(vec![(
            StopId::from("a"),
            StopId::from("b"),
            TravelCost::new(1.0, 1.0),
        )])
        .expect("valid");
        let err = index
            .cost(&StopId::from("b"), &StopId::from("a"))
            .expect_err("missing");
        assert_eq!(
            err,
            SolveError::UnreachableEdge {
                from: StopId::from("b"),
                to: StopId::from("a"),
            }
        );
        assert!(!index.is_complete());
    }

    #[test]
    fn test_diagonal_defaults_to_zero() {
        let index = TravelCostIndex::from_entries(vec![(
            StopId::from("a"),
            StopId::from("b"),
            TravelCost::new(1.0, 1.0),
        )])
        .expect("valid");
        let aa = index.cost(&StopId::from("a"), &StopId::from("a")).expect("diagonal");
        assert_eq!(aa, TravelCost::default());
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let result = TravelCostIndex::from_entries(vec![
            (StopId::from("a"), StopId::from("b"), TravelCost::new(1.0, 1.0)),
            (StopId::from("a"), StopId::from("b"), TravelCost::new(2.0, 1.0)),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_cost_rejected() {
        let result = TravelCostIndex::from_entries(vec![(
            StopId::from("a"),
            StopId::from("b"),
            TravelCost::new(-1.0, 1.0),
        )]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_grid() {
        let ids = vec![StopId::from("x"), StopId::from("y")];
        let grid = vec![
            TravelCost::new(0.0, 0.0),
            TravelCost::new(5.0, 50.0),
            TravelCost::new(6.0, 60.0),
            TravelCost::new(0.0, 0.0),
        ];
        let index = TravelCostIndex::from_grid(ids, grid).expect("valid");
        let yx = index.cost(&StopId::from("y"), &StopId::from("x")).expect("present");
        assert_eq!(yx, TravelCost::new(6.0, 60.0));
    }

    #[test]
    fn test_from_coordinates_rejects_bad_speed() {
        for speed in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = TravelCostIndex::from_coordinates(&line(), speed).expect_err("bad speed");
            assert!(matches!(err, SolveError::InvalidStopSet { .. }));
        }
    }

    #[test]
    fn test_from_coordinates_rejects_duplicate_ids() {
        let mut stops = line();
        stops.push(Stop::new("b", 9.0, 9.0));
        let err = TravelCostIndex::from_coordinates(&stops, 1.0).expect_err("duplicate");
        assert!(err.to_string().contains("`b`"));
    }

    #[test]
    fn test_from_grid_wrong_size() {
        let ids = vec![StopId::from("x"), StopId::from("y")];
        assert!(TravelCostIndex::from_grid(ids, vec![TravelCost::default(); 3]).is_err());
    }
}
