//! Dense cost matrix over a small node set.

use super::{TravelCost, TravelCostIndex};
use crate::config::Objective;
use crate::error::Result;
use crate::models::StopId;

/// A dense n×n matrix of leg costs stored in row-major order.
///
/// Built once per cluster from the [`TravelCostIndex`] so the construction
/// and refinement loops never hash or fail. Each cell keeps the full
/// [`TravelCost`] plus the value of the active [`Objective`].
///
/// # Examples
///
/// ```
/// use hybrid_routing::distance::{CostMatrix, TravelCost};
/// use hybrid_routing::Objective;
///
/// let legs = vec![
///     TravelCost::new(0.0, 0.0), TravelCost::new(5.0, 50.0),
///     TravelCost::new(7.0, 40.0), TravelCost::new(0.0, 0.0),
/// ];
/// let by_distance = CostMatrix::from_legs(2, legs.clone(), Objective::Distance).unwrap();
/// let by_duration = CostMatrix::from_legs(2, legs, Objective::Duration).unwrap();
/// assert_eq!(by_distance.get(0, 1), 5.0);
/// assert_eq!(by_duration.get(1, 0), 40.0);
/// ```
#[derive(Debug, Clone)]
pub struct CostMatrix {
    values: Vec<f64>,
    legs: Vec<TravelCost>,
    size: usize,
    objective: Objective,
}

impl CostMatrix {
    /// Copies the costs between `ids` out of the index.
    ///
    /// Row `i` / column `j` of the result correspond to `ids[i]` / `ids[j]`.
    /// Pairs are visited row by row, so with several gaps the error names
    /// the first missing pair in that order.
    pub fn materialize(
        ids: &[&StopId],
        costs: &TravelCostIndex,
        objective: Objective,
    ) -> Result<Self> {
        let size = ids.len();
        let mut legs = Vec::with_capacity(size * size);
        for from in ids {
            for to in ids {
                legs.push(costs.cost(from, to)?);
            }
        }
        Ok(Self::build(size, legs, objective))
    }

    /// Creates a matrix from an explicit row-major grid.
    ///
    /// Returns `None` if the data length doesn't match `size * size`.
    pub fn from_legs(size: usize, legs: Vec<TravelCost>, objective: Objective) -> Option<Self> {
        if legs.len() != size * size {
            return None;
        }
        Some(Self::build(size, legs, objective))
    }

    fn build(size: usize, legs: Vec<TravelCost>, objective: Objective) -> Self {
        let values = legs.iter().map(|leg| objective_value(leg, objective)).collect();
        Self {
            values,
            legs,
            size,
            objective,
        }
    }

    /// Objective cost of the leg `from → to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.values[from * self.size + to]
    }

    /// Full distance/duration of the leg `from → to`.
    pub fn leg(&self, from: usize, to: usize) -> TravelCost {
        self.legs[from * self.size + to]
    }

    /// Objective the matrix values were built for.
    pub fn objective(&self) -> Objective {
        self.objective
    }

    /// Number of nodes in this matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the objective costs are symmetric within `tol`.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Returns the cheapest successor of `from` among `candidates`.
    ///
    /// Ties go to the lowest node index. Returns `None` if `candidates` is
    /// empty.
    pub fn nearest_neighbor(&self, from: usize, candidates: &[usize]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for &c in candidates {
            let d = self.get(from, c);
            let better = match best {
                None => true,
                Some((b, bd)) => d < bd || (d == bd && c < b),
            };
            if better {
                best = Some((c, d));
            }
        }
        best.map(|(c, _)| c)
    }
}

/// Picks the objective component of a leg.
pub fn objective_value(leg: &TravelCost, objective: Objective) -> f64 {
    match objective {
        Objective::Distance => leg.distance,
        Objective::Duration => leg.duration,
    }
}
