//! Spatial partitioning of large stop sets.
//!
//! - [`bisect`] — Recursive median bisection on the wider axis (default)
//! - [`kmeans`] — Seeded k-means++ with oversized groups bisected
//!
//! Stop sets no larger than the cluster bound come back as a single
//! cluster. Output is deterministic: members are sorted by id and clusters
//! by their smallest id.

mod bisection;
mod kmeans;

pub use bisection::bisect;
pub use kmeans::{kmeans, LLOYD_ITERATIONS};

use crate::config::{PartitionStrategy, SolverConfig};
use crate::models::{Coordinates, Stop, StopId};

/// A bounded, disjoint subset of the stop set.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    ids: Vec<StopId>,
    centroid: Coordinates,
}

impl Cluster {
    fn from_stops(mut stops: Vec<&Stop>) -> Self {
        stops.sort_by(bisection::by_id);
        let n = stops.len().max(1) as f64;
        let (sx, sy) = stops.iter().fold((0.0, 0.0), |(x, y), s| {
            let at = s.location();
            (x + at.x, y + at.y)
        });
        Self {
            ids: stops.iter().map(|s| s.id().clone()).collect(),
            centroid: Coordinates::new(sx / n, sy / n),
        }
    }

    /// Member identifiers, ascending.
    pub fn ids(&self) -> &[StopId] {
        &self.ids
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if the cluster has no members.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns `true` if `id` is a member.
    pub fn contains(&self, id: &StopId) -> bool {
        self.ids.binary_search(id).is_ok()
    }

    /// Mean member location.
    pub fn centroid(&self) -> Coordinates {
        self.centroid
    }
}

/// Splits stop sets into clusters of bounded size.
///
/// # Examples
///
/// ```
/// use hybrid_routing::models::Stop;
/// use hybrid_routing::partition::Partitioner;
/// use hybrid_routing::PartitionStrategy;
///
/// let stops: Vec<Stop> = (0..10)
///     .map(|i| Stop::new(format!("s{i}"), i as f64, 0.0))
///     .collect();
/// let refs: Vec<&Stop> = stops.iter().collect();
///
/// let one = Partitioner::new(10, PartitionStrategy::Bisection, 0).partition(&refs);
/// assert_eq!(one.len(), 1);
///
/// let many = Partitioner::new(3, PartitionStrategy::Bisection, 0).partition(&refs);
/// assert!(many.iter().all(|c| c.len() <= 3));
/// assert_eq!(many.iter().map(|c| c.len()).sum::<usize>(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partitioner {
    max_cluster_size: usize,
    strategy: PartitionStrategy,
    seed: u64,
}

impl Partitioner {
    /// Creates a partitioner. A bound of zero is treated as one.
    pub fn new(max_cluster_size: usize, strategy: PartitionStrategy, seed: u64) -> Self {
        Self {
            max_cluster_size: max_cluster_size.max(1),
            strategy,
            seed,
        }
    }

    /// Partitioner configured from the solver settings.
    pub fn from_config(config: &SolverConfig) -> Self {
        Self::new(config.max_cluster_size, config.partition, config.seed)
    }

    /// Splits `stops` into clusters.
    ///
    /// Every stop lands in exactly one cluster. An empty input gives no
    /// clusters.
    pub fn partition(&self, stops: &[&Stop]) -> Vec<Cluster> {
        if stops.is_empty() {
            return Vec::new();
        }
        let mut sorted = stops.to_vec();
        sorted.sort_by(bisection::by_id);

        let parts = if sorted.len() <= self.max_cluster_size {
            vec![sorted]
        } else {
            match self.strategy {
                PartitionStrategy::Bisection => bisect(sorted, self.max_cluster_size),
                PartitionStrategy::KMeans => kmeans(&sorted, self.max_cluster_size, self.seed),
            }
        };

        let mut clusters: Vec<Cluster> = parts
            .into_iter()
            .filter(|p| !p.is_empty())
            .map(Cluster::from_stops)
            .collect();
        clusters.sort_by(|a, b| a.ids[0].cmp(&b.ids[0]));
        clusters
    }
}
