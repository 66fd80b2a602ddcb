//! Seeded k-means clustering.
//!
//! # Algorithm
//!
//! k = ⌈n / max_size⌉ centers are seeded with k-means++ (each new center
//! drawn with probability proportional to squared distance from the
//! nearest existing one), then refined by a fixed number of Lloyd
//! iterations. Groups larger than the bound are bisected afterwards.
//!
//! # Reference
//!
//! Arthur, D. & Vassilvitskii, S. (2007). "k-means++: The Advantages of
//! Careful Seeding", *SODA '07*, 1027-1035.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::bisection::bisect;
use crate::models::{Coordinates, Stop};

/// Lloyd iterations after seeding.
pub const LLOYD_ITERATIONS: usize = 25;

fn squared(a: &Coordinates, b: &Coordinates) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

fn nearest(at: &Coordinates, centers: &[Coordinates]) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (c, center) in centers.iter().enumerate() {
        let d = squared(at, center);
        if d < best_d {
            best = c;
            best_d = d;
        }
    }
    best
}

fn seed_centers(stops: &[&Stop], k: usize, rng: &mut StdRng) -> Vec<Coordinates> {
    let mut centers = Vec::with_capacity(k);
    centers.push(stops[rng.random_range(0..stops.len())].location());
    let mut weights: Vec<f64> = stops
        .iter()
        .map(|s| squared(&s.location(), &centers[0]))
        .collect();

    while centers.len() < k {
        let total: f64 = weights.iter().sum();
        let pick = if total > 0.0 {
            let target = rng.random::<f64>() * total;
            let mut acc = 0.0;
            weights
                .iter()
                .position(|&w| {
                    acc += w;
                    acc > target
                })
                .unwrap_or(stops.len() - 1)
        } else {
            rng.random_range(0..stops.len())
        };
        let center = stops[pick].location();
        for (w, stop) in weights.iter_mut().zip(stops) {
            *w = w.min(squared(&stop.location(), &center));
        }
        centers.push(center);
    }
    centers
}

/// Groups `stops` into spatial clusters of at most `max_size` members.
///
/// `stops` must be sorted by id; a bound of zero is treated as one. The
/// same input and seed always give the same groups.
pub fn kmeans<'a>(stops: &[&'a Stop], max_size: usize, seed: u64) -> Vec<Vec<&'a Stop>> {
    let max_size = max_size.max(1);
    if stops.len() <= max_size {
        return vec![stops.to_vec()];
    }
    let k = stops.len().div_ceil(max_size);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut centers = seed_centers(stops, k, &mut rng);
    let mut assignment: Vec<usize> = stops
        .iter()
        .map(|s| nearest(&s.location(), &centers))
        .collect();

    for _ in 0..LLOYD_ITERATIONS {
        let mut sums = vec![(0.0, 0.0, 0usize); k];
        for (stop, &c) in stops.iter().zip(&assignment) {
            let at = stop.location();
            sums[c].0 += at.x;
            sums[c].1 += at.y;
            sums[c].2 += 1;
        }
        for (center, &(sx, sy, count)) in centers.iter_mut().zip(&sums) {
            if count > 0 {
                *center = Coordinates::new(sx / count as f64, sy / count as f64);
            }
        }
        let next: Vec<usize> = stops
            .iter()
            .map(|s| nearest(&s.location(), &centers))
            .collect();
        if next == assignment {
            break;
        }
        assignment = next;
    }

    let mut groups: Vec<Vec<&'a Stop>> = vec![Vec::new(); k];
    for (&stop, &c) in stops.iter().zip(&assignment) {
        groups[c].push(stop);
    }
    groups
        .into_iter()
        .filter(|g| !g.is_empty())
        .flat_map(|g| bisect(g, max_size))
        .collect()
}
