//! Recursive median bisection.
//!
//! # Algorithm
//!
//! Split the points at the median of the axis with the wider spread, then
//! recurse on both halves until every part fits the size bound. Points are
//! ordered by coordinate with the stop id as tie-break, so equal
//! coordinates split deterministically. Halves are solved with
//! `rayon::join`.
//!
//! # Complexity
//!
//! O(n log² n).

use std::cmp::Ordering;

use crate::models::Stop;

fn axis_key(stop: &Stop, horizontal: bool) -> f64 {
    let at = stop.location();
    if horizontal {
        at.x
    } else {
        at.y
    }
}

/// Splits `stops` into parts of at most `max_size` members.
///
/// A bound of zero is treated as one.
pub fn bisect<'a>(mut stops: Vec<&'a Stop>, max_size: usize) -> Vec<Vec<&'a Stop>> {
    let max_size = max_size.max(1);
    if stops.len() <= max_size {
        return vec![stops];
    }

    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for stop in &stops {
        let at = stop.location();
        min_x = min_x.min(at.x);
        max_x = max_x.max(at.x);
        min_y = min_y.min(at.y);
        max_y = max_y.max(at.y);
    }
    let horizontal = max_x - min_x >= max_y - min_y;

    stops.sort_by(|a, b| {
        axis_key(a, horizontal)
            .total_cmp(&axis_key(b, horizontal))
            .then_with(|| a.id().cmp(b.id()))
    });
    let right = stops.split_off(stops.len() / 2);

    let (mut low, high) = rayon::join(|| bisect(stops, max_size), || bisect(right, max_size));
    low.extend(high);
    low
}

/// Orders a part by stop id.
pub(crate) fn by_id(a: &&Stop, b: &&Stop) -> Ordering {
    a.id().cmp(b.id())
}
