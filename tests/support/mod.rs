//! Shared builders and strategies for the integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;

use hybrid_routing::distance::{TravelCost, TravelCostIndex};
use hybrid_routing::models::{Solution, Stop, StopId, StopSet, TimeWindow};
use proptest::prelude::*;

/// Unit square corners around a depot at the origin.
pub fn square() -> (Stop, Vec<Stop>) {
    (
        Stop::new("depot", 0.0, 0.0),
        vec![
            Stop::new("a", 1.0, 0.0),
            Stop::new("b", 1.0, 1.0),
            Stop::new("c", 0.0, 1.0),
        ],
    )
}

/// Euclidean index over the given stops plus any extra locations.
pub fn euclidean(stops: &[Stop], extra: &[&Stop]) -> TravelCostIndex {
    let mut all: Vec<Stop> = stops.to_vec();
    all.extend(extra.iter().map(|s| (*s).clone()));
    TravelCostIndex::from_coordinates(&all, 1.0).expect("distinct ids")
}

/// Euclidean index with one ordered pair left out.
pub fn euclidean_without(stops: &[Stop], missing: (&str, &str)) -> TravelCostIndex {
    let mut entries = Vec::new();
    for from in stops {
        for to in stops {
            if from.id() == to.id() {
                continue;
            }
            if from.id().as_str() == missing.0 && to.id().as_str() == missing.1 {
                continue;
            }
            let d = from.location().distance_to(&to.location());
            entries.push((from.id().clone(), to.id().clone(), TravelCost::new(d, d)));
        }
    }
    TravelCostIndex::from_entries(entries).expect("valid entries")
}

/// Stops laid out on an `n × n` grid with unit spacing.
pub fn grid(n: usize) -> Vec<Stop> {
    let mut stops = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            stops.push(Stop::new(format!("g{i:02}-{j:02}"), i as f64, j as f64));
        }
    }
    stops
}

/// Sum of index lookups along the route, anchors included.
pub fn recomputed_distance(solution: &Solution, index: &TravelCostIndex) -> f64 {
    solution
        .route()
        .sequence()
        .windows(2)
        .map(|w| index.cost(&w[0], &w[1]).expect("leg present").distance)
        .sum()
}

/// Asserts every stop is either routed or reported infeasible, exactly once.
pub fn assert_covers(solution: &Solution, stops: &StopSet) {
    let mut seen = BTreeSet::new();
    for id in solution.route().stop_ids() {
        assert!(seen.insert(id.clone()), "`{id}` visited twice");
    }
    for s in solution.infeasible() {
        assert!(seen.insert(s.stop_id.clone()), "`{}` reported twice", s.stop_id);
    }
    let expected: BTreeSet<StopId> = stops.iter().map(|s| s.id().clone()).collect();
    assert_eq!(seen, expected);
}

/// Strategy for a set of stops with unique ids, some with time windows.
pub fn stop_strategy(max: usize) -> impl Strategy<Value = Vec<Stop>> {
    proptest::collection::vec(
        (
            0.0_f64..100.0,
            0.0_f64..100.0,
            proptest::option::weighted(0.3, 20.0_f64..400.0),
            0.0_f64..3.0,
        ),
        1..=max,
    )
    .prop_map(|raw| {
        raw.into_iter()
            .enumerate()
            .map(|(idx, (x, y, latest, service))| {
                let stop = Stop::new(format!("s{idx:03}"), x, y).with_service_duration(service);
                match latest.and_then(|l| TimeWindow::new(0.0, l)) {
                    Some(tw) => stop.with_time_window(tw),
                    None => stop,
                }
            })
            .collect()
    })
}

/// Depot in the middle of the strategy's square.
pub fn depot() -> Stop {
    Stop::new("depot", 50.0, 50.0)
}
