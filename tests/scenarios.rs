//! End-to-end behaviour of the solver facade.

mod support;

use std::time::Duration;

use hybrid_routing::distance::{TravelCost, TravelCostIndex};
use hybrid_routing::models::{
    Anchors, Diagnostic, InfeasibleReason, SolutionStatus, Stop, StopId, StopSet, TimeWindow,
};
use hybrid_routing::partition::Partitioner;
use hybrid_routing::{
    Acceptance, CostModel, DurationPolicy, HybridSolver, PartitionStrategy, SolveError,
    SolverConfig,
};
use rstest::rstest;
use support::{assert_covers, euclidean, euclidean_without, grid, recomputed_distance, square};

fn ids(solution: &hybrid_routing::models::Solution) -> Vec<&str> {
    solution
        .route()
        .visits()
        .iter()
        .map(|v| v.stop_id.as_str())
        .collect()
}

#[rstest]
#[case(PartitionStrategy::Bisection, Acceptance::FirstImprovement)]
#[case(PartitionStrategy::Bisection, Acceptance::BestImprovement)]
#[case(PartitionStrategy::KMeans, Acceptance::FirstImprovement)]
#[case(PartitionStrategy::KMeans, Acceptance::BestImprovement)]
fn square_round_trip_has_perimeter_length(
    #[case] partition: PartitionStrategy,
    #[case] acceptance: Acceptance,
) {
    let (depot, corners) = square();
    let index = euclidean(&corners, &[&depot]);
    let stops = StopSet::new(corners).expect("valid stops");
    let config = SolverConfig {
        partition,
        acceptance,
        ..SolverConfig::default()
    };

    let solution = HybridSolver::new(config)
        .solve(&stops, &index, &Anchors::round_trip(depot))
        .expect("solvable");

    assert!((solution.total_distance() - 4.0).abs() < 1e-10);
    let order = ids(&solution);
    assert!(order == ["a", "b", "c"] || order == ["c", "b", "a"], "{order:?}");
    assert_eq!(solution.status(), SolutionStatus::LocallyOptimal);
    let sequence = solution.route().sequence();
    assert_eq!(sequence.first(), sequence.last());
    assert_eq!(sequence.len(), 5);
}

#[rstest]
fn impossible_window_is_reported_not_fatal() {
    let (depot, mut corners) = square();
    corners.push(
        Stop::new("late", 5.0, 5.0)
            .with_time_window(TimeWindow::new(0.0, 1.0).expect("ordered window")),
    );
    let index = euclidean(&corners, &[&depot]);
    let stops = StopSet::new(corners).expect("valid stops");

    let solution = HybridSolver::default()
        .solve(&stops, &index, &Anchors::round_trip(depot))
        .expect("solvable");

    assert_eq!(solution.num_infeasible(), 1);
    let late = &solution.infeasible()[0];
    assert_eq!(late.stop_id, StopId::from("late"));
    assert_eq!(late.reason, InfeasibleReason::TimeWindow { latest: 1.0 });
    assert_eq!(solution.num_served(), 3);
    assert!((solution.total_distance() - 4.0).abs() < 1e-10);
    assert_eq!(solution.status(), SolutionStatus::Partial);
    assert_covers(&solution, &stops);
}

#[rstest]
#[case(PartitionStrategy::Bisection)]
#[case(PartitionStrategy::KMeans)]
fn below_threshold_is_one_cluster(#[case] partition: PartitionStrategy) {
    let depot = Stop::new("depot", 0.0, 0.0);
    let points = grid(5);
    let index = euclidean(&points, &[&depot]);
    let stops = StopSet::new(points).expect("valid stops");
    let config = SolverConfig {
        max_cluster_size: 25,
        partition,
        ..SolverConfig::default()
    };

    let refs: Vec<&Stop> = stops.iter().collect();
    assert_eq!(Partitioner::from_config(&config).partition(&refs).len(), 1);

    let solution = HybridSolver::new(config)
        .solve(&stops, &index, &Anchors::round_trip(depot))
        .expect("solvable");
    assert_eq!(solution.num_clusters(), 1);
    assert!(solution.is_complete());
}

#[rstest]
fn missing_pair_names_the_pair() {
    let (depot, corners) = square();
    let mut all = corners.clone();
    all.push(depot.clone());
    let index = euclidean_without(&all, ("b", "c"));
    let stops = StopSet::new(corners).expect("valid stops");

    let err = HybridSolver::default()
        .solve(&stops, &index, &Anchors::round_trip(depot))
        .expect_err("pair b -> c is missing");
    assert_eq!(
        err,
        SolveError::UnreachableEdge {
            from: StopId::from("b"),
            to: StopId::from("c"),
        }
    );
}

#[rstest]
fn stop_absent_from_index_is_rejected() {
    let (depot, corners) = square();
    let index = euclidean(&corners[..2], &[&depot]);
    let stops = StopSet::new(corners).expect("valid stops");

    let err = HybridSolver::default()
        .solve(&stops, &index, &Anchors::round_trip(depot))
        .expect_err("c is unknown to the index");
    assert!(matches!(err, SolveError::InvalidStopSet { .. }));
}

#[rstest]
fn zero_cluster_bound_is_invalid_config() {
    let (depot, corners) = square();
    let index = euclidean(&corners, &[&depot]);
    let stops = StopSet::new(corners).expect("valid stops");
    let config = SolverConfig {
        max_cluster_size: 0,
        ..SolverConfig::default()
    };

    let err = HybridSolver::new(config)
        .solve(&stops, &index, &Anchors::round_trip(depot))
        .expect_err("zero bound");
    assert!(matches!(err, SolveError::InvalidConfig { .. }));
}

#[rstest]
fn empty_stop_set_gives_empty_route() {
    let depot = Stop::new("depot", 0.0, 0.0);
    let index = euclidean(&[], &[&depot]);
    let stops = StopSet::new(Vec::new()).expect("empty set is valid");

    let solution = HybridSolver::default()
        .solve(&stops, &index, &Anchors::round_trip(depot))
        .expect("solvable");
    assert!(solution.route().is_empty());
    assert_eq!(solution.total_distance(), 0.0);
    assert_eq!(solution.total_cost(), 0.0);
    assert_eq!(solution.num_clusters(), 0);
}

#[rstest]
fn anchor_inside_stop_set_is_covered() {
    let (depot, mut corners) = square();
    corners.push(depot.clone());
    let index = euclidean(&corners, &[]);
    let stops = StopSet::new(corners).expect("valid stops");

    let solution = HybridSolver::default()
        .solve(&stops, &index, &Anchors::round_trip(depot))
        .expect("solvable");
    assert_eq!(solution.num_served(), 3);
    assert!(!ids(&solution).contains(&"depot"));
}

#[rstest]
#[case::fixed(true, 3.0)]
#[case::open(false, 2.0)]
fn end_policy_shapes_the_route(#[case] fixed: bool, #[case] expected: f64) {
    let start = Stop::new("start", 0.0, 0.0);
    let finish = Stop::new("finish", 3.0, 0.0);
    let points = vec![Stop::new("p2", 2.0, 0.0), Stop::new("p1", 1.0, 0.0)];
    let index = euclidean(&points, &[&start, &finish]);
    let stops = StopSet::new(points).expect("valid stops");
    let anchors = if fixed {
        Anchors::fixed_end(start, finish)
    } else {
        Anchors::open(start)
    };

    let solution = HybridSolver::default()
        .solve(&stops, &index, &anchors)
        .expect("solvable");
    assert_eq!(ids(&solution), ["p1", "p2"]);
    assert!((solution.total_distance() - expected).abs() < 1e-10);
}

#[rstest]
#[case(PartitionStrategy::Bisection)]
#[case(PartitionStrategy::KMeans)]
fn large_grid_is_clustered_and_stitched(#[case] partition: PartitionStrategy) {
    let depot = Stop::new("depot", -1.0, -1.0);
    let points = grid(12);
    let index = euclidean(&points, &[&depot]);
    let stops = StopSet::new(points).expect("valid stops");
    let config = SolverConfig {
        max_cluster_size: 20,
        partition,
        seed: 11,
        ..SolverConfig::default()
    };

    let solution = HybridSolver::new(config)
        .solve(&stops, &index, &Anchors::round_trip(depot))
        .expect("solvable");

    assert!(solution.num_clusters() > 1);
    assert!(solution.is_complete());
    assert_covers(&solution, &stops);
    let recomputed = recomputed_distance(&solution, &index);
    assert!((solution.total_distance() - recomputed).abs() < 1e-6);
    // A tour through 144 unit-spaced points cannot beat 144.
    assert!(solution.total_distance() >= 144.0 - 1e-9);
}

#[rstest]
fn solving_twice_gives_the_same_solution() {
    let depot = Stop::new("depot", 5.0, 5.0);
    let points = grid(9);
    let index = euclidean(&points, &[&depot]);
    let stops = StopSet::new(points).expect("valid stops");
    let solver = HybridSolver::new(SolverConfig {
        max_cluster_size: 15,
        partition: PartitionStrategy::KMeans,
        seed: 7,
        ..SolverConfig::default()
    });
    let anchors = Anchors::round_trip(depot);

    let first = solver.solve(&stops, &index, &anchors).expect("solvable");
    let second = solver.solve(&stops, &index, &anchors).expect("solvable");
    assert_eq!(first, second);
}

#[rstest]
fn pass_budget_marks_solution_budget_limited() {
    let (depot, corners) = square();
    let index = euclidean(&corners, &[&depot]);
    let stops = StopSet::new(corners).expect("valid stops");
    let config = SolverConfig {
        max_passes: Some(0),
        ..SolverConfig::default()
    };

    let solution = HybridSolver::new(config)
        .solve(&stops, &index, &Anchors::round_trip(depot))
        .expect("solvable");
    assert!(!solution.converged());
    assert_eq!(solution.status(), SolutionStatus::BudgetLimited);
    assert!(solution
        .diagnostics()
        .iter()
        .any(|d| matches!(d, Diagnostic::BudgetExceeded { passes: 0, .. })));
    assert_covers(&solution, &stops);
}

#[rstest]
fn zero_time_limit_still_returns_a_route() {
    let depot = Stop::new("depot", 0.0, 0.0);
    let points = grid(6);
    let index = euclidean(&points, &[&depot]);
    let stops = StopSet::new(points).expect("valid stops");
    let config = SolverConfig {
        time_limit: Some(Duration::ZERO),
        ..SolverConfig::default()
    };

    let solution = HybridSolver::new(config)
        .solve(&stops, &index, &Anchors::round_trip(depot))
        .expect("solvable");
    assert_eq!(solution.num_served(), 36);
    assert_eq!(solution.status(), SolutionStatus::BudgetLimited);
}

#[rstest]
fn route_duration_limit_is_soft() {
    let (depot, corners) = square();
    let index = euclidean(&corners, &[&depot]);
    let stops = StopSet::new(corners).expect("valid stops");
    let config = SolverConfig {
        max_route_duration: Some(3.0),
        ..SolverConfig::default()
    };

    let solution = HybridSolver::new(config)
        .solve(&stops, &index, &Anchors::round_trip(depot))
        .expect("solvable");
    assert!(solution.is_complete());
    let exceeded = solution.diagnostics().iter().find_map(|d| match d {
        Diagnostic::RouteDurationExceeded { duration, limit } => Some((*duration, *limit)),
        _ => None,
    });
    let (duration, limit) = exceeded.expect("duration diagnostic");
    assert!((duration - 4.0).abs() < 1e-10);
    assert_eq!(limit, 3.0);
    assert_eq!(solution.status(), SolutionStatus::LocallyOptimal);
}

#[rstest]
fn route_duration_limit_can_be_enforced() {
    let (depot, corners) = square();
    let index = euclidean(&corners, &[&depot]);
    let stops = StopSet::new(corners).expect("valid stops");
    let config = SolverConfig {
        max_route_duration: Some(3.0),
        duration_policy: DurationPolicy::Enforce,
        ..SolverConfig::default()
    };

    let solution = HybridSolver::new(config)
        .solve(&stops, &index, &Anchors::round_trip(depot))
        .expect("solvable");
    assert_covers(&solution, &stops);
    assert!(solution.total_duration() <= 3.0 + 1e-10);
    assert_eq!(solution.num_served(), 1);
    assert_eq!(solution.num_infeasible(), 2);
    for dropped in solution.infeasible() {
        assert_eq!(dropped.reason, InfeasibleReason::RouteDuration { limit: 3.0 });
    }
    assert!(solution.infeasible()[0].stop_id < solution.infeasible()[1].stop_id);
    assert!(!solution
        .diagnostics()
        .iter()
        .any(|d| matches!(d, Diagnostic::RouteDurationExceeded { .. })));
    assert_eq!(solution.status(), SolutionStatus::Partial);
}

#[rstest]
fn over_capacity_stops_are_reported_in_id_order() {
    let (depot, corners) = square();
    let index = euclidean(&corners, &[&depot]);
    let demands = [2.0, 3.0, 1.0];
    let loaded = corners
        .into_iter()
        .zip(demands)
        .map(|(s, d)| s.with_demand(d))
        .collect();
    let stops = StopSet::new(loaded).expect("valid stops");
    let config = SolverConfig {
        vehicle_capacity: Some(4.0),
        ..SolverConfig::default()
    };

    let solution = HybridSolver::new(config)
        .solve(&stops, &index, &Anchors::round_trip(depot))
        .expect("solvable");
    assert_covers(&solution, &stops);
    // "a" fills 2, "b" would reach 5, "c" still fits.
    let mut served = ids(&solution);
    served.sort_unstable();
    assert_eq!(served, vec!["a", "c"]);
    assert_eq!(solution.infeasible().len(), 1);
    assert_eq!(solution.infeasible()[0].stop_id, StopId::from("b"));
    assert_eq!(
        solution.infeasible()[0].reason,
        InfeasibleReason::Capacity {
            demand: 3.0,
            capacity: 4.0
        }
    );
    assert!((solution.total_demand() - 3.0).abs() < 1e-10);
    assert_eq!(solution.status(), SolutionStatus::Partial);
}

#[rstest]
#[case::fits(1.0, true)]
#[case::overflows(2.0, false)]
fn late_stop_respects_capacity(#[case] demand: f64, #[case] served: bool) {
    let (depot, corners) = square();
    let extra = Stop::new("d", 0.5, 0.0).with_demand(demand);
    let index = euclidean(&corners, &[&depot, &extra]);
    let stops = StopSet::new(corners.into_iter().map(|s| s.with_demand(1.0)).collect())
        .expect("valid stops");
    let anchors = Anchors::round_trip(depot);
    let solver = HybridSolver::new(SolverConfig {
        vehicle_capacity: Some(4.0),
        ..SolverConfig::default()
    });

    let solution = solver.solve(&stops, &index, &anchors).expect("solvable");
    assert!(solution.is_complete());
    let updated = solver
        .insert_stop(&solution, &stops, &extra, &index, &anchors)
        .expect("valid insert");

    assert_eq!(ids(&updated).contains(&"d"), served);
    if served {
        assert!(updated.is_complete());
        assert!((updated.total_demand() - 4.0).abs() < 1e-10);
    } else {
        assert_eq!(updated.num_served(), 3);
        assert_eq!(updated.infeasible()[0].stop_id, StopId::from("d"));
        assert_eq!(
            updated.infeasible()[0].reason,
            InfeasibleReason::Capacity {
                demand: 2.0,
                capacity: 4.0
            }
        );
    }
}

#[rstest]
fn late_direct_leg_is_served_through_a_detour() {
    // Travel times break the triangle inequality: depot to "x" directly is
    // too slow for its window, but going via "y" arrives in time.
    let legs = [
        ("depot", "x", 10.0),
        ("depot", "y", 1.0),
        ("x", "depot", 1.0),
        ("x", "y", 1.0),
        ("y", "depot", 1.0),
        ("y", "x", 1.0),
    ];
    let index = TravelCostIndex::from_entries(
        legs.iter()
            .map(|&(a, b, d)| (StopId::from(a), StopId::from(b), TravelCost::new(d, d))),
    )
    .expect("valid entries");
    let stops = StopSet::new(vec![
        Stop::new("x", 0.0, 0.0).with_time_window(TimeWindow::new(0.0, 5.0).expect("ordered")),
        Stop::new("y", 0.0, 0.0),
    ])
    .expect("valid stops");

    let solution = HybridSolver::default()
        .solve(&stops, &index, &Anchors::round_trip(Stop::new("depot", 0.0, 0.0)))
        .expect("solvable");
    assert!(solution.is_complete());
    assert_eq!(ids(&solution), vec!["y", "x"]);
    assert!((solution.total_distance() - 3.0).abs() < 1e-10);
}

#[rstest]
fn cost_model_prices_the_route() {
    let (depot, corners) = square();
    let index = euclidean(&corners, &[&depot]);
    let stops = StopSet::new(corners.into_iter().map(|s| s.with_demand(2.5)).collect())
        .expect("valid stops");
    let config = SolverConfig {
        cost_model: CostModel {
            fixed_cost: 10.0,
            cost_per_distance: 2.0,
        },
        ..SolverConfig::default()
    };

    let solution = HybridSolver::new(config)
        .solve(&stops, &index, &Anchors::round_trip(depot))
        .expect("solvable");
    assert!((solution.total_cost() - 18.0).abs() < 1e-10);
    assert!((solution.total_demand() - 7.5).abs() < 1e-10);
}

#[rstest]
fn late_stop_goes_to_cheapest_slot() {
    let (depot, corners) = square();
    let extra = Stop::new("d", 0.5, 0.0);
    let index = euclidean(&corners, &[&depot, &extra]);
    let stops = StopSet::new(corners).expect("valid stops");
    let anchors = Anchors::round_trip(depot);
    let solver = HybridSolver::default();

    let solution = solver.solve(&stops, &index, &anchors).expect("solvable");
    let order = ids(&solution);
    let updated = solver
        .insert_stop(&solution, &stops, &extra, &index, &anchors)
        .expect("insertable");

    assert_eq!(updated.num_served(), 4);
    assert!((updated.total_distance() - 4.0).abs() < 1e-10);
    let updated_order = ids(&updated);
    // d sits on the depot-a edge, whichever way the square is walked.
    let expected: Vec<&str> = if order[0] == "a" {
        vec!["d", "a", "b", "c"]
    } else {
        vec!["c", "b", "a", "d"]
    };
    assert_eq!(updated_order, expected);
}

#[rstest]
#[case::routed("b")]
#[case::anchor("depot")]
fn duplicate_late_stop_is_rejected(#[case] id: &str) {
    let (depot, corners) = square();
    let index = euclidean(&corners, &[&depot]);
    let stops = StopSet::new(corners).expect("valid stops");
    let anchors = Anchors::round_trip(depot);
    let solver = HybridSolver::default();
    let solution = solver.solve(&stops, &index, &anchors).expect("solvable");

    let err = solver
        .insert_stop(&solution, &stops, &Stop::new(id, 0.5, 0.5), &index, &anchors)
        .expect_err("duplicate id");
    assert!(matches!(err, SolveError::InvalidStopSet { .. }));
}

#[rstest]
fn late_stop_outside_its_window_is_infeasible() {
    let (depot, corners) = square();
    let extra = Stop::new("far", 9.0, 9.0)
        .with_time_window(TimeWindow::new(0.0, 2.0).expect("ordered window"));
    let index = euclidean(&corners, &[&depot, &extra]);
    let stops = StopSet::new(corners).expect("valid stops");
    let anchors = Anchors::round_trip(depot);
    let solver = HybridSolver::default();
    let solution = solver.solve(&stops, &index, &anchors).expect("solvable");

    let updated = solver
        .insert_stop(&solution, &stops, &extra, &index, &anchors)
        .expect("valid insert");
    assert_eq!(updated.num_served(), 3);
    assert_eq!(updated.infeasible()[0].stop_id, StopId::from("far"));
    assert_eq!(updated.status(), SolutionStatus::Partial);
}

#[rstest]
fn solution_serializes_with_named_fields() {
    let (depot, corners) = square();
    let index = euclidean(&corners, &[&depot]);
    let stops = StopSet::new(corners).expect("valid stops");
    let solution = HybridSolver::default()
        .solve(&stops, &index, &Anchors::round_trip(depot))
        .expect("solvable");

    let value = serde_json::to_value(&solution).expect("serializable");
    assert_eq!(value["route"]["visits"].as_array().map(Vec::len), Some(3));
    assert!(value["route"]["visits"][0]["stop_id"].is_string());
    assert_eq!(value["infeasible"].as_array().map(Vec::len), Some(0));
    assert!(value["total_cost"].is_number());
}

#[rstest]
fn config_fills_missing_fields_with_defaults() {
    let config: SolverConfig =
        serde_json::from_str(r#"{ "max_cluster_size": 12, "partition": "KMeans" }"#)
            .expect("valid json");
    assert_eq!(config.max_cluster_size, 12);
    assert_eq!(config.partition, PartitionStrategy::KMeans);
    assert_eq!(config.seam_radius, SolverConfig::default().seam_radius);
    assert!(config.validate().is_ok());
}
