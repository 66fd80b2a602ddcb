//! Solver facade: partition, solve clusters in parallel, assemble.

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::assembly::{end_terminal, ClusterRoute, RouteAssembler};
use crate::config::SolverConfig;
use crate::constructive::RouteBuilder;
use crate::distance::TravelCostIndex;
use crate::error::Result;
use crate::evaluation::{RoutingContext, Terminal};
use crate::local_search::{RefineOptions, RouteRefiner};
use crate::models::{validate_stop, Anchors, RouteEnd, Solution, Stop, StopSet};
use crate::partition::{Cluster, Partitioner};

/// Multi-layer route solver.
///
/// Stop sets above the cluster bound are partitioned spatially; every
/// cluster is built greedily and refined by local search on its own
/// thread, and the cluster routes are stitched into one route. The result
/// is a local optimum, not a proven optimum.
///
/// # Examples
///
/// ```
/// use hybrid_routing::distance::TravelCostIndex;
/// use hybrid_routing::models::{Anchors, Stop, StopSet};
/// use hybrid_routing::{HybridSolver, SolverConfig};
///
/// let depot = Stop::new("depot", 0.0, 0.0);
/// let stops = StopSet::new(vec![
///     Stop::new("a", 1.0, 0.0),
///     Stop::new("b", 1.0, 1.0),
///     Stop::new("c", 0.0, 1.0),
/// ]).unwrap();
/// let mut all: Vec<Stop> = stops.iter().cloned().collect();
/// all.push(depot.clone());
/// let index = TravelCostIndex::from_coordinates(&all, 1.0).unwrap();
///
/// let solver = HybridSolver::new(SolverConfig::default());
/// let solution = solver.solve(&stops, &index, &Anchors::round_trip(depot)).unwrap();
/// assert_eq!(solution.num_served(), 3);
/// assert!((solution.total_distance() - 4.0).abs() < 1e-10);
/// assert!(solution.is_complete());
/// ```
#[derive(Debug, Clone, Default)]
pub struct HybridSolver {
    config: SolverConfig,
}

impl HybridSolver {
    /// Creates a solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Plans one route over `stops` between `anchors`.
    ///
    /// Fails on invalid configuration or stops, and with
    /// [`SolveError::UnreachableEdge`](crate::SolveError::UnreachableEdge)
    /// when the index lacks a pair the route needs. Stops whose time
    /// window cannot be met are reported on the solution instead.
    pub fn solve(
        &self,
        stops: &StopSet,
        costs: &TravelCostIndex,
        anchors: &Anchors,
    ) -> Result<Solution> {
        self.config.validate()?;
        validate_stop(anchors.start())?;
        if let RouteEnd::Fixed(end) = anchors.end() {
            validate_stop(end)?;
        }
        stops.validate_against(costs)?;

        let assembler = RouteAssembler::new(&self.config, costs, anchors);
        let (members, rejected) = assembler.admit(
            stops
                .iter()
                .filter(|s| !anchors.is_anchor(s.id()))
                .collect(),
        );
        if !rejected.is_empty() {
            warn!("{} stops exceed the vehicle capacity", rejected.len());
        }
        let clusters =
            assembler.order_clusters(Partitioner::from_config(&self.config).partition(&members));
        debug!(
            "partitioned {} stops into {} clusters",
            members.len(),
            clusters.len()
        );

        let last = clusters.len().saturating_sub(1);
        let results: Vec<Result<ClusterRoute<'_>>> = clusters
            .par_iter()
            .enumerate()
            .map(|(idx, cluster)| {
                self.solve_cluster(idx, cluster, idx == last, stops, costs, anchors)
            })
            .collect();
        let parts = results.into_iter().collect::<Result<Vec<_>>>()?;

        let solution = assembler.assemble(parts, rejected)?;
        info!(
            "routed {} of {} stops in {} clusters: distance {:.3}, status {:?}",
            solution.num_served(),
            solution.num_served() + solution.num_infeasible(),
            solution.num_clusters(),
            solution.total_distance(),
            solution.status()
        );
        Ok(solution)
    }

    /// Inserts a late stop into an existing solution at its cheapest
    /// feasible position.
    ///
    /// `stops` is the stop set `solution` was solved from and must not
    /// contain `stop`. Fails with
    /// [`SolveError::InvalidStopSet`](crate::SolveError::InvalidStopSet) on
    /// a duplicate id.
    pub fn insert_stop(
        &self,
        solution: &Solution,
        stops: &StopSet,
        stop: &Stop,
        costs: &TravelCostIndex,
        anchors: &Anchors,
    ) -> Result<Solution> {
        self.config.validate()?;
        let updated =
            RouteAssembler::new(&self.config, costs, anchors).insert(solution, stops, stop)?;
        info!(
            "inserted `{}`: {} stops routed, distance {:.3}",
            stop.id(),
            updated.num_served(),
            updated.total_distance()
        );
        Ok(updated)
    }

    fn solve_cluster<'a>(
        &self,
        index: usize,
        cluster: &Cluster,
        closes_route: bool,
        stops: &'a StopSet,
        costs: &TravelCostIndex,
        anchors: &'a Anchors,
    ) -> Result<ClusterRoute<'a>> {
        let members: Vec<&'a Stop> = cluster.ids().iter().filter_map(|id| stops.get(id)).collect();
        // Only the last cluster knows where the route ends.
        let terminal = if closes_route {
            end_terminal(anchors)
        } else {
            Terminal::Open
        };
        let ctx = RoutingContext::new(
            anchors.start(),
            &members,
            terminal,
            costs,
            self.config.objective,
            self.config.departure_time,
        )?;

        let built = RouteBuilder::new(&ctx).build()?;
        let unplaced = built.infeasible.iter().map(|&node| members[node - 1]).collect();
        let mut seq = built.sequence;
        let options = RefineOptions::from_config(&self.config);
        let report = RouteRefiner::new(&ctx, options).refine(&mut seq);
        debug!(
            "cluster {}: {} stops, {} passes, {} moves, cost {:.3} -> {:.3}",
            index,
            members.len(),
            report.passes,
            report.moves,
            report.start_cost,
            report.end_cost
        );
        if !report.converged {
            warn!(
                "cluster {} stopped on its budget after {} passes",
                index, report.passes
            );
        }

        // Visit node k is the k-th member by id.
        Ok(ClusterRoute {
            stops: seq.iter().map(|&node| members[node - 1]).collect(),
            unplaced,
            report,
        })
    }
}
