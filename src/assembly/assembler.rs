//! Stitching cluster routes into one route.

use log::{debug, warn};

use crate::config::{DurationPolicy, SolverConfig};
use crate::constructive::cheapest_feasible_insertion;
use crate::distance::TravelCostIndex;
use crate::error::{Result, SolveError};
use crate::evaluation::{RouteEvaluator, RoutingContext, Terminal};
use crate::local_search::{RefineOptions, RefineReport, RouteRefiner};
use crate::models::{
    validate_stop, Anchors, Diagnostic, InfeasibleReason, InfeasibleStop, RouteEnd, Solution,
    Stop, StopSet,
};
use crate::partition::Cluster;

/// Refined route of one cluster, ready for stitching.
#[derive(Debug, Clone)]
pub struct ClusterRoute<'a> {
    /// Visits in route order.
    pub stops: Vec<&'a Stop>,
    /// Members with no feasible position inside the cluster. They are
    /// retried against the stitched route.
    pub unplaced: Vec<&'a Stop>,
    /// Refinement outcome.
    pub report: RefineReport,
}

/// Terminal matching the anchors' end policy.
pub(crate) fn end_terminal(anchors: &Anchors) -> Terminal<'_> {
    match anchors.end() {
        RouteEnd::ReturnToStart => Terminal::At(anchors.start()),
        RouteEnd::Fixed(stop) => Terminal::At(stop),
        RouteEnd::Open => Terminal::Open,
    }
}

fn late(stop: &Stop) -> InfeasibleStop {
    InfeasibleStop {
        stop_id: stop.id().clone(),
        reason: InfeasibleReason::TimeWindow {
            latest: stop.time_window().map_or(f64::INFINITY, |tw| tw.latest()),
        },
    }
}

fn too_long(stop: &Stop, limit: f64) -> InfeasibleStop {
    InfeasibleStop {
        stop_id: stop.id().clone(),
        reason: InfeasibleReason::RouteDuration { limit },
    }
}

fn overload(stop: &Stop, capacity: f64) -> InfeasibleStop {
    InfeasibleStop {
        stop_id: stop.id().clone(),
        reason: InfeasibleReason::Capacity {
            demand: stop.demand(),
            capacity,
        },
    }
}

/// Orders, stitches, and finalizes cluster routes.
///
/// After concatenation a seam pass refines a small window around every
/// cluster boundary, the full schedule is re-evaluated against the real
/// end anchor, and stops whose window broke are removed. Those stops and
/// the ones no cluster could place are re-inserted at their cheapest
/// feasible position or reported infeasible. Under
/// [`DurationPolicy::Enforce`] stops are then dropped until the route fits
/// `max_route_duration`.
#[derive(Debug, Clone, Copy)]
pub struct RouteAssembler<'a> {
    config: &'a SolverConfig,
    costs: &'a TravelCostIndex,
    anchors: &'a Anchors,
    evaluator: RouteEvaluator<'a>,
}

impl<'a> RouteAssembler<'a> {
    /// Creates an assembler.
    pub fn new(config: &'a SolverConfig, costs: &'a TravelCostIndex, anchors: &'a Anchors) -> Self {
        Self {
            config,
            costs,
            anchors,
            evaluator: RouteEvaluator::new(costs, anchors, config.objective, config.departure_time),
        }
    }

    /// Splits `stops`, given in id order, into the ones the vehicle can
    /// carry and the ones that would overload it.
    ///
    /// Stops are admitted greedily in the given order; a stop that does not
    /// fit is skipped and later, lighter stops may still be admitted.
    pub fn admit<'s>(&self, stops: Vec<&'s Stop>) -> (Vec<&'s Stop>, Vec<InfeasibleStop>) {
        let Some(capacity) = self.config.vehicle_capacity else {
            return (stops, Vec::new());
        };
        let mut load = 0.0;
        let mut admitted = Vec::with_capacity(stops.len());
        let mut rejected = Vec::new();
        for stop in stops {
            if load + stop.demand() > capacity {
                rejected.push(overload(stop, capacity));
            } else {
                load += stop.demand();
                admitted.push(stop);
            }
        }
        (admitted, rejected)
    }

    /// Orders clusters nearest-centroid-first, starting from the start
    /// anchor. Ties go to the lower cluster index.
    pub fn order_clusters(&self, clusters: Vec<Cluster>) -> Vec<Cluster> {
        let mut pending: Vec<Option<Cluster>> = clusters.into_iter().map(Some).collect();
        let mut ordered = Vec::with_capacity(pending.len());
        let mut here = self.anchors.start().location();
        loop {
            let mut best: Option<(usize, f64)> = None;
            for (idx, cluster) in pending.iter().enumerate() {
                if let Some(cluster) = cluster {
                    let d = here.distance_to(&cluster.centroid());
                    if best.is_none_or(|(_, bd)| d < bd) {
                        best = Some((idx, d));
                    }
                }
            }
            let Some((idx, _)) = best else {
                break;
            };
            if let Some(cluster) = pending[idx].take() {
                here = cluster.centroid();
                ordered.push(cluster);
            }
        }
        ordered
    }

    /// Stitches cluster routes, given in visiting order, into a solution.
    ///
    /// `rejected` holds stops already excluded before routing, such as the
    /// ones [`admit`](Self::admit) turned away.
    pub fn assemble(
        &self,
        parts: Vec<ClusterRoute<'a>>,
        rejected: Vec<InfeasibleStop>,
    ) -> Result<Solution> {
        let clusters = parts.len();
        let mut seq: Vec<&'a Stop> = Vec::new();
        let mut boundaries = Vec::new();
        let mut unplaced = Vec::new();
        let mut diagnostics = Vec::new();

        for (cluster, part) in parts.into_iter().enumerate() {
            if !seq.is_empty() && !part.stops.is_empty() {
                boundaries.push(seq.len());
            }
            seq.extend(part.stops);
            unplaced.extend(part.unplaced);
            if !part.report.converged {
                diagnostics.push(Diagnostic::BudgetExceeded {
                    cluster,
                    passes: part.report.passes,
                    elapsed: part.report.elapsed,
                });
            }
        }

        let moves = self.stitch(&mut seq, &boundaries)?;
        debug!(
            "stitched {} clusters over {} seams with {} moves",
            clusters,
            boundaries.len(),
            moves
        );
        self.finalize(seq, unplaced, rejected, diagnostics, clusters)
    }

    /// Inserts `stop` into an existing solution at its cheapest feasible
    /// position.
    ///
    /// `stops` is the stop set `solution` was solved from; `stop` must not
    /// already belong to it. A stop that would overload the vehicle or fits
    /// nowhere is added to the infeasible list instead.
    pub fn insert(
        &self,
        solution: &Solution,
        stops: &'a StopSet,
        stop: &'a Stop,
    ) -> Result<Solution> {
        validate_stop(stop)?;
        let id = stop.id();
        let known = stops.contains(id)
            || self.anchors.is_anchor(id)
            || solution.route().visits().iter().any(|v| &v.stop_id == id)
            || solution.infeasible().iter().any(|s| &s.stop_id == id);
        if known {
            return Err(SolveError::invalid_stop_set(format!(
                "duplicate stop id `{id}`"
            )));
        }

        let seq = solution
            .route()
            .visits()
            .iter()
            .map(|v| {
                stops.get(&v.stop_id).ok_or_else(|| {
                    SolveError::invalid_stop_set(format!(
                        "routed stop `{}` is not in the stop set",
                        v.stop_id
                    ))
                })
            })
            .collect::<Result<Vec<&'a Stop>>>()?;

        let mut dropped = solution.infeasible().to_vec();
        let mut retry = Vec::new();
        match self.config.vehicle_capacity {
            Some(capacity) if solution.total_demand() + stop.demand() > capacity => {
                dropped.push(overload(stop, capacity));
            }
            _ => retry.push(stop),
        }

        let budget = solution
            .diagnostics()
            .iter()
            .filter(|d| matches!(d, Diagnostic::BudgetExceeded { .. }))
            .cloned()
            .collect();
        self.finalize(seq, retry, dropped, budget, solution.num_clusters())
    }

    fn stitch(&self, seq: &mut Vec<&'a Stop>, boundaries: &[usize]) -> Result<usize> {
        let radius = self.config.seam_radius;
        let mut remaining = self.config.seam_moves;
        let mut applied = 0;

        for &seam in boundaries {
            if remaining == 0 || radius == 0 {
                break;
            }
            let lo = seam.saturating_sub(radius);
            let hi = (seam + radius).min(seq.len());
            if hi - lo < 2 {
                continue;
            }

            let schedule = self.evaluator.evaluate(seq)?;
            let (before, leave) = match lo {
                0 => (self.anchors.start(), self.config.departure_time),
                _ => (seq[lo - 1], schedule.timings[lo - 1].departure),
            };
            let after = match seq.get(hi) {
                Some(&stop) => Terminal::At(stop),
                None => end_terminal(self.anchors),
            };

            let window = &seq[lo..hi];
            let mut by_id: Vec<usize> = (0..window.len()).collect();
            by_id.sort_by(|&a, &b| window[a].id().cmp(window[b].id()));
            let mut nodes = vec![0; window.len()];
            for (rank, &pos) in by_id.iter().enumerate() {
                nodes[pos] = rank + 1;
            }

            let ctx = RoutingContext::new(
                before,
                window,
                after,
                self.costs,
                self.config.objective,
                leave,
            )?;
            let options = RefineOptions {
                max_moves: Some(remaining),
                ..RefineOptions::for_seams(self.config)
            };
            let report = RouteRefiner::new(&ctx, options).refine(&mut nodes);
            if report.moves == 0 {
                continue;
            }

            let mut candidate: Vec<&'a Stop> = Vec::with_capacity(seq.len());
            candidate.extend_from_slice(&seq[..lo]);
            candidate.extend(nodes.iter().map(|&node| window[by_id[node - 1]]));
            candidate.extend_from_slice(&seq[hi..]);

            let violations = self.evaluator.evaluate(&candidate)?.violations.len();
            if violations <= schedule.violations.len() {
                *seq = candidate;
                remaining = remaining.saturating_sub(report.moves);
                applied += report.moves;
            }
        }
        Ok(applied)
    }

    fn enforced_limit(&self) -> Option<f64> {
        match self.config.duration_policy {
            DurationPolicy::Enforce => self.config.max_route_duration,
            DurationPolicy::Report => None,
        }
    }

    fn span(&self, seq: &[&'a Stop]) -> Result<f64> {
        Ok(self.evaluator.evaluate(seq)?.completion - self.evaluator.departure_time())
    }

    fn finalize(
        &self,
        mut seq: Vec<&'a Stop>,
        retry: Vec<&'a Stop>,
        mut dropped: Vec<InfeasibleStop>,
        diagnostics: Vec<Diagnostic>,
        clusters: usize,
    ) -> Result<Solution> {
        // Peel off the first late stop until the schedule holds.
        let mut pending = retry;
        loop {
            let eval = self.evaluator.evaluate(&seq)?;
            match eval.violations.first() {
                Some(&pos) => pending.push(seq.remove(pos)),
                None => break,
            }
        }

        let limit = self.enforced_limit();
        pending.sort_by(|a, b| a.id().cmp(b.id()));
        for stop in pending {
            let slot = cheapest_feasible_insertion(
                self.evaluator.legs(),
                self.evaluator.start(),
                &seq,
                self.evaluator.end(),
                stop,
                self.evaluator.departure_time(),
            )?;
            let Some(slot) = slot else {
                dropped.push(late(stop));
                continue;
            };
            seq.insert(slot.position, stop);
            if let Some(limit) = limit {
                if self.span(&seq)? > limit {
                    seq.remove(slot.position);
                    dropped.push(too_long(stop, limit));
                    continue;
                }
            }
            debug!("placed `{}` at position {}", stop.id(), slot.position);
        }
        if let Some(limit) = limit {
            self.shorten(&mut seq, limit, &mut dropped)?;
        }

        dropped.sort_by(|a, b| a.stop_id.cmp(&b.stop_id));
        for stop in &dropped {
            warn!("stop `{}` left unserved: {:?}", stop.stop_id, stop.reason);
        }

        let (route, _) = self.evaluator.build_route(&seq)?;
        let total_demand = seq.iter().map(|s| s.demand()).sum();
        let total_cost = self
            .config
            .cost_model
            .route_cost(route.total_distance(), !route.is_empty());
        let span = route.completion_time() - route.departure_time();

        let mut solution = Solution::new(route);
        solution.set_infeasible(dropped);
        solution.set_metrics(total_demand, total_cost, clusters);
        for diagnostic in diagnostics {
            solution.push_diagnostic(diagnostic);
        }
        if let Some(limit) = self.config.max_route_duration {
            if span > limit {
                warn!("route takes {span:.1}, above the limit of {limit:.1}");
                solution.push_diagnostic(Diagnostic::RouteDurationExceeded {
                    duration: span,
                    limit,
                });
            }
        }
        Ok(solution)
    }

    /// Drops visits until the route fits `limit`.
    ///
    /// Each round removes the visit whose removal gives the shortest
    /// window-feasible route, ties to the lowest id. If no removal keeps
    /// every window, the last visit goes, which leaves earlier arrivals
    /// untouched.
    fn shorten(
        &self,
        seq: &mut Vec<&'a Stop>,
        limit: f64,
        dropped: &mut Vec<InfeasibleStop>,
    ) -> Result<()> {
        while !seq.is_empty() && self.span(seq)? > limit {
            let mut best: Option<(usize, f64)> = None;
            for pos in 0..seq.len() {
                let mut trial = seq.clone();
                trial.remove(pos);
                let eval = self.evaluator.evaluate(&trial)?;
                if !eval.is_feasible() {
                    continue;
                }
                let span = eval.completion - self.evaluator.departure_time();
                let better = best.is_none_or(|(at, shortest)| {
                    span < shortest || (span == shortest && seq[pos].id() < seq[at].id())
                });
                if better {
                    best = Some((pos, span));
                }
            }
            let pos = best.map_or(seq.len() - 1, |(pos, _)| pos);
            let stop = seq.remove(pos);
            debug!("dropped `{}` to meet the route duration limit", stop.id());
            dropped.push(too_long(stop, limit));
        }
        Ok(())
    }
}
