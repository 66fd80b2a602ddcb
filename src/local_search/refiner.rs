//! Budgeted local search over 2-opt and Or-opt.
//!
//! # Algorithm
//!
//! Each pass scans the 2-opt neighborhood and then the Or-opt neighborhood
//! in a fixed order. First-improvement applies the first strictly improving
//! move found; best-improvement applies the most improving one (earliest in
//! scan order on ties). Candidates that would miss a time window are
//! skipped. When a pass finds no improving move the route is a local
//! optimum; if equal-cost moves are accepted, one such move may be applied
//! there, after which scanning resumes with ties disabled until no improving
//! move remains.
//!
//! The budget (passes, wall-clock time, applied moves) is checked at the
//! start of every pass. The sequence is a valid permutation after every
//! applied move, so stopping early always leaves a usable route.

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use super::or_opt::or_opt_moves;
use super::two_opt::two_opt_moves;
use crate::config::{Acceptance, SolverConfig};
use crate::evaluation::RoutingContext;

const EPSILON: f64 = 1e-10;

/// A neighborhood move on a visit sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Reverse positions `i..=j`.
    TwoOpt {
        /// First reversed position.
        i: usize,
        /// Last reversed position.
        j: usize,
    },
    /// Move `len` stops starting at `from` to the gap before original
    /// position `to`.
    OrOpt {
        /// Segment start.
        from: usize,
        /// Segment length.
        len: usize,
        /// Target gap, in positions of the unmodified sequence.
        to: usize,
    },
}

impl Move {
    /// Returns the sequence with the move applied.
    pub fn apply(&self, seq: &[usize]) -> Vec<usize> {
        match *self {
            Move::TwoOpt { i, j } => {
                let mut out = seq.to_vec();
                out[i..=j].reverse();
                out
            }
            Move::OrOpt { from, len, to } => {
                let segment = &seq[from..from + len];
                let mut out: Vec<usize> = Vec::with_capacity(seq.len());
                out.extend_from_slice(&seq[..from]);
                out.extend_from_slice(&seq[from + len..]);
                let at = if to < from { to } else { to - len };
                out.splice(at..at, segment.iter().copied());
                out
            }
        }
    }
}

/// Objective cost of `from → to`, zero when there is no `to`.
pub(crate) fn leg_cost(ctx: &RoutingContext, from: usize, to: Option<usize>) -> f64 {
    to.map_or(0.0, |to| ctx.matrix().get(from, to))
}

/// Search policy and budget.
#[derive(Debug, Clone, PartialEq)]
pub struct RefineOptions {
    /// First- or best-improvement.
    pub acceptance: Acceptance,
    /// Allow one equal-cost move once no improving move remains.
    pub accept_equal_moves: bool,
    /// Passes allowed; `None` is unbounded.
    pub max_passes: Option<usize>,
    /// Wall-clock budget; `None` is unbounded.
    pub time_limit: Option<Duration>,
    /// Applied moves allowed; `None` is unbounded.
    pub max_moves: Option<usize>,
}

impl Default for RefineOptions {
    fn default() -> Self {
        Self::from_config(&SolverConfig::default())
    }
}

impl RefineOptions {
    /// Per-cluster options taken from the solver configuration.
    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            acceptance: config.acceptance,
            accept_equal_moves: config.accept_equal_moves,
            max_passes: config.max_passes,
            time_limit: config.time_limit,
            max_moves: None,
        }
    }

    /// Options for the cross-cluster seam pass.
    pub fn for_seams(config: &SolverConfig) -> Self {
        Self {
            accept_equal_moves: false,
            max_moves: Some(config.seam_moves),
            ..Self::from_config(config)
        }
    }
}

/// Outcome of a refinement run.
#[derive(Debug, Clone, PartialEq)]
pub struct RefineReport {
    /// Passes started.
    pub passes: usize,
    /// Moves applied.
    pub moves: usize,
    /// `true` if a pass found no improving move.
    pub converged: bool,
    /// Objective cost before refinement.
    pub start_cost: f64,
    /// Objective cost after refinement.
    pub end_cost: f64,
    /// Time spent.
    pub elapsed: Duration,
}

/// Improves a cluster route without changing its membership.
///
/// # Examples
///
/// ```
/// use hybrid_routing::distance::TravelCostIndex;
/// use hybrid_routing::evaluation::{RoutingContext, Terminal};
/// use hybrid_routing::local_search::{RefineOptions, RouteRefiner};
/// use hybrid_routing::models::Stop;
/// use hybrid_routing::Objective;
///
/// let stops = vec![
///     Stop::new("depot", 0.0, 0.0),
///     Stop::new("a", 1.0, 0.0),
///     Stop::new("b", 1.0, 1.0),
///     Stop::new("c", 0.0, 1.0),
/// ];
/// let index = TravelCostIndex::from_coordinates(&stops, 1.0).unwrap();
/// let members: Vec<&Stop> = stops[1..].iter().collect();
/// let ctx = RoutingContext::new(
///     &stops[0], &members, Terminal::Start, &index, Objective::Distance, 0.0,
/// ).unwrap();
///
/// // a, c, b crosses itself.
/// let mut seq = vec![1, 3, 2];
/// let report = RouteRefiner::new(&ctx, RefineOptions::default()).refine(&mut seq);
/// assert!(report.converged);
/// assert!((report.end_cost - 4.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone)]
pub struct RouteRefiner<'a> {
    ctx: &'a RoutingContext,
    options: RefineOptions,
}

impl<'a> RouteRefiner<'a> {
    /// Creates a refiner over a cluster context.
    pub fn new(ctx: &'a RoutingContext, options: RefineOptions) -> Self {
        Self { ctx, options }
    }

    /// Refines `seq` in place.
    pub fn refine(&self, seq: &mut Vec<usize>) -> RefineReport {
        let started = Instant::now();
        let start_cost = self.ctx.path_cost(seq);
        let mut passes = 0;
        let mut moves = 0;
        let mut converged = false;
        let mut tie_taken = false;

        while !self.exhausted(passes, moves, started) {
            passes += 1;
            let allow_equal = self.options.accept_equal_moves && !tie_taken;
            match self.find_move(seq, allow_equal) {
                Found::Improving(mv) => {
                    *seq = mv.apply(seq);
                    moves += 1;
                }
                // At most one tie per call; the next pass re-scans from it.
                Found::Equal(mv) => {
                    *seq = mv.apply(seq);
                    moves += 1;
                    tie_taken = true;
                }
                Found::Nothing => {
                    converged = true;
                    break;
                }
            }
        }

        RefineReport {
            passes,
            moves,
            converged,
            start_cost,
            end_cost: self.ctx.path_cost(seq),
            elapsed: started.elapsed(),
        }
    }

    fn exhausted(&self, passes: usize, moves: usize, started: Instant) -> bool {
        self.options.max_passes.is_some_and(|max| passes >= max)
            || self.options.max_moves.is_some_and(|max| moves >= max)
            || self
                .options
                .time_limit
                .is_some_and(|limit| started.elapsed() >= limit)
    }

    fn find_move(&self, seq: &[usize], allow_equal: bool) -> Found {
        let first = self.options.acceptance == Acceptance::FirstImprovement;
        let mut best: Option<(Move, f64)> = None;
        let mut equal: Option<Move> = None;

        let mut consider = |mv: Move, delta: f64| {
            if delta < -EPSILON {
                if best.is_some_and(|(_, b)| delta >= b) || !self.keeps_windows(mv, seq) {
                    return ControlFlow::Continue(());
                }
                best = Some((mv, delta));
                if first {
                    return ControlFlow::Break(());
                }
            } else if delta <= EPSILON
                && allow_equal
                && equal.is_none()
                && self.keeps_windows(mv, seq)
            {
                equal = Some(mv);
            }
            ControlFlow::Continue(())
        };

        if two_opt_moves(self.ctx, seq, &mut consider).is_continue() {
            let _ = or_opt_moves(self.ctx, seq, &mut consider);
        }

        match (best, equal) {
            (Some((mv, _)), _) => Found::Improving(mv),
            (None, Some(mv)) => Found::Equal(mv),
            (None, None) => Found::Nothing,
        }
    }

    fn keeps_windows(&self, mv: Move, seq: &[usize]) -> bool {
        !self.ctx.has_time_windows() || self.ctx.is_feasible(&mv.apply(seq))
    }
}

enum Found {
    Improving(Move),
    Equal(Move),
    Nothing,
}
