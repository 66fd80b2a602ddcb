//! Intra-route Or-opt neighborhood.
//!
//! # Algorithm
//!
//! Moves a segment of 1, 2, or 3 consecutive stops to another gap of the
//! same route, keeping its orientation. The delta is the removal gain of
//! the segment plus the insertion cost at the target gap; both are O(1).
//!
//! # Complexity
//!
//! O(n²) per scan.
//!
//! # Reference
//!
//! Or, I. (1976). "Traveling Salesman-Type Combinatorial Problems and Their
//! Relation to the Logistics of Blood Banking". PhD thesis.

use std::ops::ControlFlow;

use super::refiner::{leg_cost, Move};
use crate::evaluation::RoutingContext;

/// Longest segment relocated.
pub const MAX_SEGMENT: usize = 3;

/// Visits every Or-opt move of `seq` in scan order with its cost delta.
///
/// Scan order is segment length, then segment start, then target gap.
pub fn or_opt_moves<F>(ctx: &RoutingContext, seq: &[usize], mut visit: F) -> ControlFlow<()>
where
    F: FnMut(Move, f64) -> ControlFlow<()>,
{
    let n = seq.len();
    let m = ctx.matrix();

    for len in 1..=MAX_SEGMENT.min(n.saturating_sub(1)) {
        for from in 0..=n - len {
            let first = seq[from];
            let last = seq[from + len - 1];
            let prev = if from == 0 { ctx.start() } else { seq[from - 1] };
            let next = seq.get(from + len).copied().or(ctx.end());
            let removal =
                m.get(prev, first) + leg_cost(ctx, last, next) - leg_cost(ctx, prev, next);

            for gap in 0..=n {
                if (from..=from + len).contains(&gap) {
                    continue;
                }
                let a = if gap == 0 { ctx.start() } else { seq[gap - 1] };
                let b = seq.get(gap).copied().or(ctx.end());
                let insertion = m.get(a, first) + leg_cost(ctx, last, b) - leg_cost(ctx, a, b);
                let mv = Move::OrOpt { from, len, to: gap };
                if visit(mv, insertion - removal).is_break() {
                    return ControlFlow::Break(());
                }
            }
        }
    }
    ControlFlow::Continue(())
}
