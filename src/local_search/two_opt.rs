//! Intra-route 2-opt neighborhood.
//!
//! # Algorithm
//!
//! For each pair of positions i < j, reverse the segment `[i..=j]`. On an
//! asymmetric matrix the reversed segment's internal legs change cost too,
//! so the delta is
//!
//! ```text
//! delta = c(p, r[j]) + back(i..j) + c(r[i], n)
//!       - c(p, r[i]) - fwd(i..j) - c(r[j], n)
//! ```
//!
//! where `p`/`n` are the nodes around the segment and `fwd`/`back` are
//! prefix sums of the forward and backward legs, making each delta O(1).
//!
//! # Complexity
//!
//! O(n²) per scan.
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use std::ops::ControlFlow;

use super::refiner::{leg_cost, Move};
use crate::evaluation::RoutingContext;

/// Visits every 2-opt move of `seq` in scan order with its cost delta.
///
/// Stops early when `visit` breaks.
pub fn two_opt_moves<F>(ctx: &RoutingContext, seq: &[usize], mut visit: F) -> ControlFlow<()>
where
    F: FnMut(Move, f64) -> ControlFlow<()>,
{
    let n = seq.len();
    if n < 2 {
        return ControlFlow::Continue(());
    }
    let m = ctx.matrix();

    let mut fwd = vec![0.0; n];
    let mut back = vec![0.0; n];
    for k in 1..n {
        fwd[k] = fwd[k - 1] + m.get(seq[k - 1], seq[k]);
        back[k] = back[k - 1] + m.get(seq[k], seq[k - 1]);
    }

    for i in 0..n - 1 {
        let prev = if i == 0 { ctx.start() } else { seq[i - 1] };
        for j in i + 1..n {
            let next = seq.get(j + 1).copied().or(ctx.end());
            let old = m.get(prev, seq[i]) + (fwd[j] - fwd[i]) + leg_cost(ctx, seq[j], next);
            let new = m.get(prev, seq[j]) + (back[j] - back[i]) + leg_cost(ctx, seq[i], next);
            if visit(Move::TwoOpt { i, j }, new - old).is_break() {
                return ControlFlow::Break(());
            }
        }
    }
    ControlFlow::Continue(())
}
