//! Route assembly: cluster ordering, seam repair, and final metrics.

mod assembler;

pub use assembler::{ClusterRoute, RouteAssembler};

pub(crate) use assembler::end_terminal;
