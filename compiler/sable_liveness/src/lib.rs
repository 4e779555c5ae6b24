//! Liveness interval analysis for the Sable compiler backend.
//!
//! Given a [`sable_ir::Function`] (a basic-block CFG with SSA-like value
//! definitions), this crate computes, for every value, the live interval
//! `[start, end)` and the ordered list of use positions that a register
//! allocator needs. The analysis runs in three layers:
//!
//! - **[`graph`]** — structural validation, predecessors/postorder, the
//!   dominator tree, and the loop nest (back edges, loop bodies, nesting).
//! - **[`order`]** — linear program-point numbering: every parameter,
//!   instruction, and terminator gets a distinct, strictly increasing
//!   position in block layout order.
//! - **[`intervals`]** — a backward gen/kill dataflow fixpoint over blocks
//!   followed by interval construction, including synthetic uses at loop
//!   back edges so that a value live into a loop stays live through every
//!   iteration of every enclosing loop.
//!
//! The entry point is [`Liveness::analyze`]; results are queried per value
//! via [`Liveness::interval`] and friends, or rendered as golden-test text
//! via [`Liveness::dump`].
//!
//! The analysis is pure and deterministic: one function, one pass, no
//! shared state. Analyzing different functions from different threads is
//! safe because nothing is shared between runs.

pub mod graph;
pub mod intervals;
pub mod order;

mod error;

#[cfg(test)]
mod test_helpers;

pub use error::{GraphError, LivenessError};
pub use graph::{DominatorTree, Loop, LoopNest};
pub use intervals::{BlockLiveness, LiveInterval, LiveSet, Liveness};
pub use order::LinearOrder;
