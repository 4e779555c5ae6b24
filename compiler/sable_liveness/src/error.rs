//! Analysis errors.
//!
//! Every error here is a structural defect in the input — a front-end or
//! integration bug, not a transient condition. There is nothing to retry;
//! the analysis aborts and reports the offending block or value.

use sable_ir::{BlockId, ValueId};
use thiserror::Error;

/// Structural defect in the control-flow graph.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The function has no basic blocks (or the entry is out of range).
    #[error("function has no entry block")]
    EmptyGraph,

    /// A terminator references a block that does not exist.
    #[error("block b{src} targets nonexistent block b{dst}", src = .from.raw(), dst = .to.raw())]
    InvalidEdge {
        /// The block whose terminator holds the bad edge.
        from: BlockId,
        /// The nonexistent target.
        to: BlockId,
    },

    /// A block is not reachable from the entry block.
    #[error("block b{id} is unreachable from the entry block", id = .block.raw())]
    UnreachableBlock {
        /// The unreachable block.
        block: BlockId,
    },
}

/// Failure of the liveness analysis as a whole.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LivenessError {
    /// The input CFG is malformed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A value has no producing instruction or parameter slot.
    #[error("value v{id} has no producing instruction", id = .value.raw())]
    UnregisteredDefinition {
        /// The value without a definition.
        value: ValueId,
    },
}
