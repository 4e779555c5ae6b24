//! Instructions and terminators.

use smallvec::{smallvec, SmallVec};

use crate::{BlockId, ValueId};

/// A single instruction in a basic block.
///
/// Instructions execute sequentially within a block. Value-producing
/// instructions bind their result to a `dst` value; the definition kind
/// recorded for `dst` in [`Function::value_kinds`](crate::Function) must
/// match the instruction (`FieldGet` produces a
/// [`FieldGet`](crate::ValueKind::FieldGet) value, the rest produce
/// [`Computed`](crate::ValueKind::Computed) values).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instr {
    /// Read a static/global field: `let dst = field`.
    FieldGet { dst: ValueId },

    /// Compute a value from operands: `let dst = op(args...)`.
    Compute { dst: ValueId, args: Vec<ValueId> },

    /// Side-effecting call: `dst? = call(args...)`.
    ///
    /// `dst` is `None` for calls whose result is discarded (the common
    /// case for print-style calls in the test corpus).
    Call {
        dst: Option<ValueId>,
        args: Vec<ValueId>,
    },
}

impl Instr {
    /// Returns the value defined (written) by this instruction, if any.
    pub fn defined_value(&self) -> Option<ValueId> {
        match self {
            Instr::FieldGet { dst } | Instr::Compute { dst, .. } => Some(*dst),
            Instr::Call { dst, .. } => *dst,
        }
    }

    /// Returns the values read (used) by this instruction.
    ///
    /// The `dst` of a value-producing instruction is a definition, not a
    /// use, and is never included.
    pub fn used_values(&self) -> &[ValueId] {
        match self {
            Instr::FieldGet { .. } => &[],
            Instr::Compute { args, .. } | Instr::Call { args, .. } => args,
        }
    }
}

/// Block terminator — how control leaves a basic block.
///
/// Every block ends with exactly one terminator. Terminators reference
/// successor blocks by [`BlockId`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Terminator {
    /// Unconditional jump to a target block.
    Goto { target: BlockId },

    /// Conditional branch on a boolean value.
    Branch {
        cond: ValueId,
        then_block: BlockId,
        else_block: BlockId,
    },

    /// Return from the function, optionally with a value.
    Return { value: Option<ValueId> },
}

impl Terminator {
    /// Returns the value read by this terminator, if any.
    ///
    /// `Branch` reads its condition, `Return` its (optional) value,
    /// `Goto` reads nothing.
    pub fn used_value(&self) -> Option<ValueId> {
        match self {
            Terminator::Goto { .. } => None,
            Terminator::Branch { cond, .. } => Some(*cond),
            Terminator::Return { value } => *value,
        }
    }

    /// Successor block IDs in branch order.
    ///
    /// Returns a `SmallVec` to avoid heap allocation — a terminator has
    /// at most two successors.
    pub fn successors(&self) -> SmallVec<[BlockId; 2]> {
        match self {
            Terminator::Goto { target } => smallvec![*target],
            Terminator::Branch {
                then_block,
                else_block,
                ..
            } => smallvec![*then_block, *else_block],
            Terminator::Return { .. } => SmallVec::new(),
        }
    }
}
