//! Basic-block IR types for the Sable compiler backend.
//!
//! This crate provides the data model that backend analyses (liveness,
//! register allocation) operate on:
//!
//! - **[`Function`]** — a function body: parameter values, basic blocks,
//!   and the definition-kind table for every value.
//! - **[`Block`]** — a basic block: an owned instruction list and a
//!   terminator.
//! - **[`Instr`]** / **[`Terminator`]** — instructions and block exits.
//!
//! Values are named via [`ValueId`] (SSA-like: each value has exactly one
//! producing instruction or parameter slot). Control flow uses [`BlockId`]
//! references between blocks, so the graph has no ownership cycles —
//! blocks live in a flat `Vec` and edges are indices.
//!
//! The IR is built by a front-end (out of scope here) and is immutable
//! while analyses run.

mod function;
mod instr;

pub use function::{Block, Function};
pub use instr::{Instr, Terminator};

use std::fmt;

// ── ID newtypes ─────────────────────────────────────────────────────

/// Value ID within a [`Function`].
///
/// Each `ValueId` identifies a unique SSA-like value within a single
/// function. IDs are allocated sequentially starting from 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ValueId(u32);

impl ValueId {
    /// Create a new value ID from a raw index.
    #[inline]
    #[must_use]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Basic block ID within a [`Function`].
///
/// IDs are allocated sequentially starting from 0 and double as the
/// block's position in the function's linearized layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct BlockId(u32);

impl BlockId {
    /// Create a new block ID from a raw index.
    #[inline]
    #[must_use]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw `u32` value.
    #[inline]
    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ── Definition kinds ────────────────────────────────────────────────

/// The kind of instruction that produces a value.
///
/// Analyses treat all kinds uniformly; the tag only matters for
/// diagnostics and the textual dump surface, where each kind renders
/// under its conventional name (`ParameterValue`, `StaticFieldGet`,
/// `Computed`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// An incoming function parameter.
    Parameter,
    /// A static/global field read.
    FieldGet,
    /// Any computed value (arithmetic, comparison, call result).
    Computed,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Parameter => "ParameterValue",
            ValueKind::FieldGet => "StaticFieldGet",
            ValueKind::Computed => "Computed",
        };
        f.write_str(name)
    }
}
