//! Shared test utilities for the liveness analyses.
//!
//! Consolidates factory functions used across `graph`, `order`,
//! `intervals`, and the crate-level scenario tests. Only compiled in
//! test builds.

use sable_ir::{Block, BlockId, Function, Instr, Terminator, ValueId, ValueKind};

/// Shorthand for `ValueId::new(n)`.
pub(crate) fn v(n: u32) -> ValueId {
    ValueId::new(n)
}

/// Shorthand for `BlockId::new(n)`.
pub(crate) fn b(n: u32) -> BlockId {
    BlockId::new(n)
}

/// Build a function with `num_params` parameters (values `0..num_params`),
/// additional value kinds for values allocated past the parameters, and
/// the given blocks. Entry is block 0.
pub(crate) fn make_func(num_params: u32, extra_kinds: Vec<ValueKind>, blocks: Vec<Block>) -> Function {
    let mut value_kinds = vec![ValueKind::Parameter; num_params as usize];
    value_kinds.extend(extra_kinds);
    Function {
        name: "test".to_string(),
        params: (0..num_params).map(v).collect(),
        blocks,
        entry: BlockId::new(0),
        value_kinds,
    }
}

/// Build a block from raw parts.
pub(crate) fn block(id: u32, body: Vec<Instr>, terminator: Terminator) -> Block {
    Block {
        id: b(id),
        body,
        terminator,
    }
}

pub(crate) fn goto(target: u32) -> Terminator {
    Terminator::Goto { target: b(target) }
}

pub(crate) fn branch(cond: u32, then_block: u32, else_block: u32) -> Terminator {
    Terminator::Branch {
        cond: v(cond),
        then_block: b(then_block),
        else_block: b(else_block),
    }
}

pub(crate) fn ret() -> Terminator {
    Terminator::Return { value: None }
}

pub(crate) fn ret_value(value: u32) -> Terminator {
    Terminator::Return { value: Some(v(value)) }
}

pub(crate) fn field_get(dst: u32) -> Instr {
    Instr::FieldGet { dst: v(dst) }
}

/// A result-discarding call (print-style) reading `args`.
pub(crate) fn call(args: Vec<u32>) -> Instr {
    Instr::Call {
        dst: None,
        args: args.into_iter().map(v).collect(),
    }
}
