//! Blocks and functions.

use crate::{BlockId, Instr, Terminator, ValueId, ValueKind};

/// A basic block.
///
/// Blocks own their instruction list in order and end with exactly one
/// terminator. The block's `id` equals its index in
/// [`Function::blocks`], which is also its position in the linearized
/// layout that downstream consumers (liveness numbering, register
/// allocation) see.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// This block's identifier.
    pub id: BlockId,
    /// Sequential instructions executed in order.
    pub body: Vec<Instr>,
    /// How control leaves this block.
    pub terminator: Terminator,
}

/// A complete function body.
///
/// Contains everything backend analyses need: parameter values, basic
/// blocks in layout order, and the definition-kind table for every
/// value. Built once by the front-end, then read-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    /// The function's name (for diagnostics and logging).
    pub name: String,
    /// Parameter values, in declaration order. Parameters are
    /// definitions materialized at the entry block's start, before any
    /// real instruction.
    pub params: Vec<ValueId>,
    /// Basic blocks in layout order. `blocks[entry.index()]` is the entry.
    pub blocks: Vec<Block>,
    /// The entry block ID.
    pub entry: BlockId,
    /// Definition kind of each value, indexed by `ValueId::index()`.
    pub value_kinds: Vec<ValueKind>,
}

impl Function {
    /// Create an empty function with the given name.
    ///
    /// The entry block defaults to block 0; push blocks with
    /// [`push_block`](Self::push_block).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            blocks: Vec::new(),
            entry: BlockId::new(0),
            value_kinds: Vec::new(),
        }
    }

    /// Allocate a fresh value with the given definition kind.
    ///
    /// Returns a new [`ValueId`] that does not collide with any existing
    /// value in this function.
    ///
    /// # Panics
    ///
    /// Panics if the value count exceeds `u32::MAX`.
    pub fn fresh_value(&mut self, kind: ValueKind) -> ValueId {
        let id = u32::try_from(self.value_kinds.len())
            .unwrap_or_else(|_| panic!("value count exceeds u32::MAX"));
        self.value_kinds.push(kind);
        ValueId::new(id)
    }

    /// Allocate a fresh parameter value and append it to `params`.
    pub fn add_param(&mut self) -> ValueId {
        let id = self.fresh_value(ValueKind::Parameter);
        self.params.push(id);
        id
    }

    /// Look up the definition kind of a value.
    ///
    /// # Panics
    ///
    /// Debug-panics if `value` is out of bounds.
    #[inline]
    #[must_use]
    pub fn value_kind(&self, value: ValueId) -> ValueKind {
        debug_assert!(
            value.index() < self.value_kinds.len(),
            "ValueId {} out of bounds (have {} values)",
            value.raw(),
            self.value_kinds.len(),
        );
        self.value_kinds[value.index()]
    }

    /// Number of allocated values (parameters included).
    #[must_use]
    pub fn num_values(&self) -> usize {
        self.value_kinds.len()
    }

    /// Append a new basic block to this function.
    ///
    /// The block's `id` must equal the next sequential block index
    /// (`self.blocks.len()`).
    ///
    /// # Panics
    ///
    /// Debug-panics if `block.id` does not match the expected index.
    pub fn push_block(&mut self, block: Block) {
        let expected = self.next_block_id();
        debug_assert_eq!(
            block.id,
            expected,
            "block ID {} does not match expected index {}",
            block.id.raw(),
            expected.raw(),
        );
        self.blocks.push(block);
    }

    /// Return the [`BlockId`] that the next [`push_block`](Self::push_block)
    /// call will use.
    ///
    /// # Panics
    ///
    /// Panics if the block count exceeds `u32::MAX`.
    #[must_use]
    pub fn next_block_id(&self) -> BlockId {
        BlockId::new(
            u32::try_from(self.blocks.len())
                .unwrap_or_else(|_| panic!("block count exceeds u32::MAX")),
        )
    }

    /// Look up a block by ID.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of bounds.
    #[inline]
    #[must_use]
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }
}
