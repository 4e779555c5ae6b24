//! Linear program-point numbering.
//!
//! Liveness intervals need a coordinate system: every instruction gets a
//! distinct, strictly increasing position in block layout order, and
//! intervals are ranges of those positions. Positions step by 2 so that
//! odd positions remain free for in-between points — an instruction at
//! position `p` reads its inputs at `p + 1`, which lets an interval end
//! "just after" its last reader without colliding with the next
//! instruction's slot.
//!
//! Per block: one slot for the block boundary, then (entry block only)
//! one slot per function parameter, one per body instruction, and one
//! for the terminator. `block_range` is the half-open `[start, end)`
//! spanned by the block; the end position of a back-edge source block is
//! where the interval builder records synthetic loop uses.

use sable_ir::{Function, ValueId};

/// Distance between adjacent instruction slots.
pub(crate) const SLOT: u32 = 2;

/// Positions assigned to every program point of a function.
///
/// Valid for a given [`Function`] as long as its block and instruction
/// layout is unchanged; rebuild after any CFG mutation.
pub struct LinearOrder {
    /// Half-open `[start, end)` position range per block index.
    block_ranges: Vec<(u32, u32)>,
    /// Position of each body instruction, indexed `[block][instr]`.
    instr_positions: Vec<Vec<u32>>,
    /// Position of each block's terminator, indexed by block.
    term_positions: Vec<u32>,
    /// Position of each function parameter, in declaration order.
    param_positions: Vec<u32>,
    /// Defining position per value (`ValueId::index()`); `None` for
    /// values no instruction or parameter slot produces.
    def_positions: Vec<Option<u32>>,
}

impl LinearOrder {
    /// Number every program point of `func` in block layout order.
    #[must_use]
    pub fn compute(func: &Function) -> Self {
        let num_blocks = func.blocks.len();
        let mut block_ranges = Vec::with_capacity(num_blocks);
        let mut instr_positions = Vec::with_capacity(num_blocks);
        let mut term_positions = Vec::with_capacity(num_blocks);
        let mut param_positions = Vec::with_capacity(func.params.len());
        let mut def_positions = vec![None; func.num_values()];

        let mut counter: u32 = 0;
        for (block_idx, block) in func.blocks.iter().enumerate() {
            let start = counter;
            counter += SLOT; // block boundary slot

            // Parameters materialize at the entry block's start, before
            // the first real instruction.
            if block_idx == func.entry.index() {
                for &param in &func.params {
                    param_positions.push(counter);
                    if param.index() < def_positions.len() {
                        def_positions[param.index()] = Some(counter);
                    }
                    counter += SLOT;
                }
            }

            let mut positions = Vec::with_capacity(block.body.len());
            for instr in &block.body {
                positions.push(counter);
                if let Some(dst) = instr.defined_value() {
                    if dst.index() < def_positions.len() {
                        def_positions[dst.index()] = Some(counter);
                    }
                }
                counter += SLOT;
            }
            instr_positions.push(positions);

            term_positions.push(counter);
            counter += SLOT;

            block_ranges.push((start, counter));
        }

        Self {
            block_ranges,
            instr_positions,
            term_positions,
            param_positions,
            def_positions,
        }
    }

    /// Half-open `[start, end)` position range of a block.
    #[must_use]
    pub fn block_range(&self, block: usize) -> (u32, u32) {
        self.block_ranges[block]
    }

    /// First position of a block.
    #[must_use]
    pub fn block_start(&self, block: usize) -> u32 {
        self.block_ranges[block].0
    }

    /// One past the last position of a block.
    ///
    /// For a back-edge source this is the position at which the interval
    /// builder records the loop's synthetic use.
    #[must_use]
    pub fn block_end(&self, block: usize) -> u32 {
        self.block_ranges[block].1
    }

    /// Position of a body instruction.
    #[must_use]
    pub fn instr_position(&self, block: usize, instr: usize) -> u32 {
        self.instr_positions[block][instr]
    }

    /// Position of a block's terminator.
    #[must_use]
    pub fn term_position(&self, block: usize) -> u32 {
        self.term_positions[block]
    }

    /// Position of a function parameter, by declaration index.
    #[must_use]
    pub fn param_position(&self, param: usize) -> u32 {
        self.param_positions[param]
    }

    /// The position at which `value` is defined, if any instruction or
    /// parameter slot produces it.
    #[must_use]
    pub fn def_position(&self, value: ValueId) -> Option<u32> {
        self.def_positions.get(value.index()).copied().flatten()
    }
}
