//! Liveness intervals: block-level dataflow plus interval construction.
//!
//! # Algorithm
//!
//! Stage 1 is standard backward dataflow with fixed-point iteration:
//!
//! 1. **Precompute gen/kill** for each block (forward scan).
//!    - `gen(B)` = values *used* before being defined in B.
//!    - `kill(B)` = values *defined* in B (parameters in the entry block).
//! 2. **Postorder iteration** for convergence:
//!    - `live_out(B) = ∪ live_in(S)` for each successor S.
//!    - `live_in(B) = gen(B) ∪ (live_out(B) - kill(B))`.
//! 3. Repeat until no sets change.
//!
//! Stage 2 turns the block-level result into per-value intervals over the
//! [`LinearOrder`] coordinates. A reader at position `p` contributes a
//! use at `p + 1`. For every loop whose header has a value live-in, a
//! synthetic use is recorded at the end position of each of that loop's
//! back-edge source blocks — the value must survive the jump back to the
//! header. Because live-in sets come from the full fixpoint, a value used
//! only inside an inner loop is live-in at every enclosing header it has
//! to survive, so each enclosing loop injects its own back-edge uses
//! without any explicit outward recursion; loops are still visited
//! innermost-first, which bounds the propagation by nesting depth. A
//! value redefined inside an outer loop body is not live-in at that outer
//! header and therefore never leaks a use to the outer back edge.
//!
//! # References
//!
//! - Appel: "Modern Compiler Implementation" §10.1 (dataflow analysis)
//! - Wimmer, Franz: "Linear Scan Register Allocation on SSA Form" (2010)

use rustc_hash::FxHashSet;

use sable_ir::{Block, BlockId, Function, Terminator, ValueId, ValueKind};

use crate::graph::{self, DominatorTree, LoopNest};
use crate::order::{LinearOrder, SLOT};
use crate::LivenessError;

/// Set of live values at a program point.
///
/// Uses `FxHashSet` for simplicity. A bitset indexed by `ValueId::raw()`
/// would be faster for large functions but adds complexity — this can be
/// optimized later if profiling shows it matters.
pub type LiveSet = FxHashSet<ValueId>;

/// Liveness information for every basic block in a function.
///
/// `live_in[b]` is the set of values live at the *entry* of block `b`.
/// `live_out[b]` is the set of values live at the *exit* of block `b`.
/// Both are indexed by `BlockId::index()`.
pub struct BlockLiveness {
    /// Values live at block entry, indexed by block.
    pub live_in: Vec<LiveSet>,
    /// Values live at block exit, indexed by block.
    pub live_out: Vec<LiveSet>,
}

/// Compute block-level liveness via gen/kill fixpoint iteration.
pub(crate) fn compute_block_liveness(func: &Function) -> BlockLiveness {
    let num_blocks = func.blocks.len();

    // Step 1: Precompute gen/kill for each block.
    let mut gen: Vec<LiveSet> = Vec::with_capacity(num_blocks);
    let mut kill: Vec<LiveSet> = Vec::with_capacity(num_blocks);

    for (block_idx, block) in func.blocks.iter().enumerate() {
        let (block_gen, block_kill) = compute_gen_kill(func, block, block_idx);
        gen.push(block_gen);
        kill.push(block_kill);
    }

    // Step 2: Compute postorder for convergence ordering.
    let postorder = graph::compute_postorder(func);

    // Step 3: Fixed-point iteration.
    let mut live_in: Vec<LiveSet> = (0..num_blocks).map(|_| LiveSet::default()).collect();
    let mut live_out: Vec<LiveSet> = (0..num_blocks).map(|_| LiveSet::default()).collect();

    let mut iteration = 0u32;
    loop {
        iteration += 1;
        let mut changed = false;

        // Iterate in postorder. For a backward analysis, postorder
        // processes successors before predecessors, which gives good
        // convergence.
        for &block_idx in &postorder {
            // live_out(B) = ∪ live_in(S) for each successor S.
            let mut new_live_out = LiveSet::default();
            for succ_id in func.blocks[block_idx].terminator.successors() {
                for &value in &live_in[succ_id.index()] {
                    new_live_out.insert(value);
                }
            }

            // live_in(B) = gen(B) ∪ (live_out(B) - kill(B))
            let mut new_live_in = gen[block_idx].clone();
            for &value in &new_live_out {
                if !kill[block_idx].contains(&value) {
                    new_live_in.insert(value);
                }
            }

            if new_live_in != live_in[block_idx] || new_live_out != live_out[block_idx] {
                changed = true;
                live_in[block_idx] = new_live_in;
                live_out[block_idx] = new_live_out;
            }
        }

        if !changed {
            break;
        }
    }

    tracing::debug!(iterations = iteration, "block liveness converged");

    BlockLiveness { live_in, live_out }
}

/// Precompute gen and kill sets for a single block.
///
/// Walk instructions forward. A value is in `gen` if it's used before
/// being defined. A value is in `kill` if it's defined in this block.
/// Function parameters are definitions at the entry block's start, so
/// they land in the entry block's kill set.
fn compute_gen_kill(func: &Function, block: &Block, block_idx: usize) -> (LiveSet, LiveSet) {
    let mut gen = LiveSet::default();
    let mut kill = LiveSet::default();

    if block_idx == func.entry.index() {
        for &param in &func.params {
            kill.insert(param);
        }
    }

    for instr in &block.body {
        // Uses before definitions go into gen.
        for &value in instr.used_values() {
            if !kill.contains(&value) {
                gen.insert(value);
            }
        }
        // Definitions go into kill.
        if let Some(dst) = instr.defined_value() {
            kill.insert(dst);
        }
    }

    // Terminator uses.
    if let Some(value) = block.terminator.used_value() {
        if !kill.contains(&value) {
            gen.insert(value);
        }
    }

    (gen, kill)
}

/// The live interval of a single value.
///
/// The value must be preserved on the half-open position range
/// `[start, end)`; `uses` lists every position at which it is read
/// (real reads at reader position + 1, synthetic loop uses at back-edge
/// block ends), ascending and deduplicated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiveInterval {
    /// Position of the defining instruction (or parameter slot).
    pub start: u32,
    /// One past the last position the value must survive. Equals the
    /// last use when the value has uses past its definition, otherwise
    /// `start + 2` (a dead definition occupies its own slot only).
    pub end: u32,
    /// Use positions, ascending, deduplicated.
    pub uses: Vec<u32>,
}

impl LiveInterval {
    /// Does this interval cover `position`?
    #[must_use]
    pub fn covers(&self, position: u32) -> bool {
        self.start <= position && position < self.end
    }
}

/// The result of liveness analysis over one function.
///
/// Immutable once built; all queries are side-effect-free.
pub struct Liveness {
    intervals: Vec<LiveInterval>,
    kinds: Vec<ValueKind>,
    defining_block: Vec<BlockId>,
    goto_positions: Vec<u32>,
    order: LinearOrder,
    block_liveness: BlockLiveness,
}

impl Liveness {
    /// Run the full analysis on a function.
    ///
    /// Validates the CFG, builds the dominator tree and loop nest,
    /// numbers all program points, runs the block-level fixpoint, and
    /// constructs one interval per value.
    ///
    /// # Errors
    ///
    /// [`LivenessError::Graph`] if the CFG is malformed (bad edge,
    /// unreachable block, missing entry); [`LivenessError::UnregisteredDefinition`]
    /// if any value has no producing instruction or parameter slot, or an
    /// instruction references a value the function never allocated.
    pub fn analyze(func: &Function) -> Result<Self, LivenessError> {
        graph::validate(func)?;

        tracing::debug!(
            function = %func.name,
            num_blocks = func.blocks.len(),
            num_values = func.num_values(),
            "computing liveness intervals"
        );

        let doms = DominatorTree::build(func);
        let nest = LoopNest::build(func, &doms);
        let order = LinearOrder::compute(func);

        let num_values = func.num_values();
        let mut uses: Vec<Vec<u32>> = vec![Vec::new(); num_values];
        let mut defining_block: Vec<BlockId> = vec![func.entry; num_values];
        let mut goto_positions = Vec::new();

        let check = |value: ValueId| -> Result<(), LivenessError> {
            if value.index() < num_values {
                Ok(())
            } else {
                Err(LivenessError::UnregisteredDefinition { value })
            }
        };

        for (block_idx, block) in func.blocks.iter().enumerate() {
            for (instr_idx, instr) in block.body.iter().enumerate() {
                let pos = order.instr_position(block_idx, instr_idx);
                if let Some(dst) = instr.defined_value() {
                    check(dst)?;
                    defining_block[dst.index()] = block.id;
                }
                for &value in instr.used_values() {
                    check(value)?;
                    uses[value.index()].push(pos + 1);
                }
            }

            let term_pos = order.term_position(block_idx);
            if let Some(value) = block.terminator.used_value() {
                check(value)?;
                uses[value.index()].push(term_pos + 1);
            }
            if matches!(block.terminator, Terminator::Goto { .. }) {
                goto_positions.push(term_pos);
            }
        }

        let block_liveness = compute_block_liveness(func);

        // Synthetic loop uses, innermost loop first: every value live-in
        // at a loop header must survive the jump back from each of the
        // loop's back-edge sources.
        for &loop_idx in &nest.innermost_first() {
            let lp = &nest.loops()[loop_idx];
            for &value in &block_liveness.live_in[lp.header.index()] {
                for &src in &lp.back_edges {
                    uses[value.index()].push(order.block_end(src.index()));
                }
            }
        }

        let mut intervals = Vec::with_capacity(num_values);
        for (idx, points) in uses.iter_mut().enumerate() {
            #[expect(clippy::cast_possible_truncation, reason = "value counts fit in u32")]
            let value = ValueId::new(idx as u32);
            let Some(start) = order.def_position(value) else {
                return Err(LivenessError::UnregisteredDefinition { value });
            };

            points.sort_unstable();
            points.dedup();
            let end = match points.last() {
                Some(&last) if last > start => last,
                _ => start + SLOT,
            };
            intervals.push(LiveInterval {
                start,
                end,
                uses: std::mem::take(points),
            });
        }

        Ok(Self {
            intervals,
            kinds: func.value_kinds.clone(),
            defining_block,
            goto_positions,
            order,
            block_liveness,
        })
    }

    /// Number of analyzed values.
    #[must_use]
    pub fn num_values(&self) -> usize {
        self.intervals.len()
    }

    /// The live interval of `value`.
    ///
    /// # Panics
    ///
    /// Panics if `value` was not part of the analyzed function.
    #[must_use]
    pub fn interval(&self, value: ValueId) -> &LiveInterval {
        &self.intervals[value.index()]
    }

    /// Use positions of `value`, ascending and deduplicated.
    ///
    /// # Panics
    ///
    /// Panics if `value` was not part of the analyzed function.
    #[must_use]
    pub fn uses(&self, value: ValueId) -> &[u32] {
        &self.intervals[value.index()].uses
    }

    /// Definition kind of `value`.
    ///
    /// # Panics
    ///
    /// Panics if `value` was not part of the analyzed function.
    #[must_use]
    pub fn value_kind(&self, value: ValueId) -> ValueKind {
        self.kinds[value.index()]
    }

    /// The block whose instruction (or parameter slot) produces `value`.
    ///
    /// # Panics
    ///
    /// Panics if `value` was not part of the analyzed function.
    #[must_use]
    pub fn defining_block(&self, value: ValueId) -> BlockId {
        self.defining_block[value.index()]
    }

    /// The program-point numbering the intervals are expressed in.
    #[must_use]
    pub fn order(&self) -> &LinearOrder {
        &self.order
    }

    /// The block-level live-in/live-out sets.
    #[must_use]
    pub fn block_liveness(&self) -> &BlockLiveness {
        &self.block_liveness
    }

    /// Render the analysis result as golden-test text.
    ///
    /// One line per definition in ascending start order:
    ///
    /// ```text
    /// ParameterValue liveness:2 ranges:{[2,14)} uses:[9,14]
    /// ```
    ///
    /// The `uses:` segment is omitted for definitions that are never
    /// read. The definition lines are followed by one line per `Goto`
    /// terminator in ascending position order:
    ///
    /// ```text
    /// Goto liveness:12
    /// ```
    #[must_use]
    pub fn dump(&self) -> String {
        let mut defs: Vec<usize> = (0..self.intervals.len()).collect();
        defs.sort_by_key(|&idx| self.intervals[idx].start);

        let mut out = String::new();
        for idx in defs {
            let interval = &self.intervals[idx];
            out.push_str(&format!(
                "{} liveness:{} ranges:{{[{},{})}}",
                self.kinds[idx], interval.start, interval.start, interval.end,
            ));
            if !interval.uses.is_empty() {
                let uses = interval
                    .uses
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                out.push_str(&format!(" uses:[{uses}]"));
            }
            out.push('\n');
        }
        for &pos in &self.goto_positions {
            out.push_str(&format!("Goto liveness:{pos}\n"));
        }
        out
    }
}

#[cfg(test)]
mod tests;
