//! CFG analyses: validation, traversal, dominators, and the loop nest.
//!
//! Everything downstream (numbering, liveness) assumes the graph passed
//! [`validate`], so the analyses here index blocks without re-checking
//! bounds. Blocks are referred to by their index in `func.blocks`
//! (`BlockId::index()`) throughout.

use rustc_hash::FxHashSet;
use sable_ir::{BlockId, Function};

use crate::GraphError;

/// Compute the predecessor list for each block (deduplicated).
///
/// Returns a vector indexed by block index, where each entry is the
/// list of distinct predecessor block indices.
pub(crate) fn compute_predecessors(func: &Function) -> Vec<Vec<usize>> {
    let num_blocks = func.blocks.len();
    let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); num_blocks];

    for (block_idx, block) in func.blocks.iter().enumerate() {
        let mut seen = FxHashSet::default();
        for succ_id in block.terminator.successors() {
            let succ_idx = succ_id.index();
            if succ_idx < num_blocks && seen.insert(succ_idx) {
                predecessors[succ_idx].push(block_idx);
            }
        }
    }

    predecessors
}

/// Compute a postorder traversal of the CFG starting from the entry block.
///
/// Uses an iterative DFS with an explicit stack to avoid recursion depth
/// issues on deeply nested CFGs. Only visits reachable blocks.
///
/// Used by liveness (convergence ordering), the dominator tree (reverse
/// postorder), and [`validate`] (reachability). Shared here so all
/// consumers use the same traversal implementation.
pub(crate) fn compute_postorder(func: &Function) -> Vec<usize> {
    let num_blocks = func.blocks.len();
    let mut visited = vec![false; num_blocks];
    let mut postorder = Vec::with_capacity(num_blocks);

    // Stack entries: (block_index, children_processed).
    // When children_processed is false, we push successors.
    // When true, we emit the block to postorder.
    let mut stack: Vec<(usize, bool)> = vec![(func.entry.index(), false)];

    while let Some(&mut (block_idx, ref mut children_done)) = stack.last_mut() {
        if *children_done {
            postorder.push(block_idx);
            stack.pop();
            continue;
        }

        *children_done = true;

        if block_idx >= num_blocks || visited[block_idx] {
            stack.pop();
            continue;
        }
        visited[block_idx] = true;

        // Push successors (they'll be processed before we come back to
        // emit this block).
        let block = &func.blocks[block_idx];
        for succ_id in block.terminator.successors() {
            let succ_idx = succ_id.index();
            if succ_idx < num_blocks && !visited[succ_idx] {
                stack.push((succ_idx, false));
            }
        }
    }

    postorder
}

/// Check the structural invariants every downstream analysis relies on.
///
/// - the function has at least one block and the entry is in range,
/// - every terminator edge targets an existing block,
/// - every block is reachable from the entry.
///
/// # Errors
///
/// Returns the first violation found, with the offending block IDs.
pub fn validate(func: &Function) -> Result<(), GraphError> {
    let num_blocks = func.blocks.len();
    if num_blocks == 0 || func.entry.index() >= num_blocks {
        return Err(GraphError::EmptyGraph);
    }

    for block in &func.blocks {
        for succ_id in block.terminator.successors() {
            if succ_id.index() >= num_blocks {
                return Err(GraphError::InvalidEdge {
                    from: block.id,
                    to: succ_id,
                });
            }
        }
    }

    let postorder = compute_postorder(func);
    if postorder.len() < num_blocks {
        let mut reached = vec![false; num_blocks];
        for &idx in &postorder {
            reached[idx] = true;
        }
        for (idx, block) in func.blocks.iter().enumerate() {
            if !reached[idx] {
                return Err(GraphError::UnreachableBlock { block: block.id });
            }
        }
    }

    Ok(())
}

/// Dominator tree over a function's CFG.
///
/// Uses the Cooper-Harvey-Kennedy iterative algorithm, which is simpler
/// than Lengauer-Tarjan and fast enough for typical function sizes
/// (< 100 blocks). The algorithm works on reverse postorder and converges
/// in O(n * d) where d is the loop nesting depth — typically 2-3
/// iterations.
///
/// Used by [`LoopNest`] to identify back edges: an edge `s -> h` is a
/// back edge exactly when `h` dominates `s`.
///
/// Reference: Cooper, Harvey, Kennedy — "A Simple, Fast Dominance Algorithm" (2001)
pub struct DominatorTree {
    /// Immediate dominator for each block, indexed by block index.
    /// `idom[entry] == Some(entry)`; unreachable blocks stay `None`.
    idom: Vec<Option<usize>>,
}

impl DominatorTree {
    /// Build the dominator tree for a function.
    #[must_use]
    pub fn build(func: &Function) -> Self {
        let n = func.blocks.len();
        if n == 0 {
            return Self { idom: vec![] };
        }

        let preds = compute_predecessors(func);
        let mut rpo = compute_postorder(func);
        rpo.reverse();

        // Map block index -> RPO position for O(1) lookup.
        let mut rpo_pos = vec![0usize; n];
        for (pos, &block_idx) in rpo.iter().enumerate() {
            rpo_pos[block_idx] = pos;
        }

        let entry = func.entry.index();
        let mut idom: Vec<Option<usize>> = vec![None; n];
        idom[entry] = Some(entry); // entry dominates itself

        let mut changed = true;
        while changed {
            changed = false;
            // Iterate in RPO (skip entry at position 0).
            for &block_idx in &rpo[1..] {
                // Find first processed predecessor.
                let mut new_idom = None;
                for &pred in &preds[block_idx] {
                    if idom[pred].is_some() {
                        new_idom = Some(pred);
                        break;
                    }
                }

                let Some(mut new_idom_val) = new_idom else {
                    continue;
                };

                // Intersect with remaining processed predecessors.
                for &pred in &preds[block_idx] {
                    if pred == new_idom_val {
                        continue;
                    }
                    if idom[pred].is_some() {
                        new_idom_val = Self::intersect(pred, new_idom_val, &idom, &rpo_pos);
                    }
                }

                if idom[block_idx] != Some(new_idom_val) {
                    idom[block_idx] = Some(new_idom_val);
                    changed = true;
                }
            }
        }

        Self { idom }
    }

    /// Does block `a` dominate block `b`?
    ///
    /// A block dominates itself. The entry block dominates all blocks.
    #[must_use]
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        self.dominates_index(a.index(), b.index())
    }

    pub(crate) fn dominates_index(&self, a: usize, b: usize) -> bool {
        let mut current = b;
        loop {
            if current == a {
                return true;
            }
            match self.idom[current] {
                Some(dom) if dom != current => current = dom,
                _ => return current == a,
            }
        }
    }

    /// CHK intersect: walk two fingers upward until they meet.
    ///
    /// Both `a` and `b` must be reachable from the entry — their idom
    /// chain always leads to the entry node, so `idom[x]` is always
    /// `Some` here.
    fn intersect(mut a: usize, mut b: usize, idom: &[Option<usize>], rpo_pos: &[usize]) -> usize {
        while a != b {
            while rpo_pos[a] > rpo_pos[b] {
                let Some(next) = idom[a] else {
                    debug_assert!(false, "intersect: broken idom chain at {a}");
                    return a;
                };
                a = next;
            }
            while rpo_pos[b] > rpo_pos[a] {
                let Some(next) = idom[b] else {
                    debug_assert!(false, "intersect: broken idom chain at {b}");
                    return b;
                };
                b = next;
            }
        }
        a
    }
}

/// A natural loop: its header, back edges, and body.
#[derive(Debug)]
pub struct Loop {
    /// The loop header — the single block every back edge targets.
    pub header: BlockId,
    /// Source blocks of this loop's back edges, in layout order.
    pub back_edges: Vec<BlockId>,
    /// Blocks in the loop body (header included), by block index.
    pub(crate) blocks: FxHashSet<usize>,
    /// Index (into [`LoopNest::loops`]) of the innermost loop strictly
    /// enclosing this one, if any.
    pub parent: Option<usize>,
    /// Nesting depth: 1 for outermost loops, parent depth + 1 otherwise.
    pub depth: u32,
}

impl Loop {
    /// Is `block` part of this loop's body (header included)?
    #[must_use]
    pub fn contains(&self, block: BlockId) -> bool {
        self.blocks.contains(&block.index())
    }
}

/// All natural loops of a function, with nesting structure.
///
/// A block `h` is a loop header when some edge `s -> h` is a back edge
/// (`h` dominates `s`). The loop body is every block that can reach a
/// back-edge source without passing through the header — the classic
/// natural-loop construction over predecessors. Multiple back edges to
/// the same header form one loop.
pub struct LoopNest {
    loops: Vec<Loop>,
    /// Innermost loop (index into `loops`) containing each block.
    innermost: Vec<Option<usize>>,
}

impl LoopNest {
    /// Identify all natural loops and their nesting.
    #[must_use]
    pub fn build(func: &Function, doms: &DominatorTree) -> Self {
        let num_blocks = func.blocks.len();
        let preds = compute_predecessors(func);

        // Back edges, grouped by header in layout order.
        let mut back_edges: Vec<Vec<usize>> = vec![Vec::new(); num_blocks];
        for (block_idx, block) in func.blocks.iter().enumerate() {
            for succ_id in block.terminator.successors() {
                if doms.dominates_index(succ_id.index(), block_idx) {
                    back_edges[succ_id.index()].push(block_idx);
                }
            }
        }

        let mut loops = Vec::new();
        for header in 0..num_blocks {
            let sources = &back_edges[header];
            if sources.is_empty() {
                continue;
            }

            // Natural loop body: walk predecessors backward from each
            // back-edge source until the header stops the walk.
            let mut blocks = FxHashSet::default();
            blocks.insert(header);
            let mut stack: Vec<usize> = sources.clone();
            while let Some(block_idx) = stack.pop() {
                if blocks.insert(block_idx) {
                    stack.extend_from_slice(&preds[block_idx]);
                }
            }

            loops.push(Loop {
                header: func.blocks[header].id,
                back_edges: sources.iter().map(|&s| func.blocks[s].id).collect(),
                blocks,
                parent: None,
                depth: 1,
            });
        }

        // Nesting: the parent of a loop is the smallest other loop whose
        // body contains this loop's header.
        for i in 0..loops.len() {
            let header_idx = loops[i].header.index();
            let mut parent: Option<usize> = None;
            for (j, candidate) in loops.iter().enumerate() {
                if j == i || !candidate.blocks.contains(&header_idx) {
                    continue;
                }
                match parent {
                    Some(p) if loops[p].blocks.len() <= candidate.blocks.len() => {}
                    _ => parent = Some(j),
                }
            }
            loops[i].parent = parent;
        }

        // Depths follow parent links; bounded by the nesting depth.
        for i in 0..loops.len() {
            let mut depth = 1;
            let mut current = loops[i].parent;
            while let Some(p) = current {
                depth += 1;
                current = loops[p].parent;
            }
            loops[i].depth = depth;
        }

        // Innermost loop per block: the containing loop with the
        // smallest body.
        let mut innermost: Vec<Option<usize>> = vec![None; num_blocks];
        for (block_idx, slot) in innermost.iter_mut().enumerate() {
            for (j, lp) in loops.iter().enumerate() {
                if !lp.blocks.contains(&block_idx) {
                    continue;
                }
                match *slot {
                    Some(p) if loops[p].blocks.len() <= lp.blocks.len() => {}
                    _ => *slot = Some(j),
                }
            }
        }

        Self { loops, innermost }
    }

    /// All loops, in header layout order.
    #[must_use]
    pub fn loops(&self) -> &[Loop] {
        &self.loops
    }

    /// Indices into [`loops`](Self::loops), innermost (deepest) first.
    ///
    /// Back-edge processing in this order keeps the propagation bounded
    /// by nesting depth: by the time an outer loop is visited, every
    /// inner loop it encloses has already been handled.
    #[must_use]
    pub fn innermost_first(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.loops.len()).collect();
        order.sort_by(|&a, &b| self.loops[b].depth.cmp(&self.loops[a].depth));
        order
    }

    /// The innermost loop containing `block`, as an index into
    /// [`loops`](Self::loops).
    #[must_use]
    pub fn innermost(&self, block: BlockId) -> Option<usize> {
        self.innermost.get(block.index()).copied().flatten()
    }
}
