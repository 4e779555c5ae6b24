use pretty_assertions::assert_eq;

use sable_ir::ValueKind;

use crate::test_helpers::{b, block, branch, call, field_get, goto, make_func, ret, ret_value, v};
use crate::{GraphError, LivenessError};

use super::{compute_block_liveness, LiveInterval, LiveSet, Liveness};

fn set(values: &[u32]) -> LiveSet {
    values.iter().map(|&n| v(n)).collect()
}

// ── Block-level liveness ────────────────────────────────────────────

#[test]
fn parameter_killed_at_entry_is_not_live_in() {
    // v0 is used by b1's terminator, but it is defined (killed) in the
    // entry block, so it is live across the edge without being live-in
    // at the entry itself.
    let func = make_func(
        1,
        vec![],
        vec![block(0, vec![], goto(1)), block(1, vec![], ret_value(0))],
    );
    let liveness = compute_block_liveness(&func);

    assert_eq!(liveness.live_in[0], set(&[]));
    assert_eq!(liveness.live_out[0], set(&[0]));
    assert_eq!(liveness.live_in[1], set(&[0]));
    assert_eq!(liveness.live_out[1], set(&[]));
}

#[test]
fn unused_value_is_never_live() {
    let func = make_func(1, vec![], vec![block(0, vec![], ret())]);
    let liveness = compute_block_liveness(&func);
    assert_eq!(liveness.live_in[0], set(&[]));
    assert_eq!(liveness.live_out[0], set(&[]));
}

#[test]
fn value_live_through_both_diamond_arms() {
    let func = make_func(
        1,
        vec![],
        vec![
            block(0, vec![], branch(0, 1, 2)),
            block(1, vec![], goto(3)),
            block(2, vec![], goto(3)),
            block(3, vec![], ret_value(0)),
        ],
    );
    let liveness = compute_block_liveness(&func);

    assert_eq!(liveness.live_out[0], set(&[0]));
    assert_eq!(liveness.live_in[1], set(&[0]));
    assert_eq!(liveness.live_in[2], set(&[0]));
    assert_eq!(liveness.live_in[3], set(&[0]));
    assert_eq!(liveness.live_out[3], set(&[]));
}

#[test]
fn loop_fixpoint_keeps_condition_live_around_back_edge() {
    let func = make_func(
        1,
        vec![],
        vec![
            block(0, vec![], goto(1)),
            block(1, vec![], branch(0, 2, 3)),
            block(2, vec![], goto(1)),
            block(3, vec![], ret()),
        ],
    );
    let liveness = compute_block_liveness(&func);

    assert_eq!(liveness.live_in[1], set(&[0]));
    // The body neither uses nor defines v0, but it flows around the
    // back edge, so it is live through the body.
    assert_eq!(liveness.live_in[2], set(&[0]));
    assert_eq!(liveness.live_out[2], set(&[0]));
    assert_eq!(liveness.live_in[3], set(&[]));
}

#[test]
fn definition_before_use_stays_out_of_gen() {
    // v1 is defined and then read within the same block, so the block
    // does not demand it from its predecessors.
    let func = make_func(
        0,
        vec![ValueKind::FieldGet],
        vec![block(0, vec![field_get(0), call(vec![0])], ret())],
    );
    let liveness = compute_block_liveness(&func);
    assert_eq!(liveness.live_in[0], set(&[]));
}

// ── Intervals ───────────────────────────────────────────────────────

#[test]
fn covers_is_half_open() {
    let interval = LiveInterval {
        start: 2,
        end: 14,
        uses: vec![9, 14],
    };
    assert!(!interval.covers(1));
    assert!(interval.covers(2));
    assert!(interval.covers(13));
    assert!(!interval.covers(14));
}

#[test]
fn dead_definition_spans_its_own_slot() {
    let func = make_func(1, vec![], vec![block(0, vec![], ret())]);
    let liveness = Liveness::analyze(&func).unwrap();

    let interval = liveness.interval(v(0));
    assert_eq!(interval.start, 2);
    assert_eq!(interval.end, 4);
    assert!(interval.uses.is_empty());
}

#[test]
fn real_use_ends_interval_just_past_the_reader() {
    // Parameter at 2, call at 4 reading it at 5.
    let func = make_func(1, vec![], vec![block(0, vec![call(vec![0])], ret())]);
    let liveness = Liveness::analyze(&func).unwrap();

    let interval = liveness.interval(v(0));
    assert_eq!(interval.start, 2);
    assert_eq!(interval.end, 5);
    assert_eq!(interval.uses, vec![5]);
}

#[test]
fn repeated_reads_deduplicate_use_positions() {
    let func = make_func(1, vec![], vec![block(0, vec![call(vec![0, 0])], ret())]);
    let liveness = Liveness::analyze(&func).unwrap();
    assert_eq!(liveness.uses(v(0)), &[5]);
}

#[test]
fn loop_condition_survives_to_the_back_edge() {
    // while (v0) {}: the branch reads v0 at 9; the back-edge jump at
    // the body's end keeps it alive until position 14.
    let func = make_func(
        1,
        vec![],
        vec![
            block(0, vec![], goto(1)),
            block(1, vec![], branch(0, 2, 3)),
            block(2, vec![], goto(1)),
            block(3, vec![], ret()),
        ],
    );
    let liveness = Liveness::analyze(&func).unwrap();

    let interval = liveness.interval(v(0));
    assert_eq!(interval.start, 2);
    assert_eq!(interval.end, 14);
    assert_eq!(interval.uses, vec![9, 14]);
    assert!(interval.covers(12));
}

#[test]
fn exposes_numbering_and_block_sets() {
    let func = make_func(
        1,
        vec![],
        vec![
            block(0, vec![], goto(1)),
            block(1, vec![], branch(0, 2, 3)),
            block(2, vec![], goto(1)),
            block(3, vec![], ret()),
        ],
    );
    let liveness = Liveness::analyze(&func).unwrap();

    // The numbering behind the intervals is queryable: the condition's
    // real use sits one past the header's terminator, its synthetic use
    // at the back-edge block's end.
    let order = liveness.order();
    assert_eq!(order.block_range(1), (6, 10));
    assert_eq!(order.term_position(1) + 1, liveness.uses(v(0))[0]);
    assert_eq!(order.block_end(2), liveness.interval(v(0)).end);

    let sets = liveness.block_liveness();
    assert!(sets.live_in[1].contains(&v(0)));
    assert!(sets.live_out[2].contains(&v(0)));
    assert!(sets.live_in[3].is_empty());
}

#[test]
fn queries_report_kind_and_defining_block() {
    let func = make_func(
        1,
        vec![ValueKind::FieldGet],
        vec![block(0, vec![], goto(1)), block(1, vec![field_get(1)], ret())],
    );
    let liveness = Liveness::analyze(&func).unwrap();

    assert_eq!(liveness.num_values(), 2);
    assert_eq!(liveness.value_kind(v(0)), ValueKind::Parameter);
    assert_eq!(liveness.value_kind(v(1)), ValueKind::FieldGet);
    assert_eq!(liveness.defining_block(v(0)), b(0));
    assert_eq!(liveness.defining_block(v(1)), b(1));
}

// ── Errors ──────────────────────────────────────────────────────────

#[test]
fn analyze_rejects_malformed_graphs() {
    let func = make_func(0, vec![], vec![block(0, vec![], goto(9))]);
    assert_eq!(
        Liveness::analyze(&func).err(),
        Some(LivenessError::Graph(GraphError::InvalidEdge {
            from: b(0),
            to: b(9),
        }))
    );
}

#[test]
fn analyze_rejects_use_of_unallocated_value() {
    let func = make_func(1, vec![], vec![block(0, vec![call(vec![5])], ret())]);
    assert_eq!(
        Liveness::analyze(&func).err(),
        Some(LivenessError::UnregisteredDefinition { value: v(5) })
    );
}

#[test]
fn analyze_rejects_value_without_producer() {
    // v1 is allocated but no instruction defines it.
    let func = make_func(1, vec![ValueKind::Computed], vec![block(0, vec![], ret())]);
    assert_eq!(
        Liveness::analyze(&func).err(),
        Some(LivenessError::UnregisteredDefinition { value: v(1) })
    );
}

// ── Dump ────────────────────────────────────────────────────────────

#[test]
fn dump_lists_definitions_then_gotos() {
    let func = make_func(
        1,
        vec![],
        vec![
            block(0, vec![], goto(1)),
            block(1, vec![], branch(0, 2, 3)),
            block(2, vec![], goto(1)),
            block(3, vec![], ret()),
        ],
    );
    let liveness = Liveness::analyze(&func).unwrap();

    assert_eq!(
        liveness.dump(),
        "ParameterValue liveness:2 ranges:{[2,14)} uses:[9,14]\n\
         Goto liveness:4\n\
         Goto liveness:12\n"
    );
}

#[test]
fn dump_omits_uses_for_dead_definitions() {
    let func = make_func(1, vec![], vec![block(0, vec![], ret())]);
    let liveness = Liveness::analyze(&func).unwrap();
    assert_eq!(liveness.dump(), "ParameterValue liveness:2 ranges:{[2,4)}\n");
}

#[test]
fn dump_orders_definitions_by_start_position() {
    let func = make_func(
        1,
        vec![ValueKind::FieldGet],
        vec![
            block(0, vec![], goto(1)),
            block(1, vec![field_get(1), call(vec![1, 0])], ret()),
        ],
    );
    let liveness = Liveness::analyze(&func).unwrap();

    // v0 at 2, v1 at 8; the call at 10 reads both at 11.
    assert_eq!(
        liveness.dump(),
        "ParameterValue liveness:2 ranges:{[2,11)} uses:[11]\n\
         StaticFieldGet liveness:8 ranges:{[8,11)} uses:[11]\n\
         Goto liveness:4\n"
    );
}
