//! End-to-end liveness on small hand-written functions.

mod common;

use common::*;
use livevars::{Liveness, LivenessSolver, SolverState, SweepOrder};

#[test]
fn straight_line() {
    let body = parse_one(
        "
function @straight(%p, %q) {
entry:
  %x = load %p
  %y = add %x, 1
  store %y, %q
  ret
}
",
    );
    let liveness = Liveness::compute(&body).unwrap();
    let entry = block(&body, "entry");
    assert_eq!(names(&body, liveness.live_in(entry).iter()), ["%p", "%q"]);
    assert!(liveness.live_out(entry).is_empty());

    let insts = &body.blocks[entry].insts;
    let ret = insts[3];
    assert!(liveness.out_set(ret).is_empty());
    assert_eq!(names(&body, liveness.out_set(insts[2]).iter()), ["%q", "%y"]);
    assert_eq!(names(&body, liveness.out_set(insts[1]).iter()), ["%q", "%x"]);
    assert_eq!(liveness.out_set(insts[0]), liveness.live_in(entry));
}

const DIAMOND: &str = "
function @diamond(%c, %a) {
entry:
  br %c, label %left, label %right
left:
  %v = add %a, 1
  br label %join
right:
  br label %join
join:
  %r = add %v, 2
  ret %r
}
";

#[test]
fn diamond_value_reaches_both_arms() {
    let body = parse_one(DIAMOND);
    let liveness = Liveness::compute(&body).unwrap();
    let v = value(&body, "v");

    // `right` neither defines nor reads %v, but flows into `join`,
    // which reads it.
    assert!(liveness.is_live_in(block(&body, "right"), v));
    assert!(liveness.is_live_in(block(&body, "entry"), v));
    assert!(!liveness.is_live_in(block(&body, "left"), v));
    assert_eq!(
        names(&body, liveness.live_in(block(&body, "join")).iter()),
        ["%v"]
    );
    assert_eq!(
        names(&body, liveness.live_in(block(&body, "entry")).iter()),
        ["%a", "%c", "%v"]
    );
}

#[test]
fn diamond_value_stops_at_arm_that_leaves() {
    // Same shape, but `right` returns instead of joining.
    let body = parse_one(&DIAMOND.replace(
        "right:\n  br label %join",
        "right:\n  ret %a",
    ));
    let liveness = Liveness::compute(&body).unwrap();
    let v = value(&body, "v");
    let right = block(&body, "right");

    assert!(!liveness.is_live_in(right, v));
    assert!(!liveness.is_live_in(block(&body, "entry"), v));
    assert_eq!(names(&body, liveness.live_in(right).iter()), ["%a"]);
    assert!(liveness.live_out(right).is_empty());
}

const SPIN: &str = "
function @spin() {
loop:
  %i = phi [%n, %loop]
  %n = add %i, 1
  br label %loop
}
";

#[test]
fn self_loop_reaches_fixpoint_after_one_resweep() {
    let body = parse_one(SPIN);
    let lp = block(&body, "loop");
    let br = *body.blocks[lp].insts.last().unwrap();
    let mut solver = LivenessSolver::new(&body, &SweepOrder::Layout).unwrap();

    // First visit: nothing is known about the back edge yet.
    assert!(solver.sweep());
    assert_eq!(names(&body, solver.block_entry(lp).unwrap().iter()), ["%n"]);
    assert!(solver.out_set(br).unwrap().is_empty());

    // The entry set is fed back through the loop edge once...
    assert!(solver.sweep());
    assert_eq!(solver.out_set(br), solver.block_entry(lp));

    // ...after which nothing changes.
    assert!(!solver.sweep());
    assert_eq!(solver.state(), SolverState::Converged);

    let liveness = solver.into_results().unwrap();
    assert_eq!(liveness.sweeps(), 3);
    assert_eq!(names(&body, liveness.live_in(lp).iter()), ["%n"]);
    assert_eq!(liveness.live_out(lp), liveness.live_in(lp));
    assert_eq!(liveness.out_set(br), liveness.live_in(lp));
}

#[test]
fn loop_through_memory() {
    let body = parse_one(
        "
function @accumulate(%p, %q) {
entry:
  br label %loop
loop:
  %v = load %p
  %w = add %v, 1
  store %w, %p
  %c = load %q
  br %c, label %loop, label %done
done:
  ret
}
",
    );
    let liveness = Liveness::compute(&body).unwrap();
    let lp = block(&body, "loop");
    let br = *body.blocks[lp].insts.last().unwrap();

    assert_eq!(
        names(&body, liveness.live_in(block(&body, "entry")).iter()),
        ["%p", "%q"]
    );
    assert_eq!(names(&body, liveness.live_in(lp).iter()), ["%p", "%q"]);
    assert_eq!(names(&body, liveness.live_out(lp).iter()), ["%p", "%q"]);
    assert_eq!(names(&body, liveness.out_set(br).iter()), ["%c", "%p", "%q"]);
    assert!(liveness.live_in(block(&body, "done")).is_empty());
}

#[test]
fn unreachable_blocks_are_analyzed() {
    let body = parse_one(
        "
function @f(%a, %b) {
entry:
  ret %a
orphan:
  call @use, %b
  br label %entry
}
",
    );
    for order in [SweepOrder::Layout, SweepOrder::PostOrder] {
        let liveness = Liveness::compute_with_order(&body, &order).unwrap();
        assert_eq!(
            names(&body, liveness.live_in(block(&body, "orphan")).iter()),
            ["%a", "%b"]
        );
        assert_eq!(
            names(&body, liveness.live_in(block(&body, "entry")).iter()),
            ["%a"]
        );
    }
}
