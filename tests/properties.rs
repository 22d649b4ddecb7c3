//! Property-based tests for the liveness solver.
//!
//! Random functions (arbitrary CFGs, including irreducible loops and
//! unreachable blocks, with uses that cross blocks freely) are solved
//! and checked for:
//! 1. Monotonicity: block entry sets only grow from sweep to sweep.
//! 2. Stability: a converged solver's next sweep changes nothing.
//! 3. The per-instruction mapping `(L ∪ Gen) \ Kill`.
//! 4. The block equations `out(B) = ∪ in(S)` over successors.
//! 5. Order independence and determinism of the final tables.

mod common;

use common::*;
use livevars::{Block, FunctionBody, Liveness, LivenessSolver, SweepOrder, ValueSet};
use proptest::prelude::*;

fn same_tables(body: &FunctionBody, a: &Liveness, b: &Liveness) -> bool {
    body.blocks.entries().all(|(block, def)| {
        a.live_in(block) == b.live_in(block)
            && a.live_out(block) == b.live_out(block)
            && def.insts.iter().all(|&inst| a.out_set(inst) == b.out_set(inst))
    })
}

fn shape_and_permutation() -> impl Strategy<Value = (FuncShape, Vec<usize>)> {
    func_shape().prop_flat_map(|shape| {
        let n = shape.blocks.len();
        (Just(shape), Just((0..n).collect::<Vec<_>>()).prop_shuffle())
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_entry_sets_grow_monotonically(shape in func_shape()) {
        let body = build(&shape);
        for order in [SweepOrder::Layout, SweepOrder::PostOrder] {
            let mut solver = LivenessSolver::new(&body, &order).unwrap();
            let mut previous: Vec<Option<ValueSet>> = vec![None; body.blocks.len()];
            // Finite lattice: each changing sweep adds at least one value
            // to at least one block.
            let bound = body.blocks.len() * (body.values.len() + 1) + 1;
            loop {
                let changed = solver.sweep();
                for (i, block) in body.blocks.iter().enumerate() {
                    let current = solver.block_entry(block).cloned();
                    if let (Some(before), Some(after)) = (&previous[i], &current) {
                        prop_assert!(before.is_subset(after));
                    }
                    prop_assert!(current.is_some());
                    previous[i] = current;
                }
                prop_assert!(solver.sweeps() <= bound);
                if !changed {
                    break;
                }
            }
        }
    }

    #[test]
    fn prop_converged_state_is_stable(shape in func_shape()) {
        let body = build(&shape);
        let mut solver = LivenessSolver::new(&body, &SweepOrder::Layout).unwrap();
        while solver.sweep() {}
        let before = body
            .blocks
            .iter()
            .map(|block| solver.block_entry(block).cloned())
            .collect::<Vec<_>>();
        prop_assert!(!solver.sweep());
        for (i, block) in body.blocks.iter().enumerate() {
            prop_assert_eq!(solver.block_entry(block).cloned(), before[i].clone());
        }
    }

    #[test]
    fn prop_instruction_mapping(shape in func_shape()) {
        let body = build(&shape);
        let liveness = Liveness::compute(&body).unwrap();
        for (block, def) in body.blocks.entries() {
            let mut after = liveness.live_out(block).clone();
            for &inst in def.insts.iter().rev() {
                let expected = after
                    .union(liveness.gen_set(inst))
                    .remove_all(liveness.kill_set(inst));
                prop_assert_eq!(liveness.out_set(inst).as_slice(), expected.as_slice());
                after = liveness.out_set(inst).clone();
            }
            prop_assert_eq!(&after, liveness.live_in(block));
        }
    }

    #[test]
    fn prop_block_equations_hold(shape in func_shape()) {
        let body = build(&shape);
        let liveness = Liveness::compute(&body).unwrap();
        for (block, def) in body.blocks.entries() {
            let mut merged = ValueSet::new();
            for &succ in &def.succs {
                merged.union_with(liveness.live_in(succ));
            }
            prop_assert_eq!(&merged, liveness.live_out(block));
        }
    }

    #[test]
    fn prop_sweep_order_does_not_matter((shape, perm) in shape_and_permutation()) {
        let body = build(&shape);
        let reference = Liveness::compute(&body).unwrap();
        let blocks = body.blocks.iter().collect::<Vec<Block>>();
        let shuffled = perm.iter().map(|&i| blocks[i]).collect::<Vec<_>>();
        for order in [
            SweepOrder::PostOrder,
            SweepOrder::ReversePostOrder,
            SweepOrder::Custom(shuffled),
        ] {
            let other = Liveness::compute_with_order(&body, &order).unwrap();
            prop_assert!(same_tables(&body, &reference, &other), "order {:?}", order);
        }
    }

    #[test]
    fn prop_reruns_are_identical(shape in func_shape()) {
        let body = build(&shape);
        let first = Liveness::compute(&body).unwrap();
        let second = Liveness::compute(&body).unwrap();
        prop_assert_eq!(first.sweeps(), second.sweeps());
        for (block, def) in body.blocks.entries() {
            prop_assert_eq!(first.live_in(block).as_slice(), second.live_in(block).as_slice());
            prop_assert_eq!(first.live_out(block).as_slice(), second.live_out(block).as_slice());
            for &inst in &def.insts {
                prop_assert_eq!(first.out_set(inst).as_slice(), second.out_set(inst).as_slice());
            }
        }
    }
}
