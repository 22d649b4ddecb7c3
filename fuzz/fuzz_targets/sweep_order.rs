//! Fuzzing sweep-order independence.
//!
//! 1. Generate a function with an arbitrary CFG.
//! 2. Solve liveness with every sweep order.
//! 3. Check that all orders reach the same tables.

#![no_main]
use libfuzzer_sys::fuzz_target;
use livevars::fuzzing::ArbitraryFunction;
use livevars::{Liveness, SweepOrder};

fuzz_target!(|func: ArbitraryFunction| {
    let _ = env_logger::try_init();
    let body = &func.0;
    log::debug!("function:\n{}", body.display(""));

    let reference = Liveness::compute(body).unwrap();
    let mut reversed = body.blocks.iter().collect::<Vec<_>>();
    reversed.reverse();
    let orders = [
        SweepOrder::PostOrder,
        SweepOrder::ReversePostOrder,
        SweepOrder::Custom(reversed),
    ];
    for order in &orders {
        let other = Liveness::compute_with_order(body, order).unwrap();
        for (block, def) in body.blocks.entries() {
            assert_eq!(reference.live_in(block), other.live_in(block));
            assert_eq!(reference.live_out(block), other.live_out(block));
            for &inst in &def.insts {
                assert_eq!(reference.out_set(inst), other.out_set(inst));
            }
        }
    }
});
