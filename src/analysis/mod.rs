//! Analyses.

use crate::errors::ValidationError;
use crate::ir::{Func, Module};
use rayon::prelude::*;

pub mod genkill;
pub use genkill::*;
pub mod liveness;
pub use liveness::*;

/// Compute liveness for every function in `module`, in parallel. Each
/// function gets its own solver and tables; results come back in
/// function order.
pub fn liveness_for_module(module: &Module) -> Vec<(Func, Result<Liveness, ValidationError>)> {
    module
        .funcs
        .entries()
        .collect::<Vec<_>>()
        .par_iter()
        .map(|&(func, body)| {
            log::debug!("liveness: {} \"{}\"", func, body.name);
            (func, Liveness::compute(body))
        })
        .collect()
}
