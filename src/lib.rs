//! Intraprocedural liveness analysis over a small SSA-style IR.

pub mod analysis;
pub mod cfg;
pub mod entity;
mod errors;
pub mod frontend;
mod ir;
pub mod ops;
pub mod pass;

pub use analysis::{liveness_for_module, Liveness, LivenessSolver};
pub use errors::*;
pub use ir::*;
pub use pass::{SolverState, SweepOrder, ValueSet};

#[cfg(feature = "fuzzing")]
pub mod fuzzing;
