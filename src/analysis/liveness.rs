//! Liveness analysis.
//!
//! A value is live at a point if some path from that point reads it
//! before it is redefined. Liveness flows backward: the Gen/Kill
//! transfer (see `genkill`) is applied to each block's instructions
//! from last to first, and a block's exit set is the union of its
//! successors' entry sets.

use crate::analysis::GenKill;
use crate::cfg::CFGInfo;
use crate::entity::PerEntity;
use crate::errors::ValidationError;
use crate::ir::*;
use crate::pass::{BackwardResults, BackwardSweep, SolverState, SweepOrder, ValueSet};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Converged liveness tables for one function.
#[derive(Clone, Debug)]
pub struct Liveness {
    genkill: GenKill,
    live_in: PerEntity<Block, ValueSet>,
    live_out: PerEntity<Block, ValueSet>,
    out_sets: PerEntity<Value, ValueSet>,
    sweeps: usize,
}

impl Liveness {
    /// Validate `body` and compute liveness, sweeping blocks in layout
    /// order.
    pub fn compute(body: &FunctionBody) -> Result<Liveness, ValidationError> {
        Liveness::compute_with_order(body, &SweepOrder::Layout)
    }

    pub fn compute_with_order(
        body: &FunctionBody,
        order: &SweepOrder,
    ) -> Result<Liveness, ValidationError> {
        Ok(LivenessSolver::new(body, order)?.finish())
    }

    fn from_results(body: &FunctionBody, genkill: GenKill, results: BackwardResults<ValueSet>) -> Self {
        let mut live_in = PerEntity::with_len(body.blocks.len());
        for (block, def) in body.blocks.entries() {
            if let Some(&first) = def.insts.first() {
                live_in[block] = results.inst_out[first].clone();
            }
        }
        Liveness {
            genkill,
            live_in,
            live_out: results.block_exit,
            out_sets: results.inst_out,
            sweeps: results.sweeps,
        }
    }

    /// Values live on entry to `block`.
    pub fn live_in(&self, block: Block) -> &ValueSet {
        &self.live_in[block]
    }

    /// Values live on exit from `block`: the union of its successors'
    /// entry sets.
    pub fn live_out(&self, block: Block) -> &ValueSet {
        &self.live_out[block]
    }

    /// Values live just before `inst`.
    pub fn out_set(&self, inst: Value) -> &ValueSet {
        &self.out_sets[inst]
    }

    pub fn gen_set(&self, inst: Value) -> &ValueSet {
        self.genkill.gen_set(inst)
    }

    pub fn kill_set(&self, inst: Value) -> &ValueSet {
        self.genkill.kill_set(inst)
    }

    /// Number of sweeps the solver took, including the final one that
    /// changed nothing.
    pub fn sweeps(&self) -> usize {
        self.sweeps
    }

    /// Is `value` live on entry to `block`?
    pub fn is_live_in(&self, block: Block, value: Value) -> bool {
        self.live_in[block].contains(value)
    }

    /// The function's text annotated with liveness.
    pub fn display<'a>(&'a self, body: &'a FunctionBody) -> LivenessDisplay<'a> {
        LivenessDisplay {
            body,
            liveness: self,
        }
    }
}

/// Step-wise liveness computation over one function, for callers that
/// want to observe intermediate sweeps.
pub struct LivenessSolver<'a> {
    body: &'a FunctionBody,
    sweep: BackwardSweep<'a, GenKill>,
}

impl<'a> LivenessSolver<'a> {
    pub fn new(body: &'a FunctionBody, order: &SweepOrder) -> Result<Self, ValidationError> {
        body.validate()?;
        let cfg = CFGInfo::new(body);
        let genkill = GenKill::compute(body);
        let sweep = BackwardSweep::new(body, cfg, genkill, order)?;
        Ok(LivenessSolver { body, sweep })
    }

    /// Run one sweep over all blocks. Returns `true` if any block
    /// changed.
    pub fn sweep(&mut self) -> bool {
        self.sweep.sweep()
    }

    pub fn state(&self) -> SolverState {
        self.sweep.state()
    }

    pub fn sweeps(&self) -> usize {
        self.sweep.sweeps()
    }

    /// Current entry set of `block`; `None` before its first visit.
    pub fn block_entry(&self, block: Block) -> Option<&ValueSet> {
        self.sweep.block_entry(block)
    }

    pub fn block_exit(&self, block: Block) -> Option<&ValueSet> {
        self.sweep.block_exit(block)
    }

    pub fn out_set(&self, inst: Value) -> Option<&ValueSet> {
        self.sweep.inst_out(inst)
    }

    /// The final tables, or `None` if the solver has not converged.
    pub fn into_results(self) -> Option<Liveness> {
        let body = self.body;
        self.sweep
            .into_results()
            .map(|(genkill, results)| Liveness::from_results(body, genkill, results))
    }

    /// Sweep to convergence.
    pub fn finish(self) -> Liveness {
        let (genkill, results) = self.sweep.finish();
        Liveness::from_results(self.body, genkill, results)
    }
}

/// `{%a, %b}`
pub struct ValueSetDisplay<'a>(pub &'a FunctionBody, pub &'a ValueSet);

impl<'a> Display for ValueSetDisplay<'a> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{{")?;
        for (i, value) in self.1.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.0.value_ref(value))?;
        }
        write!(f, "}}")
    }
}

/// Prints the function with each instruction preceded by the values
/// live just before it, and each block followed by its exit set. The
/// annotations are comments, so the output is still valid IR text.
pub struct LivenessDisplay<'a> {
    body: &'a FunctionBody,
    liveness: &'a Liveness,
}

impl<'a> Display for LivenessDisplay<'a> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let body = self.body;
        let args = body
            .args
            .iter()
            .map(|&arg| format!("{}", body.value_ref(arg)))
            .collect::<Vec<_>>();
        writeln!(f, "function @{}({}) {{", body.name, args.join(", "))?;
        for (block, def) in body.blocks.entries() {
            writeln!(f, "{}:", body.block_name(block))?;
            for &inst in &def.insts {
                writeln!(
                    f,
                    "  ; live: {}",
                    ValueSetDisplay(body, self.liveness.out_set(inst))
                )?;
                writeln!(f, "  {}", body.inst_display(inst))?;
            }
            writeln!(
                f,
                "  ; live-out: {}",
                ValueSetDisplay(body, self.liveness.live_out(block))
            )?;
        }
        writeln!(f, "}}")
    }
}
