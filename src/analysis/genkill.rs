//! Per-instruction Gen/Kill classification.
//!
//! Gen is what an instruction reads: its value operands, never its
//! constants or labels. Kill is what it defines: its own result, if it
//! has one. Classification looks at one instruction only.

use crate::entity::PerEntity;
use crate::ir::*;
use crate::ops::{InstKind, Opcode};
use crate::pass::{BackwardTransfer, ValueSet};

/// How an instruction's value operands are listed in its Gen set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum UseRule {
    /// Operand order.
    Operands,
    /// The address operand (at this operand index) first, then the
    /// remaining operands in order.
    AddressFirst(usize),
}

fn use_rule(opcode: &Opcode) -> UseRule {
    match opcode.kind() {
        InstKind::Memory => match opcode {
            Opcode::Load | Opcode::GetElementPtr | Opcode::CmpXchg | Opcode::AtomicRmw => {
                UseRule::AddressFirst(0)
            }
            // `store <value>, <address>`
            Opcode::Store => UseRule::AddressFirst(1),
            _ => UseRule::Operands,
        },
        InstKind::Terminator
        | InstKind::Arithmetic
        | InstKind::Conversion
        | InstKind::Comparison
        | InstKind::Call
        | InstKind::Phi
        | InstKind::Other => UseRule::Operands,
    }
}

/// Compute `(Gen, Kill)` for `inst`. Function arguments and
/// placeholders are not instructions and get empty sets.
pub fn classify(body: &FunctionBody, inst: Value) -> (ValueSet, ValueSet) {
    let data = match body.inst(inst) {
        Some(data) => data,
        None => return (ValueSet::new(), ValueSet::new()),
    };

    let mut gen = ValueSet::new();
    match use_rule(&data.opcode) {
        UseRule::Operands => gen.extend(data.value_args()),
        UseRule::AddressFirst(address) => {
            if let Some(value) = data.args.get(address).and_then(Operand::as_value) {
                gen.insert(value);
            }
            gen.extend(
                data.args
                    .iter()
                    .enumerate()
                    .filter(|&(i, _)| i != address)
                    .filter_map(|(_, arg)| arg.as_value()),
            );
        }
    }

    let mut kill = ValueSet::new();
    if data.has_result {
        kill.insert(inst);
    }

    log::trace!(
        "classify: {} ({}) gen {:?} kill {:?}",
        inst,
        data.opcode,
        gen.as_slice(),
        kill.as_slice()
    );
    (gen, kill)
}

/// Gen and Kill for every placed instruction of a function. Built in
/// one pass and never modified afterwards.
#[derive(Clone, Debug, Default)]
pub struct GenKill {
    gen_sets: PerEntity<Value, ValueSet>,
    kill_sets: PerEntity<Value, ValueSet>,
}

impl GenKill {
    pub fn compute(body: &FunctionBody) -> GenKill {
        let mut gen_sets = PerEntity::with_len(body.values.len());
        let mut kill_sets = PerEntity::with_len(body.values.len());
        for def in body.blocks.values() {
            for &inst in &def.insts {
                let (gen, kill) = classify(body, inst);
                gen_sets[inst] = gen;
                kill_sets[inst] = kill;
            }
        }
        GenKill {
            gen_sets,
            kill_sets,
        }
    }

    pub fn gen_set(&self, inst: Value) -> &ValueSet {
        &self.gen_sets[inst]
    }

    pub fn kill_set(&self, inst: Value) -> &ValueSet {
        &self.kill_sets[inst]
    }
}

impl BackwardTransfer for GenKill {
    type L = ValueSet;

    /// `(live ∪ Gen) \ Kill`
    fn instruction(&self, live: &mut ValueSet, inst: Value) {
        live.union_with(&self.gen_sets[inst]);
        live.remove_all_of(&self.kill_sets[inst]);
    }
}
