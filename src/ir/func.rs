use super::{Block, FunctionBodyDisplay, InstData, Operand, Value, ValueDef};
use crate::entity::{EntityVec, PerEntity};
use crate::errors::ValidationError;
use fxhash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

#[derive(Clone, Debug, Default)]
pub struct FunctionBody {
    /// Function name (without the leading `@`).
    pub name: String,
    /// Argument values, in parameter order.
    pub args: Vec<Value>,
    /// Entry block.
    pub entry: Block,
    /// Block bodies, in layout order.
    pub blocks: EntityVec<Block, BlockDef>,
    /// Value definitions, indexed by `Value`.
    pub values: EntityVec<Value, ValueDef>,
    /// Block in which each instruction is placed. `Block::invalid()`
    /// for arguments and unplaced values.
    pub value_blocks: PerEntity<Value, Block>,
    /// Source-level names, where known.
    pub value_names: FxHashMap<Value, String>,
}

#[derive(Clone, Debug, Default)]
pub struct BlockDef {
    /// Label, or empty for an unnamed block.
    pub name: String,
    /// Instructions in this block; the last one is the terminator.
    pub insts: Vec<Value>,
    /// Successor blocks.
    pub succs: Vec<Block>,
    /// Predecessor blocks.
    pub preds: Vec<Block>,
}

impl FunctionBody {
    pub fn new(name: &str) -> FunctionBody {
        let mut blocks = EntityVec::default();
        let entry = blocks.push(BlockDef::default());
        FunctionBody {
            name: name.to_owned(),
            entry,
            blocks,
            ..FunctionBody::default()
        }
    }

    pub fn add_block(&mut self) -> Block {
        let id = self.blocks.push(BlockDef::default());
        log::trace!("add_block: block {}", id);
        id
    }

    pub fn set_block_name(&mut self, block: Block, name: &str) {
        self.blocks[block].name = name.to_owned();
    }

    pub fn add_arg(&mut self) -> Value {
        let value = self.add_value(ValueDef::Arg(self.args.len()));
        self.args.push(value);
        value
    }

    pub fn add_value(&mut self, value: ValueDef) -> Value {
        log::trace!("add_value: def {:?}", value);
        let value = self.values.push(value);
        log::trace!(" -> {}", value);
        value
    }

    pub fn set_value_name(&mut self, value: Value, name: &str) {
        self.value_names.insert(value, name.to_owned());
    }

    pub fn value_name(&self, value: Value) -> Option<&str> {
        self.value_names.get(&value).map(|name| name.as_str())
    }

    pub fn add_placeholder(&mut self) -> Value {
        self.add_value(ValueDef::Placeholder)
    }

    /// Turn a placeholder into the instruction it stands for. The
    /// instruction is not placed in any block.
    pub fn define_placeholder(&mut self, value: Value, data: InstData) {
        debug_assert!(matches!(self.values[value], ValueDef::Placeholder));
        self.values[value] = ValueDef::Inst(data);
    }

    pub fn append_to_block(&mut self, block: Block, value: Value) {
        self.blocks[block].insts.push(value);
        self.value_blocks[value] = block;
    }

    /// Create an instruction and append it to `block`.
    pub fn add_inst(&mut self, block: Block, data: InstData) -> Value {
        let value = self.add_value(ValueDef::Inst(data));
        self.append_to_block(block, value);
        value
    }

    pub fn inst(&self, value: Value) -> Option<&InstData> {
        self.values.get(value).and_then(ValueDef::as_inst)
    }

    /// The block's last instruction, if it transfers control.
    pub fn terminator(&self, block: Block) -> Option<Value> {
        let last = *self.blocks.get(block)?.insts.last()?;
        match self.inst(last) {
            Some(data) if data.opcode.is_terminator() => Some(last),
            _ => None,
        }
    }

    /// Distinct control-flow targets of the block's terminator, in
    /// operand order.
    fn edge_targets(&self, block: Block) -> SmallVec<[Block; 4]> {
        let mut targets: SmallVec<[Block; 4]> = SmallVec::new();
        if let Some(term) = self.terminator(block).and_then(|term| self.inst(term)) {
            for target in term.block_args() {
                if !targets.contains(&target) {
                    targets.push(target);
                }
            }
        }
        targets
    }

    /// Rebuild every block's `succs` and `preds` from the label
    /// operands of its terminator.
    pub fn recompute_edges(&mut self) {
        for block in self.blocks.values_mut() {
            block.succs.clear();
            block.preds.clear();
        }
        let edges = self
            .blocks
            .iter()
            .flat_map(|block| {
                self.edge_targets(block)
                    .into_iter()
                    .map(move |succ| (block, succ))
            })
            .collect::<Vec<_>>();
        for (from, to) in edges {
            log::trace!("recompute_edges: from {} to {}", from, to);
            self.blocks[from].succs.push(to);
            // Dangling targets stay in `succs` so that validation can
            // report them.
            if let Some(to_def) = self.blocks.get_mut(to) {
                to_def.preds.push(from);
            }
        }
    }

    /// Check everything the analyses rely on.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.blocks.is_empty() {
            return Err(ValidationError::EmptyFunction);
        }
        if !self.blocks.contains(self.entry) {
            return Err(ValidationError::InvalidEntry(self.entry));
        }

        let mut placed: FxHashSet<Value> = FxHashSet::default();
        for (block, def) in self.blocks.entries() {
            if def.insts.is_empty() {
                return Err(ValidationError::EmptyBlock(block));
            }
            for (i, &inst) in def.insts.iter().enumerate() {
                let data = self
                    .inst(inst)
                    .ok_or(ValidationError::NotAnInstruction { block, value: inst })?;
                if !placed.insert(inst) {
                    return Err(ValidationError::DuplicatePlacement(inst));
                }
                let is_last = i + 1 == def.insts.len();
                if data.opcode.is_terminator() && !is_last {
                    return Err(ValidationError::MisplacedTerminator { block, inst });
                }
                if is_last && !data.opcode.is_terminator() {
                    return Err(ValidationError::MissingTerminator(block));
                }
                self.validate_inst(block, inst, data)?;
            }
        }

        for (block, def) in self.blocks.entries() {
            for &succ in &def.succs {
                if !self.blocks.contains(succ) {
                    return Err(ValidationError::DanglingEdge {
                        from: block,
                        to: succ,
                    });
                }
                if !self.blocks[succ].preds.contains(&block) {
                    return Err(ValidationError::InconsistentEdges(block));
                }
            }
            for (i, &pred) in def.preds.iter().enumerate() {
                if !self.blocks.contains(pred) {
                    return Err(ValidationError::DanglingEdge {
                        from: pred,
                        to: block,
                    });
                }
                if !self.blocks[pred].succs.contains(&block) || def.preds[..i].contains(&pred) {
                    return Err(ValidationError::InconsistentEdges(block));
                }
            }
            if def.succs[..] != self.edge_targets(block)[..] {
                return Err(ValidationError::InconsistentEdges(block));
            }
        }

        Ok(())
    }

    fn validate_inst(
        &self,
        block: Block,
        inst: Value,
        data: &InstData,
    ) -> Result<(), ValidationError> {
        if data.has_result && data.opcode.never_has_result() {
            return Err(ValidationError::UnexpectedResult(inst));
        }
        if let Some(expected) = data.opcode.fixed_arity() {
            if data.args.len() != expected {
                return Err(ValidationError::OperandCount {
                    inst,
                    opcode: data.opcode.clone(),
                    expected,
                    found: data.args.len(),
                });
            }
        }
        for arg in &data.args {
            match arg {
                &Operand::Value(value) => match self.values.get(value) {
                    None => return Err(ValidationError::DanglingValue { inst, value }),
                    Some(ValueDef::Placeholder) => {
                        return Err(ValidationError::UnresolvedValue { inst, value })
                    }
                    Some(def) if !def.is_definable() => {
                        return Err(ValidationError::UseOfVoid { inst, value })
                    }
                    Some(_) => {}
                },
                &Operand::Block(target) => {
                    if !self.blocks.contains(target) {
                        return Err(ValidationError::DanglingEdge {
                            from: block,
                            to: target,
                        });
                    }
                }
                Operand::Const(_) => {}
            }
        }
        Ok(())
    }

    pub fn display<'a>(&'a self, indent: &'a str) -> FunctionBodyDisplay<'a> {
        FunctionBodyDisplay(self, indent)
    }
}
