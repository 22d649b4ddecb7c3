//! Displaying IR.

use super::{Block, FunctionBody, Module, Operand, Value, ValueDef};
use crate::ops::Opcode;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A value as it appears in IR text: `%name`, or `%vN` when unnamed.
pub struct ValueRef<'a>(pub(crate) &'a FunctionBody, pub(crate) Value);

impl<'a> Display for ValueRef<'a> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self.0.value_name(self.1) {
            Some(name) => write!(f, "%{}", name),
            None => write!(f, "%{}", self.1),
        }
    }
}

/// A block label as it appears in IR text, without the `%`.
pub struct BlockName<'a>(pub(crate) &'a FunctionBody, pub(crate) Block);

impl<'a> Display for BlockName<'a> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self.0.blocks.get(self.1) {
            Some(def) if !def.name.is_empty() => write!(f, "{}", def.name),
            _ => write!(f, "{}", self.1),
        }
    }
}

struct OperandDisplay<'a>(&'a FunctionBody, &'a Operand);

impl<'a> Display for OperandDisplay<'a> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self.1 {
            &Operand::Value(value) => write!(f, "{}", ValueRef(self.0, value)),
            &Operand::Block(block) => write!(f, "label %{}", BlockName(self.0, block)),
            Operand::Const(c) => write!(f, "{}", c),
        }
    }
}

/// One instruction, e.g. `%y = add %x, 1`.
pub struct InstDisplay<'a>(pub(crate) &'a FunctionBody, pub(crate) Value);

impl<'a> Display for InstDisplay<'a> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let body = self.0;
        let data = match &body.values[self.1] {
            ValueDef::Inst(data) => data,
            other => return write!(f, "<{:?}>", other),
        };
        if data.has_result {
            write!(f, "{} = ", ValueRef(body, self.1))?;
        }
        write!(f, "{}", data.opcode)?;

        let args = if data.opcode == Opcode::Phi {
            // Incoming pairs: `[value, %pred]`.
            data.args
                .chunks(2)
                .map(|pair| match pair {
                    [value, Operand::Block(pred)] => format!(
                        "[{}, %{}]",
                        OperandDisplay(body, value),
                        BlockName(body, *pred)
                    ),
                    _ => pair
                        .iter()
                        .map(|arg| format!("{}", OperandDisplay(body, arg)))
                        .collect::<Vec<_>>()
                        .join(", "),
                })
                .collect::<Vec<_>>()
        } else {
            data.args
                .iter()
                .map(|arg| format!("{}", OperandDisplay(body, arg)))
                .collect::<Vec<_>>()
        };
        if !args.is_empty() {
            write!(f, " {}", args.join(", "))?;
        }
        Ok(())
    }
}

pub struct FunctionBodyDisplay<'a>(pub(crate) &'a FunctionBody, pub(crate) &'a str);

impl<'a> Display for FunctionBodyDisplay<'a> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let body = self.0;
        let args = body
            .args
            .iter()
            .map(|&arg| format!("{}", ValueRef(body, arg)))
            .collect::<Vec<_>>();
        writeln!(f, "{}function @{}({}) {{", self.1, body.name, args.join(", "))?;
        for (block, def) in body.blocks.entries() {
            writeln!(f, "{}{}:", self.1, BlockName(body, block))?;
            for &inst in &def.insts {
                writeln!(f, "{}  {}", self.1, InstDisplay(body, inst))?;
            }
        }
        writeln!(f, "{}}}", self.1)
    }
}

impl FunctionBody {
    pub fn value_ref(&self, value: Value) -> ValueRef<'_> {
        ValueRef(self, value)
    }

    pub fn block_name(&self, block: Block) -> BlockName<'_> {
        BlockName(self, block)
    }

    pub fn inst_display(&self, inst: Value) -> InstDisplay<'_> {
        InstDisplay(self, inst)
    }
}

pub struct ModuleDisplay<'a>(pub(crate) &'a Module);

impl<'a> Display for ModuleDisplay<'a> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        for (i, body) in self.0.funcs.values().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", body.display(""))?;
        }
        Ok(())
    }
}
