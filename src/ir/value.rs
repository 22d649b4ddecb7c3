use super::{Block, Value};
use crate::ops::Opcode;
use smallvec::SmallVec;
use std::fmt;

/// What a `Value` is.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueDef {
    /// The n-th function argument.
    Arg(usize),
    /// An instruction. The instruction's identity is the value itself;
    /// whether it also names a usable result is `InstData::has_result`.
    Inst(InstData),
    /// A forward reference that has not been defined yet.
    Placeholder,
}

impl ValueDef {
    pub fn as_inst(&self) -> Option<&InstData> {
        match self {
            ValueDef::Inst(data) => Some(data),
            _ => None,
        }
    }

    /// Can this value appear as an operand?
    pub fn is_definable(&self) -> bool {
        match self {
            ValueDef::Arg(_) => true,
            ValueDef::Inst(data) => data.has_result,
            ValueDef::Placeholder => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InstData {
    pub opcode: Opcode,
    pub args: SmallVec<[Operand; 4]>,
    pub has_result: bool,
}

impl InstData {
    pub fn new<I: IntoIterator<Item = Operand>>(opcode: Opcode, args: I, has_result: bool) -> Self {
        InstData {
            opcode,
            args: args.into_iter().collect(),
            has_result,
        }
    }

    /// Value operands, in operand order.
    pub fn value_args<'a>(&'a self) -> impl Iterator<Item = Value> + 'a {
        self.args.iter().filter_map(Operand::as_value)
    }

    /// Control-flow targets named by this instruction, in operand order.
    pub fn block_args<'a>(&'a self) -> impl Iterator<Item = Block> + 'a {
        self.args.iter().filter_map(Operand::as_block)
    }
}

/// Compile-time constants. None of these are liveness-tracked.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Constant {
    Int(i64),
    Null,
    Undef,
    Global(String),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Constant::Int(i) => write!(f, "{}", i),
            Constant::Null => write!(f, "null"),
            Constant::Undef => write!(f, "undef"),
            Constant::Global(name) => write!(f, "@{}", name),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    Value(Value),
    Block(Block),
    Const(Constant),
}

impl Operand {
    pub fn is_constant(&self) -> bool {
        matches!(self, Operand::Const(_))
    }

    pub fn is_label(&self) -> bool {
        matches!(self, Operand::Block(_))
    }

    pub fn as_value(&self) -> Option<Value> {
        match self {
            &Operand::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<Block> {
        match self {
            &Operand::Block(block) => Some(block),
            _ => None,
        }
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Value(value)
    }
}

impl From<Block> for Operand {
    fn from(block: Block) -> Self {
        Operand::Block(block)
    }
}

impl From<i64> for Operand {
    fn from(i: i64) -> Self {
        Operand::Const(Constant::Int(i))
    }
}
