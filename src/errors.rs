//! Error types.

use crate::ir::{Block, Value};
use crate::ops::Opcode;

/// A function body that cannot be analyzed. Reported before any
/// dataflow computation starts; the analysis never runs on a body
/// that fails validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// The function has no blocks.
    EmptyFunction,
    /// The entry block is not one of the function's blocks.
    InvalidEntry(Block),
    EmptyBlock(Block),
    /// The last instruction of the block does not transfer control.
    MissingTerminator(Block),
    /// A control-transfer instruction appears before the end of a block.
    MisplacedTerminator { block: Block, inst: Value },
    /// A block lists something other than an instruction.
    NotAnInstruction { block: Block, value: Value },
    /// An instruction is placed more than once.
    DuplicatePlacement(Value),
    /// An edge (or label operand) refers to a block outside the function.
    DanglingEdge { from: Block, to: Block },
    /// Stored predecessor/successor lists disagree with terminators.
    InconsistentEdges(Block),
    /// An operand refers to a value outside the function.
    DanglingValue { inst: Value, value: Value },
    /// An operand refers to a value that was never defined.
    UnresolvedValue { inst: Value, value: Value },
    /// An operand refers to an instruction that produces no result.
    UseOfVoid { inst: Value, value: Value },
    /// An instruction claims a result its opcode can never produce.
    UnexpectedResult(Value),
    OperandCount {
        inst: Value,
        opcode: Opcode,
        expected: usize,
        found: usize,
    },
    /// A caller-supplied sweep order is not a permutation of the blocks.
    InvalidSweepOrder,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ValidationError::EmptyFunction => write!(f, "function has no blocks"),
            ValidationError::InvalidEntry(block) => {
                write!(f, "entry block {} is not in the function", block)
            }
            ValidationError::EmptyBlock(block) => write!(f, "block {} is empty", block),
            ValidationError::MissingTerminator(block) => {
                write!(f, "block {} does not end in a terminator", block)
            }
            ValidationError::MisplacedTerminator { block, inst } => write!(
                f,
                "terminator {} is not the last instruction of block {}",
                inst, block
            ),
            ValidationError::NotAnInstruction { block, value } => {
                write!(f, "block {} lists {}, which is not an instruction", block, value)
            }
            ValidationError::DuplicatePlacement(value) => {
                write!(f, "instruction {} is placed more than once", value)
            }
            ValidationError::DanglingEdge { from, to } => {
                write!(f, "edge from {} to {} leaves the function", from, to)
            }
            ValidationError::InconsistentEdges(block) => write!(
                f,
                "stored edges of block {} disagree with its terminator",
                block
            ),
            ValidationError::DanglingValue { inst, value } => {
                write!(f, "{} uses {}, which is not in the function", inst, value)
            }
            ValidationError::UnresolvedValue { inst, value } => {
                write!(f, "{} uses {}, which is never defined", inst, value)
            }
            ValidationError::UseOfVoid { inst, value } => {
                write!(f, "{} uses {}, which produces no result", inst, value)
            }
            ValidationError::UnexpectedResult(inst) => {
                write!(f, "{} cannot produce a result", inst)
            }
            ValidationError::OperandCount {
                inst,
                opcode,
                expected,
                found,
            } => write!(
                f,
                "{} ({}) takes {} operands, found {}",
                inst, opcode, expected, found
            ),
            ValidationError::InvalidSweepOrder => {
                write!(f, "sweep order is not a permutation of the function's blocks")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// An error that occurs when translating IR text to IR.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrontendError {
    /// Malformed input at the given (1-based) line.
    Syntax { line: usize, message: String },
    /// A value name is used but never defined in its function.
    UndefinedValue { func: String, name: String },
    /// A label is used but never defined in its function.
    UndefinedBlock { func: String, name: String },
    /// A value, label or function name is defined twice.
    Redefinition { line: usize, name: String },
}

impl std::fmt::Display for FrontendError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FrontendError::Syntax { line, message } => write!(f, "line {}: {}", line, message),
            FrontendError::UndefinedValue { func, name } => {
                write!(f, "in @{}: value %{} is never defined", func, name)
            }
            FrontendError::UndefinedBlock { func, name } => {
                write!(f, "in @{}: label %{} is never defined", func, name)
            }
            FrontendError::Redefinition { line, name } => {
                write!(f, "line {}: {} is already defined", line, name)
            }
        }
    }
}

impl std::error::Error for FrontendError {}
