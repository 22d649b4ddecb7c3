//! Operators.

use std::fmt;

/// Integer comparison predicates for `icmp`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntCC {
    Eq,
    Ne,
    Ugt,
    Uge,
    Ult,
    Ule,
    Sgt,
    Sge,
    Slt,
    Sle,
}

/// Floating-point comparison predicates for `fcmp`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FloatCC {
    Oeq,
    One,
    Olt,
    Ole,
    Ogt,
    Oge,
    Ord,
    Ueq,
    Une,
    Ult,
    Ule,
    Ugt,
    Uge,
    Uno,
}

const INT_CCS: &[(IntCC, &str)] = &[
    (IntCC::Eq, "eq"),
    (IntCC::Ne, "ne"),
    (IntCC::Ugt, "ugt"),
    (IntCC::Uge, "uge"),
    (IntCC::Ult, "ult"),
    (IntCC::Ule, "ule"),
    (IntCC::Sgt, "sgt"),
    (IntCC::Sge, "sge"),
    (IntCC::Slt, "slt"),
    (IntCC::Sle, "sle"),
];

const FLOAT_CCS: &[(FloatCC, &str)] = &[
    (FloatCC::Oeq, "oeq"),
    (FloatCC::One, "one"),
    (FloatCC::Olt, "olt"),
    (FloatCC::Ole, "ole"),
    (FloatCC::Ogt, "ogt"),
    (FloatCC::Oge, "oge"),
    (FloatCC::Ord, "ord"),
    (FloatCC::Ueq, "ueq"),
    (FloatCC::Une, "une"),
    (FloatCC::Ult, "ult"),
    (FloatCC::Ule, "ule"),
    (FloatCC::Ugt, "ugt"),
    (FloatCC::Uge, "uge"),
    (FloatCC::Uno, "uno"),
];

impl IntCC {
    pub fn from_name(s: &str) -> Option<IntCC> {
        INT_CCS.iter().find(|(_, name)| *name == s).map(|(cc, _)| *cc)
    }

    pub fn as_str(self) -> &'static str {
        INT_CCS
            .iter()
            .find(|(cc, _)| *cc == self)
            .map(|(_, name)| *name)
            .unwrap_or("?")
    }
}

impl FloatCC {
    pub fn from_name(s: &str) -> Option<FloatCC> {
        FLOAT_CCS
            .iter()
            .find(|(_, name)| *name == s)
            .map(|(cc, _)| *cc)
    }

    pub fn as_str(self) -> &'static str {
        FLOAT_CCS
            .iter()
            .find(|(cc, _)| *cc == self)
            .map(|(_, name)| *name)
            .unwrap_or("?")
    }
}

/// Coarse instruction classes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InstKind {
    /// Control transfer ending a block (`invoke` is classed as `Call`).
    Terminator,
    /// Integer and floating-point arithmetic and bitwise logic.
    Arithmetic,
    /// Loads, stores, address computation and atomics.
    Memory,
    Conversion,
    Comparison,
    /// `call` and `invoke`.
    Call,
    Phi,
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Terminators.
    Ret,
    Br,
    Switch,
    IndirectBr,
    Invoke,
    Resume,
    Unreachable,

    // Unary and binary operations.
    FNeg,
    Add,
    FAdd,
    Sub,
    FSub,
    Mul,
    FMul,
    UDiv,
    SDiv,
    FDiv,
    URem,
    SRem,
    FRem,
    Shl,
    LShr,
    AShr,
    And,
    Or,
    Xor,

    // Vector and aggregate operations.
    ExtractElement,
    InsertElement,
    ShuffleVector,
    ExtractValue,
    InsertValue,

    // Memory access and addressing.
    Alloca,
    Load,
    Store,
    GetElementPtr,
    Fence,
    CmpXchg,
    AtomicRmw,

    // Conversions.
    Trunc,
    ZExt,
    SExt,
    FPTrunc,
    FPExt,
    FPToUI,
    FPToSI,
    UIToFP,
    SIToFP,
    PtrToInt,
    IntToPtr,
    BitCast,
    AddrSpaceCast,

    // Comparisons.
    ICmp(IntCC),
    FCmp(FloatCC),

    // Other operations.
    Call,
    Phi,
    Select,
    VAArg,
    LandingPad,
    Freeze,

    /// A mnemonic outside the known taxonomy.
    Other(String),
}

const MNEMONICS: &[(&str, Opcode)] = &[
    ("ret", Opcode::Ret),
    ("br", Opcode::Br),
    ("switch", Opcode::Switch),
    ("indirectbr", Opcode::IndirectBr),
    ("invoke", Opcode::Invoke),
    ("resume", Opcode::Resume),
    ("unreachable", Opcode::Unreachable),
    ("fneg", Opcode::FNeg),
    ("add", Opcode::Add),
    ("fadd", Opcode::FAdd),
    ("sub", Opcode::Sub),
    ("fsub", Opcode::FSub),
    ("mul", Opcode::Mul),
    ("fmul", Opcode::FMul),
    ("udiv", Opcode::UDiv),
    ("sdiv", Opcode::SDiv),
    ("fdiv", Opcode::FDiv),
    ("urem", Opcode::URem),
    ("srem", Opcode::SRem),
    ("frem", Opcode::FRem),
    ("shl", Opcode::Shl),
    ("lshr", Opcode::LShr),
    ("ashr", Opcode::AShr),
    ("and", Opcode::And),
    ("or", Opcode::Or),
    ("xor", Opcode::Xor),
    ("extractelement", Opcode::ExtractElement),
    ("insertelement", Opcode::InsertElement),
    ("shufflevector", Opcode::ShuffleVector),
    ("extractvalue", Opcode::ExtractValue),
    ("insertvalue", Opcode::InsertValue),
    ("alloca", Opcode::Alloca),
    ("load", Opcode::Load),
    ("store", Opcode::Store),
    ("getelementptr", Opcode::GetElementPtr),
    ("fence", Opcode::Fence),
    ("cmpxchg", Opcode::CmpXchg),
    ("atomicrmw", Opcode::AtomicRmw),
    ("trunc", Opcode::Trunc),
    ("zext", Opcode::ZExt),
    ("sext", Opcode::SExt),
    ("fptrunc", Opcode::FPTrunc),
    ("fpext", Opcode::FPExt),
    ("fptoui", Opcode::FPToUI),
    ("fptosi", Opcode::FPToSI),
    ("uitofp", Opcode::UIToFP),
    ("sitofp", Opcode::SIToFP),
    ("ptrtoint", Opcode::PtrToInt),
    ("inttoptr", Opcode::IntToPtr),
    ("bitcast", Opcode::BitCast),
    ("addrspacecast", Opcode::AddrSpaceCast),
    ("call", Opcode::Call),
    ("phi", Opcode::Phi),
    ("select", Opcode::Select),
    ("va_arg", Opcode::VAArg),
    ("landingpad", Opcode::LandingPad),
    ("freeze", Opcode::Freeze),
];

impl Opcode {
    /// Look up a mnemonic. Comparisons need their predicate and are
    /// handled by `Opcode::compare`; anything unknown becomes
    /// `Opcode::Other`.
    pub fn from_mnemonic(name: &str) -> Opcode {
        MNEMONICS
            .iter()
            .find(|(mnemonic, _)| *mnemonic == name)
            .map(|(_, op)| op.clone())
            .unwrap_or_else(|| Opcode::Other(name.to_owned()))
    }

    /// Build an `icmp`/`fcmp` from its mnemonic and predicate word.
    pub fn compare(name: &str, pred: &str) -> Option<Opcode> {
        match name {
            "icmp" => IntCC::from_name(pred).map(Opcode::ICmp),
            "fcmp" => FloatCC::from_name(pred).map(Opcode::FCmp),
            _ => None,
        }
    }

    pub fn is_compare_mnemonic(name: &str) -> bool {
        name == "icmp" || name == "fcmp"
    }

    pub fn kind(&self) -> InstKind {
        match self {
            Opcode::Ret
            | Opcode::Br
            | Opcode::Switch
            | Opcode::IndirectBr
            | Opcode::Resume
            | Opcode::Unreachable => InstKind::Terminator,

            Opcode::FNeg
            | Opcode::Add
            | Opcode::FAdd
            | Opcode::Sub
            | Opcode::FSub
            | Opcode::Mul
            | Opcode::FMul
            | Opcode::UDiv
            | Opcode::SDiv
            | Opcode::FDiv
            | Opcode::URem
            | Opcode::SRem
            | Opcode::FRem
            | Opcode::Shl
            | Opcode::LShr
            | Opcode::AShr
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor => InstKind::Arithmetic,

            Opcode::Alloca
            | Opcode::Load
            | Opcode::Store
            | Opcode::GetElementPtr
            | Opcode::Fence
            | Opcode::CmpXchg
            | Opcode::AtomicRmw => InstKind::Memory,

            Opcode::Trunc
            | Opcode::ZExt
            | Opcode::SExt
            | Opcode::FPTrunc
            | Opcode::FPExt
            | Opcode::FPToUI
            | Opcode::FPToSI
            | Opcode::UIToFP
            | Opcode::SIToFP
            | Opcode::PtrToInt
            | Opcode::IntToPtr
            | Opcode::BitCast
            | Opcode::AddrSpaceCast => InstKind::Conversion,

            Opcode::ICmp(_) | Opcode::FCmp(_) => InstKind::Comparison,

            Opcode::Call | Opcode::Invoke => InstKind::Call,

            Opcode::Phi => InstKind::Phi,

            Opcode::ExtractElement
            | Opcode::InsertElement
            | Opcode::ShuffleVector
            | Opcode::ExtractValue
            | Opcode::InsertValue
            | Opcode::Select
            | Opcode::VAArg
            | Opcode::LandingPad
            | Opcode::Freeze
            | Opcode::Other(_) => InstKind::Other,
        }
    }

    /// Does this opcode end a block?
    pub fn is_terminator(&self) -> bool {
        self.kind() == InstKind::Terminator || *self == Opcode::Invoke
    }

    /// Opcodes whose instructions never define a value.
    pub fn never_has_result(&self) -> bool {
        matches!(
            self,
            Opcode::Ret
                | Opcode::Br
                | Opcode::Switch
                | Opcode::IndirectBr
                | Opcode::Resume
                | Opcode::Unreachable
                | Opcode::Store
                | Opcode::Fence
        )
    }

    /// Fixed operand count, for opcodes that have one.
    pub fn fixed_arity(&self) -> Option<usize> {
        match self {
            Opcode::Load => Some(1),
            Opcode::Store => Some(2),
            _ => None,
        }
    }

    pub fn mnemonic(&self) -> &str {
        match self {
            Opcode::ICmp(_) => "icmp",
            Opcode::FCmp(_) => "fcmp",
            Opcode::Other(name) => name.as_str(),
            op => MNEMONICS
                .iter()
                .find(|(_, candidate)| candidate == op)
                .map(|(mnemonic, _)| *mnemonic)
                .unwrap_or("?"),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Opcode::ICmp(cc) => write!(f, "icmp {}", cc.as_str()),
            Opcode::FCmp(cc) => write!(f, "fcmp {}", cc.as_str()),
            op => write!(f, "{}", op.mnemonic()),
        }
    }
}
