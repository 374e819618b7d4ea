//! Abstract instruction set.
//!
//! Instructions are symbolic: labels stay labels, classes and members are
//! named, constants are inline. The class-file writer downstream turns them
//! into offsets and constant-pool indices.

use std::fmt;

use tern_core::{ClassRef, MachineType, MethodCandidate, StackKind};

/// Method-scoped jump target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub u32);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Branch condition, tested against zero (`If`) or between two narrow
/// integers (`IfICmp`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Eq,
    Ne,
    Lt,
    Ge,
    Gt,
    Le,
}

impl Condition {
    /// Condition for a comparison operator name.
    pub fn from_operator(name: &str) -> Option<Self> {
        match name {
            "==" => Some(Condition::Eq),
            "!=" => Some(Condition::Ne),
            "<" => Some(Condition::Lt),
            ">=" => Some(Condition::Ge),
            ">" => Some(Condition::Gt),
            "<=" => Some(Condition::Le),
            _ => None,
        }
    }

    /// The condition that holds exactly when `self` does not.
    pub fn negate(self) -> Self {
        match self {
            Condition::Eq => Condition::Ne,
            Condition::Ne => Condition::Eq,
            Condition::Lt => Condition::Ge,
            Condition::Ge => Condition::Lt,
            Condition::Gt => Condition::Le,
            Condition::Le => Condition::Gt,
        }
    }

    /// Whether this is `==` or `!=`.
    pub fn is_equality(self) -> bool {
        matches!(self, Condition::Eq | Condition::Ne)
    }

    fn mnemonic(self) -> &'static str {
        match self {
            Condition::Eq => "eq",
            Condition::Ne => "ne",
            Condition::Lt => "lt",
            Condition::Ge => "ge",
            Condition::Gt => "gt",
            Condition::Le => "le",
        }
    }
}

/// Symbolic reference to an invoked member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub owner: ClassRef,
    pub name: String,
    pub params: Vec<MachineType>,
    pub return_type: MachineType,
}

impl From<&MethodCandidate> for MethodRef {
    fn from(candidate: &MethodCandidate) -> Self {
        Self {
            owner: candidate.owner.clone(),
            name: candidate.name.clone(),
            params: candidate.params.clone(),
            return_type: candidate.return_type.clone(),
        }
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}({}){}",
            self.owner.name,
            self.name,
            tern_core::format_arg_types(&self.params),
            self.return_type
        )
    }
}

/// One abstract machine instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Instruction {
    // =========================================================================
    // Constants
    // =========================================================================
    /// Push a narrow integer (also booleans).
    PushInt(i32),
    /// Push a wide integer.
    PushLong(i64),
    /// Push a string constant.
    PushString(String),
    /// Push the null reference.
    PushNull,

    // =========================================================================
    // Locals and stack
    // =========================================================================
    /// Push local `slot`.
    Load { kind: StackKind, slot: u16 },
    /// Pop into local `slot`.
    Store { kind: StackKind, slot: u16 },
    /// Duplicate the top value.
    Dup(StackKind),
    /// Discard the top value.
    Pop(StackKind),

    // =========================================================================
    // Arithmetic
    // =========================================================================
    IAdd,
    ISub,
    LAdd,
    LSub,
    /// Widen the top narrow integer to a wide integer.
    I2L,
    /// Compare two wide integers, pushing -1, 0 or 1.
    LCmp,

    // =========================================================================
    // Objects and calls
    // =========================================================================
    /// Allocate an uninitialized instance.
    New(ClassRef),
    InvokeStatic(MethodRef),
    InvokeVirtual(MethodRef),
    InvokeInterface(MethodRef),
    /// Constructor and superclass constructor calls.
    InvokeSpecial(MethodRef),

    // =========================================================================
    // Control flow
    // =========================================================================
    Goto(Label),
    /// Pop a narrow integer and branch if it satisfies `cond` against zero.
    If { cond: Condition, target: Label },
    /// Pop two narrow integers and branch if `a cond b`.
    IfICmp { cond: Condition, target: Label },
    /// Bind a label to the current position.
    Bind(Label),
    /// Return the top value.
    Return(StackKind),
    ReturnVoid,
}

impl Instruction {
    /// Number of values this instruction pops.
    pub fn pops(&self) -> usize {
        match self {
            Instruction::PushInt(_)
            | Instruction::PushLong(_)
            | Instruction::PushString(_)
            | Instruction::PushNull
            | Instruction::Load { .. }
            | Instruction::Dup(_)
            | Instruction::New(_)
            | Instruction::Goto(_)
            | Instruction::Bind(_)
            | Instruction::ReturnVoid => 0,
            Instruction::Store { .. }
            | Instruction::Pop(_)
            | Instruction::I2L
            | Instruction::If { .. }
            | Instruction::Return(_) => 1,
            Instruction::IAdd
            | Instruction::ISub
            | Instruction::LAdd
            | Instruction::LSub
            | Instruction::LCmp
            | Instruction::IfICmp { .. } => 2,
            Instruction::InvokeStatic(method) => method.params.len(),
            Instruction::InvokeVirtual(method)
            | Instruction::InvokeInterface(method)
            | Instruction::InvokeSpecial(method) => method.params.len() + 1,
        }
    }

    /// Kind of the value this instruction pushes, if any.
    pub fn pushes(&self) -> Option<StackKind> {
        match self {
            Instruction::PushInt(_)
            | Instruction::IAdd
            | Instruction::ISub
            | Instruction::LCmp => Some(StackKind::Int),
            Instruction::PushLong(_)
            | Instruction::LAdd
            | Instruction::LSub
            | Instruction::I2L => Some(StackKind::Long),
            Instruction::PushString(_) | Instruction::PushNull | Instruction::New(_) => {
                Some(StackKind::Reference)
            }
            Instruction::Load { kind, .. } | Instruction::Dup(kind) => Some(*kind),
            Instruction::InvokeStatic(method)
            | Instruction::InvokeVirtual(method)
            | Instruction::InvokeInterface(method)
            | Instruction::InvokeSpecial(method) => method.return_type.stack_kind(),
            Instruction::Store { .. }
            | Instruction::Pop(_)
            | Instruction::Goto(_)
            | Instruction::If { .. }
            | Instruction::IfICmp { .. }
            | Instruction::Bind(_)
            | Instruction::Return(_)
            | Instruction::ReturnVoid => None,
        }
    }

    /// Branch target, for jumps.
    pub fn target(&self) -> Option<Label> {
        match self {
            Instruction::Goto(target)
            | Instruction::If { target, .. }
            | Instruction::IfICmp { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// Whether control never falls through to the next instruction.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Instruction::Goto(_) | Instruction::Return(_) | Instruction::ReturnVoid
        )
    }
}

fn kind_prefix(kind: StackKind) -> &'static str {
    match kind {
        StackKind::Int => "i",
        StackKind::Long => "l",
        StackKind::Reference => "a",
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::PushInt(value) => write!(f, "push.i {value}"),
            Instruction::PushLong(value) => write!(f, "push.l {value}"),
            Instruction::PushString(value) => write!(f, "push.s {value:?}"),
            Instruction::PushNull => write!(f, "push.null"),
            Instruction::Load { kind, slot } => write!(f, "{}load {slot}", kind_prefix(*kind)),
            Instruction::Store { kind, slot } => write!(f, "{}store {slot}", kind_prefix(*kind)),
            Instruction::Dup(StackKind::Long) => write!(f, "dup2"),
            Instruction::Dup(_) => write!(f, "dup"),
            Instruction::Pop(StackKind::Long) => write!(f, "pop2"),
            Instruction::Pop(_) => write!(f, "pop"),
            Instruction::IAdd => write!(f, "iadd"),
            Instruction::ISub => write!(f, "isub"),
            Instruction::LAdd => write!(f, "ladd"),
            Instruction::LSub => write!(f, "lsub"),
            Instruction::I2L => write!(f, "i2l"),
            Instruction::LCmp => write!(f, "lcmp"),
            Instruction::New(class) => write!(f, "new {}", class.name),
            Instruction::InvokeStatic(method) => write!(f, "invokestatic {method}"),
            Instruction::InvokeVirtual(method) => write!(f, "invokevirtual {method}"),
            Instruction::InvokeInterface(method) => write!(f, "invokeinterface {method}"),
            Instruction::InvokeSpecial(method) => write!(f, "invokespecial {method}"),
            Instruction::Goto(target) => write!(f, "goto {target}"),
            Instruction::If { cond, target } => write!(f, "if{} {target}", cond.mnemonic()),
            Instruction::IfICmp { cond, target } => {
                write!(f, "if_icmp{} {target}", cond.mnemonic())
            }
            Instruction::Bind(label) => write!(f, "{label}:"),
            Instruction::Return(kind) => write!(f, "{}return", kind_prefix(*kind)),
            Instruction::ReturnVoid => write!(f, "return"),
        }
    }
}
