//! Call strategy selection.
//!
//! Every call with an explicit receiver is dispatched on the receiver's
//! machine type:
//! - numeric primitives compile operator calls (`a + b` is `a.+(b)`) to
//!   direct arithmetic instructions
//! - everything else becomes a member invocation

mod arithmetic;

pub use arithmetic::{ArithmeticPlan, plan_arithmetic};

use tern_core::{MachineType, PrimitiveKind};

/// Width of primitive arithmetic, ordered narrow to wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ArithmeticWidth {
    /// 32-bit `int`.
    Narrow,
    /// 64-bit `long`.
    Wide,
}

impl ArithmeticWidth {
    /// Machine type of results at this width.
    pub fn machine_type(self) -> MachineType {
        match self {
            ArithmeticWidth::Narrow => MachineType::INT,
            ArithmeticWidth::Wide => MachineType::LONG,
        }
    }
}

/// How a call with an explicit receiver is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStrategy {
    /// Direct arithmetic instructions.
    Arithmetic(ArithmeticWidth),
    /// Member invocation (or construction, for meta receivers).
    Invocation,
}

impl CallStrategy {
    /// Select the strategy for a receiver of type `receiver`.
    pub fn for_receiver(receiver: &MachineType) -> Self {
        match receiver {
            MachineType::Primitive(PrimitiveKind::Int) => {
                CallStrategy::Arithmetic(ArithmeticWidth::Narrow)
            }
            MachineType::Primitive(PrimitiveKind::Long) => {
                CallStrategy::Arithmetic(ArithmeticWidth::Wide)
            }
            MachineType::Primitive(PrimitiveKind::Boolean)
            | MachineType::Void
            | MachineType::Class(_)
            | MachineType::Array(_) => CallStrategy::Invocation,
        }
    }
}
