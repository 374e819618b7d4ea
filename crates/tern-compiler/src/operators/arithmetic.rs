//! Primitive arithmetic.
//!
//! Only `+` and `-` with exactly one argument exist. The operation runs at
//! the wider of the two operand widths; the narrow side, receiver or
//! argument, is widened right after it is evaluated. The plan is computed
//! before anything is emitted, so a rejected operator leaves no
//! instructions behind.

use tern_core::{CompilationError, MachineType, PrimitiveKind, Span, format_arg_types};

use super::ArithmeticWidth;
use crate::bytecode::Instruction;

/// Validated arithmetic call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArithmeticPlan {
    /// Widen the receiver with `I2L` after evaluating it.
    pub widen_receiver: bool,
    /// Widen the argument with `I2L` after evaluating it.
    pub widen_argument: bool,
    /// The single arithmetic instruction.
    pub instruction: Instruction,
    /// Type of the result.
    pub result: MachineType,
}

/// Validate `receiver <operator> args` for a receiver of `receiver` width
/// and pick its instructions.
pub fn plan_arithmetic(
    receiver: ArithmeticWidth,
    operator: &str,
    args: &[MachineType],
    span: Span,
) -> Result<ArithmeticPlan, CompilationError> {
    let unsupported = || CompilationError::UnsupportedOperator {
        operator: operator.to_string(),
        receiver: if args.is_empty() {
            receiver.machine_type().to_string()
        } else {
            format!("{} with ({})", receiver.machine_type(), format_arg_types(args))
        },
        span,
    };

    let [argument] = args else {
        return Err(unsupported());
    };

    let argument = match argument.primitive() {
        Some(PrimitiveKind::Int) => ArithmeticWidth::Narrow,
        Some(PrimitiveKind::Long) => ArithmeticWidth::Wide,
        Some(PrimitiveKind::Boolean) | None => return Err(unsupported()),
    };
    let width = receiver.max(argument);

    let instruction = match (width, operator) {
        (ArithmeticWidth::Narrow, "+") => Instruction::IAdd,
        (ArithmeticWidth::Narrow, "-") => Instruction::ISub,
        (ArithmeticWidth::Wide, "+") => Instruction::LAdd,
        (ArithmeticWidth::Wide, "-") => Instruction::LSub,
        _ => return Err(unsupported()),
    };

    Ok(ArithmeticPlan {
        widen_receiver: receiver < width,
        widen_argument: argument < width,
        instruction,
        result: width.machine_type(),
    })
}
