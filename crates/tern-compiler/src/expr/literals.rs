//! Literal compilation.
//!
//! Booleans are narrow integers on the machine (`0`/`1`). In statement
//! context a literal emits nothing.

use tern_ast::{Literal, LiteralValue};
use tern_core::{MachineType, StackKind};

use super::{ExprCompiler, Result};

/// Compile a literal.
pub fn compile_literal(
    compiler: &mut ExprCompiler<'_>,
    lit: &Literal<'_>,
    produces_value: bool,
) -> Result<MachineType> {
    if !produces_value {
        return Ok(MachineType::Void);
    }

    let ty = match lit.value {
        LiteralValue::Int(value) => {
            compiler.emitter().emit_int(value);
            MachineType::INT
        }
        LiteralValue::Long(value) => {
            compiler.emitter().emit_long(value);
            MachineType::LONG
        }
        LiteralValue::Bool(value) => {
            compiler.emitter().emit_bool(value);
            MachineType::BOOLEAN
        }
        LiteralValue::String(value) => {
            compiler.emitter().emit_string(value);
            MachineType::string()
        }
        LiteralValue::Null => {
            let inferred = compiler.ctx().map_type(&lit.inferred, lit.span)?;
            compiler.emitter().emit_null();
            match inferred.stack_kind() {
                Some(StackKind::Reference) => inferred,
                Some(StackKind::Int) | Some(StackKind::Long) | None => MachineType::object(),
            }
        }
    };
    Ok(ty)
}
