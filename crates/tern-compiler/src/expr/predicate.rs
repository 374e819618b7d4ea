//! Predicate lowering for branches and loops.
//!
//! A predicate compiles to a conditional jump, never to a materialized
//! boolean when it can be avoided:
//!
//! ```text
//! a < b   (int)      a, b, IfICmp lt
//! a < b   (long)     a, b, LCmp, If lt
//! a < b   (mixed)    a, [I2L], b, [I2L], LCmp, If lt
//! !x      (boolean)  x with the jump sense inverted
//! x       (boolean)  x, If ne
//! ```

use tern_ast::{Call, Node};
use tern_core::{CompilationError, MachineType, PrimitiveKind};

use super::{ExprCompiler, Result};
use crate::bytecode::{Condition, Instruction, Label};

impl<'a> ExprCompiler<'a> {
    /// Jump to `target` when `condition` evaluates to `jump_when`; fall
    /// through otherwise. Leaves the stack depth unchanged on both paths.
    pub(crate) fn compile_jump_if(
        &mut self,
        condition: &Node<'_>,
        jump_when: bool,
        target: Label,
    ) -> Result<()> {
        if let Node::Call(call) = condition
            && !call.receiver.inferred_type().is_meta
        {
            if let Some(comparison) = Condition::from_operator(call.name) {
                return self.compile_comparison(call, comparison, jump_when, target);
            }
            if call.name == "!"
                && call.args.is_empty()
                && self.value_type(&call.receiver)? == MachineType::BOOLEAN
            {
                return self.compile_jump_if(&call.receiver, !jump_when, target);
            }
        }

        let ty = self.value_type(condition)?;
        if ty != MachineType::BOOLEAN {
            return Err(CompilationError::UnsupportedPredicate {
                message: format!("condition of type {ty} is not boolean"),
                span: condition.span(),
            });
        }
        self.compile_as(condition, &MachineType::BOOLEAN)?;
        let test = if jump_when { Condition::Ne } else { Condition::Eq };
        self.emitter.emit_if(test, target);
        Ok(())
    }

    fn compile_comparison(
        &mut self,
        call: &Call<'_>,
        comparison: Condition,
        jump_when: bool,
        target: Label,
    ) -> Result<()> {
        let unsupported = |message: String| CompilationError::UnsupportedPredicate {
            message,
            span: call.span,
        };

        let [rhs] = call.args else {
            return Err(unsupported(format!(
                "comparison '{}' takes exactly one operand",
                call.name
            )));
        };
        let lhs_type = self.value_type(&call.receiver)?;
        let rhs_type = self.value_type(rhs)?;
        let test = if jump_when {
            comparison
        } else {
            comparison.negate()
        };

        match (lhs_type.primitive(), rhs_type.primitive()) {
            (Some(PrimitiveKind::Int), Some(PrimitiveKind::Int)) => {
                self.compile_as(&call.receiver, &lhs_type)?;
                self.compile_as(rhs, &rhs_type)?;
                self.emitter.emit_if_icmp(test, target);
            }
            (
                Some(lhs_kind @ (PrimitiveKind::Int | PrimitiveKind::Long)),
                Some(rhs_kind @ (PrimitiveKind::Int | PrimitiveKind::Long)),
            ) => {
                self.compile_as(&call.receiver, &lhs_type)?;
                if lhs_kind == PrimitiveKind::Int {
                    self.emitter.emit_widen();
                }
                self.compile_as(rhs, &rhs_type)?;
                if rhs_kind == PrimitiveKind::Int {
                    self.emitter.emit_widen();
                }
                self.emitter.emit(Instruction::LCmp);
                self.emitter.emit_if(test, target);
            }
            (Some(PrimitiveKind::Boolean), Some(PrimitiveKind::Boolean)) => {
                if !comparison.is_equality() {
                    return Err(unsupported(format!(
                        "ordering comparison '{}' on boolean",
                        call.name
                    )));
                }
                self.compile_as(&call.receiver, &lhs_type)?;
                self.compile_as(rhs, &rhs_type)?;
                self.emitter.emit_if_icmp(test, target);
            }
            (Some(_), Some(_)) => {
                return Err(unsupported(format!(
                    "comparison '{}' between {lhs_type} and {rhs_type}",
                    call.name
                )));
            }
            _ => {
                return Err(unsupported(format!(
                    "comparison '{}' on non-primitive {lhs_type} and {rhs_type}",
                    call.name
                )));
            }
        }
        Ok(())
    }
}
