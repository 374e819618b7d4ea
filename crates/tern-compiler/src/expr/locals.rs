//! `self`, local reads and local assignment.

use tern_ast::{Local, LocalAssign, SelfRef};
use tern_core::{CompilationError, MachineType, StackKind};

use super::{ExprCompiler, Result};

/// Compile `self`: slot 0 of an instance method.
pub fn compile_self(
    compiler: &mut ExprCompiler<'_>,
    this: &SelfRef<'_>,
    produces_value: bool,
) -> Result<MachineType> {
    let scopes = compiler.ctx().scopes();
    if scopes.is_static() {
        return Err(CompilationError::InvalidContext {
            message: "`self` used in a static context".to_string(),
            span: this.span,
        });
    }
    let Some(class) = scopes.current_class() else {
        return Err(CompilationError::InvalidContext {
            message: "`self` used outside of a class".to_string(),
            span: this.span,
        });
    };
    let ty = MachineType::Class(class.class.clone());

    if !produces_value {
        return Ok(MachineType::Void);
    }
    compiler.emitter().emit_load(StackKind::Reference, 0);
    Ok(ty)
}

/// Compile a local variable read.
pub fn compile_local(
    compiler: &mut ExprCompiler<'_>,
    local: &Local<'_>,
    produces_value: bool,
) -> Result<MachineType> {
    let var = compiler
        .locals_mut(local.span)?
        .get(local.name)
        .cloned()
        .ok_or_else(|| CompilationError::UnknownVariable {
            name: local.name.to_string(),
            span: local.span,
        })?;

    if !produces_value {
        return Ok(MachineType::Void);
    }
    compiler.emitter().emit_load(var.kind, var.slot);
    Ok(var.machine_type)
}

/// Compile `name = value`.
///
/// The variable takes the assignment's inferred type (the value's own type
/// when that is missing). In expression context the value is duplicated
/// before the store, so the assignment yields it.
pub fn compile_assign(
    compiler: &mut ExprCompiler<'_>,
    assign: &LocalAssign<'_>,
    produces_value: bool,
) -> Result<MachineType> {
    let declared = compiler.ctx().map_type(&assign.inferred, assign.span)?;
    let ty = if declared.is_void() {
        compiler.value_type(&assign.value)?
    } else {
        declared
    };

    compiler.compile_as(&assign.value, &ty)?;
    let var = compiler
        .locals_mut(assign.span)?
        .slot_for_store(assign.name, ty.clone(), assign.span)?;

    if produces_value {
        compiler.emitter().emit_dup(var.kind);
    }
    compiler.emitter().emit_store(var.kind, var.slot);

    Ok(if produces_value { ty } else { MachineType::Void })
}
