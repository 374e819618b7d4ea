//! Receiver-less calls on the current class.
//!
//! Resolved against the current class with the scope's static mode and the
//! call's own argument types. In instance mode a static member is accepted
//! when no instance member applies.

use tern_ast::FunctionalCall;
use tern_core::{ClassRef, CompilationError, MachineType, MethodCandidate, StackKind};

use super::{ExprCompiler, Result};
use crate::emit::InvokeKind;
use crate::overload::resolve_method;

/// Compile `name(args)`.
pub fn compile_self_call(
    compiler: &mut ExprCompiler<'_>,
    call: &FunctionalCall<'_>,
    produces_value: bool,
) -> Result<MachineType> {
    let (class, method) = resolve_self_call(compiler, call)?;

    if method.is_static() {
        compiler.compile_args(call.args, &method.params)?;
        compiler.emitter().emit_invoke(InvokeKind::Static, &method);
        return Ok(compiler.finish_value(method.return_type, produces_value));
    }

    let chains = method.returns_void() && produces_value;
    compiler.emitter().emit_load(StackKind::Reference, 0);
    if chains {
        compiler.emitter().emit_dup(StackKind::Reference);
    }
    compiler.compile_args(call.args, &method.params)?;
    compiler.emitter().emit_invoke(InvokeKind::Virtual, &method);

    if chains {
        return Ok(MachineType::Class(class));
    }
    Ok(compiler.finish_value(method.return_type, produces_value))
}

/// Type a self call leaves in expression context, resolved without
/// emitting. A void instance member yields the current instance.
pub(super) fn self_call_value_type(
    compiler: &ExprCompiler<'_>,
    call: &FunctionalCall<'_>,
) -> Result<Option<MachineType>> {
    let (class, method) = resolve_self_call(compiler, call)?;
    Ok(match (method.returns_void(), method.is_static()) {
        (false, _) => Some(method.return_type),
        (true, false) => Some(MachineType::Class(class)),
        (true, true) => None,
    })
}

fn resolve_self_call(
    compiler: &ExprCompiler<'_>,
    call: &FunctionalCall<'_>,
) -> Result<(ClassRef, MethodCandidate)> {
    let scopes = compiler.ctx().scopes();
    let Some(class) = scopes.current_class() else {
        return Err(CompilationError::InvalidContext {
            message: format!("call to '{}' outside of a class", call.name),
            span: call.span,
        });
    };
    let class = class.class.clone();
    let is_static = scopes.is_static();
    let args = compiler.arg_types(call.args)?;
    let registry = compiler.ctx().registry();

    let method = if is_static {
        resolve_method(registry, &class, call.name, &args, true, call.span)?
    } else {
        match resolve_method(registry, &class, call.name, &args, false, call.span) {
            Ok(method) => method,
            Err(instance_err @ CompilationError::NoApplicableMethod { .. }) => {
                resolve_method(registry, &class, call.name, &args, true, call.span)
                    .map_err(|_| instance_err)?
            }
            Err(err) => return Err(err),
        }
    };
    Ok((class, method))
}
