//! Calls with an explicit receiver.
//!
//! The receiver's machine type picks a [`CallStrategy`]. Invocations come in
//! three shapes:
//!
//! ```text
//! Type.new(args)     New, Dup, args, InvokeSpecial <init>
//! Type.name(args)    args, InvokeStatic
//! value.name(args)   value, [Dup], args, InvokeVirtual | InvokeInterface
//! ```
//!
//! Resolution runs before the first instruction of the call is emitted.

use tern_ast::Call;
use tern_core::{
    CONSTRUCTOR_NAME, ClassRef, CompilationError, MachineType, StackKind, classes,
};

use super::{ExprCompiler, Result};
use crate::emit::InvokeKind;
use crate::operators::{ArithmeticWidth, CallStrategy, plan_arithmetic};
use crate::overload::resolve_method;

/// Compile `receiver.name(args)`.
pub fn compile_call(
    compiler: &mut ExprCompiler<'_>,
    call: &Call<'_>,
    produces_value: bool,
) -> Result<MachineType> {
    let receiver_type = call.receiver.inferred_type();
    if receiver_type.is_meta {
        let class = meta_class(compiler, call)?;
        if call.name == "new" {
            compile_construction(compiler, call, &class, produces_value)
        } else {
            compile_static_call(compiler, call, &class, produces_value)
        }
    } else {
        let receiver = compiler.value_type(&call.receiver)?;
        match CallStrategy::for_receiver(&receiver) {
            CallStrategy::Arithmetic(width) => compile_arithmetic(compiler, call, width, produces_value),
            CallStrategy::Invocation => compile_instance_call(compiler, call, &receiver, produces_value),
        }
    }
}

/// The class a meta receiver names.
fn meta_class(compiler: &ExprCompiler<'_>, call: &Call<'_>) -> Result<ClassRef> {
    let span = call.receiver.span();
    match compiler.ctx().map_type(&call.receiver.inferred_type(), span)? {
        MachineType::Class(class) => Ok(class),
        receiver @ MachineType::Primitive(_) => Err(CompilationError::PrimitiveReceiverInvocation {
            name: call.name.to_string(),
            receiver: receiver.to_string(),
            span: call.span,
        }),
        receiver @ (MachineType::Array(_) | MachineType::Void) => {
            Err(CompilationError::InvalidContext {
                message: format!("cannot call '{}' on type {receiver}", call.name),
                span: call.span,
            })
        }
    }
}

fn compile_construction(
    compiler: &mut ExprCompiler<'_>,
    call: &Call<'_>,
    class: &ClassRef,
    produces_value: bool,
) -> Result<MachineType> {
    let args = compiler.arg_types(call.args)?;
    let constructor = resolve_method(
        compiler.ctx().registry(),
        class,
        CONSTRUCTOR_NAME,
        &args,
        false,
        call.span,
    )?;

    compiler.emitter().emit_new(class);
    compiler.emitter().emit_dup(StackKind::Reference);
    compiler.compile_args(call.args, &constructor.params)?;
    compiler.emitter().emit_invoke(InvokeKind::Special, &constructor);

    Ok(compiler.finish_value(MachineType::Class(class.clone()), produces_value))
}

fn compile_static_call(
    compiler: &mut ExprCompiler<'_>,
    call: &Call<'_>,
    class: &ClassRef,
    produces_value: bool,
) -> Result<MachineType> {
    let args = compiler.arg_types(call.args)?;
    let method = resolve_method(compiler.ctx().registry(), class, call.name, &args, true, call.span)?;

    compiler.compile_args(call.args, &method.params)?;
    compiler.emitter().emit_invoke(InvokeKind::Static, &method);

    Ok(compiler.finish_value(method.return_type, produces_value))
}

/// Class whose members an instance call on `receiver` resolves against.
fn receiver_class(call: &Call<'_>, receiver: &MachineType) -> Result<ClassRef> {
    match receiver {
        MachineType::Class(class) => Ok(class.clone()),
        MachineType::Array(_) | MachineType::Void => Ok(ClassRef::class(classes::OBJECT)),
        MachineType::Primitive(_) => Err(CompilationError::PrimitiveReceiverInvocation {
            name: call.name.to_string(),
            receiver: receiver.to_string(),
            span: call.span,
        }),
    }
}

/// Type `call` leaves in expression context, resolved without emitting.
///
/// A void instance member yields its receiver, so `a.f().g()` resolves `g`
/// on the type of `a`. `None` means the call has no value of its own.
pub(super) fn call_value_type(
    compiler: &ExprCompiler<'_>,
    call: &Call<'_>,
) -> Result<Option<MachineType>> {
    if call.receiver.inferred_type().is_meta {
        let class = meta_class(compiler, call)?;
        if call.name == "new" {
            return Ok(Some(MachineType::Class(class)));
        }
        let args = compiler.arg_types(call.args)?;
        let method = resolve_method(compiler.ctx().registry(), &class, call.name, &args, true, call.span)?;
        return Ok((!method.returns_void()).then_some(method.return_type));
    }

    let receiver = compiler.value_type(&call.receiver)?;
    match CallStrategy::for_receiver(&receiver) {
        CallStrategy::Arithmetic(_) => Ok(None),
        CallStrategy::Invocation => {
            let class = receiver_class(call, &receiver)?;
            let args = compiler.arg_types(call.args)?;
            let method =
                resolve_method(compiler.ctx().registry(), &class, call.name, &args, false, call.span)?;
            if method.returns_void() {
                Ok(Some(receiver))
            } else {
                Ok(Some(method.return_type))
            }
        }
    }
}

fn compile_instance_call(
    compiler: &mut ExprCompiler<'_>,
    call: &Call<'_>,
    receiver: &MachineType,
    produces_value: bool,
) -> Result<MachineType> {
    let class = receiver_class(call, receiver)?;
    let args = compiler.arg_types(call.args)?;
    let method = resolve_method(compiler.ctx().registry(), &class, call.name, &args, false, call.span)?;

    compiler.compile_as(&call.receiver, receiver)?;
    let chains = method.returns_void() && produces_value;
    if chains {
        compiler.emitter().emit_dup(StackKind::Reference);
    }
    compiler.compile_args(call.args, &method.params)?;

    let kind = if method.is_interface() || method.owner.is_interface || class.is_interface {
        InvokeKind::Interface
    } else {
        InvokeKind::Virtual
    };
    compiler.emitter().emit_invoke(kind, &method);

    if chains {
        return Ok(receiver.clone());
    }
    Ok(compiler.finish_value(method.return_type, produces_value))
}

fn compile_arithmetic(
    compiler: &mut ExprCompiler<'_>,
    call: &Call<'_>,
    receiver: ArithmeticWidth,
    produces_value: bool,
) -> Result<MachineType> {
    let args = compiler.arg_types(call.args)?;
    let plan = plan_arithmetic(receiver, call.name, &args, call.span)?;
    let [argument] = call.args else {
        return Err(CompilationError::internal("arithmetic plan accepted a non-unary call"));
    };

    compiler.compile_as(&call.receiver, &receiver.machine_type())?;
    if plan.widen_receiver {
        compiler.emitter().emit_widen();
    }
    compiler.compile_as(argument, &args[0])?;
    if plan.widen_argument {
        compiler.emitter().emit_widen();
    }
    compiler.emitter().emit(plan.instruction);

    Ok(compiler.finish_value(plan.result, produces_value))
}
