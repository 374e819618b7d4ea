//! Class and method definitions.
//!
//! Each method gets its own [`BytecodeEmitter`] and runs inside
//! [`CompilationContext::in_method`], so nested definitions never disturb
//! the method being emitted around them.
//!
//! ```text
//! script S      class S extends Object { <init>(); static main(String[]) }
//! class C       class C { <init>() unless declared; members }
//! def m(..)     static inside a script body, instance inside a class
//! constructor   this, InvokeSpecial super.<init>(), body, ReturnVoid
//! ```

use tern_ast::{ClassDef, ConstructorDef, MethodDef, Node, Param, Script, TypeRef};
use tern_core::{
    CONSTRUCTOR_NAME, ClassRef, CompilationError, MachineType, MethodFlags, Span, StackKind,
    classes,
};

use crate::context::CompilationContext;
use crate::emit::{BytecodeEmitter, InvokeKind};
use crate::expr::ExprCompiler;
use crate::options::ReturnEpilogue;
use crate::overload::resolve_method;
use crate::scope::{ClassScope, LocalScope, MethodScope};

type Result<T> = std::result::Result<T, CompilationError>;

/// Name of the generated entry point.
pub const MAIN_METHOD: &str = "main";

/// Emit the script class: default constructor plus `main` running the
/// top-level body in statement context.
#[tracing::instrument(skip_all, fields(script = script.name))]
pub fn compile_script(ctx: &mut CompilationContext, script: &Script<'_>) -> Result<()> {
    let scope = ClassScope::new(
        ClassRef::class(script.name),
        ClassRef::class(classes::OBJECT),
        true,
    );

    ctx.in_class(scope, |ctx| {
        compile_default_constructor(ctx, script.span)?;

        let args = main_args();
        let main = MethodScope::new(
            MAIN_METHOD,
            vec![args.clone()],
            MachineType::Void,
            MethodFlags::STATIC,
        );
        ctx.in_method(main, |ctx| {
            method_locals(ctx)?.declare_param("args", args, script.span)?;

            let mut emitter = BytecodeEmitter::new(ctx.options().verbose);
            ExprCompiler::new(ctx, &mut emitter).compile(&script.body, false)?;
            emitter.emit_return_void();
            emitter.finish()
        })
    })
}

/// `String[]`, the parameter of `main`.
pub fn main_args() -> MachineType {
    MachineType::array_of(MachineType::string())
}

/// Emit a user class and all of its members.
pub fn compile_class(ctx: &mut CompilationContext, def: &ClassDef<'_>) -> Result<()> {
    let class = ctx
        .registry()
        .class_ref(def.name)
        .unwrap_or_else(|| ClassRef::class(def.name));
    let superclass = match def.superclass {
        Some(name) => class_of(ctx, name, def.span)?,
        None => ClassRef::class(classes::OBJECT),
    };
    let mut scope = ClassScope::new(class, superclass, false);
    for interface in def.interfaces {
        scope.interfaces.push(class_of(ctx, interface, def.span)?.name);
    }

    let has_constructor = def
        .members
        .iter()
        .any(|member| matches!(member, Node::ConstructorDef(_)));

    ctx.in_class(scope, |ctx| {
        if !has_constructor {
            compile_default_constructor(ctx, def.span)?;
        }
        for member in def.members {
            match member {
                Node::MethodDef(method) => compile_method(ctx, method)?,
                Node::ConstructorDef(constructor) => compile_constructor(ctx, constructor)?,
                other => {
                    return Err(CompilationError::InvalidContext {
                        message: format!(
                            "only methods and constructors may appear in class '{}'",
                            def.name
                        ),
                        span: other.span(),
                    });
                }
            }
        }
        Ok(())
    })
}

/// Emit a method of the current class.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn compile_method(ctx: &mut CompilationContext, def: &MethodDef<'_>) -> Result<()> {
    let (class, is_static_body) = current_class(ctx, def.span)?;
    let is_static = def.is_static || is_static_body;
    let params = param_types(ctx, def.params)?;
    let return_type = ctx.map_type(&def.return_type, def.span)?;
    let flags = if is_static {
        MethodFlags::STATIC
    } else {
        MethodFlags::empty()
    };
    let epilogue = ctx.options().return_epilogue;

    let scope = MethodScope::new(def.name, params.clone(), return_type.clone(), flags);
    ctx.in_method(scope, |ctx| {
        let this = (!is_static).then_some(&class);
        declare_params(ctx, this, def.params, &params)?;

        let mut emitter = BytecodeEmitter::new(ctx.options().verbose);
        ExprCompiler::new(ctx, &mut emitter).compile_as(&def.body, &return_type)?;
        emit_epilogue(&mut emitter, &return_type, is_static, epilogue);
        emitter.finish()
    })
}

/// Emit a constructor of the current class.
pub fn compile_constructor(ctx: &mut CompilationContext, def: &ConstructorDef<'_>) -> Result<()> {
    let (class, is_static_body) = current_class(ctx, def.span)?;
    if is_static_body {
        return Err(CompilationError::InvalidContext {
            message: "constructors may only appear in a class".to_string(),
            span: def.span,
        });
    }
    let params = param_types(ctx, def.params)?;

    let scope = MethodScope::new(
        CONSTRUCTOR_NAME,
        params.clone(),
        MachineType::Void,
        MethodFlags::CONSTRUCTOR,
    );
    ctx.in_method(scope, |ctx| {
        declare_params(ctx, Some(&class), def.params, &params)?;

        let mut emitter = BytecodeEmitter::new(ctx.options().verbose);
        emit_super_call(ctx, &mut emitter, def.span)?;
        ExprCompiler::new(ctx, &mut emitter).compile(&def.body, false)?;
        emitter.emit_return_void();
        emitter.finish()
    })
}

/// Emit `<init>()` that only calls the superclass constructor.
pub fn compile_default_constructor(ctx: &mut CompilationContext, span: Span) -> Result<()> {
    let (class, _) = current_class(ctx, span)?;
    let scope = MethodScope::new(
        CONSTRUCTOR_NAME,
        vec![],
        MachineType::Void,
        MethodFlags::CONSTRUCTOR,
    );
    ctx.in_method(scope, |ctx| {
        method_locals(ctx)?.declare_this(&class)?;

        let mut emitter = BytecodeEmitter::new(ctx.options().verbose);
        emit_super_call(ctx, &mut emitter, span)?;
        emitter.emit_return_void();
        emitter.finish()
    })
}

// ============================================================================
// Helpers
// ============================================================================

fn current_class(ctx: &CompilationContext, span: Span) -> Result<(ClassRef, bool)> {
    match ctx.scopes().current_class() {
        Some(scope) => Ok((scope.class.clone(), scope.is_static_body)),
        None => Err(CompilationError::InvalidContext {
            message: "definition outside of any class".to_string(),
            span,
        }),
    }
}

fn class_of(ctx: &CompilationContext, name: &str, span: Span) -> Result<ClassRef> {
    match ctx.map_type(&TypeRef::named(name), span)? {
        MachineType::Class(class) => Ok(class),
        other => Err(CompilationError::InvalidContext {
            message: format!("{other} cannot be used as a supertype"),
            span,
        }),
    }
}

fn param_types(ctx: &CompilationContext, params: &[Param<'_>]) -> Result<Vec<MachineType>> {
    params
        .iter()
        .map(|param| ctx.map_type(&param.ty, param.span))
        .collect()
}

fn method_locals(ctx: &mut CompilationContext) -> Result<&mut LocalScope> {
    match ctx.scopes_mut().current_method_mut() {
        Some(method) => Ok(&mut method.locals),
        None => Err(CompilationError::internal("no method scope for locals")),
    }
}

fn declare_params(
    ctx: &mut CompilationContext,
    this: Option<&ClassRef>,
    params: &[Param<'_>],
    types: &[MachineType],
) -> Result<()> {
    let locals = method_locals(ctx)?;
    if let Some(class) = this {
        locals.declare_this(class)?;
    }
    for (param, ty) in params.iter().zip(types) {
        locals.declare_param(param.name, ty.clone(), param.span)?;
    }
    Ok(())
}

/// `this`, then `InvokeSpecial` of the superclass no-argument constructor.
fn emit_super_call(
    ctx: &CompilationContext,
    emitter: &mut BytecodeEmitter,
    span: Span,
) -> Result<()> {
    let Some(class) = ctx.scopes().current_class() else {
        return Err(CompilationError::internal("constructor outside of any class"));
    };
    let constructor = resolve_method(
        ctx.registry(),
        &class.superclass,
        CONSTRUCTOR_NAME,
        &[],
        false,
        span,
    )?;
    emitter.emit_load(StackKind::Reference, 0);
    emitter.emit_invoke(InvokeKind::Special, &constructor);
    Ok(())
}

/// Return whatever the body left on the stack.
fn emit_epilogue(
    emitter: &mut BytecodeEmitter,
    return_type: &MachineType,
    is_static: bool,
    epilogue: ReturnEpilogue,
) {
    match return_type.stack_kind() {
        None => emitter.emit_return_void(),
        Some(StackKind::Int) => emitter.emit_return(StackKind::Int),
        Some(StackKind::Long) => emitter.emit_return(StackKind::Long),
        Some(StackKind::Reference) => match epilogue {
            ReturnEpilogue::Legacy if !is_static => {
                emitter.emit_pop(StackKind::Reference);
                emitter.emit_load(StackKind::Reference, 0);
                emitter.emit_return(StackKind::Reference);
            }
            ReturnEpilogue::Legacy | ReturnEpilogue::Corrected => {
                emitter.emit_return(StackKind::Reference);
            }
        },
    }
}
