//! Expression compiler.
//!
//! Every node compiles in one of two contexts:
//! - expression context (`produces_value = true`): the node leaves exactly
//!   one value on the operand stack
//! - statement context (`produces_value = false`): the stack depth is
//!   unchanged afterwards
//!
//! Nodes with no natural value (void calls, `Noop`, definitions) push a
//! placeholder in expression context; values computed in statement context
//! are popped.
//!
//! # Example
//!
//! ```ignore
//! let mut emitter = BytecodeEmitter::new(false);
//! let mut compiler = ExprCompiler::new(&mut ctx, &mut emitter);
//! let ty = compiler.compile(&node, true)?;
//! ```

mod body;
mod branch;
mod calls;
mod literals;
mod locals;
mod loops;
mod predicate;
mod self_call;

use tern_ast::Node;
use tern_core::{CompilationError, MachineType, Span, StackKind};

use crate::context::CompilationContext;
use crate::conversion::find_conversion;
use crate::definitions;
use crate::emit::BytecodeEmitter;
use crate::scope::LocalScope;

type Result<T> = std::result::Result<T, CompilationError>;

/// Compiles AST nodes of one method body into its emitter.
pub struct ExprCompiler<'a> {
    /// Compilation context with registry, type table and scopes
    ctx: &'a mut CompilationContext,
    /// Bytecode emitter of the current method
    emitter: &'a mut BytecodeEmitter,
}

impl<'a> ExprCompiler<'a> {
    /// Create a new expression compiler.
    pub fn new(ctx: &'a mut CompilationContext, emitter: &'a mut BytecodeEmitter) -> Self {
        Self { ctx, emitter }
    }

    /// Access the compilation context.
    pub fn ctx(&self) -> &CompilationContext {
        &*self.ctx
    }

    /// Access the bytecode emitter.
    pub fn emitter(&mut self) -> &mut BytecodeEmitter {
        &mut *self.emitter
    }

    /// Compile `node` and return the machine type of the value it left on
    /// the stack ([`MachineType::Void`] in statement context).
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(&mut self, node: &Node<'_>, produces_value: bool) -> Result<MachineType> {
        match node {
            Node::Script(script) => Err(CompilationError::InvalidContext {
                message: format!("script '{}' cannot be nested", script.name),
                span: script.span,
            }),

            Node::ClassDef(def) => {
                definitions::compile_class(self.ctx, def)?;
                Ok(self.no_value(produces_value))
            }
            Node::MethodDef(def) => {
                definitions::compile_method(self.ctx, def)?;
                Ok(self.no_value(produces_value))
            }
            Node::ConstructorDef(def) => {
                definitions::compile_constructor(self.ctx, def)?;
                Ok(self.no_value(produces_value))
            }
            Node::Import(import) => {
                self.ctx
                    .import(import.simple_name(), import.alias, import.full, import.span)?;
                Ok(self.no_value(produces_value))
            }

            Node::Body(body) => body::compile_body(self, body, produces_value),
            Node::Literal(lit) => literals::compile_literal(self, lit, produces_value),
            Node::TypeName(ty) => {
                if produces_value {
                    return Err(CompilationError::InvalidContext {
                        message: format!("type '{}' used as a value", ty.name),
                        span: ty.span,
                    });
                }
                Ok(MachineType::Void)
            }
            Node::SelfRef(this) => locals::compile_self(self, this, produces_value),
            Node::Local(local) => locals::compile_local(self, local, produces_value),
            Node::LocalAssign(assign) => locals::compile_assign(self, assign, produces_value),
            Node::Call(call) => calls::compile_call(self, call, produces_value),
            Node::FunctionalCall(call) => self_call::compile_self_call(self, call, produces_value),
            Node::If(branch) => self.compile_if(branch, produces_value),
            Node::Loop(lp) => self.compile_loop(lp, produces_value),
            Node::Noop(_) => Ok(self.no_value(produces_value)),
        }
    }

    /// Compile `node` in expression context and convert the result to
    /// `target`.
    pub fn compile_as(&mut self, node: &Node<'_>, target: &MachineType) -> Result<()> {
        if target.is_void() {
            self.compile(node, false)?;
            return Ok(());
        }
        let actual = self.compile(node, true)?;
        self.coerce(&actual, target, node.span())
    }

    /// Convert the top value from `actual` to `target`.
    fn coerce(&mut self, actual: &MachineType, target: &MachineType, span: Span) -> Result<()> {
        if let Some(conversion) = find_conversion(self.ctx.registry(), actual, target) {
            conversion.emit(self.emitter);
            return Ok(());
        }
        // Narrowing reference conversions were already checked upstream.
        if actual.stack_kind() == Some(StackKind::Reference)
            && target.stack_kind() == Some(StackKind::Reference)
        {
            return Ok(());
        }
        Err(CompilationError::InvalidContext {
            message: format!("cannot use a value of type {actual} where {target} is expected"),
            span,
        })
    }

    /// Machine type of the value `node` leaves in expression context,
    /// computed without emitting anything.
    ///
    /// Calls without an inferred type are resolved here, so a call on a void
    /// member is typed as its receiver.
    pub(crate) fn value_type(&self, node: &Node<'_>) -> Result<MachineType> {
        let ty = self.ctx.map_type(&node.inferred_type(), node.span())?;
        if !ty.is_void() {
            return Ok(ty);
        }
        let resolved = match node {
            Node::Call(call) => calls::call_value_type(self, call)?,
            Node::FunctionalCall(call) => self_call::self_call_value_type(self, call)?,
            _ => None,
        };
        Ok(resolved.unwrap_or_else(MachineType::object))
    }

    /// Machine types of call arguments, computed without emitting anything.
    pub(crate) fn arg_types(&self, args: &[Node<'_>]) -> Result<Vec<MachineType>> {
        args.iter().map(|arg| self.value_type(arg)).collect()
    }

    /// Compile call arguments left to right, converting each to its
    /// parameter type.
    pub(crate) fn compile_args(&mut self, args: &[Node<'_>], params: &[MachineType]) -> Result<()> {
        if args.len() != params.len() {
            return Err(CompilationError::internal(format!(
                "{} argument(s) for {} parameter(s)",
                args.len(),
                params.len()
            )));
        }
        for (arg, param) in args.iter().zip(params) {
            self.compile_as(arg, param)?;
        }
        Ok(())
    }

    /// Push the default value of `ty`.
    pub(crate) fn placeholder(&mut self, ty: &MachineType) -> MachineType {
        match ty.stack_kind() {
            Some(StackKind::Int) => {
                self.emitter.emit_int(0);
                ty.clone()
            }
            Some(StackKind::Long) => {
                self.emitter.emit_long(0);
                ty.clone()
            }
            Some(StackKind::Reference) => {
                self.emitter.emit_null();
                ty.clone()
            }
            None => {
                self.emitter.emit_null();
                MachineType::object()
            }
        }
    }

    /// Result of a construct with no value of its own.
    fn no_value(&mut self, produces_value: bool) -> MachineType {
        if produces_value {
            self.placeholder(&MachineType::Void)
        } else {
            MachineType::Void
        }
    }

    /// Adjust a computed value of type `produced` to the context.
    ///
    /// Void results get a placeholder in expression context; values in
    /// statement context are popped.
    pub(crate) fn finish_value(&mut self, produced: MachineType, produces_value: bool) -> MachineType {
        match (produced.stack_kind(), produces_value) {
            (None, true) => self.placeholder(&produced),
            (None, false) => MachineType::Void,
            (Some(_), true) => produced,
            (Some(kind), false) => {
                self.emitter.emit_pop(kind);
                MachineType::Void
            }
        }
    }

    /// Locals of the method being compiled.
    pub(crate) fn locals_mut(&mut self, span: Span) -> Result<&mut LocalScope> {
        match self.ctx.scopes_mut().current_method_mut() {
            Some(method) => Ok(&mut method.locals),
            None => Err(CompilationError::InvalidContext {
                message: "local variables are only available inside a method".to_string(),
                span,
            }),
        }
    }
}


#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use tern_ast::AstBuilder;
    use tern_core::{CompilationError, MachineType, StackKind};

    use super::test_support::*;
    use crate::bytecode::Instruction;

    #[test]
    fn noop_pushes_placeholder_in_expression_context() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);

        let value = compile_static(&[], &ast.noop(), true).unwrap();
        assert_eq!(value.code, vec![Instruction::PushNull]);
        assert_eq!(value.depth, 1);

        let statement = compile_static(&[], &ast.noop(), false).unwrap();
        assert!(statement.code.is_empty());
    }

    #[test]
    fn type_name_is_not_a_value() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);

        let err = compile_static(&[], &ast.type_name("String"), true).unwrap_err();
        assert!(matches!(err, CompilationError::InvalidContext { .. }));
        assert!(compile_static(&[], &ast.type_name("String"), false).is_ok());
    }

    #[test]
    fn nested_script_is_rejected() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let inner = ast.script("Inner", &[]);

        let err = compile_static(&[], &inner, false).unwrap_err();
        assert!(matches!(err, CompilationError::InvalidContext { .. }));
    }

    #[test]
    fn arguments_widen_to_parameter_types() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        // Only Math.max(long, long) accepts (int, long).
        let call = ast.call(
            ast.type_name("java.lang.Math"),
            "max",
            &[ast.local("i", INT), ast.local("n", LONG)],
            LONG,
        );

        let compiled = compile_static(
            &[local("i", MachineType::INT), local("n", MachineType::LONG)],
            &call,
            true,
        )
        .unwrap();

        assert_eq!(compiled.ty, MachineType::LONG);
        assert_eq!(compiled.depth, 1);
        assert_eq!(
            &compiled.code[..3],
            &[
                Instruction::Load { kind: StackKind::Int, slot: 0 },
                Instruction::I2L,
                Instruction::Load { kind: StackKind::Long, slot: 1 },
            ]
        );
        assert!(matches!(compiled.code[3], Instruction::InvokeStatic(_)));
    }

    #[test]
    fn definitions_in_expression_context_yield_placeholder() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let import = ast.import("java.util.ArrayList", None);

        let compiled = compile_static(&[], &import, true).unwrap();
        assert_eq!(compiled.code, vec![Instruction::PushNull]);
        assert_eq!(compiled.ty, MachineType::object());
    }
}
