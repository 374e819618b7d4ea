//! Tern Compiler
//!
//! Code generation backend: turns a type-checked AST into stack-machine
//! bytecode for a class-based host VM with JVM-like invocation.
//!
//! ## Architecture
//!
//! - **Registration**: declare every class, import and method signature
//! - **Emission**: walk the tree again and emit one method at a time
//!
//! ## Modules
//!
//! - [`bytecode`]: Instruction set, labels and branch conditions
//! - [`context`]: Compilation context with scoped class/method emission
//! - [`conversion`]: Assignment conversions between machine types
//! - [`definitions`]: Script, class, method and constructor emission
//! - [`emit`]: Bytecode emitter with stack tracking
//! - [`expr`]: Expression and control-flow compiler
//! - [`operators`]: Primitive arithmetic
//! - [`overload`]: Overload resolution for method calls
//! - [`passes`]: Registration pass
//! - [`scope`]: Class, method and local scopes

pub mod bytecode;
pub mod context;
pub mod conversion;
pub mod definitions;
pub mod emit;
pub mod expr;
pub mod operators;
pub mod options;
pub mod output;
pub mod overload;
pub mod passes;
pub mod scope;

pub use bytecode::{Condition, Instruction, Label, MethodRef};
pub use context::CompilationContext;
pub use conversion::{Conversion, find_conversion, is_assignable};
pub use emit::{BytecodeEmitter, EmittedCode, InvokeKind};
pub use expr::ExprCompiler;
pub use options::{CompileOptions, ReturnEpilogue};
pub use output::{CompiledClass, CompiledMethod, CompiledUnit};
pub use overload::resolve_method;
pub use passes::{RegistrationOutput, RegistrationPass};
pub use scope::{ClassScope, LocalScope, LocalVar, MethodScope, ScopeStack};

// Re-export CompilationError from core for convenience
pub use tern_core::CompilationError;

use tern_ast::Node;
use tern_registry::HostRegistry;

/// The main compiler entry point.
///
/// Holds the host registry every compilation starts from. Each call to
/// [`Compiler::compile`] works on its own copy, so user classes never leak
/// from one unit into the next.
#[derive(Debug, Clone)]
pub struct Compiler {
    registry: HostRegistry,
    options: CompileOptions,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompileOptions::default())
    }
}

impl Compiler {
    /// Compiler over the host standard library.
    pub fn new(options: CompileOptions) -> Self {
        Self::with_registry(HostRegistry::with_standard_library(), options)
    }

    /// Compiler over a caller-provided host registry.
    pub fn with_registry(registry: HostRegistry, options: CompileOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &HostRegistry {
        &self.registry
    }

    /// Register additional host classes before compiling.
    pub fn registry_mut(&mut self) -> &mut HostRegistry {
        &mut self.registry
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile a script into its classes.
    ///
    /// Fails on the first error; no partial output is returned.
    #[tracing::instrument(skip_all)]
    pub fn compile(&self, root: &Node<'_>) -> Result<CompiledUnit, CompilationError> {
        let Node::Script(script) = root else {
            return Err(CompilationError::InvalidContext {
                message: "compilation root must be a script".to_string(),
                span: root.span(),
            });
        };

        let mut ctx = CompilationContext::new(self.registry.clone(), self.options.clone());
        RegistrationPass::new(&mut ctx).run(script)?;
        definitions::compile_script(&mut ctx, script)?;
        let unit = ctx.finish()?;

        tracing::info!(
            script = script.name,
            classes = unit.classes.len(),
            "compiled"
        );
        Ok(unit)
    }
}
