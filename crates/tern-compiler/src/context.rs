//! CompilationContext - state threaded through one compilation unit.
//!
//! Owns the host registry, the type mapping table, the scope stack and the
//! classes finished so far. Nested class and method emission goes through
//! [`CompilationContext::in_class`] and [`CompilationContext::in_method`],
//! which restore the enclosing scope on every exit path.

use rustc_hash::FxHashMap;
use tern_ast::TypeRef;
use tern_core::{CompilationError, MachineType, Span, TypeDescriptor};
use tern_registry::{HostRegistry, TypeMapper};

use crate::emit::EmittedCode;
use crate::options::CompileOptions;
use crate::output::{CompiledClass, CompiledMethod, CompiledUnit};
use crate::scope::{ClassScope, MethodScope, ScopeStack};

type Result<T> = std::result::Result<T, CompilationError>;

/// Unified compilation context.
#[derive(Debug)]
pub struct CompilationContext {
    registry: HostRegistry,
    types: TypeMapper,
    scopes: ScopeStack,
    options: CompileOptions,

    /// Class names in the order their definitions were entered.
    declared: Vec<String>,

    /// Finished classes by name.
    finished: FxHashMap<String, CompiledClass>,
}

impl CompilationContext {
    /// Create a context over `registry`.
    pub fn new(registry: HostRegistry, options: CompileOptions) -> Self {
        Self {
            registry,
            types: TypeMapper::new(),
            scopes: ScopeStack::new(),
            options,
            declared: Vec::new(),
            finished: FxHashMap::default(),
        }
    }

    // ==========================================================================
    // Accessors
    // ==========================================================================

    pub fn registry(&self) -> &HostRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut HostRegistry {
        &mut self.registry
    }

    pub fn types(&self) -> &TypeMapper {
        &self.types
    }

    pub fn types_mut(&mut self) -> &mut TypeMapper {
        &mut self.types
    }

    pub fn scopes(&self) -> &ScopeStack {
        &self.scopes
    }

    pub fn scopes_mut(&mut self) -> &mut ScopeStack {
        &mut self.scopes
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    // ==========================================================================
    // Type Mapping
    // ==========================================================================

    /// Map an AST type annotation to its machine type.
    pub fn map_type(&self, ty: &TypeRef<'_>, span: Span) -> Result<MachineType> {
        self.map_descriptor(&ty.descriptor(), span)
    }

    /// Map a descriptor to its machine type.
    pub fn map_descriptor(&self, descriptor: &TypeDescriptor, span: Span) -> Result<MachineType> {
        self.types.map(&self.registry, descriptor, span)
    }

    /// Alias `short` (and `alias`, if any) to the host class `full`.
    pub fn import(
        &mut self,
        short: &str,
        alias: Option<&str>,
        full: &str,
        span: Span,
    ) -> Result<MachineType> {
        let machine_type = match alias {
            Some(alias) => self
                .types
                .import_pair(&self.registry, short, alias, full, span)?,
            None => self.types.import(&self.registry, short, full, span)?,
        };
        tracing::debug!(short, alias, full, "import");
        Ok(machine_type)
    }

    // ==========================================================================
    // Scoped Emission
    // ==========================================================================

    /// Run `f` with `scope` as the current class.
    ///
    /// The class is popped whether or not `f` succeeds; it is only added to
    /// the output on success.
    pub fn in_class<T>(
        &mut self,
        scope: ClassScope,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.declared.push(scope.class.name.clone());
        self.scopes.enter_class(scope);

        let result = f(self);
        let scope = self.scopes.leave_class()?;
        let value = result?;

        tracing::debug!(
            class = %scope.class.name,
            methods = scope.methods.len(),
            "class emitted"
        );
        let class = CompiledClass {
            name: scope.class.name,
            superclass: scope.superclass.name,
            interfaces: scope.interfaces,
            methods: scope.methods,
        };
        self.finished.insert(class.name.clone(), class);
        Ok(value)
    }

    /// Run `f` with `scope` as the current method.
    ///
    /// `f` produces the method's code; the finished method is appended to the
    /// enclosing class. The method scope is popped on every exit path.
    pub fn in_method(
        &mut self,
        scope: MethodScope,
        f: impl FnOnce(&mut Self) -> Result<EmittedCode>,
    ) -> Result<()> {
        let handle = self.scopes.enter_method(scope);

        let result = f(self);
        let scope = self.scopes.leave_method(handle)?;
        let code = result?;

        let method = CompiledMethod {
            name: scope.name,
            flags: scope.flags,
            params: scope.params,
            return_type: scope.return_type,
            max_locals: scope.locals.max_locals(),
            max_stack: code.max_stack,
            instructions: code.instructions,
        };
        tracing::debug!(
            method = %method.name,
            instructions = method.instructions.len(),
            max_locals = method.max_locals,
            max_stack = method.max_stack,
            "method emitted"
        );

        let Some(class) = self.scopes.current_class_mut() else {
            return Err(CompilationError::internal(format!(
                "method '{}' emitted outside of any class",
                method.name
            )));
        };
        class.methods.push(method);
        Ok(())
    }

    /// Collect every finished class in declaration order.
    pub fn finish(mut self) -> Result<CompiledUnit> {
        if self.scopes.depth() != 0 {
            return Err(CompilationError::internal(format!(
                "{} scope(s) still open at end of unit",
                self.scopes.depth()
            )));
        }

        let mut classes = Vec::with_capacity(self.declared.len());
        for name in &self.declared {
            let Some(class) = self.finished.remove(name) else {
                return Err(CompilationError::internal(format!(
                    "class '{name}' was entered but never finished"
                )));
            };
            classes.push(class);
        }
        Ok(CompiledUnit { classes })
    }
}
