//! Registration Pass - declare every class and method before emission.
//!
//! Walks the whole tree once, collecting definitions and imports, then
//! installs them into the context so that emission can resolve calls to
//! members defined later in the source.
//!
//! ## Order
//!
//! ```text
//! 1. imports from CompileOptions
//! 2. type mappings for the script class and every user class
//! 3. import nodes
//! 4. class entries (superclass, interfaces)
//! 5. members: methods, constructors, implicit <init>(), main(String[])
//! ```
//!
//! Steps 2 and 4 are split so supertypes may be declared after their
//! subclasses.

use rustc_hash::FxHashSet;
use tern_ast::{ClassDef, ConstructorDef, Import, MethodDef, Node, Param, Script, TypeRef};
use tern_core::{
    CONSTRUCTOR_NAME, ClassRef, CompilationError, MachineType, MethodCandidate, MethodFlags, Span,
};
use tern_registry::ClassEntry;

use crate::context::CompilationContext;
use crate::definitions::{MAIN_METHOD, main_args};

type Result<T> = std::result::Result<T, CompilationError>;

/// Output of the registration pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationOutput {
    /// Number of classes registered, the script class included.
    pub classes_registered: usize,
    /// Number of methods and constructors registered.
    pub methods_registered: usize,
}

/// A method definition together with the class it lands in.
#[derive(Debug, Clone, Copy)]
struct PendingMethod<'ast> {
    owner: &'ast str,
    def: &'ast MethodDef<'ast>,
    is_static: bool,
}

/// Definitions found in one walk over the tree.
#[derive(Debug, Default)]
struct Declarations<'ast> {
    imports: Vec<&'ast Import<'ast>>,
    classes: Vec<&'ast ClassDef<'ast>>,
    methods: Vec<PendingMethod<'ast>>,
    constructors: Vec<(&'ast str, &'ast ConstructorDef<'ast>)>,
}

/// Enclosing class while walking.
#[derive(Debug, Clone, Copy)]
struct Owner<'ast> {
    name: &'ast str,
    is_static_body: bool,
}

impl<'ast> Declarations<'ast> {
    fn collect(&mut self, node: &Node<'ast>, owner: Owner<'ast>) {
        match node {
            Node::Script(_) => {}
            Node::Body(body) => {
                for node in body.nodes {
                    self.collect(node, owner);
                }
            }
            Node::ClassDef(def) => {
                self.classes.push(*def);
                let inner = Owner {
                    name: def.name,
                    is_static_body: false,
                };
                for member in def.members {
                    self.collect(member, inner);
                }
            }
            Node::MethodDef(def) => {
                self.methods.push(PendingMethod {
                    owner: owner.name,
                    def: *def,
                    is_static: def.is_static || owner.is_static_body,
                });
                self.collect(&def.body, owner);
            }
            Node::ConstructorDef(def) => {
                // Rejected during emission.
                if !owner.is_static_body {
                    self.constructors.push((owner.name, *def));
                }
                self.collect(&def.body, owner);
            }
            Node::Import(import) => self.imports.push(*import),
            Node::LocalAssign(assign) => self.collect(&assign.value, owner),
            Node::Call(call) => {
                self.collect(&call.receiver, owner);
                for arg in call.args {
                    self.collect(arg, owner);
                }
            }
            Node::FunctionalCall(call) => {
                for arg in call.args {
                    self.collect(arg, owner);
                }
            }
            Node::If(branch) => {
                self.collect(&branch.condition, owner);
                self.collect(&branch.then_body, owner);
                if let Some(else_body) = &branch.else_body {
                    self.collect(else_body, owner);
                }
            }
            Node::Loop(lp) => {
                self.collect(&lp.condition, owner);
                self.collect(&lp.body, owner);
            }
            Node::Literal(_)
            | Node::TypeName(_)
            | Node::SelfRef(_)
            | Node::Local(_)
            | Node::Noop(_) => {}
        }
    }
}

/// Declare every class and member of a script before any code is emitted.
pub struct RegistrationPass<'a> {
    ctx: &'a mut CompilationContext,
    classes_registered: usize,
    methods_registered: usize,
}

impl<'a> RegistrationPass<'a> {
    /// Create a new registration pass.
    pub fn new(ctx: &'a mut CompilationContext) -> Self {
        Self {
            ctx,
            classes_registered: 0,
            methods_registered: 0,
        }
    }

    /// Run the pass over `script`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run<'ast>(mut self, script: &'ast Script<'ast>) -> Result<RegistrationOutput> {
        for (short, full) in self.ctx.options().imports.clone() {
            self.ctx.import(&short, None, &full, Span::default())?;
        }

        let mut declarations = Declarations::default();
        declarations.collect(
            &script.body,
            Owner {
                name: script.name,
                is_static_body: true,
            },
        );

        let types = self.ctx.types_mut();
        types.register_class(script.name, MachineType::class(script.name));
        for def in &declarations.classes {
            types.register_class(def.name, MachineType::class(def.name));
        }

        for import in &declarations.imports {
            self.ctx
                .import(import.simple_name(), import.alias, import.full, import.span)?;
        }

        self.register_class(ClassEntry::class(script.name), script.span)?;
        for def in &declarations.classes {
            let entry = self.class_entry(def)?;
            self.register_class(entry, def.span)?;
        }

        self.register_members(script, &declarations)?;

        let output = RegistrationOutput {
            classes_registered: self.classes_registered,
            methods_registered: self.methods_registered,
        };
        tracing::debug!(
            script = script.name,
            classes = output.classes_registered,
            methods = output.methods_registered,
            "registration complete"
        );
        Ok(output)
    }

    // ==========================================================================
    // Classes
    // ==========================================================================

    fn class_entry(&self, def: &ClassDef<'_>) -> Result<ClassEntry> {
        let mut entry = ClassEntry::class(def.name);
        if let Some(superclass) = def.superclass {
            entry = entry.with_superclass(self.supertype(superclass, def.span)?);
        }
        for interface in def.interfaces {
            entry = entry.with_interface(self.supertype(interface, def.span)?);
        }
        Ok(entry)
    }

    fn supertype(&self, name: &str, span: Span) -> Result<String> {
        match self.ctx.map_type(&TypeRef::named(name), span)? {
            MachineType::Class(class) => Ok(class.name),
            other => Err(CompilationError::InvalidContext {
                message: format!("{other} cannot be used as a supertype"),
                span,
            }),
        }
    }

    fn register_class(&mut self, entry: ClassEntry, span: Span) -> Result<()> {
        self.ctx
            .registry_mut()
            .register_class(entry)
            .map_err(|err| CompilationError::registration(err, span))?;
        self.classes_registered += 1;
        Ok(())
    }

    // ==========================================================================
    // Members
    // ==========================================================================

    fn register_members(
        &mut self,
        script: &Script<'_>,
        declarations: &Declarations<'_>,
    ) -> Result<()> {
        self.add_member(
            MethodCandidate {
                owner: ClassRef::class(script.name),
                name: MAIN_METHOD.to_string(),
                params: vec![main_args()],
                return_type: MachineType::Void,
                flags: MethodFlags::STATIC,
            },
            script.span,
        )?;

        for pending in &declarations.methods {
            let def = pending.def;
            let candidate = MethodCandidate {
                owner: ClassRef::class(pending.owner),
                name: def.name.to_string(),
                params: self.param_types(def.params)?,
                return_type: self.ctx.map_type(&def.return_type, def.span)?,
                flags: if pending.is_static {
                    MethodFlags::STATIC
                } else {
                    MethodFlags::empty()
                },
            };
            self.add_member(candidate, def.span)?;
        }

        let mut with_constructor = FxHashSet::default();
        for (owner, def) in &declarations.constructors {
            with_constructor.insert(*owner);
            let candidate = constructor(owner, self.param_types(def.params)?);
            self.add_member(candidate, def.span)?;
        }

        self.add_member(constructor(script.name, vec![]), script.span)?;
        for def in &declarations.classes {
            if !with_constructor.contains(def.name) {
                self.add_member(constructor(def.name, vec![]), def.span)?;
            }
        }
        Ok(())
    }

    fn param_types(&self, params: &[Param<'_>]) -> Result<Vec<MachineType>> {
        params
            .iter()
            .map(|param| self.ctx.map_type(&param.ty, param.span))
            .collect()
    }

    fn add_member(&mut self, candidate: MethodCandidate, span: Span) -> Result<()> {
        self.ctx
            .registry_mut()
            .add_method(candidate)
            .map_err(|err| CompilationError::registration(err, span))?;
        self.methods_registered += 1;
        Ok(())
    }
}

fn constructor(owner: &str, params: Vec<MachineType>) -> MethodCandidate {
    MethodCandidate {
        owner: ClassRef::class(owner),
        name: CONSTRUCTOR_NAME.to_string(),
        params,
        return_type: MachineType::Void,
        flags: MethodFlags::CONSTRUCTOR,
    }
}
