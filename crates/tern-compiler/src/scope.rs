//! Scope management for the emission walk.
//!
//! Two layers:
//! - [`ScopeStack`]: the active class / method / static-mode triple. Entering
//!   a nested class or method definition pushes a [`Frame`]; leaving pops it.
//!   Frames are strictly nested.
//! - [`LocalScope`]: local variable slots of the method being compiled.
//!   Slots are allocated by stack kind width (wide integers take two).

use rustc_hash::FxHashMap;
use tern_core::{ClassRef, CompilationError, MachineType, MethodFlags, Span, StackKind};

use crate::output::CompiledMethod;

// ============================================================================
// Locals
// ============================================================================

/// A named local slot.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVar {
    /// Variable name
    pub name: String,
    /// Machine type of the stored value
    pub machine_type: MachineType,
    /// Category used by loads and stores
    pub kind: StackKind,
    /// First slot index
    pub slot: u16,
}

/// Local variables of one method.
#[derive(Debug, Default)]
pub struct LocalScope {
    /// Variables by name
    variables: FxHashMap<String, LocalVar>,

    /// Next free slot
    next_slot: u16,

    /// Slots used (for `max_locals`)
    max_slot: u16,
}

impl LocalScope {
    /// Create an empty local scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve slot 0 for `this`.
    pub fn declare_this(&mut self, class: &ClassRef) -> Result<LocalVar, CompilationError> {
        if self.next_slot != 0 {
            return Err(CompilationError::internal(
                "`this` must be declared before any other local",
            ));
        }
        Ok(self.allocate("this", MachineType::Class(class.clone()), StackKind::Reference))
    }

    /// Declare a parameter in the next free slots.
    pub fn declare_param(
        &mut self,
        name: &str,
        machine_type: MachineType,
        span: Span,
    ) -> Result<LocalVar, CompilationError> {
        if self.variables.contains_key(name) {
            return Err(CompilationError::DuplicateDefinition {
                name: name.to_string(),
                span,
            });
        }
        let kind = Self::kind_of(&machine_type, name, span)?;
        Ok(self.allocate(name, machine_type, kind))
    }

    /// The slot a store to `name` writes.
    ///
    /// Reuses the existing slot when the kind matches; otherwise (first store
    /// or a store of a different width) allocates fresh slots.
    pub fn slot_for_store(
        &mut self,
        name: &str,
        machine_type: MachineType,
        span: Span,
    ) -> Result<LocalVar, CompilationError> {
        let kind = Self::kind_of(&machine_type, name, span)?;
        if let Some(existing) = self.variables.get_mut(name)
            && existing.kind == kind
        {
            existing.machine_type = machine_type;
            return Ok(existing.clone());
        }
        Ok(self.allocate(name, machine_type, kind))
    }

    fn kind_of(machine_type: &MachineType, name: &str, span: Span) -> Result<StackKind, CompilationError> {
        machine_type
            .stack_kind()
            .ok_or_else(|| CompilationError::InvalidContext {
                message: format!("variable '{name}' cannot hold a value of no type"),
                span,
            })
    }

    fn allocate(&mut self, name: &str, machine_type: MachineType, kind: StackKind) -> LocalVar {
        let var = LocalVar {
            name: name.to_string(),
            machine_type,
            kind,
            slot: self.next_slot,
        };
        self.next_slot += kind.slot_width();
        self.max_slot = self.max_slot.max(self.next_slot);
        self.variables.insert(name.to_string(), var.clone());
        var
    }

    /// Look up a variable by name.
    pub fn get(&self, name: &str) -> Option<&LocalVar> {
        self.variables.get(name)
    }

    /// Slots used so far.
    pub fn max_locals(&self) -> u16 {
        self.max_slot
    }
}

// ============================================================================
// Scope Stack
// ============================================================================

/// A class being emitted.
#[derive(Debug)]
pub struct ClassScope {
    pub class: ClassRef,
    pub superclass: ClassRef,
    pub interfaces: Vec<String>,
    /// Methods defined directly in the body are static (script classes).
    pub is_static_body: bool,
    /// Methods finished so far.
    pub methods: Vec<CompiledMethod>,
}

impl ClassScope {
    /// Scope for `class` extending `superclass`.
    pub fn new(class: ClassRef, superclass: ClassRef, is_static_body: bool) -> Self {
        Self {
            class,
            superclass,
            interfaces: Vec::new(),
            is_static_body,
            methods: Vec::new(),
        }
    }
}

/// A method being emitted.
#[derive(Debug)]
pub struct MethodScope {
    pub name: String,
    pub params: Vec<MachineType>,
    pub return_type: MachineType,
    pub flags: MethodFlags,
    pub locals: LocalScope,
}

impl MethodScope {
    /// Scope for a method with no locals declared yet.
    pub fn new(
        name: impl Into<String>,
        params: Vec<MachineType>,
        return_type: MachineType,
        flags: MethodFlags,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
            flags,
            locals: LocalScope::new(),
        }
    }

    /// Whether the method has no `this`.
    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodFlags::STATIC)
    }
}

/// One entry of the scope stack.
#[derive(Debug)]
pub enum Frame {
    Class(ClassScope),
    Method(MethodScope),
}

/// Proof of a method entry, consumed when leaving it.
#[derive(Debug)]
#[must_use = "a method scope must be left with its handle"]
pub struct MethodHandle {
    depth: usize,
}

/// Stack of active class and method scopes.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    /// Create an empty scope stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a class definition.
    pub fn enter_class(&mut self, scope: ClassScope) {
        tracing::debug!(class = %scope.class.name, static_body = scope.is_static_body, "enter class");
        self.frames.push(Frame::Class(scope));
    }

    /// Leave the innermost class definition.
    pub fn leave_class(&mut self) -> Result<ClassScope, CompilationError> {
        match self.frames.pop() {
            Some(Frame::Class(scope)) => {
                tracing::debug!(class = %scope.class.name, "leave class");
                Ok(scope)
            }
            Some(frame) => {
                self.frames.push(frame);
                Err(CompilationError::internal(
                    "left a class while a method was still open",
                ))
            }
            None => Err(CompilationError::internal("left a class that was never entered")),
        }
    }

    /// Enter a method definition.
    pub fn enter_method(&mut self, scope: MethodScope) -> MethodHandle {
        tracing::debug!(method = %scope.name, is_static = scope.is_static(), "enter method");
        self.frames.push(Frame::Method(scope));
        MethodHandle {
            depth: self.frames.len(),
        }
    }

    /// Leave the method entered with `handle`.
    pub fn leave_method(&mut self, handle: MethodHandle) -> Result<MethodScope, CompilationError> {
        if self.frames.len() != handle.depth {
            return Err(CompilationError::internal(format!(
                "method scopes left out of order (depth {} for a handle of depth {})",
                self.frames.len(),
                handle.depth
            )));
        }
        match self.frames.pop() {
            Some(Frame::Method(scope)) => {
                tracing::debug!(method = %scope.name, "leave method");
                Ok(scope)
            }
            Some(frame) => {
                self.frames.push(frame);
                Err(CompilationError::internal("left a method while a class was open"))
            }
            None => Err(CompilationError::internal("left a method that was never entered")),
        }
    }

    /// Number of open frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The innermost class.
    pub fn current_class(&self) -> Option<&ClassScope> {
        self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Class(scope) => Some(scope),
            Frame::Method(_) => None,
        })
    }

    /// The innermost class, mutably.
    pub fn current_class_mut(&mut self) -> Option<&mut ClassScope> {
        self.frames.iter_mut().rev().find_map(|frame| match frame {
            Frame::Class(scope) => Some(scope),
            Frame::Method(_) => None,
        })
    }

    /// The method being emitted, if the innermost frame is a method.
    pub fn current_method(&self) -> Option<&MethodScope> {
        match self.frames.last() {
            Some(Frame::Method(scope)) => Some(scope),
            _ => None,
        }
    }

    /// The method being emitted, mutably.
    pub fn current_method_mut(&mut self) -> Option<&mut MethodScope> {
        match self.frames.last_mut() {
            Some(Frame::Method(scope)) => Some(scope),
            _ => None,
        }
    }

    /// Static mode of the innermost frame.
    pub fn is_static(&self) -> bool {
        match self.frames.last() {
            Some(Frame::Method(scope)) => scope.is_static(),
            Some(Frame::Class(scope)) => scope.is_static_body,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // LocalScope
    // =========================================================================

    #[test]
    fn this_takes_slot_zero() {
        let mut locals = LocalScope::new();
        let this = locals.declare_this(&ClassRef::class("Point")).unwrap();
        let x = locals
            .declare_param("x", MachineType::INT, Span::default())
            .unwrap();

        assert_eq!(this.slot, 0);
        assert_eq!(x.slot, 1);
        assert_eq!(locals.max_locals(), 2);
    }

    #[test]
    fn this_after_locals_is_rejected() {
        let mut locals = LocalScope::new();
        locals
            .declare_param("x", MachineType::INT, Span::default())
            .unwrap();

        assert!(locals.declare_this(&ClassRef::class("Point")).is_err());
    }

    #[test]
    fn wide_values_take_two_slots() {
        let mut locals = LocalScope::new();
        let a = locals
            .declare_param("a", MachineType::LONG, Span::default())
            .unwrap();
        let b = locals
            .declare_param("b", MachineType::string(), Span::default())
            .unwrap();

        assert_eq!(a.slot, 0);
        assert_eq!(a.kind, StackKind::Long);
        assert_eq!(b.slot, 2);
        assert_eq!(locals.max_locals(), 3);
    }

    #[test]
    fn stores_reuse_matching_slot() {
        let mut locals = LocalScope::new();
        let first = locals
            .slot_for_store("i", MachineType::INT, Span::default())
            .unwrap();
        let again = locals
            .slot_for_store("i", MachineType::BOOLEAN, Span::default())
            .unwrap();

        assert_eq!(first.slot, again.slot);
        assert_eq!(locals.max_locals(), 1);
    }

    #[test]
    fn store_of_other_width_rebinds() {
        let mut locals = LocalScope::new();
        locals
            .slot_for_store("v", MachineType::INT, Span::default())
            .unwrap();
        let wide = locals
            .slot_for_store("v", MachineType::LONG, Span::default())
            .unwrap();

        assert_eq!(wide.slot, 1);
        assert_eq!(locals.get("v").map(|v| v.kind), Some(StackKind::Long));
        assert_eq!(locals.max_locals(), 3);
    }

    #[test]
    fn void_local_is_rejected() {
        let mut locals = LocalScope::new();
        let result = locals.slot_for_store("v", MachineType::Void, Span::point(2, 1));

        assert!(matches!(result, Err(CompilationError::InvalidContext { .. })));
    }

    #[test]
    fn duplicate_param_is_rejected() {
        let mut locals = LocalScope::new();
        locals
            .declare_param("x", MachineType::INT, Span::default())
            .unwrap();

        assert!(matches!(
            locals.declare_param("x", MachineType::INT, Span::default()),
            Err(CompilationError::DuplicateDefinition { .. })
        ));
    }

    // =========================================================================
    // ScopeStack
    // =========================================================================

    fn class_scope(name: &str, is_static_body: bool) -> ClassScope {
        ClassScope::new(
            ClassRef::class(name),
            ClassRef::class(tern_core::classes::OBJECT),
            is_static_body,
        )
    }

    #[test]
    fn nested_frames_restore_in_order() {
        let mut scopes = ScopeStack::new();
        scopes.enter_class(class_scope("Script", true));
        let main = scopes.enter_method(MethodScope::new(
            "main",
            vec![],
            MachineType::Void,
            MethodFlags::STATIC,
        ));
        assert!(scopes.is_static());

        scopes.enter_class(class_scope("Point", false));
        assert!(!scopes.is_static());
        assert_eq!(scopes.current_class().map(|c| c.class.name.as_str()), Some("Point"));
        assert!(scopes.current_method().is_none());
        scopes.leave_class().unwrap();

        assert_eq!(scopes.current_class().map(|c| c.class.name.as_str()), Some("Script"));
        assert_eq!(scopes.current_method().map(|m| m.name.as_str()), Some("main"));
        scopes.leave_method(main).unwrap();
        scopes.leave_class().unwrap();
        assert_eq!(scopes.depth(), 0);
    }

    #[test]
    fn leaving_out_of_order_is_internal_error() {
        let mut scopes = ScopeStack::new();
        scopes.enter_class(class_scope("Script", true));
        let outer = scopes.enter_method(MethodScope::new(
            "outer",
            vec![],
            MachineType::Void,
            MethodFlags::STATIC,
        ));
        let _inner = scopes.enter_method(MethodScope::new(
            "inner",
            vec![],
            MachineType::Void,
            MethodFlags::empty(),
        ));

        assert!(scopes.leave_method(outer).is_err());
        assert_eq!(scopes.depth(), 3);
    }

    #[test]
    fn leaving_class_with_open_method_is_internal_error() {
        let mut scopes = ScopeStack::new();
        scopes.enter_class(class_scope("Script", true));
        let _main = scopes.enter_method(MethodScope::new(
            "main",
            vec![],
            MachineType::Void,
            MethodFlags::STATIC,
        ));

        assert!(scopes.leave_class().is_err());
        assert_eq!(scopes.depth(), 2);
    }
}
