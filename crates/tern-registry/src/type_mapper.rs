//! Type Mapping Table: source descriptors to machine types.
//!
//! Seeded with the built-in names at construction; extended by imports and by
//! class definitions. Descriptors that were never registered fall back to a
//! lookup of their name in the [`HostRegistry`], so fully qualified host
//! classes work without an import.

use rustc_hash::FxHashMap;

use tern_core::{CompilationError, MachineType, Span, TypeDescriptor};

use crate::HostRegistry;

/// Mapping from [`TypeDescriptor`] to [`MachineType`].
#[derive(Debug, Clone)]
pub struct TypeMapper {
    table: FxHashMap<TypeDescriptor, MachineType>,
}

impl Default for TypeMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeMapper {
    /// Create a mapper seeded with the built-in types.
    pub fn new() -> Self {
        let mut mapper = Self {
            table: FxHashMap::default(),
        };
        mapper.register(TypeDescriptor::no_type(), MachineType::Void);
        mapper.register(TypeDescriptor::new("void"), MachineType::Void);
        mapper.register(TypeDescriptor::new("boolean"), MachineType::BOOLEAN);
        mapper.register(TypeDescriptor::new("int"), MachineType::INT);
        mapper.register(TypeDescriptor::new("long"), MachineType::LONG);
        mapper.register_class("string", MachineType::string());
        mapper.register_class("String", MachineType::string());
        mapper.register_class("Object", MachineType::object());
        mapper
    }

    /// Install or override a mapping.
    pub fn register(&mut self, descriptor: TypeDescriptor, machine_type: MachineType) {
        tracing::trace!(descriptor = %descriptor, machine_type = %machine_type, "type mapping");
        self.table.insert(descriptor, machine_type);
    }

    /// Register `name` both as an instance type and as a meta type.
    pub fn register_class(&mut self, name: &str, machine_type: MachineType) {
        let descriptor = TypeDescriptor::new(name);
        self.register(descriptor.meta(), machine_type.clone());
        self.register(descriptor, machine_type);
    }

    /// Alias `short` to the host class `full`.
    ///
    /// Fails with `UnknownType` when `full` is not a registered host class.
    pub fn import(
        &mut self,
        host: &HostRegistry,
        short: &str,
        full: &str,
        span: Span,
    ) -> Result<MachineType, CompilationError> {
        let Some(class) = host.class_ref(full) else {
            return Err(CompilationError::UnknownType {
                name: full.to_string(),
                span,
            });
        };
        let machine_type = MachineType::Class(class);
        self.register_class(short, machine_type.clone());
        Ok(machine_type)
    }

    /// Alias two source names to the host class `full` at once.
    pub fn import_pair(
        &mut self,
        host: &HostRegistry,
        first: &str,
        second: &str,
        full: &str,
        span: Span,
    ) -> Result<MachineType, CompilationError> {
        let machine_type = self.import(host, first, full, span)?;
        self.register_class(second, machine_type.clone());
        Ok(machine_type)
    }

    /// Whether `descriptor` has an explicit mapping.
    pub fn contains(&self, descriptor: &TypeDescriptor) -> bool {
        self.table.contains_key(descriptor)
    }

    /// Map a descriptor to its machine type.
    ///
    /// Resolution order: explicit mapping, then (for arrays) the element
    /// mapping, then (for meta descriptors) the instance mapping, then the
    /// descriptor name as a host class name.
    pub fn map(
        &self,
        host: &HostRegistry,
        descriptor: &TypeDescriptor,
        span: Span,
    ) -> Result<MachineType, CompilationError> {
        if let Some(machine_type) = self.table.get(descriptor) {
            return Ok(machine_type.clone());
        }
        if let Some(element) = descriptor.element() {
            let element = self.map(host, &element, span)?;
            return Ok(MachineType::array_of(element));
        }
        if descriptor.is_meta {
            return self.map(host, &descriptor.instance(), span);
        }
        host.class_ref(&descriptor.name)
            .map(MachineType::Class)
            .ok_or_else(|| CompilationError::UnknownType {
                name: descriptor.to_string(),
                span,
            })
    }
}
