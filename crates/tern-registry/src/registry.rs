//! HostRegistry - the host type universe.
//!
//! Stores every class and interface the backend can name: the seeded host
//! standard library plus the user classes registered before emission.
//!
//! # Storage Model
//!
//! - **Classes**: [`ClassEntry`] values keyed by fully qualified name.
//! - **Hierarchy**: a `petgraph::DiGraph` with one node per class name and an
//!   edge from every class to each direct supertype. Supertypes may be named
//!   before they are registered; their node exists as soon as it is referenced.
//! - **Members**: [`MethodCandidate`]s stored on their declaring class, with a
//!   per-registry set of signature hashes for duplicate detection.
//!
//! # Example
//!
//! ```
//! use tern_core::classes;
//! use tern_registry::HostRegistry;
//!
//! let registry = HostRegistry::with_standard_library();
//! assert!(registry.is_subtype(classes::STRING, classes::OBJECT));
//! assert!(registry.class_ref("java.util.List").is_some_and(|c| c.is_interface));
//! ```

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use rustc_hash::{FxHashMap, FxHashSet};

use tern_core::{
    CONSTRUCTOR_NAME, ClassRef, MachineType, MethodCandidate, RegistrationError, TypeHash, classes,
};

/// A class or interface known to the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassEntry {
    /// Name and dispatch kind.
    pub class: ClassRef,
    /// Direct superclass (`None` only for the root class and interfaces).
    pub superclass: Option<String>,
    /// Directly implemented (or extended, for interfaces) interfaces.
    pub interfaces: Vec<String>,
    /// Declared methods and constructors.
    pub members: Vec<MethodCandidate>,
}

impl ClassEntry {
    /// A concrete class extending `java.lang.Object`.
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            class: ClassRef::class(name),
            superclass: Some(classes::OBJECT.to_string()),
            interfaces: Vec::new(),
            members: Vec::new(),
        }
    }

    /// An interface.
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            class: ClassRef::interface(name),
            superclass: None,
            interfaces: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Replace the superclass.
    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Add a directly implemented interface.
    pub fn with_interface(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    /// Class name.
    pub fn name(&self) -> &str {
        &self.class.name
    }

    /// Whether this entry is an interface.
    pub fn is_interface(&self) -> bool {
        self.class.is_interface
    }

    /// Machine type of instances of this class.
    pub fn machine_type(&self) -> MachineType {
        MachineType::Class(self.class.clone())
    }
}

/// The host type universe.
///
/// Not thread-safe; populated once per compilation unit and then only read.
#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
    /// Classes by fully qualified name.
    classes: FxHashMap<String, ClassEntry>,

    /// Hierarchy: edge from each class to its direct supertypes.
    graph: DiGraph<String, ()>,

    /// Name -> graph node.
    nodes: FxHashMap<String, NodeIndex>,

    /// Signature hashes of every registered member.
    signatures: FxHashSet<TypeHash>,
}

impl HostRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry seeded with the host standard library.
    pub fn with_standard_library() -> Self {
        let mut registry = Self::new();
        crate::stdlib::register_standard_library(&mut registry);
        registry
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a class or interface together with any members it already
    /// carries.
    ///
    /// Fails on duplicate class names, on duplicate member signatures and when
    /// a supertype edge would close a cycle. On failure nothing is registered.
    pub fn register_class(&mut self, entry: ClassEntry) -> Result<(), RegistrationError> {
        let name = entry.name().to_string();
        if self.classes.contains_key(&name) {
            return Err(RegistrationError::DuplicateClass { name });
        }

        let supertypes: Vec<&String> = entry.superclass.iter().chain(&entry.interfaces).collect();

        for supertype in &supertypes {
            if **supertype == name || self.reaches(supertype.as_str(), &name) {
                return Err(RegistrationError::CircularInheritance { name });
            }
        }

        let mut seen = FxHashSet::default();
        for member in &entry.members {
            let hash = member.hash();
            if self.signatures.contains(&hash) || !seen.insert(hash) {
                return Err(RegistrationError::DuplicateMember {
                    signature: member.to_string(),
                });
            }
        }

        let node = self.node(&name);
        for supertype in supertypes {
            let target = self.node(supertype);
            self.graph.add_edge(node, target, ());
        }
        self.signatures.extend(seen);

        tracing::debug!(
            class = %name,
            interface = entry.is_interface(),
            members = entry.members.len(),
            "registered class"
        );
        self.classes.insert(name, entry);
        Ok(())
    }

    /// Add a member to an already registered class.
    pub fn add_method(&mut self, member: MethodCandidate) -> Result<(), RegistrationError> {
        let owner = member.owner.name.clone();
        let Some(entry) = self.classes.get_mut(&owner) else {
            return Err(RegistrationError::UnknownOwner { name: owner });
        };

        if !self.signatures.insert(member.hash()) {
            return Err(RegistrationError::DuplicateMember {
                signature: member.to_string(),
            });
        }

        tracing::debug!(member = %member, "registered member");
        entry.members.push(member);
        Ok(())
    }

    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&index) = self.nodes.get(name) {
            return index;
        }
        let index = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), index);
        index
    }

    fn reaches(&self, from: &str, to: &str) -> bool {
        match (self.nodes.get(from), self.nodes.get(to)) {
            (Some(&from), Some(&to)) => has_path_connecting(&self.graph, from, to, None),
            _ => false,
        }
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Get a class by fully qualified name.
    pub fn get_class(&self, name: &str) -> Option<&ClassEntry> {
        self.classes.get(name)
    }

    /// Check if a class is registered.
    pub fn contains_class(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// The class reference (with its interface flag) for a registered name.
    pub fn class_ref(&self, name: &str) -> Option<ClassRef> {
        self.classes.get(name).map(|entry| entry.class.clone())
    }

    /// Number of registered classes.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    /// Whether `sub` is `sup` or reaches it through the hierarchy.
    pub fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        sub == sup || self.reaches(sub, sup)
    }

    /// `name` followed by all of its supertypes, nearest first.
    ///
    /// `java.lang.Object` is always last, also for interfaces.
    pub fn linearize(&self, name: &str) -> Vec<&str> {
        let mut order = Vec::new();
        if let Some(&start) = self.nodes.get(name) {
            let mut bfs = Bfs::new(&self.graph, start);
            while let Some(index) = bfs.next(&self.graph) {
                let class = self.graph[index].as_str();
                if class != classes::OBJECT {
                    order.push(class);
                }
            }
        }
        order.push(classes::OBJECT);
        order
    }

    /// Members named `name` visible on `class`.
    ///
    /// Constructors (`<init>`) are only looked up on `class` itself. Other
    /// members are collected from `class` and its supertypes with matching
    /// static-ness; for identical parameter lists the most derived
    /// declaration wins.
    pub fn members(&self, class: &str, name: &str, is_static: bool) -> Vec<&MethodCandidate> {
        if name == CONSTRUCTOR_NAME {
            return self
                .classes
                .get(class)
                .map(|entry| {
                    entry
                        .members
                        .iter()
                        .filter(|m| m.is_constructor())
                        .collect()
                })
                .unwrap_or_default();
        }

        let mut found: Vec<&MethodCandidate> = Vec::new();
        for owner in self.linearize(class) {
            let Some(entry) = self.classes.get(owner) else {
                continue;
            };
            for member in &entry.members {
                if member.name != name || member.is_constructor() || member.is_static() != is_static
                {
                    continue;
                }
                if found.iter().any(|existing| existing.params == member.params) {
                    continue;
                }
                found.push(member);
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_core::MethodFlags;

    fn method(owner: &ClassRef, name: &str, params: Vec<MachineType>, ret: MachineType) -> MethodCandidate {
        MethodCandidate {
            owner: owner.clone(),
            name: name.to_string(),
            params,
            return_type: ret,
            flags: MethodFlags::empty(),
        }
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = HostRegistry::new();
        registry.register_class(ClassEntry::class("Point")).unwrap();

        assert!(registry.contains_class("Point"));
        assert_eq!(registry.class_ref("Point"), Some(ClassRef::class("Point")));
        assert_eq!(registry.class_count(), 1);
    }

    #[test]
    fn duplicate_class_error() {
        let mut registry = HostRegistry::new();
        registry.register_class(ClassEntry::class("Point")).unwrap();
        let result = registry.register_class(ClassEntry::class("Point"));

        assert_eq!(
            result,
            Err(RegistrationError::DuplicateClass {
                name: "Point".to_string()
            })
        );
    }

    #[test]
    fn subtype_through_forward_reference() {
        let mut registry = HostRegistry::new();
        registry
            .register_class(ClassEntry::class("B").with_superclass("A"))
            .unwrap();
        registry.register_class(ClassEntry::class("A")).unwrap();

        assert!(registry.is_subtype("B", "A"));
        assert!(registry.is_subtype("B", classes::OBJECT));
        assert!(!registry.is_subtype("A", "B"));
    }

    #[test]
    fn circular_inheritance_rejected() {
        let mut registry = HostRegistry::new();
        registry
            .register_class(ClassEntry::class("A").with_superclass("B"))
            .unwrap();
        let result = registry.register_class(ClassEntry::class("B").with_superclass("A"));

        assert!(matches!(
            result,
            Err(RegistrationError::CircularInheritance { .. })
        ));
        assert!(!registry.contains_class("B"));
    }

    #[test]
    fn add_method_requires_owner() {
        let mut registry = HostRegistry::new();
        let owner = ClassRef::class("Missing");
        let result = registry.add_method(method(&owner, "m", vec![], MachineType::Void));

        assert!(matches!(result, Err(RegistrationError::UnknownOwner { .. })));
    }

    #[test]
    fn duplicate_member_rejected() {
        let mut registry = HostRegistry::new();
        registry.register_class(ClassEntry::class("Point")).unwrap();
        let owner = ClassRef::class("Point");

        registry
            .add_method(method(&owner, "m", vec![MachineType::INT], MachineType::Void))
            .unwrap();
        let result =
            registry.add_method(method(&owner, "m", vec![MachineType::INT], MachineType::LONG));

        assert!(matches!(result, Err(RegistrationError::DuplicateMember { .. })));
    }

    #[test]
    fn derived_declaration_hides_base() {
        let mut registry = HostRegistry::new();
        let base = ClassRef::class("Base");
        let derived = ClassRef::class("Derived");
        registry.register_class(ClassEntry::class("Base")).unwrap();
        registry
            .register_class(ClassEntry::class("Derived").with_superclass("Base"))
            .unwrap();
        registry
            .add_method(method(&base, "m", vec![], MachineType::INT))
            .unwrap();
        registry
            .add_method(method(&base, "m", vec![MachineType::INT], MachineType::INT))
            .unwrap();
        registry
            .add_method(method(&derived, "m", vec![], MachineType::INT))
            .unwrap();

        let found = registry.members("Derived", "m", false);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].owner, derived);
        assert_eq!(found[1].owner, base);
    }

    #[test]
    fn constructors_are_not_inherited() {
        let mut registry = HostRegistry::with_standard_library();
        registry
            .register_class(ClassEntry::class("Point"))
            .unwrap();

        assert!(registry.members("Point", CONSTRUCTOR_NAME, false).is_empty());
        assert!(!registry
            .members(classes::OBJECT, CONSTRUCTOR_NAME, false)
            .is_empty());
    }

    #[test]
    fn interfaces_linearize_to_object() {
        let registry = HostRegistry::with_standard_library();
        let order = registry.linearize("java.util.ArrayList");

        assert_eq!(order.first(), Some(&"java.util.ArrayList"));
        assert!(order.contains(&"java.util.List"));
        assert_eq!(order.last(), Some(&classes::OBJECT));
        assert_eq!(registry.linearize("java.lang.Runnable").last(), Some(&classes::OBJECT));
    }

    #[test]
    fn static_members_are_separate() {
        let registry = HostRegistry::with_standard_library();

        assert!(!registry.members("java.lang.Math", "max", true).is_empty());
        assert!(registry.members("java.lang.Math", "max", false).is_empty());
    }
}
