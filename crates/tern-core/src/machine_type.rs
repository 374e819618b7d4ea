//! Target machine representation of types.
//!
//! [`MachineType`] is what the emitter works with. Every piece of
//! width-dependent emission (arithmetic, locals, duplicates, discards,
//! returns) goes through [`StackKind`], a closed three-way category, so adding
//! a primitive kind forces every such site to be revisited.

use std::fmt;

use crate::TypeHash;

/// Well-known host class names.
pub mod classes {
    /// Root of the class hierarchy.
    pub const OBJECT: &str = "java.lang.Object";
    /// Built-in string class.
    pub const STRING: &str = "java.lang.String";
}

/// Primitive machine kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Boolean, held on the stack as a narrow integer.
    Boolean,
    /// Narrow (32-bit) integer.
    Int,
    /// Wide (64-bit) integer.
    Long,
}

impl PrimitiveKind {
    /// Whether arithmetic is defined on this kind.
    pub fn is_numeric(self) -> bool {
        match self {
            PrimitiveKind::Int | PrimitiveKind::Long => true,
            PrimitiveKind::Boolean => false,
        }
    }

    /// Stack category of values of this kind.
    pub fn stack_kind(self) -> StackKind {
        match self {
            PrimitiveKind::Boolean | PrimitiveKind::Int => StackKind::Int,
            PrimitiveKind::Long => StackKind::Long,
        }
    }

    /// Machine name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
        }
    }
}

/// Stack/local category of a value: narrow integer, wide integer or reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackKind {
    /// Narrow integer (also booleans).
    Int,
    /// Wide integer.
    Long,
    /// Object, interface or array reference.
    Reference,
}

impl StackKind {
    /// Number of local variable slots a value of this kind occupies.
    pub fn slot_width(self) -> u16 {
        match self {
            StackKind::Int | StackKind::Reference => 1,
            StackKind::Long => 2,
        }
    }
}

/// A named class or interface on the target machine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassRef {
    /// Fully qualified class name.
    pub name: String,
    /// Whether the class is an interface (selects interface dispatch).
    pub is_interface: bool,
}

impl ClassRef {
    /// A concrete class.
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_interface: false,
        }
    }

    /// An interface.
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_interface: true,
        }
    }
}

/// Machine representation of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MachineType {
    /// No value. Never pushed, never stored.
    Void,
    /// A primitive kind.
    Primitive(PrimitiveKind),
    /// A class or interface reference.
    Class(ClassRef),
    /// An array reference.
    Array(Box<MachineType>),
}

impl MachineType {
    /// `boolean`.
    pub const BOOLEAN: MachineType = MachineType::Primitive(PrimitiveKind::Boolean);
    /// `int`.
    pub const INT: MachineType = MachineType::Primitive(PrimitiveKind::Int);
    /// `long`.
    pub const LONG: MachineType = MachineType::Primitive(PrimitiveKind::Long);

    /// Reference to a concrete class.
    pub fn class(name: impl Into<String>) -> Self {
        MachineType::Class(ClassRef::class(name))
    }

    /// Reference to an interface.
    pub fn interface(name: impl Into<String>) -> Self {
        MachineType::Class(ClassRef::interface(name))
    }

    /// `java.lang.Object`.
    pub fn object() -> Self {
        Self::class(classes::OBJECT)
    }

    /// `java.lang.String`.
    pub fn string() -> Self {
        Self::class(classes::STRING)
    }

    /// Array of `element`.
    pub fn array_of(element: MachineType) -> Self {
        MachineType::Array(Box::new(element))
    }

    /// Whether this is a primitive kind.
    pub fn is_primitive(&self) -> bool {
        matches!(self, MachineType::Primitive(_))
    }

    /// Whether this is an interface reference.
    pub fn is_interface(&self) -> bool {
        matches!(self, MachineType::Class(class) if class.is_interface)
    }

    /// Whether this is the "no value" type.
    pub fn is_void(&self) -> bool {
        matches!(self, MachineType::Void)
    }

    /// The primitive kind, if primitive.
    pub fn primitive(&self) -> Option<PrimitiveKind> {
        match self {
            MachineType::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    /// The class reference, if this is a class or interface.
    pub fn class_ref(&self) -> Option<&ClassRef> {
        match self {
            MachineType::Class(class) => Some(class),
            _ => None,
        }
    }

    /// Stack category, or `None` for [`MachineType::Void`].
    pub fn stack_kind(&self) -> Option<StackKind> {
        match self {
            MachineType::Void => None,
            MachineType::Primitive(kind) => Some(kind.stack_kind()),
            MachineType::Class(_) | MachineType::Array(_) => Some(StackKind::Reference),
        }
    }

    /// Registry identity of this type.
    pub fn type_hash(&self) -> TypeHash {
        TypeHash::from_name(&self.to_string())
    }
}

impl fmt::Display for MachineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineType::Void => write!(f, "void"),
            MachineType::Primitive(kind) => write!(f, "{}", kind.name()),
            MachineType::Class(class) => write!(f, "{}", class.name),
            MachineType::Array(element) => write!(f, "{element}[]"),
        }
    }
}
