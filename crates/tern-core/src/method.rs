//! Resolved method signatures.

use std::fmt;

use bitflags::bitflags;

use crate::{ClassRef, MachineType, TypeHash};

/// Name under which constructors are registered and resolved.
pub const CONSTRUCTOR_NAME: &str = "<init>";

bitflags! {
    /// Member traits that change how a call is emitted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MethodFlags: u8 {
        /// Static member (no receiver).
        const STATIC = 1 << 0;
        /// Declared on an interface (interface dispatch).
        const INTERFACE = 1 << 1;
        /// Instance initializer.
        const CONSTRUCTOR = 1 << 2;
    }
}

/// The single member selected for a call site.
///
/// Produced by the method resolver and consumed by the invocation emitter;
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodCandidate {
    /// Declaring class.
    pub owner: ClassRef,
    /// Member name (`<init>` for constructors).
    pub name: String,
    /// Parameter machine types, in order.
    pub params: Vec<MachineType>,
    /// Return machine type ([`MachineType::Void`] for no value).
    pub return_type: MachineType,
    /// Static / interface / constructor traits.
    pub flags: MethodFlags,
}

impl MethodCandidate {
    /// Whether the member is static.
    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodFlags::STATIC)
    }

    /// Whether the member is declared on an interface.
    pub fn is_interface(&self) -> bool {
        self.flags.contains(MethodFlags::INTERFACE)
    }

    /// Whether the member is a constructor.
    pub fn is_constructor(&self) -> bool {
        self.flags.contains(MethodFlags::CONSTRUCTOR)
    }

    /// Whether the member returns no value.
    pub fn returns_void(&self) -> bool {
        self.return_type.is_void()
    }

    /// Signature identity of the member.
    pub fn hash(&self) -> TypeHash {
        let params: Vec<TypeHash> = self.params.iter().map(MachineType::type_hash).collect();
        if self.is_constructor() {
            TypeHash::from_constructor(&self.owner.name, &params)
        } else {
            TypeHash::from_method(&self.owner.name, &self.name, &params)
        }
    }
}

impl fmt::Display for MethodCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.owner.name, self.name)?;
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}

/// Render argument types the way error messages list them.
pub fn format_arg_types(args: &[MachineType]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
