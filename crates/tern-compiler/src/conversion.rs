//! Implicit conversions between machine types.
//!
//! Used both for applicability during overload resolution and for coercing
//! emitted values to parameter, local and return types.
//!
//! ## Rules
//!
//! 1. Identity (same type; classes compare by name)
//! 2. `int -> long` widening (the only primitive conversion)
//! 3. Class or interface to any supertype reachable through the hierarchy
//! 4. Any reference (arrays included) to `java.lang.Object`

use tern_core::{MachineType, PrimitiveKind, classes};
use tern_registry::HostRegistry;

use crate::emit::BytecodeEmitter;

/// An implicit conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// No conversion needed.
    Identity,
    /// Narrow to wide integer (`I2L`).
    WidenIntToLong,
    /// Reference to one of its supertypes; no instruction.
    Reference,
}

impl Conversion {
    /// Emit the instructions performing the conversion on the top value.
    pub fn emit(self, emitter: &mut BytecodeEmitter) {
        match self {
            Conversion::Identity | Conversion::Reference => {}
            Conversion::WidenIntToLong => emitter.emit_widen(),
        }
    }
}

/// Find the implicit conversion from `from` to `to`, if any.
pub fn find_conversion(registry: &HostRegistry, from: &MachineType, to: &MachineType) -> Option<Conversion> {
    match (from, to) {
        (MachineType::Void, _) | (_, MachineType::Void) => None,

        (MachineType::Primitive(a), MachineType::Primitive(b)) if a == b => {
            Some(Conversion::Identity)
        }
        (MachineType::Primitive(PrimitiveKind::Int), MachineType::Primitive(PrimitiveKind::Long)) => {
            Some(Conversion::WidenIntToLong)
        }
        (MachineType::Primitive(_), _) | (_, MachineType::Primitive(_)) => None,

        (MachineType::Class(a), MachineType::Class(b)) => {
            if a.name == b.name {
                Some(Conversion::Identity)
            } else if b.name == classes::OBJECT || registry.is_subtype(&a.name, &b.name) {
                Some(Conversion::Reference)
            } else {
                None
            }
        }

        (MachineType::Array(a), MachineType::Array(b)) => (a == b).then_some(Conversion::Identity),
        (MachineType::Array(_), MachineType::Class(b)) => {
            (b.name == classes::OBJECT).then_some(Conversion::Reference)
        }
        (MachineType::Class(_), MachineType::Array(_)) => None,
    }
}

/// Whether a value of type `from` can be passed where `to` is expected.
pub fn is_assignable(registry: &HostRegistry, from: &MachineType, to: &MachineType) -> bool {
    find_conversion(registry, from, to).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tern_registry::{ARRAY_LIST, LIST};

    fn registry() -> HostRegistry {
        HostRegistry::with_standard_library()
    }

    #[test]
    fn identity() {
        let registry = registry();
        assert_eq!(
            find_conversion(&registry, &MachineType::INT, &MachineType::INT),
            Some(Conversion::Identity)
        );
        assert_eq!(
            find_conversion(&registry, &MachineType::string(), &MachineType::string()),
            Some(Conversion::Identity)
        );
    }

    #[test]
    fn int_widens_to_long_only() {
        let registry = registry();
        assert_eq!(
            find_conversion(&registry, &MachineType::INT, &MachineType::LONG),
            Some(Conversion::WidenIntToLong)
        );
        assert_eq!(find_conversion(&registry, &MachineType::LONG, &MachineType::INT), None);
        assert_eq!(find_conversion(&registry, &MachineType::BOOLEAN, &MachineType::INT), None);
        assert_eq!(find_conversion(&registry, &MachineType::INT, &MachineType::object()), None);
    }

    #[test]
    fn references_follow_hierarchy() {
        let registry = registry();
        let array_list = MachineType::class(ARRAY_LIST);
        let list = MachineType::interface(LIST);

        assert_eq!(
            find_conversion(&registry, &array_list, &list),
            Some(Conversion::Reference)
        );
        assert_eq!(find_conversion(&registry, &list, &array_list), None);
        assert!(is_assignable(&registry, &list, &MachineType::object()));
        assert!(!is_assignable(&registry, &MachineType::string(), &array_list));
    }

    #[test]
    fn arrays_convert_to_object_only() {
        let registry = registry();
        let strings = MachineType::array_of(MachineType::string());

        assert!(is_assignable(&registry, &strings, &MachineType::object()));
        assert!(is_assignable(&registry, &strings, &strings.clone()));
        assert!(!is_assignable(
            &registry,
            &strings,
            &MachineType::array_of(MachineType::object())
        ));
    }

    #[test]
    fn void_converts_to_nothing() {
        let registry = registry();
        assert!(!is_assignable(&registry, &MachineType::Void, &MachineType::Void));
        assert!(!is_assignable(&registry, &MachineType::Void, &MachineType::object()));
    }

    #[test]
    fn widening_emits_i2l() {
        let mut emitter = BytecodeEmitter::new(false);
        emitter.emit_int(3);
        Conversion::WidenIntToLong.emit(&mut emitter);
        Conversion::Reference.emit(&mut emitter);

        assert_eq!(emitter.top(), Some(tern_core::StackKind::Long));
        assert_eq!(emitter.instructions().len(), 2);
    }
}
