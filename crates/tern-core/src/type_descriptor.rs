//! Source-level type identity.
//!
//! A [`TypeDescriptor`] is what the type checker attaches to every AST node:
//! a base name plus two flags. It is only an identity; what the name means on
//! the target machine is decided by the type mapper.

use std::fmt;

/// Name carried by the `NoType` sentinel. Not a valid identifier, so no user
/// type can ever collide with it.
pub const NO_TYPE_NAME: &str = "<none>";

/// Source-level identity of a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
    /// Base type name as written in source or as qualified by an import.
    pub name: String,
    /// Whether this is an array of `name`.
    pub is_array: bool,
    /// Whether this refers to the type itself rather than an instance of it.
    pub is_meta: bool,
}

impl TypeDescriptor {
    /// Instance descriptor for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_array: false,
            is_meta: false,
        }
    }

    /// Array-of-`name` descriptor.
    pub fn array(name: impl Into<String>) -> Self {
        Self {
            is_array: true,
            ..Self::new(name)
        }
    }

    /// Meta descriptor for `name` (the type used as a receiver of static
    /// calls and `new`).
    pub fn meta_of(name: impl Into<String>) -> Self {
        Self {
            is_meta: true,
            ..Self::new(name)
        }
    }

    /// The `NoType` sentinel: a construct that produces no value.
    pub fn no_type() -> Self {
        Self::new(NO_TYPE_NAME)
    }

    /// Whether this is the `NoType` sentinel.
    pub fn is_no_type(&self) -> bool {
        self.name == NO_TYPE_NAME && !self.is_array && !self.is_meta
    }

    /// The meta descriptor of the same type.
    pub fn meta(&self) -> Self {
        Self {
            is_meta: true,
            ..self.clone()
        }
    }

    /// The instance descriptor of the same type.
    pub fn instance(&self) -> Self {
        Self {
            is_meta: false,
            ..self.clone()
        }
    }

    /// The element descriptor of an array descriptor.
    pub fn element(&self) -> Option<Self> {
        self.is_array.then(|| Self::new(self.name.clone()))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_no_type() {
            return write!(f, "<no type>");
        }
        if self.is_meta {
            write!(f, "meta ")?;
        }
        write!(f, "{}", self.name)?;
        if self.is_array {
            write!(f, "[]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_and_instance_are_distinct_keys() {
        let instance = TypeDescriptor::new("Point");
        let meta = instance.meta();
        assert_ne!(instance, meta);
        assert_eq!(meta.instance(), instance);
    }

    #[test]
    fn no_type_sentinel() {
        assert!(TypeDescriptor::no_type().is_no_type());
        assert!(!TypeDescriptor::new("int").is_no_type());
        assert!(!TypeDescriptor::no_type().meta().is_no_type());
    }

    #[test]
    fn array_element() {
        let array = TypeDescriptor::array("string");
        assert_eq!(array.element(), Some(TypeDescriptor::new("string")));
        assert_eq!(TypeDescriptor::new("string").element(), None);
    }

    #[test]
    fn display_forms() {
        assert_eq!(TypeDescriptor::array("int").to_string(), "int[]");
        assert_eq!(TypeDescriptor::meta_of("Point").to_string(), "meta Point");
        assert_eq!(TypeDescriptor::no_type().to_string(), "<no type>");
    }
}
