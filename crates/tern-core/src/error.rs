//! Error types for registration and code generation.
//!
//! ```text
//! CompilationError   - anything that stops a compilation unit
//! └── Registration   - host registry rejected a class or member
//! ```
//!
//! Every failure is fail-fast: the first error aborts the whole unit and no
//! partial output is produced. User-facing variants carry the [`Span`] of the
//! node that triggered them.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while populating the host registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// A class with this name is already registered.
    #[error("duplicate class '{name}'")]
    DuplicateClass {
        /// The class name.
        name: String,
    },

    /// A member with the same name and parameter types already exists.
    #[error("duplicate member '{signature}'")]
    DuplicateMember {
        /// Rendered signature of the member.
        signature: String,
    },

    /// A member was added to a class that is not registered.
    #[error("unknown owner class '{name}'")]
    UnknownOwner {
        /// The owner class name.
        name: String,
    },

    /// A class names itself as one of its supertypes, directly or not.
    #[error("circular inheritance for '{name}'")]
    CircularInheritance {
        /// The class involved in the cycle.
        name: String,
    },
}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Errors that abort code generation for a compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationError {
    /// A type descriptor has no machine mapping and no resolvable name.
    #[error("at {span}: unknown type '{name}'")]
    UnknownType {
        /// The unresolvable type.
        name: String,
        /// Where the type was referenced.
        span: Span,
    },

    /// No member matches the call.
    #[error("at {span}: no applicable method {owner}.{name}({args})")]
    NoApplicableMethod {
        /// Receiver class.
        owner: String,
        /// Member name.
        name: String,
        /// Argument machine types at the call site.
        args: String,
        /// Where the call occurred.
        span: Span,
    },

    /// Several members match the call and none is strictly more specific.
    #[error("at {span}: ambiguous call {owner}.{name}({args}): could be {candidates}")]
    AmbiguousCall {
        /// Receiver class.
        owner: String,
        /// Member name.
        name: String,
        /// Argument machine types at the call site.
        args: String,
        /// The equally specific candidates.
        candidates: String,
        /// Where the call occurred.
        span: Span,
    },

    /// An arithmetic call names an operator not defined for the primitive pair.
    #[error("at {span}: operator '{operator}' is not supported on {receiver}")]
    UnsupportedOperator {
        /// The operator name.
        operator: String,
        /// The receiver's machine type (and argument, if relevant).
        receiver: String,
        /// Where the call occurred.
        span: Span,
    },

    /// A branch or loop predicate shape that cannot be lowered.
    #[error("at {span}: unsupported predicate: {message}")]
    UnsupportedPredicate {
        /// What was wrong with the predicate.
        message: String,
        /// Where the predicate occurred.
        span: Span,
    },

    /// A member call attempted against a primitive receiver.
    #[error("at {span}: cannot invoke '{name}' on primitive {receiver}")]
    PrimitiveReceiverInvocation {
        /// Member name.
        name: String,
        /// The primitive machine type.
        receiver: String,
        /// Where the call occurred.
        span: Span,
    },

    /// A local variable was read before anything was stored in it.
    #[error("at {span}: unknown variable '{name}'")]
    UnknownVariable {
        /// The variable name.
        name: String,
        /// Where it was referenced.
        span: Span,
    },

    /// A construct used somewhere it has no meaning (e.g. `self` in a static
    /// method, a statement directly in a class body).
    #[error("at {span}: {message}")]
    InvalidContext {
        /// Description of the misuse.
        message: String,
        /// Where it occurred.
        span: Span,
    },

    /// A class or member defined twice.
    #[error("at {span}: duplicate definition '{name}'")]
    DuplicateDefinition {
        /// The duplicated name or signature.
        name: String,
        /// Where the second definition occurred.
        span: Span,
    },

    /// Host registry failure while registering definitions.
    #[error("at {span}: {source}")]
    Registration {
        /// The registry error.
        source: RegistrationError,
        /// Where the offending definition occurred.
        span: Span,
    },

    /// A backend invariant was broken (unbound label, unbalanced scopes).
    #[error("internal compiler error: {message}")]
    Internal {
        /// Description of the broken invariant.
        message: String,
    },
}

impl CompilationError {
    /// Source location of the error, if it has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            CompilationError::UnknownType { span, .. }
            | CompilationError::NoApplicableMethod { span, .. }
            | CompilationError::AmbiguousCall { span, .. }
            | CompilationError::UnsupportedOperator { span, .. }
            | CompilationError::UnsupportedPredicate { span, .. }
            | CompilationError::PrimitiveReceiverInvocation { span, .. }
            | CompilationError::UnknownVariable { span, .. }
            | CompilationError::InvalidContext { span, .. }
            | CompilationError::DuplicateDefinition { span, .. }
            | CompilationError::Registration { span, .. } => Some(*span),
            CompilationError::Internal { .. } => None,
        }
    }

    /// Shorthand for [`CompilationError::Internal`].
    pub fn internal(message: impl Into<String>) -> Self {
        CompilationError::Internal {
            message: message.into(),
        }
    }

    /// Attach a span to a registry error.
    pub fn registration(source: RegistrationError, span: Span) -> Self {
        match source {
            RegistrationError::DuplicateClass { name } => {
                CompilationError::DuplicateDefinition { name, span }
            }
            RegistrationError::DuplicateMember { signature } => {
                CompilationError::DuplicateDefinition {
                    name: signature,
                    span,
                }
            }
            other => CompilationError::Registration {
                source: other,
                span,
            },
        }
    }
}

impl From<RegistrationError> for CompilationError {
    fn from(source: RegistrationError) -> Self {
        CompilationError::registration(source, Span::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_span() {
        let err = CompilationError::UnknownType {
            name: "Frob".to_string(),
            span: Span::new(2, 5, 4),
        };
        assert_eq!(err.to_string(), "at 2:5: unknown type 'Frob'");
        assert_eq!(err.span(), Some(Span::new(2, 5, 4)));
    }

    #[test]
    fn internal_has_no_span() {
        let err = CompilationError::internal("label bound twice");
        assert_eq!(err.span(), None);
        assert_eq!(err.to_string(), "internal compiler error: label bound twice");
    }

    #[test]
    fn duplicate_registrations_become_duplicate_definitions() {
        let err = CompilationError::registration(
            RegistrationError::DuplicateClass {
                name: "Point".to_string(),
            },
            Span::new(1, 1, 0),
        );
        assert!(matches!(err, CompilationError::DuplicateDefinition { name, .. } if name == "Point"));
    }

    #[test]
    fn other_registrations_are_wrapped() {
        let err = CompilationError::registration(
            RegistrationError::CircularInheritance {
                name: "A".to_string(),
            },
            Span::new(4, 1, 0),
        );
        assert_eq!(err.to_string(), "at 4:1: circular inheritance for 'A'");
    }
}
