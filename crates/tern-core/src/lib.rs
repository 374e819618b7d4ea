//! Tern core types.
//!
//! Shared vocabulary for the Tern backend crates:
//!
//! - [`Span`]: source positions carried through from the parser
//! - [`TypeHash`]: deterministic identity of classes and members
//! - [`TypeDescriptor`]: source-level type identity attached to AST nodes
//! - [`MachineType`], [`PrimitiveKind`], [`StackKind`]: target representation
//! - [`MethodCandidate`], [`MethodFlags`]: resolved call targets
//! - [`CompilationError`], [`RegistrationError`]: failure kinds

mod error;
mod machine_type;
mod method;
mod span;
mod type_descriptor;
mod type_hash;

pub use error::{CompilationError, RegistrationError};
pub use machine_type::{ClassRef, MachineType, PrimitiveKind, StackKind, classes};
pub use method::{CONSTRUCTOR_NAME, MethodCandidate, MethodFlags, format_arg_types};
pub use span::Span;
pub use type_descriptor::{NO_TYPE_NAME, TypeDescriptor};
pub use type_hash::{TypeHash, hash_constants};
