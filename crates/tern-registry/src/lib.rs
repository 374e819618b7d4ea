//! Tern registry crate.
//!
//! Holds the two tables the backend consults while emitting:
//!
//! - [`HostRegistry`]: classes, interfaces and members of the host type
//!   universe, with the inheritance graph used for subtype queries.
//! - [`TypeMapper`]: the mapping from source type descriptors to machine
//!   types, including import aliases and user classes.

mod registry;
mod stdlib;
mod type_mapper;

pub use registry::{ClassEntry, HostRegistry};
pub use stdlib::{
    ARRAY_LIST, COMPARABLE, INTEGER, LIST, MATH, PRINT_STREAM, RUNNABLE, STRING_BUILDER,
};
pub use type_mapper::TypeMapper;
