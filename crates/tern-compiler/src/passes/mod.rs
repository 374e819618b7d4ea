//! Compiler passes.
//!
//! - [`registration`]: declare classes, imports and method signatures
//!
//! Emission itself is driven by [`crate::definitions::compile_script`].

pub mod registration;

pub use registration::{RegistrationOutput, RegistrationPass};
