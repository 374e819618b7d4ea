//! Typed AST consumed by the Tern backend.
//!
//! The tree arrives fully type-checked: every node exposes
//! [`Node::inferred_type`]. The backend never infers types, it only reads
//! them.
//!
//! ```
//! use bumpalo::Bump;
//! use tern_ast::{AstBuilder, TypeRef};
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let int = TypeRef::named("int");
//! let sum = b.binary(b.local("a", int), "+", b.local("b", int), int);
//! assert_eq!(sum.inferred_type(), int);
//! ```

mod builder;
mod node;

pub use builder::AstBuilder;
pub use node::{
    Body, Call, ClassDef, ConstructorDef, FunctionalCall, If, Import, Literal, LiteralValue,
    Local, LocalAssign, Loop, MethodDef, Node, Param, Script, SelfRef, TypeName, TypeRef,
};
