//! Tern: bytecode generation for a class-based stack VM.
//!
//! Takes a fully type-checked AST and emits one class per script and per
//! user class definition, with methods in an abstract JVM-like instruction
//! set.
//!
//! ```
//! use tern::prelude::*;
//!
//! let arena = Bump::new();
//! let ast = AstBuilder::new(&arena);
//! let sum = ast.binary(ast.int(1), "+", ast.int(2), TypeRef::named("int"));
//! let script = ast.script("Hello", &[sum]);
//!
//! let unit = compile(&script).unwrap();
//! let main = unit.class("Hello").unwrap().method("main").unwrap();
//! assert_eq!(main.instructions[2], Instruction::IAdd);
//! ```

pub use tern_ast as ast;
pub use tern_compiler as compiler;
pub use tern_core as core;
pub use tern_registry as registry;

use tern_ast::Node;
use tern_compiler::{CompilationError, CompiledUnit, Compiler};

/// Compile `root` against the host standard library with default options.
pub fn compile(root: &Node<'_>) -> Result<CompiledUnit, CompilationError> {
    Compiler::default().compile(root)
}

// Re-export main types
pub mod prelude {
    pub use bumpalo::Bump;
    pub use tern_ast::{AstBuilder, Node, TypeRef};
    pub use tern_compiler::{
        CompilationError, CompileOptions, CompiledClass, CompiledMethod, CompiledUnit, Compiler,
        Condition, Instruction, Label, MethodRef, ReturnEpilogue,
    };
    pub use tern_core::{ClassRef, MachineType, MethodCandidate, MethodFlags, Span, StackKind};
    pub use tern_registry::{ClassEntry, HostRegistry};

    pub use crate::compile;
}
