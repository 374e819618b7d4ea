//! Shared helpers for the integration suites.

#![allow(dead_code)]

use std::collections::HashMap;

use tern::prelude::*;

/// Route `tracing` output through the test writer; `RUST_LOG` selects levels.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub const INT: TypeRef<'static> = TypeRef::named("int");
pub const LONG: TypeRef<'static> = TypeRef::named("long");
pub const BOOLEAN: TypeRef<'static> = TypeRef::named("boolean");
pub const STRING: TypeRef<'static> = TypeRef::named("string");
pub const VOID: TypeRef<'static> = TypeRef::NONE;

/// Compile with default options, panicking on failure.
pub fn compile_ok(root: &Node<'_>) -> CompiledUnit {
    compile_with(root, CompileOptions::new().verbose(true))
}

pub fn compile_with(root: &Node<'_>, options: CompileOptions) -> CompiledUnit {
    init_tracing();
    match Compiler::new(options).compile(root) {
        Ok(unit) => unit,
        Err(err) => panic!("compilation failed: {err}"),
    }
}

pub fn compile_err(root: &Node<'_>) -> CompilationError {
    init_tracing();
    match Compiler::default().compile(root) {
        Ok(unit) => panic!("expected an error, got {} classes", unit.classes.len()),
        Err(err) => err,
    }
}

pub fn method<'u>(unit: &'u CompiledUnit, class: &str, name: &str) -> &'u CompiledMethod {
    unit.class(class)
        .and_then(|class| class.method(name))
        .unwrap_or_else(|| panic!("no method {class}.{name}"))
}

/// Instructions of `main` without the trailing `ReturnVoid`.
pub fn main_body<'u>(unit: &'u CompiledUnit, script: &str) -> &'u [Instruction] {
    let main = method(unit, script, "main");
    match main.instructions.split_last() {
        Some((Instruction::ReturnVoid, body)) => body,
        _ => panic!("main does not end in ReturnVoid: {:?}", main.instructions),
    }
}

/// Replay `method` and check that every path agrees on the stack depth.
///
/// Jumps record the depth they arrive with; every `Bind` must see the same
/// depth from all of its predecessors; returns must find exactly their value
/// on the stack. Returns the largest depth seen.
pub fn assert_stack_balanced(method: &CompiledMethod) -> usize {
    let mut depth: Option<usize> = Some(0);
    let mut at_label: HashMap<Label, usize> = HashMap::new();
    let mut max = 0;

    let arrive = |label: Label, depth: usize, at_label: &mut HashMap<Label, usize>| {
        let seen = *at_label.entry(label).or_insert(depth);
        assert_eq!(
            seen, depth,
            "{}: {label} reached with depths {seen} and {depth}",
            method.name
        );
    };

    for instruction in &method.instructions {
        if let Instruction::Bind(label) = instruction {
            match depth {
                Some(current) => arrive(*label, current, &mut at_label),
                None => depth = at_label.get(label).copied(),
            }
            continue;
        }

        let Some(current) = depth else {
            panic!("{}: unreachable '{instruction}'", method.name);
        };
        assert!(
            current >= instruction.pops(),
            "{}: underflow at '{instruction}'",
            method.name
        );
        match instruction {
            Instruction::ReturnVoid => assert_eq!(current, 0, "{}: leftover values", method.name),
            Instruction::Return(_) => assert_eq!(current, 1, "{}: leftover values", method.name),
            _ => {}
        }

        let after = current - instruction.pops() + usize::from(instruction.pushes().is_some());
        max = max.max(after);
        if let Some(target) = instruction.target() {
            arrive(target, after, &mut at_label);
        }
        depth = if instruction.is_terminal() {
            None
        } else {
            Some(after)
        };
    }

    assert!(depth.is_none(), "{}: falls off the end", method.name);
    max
}

/// Check every method of every class.
pub fn assert_unit_balanced(unit: &CompiledUnit) {
    for class in &unit.classes {
        for method in &class.methods {
            assert_stack_balanced(method);
        }
    }
}
