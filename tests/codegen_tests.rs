//! End-to-end code generation: calls, arithmetic, locals and definitions.

mod common;

use common::*;
use tern::prelude::*;
use tern::registry::TypeMapper;

fn invoked(instruction: &Instruction) -> &MethodRef {
    match instruction {
        Instruction::InvokeStatic(method)
        | Instruction::InvokeVirtual(method)
        | Instruction::InvokeInterface(method)
        | Instruction::InvokeSpecial(method) => method,
        other => panic!("not an invocation: {other}"),
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

#[test]
fn narrow_addition_in_statement_context_is_discarded() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let add = ast.method(
        "add",
        &[ast.param("a", INT), ast.param("b", INT)],
        VOID,
        ast.binary(ast.local("a", INT), "+", ast.local("b", INT), INT),
    );
    let unit = compile_ok(&ast.script("Calc", &[add]));

    assert_eq!(
        method(&unit, "Calc", "add").instructions,
        vec![
            Instruction::Load { kind: StackKind::Int, slot: 0 },
            Instruction::Load { kind: StackKind::Int, slot: 1 },
            Instruction::IAdd,
            Instruction::Pop(StackKind::Int),
            Instruction::ReturnVoid,
        ]
    );
}

#[test]
fn narrow_addition_in_expression_context_is_kept() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let sum = ast.method(
        "sum",
        &[ast.param("a", INT), ast.param("b", INT)],
        INT,
        ast.binary(ast.local("a", INT), "+", ast.local("b", INT), INT),
    );
    let unit = compile_ok(&ast.script("Calc", &[sum]));

    let sum = method(&unit, "Calc", "sum");
    assert_eq!(
        sum.instructions,
        vec![
            Instruction::Load { kind: StackKind::Int, slot: 0 },
            Instruction::Load { kind: StackKind::Int, slot: 1 },
            Instruction::IAdd,
            Instruction::Return(StackKind::Int),
        ]
    );
    assert_eq!(sum.max_stack, 2);
}

#[test]
fn wide_subtraction_widens_narrow_argument() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let diff = ast.method(
        "diff",
        &[ast.param("a", LONG), ast.param("b", INT)],
        LONG,
        ast.binary(ast.local("a", LONG), "-", ast.local("b", INT), LONG),
    );
    let unit = compile_ok(&ast.script("Calc", &[diff]));

    let diff = method(&unit, "Calc", "diff");
    assert_eq!(
        diff.instructions,
        vec![
            Instruction::Load { kind: StackKind::Long, slot: 0 },
            Instruction::Load { kind: StackKind::Int, slot: 2 },
            Instruction::I2L,
            Instruction::LSub,
            Instruction::Return(StackKind::Long),
        ]
    );
    assert_eq!(diff.max_locals, 3);
    assert_eq!(diff.max_stack, 4);
}

#[test]
fn narrow_receiver_with_wide_argument_runs_wide() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let mixed = |name: &str, op: &str| {
        ast.method(
            name,
            &[ast.param("i", INT), ast.param("n", LONG)],
            LONG,
            ast.binary(ast.local("i", INT), op, ast.local("n", LONG), LONG),
        )
    };
    let unit = compile_ok(&ast.script("Calc", &[mixed("plus", "+"), mixed("minus", "-")]));

    for (name, instruction) in [("plus", Instruction::LAdd), ("minus", Instruction::LSub)] {
        let method = method(&unit, "Calc", name);
        assert_eq!(
            method.instructions,
            vec![
                Instruction::Load { kind: StackKind::Int, slot: 0 },
                Instruction::I2L,
                Instruction::Load { kind: StackKind::Long, slot: 1 },
                instruction,
                Instruction::Return(StackKind::Long),
            ]
        );
        assert_eq!(method.max_stack, 4);
    }
}

#[test]
fn unsupported_operator_is_rejected() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let product = ast.binary(ast.int(2), "*", ast.int(3), INT);

    let err = compile_err(&ast.script("Calc", &[product]));
    assert!(matches!(err, CompilationError::UnsupportedOperator { .. }));
}

// =============================================================================
// Invocation
// =============================================================================

#[test]
fn construction_leaves_exactly_one_reference() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let point = ast.class(
        "Point",
        None,
        &[],
        &[ast.constructor(&[ast.param("x", INT)], ast.noop())],
    );
    let make = ast.method(
        "make",
        &[ast.param("x", INT)],
        TypeRef::named("Point"),
        ast.new_object("Point", &[ast.local("x", INT)]),
    );
    let unit = compile_ok(&ast.script("Shapes", &[point, make]));

    let make = method(&unit, "Shapes", "make");
    assert_eq!(make.instructions.len(), 5);
    assert_eq!(make.instructions[0], Instruction::New(ClassRef::class("Point")));
    assert_eq!(make.instructions[1], Instruction::Dup(StackKind::Reference));
    assert_eq!(
        make.instructions[2],
        Instruction::Load { kind: StackKind::Int, slot: 0 }
    );
    let ctor = invoked(&make.instructions[3]);
    assert!(matches!(make.instructions[3], Instruction::InvokeSpecial(_)));
    assert_eq!(ctor.owner.name, "Point");
    assert_eq!(ctor.params, vec![MachineType::INT]);
    assert_eq!(make.instructions[4], Instruction::Return(StackKind::Reference));
}

#[test]
fn construction_in_statement_context_is_discarded() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let list = ast.new_object("java.util.ArrayList", &[ast.int(8)]);
    let unit = compile_ok(&ast.script("Lists", &[list]));

    let body = main_body(&unit, "Lists");
    assert_eq!(body.len(), 5);
    assert_eq!(body[2], Instruction::PushInt(8));
    assert_eq!(body[4], Instruction::Pop(StackKind::Reference));
}

#[test]
fn void_call_in_expression_context_yields_receiver() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let counter_ty = TypeRef::named("Counter");
    let counter = ast.class(
        "Counter",
        None,
        &[],
        &[ast.method("reset", &[], VOID, ast.noop())],
    );
    let chain = ast.method(
        "chain",
        &[ast.param("c", counter_ty)],
        counter_ty,
        ast.call(ast.local("c", counter_ty), "reset", &[], VOID),
    );
    let unit = compile_ok(&ast.script("Counters", &[counter, chain]));

    let chain = method(&unit, "Counters", "chain");
    assert_eq!(
        chain.instructions[..2],
        [
            Instruction::Load { kind: StackKind::Reference, slot: 0 },
            Instruction::Dup(StackKind::Reference),
        ]
    );
    assert!(matches!(chain.instructions[2], Instruction::InvokeVirtual(_)));
    assert_eq!(invoked(&chain.instructions[2]).name, "reset");
    assert_eq!(chain.instructions[3], Instruction::Return(StackKind::Reference));
}

#[test]
fn calls_chain_through_void_members() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let builder = TypeRef::named("java.lang.StringBuilder");
    let sb = || ast.local("sb", builder);
    let reset = ast.method(
        "reset",
        &[ast.param("sb", builder)],
        builder,
        ast.call(
            ast.call(sb(), "setLength", &[ast.int(0)], VOID),
            "append",
            &[ast.string("x")],
            builder,
        ),
    );
    let unit = compile_ok(&ast.script("Builders", &[reset]));

    let reset = method(&unit, "Builders", "reset");
    let calls: Vec<_> = reset
        .instructions
        .iter()
        .filter(|i| matches!(i, Instruction::InvokeVirtual(_)))
        .map(|i| invoked(i).to_string())
        .collect();
    assert_eq!(
        calls,
        vec![
            "java.lang.StringBuilder.setLength(int)void",
            "java.lang.StringBuilder.append(java.lang.String)java.lang.StringBuilder",
        ]
    );
    assert_eq!(reset.instructions[1], Instruction::Dup(StackKind::Reference));
    assert_stack_balanced(reset);
}

#[test]
fn primitive_body_must_match_the_return_type() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let count = ast.method("count", &[], INT, ast.boolean(true));

    let err = compile_err(&ast.script("Counts", &[count]));
    assert!(matches!(err, CompilationError::InvalidContext { .. }));
}

#[test]
fn unknown_type_aborts_compilation() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let call = ast.call(ast.type_name("Frobnicator"), "make", &[], INT);

    let err = compile_err(&ast.script("Broken", &[ast.int(1), call]));
    match err {
        CompilationError::UnknownType { name, .. } => assert_eq!(name, "Frobnicator"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn static_host_call_widens_arguments() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let max = ast.call(
        ast.type_name("java.lang.Math"),
        "max",
        &[ast.int(1), ast.long(2)],
        LONG,
    );
    let unit = compile_ok(&ast.script("Maths", &[max]));

    let body = main_body(&unit, "Maths");
    assert_eq!(
        body[..3],
        [
            Instruction::PushInt(1),
            Instruction::I2L,
            Instruction::PushLong(2),
        ]
    );
    let max = invoked(&body[3]);
    assert_eq!(max.params, vec![MachineType::LONG, MachineType::LONG]);
    assert_eq!(body[4], Instruction::Pop(StackKind::Long));
}

#[test]
fn imported_host_class_and_exact_overload() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let out = TypeRef::named("PrintStream");
    let greet = ast.method(
        "greet",
        &[ast.param("out", out)],
        VOID,
        ast.body(&[
            ast.call(ast.local("out", out), "println", &[ast.string("hi")], VOID),
            ast.call(ast.local("out", out), "println", &[ast.int(5)], VOID),
        ]),
    );
    let script = ast.script("Greeter", &[ast.import("java.io.PrintStream", None), greet]);
    let unit = compile_ok(&script);

    let greet = method(&unit, "Greeter", "greet");
    let printlns: Vec<_> = greet
        .instructions
        .iter()
        .filter(|i| matches!(i, Instruction::InvokeVirtual(_)))
        .map(|i| invoked(i).to_string())
        .collect();
    assert_eq!(
        printlns,
        vec![
            "java.io.PrintStream.println(java.lang.String)void",
            "java.io.PrintStream.println(int)void",
        ]
    );
}

#[test]
fn interface_receiver_uses_interface_dispatch() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let task = TypeRef::named("Task");
    let start = ast.method(
        "start",
        &[ast.param("task", task)],
        VOID,
        ast.call(ast.local("task", task), "run", &[], VOID),
    );
    let script = ast.script("Runner", &[ast.import("java.lang.Runnable", Some("Task")), start]);
    let unit = compile_ok(&script);

    let start = method(&unit, "Runner", "start");
    assert!(matches!(start.instructions[1], Instruction::InvokeInterface(_)));
}

#[test]
fn ambiguous_overload_is_reported() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let object = TypeRef::named("Object");
    let pair_ty = TypeRef::named("Pair");
    let pair = ast.class(
        "Pair",
        None,
        &[],
        &[
            ast.method(
                "put",
                &[ast.param("a", object), ast.param("b", STRING)],
                VOID,
                ast.noop(),
            ),
            ast.method(
                "put",
                &[ast.param("a", STRING), ast.param("b", object)],
                VOID,
                ast.noop(),
            ),
        ],
    );
    let fill = ast.method(
        "fill",
        &[ast.param("p", pair_ty)],
        VOID,
        ast.call(
            ast.local("p", pair_ty),
            "put",
            &[ast.string("a"), ast.string("b")],
            VOID,
        ),
    );

    let err = compile_err(&ast.script("Pairs", &[pair, fill]));
    assert!(matches!(err, CompilationError::AmbiguousCall { .. }));
}

#[test]
fn method_on_primitive_is_rejected() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let describe = ast.method(
        "describe",
        &[ast.param("flag", BOOLEAN)],
        STRING,
        ast.call(ast.local("flag", BOOLEAN), "toString", &[], STRING),
    );

    let err = compile_err(&ast.script("Numbers", &[describe]));
    assert!(matches!(err, CompilationError::PrimitiveReceiverInvocation { .. }));
}

#[test]
fn overload_resolution_is_deterministic() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let builder = ast.new_object("java.lang.StringBuilder", &[]);
    let builder_ty = TypeRef::named("java.lang.StringBuilder");
    let appended = ast.call(builder, "append", &[ast.long(7)], builder_ty);
    let script = ast.script("Builders", &[appended]);

    let first = compile_ok(&script);
    for _ in 0..8 {
        assert_eq!(compile_ok(&script), first);
    }
    let body = main_body(&first, "Builders");
    assert_eq!(body[3], Instruction::PushLong(7));
    assert_eq!(invoked(&body[4]).params, vec![MachineType::LONG]);
}

// =============================================================================
// Self calls and locals
// =============================================================================

#[test]
fn instance_self_calls_load_this() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let counter = ast.class(
        "Counter",
        None,
        &[],
        &[
            ast.method("bump", &[], VOID, ast.noop()),
            ast.method(
                "twice",
                &[],
                VOID,
                ast.body(&[
                    ast.functional_call("bump", &[], VOID),
                    ast.functional_call("bump", &[], VOID),
                ]),
            ),
        ],
    );
    let unit = compile_ok(&ast.script("Counters", &[counter]));

    let twice = method(&unit, "Counter", "twice");
    assert_eq!(twice.instructions.len(), 5);
    for call in [0, 2] {
        assert_eq!(
            twice.instructions[call],
            Instruction::Load { kind: StackKind::Reference, slot: 0 }
        );
        assert!(matches!(twice.instructions[call + 1], Instruction::InvokeVirtual(_)));
    }
}

#[test]
fn static_self_call_uses_resolved_parameter_types() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let twice = ast.method(
        "twice",
        &[ast.param("n", LONG)],
        LONG,
        ast.binary(ast.local("n", LONG), "+", ast.local("n", LONG), LONG),
    );
    let call = ast.functional_call("twice", &[ast.int(21)], LONG);
    let unit = compile_ok(&ast.script("Doubler", &[call, twice]));

    let body = main_body(&unit, "Doubler");
    assert_eq!(body[..2], [Instruction::PushInt(21), Instruction::I2L]);
    let twice = invoked(&body[2]);
    assert_eq!(twice.owner.name, "Doubler");
    assert_eq!(twice.params, vec![MachineType::LONG]);
    assert_eq!(body[3], Instruction::Pop(StackKind::Long));
}

#[test]
fn locals_follow_the_argument_slot() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let script = ast.script(
        "Locals",
        &[
            ast.assign("x", ast.int(5)),
            ast.binary(ast.local("x", INT), "+", ast.int(1), INT),
        ],
    );
    let unit = compile_ok(&script);

    assert_eq!(
        main_body(&unit, "Locals"),
        [
            Instruction::PushInt(5),
            Instruction::Store { kind: StackKind::Int, slot: 1 },
            Instruction::Load { kind: StackKind::Int, slot: 1 },
            Instruction::PushInt(1),
            Instruction::IAdd,
            Instruction::Pop(StackKind::Int),
        ]
    );
    assert_eq!(method(&unit, "Locals", "main").max_locals, 2);
}

#[test]
fn unknown_variable_is_reported() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);

    let err = compile_err(&ast.script("Ghosts", &[ast.local("ghost", INT)]));
    assert!(matches!(err, CompilationError::UnknownVariable { .. }));
}

// =============================================================================
// Definitions
// =============================================================================

#[test]
fn unit_layout() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let base = ast.class("Base", None, &[], &[]);
    let derived = ast.class(
        "Derived",
        Some("Base"),
        &["java.lang.Runnable"],
        &[ast.method("run", &[], VOID, ast.noop())],
    );
    let unit = compile_ok(&ast.script("App", &[base, derived]));

    let names: Vec<_> = unit.classes.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["App", "Base", "Derived"]);

    let main = method(&unit, "App", "main");
    assert!(main.is_static());
    assert_eq!(
        main.params,
        vec![MachineType::array_of(MachineType::string())]
    );

    let derived = unit.class("Derived").unwrap();
    assert_eq!(derived.superclass, "Base");
    assert_eq!(derived.interfaces, vec!["java.lang.Runnable".to_string()]);
    let ctor = derived.method("<init>").unwrap();
    assert_eq!(invoked(&ctor.instructions[1]).owner.name, "Base");
}

#[test]
fn reference_return_epilogue_options() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let node = TypeRef::named("Node");
    let class = ast.class(
        "Node",
        None,
        &[],
        &[ast.method("next", &[], node, ast.null(node))],
    );
    let script = ast.script("Graph", &[class]);

    let corrected = compile_ok(&script);
    assert_eq!(
        method(&corrected, "Node", "next").instructions,
        vec![Instruction::PushNull, Instruction::Return(StackKind::Reference)]
    );

    let legacy = compile_with(
        &script,
        CompileOptions::new().with_return_epilogue(ReturnEpilogue::Legacy),
    );
    assert_eq!(
        method(&legacy, "Node", "next").instructions,
        vec![
            Instruction::PushNull,
            Instruction::Pop(StackKind::Reference),
            Instruction::Load { kind: StackKind::Reference, slot: 0 },
            Instruction::Return(StackKind::Reference),
        ]
    );
}

#[test]
fn duplicate_definitions_are_rejected() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let twins = ast.script(
        "Twins",
        &[
            ast.class("Twin", None, &[], &[]),
            ast.class("Twin", None, &[], &[]),
        ],
    );
    assert!(matches!(
        compile_err(&twins),
        CompilationError::DuplicateDefinition { .. }
    ));

    let overloads = ast.script(
        "Overloads",
        &[
            ast.method("f", &[ast.param("a", INT)], VOID, ast.noop()),
            ast.method("f", &[ast.param("b", INT)], VOID, ast.noop()),
        ],
    );
    assert!(matches!(
        compile_err(&overloads),
        CompilationError::DuplicateDefinition { .. }
    ));
}

#[test]
fn configured_imports_are_visible() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let list = TypeRef::named("List");
    let size = ast.method(
        "size",
        &[ast.param("xs", list)],
        INT,
        ast.call(ast.local("xs", list), "size", &[], INT),
    );
    let unit = compile_with(
        &ast.script("Sizes", &[size]),
        CompileOptions::new().with_import("List", "java.util.List"),
    );

    let size = method(&unit, "Sizes", "size");
    assert_eq!(size.params, vec![MachineType::interface("java.util.List")]);
    assert!(matches!(size.instructions[1], Instruction::InvokeInterface(_)));
}

// =============================================================================
// Type mapping
// =============================================================================

#[test]
fn mapping_round_trip() {
    let host = HostRegistry::with_standard_library();
    let mut mapper = TypeMapper::new();
    let cases = [
        ("Meters", MachineType::LONG),
        ("Flag", MachineType::BOOLEAN),
        ("Names", MachineType::array_of(MachineType::string())),
        ("Job", MachineType::interface("java.lang.Runnable")),
    ];

    for (name, machine_type) in &cases {
        let descriptor = tern::core::TypeDescriptor::new(*name);
        mapper.register(descriptor.clone(), machine_type.clone());
        assert_eq!(
            mapper.map(&host, &descriptor, Span::default()).unwrap(),
            *machine_type
        );
    }
}
