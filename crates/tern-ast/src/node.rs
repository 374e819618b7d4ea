//! Typed AST nodes.
//!
//! Every node is allocated in a `bumpalo` arena and referenced as
//! `&'ast T`, so [`Node`] itself is a cheap `Copy` handle. The type checker
//! has already run: each node carries its inferred type as a [`TypeRef`].

use tern_core::{Span, TypeDescriptor};

/// Type annotation as attached by the type checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef<'ast> {
    /// Base type name.
    pub name: &'ast str,
    /// Array of `name`.
    pub is_array: bool,
    /// The type itself rather than an instance.
    pub is_meta: bool,
}

impl<'ast> TypeRef<'ast> {
    /// The "no value" type.
    pub const NONE: TypeRef<'static> = TypeRef {
        name: tern_core::NO_TYPE_NAME,
        is_array: false,
        is_meta: false,
    };

    /// Instance type `name`.
    pub const fn named(name: &'ast str) -> Self {
        Self {
            name,
            is_array: false,
            is_meta: false,
        }
    }

    /// Array of `name`.
    pub const fn array(name: &'ast str) -> Self {
        Self {
            name,
            is_array: true,
            is_meta: false,
        }
    }

    /// The type `name` itself (static call and `new` receivers).
    pub const fn meta(name: &'ast str) -> Self {
        Self {
            name,
            is_array: false,
            is_meta: true,
        }
    }

    /// Whether this is the "no value" type.
    pub fn is_none(&self) -> bool {
        self.name == tern_core::NO_TYPE_NAME && !self.is_array && !self.is_meta
    }

    /// Owned descriptor for type mapping.
    pub fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor {
            name: self.name.to_string(),
            is_array: self.is_array,
            is_meta: self.is_meta,
        }
    }
}

/// A node of the typed AST.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'ast> {
    /// Compilation unit root.
    Script(&'ast Script<'ast>),
    /// Sequence of nodes; its value is the value of the last one.
    Body(&'ast Body<'ast>),
    /// Class definition.
    ClassDef(&'ast ClassDef<'ast>),
    /// Method definition.
    MethodDef(&'ast MethodDef<'ast>),
    /// Constructor definition.
    ConstructorDef(&'ast ConstructorDef<'ast>),
    /// `import` declaration.
    Import(&'ast Import<'ast>),
    /// Constant value.
    Literal(&'ast Literal<'ast>),
    /// Reference to a type used as a value (receiver of static calls).
    TypeName(&'ast TypeName<'ast>),
    /// The current instance.
    SelfRef(&'ast SelfRef<'ast>),
    /// Local variable read.
    Local(&'ast Local<'ast>),
    /// Local variable write.
    LocalAssign(&'ast LocalAssign<'ast>),
    /// Call with an explicit receiver (including operators).
    Call(&'ast Call<'ast>),
    /// Call on the current instance or class without a receiver.
    FunctionalCall(&'ast FunctionalCall<'ast>),
    /// Two-way conditional.
    If(&'ast If<'ast>),
    /// Loop in one of its four shapes.
    Loop(&'ast Loop<'ast>),
    /// Empty statement.
    Noop(Span),
}

impl<'ast> Node<'ast> {
    /// The type the checker inferred for this node.
    pub fn inferred_type(&self) -> TypeRef<'ast> {
        match self {
            Node::Body(body) => body.inferred,
            Node::Literal(lit) => lit.inferred,
            Node::TypeName(ty) => TypeRef::meta(ty.name),
            Node::SelfRef(this) => this.inferred,
            Node::Local(local) => local.inferred,
            Node::LocalAssign(assign) => assign.inferred,
            Node::Call(call) => call.inferred,
            Node::FunctionalCall(call) => call.inferred,
            Node::If(branch) => branch.inferred,
            Node::Loop(lp) => lp.inferred,
            Node::Script(_)
            | Node::ClassDef(_)
            | Node::MethodDef(_)
            | Node::ConstructorDef(_)
            | Node::Import(_)
            | Node::Noop(_) => TypeRef::NONE,
        }
    }

    /// Source location of the node.
    pub fn span(&self) -> Span {
        match self {
            Node::Script(n) => n.span,
            Node::Body(n) => n.span,
            Node::ClassDef(n) => n.span,
            Node::MethodDef(n) => n.span,
            Node::ConstructorDef(n) => n.span,
            Node::Import(n) => n.span,
            Node::Literal(n) => n.span,
            Node::TypeName(n) => n.span,
            Node::SelfRef(n) => n.span,
            Node::Local(n) => n.span,
            Node::LocalAssign(n) => n.span,
            Node::Call(n) => n.span,
            Node::FunctionalCall(n) => n.span,
            Node::If(n) => n.span,
            Node::Loop(n) => n.span,
            Node::Noop(span) => *span,
        }
    }

    /// Whether this node defines something instead of computing a value.
    pub fn is_definition(&self) -> bool {
        matches!(
            self,
            Node::ClassDef(_) | Node::MethodDef(_) | Node::ConstructorDef(_) | Node::Import(_)
        )
    }
}

/// Compilation unit root. Top-level statements form the body of the
/// generated `main` method.
#[derive(Debug, Clone, PartialEq)]
pub struct Script<'ast> {
    /// Name of the generated script class.
    pub name: &'ast str,
    /// Top-level statements and definitions.
    pub body: Node<'ast>,
    pub span: Span,
}

/// Sequence of nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Body<'ast> {
    pub nodes: &'ast [Node<'ast>],
    pub inferred: TypeRef<'ast>,
    pub span: Span,
}

/// Class definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef<'ast> {
    pub name: &'ast str,
    /// Superclass name; `java.lang.Object` when absent.
    pub superclass: Option<&'ast str>,
    /// Implemented interface names.
    pub interfaces: &'ast [&'ast str],
    /// Method and constructor definitions.
    pub members: &'ast [Node<'ast>],
    pub span: Span,
}

/// Method parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    pub name: &'ast str,
    pub ty: TypeRef<'ast>,
    pub span: Span,
}

/// Method definition.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDef<'ast> {
    pub name: &'ast str,
    pub params: &'ast [Param<'ast>],
    pub return_type: TypeRef<'ast>,
    pub body: Node<'ast>,
    /// Explicitly static (`def self.name`). Methods defined directly in a
    /// script body are static regardless.
    pub is_static: bool,
    pub span: Span,
}

/// Constructor definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDef<'ast> {
    pub params: &'ast [Param<'ast>],
    pub body: Node<'ast>,
    pub span: Span,
}

/// `import full.Name` or `import full.Name as Short`.
#[derive(Debug, Clone, PartialEq)]
pub struct Import<'ast> {
    /// Fully qualified host class name.
    pub full: &'ast str,
    /// Extra alias besides the last segment of `full`.
    pub alias: Option<&'ast str>,
    pub span: Span,
}

impl<'ast> Import<'ast> {
    /// Last dotted segment of the imported name.
    pub fn simple_name(&self) -> &'ast str {
        self.full.rsplit('.').next().unwrap_or(self.full)
    }
}

/// Literal values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralValue<'ast> {
    Int(i32),
    Long(i64),
    Bool(bool),
    String(&'ast str),
    Null,
}

/// Constant value.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal<'ast> {
    pub value: LiteralValue<'ast>,
    pub inferred: TypeRef<'ast>,
    pub span: Span,
}

/// A type name used in value position. Its inferred type is the meta type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeName<'ast> {
    pub name: &'ast str,
    pub span: Span,
}

/// `self`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelfRef<'ast> {
    pub inferred: TypeRef<'ast>,
    pub span: Span,
}

/// Local variable read.
#[derive(Debug, Clone, PartialEq)]
pub struct Local<'ast> {
    pub name: &'ast str,
    pub inferred: TypeRef<'ast>,
    pub span: Span,
}

/// Local variable write; its value is the assigned value.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalAssign<'ast> {
    pub name: &'ast str,
    pub value: Node<'ast>,
    pub inferred: TypeRef<'ast>,
    pub span: Span,
}

/// `receiver.name(args)`; binary operators are calls named after the
/// operator (`a + b` is `a.+(b)`).
#[derive(Debug, Clone, PartialEq)]
pub struct Call<'ast> {
    pub receiver: Node<'ast>,
    pub name: &'ast str,
    pub args: &'ast [Node<'ast>],
    pub inferred: TypeRef<'ast>,
    pub span: Span,
}

/// `name(args)` on the current instance or class.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionalCall<'ast> {
    pub name: &'ast str,
    pub args: &'ast [Node<'ast>],
    pub inferred: TypeRef<'ast>,
    pub span: Span,
}

/// `if condition then_body else else_body`.
#[derive(Debug, Clone, PartialEq)]
pub struct If<'ast> {
    pub condition: Node<'ast>,
    pub then_body: Node<'ast>,
    pub else_body: Option<Node<'ast>>,
    pub inferred: TypeRef<'ast>,
    pub span: Span,
}

/// `while`/`until` loops (`check_first`) and `do ... while`/`until` loops.
#[derive(Debug, Clone, PartialEq)]
pub struct Loop<'ast> {
    pub condition: Node<'ast>,
    pub body: Node<'ast>,
    /// Test before the body (while-style) instead of after (do-style).
    pub check_first: bool,
    /// Continue while the condition is false (until-style).
    pub negative: bool,
    pub inferred: TypeRef<'ast>,
    pub span: Span,
}
