//! Arena-backed construction helpers.
//!
//! The type checker (and the tests) build trees through [`AstBuilder`], which
//! allocates every node and string in one `Bump` so the whole tree shares the
//! arena's lifetime.

use bumpalo::Bump;
use tern_core::Span;

use crate::node::*;

/// Builds typed AST nodes inside an arena.
#[derive(Clone, Copy)]
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    span: Span,
}

impl<'ast> AstBuilder<'ast> {
    /// Create a builder allocating into `arena`.
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            span: Span::default(),
        }
    }

    /// A copy of this builder that stamps `span` on the nodes it creates.
    pub fn at(self, line: u32, col: u32) -> Self {
        Self {
            span: Span::point(line, col),
            ..self
        }
    }

    fn str(&self, s: &str) -> &'ast str {
        self.arena.alloc_str(s)
    }

    fn nodes(&self, nodes: &[Node<'ast>]) -> &'ast [Node<'ast>] {
        self.arena.alloc_slice_copy(nodes)
    }

    // ==========================================================================
    // Values
    // ==========================================================================

    /// Narrow integer literal.
    pub fn int(&self, value: i32) -> Node<'ast> {
        self.literal(LiteralValue::Int(value), TypeRef::named("int"))
    }

    /// Wide integer literal.
    pub fn long(&self, value: i64) -> Node<'ast> {
        self.literal(LiteralValue::Long(value), TypeRef::named("long"))
    }

    /// Boolean literal.
    pub fn boolean(&self, value: bool) -> Node<'ast> {
        self.literal(LiteralValue::Bool(value), TypeRef::named("boolean"))
    }

    /// String literal.
    pub fn string(&self, value: &str) -> Node<'ast> {
        let value = self.str(value);
        self.literal(LiteralValue::String(value), TypeRef::named("string"))
    }

    /// `null`, typed by the checker as `ty`.
    pub fn null(&self, ty: TypeRef<'ast>) -> Node<'ast> {
        self.literal(LiteralValue::Null, ty)
    }

    fn literal(&self, value: LiteralValue<'ast>, inferred: TypeRef<'ast>) -> Node<'ast> {
        Node::Literal(self.arena.alloc(Literal {
            value,
            inferred,
            span: self.span,
        }))
    }

    /// A type name in value position.
    pub fn type_name(&self, name: &str) -> Node<'ast> {
        Node::TypeName(self.arena.alloc(TypeName {
            name: self.str(name),
            span: self.span,
        }))
    }

    /// `self` of type `ty`.
    pub fn self_ref(&self, ty: TypeRef<'ast>) -> Node<'ast> {
        Node::SelfRef(self.arena.alloc(SelfRef {
            inferred: ty,
            span: self.span,
        }))
    }

    /// Local variable read.
    pub fn local(&self, name: &str, ty: TypeRef<'ast>) -> Node<'ast> {
        Node::Local(self.arena.alloc(Local {
            name: self.str(name),
            inferred: ty,
            span: self.span,
        }))
    }

    /// Local variable write.
    pub fn assign(&self, name: &str, value: Node<'ast>) -> Node<'ast> {
        Node::LocalAssign(self.arena.alloc(LocalAssign {
            name: self.str(name),
            value,
            inferred: value.inferred_type(),
            span: self.span,
        }))
    }

    // ==========================================================================
    // Calls
    // ==========================================================================

    /// `receiver.name(args)` returning `ty`.
    pub fn call(
        &self,
        receiver: Node<'ast>,
        name: &str,
        args: &[Node<'ast>],
        ty: TypeRef<'ast>,
    ) -> Node<'ast> {
        Node::Call(self.arena.alloc(Call {
            receiver,
            name: self.str(name),
            args: self.nodes(args),
            inferred: ty,
            span: self.span,
        }))
    }

    /// Binary operator `lhs op rhs` returning `ty`.
    pub fn binary(&self, lhs: Node<'ast>, op: &str, rhs: Node<'ast>, ty: TypeRef<'ast>) -> Node<'ast> {
        self.call(lhs, op, &[rhs], ty)
    }

    /// `Type.new(args)`.
    pub fn new_object(&self, class: &str, args: &[Node<'ast>]) -> Node<'ast> {
        let class = self.str(class);
        let receiver = self.type_name(class);
        self.call(receiver, "new", args, TypeRef::named(class))
    }

    /// `name(args)` on the current instance or class.
    pub fn functional_call(&self, name: &str, args: &[Node<'ast>], ty: TypeRef<'ast>) -> Node<'ast> {
        Node::FunctionalCall(self.arena.alloc(FunctionalCall {
            name: self.str(name),
            args: self.nodes(args),
            inferred: ty,
            span: self.span,
        }))
    }

    // ==========================================================================
    // Control flow
    // ==========================================================================

    /// Sequence whose value is its last node's value.
    pub fn body(&self, nodes: &[Node<'ast>]) -> Node<'ast> {
        let inferred = nodes
            .last()
            .map(Node::inferred_type)
            .unwrap_or(TypeRef::NONE);
        Node::Body(self.arena.alloc(Body {
            nodes: self.nodes(nodes),
            inferred,
            span: self.span,
        }))
    }

    /// Two-way conditional of type `ty`.
    pub fn if_else(
        &self,
        condition: Node<'ast>,
        then_body: Node<'ast>,
        else_body: Option<Node<'ast>>,
        ty: TypeRef<'ast>,
    ) -> Node<'ast> {
        Node::If(self.arena.alloc(If {
            condition,
            then_body,
            else_body,
            inferred: ty,
            span: self.span,
        }))
    }

    /// Loop in any of its four shapes.
    pub fn loop_node(
        &self,
        condition: Node<'ast>,
        body: Node<'ast>,
        check_first: bool,
        negative: bool,
        ty: TypeRef<'ast>,
    ) -> Node<'ast> {
        Node::Loop(self.arena.alloc(Loop {
            condition,
            body,
            check_first,
            negative,
            inferred: ty,
            span: self.span,
        }))
    }

    /// `while condition do body end`, used as a statement.
    pub fn while_loop(&self, condition: Node<'ast>, body: Node<'ast>) -> Node<'ast> {
        self.loop_node(condition, body, true, false, TypeRef::NONE)
    }

    /// `until condition do body end`, used as a statement.
    pub fn until_loop(&self, condition: Node<'ast>, body: Node<'ast>) -> Node<'ast> {
        self.loop_node(condition, body, true, true, TypeRef::NONE)
    }

    /// Empty statement.
    pub fn noop(&self) -> Node<'ast> {
        Node::Noop(self.span)
    }

    // ==========================================================================
    // Definitions
    // ==========================================================================

    /// Method parameter.
    pub fn param(&self, name: &str, ty: TypeRef<'ast>) -> Param<'ast> {
        Param {
            name: self.str(name),
            ty,
            span: self.span,
        }
    }

    /// Instance method (static inside a script body).
    pub fn method(
        &self,
        name: &str,
        params: &[Param<'ast>],
        return_type: TypeRef<'ast>,
        body: Node<'ast>,
    ) -> Node<'ast> {
        self.method_def(name, params, return_type, body, false)
    }

    /// Explicitly static method.
    pub fn static_method(
        &self,
        name: &str,
        params: &[Param<'ast>],
        return_type: TypeRef<'ast>,
        body: Node<'ast>,
    ) -> Node<'ast> {
        self.method_def(name, params, return_type, body, true)
    }

    fn method_def(
        &self,
        name: &str,
        params: &[Param<'ast>],
        return_type: TypeRef<'ast>,
        body: Node<'ast>,
        is_static: bool,
    ) -> Node<'ast> {
        Node::MethodDef(self.arena.alloc(MethodDef {
            name: self.str(name),
            params: self.arena.alloc_slice_copy(params),
            return_type,
            body,
            is_static,
            span: self.span,
        }))
    }

    /// Constructor.
    pub fn constructor(&self, params: &[Param<'ast>], body: Node<'ast>) -> Node<'ast> {
        Node::ConstructorDef(self.arena.alloc(ConstructorDef {
            params: self.arena.alloc_slice_copy(params),
            body,
            span: self.span,
        }))
    }

    /// Class definition.
    pub fn class(
        &self,
        name: &str,
        superclass: Option<&str>,
        interfaces: &[&str],
        members: &[Node<'ast>],
    ) -> Node<'ast> {
        let interfaces: Vec<&'ast str> = interfaces.iter().map(|i| self.str(i)).collect();
        Node::ClassDef(self.arena.alloc(ClassDef {
            name: self.str(name),
            superclass: superclass.map(|s| self.str(s)),
            interfaces: self.arena.alloc_slice_copy(&interfaces),
            members: self.nodes(members),
            span: self.span,
        }))
    }

    /// `import full [as alias]`.
    pub fn import(&self, full: &str, alias: Option<&str>) -> Node<'ast> {
        Node::Import(self.arena.alloc(Import {
            full: self.str(full),
            alias: alias.map(|a| self.str(a)),
            span: self.span,
        }))
    }

    /// Compilation unit root.
    pub fn script(&self, name: &str, nodes: &[Node<'ast>]) -> Node<'ast> {
        let body = self.body(nodes);
        Node::Script(self.arena.alloc(Script {
            name: self.str(name),
            body,
            span: self.span,
        }))
    }
}
