//! Two-way conditionals.

use tern_ast::{If, Node};
use tern_core::MachineType;

use super::{ExprCompiler, Result};

impl<'a> ExprCompiler<'a> {
    /// Compile `if condition then_body else else_body`.
    ///
    /// Layout:
    /// ```text
    ///   [jump to else if !condition]
    ///   [then]
    ///   Goto done
    /// else:
    ///   [else, or the placeholder default in expression context]
    /// done:
    /// ```
    pub(crate) fn compile_if(&mut self, branch: &If<'_>, produces_value: bool) -> Result<MachineType> {
        let ty = if produces_value {
            self.ctx.map_type(&branch.inferred, branch.span)?
        } else {
            MachineType::Void
        };
        if produces_value && ty.is_void() {
            self.compile_if(branch, false)?;
            return Ok(self.placeholder(&ty));
        }

        let else_label = self.emitter.new_label();
        let done = self.emitter.new_label();

        self.compile_jump_if(&branch.condition, false, else_label)?;
        self.compile_arm(&branch.then_body, &ty)?;
        self.emitter.emit_goto(done);

        self.emitter.bind(else_label);
        match &branch.else_body {
            Some(else_body) => self.compile_arm(else_body, &ty)?,
            None if produces_value => {
                self.placeholder(&ty);
            }
            None => {}
        }
        self.emitter.bind(done);

        Ok(ty)
    }

    /// Compile a branch or loop body to leave a `ty` value, or nothing when
    /// `ty` is void.
    pub(crate) fn compile_arm(&mut self, node: &Node<'_>, ty: &MachineType) -> Result<()> {
        if ty.is_void() {
            self.compile(node, false)?;
            Ok(())
        } else {
            self.compile_as(node, ty)
        }
    }
}
