//! Loops in their four shapes.
//!
//! `check_first` selects a while-style test before the body over a do-style
//! test after it; `negative` continues while the predicate is false
//! (`until`) instead of while it is true.

use tern_ast::Loop;
use tern_core::MachineType;

use super::{ExprCompiler, Result};

impl<'a> ExprCompiler<'a> {
    /// Compile a loop.
    ///
    /// ```text
    ///   [placeholder]                 expression context only
    /// before:
    ///   [jump to done on exit]        check_first only
    ///   [pop previous value]          expression context only
    ///   [body]
    ///   Goto before                   check_first
    ///   [jump to before on continue]  otherwise
    /// done:
    /// ```
    ///
    /// In expression context exactly one value is live at `done`, so a loop
    /// that never runs its body yields the placeholder default.
    pub(crate) fn compile_loop(&mut self, lp: &Loop<'_>, produces_value: bool) -> Result<MachineType> {
        let ty = if produces_value {
            self.ctx.map_type(&lp.inferred, lp.span)?
        } else {
            MachineType::Void
        };
        if produces_value && ty.is_void() {
            self.compile_loop(lp, false)?;
            return Ok(self.placeholder(&ty));
        }

        let before = self.emitter.new_label();
        let done = self.emitter.new_label();
        let carried = ty.stack_kind();

        if carried.is_some() {
            self.placeholder(&ty);
        }
        self.emitter.bind(before);

        if lp.check_first {
            self.compile_jump_if(&lp.condition, lp.negative, done)?;
        }
        if let Some(kind) = carried {
            self.emitter.emit_pop(kind);
        }

        self.compile_arm(&lp.body, &ty)?;

        if lp.check_first {
            self.emitter.emit_goto(before);
        } else {
            self.compile_jump_if(&lp.condition, !lp.negative, before)?;
        }
        self.emitter.bind(done);

        Ok(ty)
    }
}
