//! Sequences.

use tern_ast::Body;
use tern_core::MachineType;

use super::{ExprCompiler, Result};

/// Compile a body: every node but the last in statement context, the last
/// one in the body's own context. An empty body has no value.
pub fn compile_body(
    compiler: &mut ExprCompiler<'_>,
    body: &Body<'_>,
    produces_value: bool,
) -> Result<MachineType> {
    let Some((last, init)) = body.nodes.split_last() else {
        return Ok(compiler.finish_value(MachineType::Void, produces_value));
    };
    for node in init {
        compiler.compile(node, false)?;
    }
    compiler.compile(last, produces_value)
}
