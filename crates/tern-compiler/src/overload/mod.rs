//! Overload resolution for member calls.
//!
//! ## Algorithm
//!
//! 1. Collect members named `name` with matching static-ness on the receiver
//!    class and its supertypes (constructors only from the class itself)
//! 2. Keep the applicable ones: same arity, each argument assignable to its
//!    parameter
//! 3. Select the unique candidate more specific than every other applicable
//!    candidate; report ambiguity otherwise

mod ranking;

pub use ranking::{find_most_specific, is_more_specific};

use tern_core::{ClassRef, CompilationError, MachineType, MethodCandidate, Span, format_arg_types};
use tern_registry::HostRegistry;

use crate::conversion::is_assignable;

/// Whether `candidate` accepts arguments of `args` types.
pub fn is_applicable(registry: &HostRegistry, candidate: &MethodCandidate, args: &[MachineType]) -> bool {
    candidate.params.len() == args.len()
        && args
            .iter()
            .zip(&candidate.params)
            .all(|(arg, param)| is_assignable(registry, arg, param))
}

/// Resolve `receiver.name(args)` to a single member.
///
/// # Errors
///
/// * `NoApplicableMethod` - no candidate accepts the arguments
/// * `AmbiguousCall` - several candidates apply and none is strictly more
///   specific than all the others
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn resolve_method(
    registry: &HostRegistry,
    receiver: &ClassRef,
    name: &str,
    args: &[MachineType],
    is_static: bool,
    span: Span,
) -> Result<MethodCandidate, CompilationError> {
    let applicable: Vec<&MethodCandidate> = registry
        .members(&receiver.name, name, is_static)
        .into_iter()
        .filter(|candidate| is_applicable(registry, candidate, args))
        .collect();

    if applicable.is_empty() {
        return Err(CompilationError::NoApplicableMethod {
            owner: receiver.name.clone(),
            name: name.to_string(),
            args: format_arg_types(args),
            span,
        });
    }

    match find_most_specific(registry, &applicable) {
        Some(winner) => {
            tracing::debug!(
                call = %format!("{}.{}({})", receiver.name, name, format_arg_types(args)),
                resolved = %winner,
                "resolved method"
            );
            Ok(winner.clone())
        }
        None => Err(CompilationError::AmbiguousCall {
            owner: receiver.name.clone(),
            name: name.to_string(),
            args: format_arg_types(args),
            candidates: applicable
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" or "),
            span,
        }),
    }
}
