//! Specificity ranking for overload resolution.
//!
//! A candidate is more specific than another when each of its parameters is
//! assignable to the other's parameter at the same position. The winner must
//! be strictly more specific than every other applicable candidate.

use tern_core::MethodCandidate;
use tern_registry::HostRegistry;

use crate::conversion::is_assignable;

/// Whether every parameter of `a` is assignable to the matching one of `b`.
pub fn is_more_specific(registry: &HostRegistry, a: &MethodCandidate, b: &MethodCandidate) -> bool {
    a.params.len() == b.params.len()
        && a
            .params
            .iter()
            .zip(&b.params)
            .all(|(pa, pb)| is_assignable(registry, pa, pb))
}

/// Pick the unique most specific candidate, or `None` on ambiguity.
pub fn find_most_specific<'c>(
    registry: &HostRegistry,
    applicable: &[&'c MethodCandidate],
) -> Option<&'c MethodCandidate> {
    if let [only] = applicable {
        return Some(*only);
    }

    let winners: Vec<&'c MethodCandidate> = applicable
        .iter()
        .enumerate()
        .filter(|(index, candidate)| {
            applicable.iter().enumerate().all(|(other_index, other)| {
                other_index == *index
                    || (is_more_specific(registry, candidate, other)
                        && !is_more_specific(registry, other, candidate))
            })
        })
        .map(|(_, candidate)| *candidate)
        .collect();

    match winners.as_slice() {
        [winner] => Some(*winner),
        _ => None,
    }
}
