//! Validation of user-typed names against the live set of categories.
//!
//! The valid names are whatever the store holds right now, so membership is
//! checked at input time rather than encoded in a type.

use strsim::levenshtein;

use crate::errors::LedgerError;

const SUGGESTION_DISTANCE: usize = 3;

/// Resolves `input` to one of `known`. An exact match wins; otherwise a
/// unique case-insensitive match is accepted.
pub fn resolve_category(known: &[String], input: &str) -> Result<String, LedgerError> {
    let trimmed = input.trim();
    if let Some(exact) = known.iter().find(|name| name.as_str() == trimmed) {
        return Ok(exact.clone());
    }
    let mut folded = known
        .iter()
        .filter(|name| name.eq_ignore_ascii_case(trimmed));
    match (folded.next(), folded.next()) {
        (Some(only), None) => Ok(only.clone()),
        _ => Err(LedgerError::category_not_found(trimmed)),
    }
}

/// Closest known name within a small edit distance, if any.
pub fn suggest<'a>(known: &'a [String], input: &str) -> Option<&'a str> {
    let needle = input.trim().to_lowercase();
    known
        .iter()
        .map(|name| (levenshtein(&name.to_lowercase(), &needle), name))
        .filter(|(distance, _)| *distance <= SUGGESTION_DISTANCE)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, name)| name.as_str())
}
