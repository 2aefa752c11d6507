//! # Alternative-Resource Selector
//!
//! Picks one mechanism out of an ordered list of interchangeable ones.
//!
//! Selection happens exactly once, before the action runs. The first
//! available alternative wins; if the chosen mechanism then fails, that
//! failure is final and the remaining alternatives are never tried.

use crate::InstallError;

/// One candidate mechanism together with its availability.
pub struct Alternative<'a, T: ?Sized> {
    pub label: &'a str,
    pub available: bool,
    pub mechanism: &'a T,
}

/// Return the first available alternative.
///
/// `action` completes the "neither ... is available to ..." diagnostic.
pub fn select_first_available<'a, T: ?Sized>(
    alternatives: &[Alternative<'a, T>],
    action: &str,
) -> Result<&'a T, InstallError> {
    alternatives
        .iter()
        .find(|alt| alt.available)
        .map(|alt| alt.mechanism)
        .ok_or_else(|| InstallError::ResourceUnavailable {
            action: action.to_string(),
            candidates: alternatives.iter().map(|a| a.label.to_string()).collect(),
        })
}

// =============================================================================
// TESTS
// =============================================================================
