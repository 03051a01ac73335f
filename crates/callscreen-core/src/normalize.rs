//! Phone number normalization.
//!
//! Numbers arrive formatted in whatever way the carrier or the user typed
//! them. Rules and lookups always work on the stripped form.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Characters used purely for presentation: whitespace, dashes,
    /// parentheses, dots and slashes.
    static ref FORMATTING_PATTERN: Regex = Regex::new(r"[\s\-()./]").unwrap();
}

/// Strip formatting characters from a phone number.
///
/// Everything else is kept verbatim, including a leading `+` and any
/// letters in alphanumeric sender ids.
pub fn normalize_number(raw: &str) -> String {
    FORMATTING_PATTERN.replace_all(raw, "").into_owned()
}
