//! Contact-information extraction from free-form résumé text.
//!
//! Deliberately not an NLP layer: an email regex, an Indonesian phone
//! regex, and a line-position heuristic for the name. Extraction is a pure
//! function — absent fields are resolved by the caller through manual
//! entry before generation is allowed to run.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Résumés conventionally carry the applicant name near the top; only this
/// many leading lines are inspected for it.
const NAME_SCAN_LINES: usize = 10;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w.\-]+@[\w.\-]+").expect("email pattern compiles"));

// Digit-adjacency guard: the pattern wants negative lookaround on the digit
// stream, which this regex engine does not support. The leading guard is an
// explicit start-or-non-digit group with the number as capture 1; a trailing
// guard is unnecessary because the greedy repetition consumes every adjacent
// digit. Alternation order (+62, 08, 62) is significant.
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^0-9])((?:\+62|08|62)[0-9\s-]{8,})").expect("phone pattern compiles")
});

/// The contact triple derived from résumé text. Any `None` field must be
/// filled from manual user input before a letter can be generated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Scans résumé text for the applicant's name, email address, and phone
/// number. Pure and idempotent.
pub fn extract_contact(text: &str) -> ContactInfo {
    ContactInfo {
        name: extract_name(text),
        email: extract_email(text),
        phone: extract_phone(text),
    }
}

/// First `local-part@domain` token anywhere in the text, top to bottom.
fn extract_email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}

/// First Indonesian-style number: `+62`, `08`, or `62` followed by at least
/// eight digits/spaces/hyphens, not digit-adjacent on either side. The raw
/// match may end in whitespace consumed by the character class, so it is
/// trimmed before returning.
fn extract_phone(text: &str) -> Option<String> {
    PHONE_RE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}

/// First line among the leading `NAME_SCAN_LINES` that is non-empty after
/// trimming and starts with an uppercase letter.
fn extract_name(text: &str) -> Option<String> {
    text.lines()
        .take(NAME_SCAN_LINES)
        .map(str::trim)
        .find(|line| line.chars().next().is_some_and(char::is_uppercase))
        .map(str::to_string)
}
