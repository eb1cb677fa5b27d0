//! Separator-based word splitting.

use regex::Regex;

/// Splits `text` on `separator`, discarding empty tokens.
///
/// - "visual studio code" → ["visual", "studio", "code"]
/// - "--foo__bar " → ["foo", "bar"] with a separator covering `-` and `_`
pub fn tokenize<'a>(text: &'a str, separator: &Regex) -> Vec<&'a str> {
    separator.split(text).filter(|t| !t.is_empty()).collect()
}
