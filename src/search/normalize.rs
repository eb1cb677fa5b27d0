//! Case folding and diacritic stripping applied to queries and targets alike.

use crate::config::MatchConfig;
use std::borrow::Cow;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Normalize `text` according to `config`.
///
/// Returns `Cow::Borrowed` when the configuration leaves the text untouched.
pub fn normalize<'a>(text: &'a str, config: &MatchConfig) -> Cow<'a, str> {
    let mut text = Cow::Borrowed(text);

    if config.ignore_diacritics && !text.is_ascii() {
        text = Cow::Owned(strip_diacritics(&text));
    }

    if config.ignore_case && text.chars().any(char::is_uppercase) {
        text = Cow::Owned(text.to_lowercase());
    }

    text
}

/// Decompose to NFD and drop combining marks, so "Café" becomes "Cafe".
pub fn strip_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).nfc().collect()
}
