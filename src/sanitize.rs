//! Text sanitization for BC3 output.
//!
//! Strips diacritics, drops control and replacement characters, and keeps
//! the structural delimiters `~`, `|` and `\` intact.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Sanitize text before it is written to a BC3 record
///
/// `"SEGÚN ©norma"` becomes `"SEGUN norma"`.
pub fn clean_text(text: &str) -> String {
    text.nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .filter(|ch| is_allowed(*ch))
        .collect()
}

fn is_allowed(ch: char) -> bool {
    // Graphic ASCII covers the `~ | \` delimiters as well
    ch.is_ascii_graphic() || ch.is_whitespace() || ch.is_alphanumeric()
}
