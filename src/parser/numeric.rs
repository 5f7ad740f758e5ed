//! Locale-tolerant numeric parsing
//!
//! BC3 producers write decimals with either a comma or a dot. Anything that
//! does not look like a plain decimal is treated as absent, never as an error.

use regex::Regex;
use std::sync::LazyLock;

static NUMBER_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+(?:[.,][0-9]+)?$").expect("valid number regex"));

/// Parse `"1234,56"` or `"1234.56"` into a float, or `None` for any other shape
pub fn parse_number(text: &str) -> Option<f64> {
    if !NUMBER_SHAPE.is_match(text) {
        return None;
    }
    text.replace(',', ".").parse::<f64>().ok()
}
