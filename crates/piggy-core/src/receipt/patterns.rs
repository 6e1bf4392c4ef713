//! Regex patterns for lenient field recovery and value normalization.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // `key: value` inside a loosely JSON-shaped block. Either side may be
    // quoted; the value stops at a comma, quote or closing brace.
    pub static ref KEY_VALUE: Regex = Regex::new(
        r#""?([^",{}:]+)"?\s*:\s*"?([^",}]+)"?"#
    ).unwrap();

    // Dates
    pub static ref DATE_YMD: Regex = Regex::new(
        r"\b(\d{4})[./\-](\d{1,2})[./\-](\d{1,2})\b"
    ).unwrap();

    pub static ref DATE_SLASH: Regex = Regex::new(
        r"\b(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})\b"
    ).unwrap();

    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[.\-](\d{1,2})[.\-](\d{4}|\d{2})\b"
    ).unwrap();

    // Amounts: digits with optional thousands separators and decimals
    pub static ref AMOUNT: Regex = Regex::new(
        r"\d[\d\s\u{00a0},.]*"
    ).unwrap();
}
