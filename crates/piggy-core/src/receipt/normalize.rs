//! Normalization of raw date and total strings from model replies.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::patterns::{AMOUNT, DATE_DMY, DATE_SLASH, DATE_YMD};

/// Spelled-out month formats tried after the numeric patterns.
const TEXT_DATE_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Largest total accepted from a model reply: twelve integer digits.
pub const MAX_TOTAL: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Parse a date the model produced, tolerating common receipt formats.
///
/// ISO `YYYY-MM-DD` (any of `-`, `/`, `.` as separator) is tried first.
/// Slash dates are month-first unless `day_first` is set; when the preferred
/// reading is not a real date the other reading is tried. Dot and dash
/// separated short dates are always day-first.
pub fn normalize_date(raw: &str, day_first: bool) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Some(caps) = DATE_YMD.captures(raw) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = DATE_SLASH.captures(raw) {
        let first: u32 = caps[1].parse().ok()?;
        let second: u32 = caps[2].parse().ok()?;
        let year = parse_year(&caps[3]);
        let (month, day) = if day_first { (second, first) } else { (first, second) };
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .or_else(|| NaiveDate::from_ymd_opt(year, day, month));
        if date.is_some() {
            return date;
        }
    }

    if let Some(caps) = DATE_DMY.captures(raw) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year = parse_year(&caps[3]);
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    TEXT_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Parse a non-negative total such as `42.5`, `$1,234.50` or `12,99 EUR`.
///
/// The result always carries two decimal places. Negative amounts, amounts
/// above [`MAX_TOTAL`] and text without digits yield `None`.
pub fn normalize_total(raw: &str) -> Option<Decimal> {
    let m = AMOUNT.find(raw)?;
    if raw[..m.start()].contains('-') {
        return None;
    }

    let cleaned: String = m
        .as_str()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();
    let cleaned = cleaned.trim_end_matches(['.', ',']);

    let mut amount = Decimal::from_str(&normalize_separators(cleaned)).ok()?;
    if amount.is_sign_negative() || amount > MAX_TOTAL {
        return None;
    }
    amount = amount.round_dp(2);
    amount.rescale(2);
    (amount.scale() == 2).then_some(amount)
}

/// Decide which separator is decimal and drop the thousands separators.
fn normalize_separators(s: &str) -> String {
    let last_comma = s.rfind(',');
    let last_dot = s.rfind('.');

    match (last_comma, last_dot) {
        // Both present: whichever comes last is the decimal separator
        (Some(c), Some(d)) if c > d => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(c), None) => {
            if s.matches(',').count() == 1 && s.len() - c - 1 != 3 {
                s.replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
        (None, Some(d)) => {
            if s.matches('.').count() > 1 {
                if s.len() - d - 1 == 3 {
                    s.replace('.', "")
                } else {
                    let (int_part, frac) = s.split_at(d);
                    format!("{}{}", int_part.replace('.', ""), frac)
                }
            } else {
                s.to_string()
            }
        }
        (None, None) => s.to_string(),
    }
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        // Two-digit year: 00-50 is 2000s, 51-99 is 1900s
        if year <= 50 {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    }
}
