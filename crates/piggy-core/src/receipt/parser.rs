//! Lenient recovery of flat `key: value` records from model replies.

use tracing::trace;

use super::patterns::KEY_VALUE;
use super::FieldParser;
use crate::error::NoStructureFound;
use crate::models::expense::CandidateRecord;

/// Parser for replies that only approximately contain a JSON object.
///
/// The model may wrap the object in commentary, leave quotes unbalanced or
/// get cut off mid-value. Everything between the first `{` and the last `}`
/// is scanned for `key: value` pairs; whatever parses is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientJsonParser;

impl LenientJsonParser {
    pub fn new() -> Self {
        Self
    }

    /// The first `{` through the last `}` following it, inclusive.
    pub fn locate_block(text: &str) -> Option<&str> {
        let start = text.find('{')?;
        let end = text.rfind('}')?;
        (end > start).then(|| &text[start..=end])
    }
}

impl FieldParser for LenientJsonParser {
    fn parse(&self, text: &str) -> Result<CandidateRecord, NoStructureFound> {
        let block = Self::locate_block(text).ok_or(NoStructureFound)?;

        let mut record = CandidateRecord::new();
        for caps in KEY_VALUE.captures_iter(block) {
            let key = clean(&caps[1]);
            let value = clean(&caps[2]);
            if key.is_empty() || value.is_empty() {
                continue;
            }
            trace!(key = %key, value = %value, "Recovered field");
            record.insert(key, value);
        }

        Ok(record)
    }
}

fn clean(token: &str) -> String {
    token.replace('"', "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Result<CandidateRecord, NoStructureFound> {
        LenientJsonParser::new().parse(text)
    }

    #[test]
    fn test_well_formed_block() {
        let record = parse(
            r#"{"expense-type": "wants", "date": "2024-01-15", "total": "42.50", "expense-name": "Pizza night"}"#,
        )
        .unwrap();

        assert_eq!(record.len(), 4);
        assert_eq!(record["expense-type"], "wants");
        assert_eq!(record["date"], "2024-01-15");
        assert_eq!(record["total"], "42.50");
        assert_eq!(record["expense-name"], "Pizza night");
    }

    #[test]
    fn test_block_wrapped_in_commentary() {
        let text = "Sure! Here is the JSON you asked for:\n\n{\n  \"expense-type\": \"needs\",\n  \"date\": \"2023-11-02\",\n  \"total\": 18.75,\n  \"expense-name\": \"Groceries\"\n}\n\nLet me know if you need anything else.";
        let record = parse(text).unwrap();

        assert_eq!(record["expense-type"], "needs");
        assert_eq!(record["date"], "2023-11-02");
        assert_eq!(record["total"], "18.75");
        assert_eq!(record["expense-name"], "Groceries");
    }

    #[test]
    fn test_unquoted_keys_and_values() {
        let record = parse("{expense-type: savings, total: 60.00, expense-name: Gas}").unwrap();

        assert_eq!(record["expense-type"], "savings");
        assert_eq!(record["total"], "60.00");
        assert_eq!(record["expense-name"], "Gas");
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let record = parse(r#"{"total": "1.00", "total": "2.00"}"#).unwrap();
        assert_eq!(record["total"], "2.00");
    }

    #[test]
    fn test_unexpected_keys_are_kept() {
        let record = parse(r#"{"store": "Corner Shop", "total": "4.20"}"#).unwrap();
        assert_eq!(record["store"], "Corner Shop");
        assert_eq!(record["total"], "4.20");
    }

    #[test]
    fn test_value_with_colon() {
        let record = parse(r#"{"time": "12:30", "expense-name": "Lunch"}"#).unwrap();
        assert_eq!(record["time"], "12:30");
        assert_eq!(record["expense-name"], "Lunch");
    }

    #[test]
    fn test_malformed_content_degrades() {
        let record = parse(r#"{"expense-type": "wants", "total": , garbage }"#).unwrap();
        assert_eq!(record["expense-type"], "wants");
        assert!(!record.contains_key("total"));

        assert!(parse("{}").unwrap().is_empty());
        assert!(parse("{ ,,, }").unwrap().is_empty());
    }

    #[test]
    fn test_no_braces() {
        assert_eq!(parse("no json here at all"), Err(NoStructureFound));
        assert_eq!(parse(""), Err(NoStructureFound));
    }

    #[test]
    fn test_unclosed_or_reversed_braces() {
        assert_eq!(parse(r#"{"total": "5.00""#), Err(NoStructureFound));
        assert_eq!(parse("} backwards {"), Err(NoStructureFound));
    }

    #[test]
    fn test_locate_block_spans_first_to_last_brace() {
        assert_eq!(
            LenientJsonParser::locate_block("a {x: 1} b {y: 2} c"),
            Some("{x: 1} b {y: 2}")
        );
    }
}
