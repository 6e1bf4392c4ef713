//! Instruction template sent ahead of the OCR text.

const RECEIPT_INSTRUCTIONS: &str = "\
You are an AI assistant that processes noisy receipt data extracted by OCR.
Analyze the following receipt data and return ONLY a JSON object containing:
- expense-type (choose ONLY one from: \"needs\" [ie. food, groceries, household essentials, etc], \"wants\" [ie. restaurants, entertainment, luxury items, etc], \"savings\" [ie. gas, bills, utilities, etc])
- date (if no valid date is found, use today's date; if a date is found, use the date from the receipt, even if partially formatted). return in YYYY-MM-DD format.
- total (extract the total amount from the receipt, choosing the last or most logical total in case multiple totals are found)
- expense-name (generate a brief name based on the contents of the receipt, focusing on the most expensive or relevant items)

Guidelines:
- Ignore any unreadable or irrelevant characters (like repeated letters, garbled text, or invalid time formats) caused by OCR errors.
- Focus on identifying dates, totals, and main items mentioned in the receipt.
- If any data is unclear due to OCR issues, use reasonable defaults (e.g., today's date for missing dates).

Return only the JSON object, no other text or characters.

Receipt data:
";

/// Immutable preamble that frames OCR text as an extraction request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    preamble: String,
}

impl PromptTemplate {
    /// Template with a caller-supplied preamble.
    pub fn new(preamble: impl Into<String>) -> Self {
        Self {
            preamble: preamble.into(),
        }
    }

    /// The preamble text.
    pub fn preamble(&self) -> &str {
        &self.preamble
    }

    /// Preamble followed directly by the OCR text.
    pub fn render(&self, ocr_text: &str) -> String {
        let mut prompt = String::with_capacity(self.preamble.len() + ocr_text.len());
        prompt.push_str(&self.preamble);
        prompt.push_str(ocr_text);
        prompt
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(RECEIPT_INSTRUCTIONS)
    }
}
