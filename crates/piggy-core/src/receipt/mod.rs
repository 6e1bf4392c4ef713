//! Receipt-to-expense extraction.
//!
//! OCR text goes through a generation model; the reply is parsed leniently,
//! its category is reconciled with the fixed set and every missing or invalid
//! field is replaced by a safe default.

pub mod category;
pub mod defaults;
mod extractor;
pub mod normalize;
mod parser;
pub mod patterns;
pub mod prompt;

pub use category::CategoryReconciler;
pub use defaults::{Clock, DefaultPolicy, FixedClock, SystemClock};
pub use extractor::ReceiptExtractor;
pub use parser::LenientJsonParser;
pub use prompt::PromptTemplate;

use crate::error::NoStructureFound;
use crate::models::expense::CandidateRecord;

/// Trait for recovering a flat field map from generated text.
pub trait FieldParser {
    /// Parse `text`, failing only when it holds no structure at all.
    fn parse(&self, text: &str) -> Result<CandidateRecord, NoStructureFound>;
}
