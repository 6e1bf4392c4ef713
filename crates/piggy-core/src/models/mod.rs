//! Data models and configuration.

pub mod config;
pub mod expense;

pub use config::{ExtractionConfig, GenerationConfig, LedgerConfig, LlmConfig, PiggyConfig};
pub use expense::{CandidateRecord, ExpenseType, NormalizedExpense};
