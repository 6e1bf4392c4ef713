//! Core library for receipt-driven expense tracking.
//!
//! This crate provides:
//! - Receipt extraction: OCR text to a normalized expense via a text generation service
//! - Lenient field parsing, fuzzy category reconciliation and safe defaulting
//! - An HTTP client for the generation service with timeout and bounded retry
//! - A ledger of accounts, expenses, levels, coins and budgets

pub mod error;
pub mod ledger;
pub mod llm;
pub mod models;
pub mod receipt;

pub use error::{ExtractionError, LedgerError, NoStructureFound, PiggyError, Result};
pub use ledger::{Account, AccountStore, BudgetSummary, Expense, Ledger, LevelUp, MemoryStore};
pub use llm::{HttpGenerator, TextGenerator};
pub use models::config::{ExtractionConfig, GenerationConfig, LedgerConfig, LlmConfig, PiggyConfig};
pub use models::expense::{CandidateRecord, ExpenseType, NormalizedExpense};
pub use receipt::{
    CategoryReconciler, DefaultPolicy, FieldParser, LenientJsonParser, PromptTemplate,
    ReceiptExtractor,
};
