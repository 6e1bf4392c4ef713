//! Error types for the piggy-core library.

use thiserror::Error;

/// Main error type for the piggy library.
#[derive(Error, Debug)]
pub enum PiggyError {
    /// Receipt extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Ledger error.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors surfaced by the receipt extraction pipeline.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The generation service could not produce a reply: transport error,
    /// timeout, non-2xx status or an unexpected top-level response shape.
    #[error("generation service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The generated text held no brace-delimited block.
    #[error(transparent)]
    NoStructure(#[from] NoStructureFound),
}

/// Raised by field parsers when no `{...}` span exists in the input.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no structured block found in generated text")]
pub struct NoStructureFound;

/// Errors related to accounts and recorded expenses.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LedgerError {
    /// An account with this email already exists.
    #[error("account already registered: {0}")]
    DuplicateAccount(String),

    /// No account for this email.
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// No expense with this id on the account.
    #[error("expense not found: {0}")]
    ExpenseNotFound(String),

    /// Email failed basic validation.
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    /// Expense fields could not be converted.
    #[error("invalid expense: {0}")]
    InvalidExpense(String),

    /// Level outside the allowed range.
    #[error("invalid level {level}: must be between 1 and {max}")]
    InvalidLevel { level: u32, max: u32 },

    /// Budget must not be negative.
    #[error("invalid budget: {0}")]
    InvalidBudget(String),

    /// Totals too large to add up.
    #[error("amount overflow while summing {0}")]
    AmountOverflow(String),

    /// Not enough coins for the requested spend.
    #[error("insufficient coins: have {available}, need {required}")]
    InsufficientCoins { available: u64, required: u64 },
}

/// Result type for the piggy library.
pub type Result<T> = std::result::Result<T, PiggyError>;
