//! Fallback values for fields the model did not deliver.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::expense::ExpenseType;

/// Name used when no usable expense name was extracted.
pub const UNKNOWN_EXPENSE: &str = "Unknown Expense";

/// Source of "today".
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// A clock stuck on one day.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Supplies the fallback for each extracted field.
///
/// Values are produced per call; the date default is the clock's current day.
#[derive(Clone)]
pub struct DefaultPolicy {
    clock: Arc<dyn Clock>,
}

impl DefaultPolicy {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
        }
    }

    pub fn expense_type(&self) -> ExpenseType {
        ExpenseType::Needs
    }

    pub fn date(&self) -> NaiveDate {
        self.clock.today()
    }

    /// `0.00`
    pub fn total(&self) -> Decimal {
        Decimal::new(0, 2)
    }

    pub fn expense_name(&self) -> String {
        UNKNOWN_EXPENSE.to_string()
    }
}

impl Default for DefaultPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DefaultPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultPolicy")
            .field("today", &self.clock.today())
            .finish()
    }
}
