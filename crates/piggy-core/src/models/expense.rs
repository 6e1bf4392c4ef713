//! Expense categories and the normalized extraction record.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Wire key for the category field in generated text.
pub const EXPENSE_TYPE_KEY: &str = "expense-type";
/// Wire key for the date field.
pub const DATE_KEY: &str = "date";
/// Wire key for the total field.
pub const TOTAL_KEY: &str = "total";
/// Wire key for the name field.
pub const EXPENSE_NAME_KEY: &str = "expense-name";

/// Flat field map recovered from a model reply. Values are unvalidated.
pub type CandidateRecord = HashMap<String, String>;

/// Budget category of an expense.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseType {
    /// Food, groceries, household essentials.
    #[default]
    Needs,
    /// Restaurants, entertainment, luxury items.
    Wants,
    /// Gas, bills, utilities.
    Savings,
}

impl ExpenseType {
    /// Every valid category, in preference order.
    pub const ALL: [ExpenseType; 3] = [
        ExpenseType::Needs,
        ExpenseType::Wants,
        ExpenseType::Savings,
    ];

    /// Label used in prompts and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseType::Needs => "needs",
            ExpenseType::Wants => "wants",
            ExpenseType::Savings => "savings",
        }
    }

    /// Exact label lookup. Use the category reconciler for fuzzy input.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == label)
    }
}


impl fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The output of one receipt extraction. Every field is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedExpense {
    /// Reconciled category.
    #[serde(rename = "expense-type")]
    pub expense_type: ExpenseType,

    /// Receipt date, or the extraction day when none was usable.
    pub date: NaiveDate,

    /// Non-negative total with two decimal places.
    pub total: Decimal,

    /// Short description of the purchase.
    #[serde(rename = "expense-name")]
    pub expense_name: String,
}
