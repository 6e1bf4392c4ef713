//! Account and stored expense records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::expense::{ExpenseType, NormalizedExpense};

/// A user's account with their progression and recorded expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Lowercased email; the account key.
    pub email: String,

    pub first_name: String,

    pub last_name: String,

    /// Progression level, starting at 1.
    pub level: u32,

    /// Game currency balance.
    pub coins: u64,

    /// Spending budget; zero means unset.
    pub budget: Decimal,

    /// Recorded expenses, oldest first.
    #[serde(default)]
    pub expenses: Vec<Expense>,
}

impl Account {
    pub(crate) fn new(email: String, first_name: String, last_name: String, coins: u64) -> Self {
        Self {
            email,
            first_name,
            last_name,
            level: 1,
            coins,
            budget: Decimal::ZERO,
            expenses: Vec::new(),
        }
    }

    pub fn find_expense(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    pub(crate) fn find_expense_mut(&mut self, id: &str) -> Option<&mut Expense> {
        self.expenses.iter_mut().find(|e| e.id == id)
    }
}

/// A persisted expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique id assigned on insert.
    pub id: String,

    #[serde(rename = "expense-type")]
    pub expense_type: ExpenseType,

    pub date: NaiveDate,

    pub total: Decimal,

    #[serde(rename = "expense-name")]
    pub expense_name: String,
}

impl Expense {
    pub(crate) fn from_normalized(id: String, expense: &NormalizedExpense) -> Self {
        Self {
            id,
            expense_type: expense.expense_type,
            date: expense.date,
            total: expense.total,
            expense_name: expense.expense_name.trim().to_string(),
        }
    }

    pub(crate) fn apply(&mut self, expense: &NormalizedExpense) {
        self.expense_type = expense.expense_type;
        self.date = expense.date;
        self.total = expense.total;
        self.expense_name = expense.expense_name.trim().to_string();
    }
}
