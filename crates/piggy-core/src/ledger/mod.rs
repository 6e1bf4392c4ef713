//! Accounts, recorded expenses, levels, coins and budgets.

mod account;
mod insights;
mod store;

pub use account::{Account, Expense};
pub use insights::BudgetSummary;
pub use store::{AccountStore, MemoryStore};

use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::LedgerError;
use crate::models::config::LedgerConfig;
use crate::models::expense::NormalizedExpense;
use crate::receipt::normalize::MAX_TOTAL;

type Result<T> = std::result::Result<T, LedgerError>;

/// Outcome of a level-up request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelUp {
    /// The account moved to this level.
    Advanced(u32),
    /// The account was already at the highest level.
    AtMaximum,
}

/// Account ledger over a pluggable store.
#[derive(Debug)]
pub struct Ledger<S> {
    store: S,
    config: LedgerConfig,
}

impl<S: AccountStore> Ledger<S> {
    pub fn new(store: S, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Register a new account with the starting coin balance.
    pub fn register(&mut self, email: &str, first_name: &str, last_name: &str) -> Result<Account> {
        let email = normalize_email(email)?;
        let account = Account::new(
            email.clone(),
            first_name.trim().to_string(),
            last_name.trim().to_string(),
            self.config.starting_coins,
        );
        self.store.insert(account.clone())?;
        info!(email = %email, "Registered account");
        Ok(account)
    }

    pub fn account(&self, email: &str) -> Result<Account> {
        let email = email.trim().to_lowercase();
        self.store
            .find(&email)
            .ok_or(LedgerError::AccountNotFound(email))
    }

    /// Change the account holder's name.
    pub fn update_account(
        &mut self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Account> {
        let account = self.modify(email, |account| {
            account.first_name = first_name.trim().to_string();
            account.last_name = last_name.trim().to_string();
            Ok(account.clone())
        })?;
        debug!(email = %account.email, "Updated account");
        Ok(account)
    }

    pub fn delete_account(&mut self, email: &str) -> Result<Account> {
        let account = self.store.delete(&email.trim().to_lowercase())?;
        info!(email = %account.email, "Deleted account");
        Ok(account)
    }

    /// Store an extracted expense and award the per-receipt coins.
    pub fn record_expense(&mut self, email: &str, expense: &NormalizedExpense) -> Result<Expense> {
        validate_expense(expense)?;
        let coins = self.config.coins_per_receipt;

        let recorded = self.modify(email, |account| {
            let recorded = Expense::from_normalized(Uuid::new_v4().to_string(), expense);
            account.expenses.push(recorded.clone());
            account.coins += coins;
            Ok(recorded)
        })?;

        info!(
            email = %email,
            id = %recorded.id,
            total = %recorded.total,
            "Recorded expense"
        );
        Ok(recorded)
    }

    pub fn expenses(&self, email: &str) -> Result<Vec<Expense>> {
        Ok(self.account(email)?.expenses)
    }

    pub fn expense(&self, email: &str, id: &str) -> Result<Expense> {
        self.account(email)?
            .find_expense(id)
            .cloned()
            .ok_or_else(|| LedgerError::ExpenseNotFound(id.to_string()))
    }

    /// Overwrite an expense's fields, keeping its id.
    pub fn update_expense(
        &mut self,
        email: &str,
        id: &str,
        expense: &NormalizedExpense,
    ) -> Result<Expense> {
        validate_expense(expense)?;
        self.modify(email, |account| {
            let existing = account
                .find_expense_mut(id)
                .ok_or_else(|| LedgerError::ExpenseNotFound(id.to_string()))?;
            existing.apply(expense);
            Ok(existing.clone())
        })
    }

    pub fn delete_expense(&mut self, email: &str, id: &str) -> Result<Expense> {
        self.modify(email, |account| {
            let index = account
                .expenses
                .iter()
                .position(|e| e.id == id)
                .ok_or_else(|| LedgerError::ExpenseNotFound(id.to_string()))?;
            Ok(account.expenses.remove(index))
        })
    }

    pub fn level(&self, email: &str) -> Result<u32> {
        Ok(self.account(email)?.level)
    }

    pub fn set_level(&mut self, email: &str, level: u32) -> Result<()> {
        let max = self.config.max_level;
        if level == 0 || level > max {
            return Err(LedgerError::InvalidLevel { level, max });
        }
        self.modify(email, |account| {
            account.level = level;
            Ok(())
        })
    }

    /// Advance one level unless already at the maximum.
    pub fn level_up(&mut self, email: &str) -> Result<LevelUp> {
        let max = self.config.max_level;
        self.modify(email, |account| {
            if account.level >= max {
                debug!(email = %account.email, "Already at maximum level");
                return Ok(LevelUp::AtMaximum);
            }
            account.level += 1;
            Ok(LevelUp::Advanced(account.level))
        })
    }

    /// Deduct coins, returning the remaining balance.
    pub fn spend_coins(&mut self, email: &str, cost: u64) -> Result<u64> {
        self.modify(email, |account| {
            if account.coins < cost {
                return Err(LedgerError::InsufficientCoins {
                    available: account.coins,
                    required: cost,
                });
            }
            account.coins -= cost;
            Ok(account.coins)
        })
    }

    pub fn set_budget(&mut self, email: &str, budget: Decimal) -> Result<()> {
        if (budget.is_sign_negative() && !budget.is_zero()) || budget > MAX_TOTAL {
            return Err(LedgerError::InvalidBudget(budget.to_string()));
        }
        self.modify(email, |account| {
            account.budget = budget.round_dp(2);
            Ok(())
        })
    }

    pub fn summary(&self, email: &str) -> Result<BudgetSummary> {
        let account = self.account(email)?;
        BudgetSummary::from_expenses(&account.expenses, account.budget)
    }

    /// Load, change and write back one account. Nothing is written on error.
    fn modify<T>(
        &mut self,
        email: &str,
        change: impl FnOnce(&mut Account) -> Result<T>,
    ) -> Result<T> {
        let mut account = self.account(email)?;
        let out = change(&mut account)?;
        self.store.update(account)?;
        Ok(out)
    }
}

fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let valid = email.split_once('@').is_some_and(|(local, domain)| {
        !local.is_empty() && !domain.is_empty() && !domain.contains('@')
    });
    if valid {
        Ok(email)
    } else {
        Err(LedgerError::InvalidEmail(email))
    }
}

fn validate_expense(expense: &NormalizedExpense) -> Result<()> {
    if expense.total.is_sign_negative() && !expense.total.is_zero() {
        return Err(LedgerError::InvalidExpense(format!(
            "negative total {}",
            expense.total
        )));
    }
    if expense.total > MAX_TOTAL {
        return Err(LedgerError::InvalidExpense(format!(
            "total {} exceeds {}",
            expense.total, MAX_TOTAL
        )));
    }
    if expense.expense_name.trim().is_empty() {
        return Err(LedgerError::InvalidExpense("empty expense name".to_string()));
    }
    Ok(())
}
