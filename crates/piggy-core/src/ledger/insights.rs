//! Budget insights over recorded expenses.

use rust_decimal::Decimal;
use serde::Serialize;

use super::account::Expense;
use crate::error::LedgerError;
use crate::models::expense::ExpenseType;

/// Spending per category against the account budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetSummary {
    pub needs: Decimal,
    pub wants: Decimal,
    pub savings: Decimal,
    pub total_spent: Decimal,
    pub budget: Decimal,
    /// Budget minus spending; negative when overspent.
    pub remaining: Decimal,
    /// Set only when a budget exists and spending exceeds it.
    pub over_budget: bool,
}

impl BudgetSummary {
    /// Fails with [`LedgerError::AmountOverflow`] when the totals do not fit
    /// in a `Decimal`.
    pub fn from_expenses(expenses: &[Expense], budget: Decimal) -> Result<Self, LedgerError> {
        let overflow = |what: &str| LedgerError::AmountOverflow(what.to_string());
        let spent = |kind: ExpenseType| -> Result<Decimal, LedgerError> {
            expenses
                .iter()
                .filter(|e| e.expense_type == kind)
                .try_fold(Decimal::ZERO, |acc, e| acc.checked_add(e.total))
                .ok_or_else(|| overflow(kind.as_str()))
        };

        let needs = spent(ExpenseType::Needs)?;
        let wants = spent(ExpenseType::Wants)?;
        let savings = spent(ExpenseType::Savings)?;
        let total_spent = needs
            .checked_add(wants)
            .and_then(|t| t.checked_add(savings))
            .ok_or_else(|| overflow("total spent"))?;
        let remaining = budget
            .checked_sub(total_spent)
            .ok_or_else(|| overflow("remaining budget"))?;

        Ok(Self {
            needs,
            wants,
            savings,
            total_spent,
            budget,
            remaining,
            over_budget: budget > Decimal::ZERO && total_spent > budget,
        })
    }

    /// Amount spent in one category.
    pub fn spent(&self, kind: ExpenseType) -> Decimal {
        match kind {
            ExpenseType::Needs => self.needs,
            ExpenseType::Wants => self.wants,
            ExpenseType::Savings => self.savings,
        }
    }

    /// Share of total spending in one category, as a percentage.
    pub fn share(&self, kind: ExpenseType) -> Decimal {
        if self.total_spent.is_zero() {
            return Decimal::ZERO;
        }
        (self.spent(kind) / self.total_spent * Decimal::ONE_HUNDRED).round_dp(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn expense(kind: ExpenseType, cents: i64) -> Expense {
        Expense {
            id: format!("{}-{}", kind, cents),
            expense_type: kind,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            total: Decimal::new(cents, 2),
            expense_name: "x".to_string(),
        }
    }

    #[test]
    fn test_totals_per_category() {
        let expenses = vec![
            expense(ExpenseType::Needs, 1000),
            expense(ExpenseType::Needs, 550),
            expense(ExpenseType::Wants, 2000),
            expense(ExpenseType::Savings, 450),
        ];
        let summary = BudgetSummary::from_expenses(&expenses, Decimal::new(10000, 2)).unwrap();

        assert_eq!(summary.needs, Decimal::new(1550, 2));
        assert_eq!(summary.wants, Decimal::new(2000, 2));
        assert_eq!(summary.savings, Decimal::new(450, 2));
        assert_eq!(summary.total_spent, Decimal::new(4000, 2));
        assert_eq!(summary.remaining, Decimal::new(6000, 2));
        assert!(!summary.over_budget);
        assert_eq!(summary.share(ExpenseType::Wants), Decimal::new(500, 1));
    }

    #[test]
    fn test_over_budget() {
        let expenses = vec![expense(ExpenseType::Wants, 12000)];
        let summary = BudgetSummary::from_expenses(&expenses, Decimal::new(100, 0)).unwrap();
        assert!(summary.over_budget);
        assert_eq!(summary.remaining, Decimal::new(-2000, 2));
    }

    #[test]
    fn test_no_budget_is_never_over() {
        let expenses = vec![expense(ExpenseType::Needs, 500)];
        let summary = BudgetSummary::from_expenses(&expenses, Decimal::ZERO).unwrap();
        assert!(!summary.over_budget);
    }

    #[test]
    fn test_empty() {
        let summary = BudgetSummary::from_expenses(&[], Decimal::ZERO).unwrap();
        assert!(summary.total_spent.is_zero());
        assert!(summary.share(ExpenseType::Needs).is_zero());
    }

    #[test]
    fn test_overflowing_totals_are_an_error() {
        let mut huge = expense(ExpenseType::Wants, 0);
        huge.total = Decimal::MAX;
        let expenses = vec![huge.clone(), huge];

        assert_eq!(
            BudgetSummary::from_expenses(&expenses, Decimal::ZERO),
            Err(LedgerError::AmountOverflow("wants".to_string()))
        );
    }

    #[test]
    fn test_overflowing_remaining_is_an_error() {
        let mut huge = expense(ExpenseType::Needs, 0);
        huge.total = Decimal::MAX;

        assert_eq!(
            BudgetSummary::from_expenses(&[huge], Decimal::MIN),
            Err(LedgerError::AmountOverflow("remaining budget".to_string()))
        );
    }
}
