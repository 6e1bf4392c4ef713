//! Ledger command - accounts, expenses, levels, coins and budgets.

use clap::{Args, Subcommand};
use console::style;
use rust_decimal::Decimal;
use tracing::debug;

use piggy_core::{
    Expense, ExpenseType, Ledger, LevelUp, MemoryStore, NormalizedExpense, PiggyConfig,
};

use super::load_config;

/// Arguments for the ledger command.
#[derive(Args)]
pub struct LedgerArgs {
    #[command(subcommand)]
    command: LedgerCommand,
}

#[derive(Subcommand)]
enum LedgerCommand {
    /// Register a new account
    Register {
        email: String,
        first_name: String,
        last_name: String,
    },

    /// Show an account
    Show { email: String },

    /// Change the account holder's name
    Rename {
        email: String,
        first_name: String,
        last_name: String,
    },

    /// Delete an account and all its expenses
    Delete { email: String },

    /// List recorded expenses
    Expenses {
        email: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a recorded expense
    RemoveExpense { email: String, id: String },

    /// Advance one level
    LevelUp { email: String },

    /// Set the spending budget
    Budget { email: String, amount: String },

    /// Spend coins
    Spend { email: String, coins: u64 },

    /// Show spending per category against the budget
    Summary { email: String },
}

pub fn run(args: LedgerArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let mut ledger = open(&config)?;

    match args.command {
        LedgerCommand::Register {
            email,
            first_name,
            last_name,
        } => {
            let account = ledger.register(&email, &first_name, &last_name)?;
            save(&ledger, &config)?;
            println!(
                "{} Registered {} with {} coins",
                style("✓").green(),
                account.email,
                account.coins
            );
        }
        LedgerCommand::Show { email } => {
            let account = ledger.account(&email)?;
            println!(
                "Account: {} {} <{}>",
                account.first_name, account.last_name, account.email
            );
            println!("Level:   {}", account.level);
            println!("Coins:   {}", account.coins);
            println!("Budget:  {}", account.budget);
            println!("Expenses: {}", account.expenses.len());
        }
        LedgerCommand::Rename {
            email,
            first_name,
            last_name,
        } => {
            let account = ledger.update_account(&email, &first_name, &last_name)?;
            save(&ledger, &config)?;
            println!(
                "{} Renamed {} to {} {}",
                style("✓").green(),
                account.email,
                account.first_name,
                account.last_name
            );
        }
        LedgerCommand::Delete { email } => {
            let account = ledger.delete_account(&email)?;
            save(&ledger, &config)?;
            println!("{} Deleted {}", style("✓").green(), account.email);
        }
        LedgerCommand::Expenses { email, json } => {
            let expenses = ledger.expenses(&email)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&expenses)?);
            } else if expenses.is_empty() {
                println!("{} No expenses recorded", style("ℹ").blue());
            } else {
                for expense in &expenses {
                    println!(
                        "{}  {}  {:>10}  {:<8} {}",
                        expense.id,
                        expense.date,
                        expense.total,
                        expense.expense_type,
                        expense.expense_name
                    );
                }
            }
        }
        LedgerCommand::RemoveExpense { email, id } => {
            let removed = ledger.delete_expense(&email, &id)?;
            save(&ledger, &config)?;
            println!(
                "{} Removed {} ({})",
                style("✓").green(),
                removed.expense_name,
                removed.id
            );
        }
        LedgerCommand::LevelUp { email } => {
            match ledger.level_up(&email)? {
                LevelUp::Advanced(level) => {
                    save(&ledger, &config)?;
                    println!("{} Now at level {}", style("✓").green(), level);
                }
                LevelUp::AtMaximum => {
                    println!(
                        "{} Already at the maximum level ({})",
                        style("ℹ").blue(),
                        config.ledger.max_level
                    );
                }
            }
        }
        LedgerCommand::Budget { email, amount } => {
            let budget: Decimal = amount
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid amount {}: {}", amount, e))?;
            ledger.set_budget(&email, budget)?;
            save(&ledger, &config)?;
            println!("{} Budget set to {}", style("✓").green(), budget.round_dp(2));
        }
        LedgerCommand::Spend { email, coins } => {
            let remaining = ledger.spend_coins(&email, coins)?;
            save(&ledger, &config)?;
            println!(
                "{} Spent {} coins, {} left",
                style("✓").green(),
                coins,
                remaining
            );
        }
        LedgerCommand::Summary { email } => {
            let summary = ledger.summary(&email)?;
            for kind in ExpenseType::ALL {
                println!(
                    "{:<8} {:>10}  ({}%)",
                    kind.as_str(),
                    summary.spent(kind),
                    summary.share(kind)
                );
            }
            println!("Spent:   {}", summary.total_spent);
            if summary.budget.is_zero() {
                println!("Budget:  {}", style("not set").yellow());
            } else {
                println!("Budget:  {}", summary.budget);
                let remaining = if summary.over_budget {
                    style(summary.remaining.to_string()).red()
                } else {
                    style(summary.remaining.to_string()).green()
                };
                println!("Left:    {}", remaining);
            }
        }
    }

    Ok(())
}

/// Record an extracted expense and persist the ledger.
pub fn record(
    config: &PiggyConfig,
    email: &str,
    expense: &NormalizedExpense,
) -> anyhow::Result<Expense> {
    let mut ledger = open(config)?;
    let recorded = ledger.record_expense(email, expense)?;
    save(&ledger, config)?;
    Ok(recorded)
}

fn open(config: &PiggyConfig) -> anyhow::Result<Ledger<MemoryStore>> {
    let path = &config.ledger.store_path;
    debug!("Opening ledger at {}", path.display());
    let store = MemoryStore::load(path)?;
    Ok(Ledger::new(store, config.ledger.clone()))
}

fn save(ledger: &Ledger<MemoryStore>, config: &PiggyConfig) -> anyhow::Result<()> {
    ledger.store().save(&config.ledger.store_path)?;
    Ok(())
}
