//! Extract command - turn one receipt's OCR text into an expense.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use piggy_core::NormalizedExpense;

use super::{build_extractor, ledger, load_config};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// OCR text file, or `-` to read stdin
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Record the expense on this account
    #[arg(long, value_name = "EMAIL")]
    record: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let ocr_text = read_input(&args.input)?;
    if ocr_text.trim().is_empty() {
        anyhow::bail!("No OCR text in {}", args.input);
    }

    info!("Extracting expense from {}", args.input);
    let extractor = build_extractor(&config)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Waiting for the generation service...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let result = extractor.extract(&ocr_text).await;
    pb.finish_and_clear();
    let expense = result?;

    let output = format_expense(&expense, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if let Some(email) = &args.record {
        let recorded = ledger::record(&config, email, &expense)?;
        println!(
            "{} Recorded expense {} for {}",
            style("✓").green(),
            recorded.id,
            email
        );
    }

    info!("Extraction finished in {:?}", start.elapsed());
    Ok(())
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    let path = PathBuf::from(input);
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    Ok(fs::read_to_string(&path)?)
}

pub fn format_expense(expense: &NormalizedExpense, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(expense)?),
        OutputFormat::Csv => format_csv(expense),
        OutputFormat::Text => Ok(format_text(expense)),
    }
}

fn format_csv(expense: &NormalizedExpense) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["expense-type", "date", "total", "expense-name"])?;
    wtr.write_record([
        expense.expense_type.as_str(),
        expense.date.to_string().as_str(),
        expense.total.to_string().as_str(),
        expense.expense_name.as_str(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(expense: &NormalizedExpense) -> String {
    let mut output = String::new();

    output.push_str(&format!("Expense: {}\n", expense.expense_name));
    output.push_str(&format!("Category: {}\n", expense.expense_type));
    output.push_str(&format!("Date: {}\n", expense.date));
    output.push_str(&format!("Total: {}\n", expense.total));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use piggy_core::ExpenseType;
    use rust_decimal::Decimal;

    fn expense() -> NormalizedExpense {
        NormalizedExpense {
            expense_type: ExpenseType::Wants,
            date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            total: Decimal::new(4250, 2),
            expense_name: "Sushi, dinner".to_string(),
        }
    }

    #[test]
    fn test_json_format() {
        let json = format_expense(&expense(), OutputFormat::Json).unwrap();
        assert_eq!(
            json,
            r#"{"expense-type":"wants","date":"2024-05-20","total":"42.50","expense-name":"Sushi, dinner"}"#
        );
    }

    #[test]
    fn test_csv_format_quotes_fields() {
        let csv = format_expense(&expense(), OutputFormat::Csv).unwrap();
        assert_eq!(
            csv,
            "expense-type,date,total,expense-name\nwants,2024-05-20,42.50,\"Sushi, dinner\"\n"
        );
    }

    #[test]
    fn test_text_format() {
        let text = format_expense(&expense(), OutputFormat::Text).unwrap();
        assert!(text.contains("Category: wants"));
        assert!(text.contains("Total: 42.50"));
    }
}
