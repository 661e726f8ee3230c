//! Budget Prognosis CLI
//!
//! Loads the account and transaction sheets, runs the projection, and
//! writes the monthly prognosis report.

use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use budget_prognosis::projection::{ProjectionConfig, ProjectionEngine};
use budget_prognosis::report;
use budget_prognosis::ledger;
use chrono::Local;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "budget_prognosis",
    about = "Project future account balances from recurring transactions"
)]
struct Args {
    /// Path to the accounts sheet (CSV)
    accounts: PathBuf,

    /// Path to the transactions sheet (CSV)
    transactions: PathBuf,

    /// Output folder for the prognosis report
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// Years ahead to project
    #[arg(long, default_value_t = 1)]
    years: u32,

    /// Months ahead on top of the years
    #[arg(long, default_value_t = 0)]
    months: u32,

    /// Also write the full projection as JSON next to the CSV report
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("Budget Prognosis v0.1.0");
    println!("=======================\n");

    let accounts = ledger::load_accounts(&args.accounts)
        .with_context(|| format!("reading accounts from {}", args.accounts.display()))?;
    let load = ledger::load_transactions(&args.transactions)
        .with_context(|| format!("reading transactions from {}", args.transactions.display()))?;
    println!(
        "Loaded {} accounts and {} transactions",
        accounts.len(),
        load.transactions.len()
    );
    for skipped in &load.skipped {
        println!("  skipped: {skipped}");
    }

    let today = Local::now().date_naive();
    let config = ProjectionConfig::new(args.years, args.months, today);
    let engine = ProjectionEngine::new(config);
    let result = engine.project(&accounts, &load.transactions)?;

    for warning in &result.warnings {
        println!("  warning: {warning}");
    }

    // Print the first buckets of each account to the console
    println!(
        "\nProjection ({} months, {} accounts):",
        result.horizon.len(),
        result.ledgers.len()
    );
    for ledger in &result.ledgers {
        println!("\n{} [{}]", ledger.account, ledger.currency);
        println!(
            "{:>16} {:>4} {:>12} {:<28} {:>12} {:>10}",
            "Month", "Row", "Date", "Description", "Amount", "Kind"
        );
        println!("{}", "-".repeat(90));
        let mut printed = 0usize;
        for bucket in &ledger.buckets {
            for (row, posting) in bucket.postings.iter().enumerate() {
                if printed >= 24 {
                    break;
                }
                let kind = if posting.is_checkpoint {
                    "checkpoint"
                } else if posting.is_live {
                    "live"
                } else {
                    "stale"
                };
                println!(
                    "{:>16} {:>4} {:>12} {:<28} {:>12} {:>10}",
                    bucket.key.to_string(),
                    row + 1,
                    posting.date.to_string(),
                    posting.description,
                    posting.amount.to_string(),
                    kind
                );
                printed += 1;
            }
        }
        let total = ledger.posting_count();
        if total > 24 {
            println!("... ({} more postings)", total - 24);
        }
    }

    // Write the full report
    let csv_path = report::compose_filename(&args.out, today, args.years, args.months);
    let file = File::create(&csv_path)
        .with_context(|| format!("creating report file {}", csv_path.display()))?;
    report::write_csv(file, &result)?;
    println!("\nFull report written to: {}", csv_path.display());

    if args.json {
        let json_path = csv_path.with_extension("json");
        let file = File::create(&json_path)
            .with_context(|| format!("creating JSON file {}", json_path.display()))?;
        report::write_json(file, &result)?;
        println!("JSON projection written to: {}", json_path.display());
    }

    // Print summary
    let summary = result.summary();
    println!("\nSummary:");
    println!("  Months covered: {}", summary.months);
    println!("  Accounts: {}", summary.accounts);
    println!("  Postings: {}", summary.postings);
    println!("  Live postings: {}", summary.live_postings);
    println!("  Checkpoints: {}", summary.checkpoints);
    println!("  Warnings: {}", summary.warnings);

    Ok(())
}
