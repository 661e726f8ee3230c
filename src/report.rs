//! Render projection results for the output adapter
//!
//! The CSV report keeps the balance column symbolic: a checkpoint row shows
//! the known balance, a chained row shows a `=SUM(...)` formula referencing
//! the prior row, and stale rows stay blank. Evaluating the chain is left
//! to whatever consumes the report.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::calendar::{add_months, month_key};
use crate::errors::PrognosisError;
use crate::projection::{BalanceRef, Posting, ProjectionResult};

/// Compose the dated report filename, e.g.
/// `20240115_Budget_Jan2024-Jan2025.csv`
pub fn compose_filename(folder: &Path, today: NaiveDate, years: u32, months: u32) -> PathBuf {
    let end = add_months(today, (years * 12 + months) as i32);
    let name = format!(
        "{}_Budget_{}-{}.csv",
        today.format("%Y%m%d"),
        month_key(today).abbrev(),
        month_key(end).abbrev(),
    );
    folder.join(name)
}

/// Render the balance column for one posting
fn balance_cell(result: &ProjectionResult, posting: &Posting) -> String {
    match posting.balance {
        Some(BalanceRef::Opening(balance)) => balance.to_string(),
        Some(BalanceRef::Previous(prev)) => format!(
            "=SUM('{}'!R{},{})",
            result.horizon[prev.bucket],
            prev.row + 1,
            posting.amount
        ),
        None => String::new(),
    }
}

fn posting_kind(posting: &Posting) -> &'static str {
    if posting.is_checkpoint {
        "checkpoint"
    } else if posting.is_live {
        "live"
    } else {
        "stale"
    }
}

/// Write the full projection as CSV rows, one per posting
pub fn write_csv<W: Write>(writer: W, result: &ProjectionResult) -> Result<(), PrognosisError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "Account",
        "Month",
        "Row",
        "Date",
        "Description",
        "Subsection",
        "Amount",
        "Kind",
        "Balance",
    ])?;

    for ledger in &result.ledgers {
        for bucket in &ledger.buckets {
            for (row, posting) in bucket.postings.iter().enumerate() {
                csv_writer.write_record(&[
                    ledger.account.clone(),
                    bucket.key.to_string(),
                    (row + 1).to_string(),
                    posting.date.to_string(),
                    posting.description.clone(),
                    posting.subsection.clone(),
                    posting.amount.to_string(),
                    posting_kind(posting).to_string(),
                    balance_cell(result, posting),
                ])?;
            }
        }
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write the full projection as pretty JSON
pub fn write_json<W: Write>(writer: W, result: &ProjectionResult) -> Result<(), PrognosisError> {
    serde_json::to_writer_pretty(writer, result)?;
    Ok(())
}
