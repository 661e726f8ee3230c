//! Load accounts and transactions from the input CSV sheets

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::Reader;
use rust_decimal::Decimal;

use super::{Account, Installment, Interval, TransactionDefinition};
use crate::errors::PrognosisError;

/// Raw CSV row matching the accounts sheet columns
#[derive(Debug, serde::Deserialize)]
struct AccountRow {
    #[serde(rename = "Bank")]
    bank: String,
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "Current balance")]
    balance: Decimal,
    #[serde(rename = "Date")]
    date: NaiveDate,
}

impl AccountRow {
    fn to_account(self, order: usize) -> Account {
        Account::new(self.bank, self.currency, self.balance, self.date, order)
    }
}

/// Raw CSV row matching the transactions sheet columns
#[derive(Debug, serde::Deserialize)]
struct TransactionRow {
    #[serde(rename = "Bank")]
    bank: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Subsection", default)]
    subsection: String,
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "Amount")]
    amount: Decimal,
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Interval", default)]
    interval: String,
    #[serde(rename = "Repetitions", default)]
    repetitions: String,
    #[serde(rename = "Installments", default)]
    installments: String,
}

impl TransactionRow {
    fn to_transaction(self) -> Result<TransactionDefinition, PrognosisError> {
        let interval = Interval::parse(&self.interval);
        if interval.is_fallback() {
            log::warn!(
                "transaction '{}': unrecognized interval '{}'; stepping every 2 months",
                self.description,
                self.interval.trim()
            );
        }

        let repetitions = match self.repetitions.trim() {
            "" => None,
            text => match text.parse::<u32>() {
                Ok(n) => Some(n),
                Err(_) => {
                    log::warn!(
                        "transaction '{}': unreadable repetition count '{}'; treating as open-ended",
                        self.description,
                        text
                    );
                    None
                }
            },
        };

        let installment = Installment::parse(&self.installments).map_err(|detail| {
            PrognosisError::InconsistentInstallment {
                transaction: self.description.clone(),
                detail,
            }
        })?;

        Ok(TransactionDefinition::new(
            self.bank,
            self.description,
            self.subsection,
            self.currency,
            self.amount,
            self.date,
            interval,
            repetitions,
            installment,
        ))
    }
}

/// Result of loading the transactions sheet: the usable rows plus the
/// per-row failures that were skipped. Skipped rows never abort a load.
#[derive(Debug)]
pub struct TransactionLoad {
    pub transactions: Vec<TransactionDefinition>,
    pub skipped: Vec<PrognosisError>,
}

/// Load all accounts from a CSV file
pub fn load_accounts<P: AsRef<Path>>(path: P) -> Result<Vec<Account>, PrognosisError> {
    load_accounts_from_reader(File::open(path)?)
}

/// Load accounts from any reader (e.g. string buffer, network stream)
pub fn load_accounts_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<Vec<Account>, PrognosisError> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut accounts = Vec::new();

    for (order, result) in csv_reader.deserialize().enumerate() {
        let row: AccountRow = result?;
        accounts.push(row.to_account(order));
    }

    Ok(accounts)
}

/// Load all transaction definitions from a CSV file
pub fn load_transactions<P: AsRef<Path>>(path: P) -> Result<TransactionLoad, PrognosisError> {
    load_transactions_from_reader(File::open(path)?)
}

/// Load transaction definitions from any reader. Rows with an inconsistent
/// installment fraction are reported in [`TransactionLoad::skipped`] and
/// logged; the remaining rows load normally.
pub fn load_transactions_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<TransactionLoad, PrognosisError> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut transactions = Vec::new();
    let mut skipped = Vec::new();

    for result in csv_reader.deserialize() {
        let row: TransactionRow = result?;
        match row.to_transaction() {
            Ok(txn) => transactions.push(txn),
            Err(err) => {
                log::error!("{err}");
                skipped.push(err);
            }
        }
    }

    Ok(TransactionLoad {
        transactions,
        skipped,
    })
}
