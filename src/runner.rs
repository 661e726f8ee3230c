//! Prognosis runner for batch projections
//!
//! Pre-loads the input sheets once, then allows running many projections
//! with different horizons without re-reading CSV files.

use std::path::Path;

use crate::errors::PrognosisError;
use crate::ledger::{load_accounts, load_transactions, Account, TransactionDefinition};
use crate::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};

/// Pre-loaded runner for efficient batch projections
///
/// # Example
/// ```ignore
/// let runner = PrognosisRunner::from_csv_paths("accounts.csv", "transactions.csv")?;
///
/// for (years, months) in [(1, 0), (2, 0), (5, 0)] {
///     let result = runner.run(ProjectionConfig::new(years, months, today))?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PrognosisRunner {
    accounts: Vec<Account>,
    transactions: Vec<TransactionDefinition>,
}

impl PrognosisRunner {
    /// Create a runner from already-loaded records
    pub fn new(accounts: Vec<Account>, transactions: Vec<TransactionDefinition>) -> Self {
        Self {
            accounts,
            transactions,
        }
    }

    /// Create a runner by loading the two input sheets. Transaction rows
    /// skipped by the loader are reported there and left out here.
    pub fn from_csv_paths<P: AsRef<Path>, Q: AsRef<Path>>(
        accounts_path: P,
        transactions_path: Q,
    ) -> Result<Self, PrognosisError> {
        let accounts = load_accounts(accounts_path)?;
        let load = load_transactions(transactions_path)?;
        Ok(Self::new(accounts, load.transactions))
    }

    /// Run a single projection with the given config
    pub fn run(&self, config: ProjectionConfig) -> Result<ProjectionResult, PrognosisError> {
        let engine = ProjectionEngine::new(config);
        engine.project(&self.accounts, &self.transactions)
    }

    /// Get the loaded account records
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Get the loaded transaction records
    pub fn transactions(&self) -> &[TransactionDefinition] {
        &self.transactions
    }
}
