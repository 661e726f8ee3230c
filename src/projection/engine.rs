//! Projection driver: resolves recurrences and builds schedules per account

use chrono::{Datelike, NaiveDate};

use crate::calendar::{add_months, clamped_date, month_key, months_between, MonthKey};
use crate::errors::PrognosisError;
use crate::ledger::{Account, TransactionDefinition};

use super::postings::{ProjectionResult, ProjectionWarning};
use super::recurrence::resolve_occurrences;
use super::schedule::{build_schedule, ResolvedTransaction};

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Whole years ahead to project
    pub years: u32,

    /// Months ahead on top of the years
    pub months: u32,

    /// Anchor date: the horizon starts in this month and account balance
    /// staleness is judged against it
    pub today: NaiveDate,
}

impl ProjectionConfig {
    pub fn new(years: u32, months: u32, today: NaiveDate) -> Self {
        Self {
            years,
            months,
            today,
        }
    }

    /// Number of month buckets covered, current month inclusive
    pub fn horizon_len(&self) -> usize {
        (self.years * 12 + self.months) as usize + 1
    }
}

/// Main projection engine
///
/// A pure function of its inputs: no I/O, and identical inputs with an
/// identical `today` produce identical results.
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    /// Run the projection for all accounts.
    ///
    /// Accounts whose balance month is already in the past are skipped with
    /// a warning; an empty account list is the one fatal input error. All
    /// transactions are considered, including those fully in the past, so
    /// early repetitions are consumed before the horizon starts.
    pub fn project(
        &self,
        accounts: &[Account],
        transactions: &[TransactionDefinition],
    ) -> Result<ProjectionResult, PrognosisError> {
        if accounts.is_empty() {
            return Err(PrognosisError::NoAccounts);
        }

        let horizon = self.build_horizon();
        let horizon_start = horizon[0].first_day();
        let mut warnings = Vec::new();

        let mut included: Vec<&Account> = Vec::new();
        for account in accounts {
            if account.balance_is_current(self.config.today) {
                included.push(account);
            } else {
                log::warn!(
                    "account '{}': balance date {} is in a past month; account skipped",
                    account.name,
                    account.as_of
                );
                warnings.push(ProjectionWarning::StaleBalance {
                    account: account.name.clone(),
                });
            }
        }
        // Source display order, name as a stable secondary key
        included.sort_by(|a, b| (a.order, &a.name).cmp(&(b.order, &b.name)));

        let mut ledgers = Vec::with_capacity(included.len());
        for account in included {
            let resolved: Vec<ResolvedTransaction<'_>> = transactions
                .iter()
                .filter(|txn| txn.account == account.name)
                .map(|txn| {
                    let budget =
                        horizon.len() as i32 - months_between(horizon_start, txn.start_date);
                    ResolvedTransaction {
                        txn,
                        occurrences: resolve_occurrences(txn, budget),
                    }
                })
                .collect();

            let (ledger, mut account_warnings) = build_schedule(account, &resolved, &horizon);
            warnings.append(&mut account_warnings);
            ledgers.push(ledger);
        }

        Ok(ProjectionResult {
            horizon,
            ledgers,
            warnings,
        })
    }

    /// Month buckets from the current month through the horizon end,
    /// inclusive, one per calendar month
    fn build_horizon(&self) -> Vec<MonthKey> {
        let anchor = clamped_date(self.config.today.year(), self.config.today.month(), 1);
        (0..self.config.horizon_len())
            .map(|offset| month_key(add_months(anchor, offset as i32)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Interval;
    use crate::projection::postings::BalanceRef;
    use crate::projection::ProjectedLedger;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_accounts() -> Vec<Account> {
        vec![Account::new(
            "Checking",
            "EUR",
            Decimal::new(1000, 0),
            date(2024, 1, 15),
            0,
        )]
    }

    fn rent() -> TransactionDefinition {
        TransactionDefinition::new(
            "Checking",
            "Rent",
            "Housing",
            "EUR",
            Decimal::new(-500, 0),
            date(2024, 1, 1),
            Interval::EveryMonths(1),
            None,
            None,
        )
    }

    /// Evaluate the symbolic balance chain ending at the given posting.
    /// Test-side only; the engine itself never evaluates sums.
    fn fold_balance(ledger: &ProjectedLedger, bucket: usize, row: usize) -> Decimal {
        let posting = &ledger.buckets[bucket].postings[row];
        match posting.balance.expect("posting is chained") {
            BalanceRef::Opening(balance) => balance,
            BalanceRef::Previous(prev) => fold_balance(ledger, prev.bucket, prev.row) + posting.amount,
        }
    }

    #[test]
    fn test_worked_scenario() {
        // Checking holds 1000 as of Jan 15; rent of 500 leaves on the 1st.
        // Over a two-month window January's rent predates the balance and
        // February's rent brings the projection to 500.
        let engine = ProjectionEngine::new(ProjectionConfig::new(0, 1, date(2024, 1, 15)));
        let result = engine.project(&test_accounts(), &[rent()]).unwrap();

        assert_eq!(
            result.horizon,
            vec![MonthKey::new(2024, 1), MonthKey::new(2024, 2)]
        );
        assert!(result.warnings.is_empty());

        let ledger = &result.ledgers[0];
        let january = &ledger.buckets[0];
        assert_eq!(january.postings.len(), 2);
        assert_eq!(january.postings[0].description, "Rent");
        assert!(!january.postings[0].is_live);
        assert!(january.postings[1].is_checkpoint);
        assert_eq!(january.postings[1].date, date(2024, 1, 15));

        let february = &ledger.buckets[1];
        assert_eq!(february.postings.len(), 1);
        assert!(february.postings[0].is_live);
        assert_eq!(fold_balance(ledger, 1, 0), Decimal::new(500, 0));
    }

    #[test]
    fn test_no_accounts_is_fatal() {
        let engine = ProjectionEngine::new(ProjectionConfig::new(1, 0, date(2024, 1, 15)));
        let result = engine.project(&[], &[rent()]);
        assert!(matches!(result, Err(PrognosisError::NoAccounts)));
    }

    #[test]
    fn test_stale_account_skipped_with_warning() {
        let mut accounts = test_accounts();
        accounts.push(Account::new(
            "Old",
            "EUR",
            Decimal::new(50, 0),
            date(2023, 11, 30),
            1,
        ));
        let engine = ProjectionEngine::new(ProjectionConfig::new(0, 2, date(2024, 1, 15)));
        let result = engine.project(&accounts, &[rent()]).unwrap();

        assert_eq!(result.ledgers.len(), 1);
        assert_eq!(result.ledgers[0].account, "Checking");
        assert_eq!(
            result.warnings,
            vec![ProjectionWarning::StaleBalance {
                account: "Old".to_string()
            }]
        );
    }

    #[test]
    fn test_accounts_emitted_in_source_order() {
        let accounts = vec![
            Account::new("Savings", "EUR", Decimal::new(9000, 0), date(2024, 1, 2), 1),
            Account::new("Checking", "EUR", Decimal::new(1000, 0), date(2024, 1, 2), 0),
        ];
        let engine = ProjectionEngine::new(ProjectionConfig::new(0, 1, date(2024, 1, 15)));
        let result = engine.project(&accounts, &[]).unwrap();
        let names: Vec<&str> = result.ledgers.iter().map(|l| l.account.as_str()).collect();
        assert_eq!(names, vec!["Checking", "Savings"]);
    }

    #[test]
    fn test_past_transactions_consume_repetitions() {
        // Six repetitions starting in October 2023: three fall before the
        // horizon and only Jan, Feb, Mar 2024 post.
        let mut txn = rent();
        txn.start_date = date(2023, 10, 1);
        txn.repetitions = Some(6);
        let engine = ProjectionEngine::new(ProjectionConfig::new(0, 5, date(2024, 1, 15)));
        let result = engine.project(&test_accounts(), &[txn]).unwrap();

        let ledger = &result.ledgers[0];
        let posted: Vec<MonthKey> = ledger
            .buckets
            .iter()
            .filter(|bucket| !bucket.postings.is_empty())
            .map(|bucket| bucket.key)
            .collect();
        assert_eq!(
            posted,
            vec![
                MonthKey::new(2024, 1),
                MonthKey::new(2024, 2),
                MonthKey::new(2024, 3),
            ]
        );
    }

    #[test]
    fn test_projection_is_idempotent() {
        let accounts = test_accounts();
        let transactions = vec![rent()];
        let engine = ProjectionEngine::new(ProjectionConfig::new(1, 0, date(2024, 1, 15)));

        let first = engine.project(&accounts, &transactions).unwrap();
        let second = engine.project(&accounts, &transactions).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_horizon_spans_years_and_months_inclusive() {
        let engine = ProjectionEngine::new(ProjectionConfig::new(1, 2, date(2024, 11, 3)));
        let result = engine.project(&test_accounts(), &[]).unwrap();
        assert_eq!(result.horizon.len(), 15);
        assert_eq!(result.horizon[0], MonthKey::new(2024, 11));
        assert_eq!(result.horizon[14], MonthKey::new(2026, 1));
    }
}
