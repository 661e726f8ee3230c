//! Posting and schedule output structures for projections

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::MonthKey;

/// Description used for the synthetic balance checkpoint row
pub const CHECKPOINT_DESCRIPTION: &str = "CURRENT BALANCE";

/// Reference to a posting within one [`ProjectedLedger`], by month bucket
/// index and row index inside that bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingRef {
    pub bucket: usize,
    pub row: usize,
}

/// Where a posting's closing balance comes from.
///
/// The engine emits the relationship, never the evaluated sum; turning the
/// links into spreadsheet formulas or numbers belongs to the output adapter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BalanceRef {
    /// The account balance known at the checkpoint date
    Opening(Decimal),
    /// The referenced posting's balance plus this posting's amount
    Previous(PostingRef),
}

/// A single scheduled ledger entry within one month bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub description: String,
    pub subsection: String,

    /// Signed amount; zero for the checkpoint row
    pub amount: Decimal,

    /// Effective posting date, day-clamped into the bucket's month
    pub date: NaiveDate,

    /// Synthetic row carrying the account's known balance
    pub is_checkpoint: bool,

    /// Dated on or after the checkpoint date and part of the balance chain.
    /// Postings before it are shown for context only and rendered muted.
    pub is_live: bool,

    /// Balance link; `None` for stale postings and for live postings with
    /// no checkpoint to anchor them
    pub balance: Option<BalanceRef>,
}

impl Posting {
    /// The synthetic row anchoring balance chaining at the known balance
    pub fn checkpoint(as_of: NaiveDate, balance: Decimal) -> Self {
        Self {
            description: CHECKPOINT_DESCRIPTION.to_string(),
            subsection: String::new(),
            amount: Decimal::ZERO,
            date: as_of,
            is_checkpoint: true,
            is_live: true,
            balance: Some(BalanceRef::Opening(balance)),
        }
    }
}

/// All postings of one account for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSchedule {
    pub key: MonthKey,
    pub postings: Vec<Posting>,
}

/// Complete monthly schedule for a single account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedLedger {
    pub account: String,
    pub currency: String,
    pub buckets: Vec<BucketSchedule>,
}

impl ProjectedLedger {
    /// Resolve a posting reference produced by the schedule builder
    pub fn posting(&self, reference: PostingRef) -> Option<&Posting> {
        self.buckets
            .get(reference.bucket)
            .and_then(|bucket| bucket.postings.get(reference.row))
    }

    pub fn checkpoint_count(&self) -> usize {
        self.buckets
            .iter()
            .flat_map(|bucket| &bucket.postings)
            .filter(|posting| posting.is_checkpoint)
            .count()
    }

    pub fn posting_count(&self) -> usize {
        self.buckets.iter().map(|bucket| bucket.postings.len()).sum()
    }

    pub fn live_posting_count(&self) -> usize {
        self.buckets
            .iter()
            .flat_map(|bucket| &bucket.postings)
            .filter(|posting| posting.is_live && !posting.is_checkpoint)
            .count()
    }
}

/// Conditions worth surfacing that do not abort a projection run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionWarning {
    /// Account balance date is in a past month; the account was left out
    StaleBalance { account: String },
    /// Balance date falls outside the horizon; the account's schedule was
    /// emitted without a checkpoint
    UnreachableCheckpoint { account: String },
}

impl fmt::Display for ProjectionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionWarning::StaleBalance { account } => write!(
                f,
                "account '{account}': balance date is in a past month; account skipped"
            ),
            ProjectionWarning::UnreachableCheckpoint { account } => write!(
                f,
                "account '{account}': balance date outside the projection horizon; no checkpoint emitted"
            ),
        }
    }
}

/// Complete projection result across all accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Month buckets covered, in chronological order
    pub horizon: Vec<MonthKey>,

    /// One ledger per included account, in source display order
    pub ledgers: Vec<ProjectedLedger>,

    pub warnings: Vec<ProjectionWarning>,
}

impl ProjectionResult {
    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let postings = self.ledgers.iter().map(|l| l.posting_count()).sum::<usize>();
        let live = self
            .ledgers
            .iter()
            .map(|l| l.live_posting_count())
            .sum::<usize>();
        let checkpoints = self
            .ledgers
            .iter()
            .map(|l| l.checkpoint_count())
            .sum::<usize>();

        ProjectionSummary {
            months: self.horizon.len(),
            accounts: self.ledgers.len(),
            postings,
            live_postings: live,
            checkpoints,
            warnings: self.warnings.len(),
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub months: usize,
    pub accounts: usize,
    pub postings: usize,
    pub live_postings: usize,
    pub checkpoints: usize,
    pub warnings: usize,
}
