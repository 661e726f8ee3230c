//! Builds the per-account monthly posting schedule with balance chaining
//!
//! Running positions are threaded through the builder as explicit values;
//! the balance chain is a sequence of [`BalanceRef`] links the output
//! adapter can turn into formulas, never an evaluated sum.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::calendar::{clamped_date, month_key, MonthKey};
use crate::ledger::{Account, TransactionDefinition};

use super::postings::{
    BalanceRef, BucketSchedule, Posting, PostingRef, ProjectedLedger, ProjectionWarning,
};

/// A transaction together with its resolved posting months
#[derive(Debug)]
pub struct ResolvedTransaction<'a> {
    pub txn: &'a TransactionDefinition,
    pub occurrences: Vec<MonthKey>,
}

/// One posting candidate before checkpoint insertion and chaining
struct Candidate<'a> {
    txn_index: usize,
    txn: &'a TransactionDefinition,
    occurrence: u32,
    date: NaiveDate,
}

/// Build the complete monthly schedule for one account.
///
/// Occurrences outside the horizon are dropped (they have no bucket to
/// post in); the checkpoint row is inserted exactly once, in the bucket
/// matching the account's as-of month, before the first posting dated on or
/// after the as-of date. When the as-of month has no bucket in the horizon
/// the schedule is emitted without a checkpoint and reported.
pub fn build_schedule(
    account: &Account,
    resolved: &[ResolvedTransaction<'_>],
    horizon: &[MonthKey],
) -> (ProjectedLedger, Vec<ProjectionWarning>) {
    let by_bucket = collect_candidates(resolved, horizon);
    let as_of_key = month_key(account.as_of);

    let mut buckets = Vec::with_capacity(horizon.len());
    let mut warnings = Vec::new();
    let mut checkpoint_placed = false;
    // Reference of the last chained posting, carried across buckets
    let mut prev: Option<PostingRef> = None;

    for (bucket_index, key) in horizon.iter().enumerate() {
        let mut postings: Vec<Posting> = Vec::new();
        let in_checkpoint_bucket = *key == as_of_key;

        for candidate in &by_bucket[bucket_index] {
            if in_checkpoint_bucket && !checkpoint_placed && candidate.date >= account.as_of {
                prev = Some(push_checkpoint(&mut postings, bucket_index, account));
                checkpoint_placed = true;
            }

            let live = candidate.date >= account.as_of;
            let balance = if live {
                prev.map(BalanceRef::Previous)
            } else {
                None
            };
            let reference = PostingRef {
                bucket: bucket_index,
                row: postings.len(),
            };
            postings.push(Posting {
                description: candidate.txn.description_for(candidate.occurrence),
                subsection: candidate.txn.subsection.clone(),
                amount: candidate.txn.amount,
                date: candidate.date,
                is_checkpoint: false,
                is_live: live,
                balance,
            });
            if live && balance.is_some() {
                prev = Some(reference);
            }
        }

        // The balance date lands after every posting of its month, or the
        // month has no postings at all: the checkpoint closes the bucket.
        if in_checkpoint_bucket && !checkpoint_placed {
            prev = Some(push_checkpoint(&mut postings, bucket_index, account));
            checkpoint_placed = true;
        }

        buckets.push(BucketSchedule {
            key: *key,
            postings,
        });
    }

    if !checkpoint_placed {
        log::warn!(
            "account '{}': balance date {} outside the projection horizon; no checkpoint emitted",
            account.name,
            account.as_of
        );
        warnings.push(ProjectionWarning::UnreachableCheckpoint {
            account: account.name.clone(),
        });
    }

    let ledger = ProjectedLedger {
        account: account.name.clone(),
        currency: account.currency.clone(),
        buckets,
    };
    (ledger, warnings)
}

fn push_checkpoint(postings: &mut Vec<Posting>, bucket_index: usize, account: &Account) -> PostingRef {
    let reference = PostingRef {
        bucket: bucket_index,
        row: postings.len(),
    };
    postings.push(Posting::checkpoint(account.as_of, account.balance));
    reference
}

/// Group occurrences into horizon buckets and order each bucket:
/// day-of-month ascending, open-ended transactions before fixed-repetition
/// ones on equal days, source order last for determinism.
fn collect_candidates<'a>(
    resolved: &[ResolvedTransaction<'a>],
    horizon: &[MonthKey],
) -> Vec<Vec<Candidate<'a>>> {
    let bucket_index: HashMap<MonthKey, usize> = horizon
        .iter()
        .enumerate()
        .map(|(index, key)| (*key, index))
        .collect();

    let mut by_bucket: Vec<Vec<Candidate<'a>>> = (0..horizon.len()).map(|_| Vec::new()).collect();
    for (txn_index, entry) in resolved.iter().enumerate() {
        let day = entry.txn.day_of_month();
        for (occurrence, key) in entry.occurrences.iter().enumerate() {
            if let Some(&index) = bucket_index.get(key) {
                by_bucket[index].push(Candidate {
                    txn_index,
                    txn: entry.txn,
                    occurrence: occurrence as u32,
                    date: clamped_date(key.year, key.month, day),
                });
            }
        }
    }

    for bucket in &mut by_bucket {
        bucket.sort_by_key(|candidate| {
            (
                candidate.date.day(),
                candidate.txn.repetitions.is_some(),
                candidate.txn_index,
            )
        });
    }

    by_bucket
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Interval;
    use crate::projection::recurrence::resolve_occurrences;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn checking(as_of: NaiveDate) -> Account {
        Account::new("Checking", "EUR", Decimal::new(1000, 0), as_of, 0)
    }

    fn monthly(description: &str, amount: i64, start: NaiveDate) -> TransactionDefinition {
        TransactionDefinition::new(
            "Checking",
            description,
            "Misc",
            "EUR",
            Decimal::new(amount, 0),
            start,
            Interval::EveryMonths(1),
            None,
            None,
        )
    }

    fn horizon_from(start: MonthKey, len: usize) -> Vec<MonthKey> {
        (0..len)
            .map(|offset| {
                month_key(crate::calendar::add_months(start.first_day(), offset as i32))
            })
            .collect()
    }

    fn resolve<'a>(
        txns: &'a [TransactionDefinition],
        horizon: &[MonthKey],
    ) -> Vec<ResolvedTransaction<'a>> {
        txns.iter()
            .map(|txn| {
                let budget = horizon.len() as i32
                    - crate::calendar::months_between(horizon[0].first_day(), txn.start_date);
                ResolvedTransaction {
                    txn,
                    occurrences: resolve_occurrences(txn, budget),
                }
            })
            .collect()
    }

    #[test]
    fn test_checkpoint_lands_after_earlier_postings() {
        // Rent posts on the 1st, the balance is dated the 15th: the rent row
        // is stale and the checkpoint closes the January bucket.
        let account = checking(date(2024, 1, 15));
        let txns = vec![monthly("Rent", -500, date(2024, 1, 1))];
        let horizon = horizon_from(MonthKey::new(2024, 1), 2);
        let (ledger, warnings) = build_schedule(&account, &resolve(&txns, &horizon), &horizon);

        assert!(warnings.is_empty());
        let january = &ledger.buckets[0];
        assert_eq!(january.postings.len(), 2);
        assert_eq!(january.postings[0].description, "Rent");
        assert!(!january.postings[0].is_live);
        assert_eq!(january.postings[0].balance, None);
        assert!(january.postings[1].is_checkpoint);
        assert_eq!(
            january.postings[1].balance,
            Some(BalanceRef::Opening(Decimal::new(1000, 0)))
        );

        let february = &ledger.buckets[1];
        assert_eq!(february.postings.len(), 1);
        assert!(february.postings[0].is_live);
        assert_eq!(
            february.postings[0].balance,
            Some(BalanceRef::Previous(PostingRef { bucket: 0, row: 1 }))
        );
    }

    #[test]
    fn test_checkpoint_precedes_later_dated_postings() {
        let account = checking(date(2024, 1, 10));
        let txns = vec![
            monthly("Rent", -500, date(2024, 1, 5)),
            monthly("Salary", 2000, date(2024, 1, 25)),
        ];
        let horizon = horizon_from(MonthKey::new(2024, 1), 1);
        let (ledger, _) = build_schedule(&account, &resolve(&txns, &horizon), &horizon);

        let rows: Vec<&str> = ledger.buckets[0]
            .postings
            .iter()
            .map(|p| p.description.as_str())
            .collect();
        assert_eq!(rows, vec!["Rent", "CURRENT BALANCE", "Salary"]);
        assert_eq!(
            ledger.buckets[0].postings[2].balance,
            Some(BalanceRef::Previous(PostingRef { bucket: 0, row: 1 }))
        );
    }

    #[test]
    fn test_checkpoint_is_lone_entry_in_empty_month() {
        // Balance dated a month with no postings at all
        let account = checking(date(2024, 2, 10));
        let txns = vec![TransactionDefinition::new(
            "Checking",
            "Insurance",
            "Fixed",
            "EUR",
            Decimal::new(-80, 0),
            date(2024, 1, 20),
            Interval::EveryMonths(3),
            None,
            None,
        )];
        let horizon = horizon_from(MonthKey::new(2024, 1), 4);
        let (ledger, warnings) = build_schedule(&account, &resolve(&txns, &horizon), &horizon);

        assert!(warnings.is_empty());
        let february = &ledger.buckets[1];
        assert_eq!(february.postings.len(), 1);
        assert!(february.postings[0].is_checkpoint);

        // April's posting chains straight back to the February checkpoint
        let april = &ledger.buckets[3];
        assert_eq!(
            april.postings[0].balance,
            Some(BalanceRef::Previous(PostingRef { bucket: 1, row: 0 }))
        );
    }

    #[test]
    fn test_unreachable_checkpoint_reported_not_dropped() {
        let account = checking(date(2024, 12, 1));
        let txns = vec![monthly("Rent", -500, date(2024, 1, 1))];
        let horizon = horizon_from(MonthKey::new(2024, 1), 3);
        let (ledger, warnings) = build_schedule(&account, &resolve(&txns, &horizon), &horizon);

        assert_eq!(ledger.checkpoint_count(), 0);
        assert_eq!(
            warnings,
            vec![ProjectionWarning::UnreachableCheckpoint {
                account: "Checking".to_string()
            }]
        );
        // Schedule still emitted, everything stale
        assert_eq!(ledger.posting_count(), 3);
        assert!(ledger
            .buckets
            .iter()
            .flat_map(|b| &b.postings)
            .all(|p| !p.is_live && p.balance.is_none()));
    }

    #[test]
    fn test_day_ordering_with_open_ended_tiebreak() {
        let account = checking(date(2024, 1, 1));
        let mut fixed = monthly("Gym", -30, date(2024, 1, 10));
        fixed.repetitions = Some(12);
        let open = monthly("Streaming", -15, date(2024, 1, 10));
        let earlier = monthly("Rent", -500, date(2024, 1, 3));
        let txns = vec![fixed, open, earlier];
        let horizon = horizon_from(MonthKey::new(2024, 1), 1);
        let (ledger, _) = build_schedule(&account, &resolve(&txns, &horizon), &horizon);

        let rows: Vec<&str> = ledger.buckets[0]
            .postings
            .iter()
            .map(|p| p.description.as_str())
            .collect();
        // Checkpoint first (balance dated the 1st), then day order with the
        // open-ended transaction winning the day-10 tie.
        assert_eq!(
            rows,
            vec!["CURRENT BALANCE", "Rent", "Streaming", "Gym"]
        );
    }

    #[test]
    fn test_posting_day_clamps_into_short_months() {
        let account = checking(date(2024, 1, 1));
        let txns = vec![monthly("Paycheck", 3000, date(2024, 1, 30))];
        let horizon = horizon_from(MonthKey::new(2024, 1), 2);
        let (ledger, _) = build_schedule(&account, &resolve(&txns, &horizon), &horizon);

        let february = &ledger.buckets[1];
        assert_eq!(february.postings[0].date, date(2024, 2, 29)); // leap year
    }

    #[test]
    fn test_chain_spans_every_consecutive_bucket() {
        let account = checking(date(2024, 1, 1));
        let txns = vec![monthly("Rent", -500, date(2024, 1, 5))];
        let horizon = horizon_from(MonthKey::new(2024, 1), 4);
        let (ledger, _) = build_schedule(&account, &resolve(&txns, &horizon), &horizon);

        // Each month's rent chains to the previous month's rent; January's
        // chains to the checkpoint.
        for bucket_index in 1..4 {
            let posting = &ledger.buckets[bucket_index].postings[0];
            match posting.balance {
                Some(BalanceRef::Previous(prev)) => {
                    assert_eq!(prev.bucket, bucket_index - 1);
                    let referenced = ledger.posting(prev).unwrap();
                    assert!(referenced.is_live);
                }
                other => panic!("expected a chained balance, got {other:?}"),
            }
        }
    }
}
