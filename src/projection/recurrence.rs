//! Resolves which calendar months a transaction posts in

use chrono::Datelike;

use crate::calendar::{add_months, month_key, MonthKey};
use crate::ledger::TransactionDefinition;

/// Ordered months a transaction applies to, starting at its start month.
///
/// `horizon_months` is the month budget measured from the transaction's
/// start month; occurrences stop once the budget or the repetition count is
/// exhausted. The start month is always emitted, so transactions starting
/// before the projection window still consume their early repetitions and
/// installment numbers (the schedule builder drops months it has no bucket
/// for).
pub fn resolve_occurrences(txn: &TransactionDefinition, horizon_months: i32) -> Vec<MonthKey> {
    let mut reps_remaining: i64 = match (txn.repetitions, &txn.installment) {
        (Some(n), _) => n as i64,
        (None, Some(installment)) => installment.remaining() as i64,
        (None, None) => horizon_months.max(0) as i64,
    };
    let mut months_left = horizon_months;
    let mut working = txn.start_date;

    let mut occurrences = vec![month_key(working)];
    reps_remaining -= 1;
    months_left -= txn.interval.nominal_step();

    while reps_remaining > 0 && months_left > 0 {
        let step = txn.interval.step_from_month(working.month());
        working = add_months(working, step);
        occurrences.push(month_key(working));
        reps_remaining -= 1;
        months_left -= step;
    }

    occurrences
}
