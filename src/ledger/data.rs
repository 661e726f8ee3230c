//! Ledger data structures matching the input sheet format

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calendar::months_between;

/// A bank account snapshot: the balance known to be correct on a given date.
///
/// Accounts are read once at projection start and never modified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    /// Account name, the key transactions reference
    pub name: String,

    /// Currency code, carried through to the output unchanged
    pub currency: String,

    /// Balance on the as-of date
    pub balance: Decimal,

    /// Date the balance was last confirmed
    pub as_of: NaiveDate,

    /// Position of the account in the source sheet; drives output ordering
    pub order: usize,
}

impl Account {
    pub fn new(
        name: impl Into<String>,
        currency: impl Into<String>,
        balance: Decimal,
        as_of: NaiveDate,
        order: usize,
    ) -> Self {
        Self {
            name: name.into(),
            currency: currency.into(),
            balance,
            as_of,
            order,
        }
    }

    /// Whether the balance snapshot is usable for a projection anchored at
    /// `today`. A balance whose month is already in the past anchors nothing
    /// and excludes the account from the run.
    pub fn balance_is_current(&self, today: NaiveDate) -> bool {
        months_between(today, self.as_of) >= 0
    }
}

/// How often a transaction repeats. Decided once when the input row is
/// parsed; downstream code never re-interprets interval text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interval {
    /// Fixed step of `n` months, `n >= 1`
    EveryMonths(u32),
    /// Posts in odd-numbered months, snapping forward to the next odd month
    OddMonths,
    /// Posts in even-numbered months, snapping forward to the next even month
    EvenMonths,
    /// Unrecognized interval text, kept as a fixed two-month step
    Fallback,
}

impl Interval {
    /// Parse the interval column. Empty text means monthly; anything that is
    /// neither an integer nor an odd/even-month token becomes
    /// [`Interval::Fallback`], which the loader logs.
    pub fn parse(text: &str) -> Interval {
        let text = text.trim();
        if text.is_empty() {
            return Interval::EveryMonths(1);
        }
        if let Ok(n) = text.parse::<u32>() {
            if n >= 1 {
                return Interval::EveryMonths(n);
            }
            return Interval::Fallback;
        }
        match text.to_ascii_lowercase().as_str() {
            "uneven months" | "odd months" => Interval::OddMonths,
            "even months" => Interval::EvenMonths,
            _ => Interval::Fallback,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Interval::Fallback)
    }

    /// Nominal month step, used to budget the horizon for the first
    /// occurrence. Odd/even intervals budget their widest step.
    pub fn nominal_step(&self) -> i32 {
        match self {
            Interval::EveryMonths(n) => *n as i32,
            Interval::OddMonths | Interval::EvenMonths | Interval::Fallback => 2,
        }
    }

    /// Step to apply when advancing from a date in the given month (1-12).
    /// Odd/even intervals step two months while already on the right parity
    /// and one month to snap onto it.
    pub fn step_from_month(&self, month: u32) -> i32 {
        match self {
            Interval::EveryMonths(n) => *n as i32,
            Interval::OddMonths => {
                if month % 2 == 1 {
                    2
                } else {
                    1
                }
            }
            Interval::EvenMonths => {
                if month % 2 == 0 {
                    2
                } else {
                    1
                }
            }
            Interval::Fallback => 2,
        }
    }
}

/// Position within a finite sequence of payments, e.g. payment 3 of 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub current: u32,
    pub total: u32,
}

impl Installment {
    /// Parse the `current/total` column; empty text means no installments.
    /// Returns a diagnostic string for non-numeric or inverted fractions.
    pub fn parse(text: &str) -> Result<Option<Installment>, String> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let (cur, total) = text
            .split_once('/')
            .ok_or_else(|| format!("expected `current/total`, got `{text}`"))?;
        let current: u32 = cur
            .trim()
            .parse()
            .map_err(|_| format!("numerator `{}` is not a number", cur.trim()))?;
        let total: u32 = total
            .trim()
            .parse()
            .map_err(|_| format!("denominator `{}` is not a number", total.trim()))?;
        if current == 0 || total == 0 {
            return Err(String::from("installment numbers start at 1"));
        }
        if current > total {
            return Err(format!("numerator {current} exceeds denominator {total}"));
        }
        Ok(Some(Installment { current, total }))
    }

    /// Remaining payments, including the current one
    pub fn remaining(&self) -> u32 {
        self.total - self.current + 1
    }

    /// Suffix for the k-th projected occurrence (0-indexed), e.g. "(3/12)"
    pub fn suffix(&self, k: u32) -> String {
        format!("({}/{})", self.current + k, self.total)
    }
}

/// One recurring or one-off transaction read from the input sheet.
///
/// Exactly one of {`repetitions`, `installment`, neither} determines when
/// the transaction stops; with neither it is open-ended and runs until the
/// projection horizon is exhausted. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionDefinition {
    /// Name of the account the transaction posts against
    pub account: String,

    pub description: String,

    /// Category shown next to the description in the output
    pub subsection: String,

    pub currency: String,

    /// Signed amount; negative for outgoing
    pub amount: Decimal,

    /// First posting date; its day-of-month anchors every later posting
    pub start_date: NaiveDate,

    pub interval: Interval,

    /// Explicit number of repetitions, when given
    pub repetitions: Option<u32>,

    /// Installment fraction, when given
    pub installment: Option<Installment>,
}

impl TransactionDefinition {
    pub fn new(
        account: impl Into<String>,
        description: impl Into<String>,
        subsection: impl Into<String>,
        currency: impl Into<String>,
        amount: Decimal,
        start_date: NaiveDate,
        interval: Interval,
        repetitions: Option<u32>,
        installment: Option<Installment>,
    ) -> Self {
        Self {
            account: account.into(),
            description: description.into(),
            subsection: subsection.into(),
            currency: currency.into(),
            amount,
            start_date,
            interval,
            repetitions,
            installment,
        }
    }

    /// Open-ended transactions repeat until the horizon runs out
    pub fn is_open_ended(&self) -> bool {
        self.repetitions.is_none() && self.installment.is_none()
    }

    /// Day-of-month the transaction posts on, before clamping
    pub fn day_of_month(&self) -> u32 {
        self.start_date.day()
    }

    /// Description with the installment counter appended for occurrence `k`
    pub fn description_for(&self, k: u32) -> String {
        match &self.installment {
            Some(installment) => format!("{} {}", self.description, installment.suffix(k)),
            None => self.description.clone(),
        }
    }
}
