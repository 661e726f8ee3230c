//! Error taxonomy for input loading and projection runs

use thiserror::Error;

/// Failures that abort an input load or a projection run.
///
/// Per-transaction problems are reported against the offending row and the
/// run continues without it; only a structurally unusable input set is fatal.
#[derive(Debug, Error)]
pub enum PrognosisError {
    /// The account sheet produced no usable accounts; nothing to project.
    #[error("no accounts in input; nothing to project")]
    NoAccounts,

    /// Installment fraction is non-numeric or its numerator exceeds the
    /// denominator. Fails fast for the named transaction only.
    #[error("transaction '{transaction}': inconsistent installment fraction: {detail}")]
    InconsistentInstallment { transaction: String, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
