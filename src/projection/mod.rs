//! Projection engine: recurrence resolution, schedule building, driver

mod engine;
mod postings;
pub mod recurrence;
pub mod schedule;

pub use engine::{ProjectionConfig, ProjectionEngine};
pub use postings::{
    BalanceRef, BucketSchedule, Posting, PostingRef, ProjectedLedger, ProjectionResult,
    ProjectionSummary, ProjectionWarning, CHECKPOINT_DESCRIPTION,
};
pub use recurrence::resolve_occurrences;
pub use schedule::{build_schedule, ResolvedTransaction};
