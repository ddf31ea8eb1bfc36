//! The handoff pipeline: WIP sync, context gathering, review and submission.

mod commission;
mod pipeline;
mod report;
mod review;
mod state;
mod sync;

pub use commission::submit;
pub use pipeline::{Pipeline, SyncConsent};
pub use report::collect_status;
pub use review::{open_review, ReviewOutcome, ReviewSession};
