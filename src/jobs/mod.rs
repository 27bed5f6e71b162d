// src/jobs/mod.rs
//
// Scheduled data jobs, run from the CLI.

pub mod enrich;
pub mod ranks;
pub mod ratings;

pub use enrich::{EnrichSummary, refresh_games};
pub use ranks::{Credentials, download_ranks};
pub use ratings::{AdaptiveDelay, RatingsRunSummary};
