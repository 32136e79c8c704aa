#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Dual-source impact-data retrieval pipeline.
//!
//! [`service::ImpactDataService`] answers "what would a disaster do at
//! this coordinate" from two backends: a generative text-completion
//! API (primary, with health check, per-attempt timeout, and bounded
//! retry) and a historical CSV dataset (fallback, nearest-coordinate
//! match). Whichever path runs, the caller gets the same contract —
//! a complete [`impact_map_impact_models::ImpactRecord`] attributed to
//! exactly one source — or one of the two terminal errors below.

pub mod normalize;
pub mod parser;
pub mod prompt;
pub mod service;

pub use service::{ImpactDataService, RetryPolicy};

use thiserror::Error;

/// Terminal failures of the retrieval pipeline.
///
/// Transient conditions (a timed-out attempt, a response below the
/// field-coverage threshold, a malformed line) are absorbed internally
/// by retry and default-fill; only these two escape to the caller.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The generative path is unusable: no provider configured, health
    /// check failed, or every attempt exhausted. Terminal only in
    /// forced-API mode — the normal path falls back to the dataset
    /// instead of surfacing this.
    #[error("generative API unavailable: {reason}")]
    ApiUnavailable {
        /// Why the API path gave up.
        reason: String,
    },

    /// No data source can answer the query: the API path failed and
    /// the dataset is absent or empty. Always terminal.
    #[error("no data source available")]
    DataUnavailable,
}
