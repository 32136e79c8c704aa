#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Historical impact dataset loaded from CSV, queried by
//! nearest-coordinate match.
//!
//! The store is immutable after load; every query is a read-only scan.

mod store;

pub use store::{DatasetRow, DatasetStore};

use thiserror::Error;

/// Errors that can occur while loading or querying the dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// Reading the dataset file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The dataset file could not be parsed as CSV.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The dataset is empty or was never loaded. This is the terminal
    /// condition of the fallback path — there is nothing left to
    /// answer a query with.
    #[error("no dataset rows available")]
    DataUnavailable,
}
