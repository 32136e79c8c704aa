#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Impact field taxonomy and typed record contract.
//!
//! This crate defines the canonical set of fourteen numeric impact fields
//! shared by every data path in the system: the generative-API response
//! parser, the historical-dataset loader, and the export layer all speak
//! in terms of [`ImpactField`] and [`ImpactRecord`].

mod disaster;
mod field;
mod record;

pub use disaster::{DataReference, DisasterType, data_references};
pub use field::{FieldMap, ImpactField};
pub use record::{DataSource, ImpactRecord, QueryResult};
