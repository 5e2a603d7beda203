//! Remote-spreadsheet backend for toolboard.
//!
//! Implements [`toolboard_core::source::CatalogSource`] over the sheet
//! service's HTTP API, resolves service-account credentials, and owns the
//! two local CSV files: the catalog snapshot and the signup book.

pub mod client;
pub mod credentials;
pub mod error;
pub mod signup;
pub mod snapshot;

pub use client::SheetsClient;
pub use credentials::ServiceCredentials;
pub use error::{Error, Result};
pub use signup::{SignupBook, SignupOutcome};
pub use snapshot::CsvSnapshot;
