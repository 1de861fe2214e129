//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: credentials, card selector and date range
//! - `transaction`: the normalized transaction record
//! - `error`: error types for the exporter

pub mod account;
pub mod error;
pub mod transaction;

pub use account::{parse_input_date, AccountSelector, Credentials, DateRange, PORTAL_DATE_FORMAT};
pub use error::ExportError;
pub use transaction::TransactionRecord;
