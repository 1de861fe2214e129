//! Card QIF Export Library
//! # Overview
//!
//! Fetches credit card transactions from an online banking portal that has
//! no export API, and converts the portal's CSV export into QIF for personal
//! finance software.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (credentials, date range, transaction record, errors)
//! - [`cli`] - CLI arguments, interactive prompts and the validated run configuration
//! - [`portal`] - Web session and page navigation:
//!   - [`portal::session`] - cookie-keeping HTTP client
//!   - [`portal::page`] / [`portal::form`] - HTML pages and form discovery by name
//!   - [`portal::navigator`] - login, PIN, card selection and export request
//! - [`io`] - CSV export parsing and QIF writing
//! - [`core`] - the pipeline tying one run together
//!
//! # Flow
//!
//! ```text
//! CLI args ─▶ ExportConfig ─▶ Navigator (login ─▶ PIN ─▶ card ─▶ CSV)
//!          ─▶ CsvParser ─▶ QifWriter ─▶ output file
//! ```
//!
//! Every error aborts the run and nothing is written unless the whole
//! export was downloaded and parsed.

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod portal;
pub mod types;

pub use crate::core::{run, ExportSummary};
pub use io::{CsvParser, QifWriter};
pub use types::{AccountSelector, Credentials, DateRange, ExportError, TransactionRecord};
