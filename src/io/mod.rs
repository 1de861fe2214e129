//! I/O module
//!
//! Handles the CSV input and the QIF output.
//!
//! # Components
//!
//! - `csv_format` - parsing of the portal's CSV export into transaction records
//! - `qif_writer` - QIF serialization (and a reader for the same subset)

pub mod csv_format;
pub mod qif_writer;

pub use csv_format::{CsvLayout, CsvParser, NumberFormat, SignConvention};
pub use qif_writer::{QifEntry, QifOptions, QifReader, QifWriter};
