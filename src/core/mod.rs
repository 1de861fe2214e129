//! Core module
//!
//! - `pipeline` - runs one export: portal navigation, CSV parsing, QIF output

pub mod pipeline;

pub use pipeline::{run, ExportSummary};
