//! Error types for the card transaction exporter
//!
//! Every error aborts the run. Nothing is retried: a rejected login in
//! particular is reported straight away, since repeated attempts risk locking
//! the account.
//!
//! # Error Categories
//!
//! - **Configuration**: invalid CLI input, e.g. a date range with `from > to`
//! - **Connectivity**: the portal could not be reached or answered with an HTTP error
//! - **Portal format**: an expected form, field or link is missing (the site changed)
//! - **Authentication**: user id or PIN rejected
//! - **Parse**: a malformed row in the CSV export
//! - **I/O**: the output could not be written

use thiserror::Error;

/// Main error type for the exporter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExportError {
    /// Invalid configuration, detected before any network call
    #[error("Invalid configuration: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Network failure, timeout or non-success HTTP status
    #[error("Connection to {url} failed: {message}")]
    Connectivity {
        /// Requested URL
        url: String,
        /// Description of the failure
        message: String,
    },

    /// The portal's HTML no longer has the expected structure
    #[error("Unexpected portal page: {message}")]
    PortalFormat {
        /// What was expected but not found
        message: String,
    },

    /// Credentials or PIN rejected by the portal
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Description of the rejection
        message: String,
    },

    /// Malformed tabular data
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Parse {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Output could not be written, or a prompt could not be read
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },
}

impl From<std::io::Error> for ExportError {
    fn from(error: std::io::Error) -> Self {
        ExportError::Io {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        ExportError::Parse {
            line,
            message: error.to_string(),
        }
    }
}

impl From<reqwest::Error> for ExportError {
    fn from(error: reqwest::Error) -> Self {
        let url = error
            .url()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "portal".to_string());

        ExportError::Connectivity {
            url,
            message: error.to_string(),
        }
    }
}

impl ExportError {
    /// Create a Config error
    pub fn config(message: impl Into<String>) -> Self {
        ExportError::Config {
            message: message.into(),
        }
    }

    /// Create a Connectivity error
    pub fn connectivity(url: &str, message: impl Into<String>) -> Self {
        ExportError::Connectivity {
            url: url.to_string(),
            message: message.into(),
        }
    }

    /// Create a PortalFormat error
    pub fn portal_format(message: impl Into<String>) -> Self {
        ExportError::PortalFormat {
            message: message.into(),
        }
    }

    /// Create an Authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        ExportError::Authentication {
            message: message.into(),
        }
    }

    /// Create a Parse error
    pub fn parse(line: Option<u64>, message: impl Into<String>) -> Self {
        ExportError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ExportError::Config { .. } => 2,
            ExportError::Connectivity { .. } => 3,
            ExportError::PortalFormat { .. } => 4,
            ExportError::Authentication { .. } => 5,
            ExportError::Parse { .. } => 6,
            ExportError::Io { .. } => 7,
        }
    }
}
