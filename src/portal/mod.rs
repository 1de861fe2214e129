//! Portal module
//!
//! Everything that talks to the bank's web interface:
//! - `session` - cookie-keeping HTTP client (fetch page, submit form, download)
//! - `page` / `form` - parsed HTML and form discovery by field name or label
//! - `navigator` - the fixed login → PIN → card → export sequence

pub mod form;
pub mod navigator;
pub mod page;
pub mod session;

pub use form::{Control, ControlKind, Form, FormOption, Method};
pub use navigator::{AccountContext, Navigator, SecretPrompt};
pub use page::Page;
pub use session::SessionClient;

use crate::types::ExportError;
use encoding_rs::Encoding;
use reqwest::Url;
use std::time::Duration;

/// Entry point of the non-JavaScript banking site
pub const DEFAULT_BASE_URL: &str = "https://banking.dkb.de/dkb/-";

/// Query that switches the portal to its non-JavaScript pages
const ENTRY_QUERY: &str = "$javascript=disabled";

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/115.0";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for the portal
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub base_url: Url,
    pub user_agent: String,
    pub timeout: Duration,
    /// Charset of the CSV download
    pub csv_encoding: &'static Encoding,
}

impl PortalConfig {
    pub fn new(base_url: &str) -> Result<Self, ExportError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ExportError::config(format!("invalid base URL '{}': {}", base_url, e)))?;

        Ok(Self {
            base_url,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            csv_encoding: encoding_rs::WINDOWS_1252,
        })
    }

    /// URL of the login page, also the account overview once logged in
    pub fn entry_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(Some(ENTRY_QUERY));
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_url() {
        let config = PortalConfig::new(DEFAULT_BASE_URL).unwrap();
        assert_eq!(
            config.entry_url().as_str(),
            "https://banking.dkb.de/dkb/-?$javascript=disabled"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            PortalConfig::new("not a url"),
            Err(ExportError::Config { .. })
        ));
    }
}
