//! Page sequence from the login form to the CSV download
//!
//! ```text
//! login page ──submit──▶ PIN page(s) ──submit──▶ overview
//!     ──card link──▶ search form ──submit──▶ result page ──csv link──▶ CSV
//! ```
//!
//! Every step looks elements up by field name, CSS class or label text. A
//! missing element fails with [`ExportError::PortalFormat`]; a login that
//! lands on the login form again fails with [`ExportError::Authentication`]
//! and is not retried.

use crate::portal::{Form, Page, PortalConfig, SessionClient};
use crate::types::{AccountSelector, Credentials, DateRange, ExportError, PORTAL_DATE_FORMAT};
use regex::Regex;
use reqwest::Url;

const USERID_FIELD: &str = "j_username";
const ACCOUNT_FIELD: &str = "slAllAccounts";
const PERIOD_FIELD: &str = "searchPeriod";
const FROM_FIELD: &str = "postingDate";
const TO_FIELD: &str = "toPostingDate";

/// Label of the "all transactions between two dates" radio button
const ALL_TRANSACTIONS_LABEL: &str = r"(?i)alle ums.*tze";

/// Error boxes the portal shows above a rejected login form
const LOGIN_ERROR_SELECTOR: &str = ".errorMessage, .error";

/// Text that marks the credit card row of the overview
const CARD_ROW_MARKER: &str = "Kreditkarte";

/// Fields the login form expects from a JavaScript-enabled browser
const BROWSER_FINGERPRINT: [(&str, &str); 5] = [
    ("browserName", "Firefox"),
    ("browserVersion", "40"),
    ("screenWidth", "1000"),
    ("screenHeight", "800"),
    ("osName", "Windows"),
];

/// Upper bound on consecutive PIN / second-factor pages
const MAX_SECRET_STEPS: usize = 3;

/// Source of secrets that must be typed in while the login is in progress
pub trait SecretPrompt {
    /// Ask for a secret; `label` names what is asked for (e.g. `PIN`)
    fn secret(&mut self, label: &str) -> Result<String, ExportError>;
}

/// Search form with the card already chosen
#[derive(Debug, Clone)]
pub struct AccountContext {
    form: Form,
    card_label: String,
}

impl AccountContext {
    /// Label of the chosen card as listed by the portal
    pub fn card_label(&self) -> &str {
        &self.card_label
    }
}

/// Drives one session through the portal
#[derive(Debug)]
pub struct Navigator {
    session: SessionClient,
    config: PortalConfig,
    all_transactions: Regex,
    overview: Option<Page>,
}

impl Navigator {
    pub fn new(config: PortalConfig) -> Result<Self, ExportError> {
        let session = SessionClient::new(&config)?;
        let all_transactions = Regex::new(ALL_TRANSACTIONS_LABEL)
            .map_err(|e| ExportError::config(format!("invalid label pattern: {}", e)))?;

        Ok(Self {
            session,
            config,
            all_transactions,
            overview: None,
        })
    }

    /// Log in, asking for the PIN once the login form has been found
    ///
    /// The PIN is filled into the login form when the form has a password
    /// field; otherwise the portal asks for it on a separate page. Further
    /// pages with a single password field (second factor) are answered
    /// through `prompt` as well. A secret form that comes back after it was
    /// answered means the answer was rejected; it is never submitted twice.
    ///
    /// # Errors
    ///
    /// - [`ExportError::Connectivity`] if the portal cannot be reached
    /// - [`ExportError::PortalFormat`] if the login form is missing
    /// - [`ExportError::Authentication`] if user id, PIN or a second factor
    ///   are rejected
    pub fn login(
        &mut self,
        credentials: &mut Credentials,
        prompt: &mut dyn SecretPrompt,
    ) -> Result<(), ExportError> {
        log::info!("Starting login as user {}...", credentials.userid);
        let entry = self.config.entry_url();

        let page = self.session.fetch_page(&entry)?;
        let mut form = page.form_with_field(USERID_FIELD)?;
        form.set(USERID_FIELD, &credentials.userid)?;
        for (name, value) in BROWSER_FINGERPRINT {
            if form.has_field(name) {
                form.set(name, value)?;
            }
        }

        if let Some(pin_field) = form.password_field().map(|c| c.name.clone()) {
            let pin = login_pin(credentials, prompt, "PIN")?;
            form.set(&pin_field, pin)?;
        }
        log::debug!("submitting login form to {} for {:?}", form.action(), credentials);

        let mut page = self.session.submit_form(&form)?;
        let mut answered: Vec<(Url, String)> = Vec::new();
        loop {
            if is_login_page(&page)? {
                return Err(login_rejected(&page, "the portal rejected the user id or PIN"));
            }
            let Some(mut step) = secret_form(&page)? else {
                break;
            };

            let (field, label) = match step.password_field() {
                Some(control) if !control.label.is_empty() => {
                    (control.name.clone(), control.label.clone())
                }
                Some(control) => (control.name.clone(), "PIN".to_string()),
                None => break,
            };

            let key = (step.action().clone(), field.clone());
            if answered.contains(&key) {
                return Err(login_rejected(
                    &page,
                    &format!("the portal rejected the {}", label),
                ));
            }
            if answered.len() == MAX_SECRET_STEPS {
                return Err(ExportError::authentication(
                    "too many verification steps, giving up",
                ));
            }
            answered.push(key);

            log::info!("Portal asks for '{}'", label);
            if credentials.pin().is_none() {
                let pin = login_pin(credentials, prompt, &label)?;
                step.set(&field, pin)?;
            } else {
                let secret = prompt.secret(&label)?;
                step.set(&field, &secret)?;
            }
            page = self.session.submit_form(&step)?;
        }

        let overview = self.session.fetch_page(&entry)?;
        if is_login_page(&overview)? {
            return Err(login_rejected(
                &overview,
                "still on the login page after submitting the credentials",
            ));
        }
        self.overview = Some(overview);
        Ok(())
    }

    /// Open the credit card transactions and pick the card in the search form
    pub fn select_account(
        &mut self,
        selector: &AccountSelector,
    ) -> Result<AccountContext, ExportError> {
        log::info!("Navigating to 'Kreditkartenumsätze'...");
        let overview = self
            .overview
            .as_ref()
            .ok_or_else(|| ExportError::authentication("not logged in"))?;

        let link = card_transactions_link(overview)?.ok_or_else(|| {
            ExportError::portal_format(
                "unable to find link 'Kreditkartenumsätze' -- maybe the login went wrong?",
            )
        })?;
        let page = self.session.fetch_page(&link)?;

        let mut form = page.form_with_field(ACCOUNT_FIELD).map_err(|_| {
            ExportError::portal_format("unable to find the transaction selection form")
        })?;
        let card_label = form
            .choose_option(ACCOUNT_FIELD, |label| selector.matches_label(label))
            .map_err(|_| {
                ExportError::portal_format(format!(
                    "unable to find a credit card ending in {}",
                    selector
                ))
            })?;
        log::debug!("selected card '{}'", card_label);

        Ok(AccountContext { form, card_label })
    }

    /// Search the given period and download the CSV export as UTF-8 text
    pub fn request_export(
        &mut self,
        account: AccountContext,
        range: &DateRange,
    ) -> Result<String, ExportError> {
        let from = range.from().format(PORTAL_DATE_FORMAT).to_string();
        let to = range.to().format(PORTAL_DATE_FORMAT).to_string();
        log::info!("Selecting transactions in time frame {} - {}...", from, to);

        let mut form = account.form;
        form.choose_option(PERIOD_FIELD, |label| self.all_transactions.is_match(label))
            .map_err(|_| ExportError::portal_format("unable to find 'Alle Umsätze vom' radio box"))?;
        form.set(FROM_FIELD, &from)
            .map_err(|_| ExportError::portal_format("unable to find 'from' date field"))?;
        form.set(TO_FIELD, &to)
            .map_err(|_| ExportError::portal_format("unable to find 'to' date field"))?;
        form.add_hidden("$event", "search");
        let result = self.session.submit_form(&form)?;

        log::info!("Requesting CSV data...");
        let csv_link = result
            .find_link(|href| href.to_ascii_lowercase().contains("csv"))?
            .ok_or_else(|| ExportError::portal_format("unable to find the CSV export link"))?;
        let bytes = self.session.fetch_bytes(&csv_link)?;

        let (text, encoding, had_errors) = self.config.csv_encoding.decode(&bytes);
        if had_errors {
            log::warn!("CSV export contained bytes that are not valid {}", encoding.name());
        }
        Ok(text.into_owned())
    }
}

fn is_login_page(page: &Page) -> Result<bool, ExportError> {
    Ok(page.find_form(|form| form.has_field(USERID_FIELD))?.is_some())
}

/// The login PIN, asked for through `prompt` the first time it is needed
fn login_pin<'a>(
    credentials: &'a mut Credentials,
    prompt: &mut dyn SecretPrompt,
    label: &str,
) -> Result<&'a str, ExportError> {
    if credentials.pin().is_none() {
        credentials.set_pin(prompt.secret(label)?);
    }
    credentials
        .pin()
        .ok_or_else(|| ExportError::authentication("no PIN entered"))
}

/// Authentication error carrying the portal's own error message, if any
fn login_rejected(page: &Page, fallback: &str) -> ExportError {
    match page.texts(LOGIN_ERROR_SELECTOR) {
        Ok(messages) if !messages.is_empty() => ExportError::authentication(messages.join(" ")),
        _ => ExportError::authentication(fallback),
    }
}

/// A PIN or second-factor form: a password field without a user id field
fn secret_form(page: &Page) -> Result<Option<Form>, ExportError> {
    page.find_form(|form| form.password_field().is_some() && !form.has_field(USERID_FIELD))
}

/// Link of the transactions view in the credit card row of the overview
fn card_transactions_link(overview: &Page) -> Result<Option<Url>, ExportError> {
    use crate::portal::form::{element_text, selector};

    let rows = selector("tr.mainRow")?;
    let title = selector("div.forceWrap")?;
    let link = selector("a.evt-paymentTransaction[href]")?;

    for row in overview.document().select(&rows) {
        let is_card = row
            .select(&title)
            .next()
            .map(|div| element_text(&div).contains(CARD_ROW_MARKER))
            .unwrap_or(false);
        if !is_card {
            continue;
        }
        if let Some(href) = row.select(&link).next().and_then(|a| a.value().attr("href")) {
            return overview.resolve(href).map(Some);
        }
    }
    Ok(None)
}
