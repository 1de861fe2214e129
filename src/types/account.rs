//! Account-side types: who logs in, which card, which period

use crate::types::ExportError;
use chrono::NaiveDate;
use std::fmt;

/// Date formats accepted on the command line, tried in order
///
/// The two-digit year form comes first: `%Y` would otherwise read `13` as
/// the year 13.
const INPUT_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d.%m.%y", "%d.%m.%Y"];

/// Date format the portal expects in its search form
pub const PORTAL_DATE_FORMAT: &str = "%d.%m.%Y";

/// Login credentials
///
/// The PIN is not known up front: it is asked for the first time the portal
/// wants it and only ever lives in memory. `Debug` redacts it so it cannot
/// end up in a log line.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub userid: String,
    pin: Option<String>,
}

impl Credentials {
    pub fn new(userid: impl Into<String>) -> Self {
        Self {
            userid: userid.into(),
            pin: None,
        }
    }

    pub fn pin(&self) -> Option<&str> {
        self.pin.as_deref()
    }

    pub fn set_pin(&mut self, pin: impl Into<String>) {
        self.pin = Some(pin.into());
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pin = if self.pin.is_some() { "<redacted>" } else { "<not entered>" };
        f.debug_struct("Credentials")
            .field("userid", &self.userid)
            .field("pin", &pin)
            .finish()
    }
}

/// Identifies the card to export, usually the last 4 digits of its number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSelector(String);

impl AccountSelector {
    pub fn new(value: &str) -> Result<Self, ExportError> {
        let value = value.trim();
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ExportError::config(format!(
                "invalid card id '{}': expected the last digits of the card number",
                value
            )));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether an option label names this card
    ///
    /// The portal lists cards as masked numbers such as `4748********1234`,
    /// so a label matches when one of its whitespace-separated tokens is at
    /// least 12 characters long and ends with the selector.
    pub fn matches_label(&self, label: &str) -> bool {
        label
            .split_whitespace()
            .any(|token| token.chars().count() >= 12 && token.ends_with(&self.0))
    }
}

impl fmt::Display for AccountSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inclusive export period; `from <= to` always holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, ExportError> {
        if from > to {
            return Err(ExportError::config(format!(
                "from-date {} is after to-date {}",
                from, to
            )));
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }
}

/// Parse a date given as `YYYY-MM-DD`, `DD.MM.YYYY` or `DD.MM.YY`
pub fn parse_input_date(value: &str) -> Result<NaiveDate, ExportError> {
    let value = value.trim();
    INPUT_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .ok_or_else(|| {
            ExportError::config(format!(
                "invalid date '{}': expected DD.MM.YYYY or YYYY-MM-DD",
                value
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case("2020-01-31", date(2020, 1, 31))]
    #[case("31.01.2020", date(2020, 1, 31))]
    #[case("1.2.2013", date(2013, 2, 1))]
    #[case("01.09.13", date(2013, 9, 1))]
    #[case("  2020-01-01 ", date(2020, 1, 1))]
    fn test_parse_input_date_valid(#[case] input: &str, #[case] expected: NaiveDate) {
        assert_eq!(parse_input_date(input).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("yesterday")]
    #[case("32.01.2020")]
    #[case("2020/01/01")]
    fn test_parse_input_date_invalid(#[case] input: &str) {
        assert!(matches!(
            parse_input_date(input),
            Err(ExportError::Config { .. })
        ));
    }

    #[rstest]
    #[case::same_day(date(2020, 1, 1), date(2020, 1, 1), true)]
    #[case::ordered(date(2020, 1, 1), date(2020, 1, 31), true)]
    #[case::reversed(date(2020, 2, 1), date(2020, 1, 31), false)]
    fn test_date_range_ordering(
        #[case] from: NaiveDate,
        #[case] to: NaiveDate,
        #[case] valid: bool,
    ) {
        assert_eq!(DateRange::new(from, to).is_ok(), valid);
    }

    #[rstest]
    #[case("1234", "4748********1234 Kreditkarte", true)]
    #[case("1234", "Visa 4748********5678", false)]
    #[case("1234", "Konto 1234", false)]
    #[case("5678", "4748 **** **** 5678", false)]
    fn test_selector_matches_label(
        #[case] selector: &str,
        #[case] label: &str,
        #[case] expected: bool,
    ) {
        let selector = AccountSelector::new(selector).unwrap();
        assert_eq!(selector.matches_label(label), expected);
    }

    #[rstest]
    #[case("")]
    #[case("12 34")]
    #[case("12*4")]
    fn test_selector_rejects_invalid(#[case] value: &str) {
        assert!(AccountSelector::new(value).is_err());
    }

    #[test]
    fn test_credentials_debug_hides_pin() {
        let mut credentials = Credentials::new("alice");
        credentials.set_pin("s3cret");
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("s3cret"));
        assert_eq!(credentials.pin(), Some("s3cret"));
    }

    #[test]
    fn test_credentials_start_without_pin() {
        let mut credentials = Credentials::new("alice");
        assert_eq!(credentials.pin(), None);
        assert!(format!("{:?}", credentials).contains("<not entered>"));

        credentials.set_pin("1234");
        assert_eq!(credentials.pin(), Some("1234"));
    }
}
