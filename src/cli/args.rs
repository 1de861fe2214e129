use crate::portal::DEFAULT_BASE_URL;
use clap::Parser;
use std::path::PathBuf;

/// Export credit card transactions from the online banking portal as QIF
///
/// The PIN is never accepted as an argument: it is asked for on the terminal,
/// or read as the first line of stdin when stdin is not a terminal.
#[derive(Parser, Debug)]
#[command(name = "card-qif-export")]
#[command(about = "Export credit card transactions from online banking as QIF", long_about = None)]
pub struct CliArgs {
    /// User id used for the login
    #[arg(long = "userid", value_name = "USERID", help = "Your user id (same as used for login)")]
    pub userid: Option<String>,

    /// Last digits of the card number
    #[arg(long = "cardid", value_name = "DIGITS", help = "Last 4 digits of your card number")]
    pub cardid: Option<String>,

    /// Output path, `-` for stdout
    #[arg(short = 'o', long = "output", value_name = "PATH", help = "Output path (QIF), '-' for stdout")]
    pub output: PathBuf,

    #[arg(
        long = "from-date",
        value_name = "DATE",
        help = "Export transactions as of... (DD.MM.YYYY or YYYY-MM-DD)"
    )]
    pub from_date: Option<String>,

    #[arg(
        long = "to-date",
        value_name = "DATE",
        help = "Export transactions until... (DD.MM.YYYY or YYYY-MM-DD, default: today)"
    )]
    pub to_date: Option<String>,

    #[arg(
        long = "qif-account",
        value_name = "NAME",
        help = "QIF account name of the card (e.g. Aktiva:VISA, default: VISA)"
    )]
    pub qif_account: Option<String>,

    #[arg(long = "category", value_name = "CATEGORY", help = "Default QIF category for every transaction")]
    pub category: Option<String>,

    #[arg(long = "raw", help = "Store the raw CSV file instead of QIF")]
    pub raw: bool,

    #[arg(
        long = "invert-sign",
        help = "Flip the sign of exported amounts (for exports listing charges as positive values)"
    )]
    pub invert_sign: bool,

    #[arg(
        long = "base-url",
        value_name = "URL",
        default_value = DEFAULT_BASE_URL,
        help = "Entry URL of the banking portal"
    )]
    pub base_url: String,

    #[arg(short = 'v', long = "verbose", help = "Log every request")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_all_flags() {
        let parsed = CliArgs::try_parse_from([
            "program",
            "--userid",
            "alice",
            "--cardid",
            "1234",
            "-o",
            "out.qif",
            "--from-date",
            "2020-01-01",
            "--to-date",
            "2020-01-31",
            "--qif-account",
            "Aktiva:VISA",
            "--category",
            "Ausgaben",
            "--raw",
            "--invert-sign",
            "--base-url",
            "http://localhost:8000/dkb/-",
            "-v",
        ])
        .unwrap();

        assert_eq!(parsed.userid.as_deref(), Some("alice"));
        assert_eq!(parsed.cardid.as_deref(), Some("1234"));
        assert_eq!(parsed.output, PathBuf::from("out.qif"));
        assert_eq!(parsed.from_date.as_deref(), Some("2020-01-01"));
        assert_eq!(parsed.to_date.as_deref(), Some("2020-01-31"));
        assert_eq!(parsed.qif_account.as_deref(), Some("Aktiva:VISA"));
        assert_eq!(parsed.category.as_deref(), Some("Ausgaben"));
        assert!(parsed.raw && parsed.invert_sign && parsed.verbose);
        assert_eq!(parsed.base_url, "http://localhost:8000/dkb/-");
    }

    #[test]
    fn test_defaults() {
        let parsed = CliArgs::try_parse_from(["program", "--output", "-"]).unwrap();
        assert_eq!(parsed.userid, None);
        assert_eq!(parsed.cardid, None);
        assert_eq!(parsed.from_date, None);
        assert_eq!(parsed.to_date, None);
        assert!(!parsed.raw);
        assert_eq!(parsed.base_url, DEFAULT_BASE_URL);
    }

    #[rstest]
    #[case::missing_output(&["program", "--userid", "alice"])]
    #[case::pin_is_not_a_flag(&["program", "-o", "out.qif", "--pin", "1234"])]
    #[case::unknown_flag(&["program", "-o", "out.qif", "--threads", "4"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        let result = CliArgs::try_parse_from(args);
        assert!(result.is_err());
    }
}
