//! QIF output
//!
//! Writes one `!Account` block naming the card account, followed by a
//! `!Type:CCard` section with one block per transaction:
//!
//! ```text
//! !Account
//! NVISA
//! TCCard
//! ^
//! !Type:CCard
//! D01/03/2020
//! T-12.34
//! PAMAZON EU
//! ^
//! ```
//!
//! Records are written in the order given. [`QifReader`] reads the subset of
//! QIF produced here back into entries.

use crate::types::{ExportError, TransactionRecord};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

/// QIF date format (US ordering, four-digit year)
const QIF_DATE_FORMAT: &str = "%m/%d/%Y";

/// Default account name written into the `!Account` block
pub const DEFAULT_ACCOUNT_NAME: &str = "VISA";

/// Options for the QIF output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QifOptions {
    /// Account name in the finance software (e.g. `VISA` or `Aktiva:VISA`)
    pub account_name: String,
    /// Category added to every transaction as an `L` line
    pub category: Option<String>,
}

impl Default for QifOptions {
    fn default() -> Self {
        Self {
            account_name: DEFAULT_ACCOUNT_NAME.to_string(),
            category: None,
        }
    }
}

/// Serializes transaction records as QIF
#[derive(Debug, Clone, Default)]
pub struct QifWriter {
    options: QifOptions,
}

impl QifWriter {
    pub fn new(options: QifOptions) -> Self {
        Self { options }
    }

    /// Render the complete QIF document
    pub fn render(&self, records: &[TransactionRecord]) -> String {
        let mut out = String::new();

        // Writing into a String cannot fail
        let _ = writeln!(out, "!Account");
        let _ = writeln!(out, "N{}", single_line(&self.options.account_name));
        let _ = writeln!(out, "TCCard");
        let _ = writeln!(out, "^");
        let _ = writeln!(out, "!Type:CCard");

        for record in records {
            let _ = writeln!(out, "D{}", record.posted_date().format(QIF_DATE_FORMAT));
            let _ = writeln!(out, "T{}", format_amount(record.amount()));
            let _ = writeln!(out, "P{}", single_line(record.payee()));
            if let Some(memo) = record.memo() {
                let _ = writeln!(out, "M{}", single_line(memo));
            }
            if let Some(category) = &self.options.category {
                let _ = writeln!(out, "L{}", single_line(category));
            }
            let _ = writeln!(out, "^");
        }

        out
    }

    /// Write the QIF document to `output`
    pub fn write_to(
        &self,
        records: &[TransactionRecord],
        output: &mut dyn Write,
    ) -> Result<(), ExportError> {
        output.write_all(self.render(records).as_bytes())?;
        output.flush()?;
        Ok(())
    }

    /// Write the QIF document to a file
    ///
    /// The document is rendered in memory first, so the file is only
    /// created once there is something complete to put in it.
    pub fn write_file(&self, records: &[TransactionRecord], path: &Path) -> Result<(), ExportError> {
        log::info!("Exporting qif to {}", path.display());
        let content = self.render(records);
        std::fs::write(path, content).map_err(|e| ExportError::Io {
            message: format!("cannot write '{}': {}", path.display(), e),
        })
    }
}

/// Format an amount with two decimals and `.` as separator
pub fn format_amount(amount: Decimal) -> String {
    // Avoid printing a negative zero
    let amount = if amount.is_zero() { Decimal::ZERO } else { amount };
    format!("{:.2}", amount)
}

/// QIF fields are line-based; embedded line breaks would start a new field
fn single_line(value: &str) -> String {
    value.replace(['\r', '\n'], " ")
}

/// One transaction block read back from QIF
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QifEntry {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub payee: String,
    pub memo: Option<String>,
    pub category: Option<String>,
}

/// Reader for the QIF subset written by [`QifWriter`]
#[derive(Debug, Clone, Copy, Default)]
pub struct QifReader;

impl QifReader {
    /// Read all transaction blocks of the `!Type:` sections
    pub fn read(content: &str) -> Result<Vec<QifEntry>, ExportError> {
        let mut entries = Vec::new();
        let mut in_transactions = false;
        let mut date = None;
        let mut amount = None;
        let mut payee = String::new();
        let mut memo: Option<String> = None;
        let mut category = None;

        for (index, line) in content.lines().enumerate() {
            let line_no = Some(index as u64 + 1);
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }

            if let Some(header) = line.strip_prefix('!') {
                in_transactions = header.starts_with("Type:");
                continue;
            }
            if !in_transactions {
                continue;
            }

            let mut chars = line.chars();
            let tag = chars.next().unwrap_or('^');
            let value = chars.as_str();
            match tag {
                'D' => {
                    let parsed = NaiveDate::parse_from_str(value, QIF_DATE_FORMAT)
                        .map_err(|e| ExportError::parse(line_no, format!("Invalid date: {}", e)))?;
                    date = Some(parsed);
                }
                'T' | 'U' => {
                    let parsed = Decimal::from_str(&value.replace(',', "")).map_err(|_| {
                        ExportError::parse(line_no, format!("Invalid amount '{}'", value))
                    })?;
                    amount = Some(parsed);
                }
                'P' => payee = value.to_string(),
                'M' => {
                    memo = Some(match memo.take() {
                        Some(existing) => format!("{} {}", existing, value),
                        None => value.to_string(),
                    })
                }
                'L' => category = Some(value.to_string()),
                '^' => {
                    let (Some(d), Some(a)) = (date.take(), amount.take()) else {
                        return Err(ExportError::parse(
                            line_no,
                            "transaction block without date or amount",
                        ));
                    };
                    entries.push(QifEntry {
                        date: d,
                        amount: a,
                        payee: std::mem::take(&mut payee),
                        memo: memo.take(),
                        category: category.take(),
                    });
                }
                // Other tags (cleared status, check number, ...) are not needed
                _ => {}
            }
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::tempdir;

    fn record(y: i32, m: u32, d: u32, amount: &str, payee: &str, memo: Option<&str>) -> TransactionRecord {
        TransactionRecord::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            Decimal::from_str(amount).unwrap(),
            payee,
            memo.map(str::to_string),
        )
    }

    #[test]
    fn test_render_layout() {
        let records = vec![
            record(2020, 1, 3, "-12.34", "AMAZON EU", None),
            record(2020, 1, 10, "-1250", "HOTEL", Some("1.380,00 USD")),
        ];
        let output = QifWriter::default().render(&records);

        let expected = "!Account\nNVISA\nTCCard\n^\n!Type:CCard\n\
D01/03/2020\nT-12.34\nPAMAZON EU\n^\n\
D01/10/2020\nT-1250.00\nPHOTEL\nM1.380,00 USD\n^\n";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_render_with_category_and_account_name() {
        let writer = QifWriter::new(QifOptions {
            account_name: "Aktiva:VISA".to_string(),
            category: Some("Ausgaben:Karte".to_string()),
        });
        let output = writer.render(&[record(2020, 1, 3, "5", "SHOP", None)]);

        assert!(output.starts_with("!Account\nNAktiva:VISA\n"));
        assert!(output.contains("T5.00\nPSHOP\nLAusgaben:Karte\n^\n"));
    }

    #[test]
    fn test_render_empty_has_header_only() {
        let output = QifWriter::default().render(&[]);
        assert_eq!(output, "!Account\nNVISA\nTCCard\n^\n!Type:CCard\n");
    }

    #[rstest]
    #[case("-12.34", "-12.34")]
    #[case("0.5", "0.50")]
    #[case("1234", "1234.00")]
    #[case("-0.00", "0.00")]
    fn test_format_amount(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(format_amount(Decimal::from_str(input).unwrap()), expected);
    }

    #[test]
    fn test_payee_line_breaks_are_flattened() {
        let output = QifWriter::default().render(&[record(2020, 1, 3, "-1", "TWO\nLINES", None)]);
        assert!(output.contains("PTWO LINES\n"));
    }

    #[test]
    fn test_round_trip_preserves_date_amount_payee() {
        let records = vec![
            record(2020, 1, 3, "-12.34", "AMAZON EU", None),
            record(2020, 1, 10, "-1250.00", "HOTEL NEW YORK", Some("1.380,00 USD")),
            record(2020, 1, 20, "25.00", "Gutschrift", None),
        ];
        let output = QifWriter::default().render(&records);
        let entries = QifReader::read(&output).unwrap();

        let expected: Vec<_> = records
            .iter()
            .map(|r| (r.posted_date(), r.amount(), r.payee().to_string()))
            .collect();
        let actual: Vec<_> = entries
            .into_iter()
            .map(|e| (e.date, e.amount, e.payee))
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_reader_rejects_incomplete_block() {
        let result = QifReader::read("!Type:CCard\nPSHOP\n^\n");
        assert!(matches!(result, Err(ExportError::Parse { line: Some(3), .. })));
    }

    #[test]
    fn test_write_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.qif");

        QifWriter::default()
            .write_file(&[record(2020, 1, 3, "-1", "SHOP", None)], &path)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(QifReader::read(&content).unwrap().len(), 1);
    }

    #[test]
    fn test_write_file_unwritable_destination() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("out.qif");

        let result = QifWriter::default().write_file(&[], &path);
        assert!(matches!(result, Err(ExportError::Io { .. })));
    }
}
