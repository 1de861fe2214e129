//! CSV format handling for the portal's transaction export
//!
//! The export is a `;`-delimited table preceded by a few metadata rows
//! (card, period, balance) and a header line:
//!
//! ```text
//! "Kreditkarte:";"4748********1234 Kreditkarte";
//! "Von:";"01.01.2020";
//! ...
//! "Umsatz abgerechnet";"Wertstellung";"Belegdatum";"Beschreibung";"Betrag (EUR)";"Ursprünglicher Betrag";
//! "Ja";"02.01.2020";"01.01.2020";"AMAZON";"-12,34";"";
//! ```
//!
//! Column positions, number format and sign convention are carried by
//! [`CsvLayout`] so a change in the export only needs a different layout.
//! Parsing is all-or-nothing: the first malformed row aborts with
//! [`ExportError::Parse`].

use crate::types::{ExportError, TransactionRecord};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use rust_decimal::Decimal;
use std::str::FromStr;

/// How exported amounts map onto QIF amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignConvention {
    /// Keep the sign of the export (charges are already negative)
    #[default]
    AsExported,
    /// Flip the sign (the export lists charges as positive values)
    Inverted,
}

impl SignConvention {
    pub fn apply(self, amount: Decimal) -> Decimal {
        match self {
            SignConvention::AsExported => amount,
            SignConvention::Inverted => -amount,
        }
    }
}

/// Locale-specific number format of the amount column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    pub decimal_separator: char,
    pub thousands_separator: Option<char>,
}

impl Default for NumberFormat {
    /// German formatting: `1.234,56`
    fn default() -> Self {
        Self {
            decimal_separator: ',',
            thousands_separator: Some('.'),
        }
    }
}

impl NumberFormat {
    /// Parse an amount such as `-1.234,56` into a `Decimal`
    ///
    /// Returns `None` for empty or non-numeric input.
    pub fn parse_amount(&self, raw: &str) -> Option<Decimal> {
        let mut normalized = String::with_capacity(raw.len());
        for c in raw.trim().chars() {
            if Some(c) == self.thousands_separator {
                continue;
            }
            if c == self.decimal_separator {
                normalized.push('.');
            } else {
                normalized.push(c);
            }
        }

        if normalized.is_empty() {
            return None;
        }
        Decimal::from_str(&normalized).ok()
    }
}

/// Column layout of the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvLayout {
    pub delimiter: u8,
    /// `Wertstellung`, preferred whenever it holds a date
    pub value_date_column: usize,
    /// `Belegdatum`, used when the value date is empty (pending rows)
    pub receipt_date_column: usize,
    pub description_column: usize,
    pub amount_column: usize,
    pub info_column: usize,
    /// Rows with fewer fields are metadata (before the table) or footer (after it)
    pub min_fields: usize,
    /// Tried in order; two-digit years must come before four-digit ones
    pub date_formats: Vec<String>,
    pub number_format: NumberFormat,
    pub sign: SignConvention,
}

impl Default for CsvLayout {
    fn default() -> Self {
        Self {
            delimiter: b';',
            value_date_column: 1,
            receipt_date_column: 2,
            description_column: 3,
            amount_column: 4,
            info_column: 5,
            min_fields: 5,
            date_formats: vec!["%d.%m.%y".to_string(), "%d.%m.%Y".to_string()],
            number_format: NumberFormat::default(),
            sign: SignConvention::AsExported,
        }
    }
}

impl CsvLayout {
    fn parse_date(&self, raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        self.date_formats
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
    }
}

/// Where the reader currently is within the export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Data,
    Footer,
}

/// Parser for the portal's CSV export
#[derive(Debug, Clone, Default)]
pub struct CsvParser {
    layout: CsvLayout,
}

impl CsvParser {
    pub fn new(layout: CsvLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &CsvLayout {
        &self.layout
    }

    /// Parse the full export into transaction records, in export order
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Parse`] if:
    /// - no header row is found
    /// - a data row has an unparsable date or amount
    /// - a full-width row appears after the footer started
    pub fn parse(&self, raw: &str) -> Result<Vec<TransactionRecord>, ExportError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.layout.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(raw.as_bytes());

        let mut section = Section::Preamble;
        let mut records = Vec::new();

        for result in reader.records() {
            let row = result?;
            let line = row.position().map(|pos| pos.line());
            let blank = row.iter().all(|field| field.trim().is_empty());
            let full_width = row.len() >= self.layout.min_fields;

            match section {
                Section::Preamble => {
                    if full_width && !blank {
                        // Header row
                        section = Section::Data;
                    }
                }
                Section::Data => {
                    if blank {
                        continue;
                    }
                    if full_width {
                        records.push(self.convert_row(&row, line)?);
                    } else {
                        section = Section::Footer;
                    }
                }
                Section::Footer => {
                    if full_width && !blank {
                        return Err(ExportError::parse(
                            line,
                            "transaction row found after the end of the table",
                        ));
                    }
                }
            }
        }

        if section == Section::Preamble {
            return Err(ExportError::parse(
                None,
                format!(
                    "no header row with at least {} fields found",
                    self.layout.min_fields
                ),
            ));
        }

        log::debug!("parsed {} transaction rows", records.len());
        Ok(records)
    }

    fn convert_row(
        &self,
        row: &StringRecord,
        line: Option<u64>,
    ) -> Result<TransactionRecord, ExportError> {
        let field = |index: usize| row.get(index).unwrap_or("").trim();

        let value_date = field(self.layout.value_date_column);
        let receipt_date = field(self.layout.receipt_date_column);
        let posted_date = self
            .layout
            .parse_date(value_date)
            .or_else(|| self.layout.parse_date(receipt_date))
            .ok_or_else(|| {
                ExportError::parse(
                    line,
                    format!(
                        "Invalid date: neither '{}' nor '{}' is a date",
                        value_date, receipt_date
                    ),
                )
            })?;

        let raw_amount = field(self.layout.amount_column);
        let amount = self
            .layout
            .number_format
            .parse_amount(raw_amount)
            .map(|amount| self.layout.sign.apply(amount))
            .ok_or_else(|| ExportError::parse(line, format!("Invalid amount '{}'", raw_amount)))?;

        let info = field(self.layout.info_column);
        let memo = (!info.is_empty()).then(|| info.to_string());

        Ok(TransactionRecord::new(
            posted_date,
            amount,
            field(self.layout.description_column),
            memo,
        ))
    }
}
