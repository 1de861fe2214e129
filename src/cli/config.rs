//! Validated run configuration
//!
//! [`CliArgs::into_config`] fills in missing values through the prompter and
//! checks everything that can be checked offline, so a bad date range never
//! reaches the network.

use crate::cli::{CliArgs, Prompter};
use crate::io::{CsvLayout, QifOptions, SignConvention};
use crate::portal::PortalConfig;
use crate::types::{parse_input_date, AccountSelector, DateRange, ExportError};
use chrono::NaiveDate;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Where the result goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl From<PathBuf> for OutputTarget {
    fn from(path: PathBuf) -> Self {
        if path.as_os_str() == "-" {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(path)
        }
    }
}

/// What is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Qif,
    /// The decoded CSV export, unchanged
    RawCsv,
}

/// Everything one export run needs
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub userid: String,
    pub card: AccountSelector,
    pub range: DateRange,
    pub output: OutputTarget,
    pub mode: OutputMode,
    pub portal: PortalConfig,
    pub layout: CsvLayout,
    pub qif: QifOptions,
}

impl CliArgs {
    /// Build the run configuration, prompting for missing user id, card id
    /// and start date (in that order)
    ///
    /// `today` is the default end date.
    pub fn into_config<R: BufRead, W: Write>(
        self,
        prompter: &mut Prompter<R, W>,
        today: NaiveDate,
    ) -> Result<ExportConfig, ExportError> {
        let portal = PortalConfig::new(&self.base_url)?;

        let userid = match self.userid {
            Some(userid) if !userid.trim().is_empty() => userid.trim().to_string(),
            _ => prompter.until("User id", |answer| {
                if answer.is_empty() {
                    Err(ExportError::config("please specify a valid user id"))
                } else {
                    Ok(answer.to_string())
                }
            })?,
        };
        let card = match &self.cardid {
            Some(cardid) => AccountSelector::new(cardid)?,
            None => prompter.until("Card id (last 4 digits)", AccountSelector::new)?,
        };

        let to = match &self.to_date {
            Some(value) => parse_input_date(value)?,
            None => today,
        };
        let from = match &self.from_date {
            Some(value) => parse_input_date(value)?,
            None => prompter.until("Start time", parse_input_date)?,
        };
        let range = DateRange::new(from, to)?;

        let mut qif = QifOptions {
            category: self.category,
            ..QifOptions::default()
        };
        if let Some(account_name) = self.qif_account {
            qif.account_name = account_name;
        }

        let layout = CsvLayout {
            sign: if self.invert_sign {
                SignConvention::Inverted
            } else {
                SignConvention::AsExported
            },
            ..CsvLayout::default()
        };

        Ok(ExportConfig {
            userid,
            card,
            range,
            output: self.output.into(),
            mode: if self.raw {
                OutputMode::RawCsv
            } else {
                OutputMode::Qif
            },
            portal,
            layout,
            qif,
        })
    }
}
