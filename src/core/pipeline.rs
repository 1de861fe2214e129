//! One export run, from login to output file
//!
//! The pipeline is strictly sequential: every portal step depends on the
//! page and cookies of the previous one. The output is only written after
//! the whole export has been downloaded and parsed, so a failed run never
//! leaves a partial file behind.

use crate::cli::{ExportConfig, OutputMode, OutputTarget};
use crate::io::{CsvParser, QifWriter};
use crate::portal::{Navigator, SecretPrompt};
use crate::types::{Credentials, ExportError};
use std::io::Write;

/// Result of a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSummary {
    /// Number of transactions written (0 in raw mode)
    pub transactions: usize,
}

/// Run the complete export described by `config`
///
/// # Errors
///
/// Any error aborts the run; nothing is retried and nothing is written.
pub fn run(config: &ExportConfig, prompt: &mut dyn SecretPrompt) -> Result<ExportSummary, ExportError> {
    let mut navigator = Navigator::new(config.portal.clone())?;
    let mut credentials = Credentials::new(config.userid.as_str());
    navigator.login(&mut credentials, prompt)?;
    let account = navigator.select_account(&config.card)?;
    log::debug!("exporting card '{}'", account.card_label());
    let raw_csv = navigator.request_export(account, &config.range)?;

    match config.mode {
        OutputMode::RawCsv => {
            write_raw(&config.output, &raw_csv)?;
            Ok(ExportSummary { transactions: 0 })
        }
        OutputMode::Qif => {
            log::info!("Running csv->qif conversion...");
            let records = CsvParser::new(config.layout.clone()).parse(&raw_csv)?;
            let writer = QifWriter::new(config.qif.clone());
            match &config.output {
                OutputTarget::Stdout => writer.write_to(&records, &mut std::io::stdout().lock())?,
                OutputTarget::File(path) => writer.write_file(&records, path)?,
            }
            log::info!("Exported {} transactions", records.len());
            Ok(ExportSummary {
                transactions: records.len(),
            })
        }
    }
}

/// Store the CSV export unchanged
fn write_raw(target: &OutputTarget, raw_csv: &str) -> Result<(), ExportError> {
    match target {
        OutputTarget::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(raw_csv.as_bytes())?;
            stdout.flush()?;
        }
        OutputTarget::File(path) => {
            log::info!("Writing raw CSV to {}", path.display());
            std::fs::write(path, raw_csv).map_err(|e| ExportError::Io {
                message: format!("cannot write '{}': {}", path.display(), e),
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const EXPORT: &str = "\"Von:\";\"01.01.2020\";\n\"Ja\";\"03.01.2020\";\"02.01.2020\";\"AMAZON EU\";\"-12,34\";\"\";\n";

    #[test]
    fn test_write_raw_keeps_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        write_raw(&OutputTarget::File(path.clone()), EXPORT).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), EXPORT);
    }

    #[test]
    fn test_write_raw_unwritable_destination() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("raw.csv");
        let result = write_raw(&OutputTarget::File(path), EXPORT);
        assert!(matches!(result, Err(ExportError::Io { .. })));
    }
}
