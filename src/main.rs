//! Card QIF Export CLI
//!
//! Logs into the online banking portal, downloads the credit card
//! transactions of a period and writes them as QIF.
//!
//! # Usage
//!
//! ```bash
//! card-qif-export --userid alice --cardid 1234 --from-date 01.01.2020 -o visa.qif
//! card-qif-export --userid alice --cardid 1234 --from-date 2020-01-01 --to-date 2020-01-31 -o -
//! card-qif-export --userid alice --cardid 1234 --from-date 01.01.2020 --raw -o visa.csv
//! echo "$PIN" | card-qif-export --userid alice --cardid 1234 --from-date 01.01.2020 -o visa.qif
//! ```
//!
//! The PIN is asked for interactively, or read from stdin when stdin is not
//! a terminal. It is never accepted as an argument.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 2: Invalid configuration (e.g. from-date after to-date)
//! - 3: Portal unreachable
//! - 4: Unexpected portal page
//! - 5: Authentication failed
//! - 6: Malformed CSV export
//! - 7: Output could not be written

use card_qif_export::cli::{self, Prompter};
use env_logger::Env;
use std::process;

fn main() {
    // Parse command-line arguments using clap
    let args = cli::parse_args();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let mut prompter = Prompter::stdio();
    let today = chrono::Local::now().date_naive();

    // Configuration is complete and validated before the first request
    let result = args
        .into_config(&mut prompter, today)
        .and_then(|config| card_qif_export::run(&config, &mut prompter));

    if let Err(e) = result {
        log::debug!("aborting: {:?}", e);
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}
