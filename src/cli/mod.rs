// CLI module
// Command-line interface, interactive prompts and run configuration

mod args;
pub mod config;
pub mod prompt;

pub use args::CliArgs;
pub use config::{ExportConfig, OutputMode, OutputTarget};
pub use prompt::Prompter;

use clap::Parser;

/// Parse command-line arguments using clap
///
/// If parsing fails (e.g., invalid arguments, missing required arguments, or
/// --help flag), clap will automatically display an error message or help
/// text and exit the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
