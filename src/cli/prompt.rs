//! Interactive prompts
//!
//! Prompts go to stderr so stdout stays free for `--output -`. When stdin is
//! not a terminal, answers are read line by line from it and nothing is
//! asked twice.

use crate::portal::SecretPrompt;
use crate::types::ExportError;
use std::io::{self, BufRead, IsTerminal, Stderr, StdinLock, Write};

/// Line-based prompter over any reader/writer pair
#[derive(Debug)]
pub struct Prompter<R, W> {
    input: R,
    output: W,
    terminal: bool,
}

impl Prompter<StdinLock<'static>, Stderr> {
    /// Prompter on the process' stdin and stderr
    pub fn stdio() -> Self {
        let stdin = io::stdin();
        let terminal = stdin.is_terminal();
        Self::new(stdin.lock(), io::stderr(), terminal)
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    /// `terminal` enables hidden secret input and re-asking after bad answers
    pub fn new(input: R, output: W, terminal: bool) -> Self {
        Self {
            input,
            output,
            terminal,
        }
    }

    /// Ask for one line of input
    pub fn line(&mut self, label: &str) -> Result<String, ExportError> {
        if self.terminal {
            write!(self.output, "{}: ", label)?;
            self.output.flush()?;
        }

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            return Err(ExportError::Io {
                message: format!("no input available for '{}'", label),
            });
        }
        Ok(answer.trim().to_string())
    }

    /// Ask until `parse` accepts the answer
    ///
    /// Without a terminal the first rejection is returned as the error.
    pub fn until<T, F>(&mut self, label: &str, parse: F) -> Result<T, ExportError>
    where
        F: Fn(&str) -> Result<T, ExportError>,
    {
        loop {
            let answer = self.line(label)?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(e) if self.terminal => writeln!(self.output, "{}", e)?,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: BufRead, W: Write> SecretPrompt for Prompter<R, W> {
    fn secret(&mut self, label: &str) -> Result<String, ExportError> {
        loop {
            let secret = if self.terminal {
                rpassword::prompt_password(format!("{}: ", label))?
            } else {
                self.line(label)?
            };

            let secret = secret.trim();
            if !secret.is_empty() {
                return Ok(secret.to_string());
            }
            if !self.terminal {
                return Err(ExportError::config(format!("empty {} on stdin", label)));
            }
        }
    }
}
