//! Operator input
//!
//! The flow only needs three gestures from the terminal: ask for a
//! value, ask yes/no, and wait for an acknowledgment. The trait keeps
//! the controllers testable; [`StdinPrompter`] is the real thing.
//!
//! There is no masked input in this environment — the `sensitive` hint
//! lets callers warn that a value will be visible while typing, it does
//! not change how the value is read.

use perch_core::{Error, Result};
use std::io::{BufRead, Write};

/// Synchronous operator prompting
pub trait Prompter: Send + Sync {
    /// Ask for a value. `sensitive` is a display hint only.
    fn ask(&self, label: &str, sensitive: bool) -> Result<String>;

    /// Ask a yes/no question; unrecognized answers count as "no"
    fn confirm(&self, question: &str) -> Result<bool>;

    /// Show a message and block until the operator presses enter
    fn pause(&self, message: &str) -> Result<()>;
}

/// Prompter reading from stdin
#[derive(Debug, Default, Clone)]
pub struct StdinPrompter;

impl StdinPrompter {
    fn read_line(&self) -> Result<String> {
        let mut input = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut input)
            .map_err(|e| Error::Prompt(e.to_string()))?;
        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }

    fn show(&self, prompt: &str) -> Result<()> {
        print!("{}", prompt);
        std::io::stdout()
            .flush()
            .map_err(|e| Error::Prompt(e.to_string()))?;
        Ok(())
    }
}

impl Prompter for StdinPrompter {
    fn ask(&self, label: &str, _sensitive: bool) -> Result<String> {
        self.show(&format!("  {}: ", label))?;
        self.read_line()
    }

    fn confirm(&self, question: &str) -> Result<bool> {
        self.show(&format!("{} (y/n) ", question))?;
        let answer = self.read_line()?;
        Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }

    fn pause(&self, message: &str) -> Result<()> {
        self.show(&format!("{} ", message))?;
        self.read_line()?;
        Ok(())
    }
}
