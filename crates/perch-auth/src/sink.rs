//! User-facing status output
//!
//! The orchestrator never prints directly; it writes through a
//! [`StatusSink`] handed in by the caller. The CLI injects
//! [`ConsoleSink`]; tests inject a recording sink.

use colored::Colorize;

/// Sink for operator-facing status lines
pub trait StatusSink: Send + Sync {
    fn info(&self, msg: &str);
    fn success(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
    /// Unadorned line (indented detail under a status line)
    fn plain(&self, msg: &str);
}

/// Colored terminal sink
#[derive(Debug, Default, Clone)]
pub struct ConsoleSink;

impl StatusSink for ConsoleSink {
    fn info(&self, msg: &str) {
        println!("{} {}", "•".blue(), msg);
    }

    fn success(&self, msg: &str) {
        println!("{} {}", "✓".green().bold(), msg);
    }

    fn warn(&self, msg: &str) {
        println!("{} {}", "warning:".yellow().bold(), msg);
    }

    fn error(&self, msg: &str) {
        eprintln!("{} {}", "error:".red().bold(), msg);
    }

    fn plain(&self, msg: &str) {
        println!("{}", msg);
    }
}
