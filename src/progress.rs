//! Progress diagnostics for verbose mode.

use chrono::Utc;

/// Writes timestamped progress lines to stderr when verbose mode is on.
///
/// Non-verbose runs emit nothing here; the final summary and fatal error text
/// are printed by the caller regardless.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    verbose: bool,
}

impl Reporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Emit one progress line.
    pub fn step(&self, message: impl AsRef<str>) {
        if self.verbose {
            eprintln!(
                "[{}] {}",
                Utc::now().format("%H:%M:%S"),
                message.as_ref()
            );
        }
    }
}
