//! Traits for the surfaces the core cannot provide itself.
//!
//! The navigation engine occasionally needs to ask the user a question
//! or hand an item to an external program mid-fetch. Rather than talk
//! to the terminal or spawn processes here, it goes through these
//! traits; the application crate implements them over the TUI and
//! `sh -c`.

use std::time::Duration;

use burrow_types::error::Result;

/// Asks the user for input on the status line.
pub trait Prompter {
    /// Line editor with the given label. `None` means the user
    /// cancelled instead of submitting.
    fn prompt_line(&mut self, label: &str) -> Option<String>;

    /// Yes/no question that gives up (as "no") once `timeout` passes
    /// without an answer.
    fn confirm(&mut self, question: &str, timeout: Duration) -> bool;
}

/// Hands a URI to an external viewer.
pub trait Plumber {
    fn plumb(&mut self, uri: &str) -> Result<()>;
}

/// Hands a URI to an external clipboard command.
pub trait Yanker {
    fn yank(&mut self, uri: &str) -> Result<()>;
}
