//! External process handling: the plumber and the yanker.
//!
//! Both run through `sh -c`. The plumber gets the URI as a positional
//! argument so quoting in the URI cannot break the command line; the
//! yanker reads the URI from stdin. Detached plumber children are
//! reaped from the event loop tick.

use std::io::{self, Read as _, Write as _};
use std::process::{Child, Command, Stdio};

use burrow_core::collab::{Plumber, Yanker};
use burrow_types::error::{BurrowError, Result};

use crate::tui;

pub struct ShellPlumber {
    command: String,
    parallel: bool,
    children: Vec<Child>,
}

impl ShellPlumber {
    pub fn new(command: &str, parallel: bool) -> Self {
        Self {
            command: command.to_owned(),
            parallel,
            children: Vec::new(),
        }
    }

    fn command_for(&self, uri: &str, detached: bool) -> Command {
        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(format!("{} \"$1\"", self.command))
            .arg("sh")
            .arg(uri);
        if detached {
            command
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null());
        }
        command
    }

    /// Collect exit statuses of detached children without blocking.
    pub fn reap(&mut self) {
        self.children.retain_mut(|child| match child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                if !status.success() {
                    log::debug!("plumber exited with {status}");
                }
                false
            }
            Err(err) => {
                log::debug!("failed to reap plumber: {err}");
                false
            }
        });
    }

    pub fn pending(&self) -> usize {
        self.children.len()
    }
}

impl Plumber for ShellPlumber {
    fn plumb(&mut self, uri: &str) -> Result<()> {
        if self.parallel {
            let child = self
                .command_for(uri, true)
                .spawn()
                .map_err(|err| BurrowError::Process(err.to_string()))?;
            self.children.push(child);
            return Ok(());
        }
        // Foreground: give the child the terminal, then wait for an
        // acknowledging keypress before repainting over its output.
        tui::suspended(|| -> Result<()> {
            let mut child = self
                .command_for(uri, false)
                .spawn()
                .map_err(|err| BurrowError::Process(err.to_string()))?;
            child
                .wait()
                .map_err(|err| BurrowError::Process(err.to_string()))?;
            eprint!("Press enter...");
            let _ = io::stderr().flush();
            let _ = io::stdin().read(&mut [0u8; 1]);
            Ok(())
        })?
    }
}

pub struct PipeYanker {
    command: String,
}

impl PipeYanker {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_owned(),
        }
    }
}

impl Yanker for PipeYanker {
    fn yank(&mut self, uri: &str) -> Result<()> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| BurrowError::Process(err.to_string()))?;
        if let Some(mut stdin) = child.stdin.take() {
            // The child may exit without reading; its status decides.
            let _ = stdin.write_all(uri.as_bytes());
        }
        let status = child
            .wait()
            .map_err(|err| BurrowError::Process(err.to_string()))?;
        if !status.success() {
            return Err(BurrowError::Process(format!(
                "{} exited with {status}",
                self.command
            )));
        }
        Ok(())
    }
}

// ---- tests ----
