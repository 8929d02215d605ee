//! The filesystem/process gateway.
//!
//! Checks never touch the filesystem or spawn processes directly: they go
//! through the [`Gateway`] trait, so tests can substitute a recording
//! variant and observe exactly which commands a run would execute.

use crate::core::console::Console;
use crate::core::error::{Error, Result};
use std::process::{Command, Stdio};

/// Access to external commands, file contents, and report output.
pub trait Gateway {
    /// Runs an external command with inherited stdio and returns its exit
    /// code.
    ///
    /// A non-zero exit code is the normal way a wrapped tool signals a
    /// problem; only failure to launch the process at all is an error.
    fn run(&mut self, cmd: &[String]) -> Result<i32>;

    /// Reads a file's raw bytes.
    fn read_file(&mut self, path: &str) -> Result<Vec<u8>>;

    /// Prints report message lines, one `|  `-prefixed line each.
    fn print(&mut self, message: &str);
}

/// Production gateway backed by the real filesystem and process table.
#[derive(Debug)]
pub struct SystemGateway {
    console: Console,
}

impl SystemGateway {
    /// Creates a gateway reporting through the given console.
    #[must_use]
    pub fn new(console: Console) -> Self {
        Self { console }
    }
}

impl Gateway for SystemGateway {
    fn run(&mut self, cmd: &[String]) -> Result<i32> {
        let (program, args) = cmd
            .split_first()
            .ok_or_else(|| Error::internal("empty command"))?;

        if which::which(program).is_err() {
            return Err(Error::CommandNotFound {
                command: program.clone(),
            });
        }

        tracing::debug!(command = %cmd.join(" "), "running command");

        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .status()
            .map_err(|e| Error::io(format!("run {program}"), e))?;

        Ok(status.code().unwrap_or(1))
    }

    fn read_file(&mut self, path: &str) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|e| Error::io(format!("read {path}"), e))
    }

    fn print(&mut self, message: &str) {
        print_report(&self.console, message);
    }
}

/// Prints message lines in report form: `|  ` before each line.
pub(crate) fn print_report(console: &Console, message: &str) {
    for line in message.lines() {
        console.print(&format!("{}  {line}", console.blue("|")));
    }
}
