//! Running external commands behind a seam that tests can fake.

use std::fmt;
use std::process::Command;

use crate::error::{Error, Result};

/// A command line: program name plus arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cmd {
    pub name: String,
    pub args: Vec<String>,
}

impl Cmd {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Whether this is exactly `name args...`.
    pub fn matches(&self, name: &str, args: &[&str]) -> bool {
        self.name == name && self.args.iter().map(String::as_str).eq(args.iter().copied())
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Executes commands. A non-zero exit must surface as [`Error::Exit`] so
/// callers can tell exit statuses apart.
pub trait CommandRunner: Send + Sync + 'static {
    /// Run and capture standard output.
    fn output(&self, cmd: &Cmd) -> Result<Vec<u8>>;

    /// Run for the side effect only.
    fn run(&self, cmd: &Cmd) -> Result<()> {
        self.output(cmd).map(|_| ())
    }
}

/// Runs commands on the host via [`std::process::Command`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn output(&self, cmd: &Cmd) -> Result<Vec<u8>> {
        tracing::trace!(%cmd, "running command");
        let output = Command::new(&cmd.name).args(&cmd.args).output()?;
        if !output.status.success() {
            return Err(Error::Exit {
                command: cmd.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }
}
