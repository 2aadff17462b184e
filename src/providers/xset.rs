//! DPMS state via `xset`.

use crate::error::{Error, Result};
use crate::exec::{Cmd, CommandRunner, SystemRunner};
use crate::modules::dpms::DpmsProvider;

/// Find the `DPMS is Enabled|Disabled` line of `xset -q`.
pub fn parse_dpms_status(raw: &str) -> Result<bool> {
    raw.lines()
        .find_map(|line| {
            let state = line.trim_start().strip_prefix("DPMS is")?;
            state.starts_with(char::is_whitespace).then(|| state.trim())
        })
        .map(|state| state == "Enabled")
        .ok_or_else(|| Error::Parse("failed to match DPMS status".into()))
}

pub struct Xset<R = SystemRunner> {
    runner: R,
}

impl Xset {
    pub fn new() -> Self {
        Self::with_runner(SystemRunner)
    }
}

impl Default for Xset {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> Xset<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> DpmsProvider for Xset<R> {
    fn get(&self) -> Result<bool> {
        let out = self.runner.output(&Cmd::new("xset").arg("-q"))?;
        parse_dpms_status(&String::from_utf8_lossy(&out))
    }

    fn set(&self, enabled: bool) -> Result<()> {
        let flag = if enabled { "+dpms" } else { "-dpms" };
        self.runner.run(&Cmd::new("xset").arg(flag))
    }
}
