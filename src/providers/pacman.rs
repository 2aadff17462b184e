//! Arch Linux package updates via `checkupdates` and `yay`.

use crate::error::{Error, Result};
use crate::exec::{Cmd, CommandRunner, SystemRunner};
use crate::modules::updates::{PackageDetail, UpdateInfo, UpdatesProvider};

/// `checkupdates` exits with this status when nothing is pending.
const NO_UPDATES: i32 = 2;

/// Parse lines of the form `name current -> target`. Blank lines are
/// skipped, anything else is rejected.
pub fn parse_package_details(raw: &str) -> Result<Vec<PackageDetail>> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [name, current, "->", target] => Ok(PackageDetail {
                    name: name.to_string(),
                    current_version: current.to_string(),
                    target_version: target.to_string(),
                }),
                _ => Err(Error::Parse(format!("unexpected update line {line:?}"))),
            }
        })
        .collect()
}

/// Pacman repository updates through `checkupdates`.
pub struct Checkupdates<R = SystemRunner> {
    runner: R,
}

impl Checkupdates {
    pub fn new() -> Self {
        Self::with_runner(SystemRunner)
    }
}

impl Default for Checkupdates {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> Checkupdates<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> UpdatesProvider for Checkupdates<R> {
    fn updates(&self) -> Result<UpdateInfo> {
        let out = match self.runner.output(&Cmd::new("checkupdates")) {
            Ok(out) => out,
            Err(err) if err.exit_code() == Some(NO_UPDATES) => return Ok(UpdateInfo::default()),
            Err(err) => return Err(err),
        };
        let details = parse_package_details(&String::from_utf8_lossy(&out))?;
        Ok(UpdateInfo::from_details(details))
    }
}

/// Repository and AUR updates through `yay`.
pub struct Yay<R = SystemRunner> {
    runner: R,
    aur_only: bool,
}

impl Yay {
    pub fn new() -> Self {
        Self::with_runner(SystemRunner)
    }
}

impl Default for Yay {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> Yay<R> {
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            aur_only: false,
        }
    }

    /// Only report AUR packages.
    pub fn aur_only(mut self) -> Self {
        self.aur_only = true;
        self
    }
}

impl<R: CommandRunner> UpdatesProvider for Yay<R> {
    fn updates(&self) -> Result<UpdateInfo> {
        let flag = if self.aur_only { "-Qua" } else { "-Qu" };
        let out = self.runner.output(&Cmd::new("yay").arg(flag))?;
        let details = parse_package_details(&String::from_utf8_lossy(&out))?;
        Ok(UpdateInfo::from_details(details))
    }
}
