//! Keyboard layouts via `setxkbmap`.

use crate::error::{Error, Result};
use crate::exec::{Cmd, CommandRunner, SystemRunner};
use crate::modules::keyboard::LayoutProvider;

/// What `setxkbmap -query` reports.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XkbInfo {
    pub rules: String,
    pub model: String,
    pub layout: String,
}

/// Parse `key: value` lines, ignoring keys we do not track.
pub fn parse_query(raw: &str) -> XkbInfo {
    let mut info = XkbInfo::default();
    for line in raw.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        match key.trim() {
            "rules" => info.rules = value,
            "model" => info.model = value,
            "layout" => info.layout = value,
            _ => {}
        }
    }
    info
}

pub struct Xkbmap<R = SystemRunner> {
    runner: R,
}

impl Xkbmap {
    pub fn new() -> Self {
        Self::with_runner(SystemRunner)
    }
}

impl Default for Xkbmap {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> Xkbmap<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    pub fn query(&self) -> Result<XkbInfo> {
        let out = self.runner.output(&Cmd::new("setxkbmap").arg("-query"))?;
        Ok(parse_query(&String::from_utf8_lossy(&out)))
    }
}

impl<R: CommandRunner> LayoutProvider for Xkbmap<R> {
    fn get_layout(&self) -> Result<String> {
        let info = self.query()?;
        if info.layout.is_empty() {
            return Err(Error::Parse("setxkbmap reported no layout".into()));
        }
        Ok(info.layout)
    }

    fn set_layout(&self, layout: &str) -> Result<()> {
        self.runner.run(&Cmd::new("setxkbmap").arg(layout))
    }
}
