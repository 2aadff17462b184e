//! Available package updates.

use std::fmt;
use std::time::Duration;

use crate::bar::Output;
use crate::engine::{Engine, Provider};
use crate::error::Result;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Counts (and optionally details) pending package updates.
pub trait UpdatesProvider: Send + Sync + 'static {
    fn updates(&self) -> Result<UpdateInfo>;
}

/// A single package that can be upgraded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackageDetail {
    pub name: String,
    pub current_version: String,
    pub target_version: String,
}

impl fmt::Display for PackageDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.name, self.current_version, self.target_version)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateInfo {
    pub count: usize,
    /// May be empty even when `count` is not, for providers that only count.
    pub details: Vec<PackageDetail>,
}

impl UpdateInfo {
    pub fn from_details(details: Vec<PackageDetail>) -> Self {
        Self {
            count: details.len(),
            details,
        }
    }

    /// One line per package.
    pub fn details_text(&self) -> String {
        self.details
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub struct UpdatesSource<P>(P);

impl<P: UpdatesProvider> Provider for UpdatesSource<P> {
    type Value = UpdateInfo;

    fn query(&self) -> Result<UpdateInfo> {
        self.0.updates()
    }
}

pub type Updates<P> = Engine<UpdatesSource<P>>;

pub fn default_format(info: &UpdateInfo) -> Output {
    match info.count {
        1 => Output::text("1 update"),
        n => Output::text(format!("{n} updates")),
    }
}

/// Build an updates module refreshing once an hour.
pub fn new<P: UpdatesProvider>(provider: P) -> Updates<P> {
    let engine = Engine::new(UpdatesSource(provider), default_format);
    engine.every(DEFAULT_INTERVAL);
    engine
}
