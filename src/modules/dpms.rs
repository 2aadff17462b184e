//! Display power management (DPMS) module with click-to-toggle.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::bar::{Button, ClickHandler, Event, Output};
use crate::engine::{Engine, Provider};
use crate::error::Result;
use crate::limiter::RateLimiter;
use crate::notifier::Notifier;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Reads and changes the DPMS state.
pub trait DpmsProvider: Send + Sync + 'static {
    /// Whether DPMS is currently enabled.
    fn get(&self) -> Result<bool>;

    fn set(&self, enabled: bool) -> Result<()>;
}

/// The rendered DPMS state, plus controls to change it.
#[derive(Clone)]
pub struct Dpms {
    pub enabled: bool,
    controls: Arc<Controls>,
}

struct Controls {
    provider: Arc<dyn DpmsProvider>,
    notifier: Notifier,
}

impl Dpms {
    pub fn enable(&self) {
        self.set_enabled(true);
    }

    pub fn disable(&self) {
        self.set_enabled(false);
    }

    /// Flip the state as currently reported by the provider, which may differ
    /// from the rendered one.
    pub fn toggle(&self) {
        match self.controls.provider.get() {
            Ok(enabled) => self.set_enabled(!enabled),
            Err(err) => tracing::warn!(%err, "error obtaining DPMS status"),
        }
    }

    fn set_enabled(&self, enabled: bool) {
        if let Err(err) = self.controls.provider.set(enabled) {
            tracing::warn!(%err, "error updating DPMS status");
            return;
        }
        self.controls.notifier.trigger();
    }
}

impl fmt::Display for Dpms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.enabled {
            f.write_str("dpms enabled")
        } else {
            f.write_str("dpms disabled")
        }
    }
}

pub struct DpmsSource {
    controls: Arc<Controls>,
}

impl Provider for DpmsSource {
    type Value = Dpms;

    fn query(&self) -> Result<Dpms> {
        Ok(Dpms {
            enabled: self.controls.provider.get()?,
            controls: self.controls.clone(),
        })
    }
}

pub type DpmsModule = Engine<DpmsSource>;

/// Build a DPMS module. A left click toggles DPMS, at most once per
/// `limiter` token.
pub fn new<P: DpmsProvider>(provider: P, limiter: Arc<RateLimiter>) -> DpmsModule {
    let notifier = Notifier::new();
    let controls = Arc::new(Controls {
        provider: Arc::new(provider),
        notifier: notifier.clone(),
    });

    let engine = Engine::with_notifier(DpmsSource { controls }, notifier, |dpms: &Dpms| {
        Output::text(dpms.to_string())
    })
    .on_click(move |dpms| default_click_handler(dpms.clone(), limiter.clone()));

    engine.every(DEFAULT_INTERVAL);
    engine
}

fn default_click_handler(dpms: Dpms, limiter: Arc<RateLimiter>) -> ClickHandler {
    Arc::new(move |event: Event| {
        if event.button == Button::Left && limiter.allow() {
            dpms.toggle();
        }
    })
}
