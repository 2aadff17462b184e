//! The reactive loop every polling module runs on.
//!
//! An [`Engine`] owns a [`Scheduler`], a [`Notifier`] and a [`FormatCell`]
//! holding the current render function. It queries its [`Provider`],
//! renders the result into a [`Sink`], then blocks until the next of
//! {tick, refresh, format change} and goes around again.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pegel::{ChannelSink, Engine, Output, ProviderFn};
//!
//! let engine = Arc::new(Engine::new(
//!     ProviderFn::new(|| Ok(std::process::id())),
//!     |pid: &u32| Output::text(format!("pid {pid}")),
//! ));
//! engine.every(Duration::from_secs(5));
//!
//! let (mut sink, updates) = ChannelSink::new();
//! let runner = engine.clone();
//! std::thread::spawn(move || runner.stream(&mut sink));
//!
//! engine.refresh();
//! # drop(updates);
//! ```

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::select;

use crate::bar::{ClickHandler, Output, Sink};
use crate::error::Result;
use crate::notifier::Notifier;
use crate::timing::Scheduler;
use crate::value::FormatCell;

/// Source of the latest domain value for one module kind.
///
/// Implementations may block (shelling out, reading sysfs); a slow provider
/// only stalls the module it belongs to.
pub trait Provider: Send + Sync + 'static {
    type Value: Send + 'static;

    fn query(&self) -> Result<Self::Value>;
}

/// Adapts a closure into a [`Provider`].
pub struct ProviderFn<F>(F);

impl<F> ProviderFn<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F, T> Provider for ProviderFn<F>
where
    F: Fn() -> Result<T> + Send + Sync + 'static,
    T: Send + 'static,
{
    type Value = T;

    fn query(&self) -> Result<T> {
        (self.0)()
    }
}

/// A render function from a domain value to bar output.
pub type Format<T> = Arc<dyn Fn(&T) -> Output + Send + Sync>;

type ClickFactory<T> = Arc<dyn Fn(&T) -> ClickHandler + Send + Sync>;

/// What woke the loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Wake {
    Format,
    Refresh,
    Tick,
}

/// Drives one module: query, render, wait, repeat.
///
/// `stream` takes `&self` so the same engine can be reconfigured
/// ([`every`](Self::every), [`output`](Self::output),
/// [`refresh`](Self::refresh)) from other threads while it runs; wrap it in an
/// [`Arc`] to share it.
pub struct Engine<P: Provider> {
    provider: P,
    format: FormatCell<Format<P::Value>>,
    notifier: Notifier,
    scheduler: Scheduler,
    click: Option<ClickFactory<P::Value>>,
}

impl<P: Provider> Engine<P> {
    /// Create an engine with its own notifier. The scheduler starts idle.
    pub fn new<F>(provider: P, format: F) -> Self
    where
        F: Fn(&P::Value) -> Output + Send + Sync + 'static,
    {
        Self::with_notifier(provider, Notifier::new(), format)
    }

    /// Create an engine around an existing notifier, so that controllers
    /// built before the engine can already hold its trigger.
    pub fn with_notifier<F>(provider: P, notifier: Notifier, format: F) -> Self
    where
        F: Fn(&P::Value) -> Output + Send + Sync + 'static,
    {
        Self {
            provider,
            format: FormatCell::new(Arc::new(format)),
            notifier,
            scheduler: Scheduler::new(),
            click: None,
        }
    }

    /// Attach a default click handler, derived from the value being rendered,
    /// to every output whose format did not install its own.
    pub fn on_click<F>(mut self, factory: F) -> Self
    where
        F: Fn(&P::Value) -> ClickHandler + Send + Sync + 'static,
    {
        self.click = Some(Arc::new(factory));
        self
    }

    /// Set the refresh interval. Zero disables periodic refreshing.
    pub fn every(&self, interval: Duration) -> &Self {
        self.scheduler.every(interval);
        self
    }

    /// Replace the render function. A running loop re-renders the value it
    /// already holds, without querying the provider again.
    pub fn output<F>(&self, format: F) -> &Self
    where
        F: Fn(&P::Value) -> Output + Send + Sync + 'static,
    {
        self.format.set(Arc::new(format));
        self
    }

    /// Force a fresh query and render.
    pub fn refresh(&self) {
        self.notifier.trigger();
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Run the loop. Never returns.
    ///
    /// The provider is queried once before the first wait, so the first
    /// output does not depend on the refresh interval. An erroring query is
    /// reported to the sink and nothing is rendered, but the loop still
    /// blocks for the next event.
    pub fn stream<S: Sink>(&self, sink: &mut S) {
        let mut latest = self.provider.query();
        let (mut format, mut format_changed) = self.format.watch();

        loop {
            if !sink.error(latest.as_ref().err()) {
                if let Ok(value) = &latest {
                    sink.output(self.render(&format, value));
                }
            }

            let wake = select! {
                recv(format_changed) -> _ => Wake::Format,
                recv(self.notifier.receiver()) -> _ => Wake::Refresh,
                recv(self.scheduler.ticks()) -> _ => Wake::Tick,
            };
            tracing::trace!(?wake, "engine woke");

            match wake {
                Wake::Format => (format, format_changed) = self.format.watch(),
                Wake::Refresh | Wake::Tick => latest = self.provider.query(),
            }

            if let Err(err) = &latest {
                tracing::debug!(%err, "provider query failed");
            }
        }
    }

    fn render(&self, format: &Format<P::Value>, value: &P::Value) -> Output {
        let output = format(value);
        match &self.click {
            Some(click) if !output.has_click_handler() => output.with_click_handler(click(value)),
            _ => output,
        }
    }
}

/// Convenience for providers whose value is rendered with `Display`.
pub fn display_format<T: core::fmt::Display>(value: &T) -> Output {
    Output::text(value.to_string())
}
