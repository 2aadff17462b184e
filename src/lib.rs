//! Reactive value streams for status bar modules.
//!
//! Every module kind is a [`Provider`] driven by an [`Engine`]: the engine
//! queries, renders through a swappable format function, and re-runs on a
//! timer tick, an explicit refresh, or a format change. The microphone meter
//! in [`modules::micamp`] is the exception: it samples a [`audio::SampleRing`]
//! fed by a live capture stream and keeps that stream connected.

pub mod audio;
pub mod bar;
pub mod engine;
pub mod error;
pub mod exec;
pub mod limiter;
pub mod modules;
pub mod notifier;
pub mod providers;
pub mod selector;
pub mod timing;
pub mod value;

pub use bar::{Button, ChannelSink, ClickHandler, Event, Output, Sink, Tone, Update};
pub use engine::{display_format, Engine, Format, Provider, ProviderFn};
pub use error::{Error, Result};
pub use limiter::RateLimiter;
pub use notifier::Notifier;
pub use selector::CyclicSelector;
pub use timing::Scheduler;
pub use value::FormatCell;
