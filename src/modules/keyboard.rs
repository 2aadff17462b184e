//! Keyboard layout module: shows the active layout and cycles through a
//! configured list on click or scroll.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use delegate::delegate;

use crate::bar::{Button, ClickHandler, Event, Output};
use crate::engine::{Engine, Provider};
use crate::error::Result;
use crate::limiter::RateLimiter;
use crate::notifier::Notifier;
use crate::selector::CyclicSelector;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Reads and switches the active keyboard layout.
pub trait LayoutProvider: Send + Sync + 'static {
    /// Name of the currently active layout, e.g. `"us"`.
    fn get_layout(&self) -> Result<String>;

    fn set_layout(&self, layout: &str) -> Result<()>;
}

/// The layout being rendered, plus the controls to switch it.
#[derive(Clone)]
pub struct Layout {
    pub name: String,
    controller: Arc<CyclicSelector>,
}

impl Layout {
    delegate! {
        to self.controller {
            /// Switch to the next configured layout, wrapping around.
            pub fn next(&self);
            /// Switch to the previous configured layout, wrapping around.
            pub fn previous(&self);
            /// Switch to `layout`. Layouts that were not configured are ignored.
            #[call(set)]
            pub fn set_layout(&self, layout: &str);
            /// All layouts configured on the module.
            #[call(labels)]
            pub fn layouts(&self) -> Vec<String>;
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl fmt::Debug for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout").field("name", &self.name).finish()
    }
}

/// Bridges a [`LayoutProvider`] into the engine, attaching the controller to
/// every queried layout.
pub struct LayoutSource<P> {
    provider: Arc<P>,
    controller: Arc<CyclicSelector>,
}

impl<P: LayoutProvider> Provider for LayoutSource<P> {
    type Value = Layout;

    fn query(&self) -> Result<Layout> {
        Ok(Layout {
            name: self.provider.get_layout()?,
            controller: self.controller.clone(),
        })
    }
}

pub type Keyboard<P> = Engine<LayoutSource<P>>;

/// Build a keyboard module cycling through `layouts`.
///
/// The layout active at construction is added to the list when missing.
/// Left click and scroll up switch to the next layout, right click and
/// scroll down to the previous one, at most once per `limiter` token.
pub fn new<P, I, S>(provider: P, layouts: I, limiter: Arc<RateLimiter>) -> Keyboard<P>
where
    P: LayoutProvider,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let provider = Arc::new(provider);
    let notifier = Notifier::new();

    let current = match provider.get_layout() {
        Ok(layout) => Some(layout),
        Err(err) => {
            tracing::warn!(%err, "error reading keyboard layout");
            None
        }
    };

    let setter = provider.clone();
    let controller = Arc::new(CyclicSelector::new(
        layouts,
        current.as_deref(),
        move |layout| setter.set_layout(layout),
        notifier.trigger_fn(),
    ));

    let engine = Engine::with_notifier(
        LayoutSource {
            provider,
            controller,
        },
        notifier,
        |layout: &Layout| Output::text(layout.name.clone()),
    )
    .on_click(move |layout| default_click_handler(layout.clone(), limiter.clone()));

    engine.every(DEFAULT_INTERVAL);
    engine
}

fn default_click_handler(layout: Layout, limiter: Arc<RateLimiter>) -> ClickHandler {
    Arc::new(move |event: Event| {
        if !limiter.allow() {
            return;
        }

        match event.button {
            Button::Left | Button::ScrollUp => layout.next(),
            Button::Right | Button::ScrollDown => layout.previous(),
            _ => {}
        }
    })
}
