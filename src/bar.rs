//! Output boundary of a module: rendered values, click events and sinks.

use std::fmt;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};

use crate::error::Error;

/// Mouse button (or wheel direction) of a click on a rendered segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Middle,
    Right,
    ScrollUp,
    ScrollDown,
    Back,
    Forward,
}

/// A click on a module's output, delivered by the host bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event {
    pub button: Button,
}

impl Event {
    pub fn new(button: Button) -> Self {
        Self { button }
    }
}

/// Callback run when the user clicks an output. Called from the host's
/// input thread, never from the engine loop.
pub type ClickHandler = Arc<dyn Fn(Event) + Send + Sync>;

/// How urgently an output wants attention. The host maps this to colours.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Tone {
    #[default]
    Normal,
    Warning,
    Critical,
}

/// One rendered value of a module.
#[derive(Clone, Default)]
pub struct Output {
    text: String,
    tone: Tone,
    on_click: Option<ClickHandler>,
}

impl Output {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = tone;
        self
    }

    pub fn on_click<F>(mut self, handler: F) -> Self
    where
        F: Fn(Event) + Send + Sync + 'static,
    {
        self.on_click = Some(Arc::new(handler));
        self
    }

    pub(crate) fn with_click_handler(mut self, handler: ClickHandler) -> Self {
        self.on_click = Some(handler);
        self
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn has_click_handler(&self) -> bool {
        self.on_click.is_some()
    }

    /// Deliver a click to this output's handler. Outputs without a handler
    /// ignore clicks.
    pub fn click(&self, event: Event) {
        if let Some(handler) = &self.on_click {
            handler(event);
        }
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("text", &self.text)
            .field("tone", &self.tone)
            .field("clickable", &self.on_click.is_some())
            .finish()
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Where a module renders to.
pub trait Sink {
    /// Publish a freshly rendered value.
    fn output(&mut self, output: Output);

    /// Report the error state of the current cycle.
    ///
    /// Returns `false` for `None`, meaning the caller should render, and
    /// `true` for `Some(_)`, meaning the caller must skip rendering this cycle.
    fn error(&mut self, err: Option<&Error>) -> bool;
}

/// What a [`ChannelSink`] forwards.
#[derive(Debug)]
pub enum Update {
    Output(Output),
    Error(String),
}

/// A sink that forwards everything over a channel, for hosts that compose
/// modules on another thread (and for tests).
#[derive(Clone)]
pub struct ChannelSink {
    sender: Sender<Update>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<Update>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (Self { sender }, receiver)
    }
}

impl Sink for ChannelSink {
    fn output(&mut self, output: Output) {
        if self.sender.send(Update::Output(output)).is_err() {
            tracing::trace!("sink receiver gone, dropping output");
        }
    }

    fn error(&mut self, err: Option<&Error>) -> bool {
        let Some(err) = err else {
            return false;
        };
        if self.sender.send(Update::Error(err.to_string())).is_err() {
            tracing::trace!("sink receiver gone, dropping error");
        }
        true
    }
}
