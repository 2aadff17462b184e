//! Lazy connect / reconnect of an audio capture source.

use crate::error::Result;

/// A live capture that can be shut down.
pub trait Capture: Send {
    /// Stop capturing and release the underlying resources.
    fn close(&mut self);
}

type Connect<C> = Box<dyn FnMut() -> Result<C> + Send>;

/// Owns at most one live [`Capture`] and knows how to open a new one.
///
/// Nothing is opened until first demand. A forced reconnect opens a fresh
/// capture and only then retires the old one; if opening fails, the old one
/// is closed as well and the connection reports not-ready.
pub struct Connection<C: Capture> {
    current: Option<C>,
    connect: Connect<C>,
}

impl<C: Capture> Connection<C> {
    pub fn new<F>(connect: F) -> Self
    where
        F: FnMut() -> Result<C> + Send + 'static,
    {
        Self {
            current: None,
            connect: Box::new(connect),
        }
    }

    /// Make sure a capture is live, (re)opening it if needed or `force`d.
    /// Returns whether a capture is live afterwards.
    pub fn ensure_connected(&mut self, force: bool) -> bool {
        if self.current.is_some() && !force {
            return true;
        }

        match (self.connect)() {
            Ok(capture) => {
                self.close();
                self.current = Some(capture);
                tracing::debug!(force, "capture connected");
                true
            }
            Err(err) => {
                tracing::warn!(%err, force, "capture connect failed");
                self.close();
                false
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.current.is_some()
    }

    /// Close the live capture, if any. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(mut capture) = self.current.take() {
            capture.close();
            tracing::debug!("capture closed");
        }
    }

    /// Swap the way new captures are opened. The live capture is kept.
    pub fn set_connect<F>(&mut self, connect: F)
    where
        F: FnMut() -> Result<C> + Send + 'static,
    {
        self.connect = Box::new(connect);
    }
}

impl<C: Capture> Drop for Connection<C> {
    fn drop(&mut self) {
        self.close();
    }
}
