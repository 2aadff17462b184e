//! Manual, non-queuing wake-up signal.

use crossbeam_channel::{Receiver, Sender};

/// Wakes an engine loop on demand.
///
/// Any number of triggers before the loop consumes the signal collapse into a
/// single pending wake-up.
#[derive(Clone)]
pub struct Notifier {
    sender: Sender<()>,
    receiver: Receiver<()>,
}

impl Notifier {
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        Self { sender, receiver }
    }

    /// Request a wake-up. Idempotent while one is already pending.
    pub fn trigger(&self) {
        let _ = self.sender.try_send(());
    }

    /// A detached trigger, for handing to controllers and click handlers.
    pub fn trigger_fn(&self) -> impl Fn() + Send + Sync + 'static {
        let sender = self.sender.clone();
        move || {
            let _ = sender.try_send(());
        }
    }

    pub fn receiver(&self) -> &Receiver<()> {
        &self.receiver
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
