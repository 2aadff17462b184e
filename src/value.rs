//! A value that can be swapped from any thread while a loop watches it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crossbeam_channel::{Receiver, Sender};

struct Slot<V> {
    value: V,
    // never sent on; dropping it disconnects every receiver handed out for
    // the current value
    _changed: Sender<()>,
    changed: Receiver<()>,
}

impl<V> Slot<V> {
    fn new(value: V) -> Self {
        let (_changed, changed) = crossbeam_channel::bounded(0);
        Self {
            value,
            _changed,
            changed,
        }
    }
}

/// Holds the current value (typically the render function of a module) and
/// signals watchers when it is replaced.
///
/// Each [`watch`](Self::watch) returns the value together with a receiver
/// that becomes ready exactly when that value is replaced. Because both are
/// taken under the same lock, a replacement can never slip in between a read
/// and the start of waiting. Only the latest write is ever observed.
pub struct FormatCell<V> {
    slot: Mutex<Slot<V>>,
}

impl<V: Clone> FormatCell<V> {
    pub fn new(value: V) -> Self {
        Self {
            slot: Mutex::new(Slot::new(value)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<V>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self) -> V {
        self.lock().value.clone()
    }

    /// Replace the value and wake everyone watching the previous one.
    pub fn set(&self, value: V) {
        // the old slot drops after the guard is released
        let _previous = core::mem::replace(&mut *self.lock(), Slot::new(value));
    }

    /// The current value plus a signal for its replacement.
    pub fn watch(&self) -> (V, Receiver<()>) {
        let slot = self.lock();
        (slot.value.clone(), slot.changed.clone())
    }

    /// A signal that fires once the current value is replaced.
    pub fn next(&self) -> Receiver<()> {
        self.lock().changed.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn replacement_wakes_watchers_once() {
        let cell = FormatCell::new(1);
        let (value, changed) = cell.watch();
        assert_eq!(value, 1);
        assert!(changed.try_recv().unwrap_err().is_empty());

        cell.set(2);
        assert!(changed.try_recv().unwrap_err().is_disconnected());

        let (value, changed) = cell.watch();
        assert_eq!(value, 2);
        assert!(changed.try_recv().unwrap_err().is_empty());
    }

    #[test]
    fn latest_write_wins() {
        let cell = FormatCell::new("a");
        let changed = cell.next();
        cell.set("b");
        cell.set("c");
        assert!(changed.try_recv().unwrap_err().is_disconnected());
        assert_eq!(cell.get(), "c");
    }

    #[test]
    fn set_from_other_thread_unblocks_select() {
        let cell = Arc::new(FormatCell::new(0u32));
        let (_, changed) = cell.watch();

        let writer = cell.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            writer.set(7);
        });

        crossbeam_channel::select! {
            recv(changed) -> _ => {}
            default(Duration::from_secs(1)) => panic!("watcher not woken"),
        }
        assert_eq!(cell.get(), 7);
        handle.join().unwrap();
    }
}
