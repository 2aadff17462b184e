//! Stoppable, re-armable periodic timer.
//!
//! Ticks are delivered on a channel with room for exactly one pending tick:
//! a loop that falls behind sees one tick, never a backlog.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};

struct TimerState {
    interval: Option<Duration>,
    /// Bumped on every re-arm or stop; a timer thread exits once its
    /// generation is no longer current.
    generation: u64,
}

struct Shared {
    state: Mutex<TimerState>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, TimerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Produces [`Instant`] ticks at a fixed interval until stopped.
///
/// Safe to reconfigure from any thread while a loop is waiting on
/// [`ticks`](Self::ticks).
pub struct Scheduler {
    shared: Arc<Shared>,
    sender: Sender<Instant>,
    receiver: Receiver<Instant>,
}

impl Scheduler {
    /// A scheduler that does not tick until [`every`](Self::every) is called.
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(TimerState {
                    interval: None,
                    generation: 0,
                }),
                wake: Condvar::new(),
            }),
            sender,
            receiver,
        }
    }

    /// Tick every `interval`, replacing any previous interval. The first tick
    /// arrives one full interval from now. A zero interval stops the timer.
    pub fn every(&self, interval: Duration) -> &Self {
        if interval.is_zero() {
            self.stop();
            return self;
        }

        let generation = {
            let mut state = self.shared.lock();
            state.generation += 1;
            state.interval = Some(interval);
            state.generation
        };
        self.shared.wake.notify_all();

        tracing::debug!(?interval, "scheduler armed");

        let shared = self.shared.clone();
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name("pegel-timer".into())
            .spawn(move || run_timer(shared, sender, generation, interval));
        if let Err(err) = spawned {
            tracing::warn!(%err, "failed to spawn timer thread");
        }
        self
    }

    /// Stop producing ticks. A tick that already fired but was not consumed
    /// yet can still be received once.
    pub fn stop(&self) {
        {
            let mut state = self.shared.lock();
            state.generation += 1;
            state.interval = None;
        }
        self.shared.wake.notify_all();
    }

    /// Fire one tick right now, independent of the configured interval.
    pub fn tick(&self) {
        let _ = self.sender.try_send(Instant::now());
    }

    /// The currently configured interval, `None` when stopped.
    pub fn interval(&self) -> Option<Duration> {
        self.shared.lock().interval
    }

    pub fn ticks(&self) -> &Receiver<Instant> {
        &self.receiver
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_timer(shared: Arc<Shared>, sender: Sender<Instant>, generation: u64, interval: Duration) {
    // None: the next tick lies beyond what `Instant` can represent
    let mut deadline = Instant::now().checked_add(interval);
    let mut state = shared.lock();

    loop {
        if state.generation != generation {
            return;
        }

        let Some(due) = deadline else {
            state = shared.wake.wait(state).unwrap_or_else(PoisonError::into_inner);
            continue;
        };

        let now = Instant::now();
        if now >= due {
            // full means the previous tick is still pending; collapse into it
            let _ = sender.try_send(now);
            deadline = match due.checked_add(interval) {
                Some(next) if next > now => Some(next),
                _ => now.checked_add(interval),
            };
            continue;
        }

        state = match shared.wake.wait_timeout(state, due - now) {
            Ok((guard, _)) => guard,
            Err(poisoned) => poisoned.into_inner().0,
        };
    }
}
