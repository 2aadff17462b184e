//! Fixed-size ring of batch amplitudes with a staleness clock.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Number of batch means the ring remembers.
pub const CAPACITY: usize = 32;

/// Without a write for longer than this, the level is unknown.
pub const STALE_AFTER: Duration = Duration::from_secs(2);

/// Anything that can report a current signal level.
///
/// `NaN` means "no signal known", which is different from a silent `0.0`.
pub trait Amplitude: Send + Sync {
    fn amplitude(&self) -> f64;
}

struct Slots {
    values: [Option<f64>; CAPACITY],
    cursor: usize,
    last_update: Instant,
}

/// Recent audio levels, written by the capture callback and read by the
/// module's tick.
///
/// Each [`write`](Self::write) collapses a batch of samples into its mean
/// absolute value and stores it in the next slot, overwriting the oldest.
pub struct SampleRing {
    slots: Mutex<Slots>,
}

impl SampleRing {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Slots {
                values: [None; CAPACITY],
                cursor: 0,
                last_update: Instant::now(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record one batch. Returns how many samples were consumed.
    ///
    /// Empty batches carry no level and are dropped without touching the
    /// staleness clock.
    pub fn write(&self, samples: &[f32]) -> usize {
        if samples.is_empty() {
            return 0;
        }

        let level = mean_abs(samples.iter().map(|&s| s as f64));

        let mut slots = self.lock();
        let cursor = slots.cursor;
        slots.values[cursor] = Some(level);
        slots.cursor = (cursor + 1) % CAPACITY;
        slots.last_update = Instant::now();

        samples.len()
    }

    /// Mean of all recorded batch levels, or `NaN` once the ring went stale.
    pub fn amplitude(&self) -> f64 {
        self.amplitude_at(Instant::now())
    }

    fn amplitude_at(&self, now: Instant) -> f64 {
        let slots = self.lock();
        if now.saturating_duration_since(slots.last_update) > STALE_AFTER {
            return f64::NAN;
        }

        // no populated slots yields 0/0
        mean_abs(slots.values.iter().flatten().copied())
    }
}

impl Default for SampleRing {
    fn default() -> Self {
        Self::new()
    }
}

impl Amplitude for SampleRing {
    fn amplitude(&self) -> f64 {
        SampleRing::amplitude(self)
    }
}

fn mean_abs(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v.abs(), count + 1));
    sum / count as f64
}
