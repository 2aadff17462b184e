//! Microphone amplitude module.
//!
//! Gives a visual indication that audio is passing through the microphone.
//! Default output:
//!
//! - mic muted, stream dead or no data for a while: `NaN .......... 🎙`
//! - mic receiving audio: `0%   .......... 🎙`, `50%  :::::..... 🎙`,
//!   `100% :::::::::: 🎙`
//! - amplitude outside `0..=1`: `ERR 200% (amp=2.000) 🎙`

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crossbeam_channel::{select, Receiver};

use crate::audio::{Amplitude, Capture, Connection};
use crate::bar::{Output, Sink, Tone};
use crate::engine::Format;
use crate::error::Result;
use crate::timing::Scheduler;
use crate::value::FormatCell;

#[cfg(feature = "cpal_capture")]
use crate::audio::{CpalCapture, SampleRing};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

const MIC: &str = "🎙";

/// Renders a level in `0..=1` as a ten-step meter.
pub fn level_bar(amp: f64) -> String {
    let percentage = (amp * 100.0) as i64;
    match percentage {
        0..=100 => {
            let filled = (percentage / 10) as usize;
            format!(
                "{:<5}{}{} {MIC}",
                format!("{percentage}%"),
                ":".repeat(filled),
                ".".repeat(10 - filled),
            )
        }
        _ => format!("ERR {percentage}% (amp={amp:.3}) {MIC}"),
    }
}

/// The default render function. `NaN` (no signal known) and exact silence
/// render distinctly from any measured level.
pub fn default_format(amp: &f64) -> Output {
    let amp = *amp;
    if amp.is_nan() {
        return Output::text(format!("NaN .......... {MIC}")).with_tone(Tone::Critical);
    }
    if amp == 0.0 {
        return Output::text(format!("0%   .......... {MIC}")).with_tone(Tone::Warning);
    }
    Output::text(level_bar(amp))
}

/// Samples the microphone level once per tick and renders it.
///
/// Silence is treated as suspicious: whenever the measured level is exactly
/// zero or unknown, the next tick tears the capture down and opens a new
/// one, which recovers streams that died without reporting an error.
pub struct MicAmp<C: Capture> {
    scheduler: Scheduler,
    format: FormatCell<Format<f64>>,
    sampler: Arc<dyn Amplitude>,
    connection: Mutex<Connection<C>>,
    force_reconnect: AtomicBool,
    /// Bits of the last rendered level, for re-rendering on format change.
    last: AtomicU64,
}

#[cfg(feature = "cpal_capture")]
impl MicAmp<CpalCapture> {
    /// Meter the first input device whose name starts with `device_prefix`,
    /// or the default input when it is empty.
    pub fn new(device_prefix: &str) -> Self {
        let ring = Arc::new(SampleRing::new());
        let prefix = device_prefix.to_string();
        let writer = ring.clone();
        Self::with_parts(ring, move || CpalCapture::open(&prefix, writer.clone()))
    }
}

impl<C: Capture + 'static> MicAmp<C> {
    /// Assemble a module from a level source and a way to (re)open the
    /// capture feeding it.
    pub fn with_parts<F>(sampler: Arc<dyn Amplitude>, connect: F) -> Self
    where
        F: FnMut() -> Result<C> + Send + 'static,
    {
        let scheduler = Scheduler::new();
        scheduler.every(DEFAULT_INTERVAL);
        Self {
            scheduler,
            format: FormatCell::new(Arc::new(default_format)),
            sampler,
            connection: Mutex::new(Connection::new(connect)),
            force_reconnect: AtomicBool::new(false),
            last: AtomicU64::new(f64::NAN.to_bits()),
        }
    }

    fn connection(&self) -> MutexGuard<'_, Connection<C>> {
        self.connection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the sampling interval. Zero pauses sampling.
    pub fn every(&self, interval: Duration) -> &Self {
        self.scheduler.every(interval);
        self
    }

    /// Replace the render function.
    pub fn output<F>(&self, format: F) -> &Self
    where
        F: Fn(&f64) -> Output + Send + Sync + 'static,
    {
        self.format.set(Arc::new(format));
        self
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn is_connected(&self) -> bool {
        self.connection().is_connected()
    }

    /// Replace how new captures are opened (e.g. after the user picked a
    /// different device). Takes effect on the next (re)connect.
    pub fn set_connect<F>(&self, connect: F)
    where
        F: FnMut() -> Result<C> + Send + 'static,
    {
        self.connection().set_connect(connect);
    }

    /// Run until `cancel` fires or disconnects, then close the capture.
    pub fn stream<S: Sink>(&self, sink: &mut S, cancel: &Receiver<()>) {
        let mut format_changed = self.format.next();

        loop {
            select! {
                recv(cancel) -> _ => break,
                recv(self.scheduler.ticks()) -> _ => self.process(sink),
                recv(format_changed) -> _ => {
                    format_changed = self.format.next();
                    let amp = f64::from_bits(self.last.load(Ordering::Relaxed));
                    self.render(sink, amp);
                }
            }
        }

        self.connection().close();
        tracing::debug!("micamp stopped");
    }

    /// One tick: check the capture, read the level, render it.
    pub fn process<S: Sink>(&self, sink: &mut S) {
        let force = self.force_reconnect.swap(false, Ordering::Relaxed);
        if !self.connection().ensure_connected(force) {
            self.render(sink, f64::NAN);
            return;
        }

        let amp = self.sampler.amplitude();
        if amp == 0.0 || amp.is_nan() {
            self.force_reconnect.store(true, Ordering::Relaxed);
        }
        self.render(sink, amp);
    }

    fn render<S: Sink>(&self, sink: &mut S, amp: f64) {
        self.last.store(amp.to_bits(), Ordering::Relaxed);
        let format = self.format.get();
        sink.output(format(&amp));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bar::{ChannelSink, Update};
    use crate::error::Error;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn meter_bands() {
        assert_eq!(level_bar(0.00001), "0%   .......... 🎙");
        assert_eq!(level_bar(0.01), "1%   .......... 🎙");
        assert_eq!(level_bar(0.12), "12%  :......... 🎙");
        assert_eq!(level_bar(0.22), "22%  ::........ 🎙");
        assert_eq!(level_bar(0.32), "32%  :::....... 🎙");
        assert_eq!(level_bar(0.42), "42%  ::::...... 🎙");
        assert_eq!(level_bar(0.52), "52%  :::::..... 🎙");
        assert_eq!(level_bar(0.62), "62%  ::::::.... 🎙");
        assert_eq!(level_bar(0.72), "72%  :::::::... 🎙");
        assert_eq!(level_bar(0.82), "82%  ::::::::.. 🎙");
        assert_eq!(level_bar(0.92), "92%  :::::::::. 🎙");
        assert_eq!(level_bar(0.99), "99%  :::::::::. 🎙");
        assert_eq!(level_bar(1.0), "100% :::::::::: 🎙");
        assert_eq!(level_bar(2.0), "ERR 200% (amp=2.000) 🎙");
        assert_eq!(level_bar(-0.5), "ERR -50% (amp=-0.500) 🎙");
    }

    #[test]
    fn zero_and_nan_are_distinct() {
        let zero = default_format(&0.0);
        let nan = default_format(&f64::NAN);
        assert_eq!(zero.as_str(), "0%   .......... 🎙");
        assert_eq!(zero.tone(), Tone::Warning);
        assert_eq!(nan.as_str(), "NaN .......... 🎙");
        assert_eq!(nan.tone(), Tone::Critical);
        assert_eq!(default_format(&0.5).as_str(), "50%  :::::..... 🎙");
    }

    struct FakeLevel(Mutex<f64>);

    impl FakeLevel {
        fn set(&self, amp: f64) {
            *self.0.lock().unwrap() = amp;
        }
    }

    impl Amplitude for FakeLevel {
        fn amplitude(&self) -> f64 {
            *self.0.lock().unwrap()
        }
    }

    struct FakeCapture(Arc<AtomicUsize>);

    impl Capture for FakeCapture {
        fn close(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Harness {
        module: MicAmp<FakeCapture>,
        level: Arc<FakeLevel>,
        opened: Arc<AtomicUsize>,
        closed: Arc<AtomicUsize>,
        sink: ChannelSink,
        updates: Receiver<Update>,
    }

    impl Harness {
        fn new() -> Self {
            let level = Arc::new(FakeLevel(Mutex::new(0.0)));
            let opened = Arc::new(AtomicUsize::new(0));
            let closed = Arc::new(AtomicUsize::new(0));
            let module = MicAmp::with_parts(level.clone(), Self::connector(&opened, &closed));
            module.every(Duration::ZERO);
            let (sink, updates) = ChannelSink::new();
            Self {
                module,
                level,
                opened,
                closed,
                sink,
                updates,
            }
        }

        fn connector(
            opened: &Arc<AtomicUsize>,
            closed: &Arc<AtomicUsize>,
        ) -> impl FnMut() -> Result<FakeCapture> + Send + 'static {
            let (opened, closed) = (opened.clone(), closed.clone());
            move || {
                opened.fetch_add(1, Ordering::SeqCst);
                Ok(FakeCapture(closed.clone()))
            }
        }

        fn tick(&mut self, amp: f64) -> String {
            self.level.set(amp);
            self.module.process(&mut self.sink);
            match self.updates.try_recv() {
                Ok(Update::Output(out)) => out.as_str().to_string(),
                other => panic!("expected output, got {other:?}"),
            }
        }
    }

    #[test]
    fn renders_and_reconnects_on_silence() {
        let mut h = Harness::new();

        assert_eq!(h.tick(0.0), "0%   .......... 🎙");
        assert_eq!(h.opened.load(Ordering::SeqCst), 1);

        // silence on the previous tick forces a fresh capture now
        assert_eq!(h.tick(0.001), "0%   .......... 🎙");
        assert_eq!(h.opened.load(Ordering::SeqCst), 2);
        assert_eq!(h.closed.load(Ordering::SeqCst), 1);

        assert_eq!(h.tick(0.5), "50%  :::::..... 🎙");
        assert_eq!(h.opened.load(Ordering::SeqCst), 2);

        assert_eq!(h.tick(f64::NAN), "NaN .......... 🎙");
        assert_eq!(h.tick(1.0), "100% :::::::::: 🎙");
        assert_eq!(h.opened.load(Ordering::SeqCst), 3);

        assert_eq!(h.tick(2.0), "ERR 200% (amp=2.000) 🎙");
    }

    #[test]
    fn failing_source_renders_nan_until_it_recovers() {
        let mut h = Harness::new();
        assert_eq!(h.tick(f64::NAN), "NaN .......... 🎙");

        h.module
            .set_connect(|| Err(Error::Capture("ze-failure".into())));
        assert_eq!(h.tick(0.3), "NaN .......... 🎙");
        assert!(!h.module.is_connected());
        assert_eq!(h.closed.load(Ordering::SeqCst), 1);

        assert_eq!(h.tick(0.3), "NaN .......... 🎙");
        assert!(!h.module.is_connected());

        h.module
            .set_connect(Harness::connector(&h.opened, &h.closed));
        assert_eq!(h.tick(0.01), "1%   .......... 🎙");
        assert!(h.module.is_connected());
    }

    #[test]
    fn cancel_closes_capture_once() {
        let mut h = Harness::new();
        h.tick(0.4);
        assert!(h.module.is_connected());

        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded::<()>(1);
        cancel_tx.send(()).unwrap();
        h.module.stream(&mut h.sink, &cancel_rx);

        assert!(!h.module.is_connected());
        assert_eq!(h.closed.load(Ordering::SeqCst), 1);
        drop(h.module);
        assert_eq!(h.closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stream_samples_on_tick() {
        let h = Harness::new();
        h.level.set(0.25);
        h.module.scheduler().tick();

        let (cancel_tx, cancel_rx) = crossbeam_channel::bounded::<()>(1);
        let module = Arc::new(h.module);
        let runner = module.clone();
        let mut sink = h.sink;
        let worker = std::thread::spawn(move || runner.stream(&mut sink, &cancel_rx));

        match h.updates.recv_timeout(Duration::from_secs(1)) {
            Ok(Update::Output(out)) => assert_eq!(out.as_str(), "25%  ::........ 🎙"),
            other => panic!("expected output, got {other:?}"),
        }

        module.output(|amp: &f64| Output::text(format!("{amp:.2}")));
        match h.updates.recv_timeout(Duration::from_secs(1)) {
            Ok(Update::Output(out)) => assert_eq!(out.as_str(), "0.25"),
            other => panic!("expected output, got {other:?}"),
        }

        drop(cancel_tx);
        worker.join().unwrap();
        assert_eq!(h.closed.load(Ordering::SeqCst), 1);
    }
}
