mod common;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Receiver;
use pegel::modules::dpms::{self, DpmsProvider};
use pegel::{Button, ChannelSink, Error, Event, Output, RateLimiter, Result, Update};

const WAIT: Duration = Duration::from_secs(2);
const QUIET: Duration = Duration::from_millis(150);

#[derive(Clone, Default)]
struct FakeDpms {
    enabled: Arc<AtomicBool>,
    sets: Arc<AtomicUsize>,
    read_only: Arc<AtomicBool>,
}

impl DpmsProvider for FakeDpms {
    fn get(&self) -> Result<bool> {
        Ok(self.enabled.load(Ordering::SeqCst))
    }

    fn set(&self, enabled: bool) -> Result<()> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(Error::provider("xset not permitted"));
        }
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.enabled.store(enabled, Ordering::SeqCst);
        Ok(())
    }
}

fn start(fake: &FakeDpms) -> (Arc<dpms::DpmsModule>, Receiver<Update>) {
    common::init_tracing();
    let module = Arc::new(dpms::new(fake.clone(), Arc::new(RateLimiter::unlimited())));
    let (mut sink, updates) = ChannelSink::new();
    let runner = module.clone();
    thread::spawn(move || runner.stream(&mut sink));
    (module, updates)
}

fn output(updates: &Receiver<Update>) -> Output {
    match updates.recv_timeout(WAIT).expect("no update from dpms") {
        Update::Output(out) => out,
        Update::Error(err) => panic!("unexpected error: {err}"),
    }
}

#[test]
fn left_click_toggles() {
    let fake = FakeDpms::default();
    fake.enabled.store(true, Ordering::SeqCst);
    let (module, updates) = start(&fake);

    let out = output(&updates);
    assert_eq!(out.as_str(), "dpms enabled");
    assert_eq!(module.scheduler().interval(), Some(dpms::DEFAULT_INTERVAL));

    out.click(Event::new(Button::Left));
    let out = output(&updates);
    assert_eq!(out.as_str(), "dpms disabled");

    out.click(Event::new(Button::Left));
    assert_eq!(output(&updates).as_str(), "dpms enabled");
    assert_eq!(fake.sets.load(Ordering::SeqCst), 2);
}

#[test]
fn toggle_follows_the_provider_not_the_render() {
    let fake = FakeDpms::default();
    let (_module, updates) = start(&fake);

    let out = output(&updates);
    assert_eq!(out.as_str(), "dpms disabled");

    // Enabled behind the module's back: the stale output still toggles
    // relative to the real state.
    fake.enabled.store(true, Ordering::SeqCst);
    out.click(Event::new(Button::Left));
    assert_eq!(output(&updates).as_str(), "dpms disabled");
    assert!(!fake.enabled.load(Ordering::SeqCst));
}

#[test]
fn other_buttons_and_failures_do_not_refresh() {
    let fake = FakeDpms::default();
    let (_module, updates) = start(&fake);
    let out = output(&updates);

    out.click(Event::new(Button::Right));
    out.click(Event::new(Button::ScrollUp));
    assert!(updates.recv_timeout(QUIET).is_err());

    fake.read_only.store(true, Ordering::SeqCst);
    out.click(Event::new(Button::Left));
    assert!(updates.recv_timeout(QUIET).is_err());
    assert_eq!(fake.sets.load(Ordering::SeqCst), 0);
}
