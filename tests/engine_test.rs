mod common;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Receiver;
use pegel::{ChannelSink, Engine, Error, Output, Provider, Result, Update};

const WAIT: Duration = Duration::from_secs(2);
const QUIET: Duration = Duration::from_millis(150);

/// Counts queries and fails while `failing` is set.
#[derive(Default)]
struct Flaky {
    queries: AtomicUsize,
    failing: AtomicBool,
}

impl Provider for Flaky {
    type Value = usize;

    fn query(&self) -> Result<usize> {
        let n = self.queries.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::provider("offline"));
        }
        Ok(n)
    }
}

fn spawn(provider: Flaky) -> (Arc<Engine<Flaky>>, Receiver<Update>) {
    common::init_tracing();
    let engine = Arc::new(Engine::new(provider, |n: &usize| {
        Output::text(format!("q{n}"))
    }));
    let (mut sink, updates) = ChannelSink::new();
    let runner = engine.clone();
    thread::spawn(move || runner.stream(&mut sink));
    (engine, updates)
}

fn next(updates: &Receiver<Update>) -> Update {
    updates.recv_timeout(WAIT).expect("no update from engine")
}

fn expect_text(updates: &Receiver<Update>, want: &str) {
    match next(updates) {
        Update::Output(out) => assert_eq!(out.as_str(), want),
        Update::Error(err) => panic!("expected {want:?}, got error {err}"),
    }
}

#[test]
fn renders_before_the_first_tick() {
    let (engine, updates) = spawn(Flaky::default());
    assert_eq!(engine.scheduler().interval(), None);
    expect_text(&updates, "q1");
}

#[test]
fn tick_and_refresh_requery() {
    let (engine, updates) = spawn(Flaky::default());
    expect_text(&updates, "q1");

    engine.scheduler().tick();
    expect_text(&updates, "q2");

    engine.refresh();
    expect_text(&updates, "q3");
}

#[test]
fn periodic_interval_drives_queries() {
    let (engine, updates) = spawn(Flaky::default());
    expect_text(&updates, "q1");

    engine.every(Duration::from_millis(20));
    expect_text(&updates, "q2");
    expect_text(&updates, "q3");

    engine.every(Duration::ZERO);
    // A tick may already be in flight when the timer stops.
    while updates.recv_timeout(QUIET).is_ok() {}
    let settled = engine.provider().queries.load(Ordering::SeqCst);
    thread::sleep(QUIET);
    assert_eq!(engine.provider().queries.load(Ordering::SeqCst), settled);
}

#[test]
fn error_skips_render_until_it_clears() {
    let provider = Flaky::default();
    provider.failing.store(true, Ordering::SeqCst);
    let (engine, updates) = spawn(provider);

    match next(&updates) {
        Update::Error(err) => assert_eq!(err, "offline"),
        Update::Output(out) => panic!("rendered {out} despite error"),
    }

    engine.provider().failing.store(false, Ordering::SeqCst);
    engine.refresh();
    expect_text(&updates, "q2");
}

#[test]
fn persistent_error_waits_for_the_next_event() {
    let provider = Flaky::default();
    provider.failing.store(true, Ordering::SeqCst);
    let (engine, updates) = spawn(provider);

    assert!(matches!(next(&updates), Update::Error(_)));
    thread::sleep(QUIET);
    assert!(updates.try_recv().is_err());
    assert_eq!(engine.provider().queries.load(Ordering::SeqCst), 1);
}

#[test]
fn format_change_during_error_renders_nothing() {
    let provider = Flaky::default();
    provider.failing.store(true, Ordering::SeqCst);
    let (engine, updates) = spawn(provider);
    assert!(matches!(next(&updates), Update::Error(_)));

    engine.output(|n: &usize| Output::text(format!("#{n}")));
    assert!(matches!(next(&updates), Update::Error(_)));
    assert_eq!(engine.provider().queries.load(Ordering::SeqCst), 1);
}
