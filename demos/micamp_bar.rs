//! Prints the microphone meter to stdout for a few seconds.
//!
//! cargo run --example micamp_bar --features cpal_capture -- [device prefix]

use std::time::Duration;

use pegel::audio::CpalDevice;
use pegel::modules::micamp::MicAmp;
use pegel::{Error, Output, Sink};

struct Stdout;

impl Sink for Stdout {
    fn output(&mut self, output: Output) {
        println!("{output}");
    }

    fn error(&mut self, err: Option<&Error>) -> bool {
        match err {
            Some(err) => {
                eprintln!("error: {err}");
                true
            }
            None => false,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    for device in CpalDevice::list_inputs() {
        println!(
            "input: {} ({} Hz, {} ch)",
            device.name(),
            device.sample_rate(),
            device.channels()
        );
    }

    let prefix = std::env::args().nth(1).unwrap_or_default();
    let meter = MicAmp::new(&prefix);
    meter.every(Duration::from_millis(250));

    let (stop, cancel) = crossbeam_channel::bounded::<()>(0);
    std::thread::spawn(move || {
        std::thread::sleep(Duration::from_secs(10));
        drop(stop);
    });

    meter.stream(&mut Stdout, &cancel);
}
