//! CPAL microphone capture feeding a [`SampleRing`].

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{Sample, SampleFormat};
use crossbeam_channel::Sender;

use super::connection::Capture;
use super::device::CpalDevice;
use super::ring::SampleRing;
use crate::error::{Error, Result};

/// A running input stream.
///
/// The CPAL stream lives on its own thread (streams are not `Send`); every
/// buffer the device delivers is written into the shared ring from the audio
/// callback.
pub struct CpalCapture {
    shutdown: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl CpalCapture {
    /// Start recording from the first input whose name starts with
    /// `device_prefix` (the default input when empty).
    pub fn open(device_prefix: &str, ring: Arc<SampleRing>) -> Result<Self> {
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<()>>(1);
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);
        let prefix = device_prefix.to_string();

        let worker = thread::Builder::new()
            .name("pegel-capture".into())
            .spawn(move || {
                let stream = match start_stream(&prefix, ring) {
                    Ok(stream) => stream,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));

                // Keep the stream alive until closed (or the handle is gone)
                let _ = shutdown_rx.recv();
                drop(stream);
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                shutdown: Some(shutdown_tx),
                worker: Some(worker),
            }),
            Ok(Err(err)) => {
                let _ = worker.join();
                Err(err)
            }
            Err(_) => {
                let _ = worker.join();
                Err(Error::Capture("capture thread exited during startup".into()))
            }
        }
    }
}

impl Capture for CpalCapture {
    fn close(&mut self) {
        // dropping the sender wakes the worker
        self.shutdown.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("capture thread panicked");
            }
        }
    }
}

impl Drop for CpalCapture {
    fn drop(&mut self) {
        self.close();
    }
}

fn start_stream(prefix: &str, ring: Arc<SampleRing>) -> Result<cpal::Stream> {
    let device = CpalDevice::find_input(prefix).ok_or_else(|| {
        Error::Capture(format!("unable to find any input with the prefix {prefix:?}"))
    })?;
    tracing::debug!(device = device.name(), rate = device.sample_rate(), "opening input");

    let sample_format = device.config.sample_format();
    let config = device.config.config();

    let stream = match sample_format {
        SampleFormat::F32 => device.device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                ring.write(data);
            },
            |err| tracing::warn!(%err, "input stream error"),
            None,
        ),
        SampleFormat::I16 => {
            let mut scratch = Vec::new();
            device.device.build_input_stream(
                &config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    scratch.clear();
                    scratch.extend(data.iter().map(|&s| s.to_sample::<f32>()));
                    ring.write(&scratch);
                },
                |err| tracing::warn!(%err, "input stream error"),
                None,
            )
        }
        SampleFormat::U16 => {
            let mut scratch = Vec::new();
            device.device.build_input_stream(
                &config,
                move |data: &[u16], _: &cpal::InputCallbackInfo| {
                    scratch.clear();
                    scratch.extend(data.iter().map(|&s| s.to_sample::<f32>()));
                    ring.write(&scratch);
                },
                |err| tracing::warn!(%err, "input stream error"),
                None,
            )
        }
        other => return Err(Error::Capture(format!("unsupported sample format: {other:?}"))),
    }
    .map_err(|err| Error::Capture(err.to_string()))?;

    stream.play().map_err(|err| Error::Capture(err.to_string()))?;
    Ok(stream)
}
