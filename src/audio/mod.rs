//! Microphone level acquisition.
//!
//! - [`SampleRing`] - recent batch levels, written concurrently by the capture
//! - [`Connection`] - lazily opens and re-opens a [`Capture`]
//! - [`CpalCapture`] / [`CpalDevice`] - the CPAL backend (requires `cpal_capture` feature)

mod connection;
mod ring;

#[cfg(feature = "cpal_capture")]
mod capture;
#[cfg(feature = "cpal_capture")]
mod device;

pub use connection::{Capture, Connection};
pub use ring::{Amplitude, SampleRing, CAPACITY, STALE_AFTER};

#[cfg(feature = "cpal_capture")]
pub use capture::CpalCapture;
#[cfg(feature = "cpal_capture")]
pub use device::CpalDevice;
