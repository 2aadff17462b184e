//! CPAL input device discovery.
//!
//! This module provides [`CpalDevice`] for discovering and selecting the
//! microphone a [`CpalCapture`](super::CpalCapture) records from.
//!
//! # Example: List and Select a Device
//!
//! ```no_run
//! use pegel::audio::CpalDevice;
//!
//! // List all available input devices
//! for (i, device) in CpalDevice::list_inputs().iter().enumerate() {
//!     println!("[{}] {} ({} Hz, {} ch)",
//!         i, device.name(), device.sample_rate(), device.channels());
//! }
//!
//! // Pick the first device whose name starts with a prefix
//! let device = CpalDevice::find_input("alsa_input.usb");
//! ```

use cpal::traits::{DeviceTrait, HostTrait};

/// A discovered audio input device.
///
/// Use [`CpalDevice::default_input`] to get the system default,
/// [`CpalDevice::find_input`] to match by name prefix, or
/// [`CpalDevice::list_inputs`] to enumerate all available devices.
pub struct CpalDevice {
    pub(crate) device: cpal::Device,
    pub(crate) config: cpal::SupportedStreamConfig,

    name: String,
    sample_rate: u32,
    channels: u16,
}

impl CpalDevice {
    fn from_device(device: cpal::Device) -> Option<Self> {
        let config = device.default_input_config().ok()?;
        let name = device.name().unwrap_or_else(|_| "Unknown".into());

        Some(Self {
            sample_rate: config.sample_rate().0,
            channels: config.channels(),
            name,
            device,
            config,
        })
    }

    /// Get the system's default input device.
    ///
    /// Returns `None` if no input device is available.
    pub fn default_input() -> Option<Self> {
        let host = cpal::default_host();
        Self::from_device(host.default_input_device()?)
    }

    /// List all available audio input devices.
    ///
    /// Returns an empty list if no devices are found or if enumeration fails.
    pub fn list_inputs() -> Vec<Self> {
        let host = cpal::default_host();
        host.input_devices()
            .map(|devices| devices.filter_map(Self::from_device).collect())
            .unwrap_or_default()
    }

    /// The first input device whose name starts with `prefix`. An empty
    /// prefix selects the default input.
    pub fn find_input(prefix: &str) -> Option<Self> {
        if prefix.is_empty() {
            return Self::default_input();
        }

        Self::list_inputs()
            .into_iter()
            .find(|device| device.name.starts_with(prefix))
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the device's sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of input channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }
}
