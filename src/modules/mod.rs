//! Module kinds built on the [`Engine`](crate::Engine).
//!
//! - [`keyboard`] - active keyboard layout, cycled by click/scroll
//! - [`dpms`] - display power management state, toggled by click
//! - [`updates`] - number of pending package updates
//! - [`cpufreq`] - average CPU frequency
//! - [`micamp`] - live microphone level meter
//!
//! The polling modules take their data from a per-kind provider trait
//! ([`LayoutProvider`](keyboard::LayoutProvider),
//! [`DpmsProvider`](dpms::DpmsProvider),
//! [`UpdatesProvider`](updates::UpdatesProvider),
//! [`CpuFreqProvider`](cpufreq::CpuFreqProvider)); implementations backed by
//! command-line tools and sysfs live in [`providers`](crate::providers).

pub mod cpufreq;
pub mod dpms;
pub mod keyboard;
pub mod micamp;
pub mod updates;
