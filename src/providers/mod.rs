//! Providers backed by external command-line tools and sysfs.
//!
//! The command-backed ones are generic over a
//! [`CommandRunner`](crate::exec::CommandRunner) and default to running the
//! real tool.

pub mod pacman;
pub mod sysfs;
pub mod xkbmap;
pub mod xset;

pub use pacman::{Checkupdates, Yay};
pub use sysfs::Sysfs;
pub use xkbmap::Xkbmap;
pub use xset::Xset;
