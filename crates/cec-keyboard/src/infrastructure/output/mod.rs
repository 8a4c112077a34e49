//! Output device implementations.
//!
//! The uinput device is only available on Linux and is selected at compile
//! time via `#[cfg(target_os = "linux")]`.  A `RecordingOutputDevice` is also
//! provided for tests.

pub mod recording;

#[cfg(target_os = "linux")]
pub mod uinput;
