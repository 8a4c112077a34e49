//! cec-keyboard library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does cec-keyboard do? (for beginners)
//!
//! HDMI-CEC lets devices on an HDMI bus exchange control messages.  When a
//! TV remote button is pressed, the TV forwards a "user control pressed"
//! message to the active source.  A CEC adapter (a USB dongle or the HDMI
//! port of a Raspberry Pi) lets this machine receive those messages.
//!
//! The bridge:
//!
//! 1. Loads a mapping table from CEC key codes to keyboard/mouse actions.
//! 2. Creates a uinput virtual keyboard and mouse.
//! 3. Opens the CEC adapter, registering as a device of the configured type.
//! 4. Replays the mapped actions for every remote key press.
//! 5. On SIGINT/SIGTERM, closes the adapter (with a timeout) and destroys the
//!    virtual device.

/// Application layer: use cases for the bridge.
pub mod application;

/// Infrastructure layer: CEC backends, output devices, config files, signals.
pub mod infrastructure;
