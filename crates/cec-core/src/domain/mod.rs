//! Domain entities for the CEC keyboard bridge.
//!
//! This module contains pure types with no infrastructure dependencies: the
//! remote key events produced by the CEC bus, the output actions that are
//! replayed on the host, and the immutable table that links the two.
//!
//! Code in outer layers (the lifecycle manager, the dispatcher, the uinput
//! adapter) depends on these types, but nothing here depends on them.  That
//! keeps the mapping rules testable on any platform without a CEC adapter or
//! a virtual input device.

/// Output actions replayed onto the host (key presses, pointer clicks/moves).
pub mod action;

/// CEC device identity: OSD name, logical device type and adapter selector.
pub mod device;

/// Remote key events delivered by the CEC bus.
pub mod event;

/// The immutable remote-code → actions lookup table.
pub mod mapping;
