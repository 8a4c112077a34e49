//! Remote key events produced by the CEC bus.

/// Numeric code of a remote-control key as reported by the CEC adapter
/// (a CEC "user control code").
pub type RemoteCode = u32;

/// A key-press notification from the CEC bus.
///
/// The native layer reports every key press together with how long the key
/// was held.  A zero duration is sent as a heartbeat/no-op and never
/// represents a real press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RemoteKeyEvent {
    /// CEC user control code of the key.
    pub code: RemoteCode,
    /// How long the key was held, in milliseconds.
    pub duration_ms: u32,
}

impl RemoteKeyEvent {
    /// Creates a new event.
    pub fn new(code: RemoteCode, duration_ms: u32) -> Self {
        Self { code, duration_ms }
    }

    /// Returns `true` for zero-duration events, which carry no key press and
    /// must be discarded before dispatch.
    pub fn is_heartbeat(&self) -> bool {
        self.duration_ms == 0
    }
}
