//! The CEC connection boundary.
//!
//! The native CEC library is an external collaborator.  This module defines
//! the narrow interface the application needs from it:
//!
//! - [`CecBackend::open`] finds an adapter and opens a session, delivering
//!   key presses into an [`EventSink`] from whatever thread the library uses
//!   for callbacks.
//! - [`CecSession::close`] tears the session down.  It may block.
//!
//! Events flow through one bounded queue.  The sending half ([`EventSink`])
//! is handed to the backend; the receiving half ([`EventStream`]) has exactly
//! one owner at a time: the handshake listener first, then the dispatcher.
//! Because the queue is bounded, a native callback blocks whenever nobody is
//! draining the stream, which is why a consumer must exist before `open`
//! is called (see [`crate::application::lifecycle`]).

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::warn;

use cec_core::{DeviceSettings, RemoteKeyEvent};

/// Capacity of the event queue between the native callback and its consumer.
pub const EVENT_QUEUE_DEPTH: usize = 16;

/// Errors reported by a CEC backend.
#[derive(Debug, Error)]
pub enum CecError {
    /// The native library could not be initialised.
    #[error("failed to initialise CEC library: {0}")]
    Init(String),
    /// No adapter matched the configured selector.
    #[error("no CEC adapter found matching '{0}'")]
    AdapterNotFound(String),
    /// The adapter was found but could not be opened.
    #[error("failed to open CEC adapter {adapter}: {reason}")]
    OpenFailed { adapter: String, reason: String },
}

/// A physical CEC adapter as reported by adapter discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterInfo {
    /// Device path, e.g. `/dev/ttyACM0`.
    pub path: String,
    /// Comm port name passed to the library when opening.
    pub comm: String,
}

/// Picks the first adapter whose path or comm port contains `selector`.
///
/// An empty selector matches the first adapter.
pub fn select_adapter<'a>(adapters: &'a [AdapterInfo], selector: &str) -> Option<&'a AdapterInfo> {
    adapters
        .iter()
        .find(|adapter| adapter.path.contains(selector) || adapter.comm.contains(selector))
}

/// Like [`select_adapter`], but reports a missing adapter as an error.
///
/// # Errors
///
/// Returns [`CecError::AdapterNotFound`] naming `selector` if no adapter
/// matches.
pub fn resolve_adapter<'a>(adapters: &'a [AdapterInfo], selector: &str) -> Result<&'a AdapterInfo, CecError> {
    select_adapter(adapters, selector).ok_or_else(|| CecError::AdapterNotFound(selector.to_string()))
}

/// An open native CEC session.
pub trait CecSession: Send {
    /// Closes the session and releases the native handle.  May block for an
    /// unbounded time on a misbehaving adapter; callers must apply their own
    /// deadline.
    fn close(self: Box<Self>);
}

/// Opens native CEC sessions.
pub trait CecBackend: Send + Sync + 'static {
    /// Finds the adapter selected by `settings.adapter` and opens it.
    ///
    /// Blocks until the adapter is open.  The backend may deliver events
    /// into `sink` before this call returns.
    ///
    /// # Errors
    ///
    /// Returns [`CecError`] if no adapter matches or the open call fails.
    fn open(&self, settings: &DeviceSettings, sink: EventSink) -> Result<Box<dyn CecSession>, CecError>;
}

/// Creates a connected sink/stream pair.
pub fn event_channel() -> (EventSink, EventStream) {
    let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    (EventSink { tx }, EventStream { rx })
}

/// Sending half of the event queue, owned by the native callback.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<RemoteKeyEvent>,
}

impl EventSink {
    /// Delivers an event from a native (non-async) thread, blocking while the
    /// queue is full.
    ///
    /// Returns `false` once the stream has been dropped.  Must not be called
    /// from inside the async runtime.
    pub fn deliver(&self, event: RemoteKeyEvent) -> bool {
        match self.tx.blocking_send(event) {
            Ok(()) => true,
            Err(_) => {
                warn!(code = event.code, "CEC event dropped: no consumer is attached");
                false
            }
        }
    }

    /// Delivers an event from async code.
    pub async fn send(&self, event: RemoteKeyEvent) -> bool {
        self.tx.send(event).await.is_ok()
    }

    /// Returns `true` once the stream has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half of the event queue.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<RemoteKeyEvent>,
}

impl EventStream {
    /// Waits for the next event.  Returns `None` once every sink is gone.
    pub async fn next(&mut self) -> Option<RemoteKeyEvent> {
        self.rx.recv().await
    }

    /// Takes an already queued event without waiting.
    pub fn try_next(&mut self) -> Option<RemoteKeyEvent> {
        self.rx.try_recv().ok()
    }
}
