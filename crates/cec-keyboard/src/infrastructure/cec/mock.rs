//! Scriptable CEC backend for tests.
//!
//! `MockCecBackend` replaces the native library with an in-memory adapter
//! list and a few knobs that reproduce the awkward behaviour of real
//! hardware:
//!
//! - `early_events` are delivered from inside `open`, before it returns, the
//!   way some adapters replay buffered key presses while connecting.
//! - `open_delay` / `close_delay` block the calling thread to exercise the
//!   lifecycle timeouts.
//! - `fail_open` makes `open` return [`CecError::OpenFailed`].
//!
//! After `open`, [`MockCecBackend::sink`] returns the event sink so a test
//! can act as the remote control.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cec_core::{DeviceSettings, RemoteKeyEvent};

use crate::application::connection::{
    resolve_adapter, AdapterInfo, CecBackend, CecError, CecSession, EventSink,
};

/// A backend that records calls and plays back scripted events.
pub struct MockCecBackend {
    pub adapters: Vec<AdapterInfo>,
    pub early_events: Vec<RemoteKeyEvent>,
    pub open_delay: Duration,
    pub close_delay: Duration,
    pub fail_open: bool,
    pub sink: Arc<Mutex<Option<EventSink>>>,
    pub opens: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
}

impl Default for MockCecBackend {
    fn default() -> Self {
        Self {
            adapters: vec![AdapterInfo {
                path: "/dev/ttyACM0".to_string(),
                comm: "/dev/ttyACM0".to_string(),
            }],
            early_events: Vec::new(),
            open_delay: Duration::ZERO,
            close_delay: Duration::ZERO,
            fail_open: false,
            sink: Arc::default(),
            opens: Arc::default(),
            closes: Arc::default(),
        }
    }
}

impl MockCecBackend {
    /// Creates a backend with one adapter at `/dev/ttyACM0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// The sink handed to the last successful `open`, if any.
    pub fn sink(&self) -> Option<EventSink> {
        self.sink.lock().ok().and_then(|guard| guard.clone())
    }

    /// Number of times `open` was called.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Number of sessions that finished closing.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl CecBackend for MockCecBackend {
    fn open(&self, settings: &DeviceSettings, sink: EventSink) -> Result<Box<dyn CecSession>, CecError> {
        self.opens.fetch_add(1, Ordering::SeqCst);

        let adapter = resolve_adapter(&self.adapters, &settings.adapter)?;
        if self.fail_open {
            return Err(CecError::OpenFailed {
                adapter: adapter.comm.clone(),
                reason: "injected failure".to_string(),
            });
        }

        std::thread::sleep(self.open_delay);
        for event in &self.early_events {
            sink.deliver(*event);
        }

        if let Ok(mut slot) = self.sink.lock() {
            *slot = Some(sink);
        }
        Ok(Box::new(MockCecSession {
            sink: Arc::clone(&self.sink),
            close_delay: self.close_delay,
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct MockCecSession {
    sink: Arc<Mutex<Option<EventSink>>>,
    close_delay: Duration,
    closes: Arc<AtomicUsize>,
}

impl CecSession for MockCecSession {
    fn close(self: Box<Self>) {
        std::thread::sleep(self.close_delay);
        if let Ok(mut slot) = self.sink.lock() {
            slot.take();
        }
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
