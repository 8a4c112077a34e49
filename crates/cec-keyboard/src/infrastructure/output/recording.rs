//! In-memory output device for tests.
//!
//! `RecordingOutputDevice` appends every call to a shared log instead of
//! touching the OS.  Clones share the log, so a test can keep one handle for
//! assertions while the dispatcher owns the other.
//!
//! ```ignore
//! let device = RecordingOutputDevice::new();
//! let mut dispatcher = EventDispatcher::new(table, device.clone());
//! // ...
//! assert_eq!(device.recorded(), vec![RecordedOutput::KeyPress(28)]);
//! ```
//!
//! `fail_after(n)` makes every call after the first `n` return
//! [`OutputError::Platform`], to exercise the fatal-output path.

use std::sync::{Arc, Mutex};

use cec_core::{Axis, PointerButton};

use crate::application::replay_actions::{OutputDevice, OutputError};

/// One recorded call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedOutput {
    KeyPress(u16),
    KeyDown(u16),
    KeyUp(u16),
    Click(PointerButton),
    Move(Axis, i32),
}

#[derive(Debug, Default)]
struct Log {
    events: Vec<RecordedOutput>,
    closed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RecordingOutputDevice {
    log: Arc<Mutex<Log>>,
    fail_after: Option<usize>,
}

impl RecordingOutputDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `count` calls, then fails every subsequent one.
    pub fn fail_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Snapshot of everything recorded so far.
    pub fn recorded(&self) -> Vec<RecordedOutput> {
        self.log.lock().map(|log| log.events.clone()).unwrap_or_default()
    }

    pub fn is_closed(&self) -> bool {
        self.log.lock().map(|log| log.closed).unwrap_or(false)
    }

    fn record(&mut self, output: RecordedOutput) -> Result<(), OutputError> {
        let mut log = self
            .log
            .lock()
            .map_err(|_| OutputError::Platform("recording log poisoned".to_string()))?;
        if log.closed {
            return Err(OutputError::Closed);
        }
        if self.fail_after.is_some_and(|limit| log.events.len() >= limit) {
            return Err(OutputError::Platform("injected failure".to_string()));
        }
        log.events.push(output);
        Ok(())
    }
}

impl OutputDevice for RecordingOutputDevice {
    fn key_press(&mut self, code: u16) -> Result<(), OutputError> {
        self.record(RecordedOutput::KeyPress(code))
    }

    fn key_down(&mut self, code: u16) -> Result<(), OutputError> {
        self.record(RecordedOutput::KeyDown(code))
    }

    fn key_up(&mut self, code: u16) -> Result<(), OutputError> {
        self.record(RecordedOutput::KeyUp(code))
    }

    fn pointer_click(&mut self, button: PointerButton) -> Result<(), OutputError> {
        self.record(RecordedOutput::Click(button))
    }

    fn pointer_move(&mut self, axis: Axis, delta: i32) -> Result<(), OutputError> {
        self.record(RecordedOutput::Move(axis, delta))
    }

    fn close(&mut self) -> Result<(), OutputError> {
        if let Ok(mut log) = self.log.lock() {
            log.closed = true;
        }
        Ok(())
    }
}
