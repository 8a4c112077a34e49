//! EventDispatcher: routes remote key events to their mapped actions.
//!
//! The dispatcher claims the event stream from the [`Handshake`] and then
//! processes one event at a time until it is cancelled or the stream ends:
//!
//! 1. Heartbeats (`duration_ms == 0`) are dropped.  Every other event is
//!    logged with its code and duration before lookup.
//! 2. Codes absent from the table are logged and dropped.
//! 3. Mapped codes have their actions replayed, in order, on the output
//!    device.  A device failure is fatal and ends the loop.

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use cec_core::{MappingTable, OutputAction, RemoteCode, RemoteKeyEvent};

use crate::application::lifecycle::{Handshake, LifecycleError};
use crate::application::replay_actions::{ActionReplayer, OutputDevice, OutputError};

/// Fatal dispatcher errors.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("CEC connection failed: {0}")]
    Connection(#[from] LifecycleError),
    #[error("failed to emit {action} for CEC code {code}: {source}")]
    Output {
        code: RemoteCode,
        action: OutputAction,
        #[source]
        source: OutputError,
    },
}

/// What happened to a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Heartbeat,
    Unmapped,
    /// The code was mapped and this many actions were emitted.
    Replayed(usize),
}

/// Counters reported when the dispatch loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub received: u64,
    pub heartbeats: u64,
    pub unmapped: u64,
    pub replayed: u64,
}

impl DispatchStats {
    fn record(&mut self, outcome: Dispatched) {
        self.received += 1;
        match outcome {
            Dispatched::Heartbeat => self.heartbeats += 1,
            Dispatched::Unmapped => self.unmapped += 1,
            Dispatched::Replayed(_) => self.replayed += 1,
        }
    }
}

pub struct EventDispatcher<D> {
    table: Arc<MappingTable>,
    replayer: ActionReplayer<D>,
}

impl<D: OutputDevice> EventDispatcher<D> {
    pub fn new(table: Arc<MappingTable>, device: D) -> Self {
        Self {
            table,
            replayer: ActionReplayer::new(device),
        }
    }

    /// Claims the event stream and dispatches until `shutdown` is cancelled
    /// or the stream closes.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::Connection`] if the stream could not be claimed.
    /// - [`DispatchError::Output`] on the first output device failure.
    pub async fn run(
        &mut self,
        handshake: Handshake,
        shutdown: CancellationToken,
    ) -> Result<DispatchStats, DispatchError> {
        let mut events = handshake.hand_over().await?;
        let mut stats = DispatchStats::default();

        loop {
            tokio::select! {
                biased;

                () = shutdown.cancelled() => {
                    info!("shutdown requested, stopping event dispatch");
                    break;
                }

                event = events.next() => match event {
                    Some(event) => stats.record(self.dispatch(event)?),
                    None => {
                        info!("CEC event stream closed");
                        break;
                    }
                },
            }
        }

        info!(
            received = stats.received,
            replayed = stats.replayed,
            unmapped = stats.unmapped,
            "event dispatch stopped"
        );
        Ok(stats)
    }

    /// Handles one event synchronously.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Output`] naming the action the device rejected.
    pub fn dispatch(&mut self, event: RemoteKeyEvent) -> Result<Dispatched, DispatchError> {
        if event.is_heartbeat() {
            debug!(code = event.code, "ignoring heartbeat");
            return Ok(Dispatched::Heartbeat);
        }

        info!(code = event.code, duration_ms = event.duration_ms, "CEC key received");
        let Some(actions) = self.table.get(event.code) else {
            info!(code = event.code, "no mapping for CEC code");
            return Ok(Dispatched::Unmapped);
        };

        let emitted = self
            .replayer
            .replay(actions)
            .map_err(|err| DispatchError::Output {
                code: event.code,
                action: err.action,
                source: err.source,
            })?;
        Ok(Dispatched::Replayed(emitted))
    }

    /// Closes the output device.
    pub fn close_device(&mut self) -> Result<(), OutputError> {
        self.replayer.close()
    }

    pub fn device(&self) -> &D {
        self.replayer.device()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
