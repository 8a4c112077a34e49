//! run_bridge: the full open → dispatch → close sequence.
//!
//! Shutdown always runs both close steps, whatever ended the dispatch loop:
//! first the CEC connection (bounded by the close timeout), then the output
//! device.  Close failures are logged and do not replace the dispatch
//! outcome.  A handshake timeout ends the run through the lifecycle's fatal
//! token even if the dispatcher never claims the stream.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use cec_core::{DeviceSettings, MappingTable};

use crate::application::connection::CecBackend;
use crate::application::dispatch::{DispatchError, DispatchStats, EventDispatcher};
use crate::application::lifecycle::{ConnectionLifecycle, LifecycleError, LifecycleTimeouts};
use crate::application::replay_actions::OutputDevice;

/// Everything the bridge needs besides the shutdown token.
pub struct Bridge<D> {
    pub settings: DeviceSettings,
    pub table: Arc<MappingTable>,
    pub backend: Arc<dyn CecBackend>,
    pub device: D,
    pub timeouts: LifecycleTimeouts,
}

/// Runs the bridge until `shutdown` is cancelled, the event stream ends or a
/// fatal error occurs.
///
/// # Errors
///
/// Returns [`DispatchError::Connection`] if the connection could not be
/// opened or handed over (including a handshake timeout), and [`DispatchError::Output`] if the output device
/// failed.
pub async fn run_bridge<D: OutputDevice>(
    bridge: Bridge<D>,
    shutdown: CancellationToken,
) -> Result<DispatchStats, DispatchError> {
    let window = bridge.timeouts.handshake;
    let mut lifecycle = ConnectionLifecycle::new(bridge.backend, bridge.settings, bridge.timeouts);
    let mut dispatcher = EventDispatcher::new(bridge.table, bridge.device);
    let fatal = lifecycle.fatal();

    let outcome = match lifecycle.open().await {
        Ok(handshake) => tokio::select! {
            biased;

            outcome = dispatcher.run(handshake, shutdown) => outcome,
            () = fatal.cancelled() => Err(LifecycleError::HandshakeTimeout(window).into()),
        },
        Err(e) => Err(e.into()),
    };

    if let Err(e) = lifecycle.close().await {
        warn!(error = %e, "CEC connection was not closed cleanly");
    }
    if let Err(e) = dispatcher.close_device() {
        warn!(error = %e, "failed to close output device");
    }

    outcome
}
