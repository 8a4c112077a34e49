//! ConnectionLifecycle: opens and closes the single CEC connection.
//!
//! # Why a handshake? (for beginners)
//!
//! The native CEC library invokes its key-press callback on its own thread
//! and that callback pushes into a bounded queue.  If nothing is draining the
//! queue, the callback blocks, and with it the library's internal dispatch
//! thread.  Some adapters emit events while `open` is still in progress, so a
//! consumer has to exist *before* `open` is called, but the real consumer
//! (the dispatcher) only starts after `open` has returned.
//!
//! The lifecycle bridges that gap with a short-lived listener task:
//!
//! ```text
//! open()
//!  ├─ spawn listener ──► "started" ack        (listener is polling)
//!  ├─ native open on "cec-open" thread         (bounded by open timeout)
//!  │     listener discards early events
//!  └─ return Handshake                         state = Handshaking
//!
//! Handshake::hand_over()
//!  ├─ "ready" signal ──► listener drains the queue and returns the stream
//!  └─ stream handed to the dispatcher          state = Ready
//!
//! close()
//!  └─ native close on "cec-close" thread       (bounded by close timeout)
//! ```
//!
//! Every wait is bounded.  A close that overruns its window is abandoned on
//! its detached thread so shutdown can still finish.
//!
//! If the handshake window elapses before `hand_over`, the listener moves the
//! state to `Failed` and cancels the [`ConnectionLifecycle::fatal`] token,
//! whether or not anyone ever calls `hand_over`.  `close` still releases the
//! session afterwards.

use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use cec_core::DeviceSettings;

use crate::application::connection::{
    event_channel, CecBackend, CecError, CecSession, EventStream,
};

/// Position of the connection in its one-way state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Opening,
    Handshaking,
    Ready,
    /// The consumer never became ready.  Only `close` is possible from here.
    Failed,
    Closing,
    Closed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Opening => "opening",
            Self::Handshaking => "handshaking",
            Self::Ready => "ready",
            Self::Failed => "failed",
            Self::Closing => "closing",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Deadlines applied to the blocking native calls and to the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleTimeouts {
    /// Maximum time for the native open call.
    pub open: Duration,
    /// Maximum time between starting the listener and the ready signal.
    pub handshake: Duration,
    /// Maximum time to wait for the native close call.
    pub close: Duration,
}

impl Default for LifecycleTimeouts {
    fn default() -> Self {
        Self {
            open: Duration::from_secs(10),
            handshake: Duration::from_secs(20),
            close: Duration::from_secs(5),
        }
    }
}

/// Errors raised while opening, handing over or closing the connection.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("cannot {operation} the CEC connection while it is {state}")]
    InvalidState {
        operation: &'static str,
        state: LifecycleState,
    },
    #[error(transparent)]
    Open(#[from] CecError),
    #[error("CEC adapter did not open within {0:?}")]
    OpenTimeout(Duration),
    #[error("CEC event consumer did not become ready within {0:?}")]
    HandshakeTimeout(Duration),
    #[error("CEC handshake was abandoned before the consumer became ready")]
    HandshakeAbandoned,
    #[error("{0} stopped without reporting a result")]
    WorkerLost(&'static str),
    #[error("failed to spawn {thread} thread: {source}")]
    Spawn {
        thread: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("CEC connection did not close within {0:?}")]
    CloseTimeout(Duration),
}

/// Owns the CEC session from open to close.
pub struct ConnectionLifecycle {
    backend: Arc<dyn CecBackend>,
    settings: DeviceSettings,
    timeouts: LifecycleTimeouts,
    state: Arc<watch::Sender<LifecycleState>>,
    fatal: CancellationToken,
    session: Option<Box<dyn CecSession>>,
}

impl ConnectionLifecycle {
    pub fn new(
        backend: Arc<dyn CecBackend>,
        settings: DeviceSettings,
        timeouts: LifecycleTimeouts,
    ) -> Self {
        let (state, _) = watch::channel(LifecycleState::Idle);
        Self {
            backend,
            settings,
            timeouts,
            state: Arc::new(state),
            fatal: CancellationToken::new(),
            session: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Returns a receiver that observes every state transition.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// Token cancelled when the handshake window elapses without a consumer.
    ///
    /// The connection is unusable once it fires; callers should close it and
    /// stop.
    pub fn fatal(&self) -> CancellationToken {
        self.fatal.clone()
    }

    fn set_state(&self, next: LifecycleState) {
        let previous = self.state.send_replace(next);
        debug!(from = %previous, to = %next, "CEC connection state changed");
    }

    /// Opens the connection with a listener already draining the event queue.
    ///
    /// Only legal from [`LifecycleState::Idle`], so a lifecycle opens at most
    /// one connection.  On success the state is `Handshaking` and the returned
    /// [`Handshake`] must be handed to the event consumer.
    ///
    /// # Errors
    ///
    /// - [`LifecycleError::InvalidState`] if called twice.
    /// - [`LifecycleError::Open`] if the backend reports a failure.
    /// - [`LifecycleError::OpenTimeout`] if the native call overruns.
    /// - [`LifecycleError::HandshakeTimeout`] if the handshake window elapsed
    ///   while the native call was still running.
    ///
    /// A handshake timeout leaves the lifecycle `Failed` with the session kept
    /// for `close`.  Every other failure leaves it `Closed`.
    pub async fn open(&mut self) -> Result<Handshake, LifecycleError> {
        let current = self.state();
        if current != LifecycleState::Idle {
            return Err(LifecycleError::InvalidState { operation: "open", state: current });
        }
        self.set_state(LifecycleState::Opening);
        info!(
            adapter = %self.settings.adapter,
            name = %self.settings.name,
            device_type = %self.settings.device_type,
            "opening CEC connection"
        );

        let (sink, stream) = event_channel();
        let (started_tx, started_rx) = oneshot::channel();
        let (ready_tx, ready_rx) = oneshot::channel();
        let listener = tokio::spawn(discard_until_ready(
            stream,
            started_tx,
            ready_rx,
            Expiry {
                window: self.timeouts.handshake,
                state: Arc::clone(&self.state),
                fatal: self.fatal.clone(),
            },
        ));

        if started_rx.await.is_err() {
            return Err(self.abandon(listener, LifecycleError::WorkerLost("handshake listener")));
        }
        debug!("handshake listener started");

        let (opened_tx, opened_rx) = oneshot::channel();
        let backend = Arc::clone(&self.backend);
        let settings = self.settings.clone();
        let spawned = thread::Builder::new()
            .name("cec-open".to_string())
            .spawn(move || {
                let result = backend.open(&settings, sink);
                if let Err(Ok(session)) = opened_tx.send(result) {
                    warn!("CEC adapter opened after the open deadline; closing it");
                    session.close();
                }
            });
        if let Err(source) = spawned {
            return Err(self.abandon(listener, LifecycleError::Spawn { thread: "cec-open", source }));
        }

        let session = match time::timeout(self.timeouts.open, opened_rx).await {
            Ok(Ok(Ok(session))) => session,
            Ok(Ok(Err(cause))) => return Err(self.abandon(listener, cause.into())),
            Ok(Err(_)) => return Err(self.abandon(listener, LifecycleError::WorkerLost("cec-open"))),
            Err(_) => {
                let timeout = self.timeouts.open;
                return Err(self.abandon(listener, LifecycleError::OpenTimeout(timeout)));
            }
        };

        self.session = Some(session);
        // The listener may have expired the handshake while the open ran.
        let advanced = self.state.send_if_modified(|state| {
            let opening = *state == LifecycleState::Opening;
            if opening {
                *state = LifecycleState::Handshaking;
            }
            opening
        });
        if !advanced {
            return Err(LifecycleError::HandshakeTimeout(self.timeouts.handshake));
        }
        debug!(from = %LifecycleState::Opening, to = %LifecycleState::Handshaking, "CEC connection state changed");
        info!("CEC connection open, waiting for the event consumer");

        Ok(Handshake {
            ready: ready_tx,
            listener,
            state: Arc::clone(&self.state),
        })
    }

    fn abandon(
        &self,
        listener: JoinHandle<Result<EventStream, LifecycleError>>,
        cause: LifecycleError,
    ) -> LifecycleError {
        listener.abort();
        self.set_state(LifecycleState::Closed);
        error!(error = %cause, "failed to open CEC connection");
        cause
    }

    /// Closes the connection, waiting at most the close timeout.
    ///
    /// Idempotent: once the session has been released, further calls return
    /// `Ok(())` without touching the backend.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::CloseTimeout`] if the native close overruns.
    /// The lifecycle is `Closed` afterwards either way.
    pub async fn close(&mut self) -> Result<(), LifecycleError> {
        let Some(session) = self.session.take() else {
            if self.state() != LifecycleState::Closed {
                self.set_state(LifecycleState::Closed);
            }
            return Ok(());
        };
        self.set_state(LifecycleState::Closing);
        info!("closing CEC connection");

        let (done_tx, done_rx) = oneshot::channel();
        let spawned = thread::Builder::new()
            .name("cec-close".to_string())
            .spawn(move || {
                session.close();
                let _ = done_tx.send(());
            });
        if let Err(source) = spawned {
            self.set_state(LifecycleState::Closed);
            return Err(LifecycleError::Spawn { thread: "cec-close", source });
        }

        let result = match time::timeout(self.timeouts.close, done_rx).await {
            Ok(Ok(())) => {
                info!("CEC connection closed");
                Ok(())
            }
            Ok(Err(_)) => Err(LifecycleError::WorkerLost("cec-close")),
            Err(_) => {
                warn!(timeout = ?self.timeouts.close, "CEC close did not finish in time, abandoning it");
                Err(LifecycleError::CloseTimeout(self.timeouts.close))
            }
        };
        self.set_state(LifecycleState::Closed);
        result
    }
}

/// Proof that the connection is open and its listener is running.
///
/// Move-only: the event stream can be claimed exactly once.  Dropping it
/// without calling [`Handshake::hand_over`] stops the listener.
#[derive(Debug)]
pub struct Handshake {
    ready: oneshot::Sender<()>,
    listener: JoinHandle<Result<EventStream, LifecycleError>>,
    state: Arc<watch::Sender<LifecycleState>>,
}

impl Handshake {
    /// Signals readiness and takes ownership of the event stream.
    ///
    /// Events queued before this call are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::HandshakeTimeout`] if the handshake window
    /// had already elapsed.
    pub async fn hand_over(self) -> Result<EventStream, LifecycleError> {
        // A closed gate means the listener already gave up; joining says why.
        let _ = self.ready.send(());
        let stream = match self.listener.await {
            Ok(result) => result?,
            Err(_) => return Err(LifecycleError::WorkerLost("handshake listener")),
        };
        self.state.send_replace(LifecycleState::Ready);
        info!("CEC event consumer ready");
        Ok(stream)
    }
}

/// What the listener does when the handshake window elapses.
struct Expiry {
    window: Duration,
    state: Arc<watch::Sender<LifecycleState>>,
    fatal: CancellationToken,
}

impl Expiry {
    fn fire(&self) -> LifecycleError {
        error!(timeout = ?self.window, "CEC event consumer never became ready");
        self.fatal.cancel();
        self.state.send_if_modified(|state| {
            let pending = matches!(*state, LifecycleState::Opening | LifecycleState::Handshaking);
            if pending {
                *state = LifecycleState::Failed;
            }
            pending
        });
        LifecycleError::HandshakeTimeout(self.window)
    }
}

async fn discard_until_ready(
    mut stream: EventStream,
    started: oneshot::Sender<()>,
    mut ready: oneshot::Receiver<()>,
    expiry: Expiry,
) -> Result<EventStream, LifecycleError> {
    let _ = started.send(());
    let deadline = time::sleep(expiry.window);
    tokio::pin!(deadline);

    let mut discarded = 0usize;
    let mut open = true;
    loop {
        tokio::select! {
            biased;

            signal = &mut ready => {
                if signal.is_err() {
                    debug!("handshake dropped before the consumer became ready");
                    return Err(LifecycleError::HandshakeAbandoned);
                }
                while let Some(event) = stream.try_next() {
                    discarded += 1;
                    debug!(code = event.code, "discarding CEC event queued before ready");
                }
                debug!(discarded, "handing the event stream to the consumer");
                return Ok(stream);
            }

            event = stream.next(), if open => match event {
                Some(event) => {
                    discarded += 1;
                    debug!(code = event.code, "discarding CEC event received before ready");
                }
                None => open = false,
            },

            () = &mut deadline => return Err(expiry.fire()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
