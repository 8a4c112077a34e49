//! Signal handling for graceful shutdown.
//!
//! The first SIGINT/SIGTERM cancels the shutdown token, which stops the
//! dispatcher and starts the bounded close sequence.  A second signal means
//! the operator has given up waiting, so the process exits immediately with
//! status 1.

use std::fmt;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// A signal that requests shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => f.write_str("SIGINT"),
            Self::Terminate => f.write_str("SIGTERM"),
        }
    }
}

/// Installs the OS signal handlers and relays them into `token`.
pub fn spawn_signal_handler(token: CancellationToken) -> JoinHandle<()> {
    let (tx, rx) = mpsc::channel(2);
    tokio::spawn(forward_os_signals(tx));
    tokio::spawn(relay_signals(rx, token, || std::process::exit(1)))
}

/// Cancels `token` on the first signal and calls `force_exit` on the second.
pub async fn relay_signals<X>(
    mut signals: mpsc::Receiver<ShutdownSignal>,
    token: CancellationToken,
    force_exit: X,
) where
    X: FnOnce(),
{
    let Some(first) = signals.recv().await else {
        return;
    };
    info!(signal = %first, "shutdown signal received, stopping");
    token.cancel();

    if let Some(second) = signals.recv().await {
        error!(signal = %second, "second shutdown signal received, exiting immediately");
        force_exit();
    }
}

async fn forward_os_signals(tx: mpsc::Sender<ShutdownSignal>) {
    #[cfg(unix)]
    let mut terminate = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
        Ok(stream) => Some(stream),
        Err(e) => {
            warn!("failed to install SIGTERM handler: {e}");
            None
        }
    };

    loop {
        #[cfg(unix)]
        let signal = tokio::select! {
            () = interrupt() => ShutdownSignal::Interrupt,
            () = recv_terminate(&mut terminate) => ShutdownSignal::Terminate,
        };
        #[cfg(not(unix))]
        let signal = {
            interrupt().await;
            ShutdownSignal::Interrupt
        };

        if tx.send(signal).await.is_err() {
            break;
        }
    }
}

async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl+C signal: {e}");
        std::future::pending::<()>().await;
    }
}

#[cfg(unix)]
async fn recv_terminate(stream: &mut Option<tokio::signal::unix::Signal>) {
    match stream {
        Some(stream) => {
            if stream.recv().await.is_none() {
                std::future::pending::<()>().await;
            }
        }
        None => std::future::pending::<()>().await,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
