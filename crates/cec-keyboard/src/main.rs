//! cec-keyboard entry point.
//!
//! Wires together the configuration, the uinput output device, the CEC
//! backend and signal handling, then runs the bridge on the Tokio runtime.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ Cli::into_bridge_config()   -- --config file or --mapping flags
//!  └─ UinputDevice::create()      -- virtual keyboard + mouse
//!  └─ spawn_signal_handler()      -- SIGINT/SIGTERM -> CancellationToken
//!  └─ run_bridge()
//!       ├─ ConnectionLifecycle::open()   -- listener + bounded native open
//!       ├─ EventDispatcher::run()        -- code -> actions -> uinput
//!       ├─ ConnectionLifecycle::close()  -- bounded native close
//!       └─ OutputDevice::close()
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cec_core::{DeviceSettings, DeviceType};
use cec_keyboard::application::bridge::{run_bridge, Bridge};
use cec_keyboard::application::connection::CecBackend;
use cec_keyboard::application::lifecycle::LifecycleTimeouts;
use cec_keyboard::application::replay_actions::OutputDevice;
use cec_keyboard::infrastructure::shutdown::spawn_signal_handler;
use cec_keyboard::infrastructure::storage::config::{load_config, BridgeConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Log verbosity used when `RUST_LOG` is not set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Bridge HDMI-CEC remote-control key presses to a virtual keyboard and mouse.
///
/// Mappings come either from a config file (`--config`) or from repeated
/// `--mapping CODE=tag:keycode,...` flags, where the tag is `p` (press),
/// `d` (down), `u` (up) or `h` (hold: down now, up after the rest).
#[derive(Debug, Parser)]
#[command(name = "cec-keyboard", version)]
struct Cli {
    /// YAML or TOML config file (`.toml` selects TOML).
    #[arg(long, conflicts_with_all = ["adapter", "name", "device_type", "mappings"])]
    config: Option<PathBuf>,

    /// CEC adapter selector: a substring of the adapter path or comm port.
    /// Empty selects the first adapter found.
    #[arg(long, default_value = "")]
    adapter: String,

    /// OSD name announced on the CEC bus.
    #[arg(long, default_value = "")]
    name: String,

    /// Logical CEC device type: tv, recording, tuner, playback or audio.
    #[arg(long = "type", default_value = "recording")]
    device_type: DeviceType,

    /// Log level when `RUST_LOG` is not set.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Mapping entry, e.g. `5=p:30,h:31`.  May be repeated.
    #[arg(long = "mapping")]
    mappings: Vec<String>,
}

impl Cli {
    /// Loads the config file, or builds the config from flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or any mapping is
    /// invalid.
    fn into_bridge_config(self) -> anyhow::Result<BridgeConfig> {
        match self.config {
            Some(path) => load_config(&path)
                .with_context(|| format!("failed to load config from {}", path.display())),
            None => {
                let device = DeviceSettings {
                    adapter: self.adapter,
                    name: self.name,
                    device_type: self.device_type,
                };
                BridgeConfig::from_args(device, &self.mappings).context("invalid --mapping")
            }
        }
    }
}

// ── Platform adapters ─────────────────────────────────────────────────────────

#[cfg(target_os = "linux")]
fn open_output_device() -> anyhow::Result<Box<dyn OutputDevice>> {
    let device = cec_keyboard::infrastructure::output::uinput::UinputDevice::create()
        .context("failed to create uinput device")?;
    Ok(Box::new(device))
}

#[cfg(not(target_os = "linux"))]
fn open_output_device() -> anyhow::Result<Box<dyn OutputDevice>> {
    anyhow::bail!("the uinput output device is only available on Linux")
}

#[cfg(feature = "libcec")]
fn cec_backend() -> anyhow::Result<Arc<dyn CecBackend>> {
    Ok(Arc::new(cec_keyboard::infrastructure::cec::libcec::LibCecBackend::new()))
}

#[cfg(not(feature = "libcec"))]
fn cec_backend() -> anyhow::Result<Arc<dyn CecBackend>> {
    anyhow::bail!("no CEC backend available: rebuild with `--features libcec`")
}

fn init_logging(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter())),
        )
        .init();
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level);
    info!(version = env!("CARGO_PKG_VERSION"), "cec-keyboard starting");

    let config = cli.into_bridge_config()?;
    let backend = cec_backend()?;
    let device = open_output_device()?;

    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    let bridge = Bridge {
        settings: config.device,
        table: Arc::new(config.mappings),
        backend,
        device,
        timeouts: LifecycleTimeouts::default(),
    };
    let stats = run_bridge(bridge, shutdown).await.context("bridge stopped with an error")?;

    info!(received = stats.received, replayed = stats.replayed, "cec-keyboard stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
