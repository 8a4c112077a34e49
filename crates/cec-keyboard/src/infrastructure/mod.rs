//! Infrastructure layer for the bridge.
//!
//! Contains OS-facing adapters: the native CEC backend, the uinput output
//! device, config file loading and signal handling.
//!
//! **Dependency rule**: this layer may depend on `application` and `cec_core`,
//! but MUST NOT be imported by the `application` or domain layers.
//!
//! # Sub-modules
//!
//! - **`cec`** – `CecBackend` implementations: libcec (behind the `libcec`
//!   feature) and a scriptable mock for tests.
//!
//! - **`output`** – `OutputDevice` implementations: a uinput virtual keyboard
//!   and mouse on Linux, and a recording device for tests.
//!
//! - **`storage`** – Loads the YAML/TOML config file or builds the equivalent
//!   config from command-line flags.
//!
//! - **`shutdown`** – Translates SIGINT/SIGTERM into cancellation.

pub mod cec;
pub mod output;
pub mod shutdown;
pub mod storage;
