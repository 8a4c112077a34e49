//! # cec-core
//!
//! Shared library for the CEC keyboard bridge containing the domain types and
//! the mapping codec.
//!
//! This crate has no dependencies on OS APIs, the async runtime, or the native
//! CEC library, so everything in it can be tested on any machine.
//!
//! # Overview
//!
//! A TV remote sends key presses over HDMI-CEC.  The bridge receives each one
//! as a [`RemoteKeyEvent`] and replays a user-defined list of keyboard and
//! mouse actions on the host.  This crate defines:
//!
//! - **`domain`** – the event, action and device types plus the immutable
//!   [`MappingTable`] that connects remote codes to action sequences.
//! - **`codec`** – parsing and validation of mapping declarations, both the
//!   compact `CODE=tag:keycode,...` grammar and the structured config-file
//!   records.

pub mod codec;
pub mod domain;

pub use codec::{parse_entry, parse_mappings, ConfigRecord, GrammarError, MappingError};
pub use domain::action::{Axis, KeyPhase, OutputAction, PointerAction, PointerButton};
pub use domain::device::{DeviceSettings, DeviceType, UnknownDeviceType};
pub use domain::event::{RemoteCode, RemoteKeyEvent};
pub use domain::mapping::{MappingEntry, MappingTable, MappingTableBuilder, TableError};
