//! Native CEC backend built on libcec (via the `cec-rs` bindings).
//!
//! # How key presses arrive (for beginners)
//!
//! libcec runs its own thread that talks to the adapter.  When the TV sends a
//! "user control pressed" message, libcec calls our key-press callback on
//! that thread with the user control code and how long the key was held.
//! The callback converts it to a [`RemoteKeyEvent`] and pushes it into the
//! bounded event queue with a *blocking* send.  This is why the lifecycle
//! must have a consumer running before `open` is called.
//!
//! libcec also reports a zero-duration "release" for every press; the
//! dispatcher drops those as heartbeats.
//!
//! # Adapter selection
//!
//! Before opening, libcec is asked for every adapter it can see
//! (`libcec_find_adapters`, through the raw `libcec-sys` bindings since
//! `cec-rs` does not expose detection).  The selector picks the first adapter
//! whose path or comm port contains it, so `ttyACM` matches `/dev/ttyACM0`.
//! The chosen comm port is what libcec opens.

use std::ffi::c_char;
use std::ptr;

use cec_rs::{
    CecConnection, CecConnectionCfgBuilder, CecDeviceType, CecDeviceTypeVec, CecKeypress,
    CecLogMessage,
};
use libcec_sys::{
    cec_adapter, libcec_clear_configuration, libcec_configuration, libcec_destroy,
    libcec_find_adapters, libcec_initialise, LIBCEC_VERSION_CURRENT,
};
use tracing::{debug, info};

use cec_core::{DeviceSettings, DeviceType, RemoteKeyEvent};

use crate::application::connection::{
    resolve_adapter, AdapterInfo, CecBackend, CecError, CecSession, EventSink,
};

/// Most adapters reported by one detection pass.
const MAX_ADAPTERS: usize = 10;

/// Backend that opens a real adapter through libcec.
#[derive(Debug, Default)]
pub struct LibCecBackend;

impl LibCecBackend {
    pub fn new() -> Self {
        Self
    }
}

fn native_device_type(device_type: DeviceType) -> CecDeviceType {
    match device_type {
        DeviceType::Tv => CecDeviceType::Tv,
        DeviceType::Recording => CecDeviceType::RecordingDevice,
        DeviceType::Tuner => CecDeviceType::Tuner,
        DeviceType::Playback => CecDeviceType::PlaybackDevice,
        DeviceType::Audio => CecDeviceType::AudioSystem,
    }
}

/// Converts a NUL-terminated C string buffer, ignoring anything after the
/// first NUL.
fn c_buffer_to_string(buffer: &[c_char]) -> String {
    let bytes: Vec<u8> = buffer
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

fn to_adapter_info(adapter: &cec_adapter) -> AdapterInfo {
    AdapterInfo {
        path: c_buffer_to_string(&adapter.path),
        comm: c_buffer_to_string(&adapter.comm),
    }
}

/// Lists the adapters libcec can currently see.
fn detect_adapters() -> Result<Vec<AdapterInfo>, CecError> {
    // SAFETY: the configuration and adapter list are plain C structs for
    // which all-zero bytes are valid, and libcec only writes within the
    // `MAX_ADAPTERS` entries it is told about.  The temporary connection is
    // destroyed before returning and never escapes this function.
    unsafe {
        let mut config: libcec_configuration = std::mem::zeroed();
        libcec_clear_configuration(&mut config);
        config.clientVersion = LIBCEC_VERSION_CURRENT as _;

        let connection = libcec_initialise(&mut config);
        if connection.is_null() {
            return Err(CecError::Init("libcec_initialise failed".to_string()));
        }

        let mut list: [cec_adapter; MAX_ADAPTERS] = std::mem::zeroed();
        let found = libcec_find_adapters(connection, list.as_mut_ptr(), MAX_ADAPTERS as _, ptr::null());
        libcec_destroy(connection);

        let count = usize::try_from(found).unwrap_or(0).min(MAX_ADAPTERS);
        Ok(list[..count].iter().map(to_adapter_info).collect())
    }
}

fn to_event(keypress: &CecKeypress) -> RemoteKeyEvent {
    let duration_ms = u32::try_from(keypress.duration.as_millis()).unwrap_or(u32::MAX);
    RemoteKeyEvent::new(keypress.keycode as u32, duration_ms)
}

impl CecBackend for LibCecBackend {
    fn open(&self, settings: &DeviceSettings, sink: EventSink) -> Result<Box<dyn CecSession>, CecError> {
        let adapters = detect_adapters()?;
        debug!(count = adapters.len(), "libcec adapters detected");
        let adapter = resolve_adapter(&adapters, &settings.adapter)?;
        info!(path = %adapter.path, comm = %adapter.comm, "selected CEC adapter");

        let config = CecConnectionCfgBuilder::default()
            .port(adapter.comm.clone())
            .device_name(settings.name.clone())
            .device_types(CecDeviceTypeVec::new(native_device_type(settings.device_type)))
            .key_press_callback(Box::new(move |keypress: CecKeypress| {
                sink.deliver(to_event(&keypress));
            }))
            .log_message_callback(Box::new(|message: CecLogMessage| {
                debug!(target: "libcec", "{}", message.message);
            }))
            .build()
            .map_err(|err| CecError::Init(err.to_string()))?;
        let connection = config.open().map_err(|err| CecError::OpenFailed {
            adapter: adapter.comm.clone(),
            reason: format!("{err:?}"),
        })?;

        info!(comm = %adapter.comm, "libcec adapter opened");
        Ok(Box::new(LibCecSession { connection }))
    }
}

struct LibCecSession {
    connection: CecConnection,
}

// SAFETY: the libcec connection handle is only touched again when the
// session is closed, and that happens on exactly one thread after ownership
// has moved there.  libcec serialises access to the handle internally.
unsafe impl Send for LibCecSession {}

impl CecSession for LibCecSession {
    fn close(self: Box<Self>) {
        // Dropping the connection closes the adapter and destroys the handle.
        drop(self.connection);
        debug!("libcec connection destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_device_type_has_a_native_counterpart() {
        assert!(matches!(native_device_type(DeviceType::Tv), CecDeviceType::Tv));
        assert!(matches!(native_device_type(DeviceType::Recording), CecDeviceType::RecordingDevice));
        assert!(matches!(native_device_type(DeviceType::Tuner), CecDeviceType::Tuner));
        assert!(matches!(native_device_type(DeviceType::Playback), CecDeviceType::PlaybackDevice));
        assert!(matches!(native_device_type(DeviceType::Audio), CecDeviceType::AudioSystem));
    }

    fn c_buffer(text: &str, len: usize) -> Vec<c_char> {
        let mut buffer = vec![0 as c_char; len];
        for (slot, byte) in buffer.iter_mut().zip(text.bytes()) {
            *slot = byte as c_char;
        }
        buffer
    }

    #[test]
    fn test_c_buffer_stops_at_first_nul() {
        // Arrange
        let mut buffer = c_buffer("/dev/ttyACM0", 32);
        buffer[20] = b'x' as c_char;

        // Act
        let text = c_buffer_to_string(&buffer);

        // Assert
        assert_eq!(text, "/dev/ttyACM0");
    }

    #[test]
    fn test_detected_adapter_is_selected_by_comm_substring() {
        // Arrange
        let adapters = vec![AdapterInfo {
            path: c_buffer_to_string(&c_buffer("/sys/devices/pci0000:00/usb1/1-2", 64)),
            comm: c_buffer_to_string(&c_buffer("/dev/ttyACM0", 64)),
        }];

        // Act
        let chosen = resolve_adapter(&adapters, "ttyACM").expect("substring must match");

        // Assert
        assert_eq!(chosen.comm, "/dev/ttyACM0");
    }
}
