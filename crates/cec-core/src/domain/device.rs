//! CEC device identity settings.
//!
//! A CEC client announces itself on the bus with an OSD name and one logical
//! device type.  The adapter selector picks which physical CEC adapter to open
//! when several are attached.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Logical CEC device type announced on the bus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Tv,
    #[default]
    Recording,
    Tuner,
    Playback,
    Audio,
}

impl DeviceType {
    /// All accepted device types, in the order they are documented.
    pub const ALL: [DeviceType; 5] = [
        DeviceType::Tv,
        DeviceType::Recording,
        DeviceType::Tuner,
        DeviceType::Playback,
        DeviceType::Audio,
    ];

    /// The configuration name of this device type.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Tv => "tv",
            DeviceType::Recording => "recording",
            DeviceType::Tuner => "tuner",
            DeviceType::Playback => "playback",
            DeviceType::Audio => "audio",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a device type name is not one of [`DeviceType::ALL`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid CEC device type '{0}', must be one of tv, recording, tuner, playback, audio")]
pub struct UnknownDeviceType(pub String);

impl FromStr for DeviceType {
    type Err = UnknownDeviceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownDeviceType(s.to_string()))
    }
}

/// Everything needed to open a CEC connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSettings {
    /// Substring matched against adapter paths and comm ports.  Empty selects
    /// the first adapter found.
    pub adapter: String,
    /// OSD name announced on the bus.
    pub name: String,
    /// Logical device type announced on the bus.
    pub device_type: DeviceType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_device_type_round_trips_through_its_name() {
        for device_type in DeviceType::ALL {
            assert_eq!(device_type.as_str().parse::<DeviceType>(), Ok(device_type));
        }
    }

    #[test]
    fn test_unknown_device_type_is_rejected_with_its_value() {
        // Act
        let err = "reserved".parse::<DeviceType>().unwrap_err();

        // Assert
        assert_eq!(err, UnknownDeviceType("reserved".to_string()));
        assert!(err.to_string().contains("'reserved'"));
    }

    #[test]
    fn test_device_type_names_are_case_sensitive() {
        assert!("TV".parse::<DeviceType>().is_err());
    }

    #[test]
    fn test_default_device_type_is_recording() {
        assert_eq!(DeviceType::default(), DeviceType::Recording);
        assert_eq!(DeviceSettings::default().device_type, DeviceType::Recording);
    }
}
