//! Bridge configuration: device settings plus the mapping table.
//!
//! Two sources are supported:
//!
//! - A config file (`--config`).  Files ending in `.toml` are parsed as TOML,
//!   anything else as YAML:
//!
//!   ```yaml
//!   adapter: ttyACM
//!   name: Keyboard
//!   type: recording
//!   mappings:
//!     - cecCode: 0
//!       actions:
//!         - keyboard: { type: press, code: 28 }
//!   ```
//!
//! - Command-line flags, where each `--mapping` is one compact grammar entry
//!   such as `5=p:30,h:31`.
//!
//! Either way the result is validated once, up front.  An empty table is
//! allowed (the bridge then only logs what it receives) but is reported with
//! a warning.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use cec_core::{parse_mappings, ConfigRecord, DeviceSettings, MappingError, MappingTable};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error reading config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The YAML content could not be parsed.
    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),

    /// The mappings are syntactically valid but semantically wrong.
    #[error("invalid mappings: {0}")]
    Invalid(#[from] MappingError),
}

/// File format of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Picks the format from the file extension; `.toml` is TOML, anything
    /// else is YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Self::Toml,
            _ => Self::Yaml,
        }
    }
}

/// Fully validated runtime configuration.
#[derive(Debug)]
pub struct BridgeConfig {
    pub device: DeviceSettings,
    pub mappings: MappingTable,
}

impl BridgeConfig {
    /// Builds the config from command-line values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first bad `--mapping` entry.
    pub fn from_args<I, S>(device: DeviceSettings, mappings: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mappings = parse_mappings(mappings)?;
        Ok(Self::validated(device, mappings))
    }

    /// Parses config text in the given format.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`]/[`ConfigError::Toml`] for malformed text
    /// and [`ConfigError::Invalid`] for invalid mappings.
    pub fn parse(text: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        let record: ConfigRecord = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(text)?,
            ConfigFormat::Toml => toml::from_str(text)?,
        };
        let (device, mappings) = record.into_parts()?;
        Ok(Self::validated(device, mappings))
    }

    fn validated(device: DeviceSettings, mappings: MappingTable) -> Self {
        if mappings.is_empty() {
            warn!("no mappings configured, received keys will only be logged");
        }
        Self { device, mappings }
    }
}

/// Loads and validates a config file.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, otherwise see
/// [`BridgeConfig::parse`].
pub fn load_config(path: &Path) -> Result<BridgeConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let format = ConfigFormat::from_path(path);
    let config = BridgeConfig::parse(&content, format)?;
    info!(
        path = %path.display(),
        ?format,
        mappings = config.mappings.len(),
        "config loaded"
    );
    Ok(config)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use cec_core::{DeviceType, OutputAction};

    fn temp_config(file_name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cec-keyboard-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create temp dir");
        let path = dir.join(file_name);
        std::fs::write(&path, content).expect("write temp config");
        path
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("/etc/a.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("/etc/a.TOML")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("/etc/a.yaml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("/etc/a.yml")), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("/etc/config")), ConfigFormat::Yaml);
    }

    #[test]
    fn test_from_args_parses_grammar_entries() {
        // Arrange
        let device = DeviceSettings {
            adapter: "ttyACM".to_string(),
            name: "Keyboard".to_string(),
            device_type: DeviceType::Tuner,
        };

        // Act
        let config = BridgeConfig::from_args(device.clone(), ["0=p:28", "5=p:30,h:31"])
            .expect("args must be valid");

        // Assert
        assert_eq!(config.device, device);
        assert_eq!(config.mappings.len(), 2);
        assert_eq!(config.mappings.get(0), Some(&[OutputAction::press(28)][..]));
    }

    #[test]
    fn test_from_args_duplicate_code_is_invalid() {
        let err = BridgeConfig::from_args(DeviceSettings::default(), ["5=p:1", "5=p:2"])
            .unwrap_err();

        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("duplicate CEC code 5"));
    }

    #[test]
    fn test_from_args_without_mappings_is_allowed() {
        let config = BridgeConfig::from_args(DeviceSettings::default(), Vec::<String>::new())
            .expect("empty table must be allowed");

        assert!(config.mappings.is_empty());
        assert_eq!(config.device.device_type, DeviceType::Recording);
    }

    #[test]
    fn test_parse_malformed_yaml_is_a_yaml_error() {
        let err = BridgeConfig::parse("type: [", ConfigFormat::Yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_parse_malformed_toml_is_a_toml_error() {
        let err = BridgeConfig::parse("type = ", ConfigFormat::Toml).unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_load_config_reads_yaml_file() {
        // Arrange
        let path = temp_config(
            "bridge.yaml",
            "adapter: cec0\ntype: playback\nmappings:\n  - cecCode: 1\n    actions:\n      - keyboard: { type: press, code: 103 }\n",
        );

        // Act
        let config = load_config(&path).expect("config must load");

        // Assert
        assert_eq!(config.device.adapter, "cec0");
        assert_eq!(config.device.device_type, DeviceType::Playback);
        assert_eq!(config.mappings.get(1), Some(&[OutputAction::press(103)][..]));
    }

    #[test]
    fn test_load_config_reads_toml_file() {
        let path = temp_config(
            "bridge.toml",
            "type = \"tv\"\n\n[[mappings]]\ncecCode = 2\nactions = [{ keyboard = { type = \"press\", code = 108 } }]\n",
        );

        let config = load_config(&path).expect("config must load");

        assert_eq!(config.device.device_type, DeviceType::Tv);
        assert_eq!(config.mappings.get(2), Some(&[OutputAction::press(108)][..]));
    }

    #[test]
    fn test_load_config_missing_file_is_an_io_error() {
        let path = std::env::temp_dir().join("cec-keyboard-test-does-not-exist.yaml");

        let err = load_config(&path).unwrap_err();

        match err {
            ConfigError::Io { path: reported, source } => {
                assert_eq!(reported, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected I/O error, got {other:?}"),
        }
    }
}
