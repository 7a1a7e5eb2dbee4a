//! Configuration management for the gateway
//!
//! Handles loading, parsing and validating the YAML configuration file.
//! The configuration is read once at startup and never changes afterwards.

pub mod table;
pub mod timing;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::ConfigError;

pub use table::{is_program_change, Mode, TriggerConfig, TriggerTable};
pub use timing::Timing;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub midi: MidiConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub timing: Timing,
    pub triggers: Vec<TriggerConfig>,
}

/// MIDI port configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MidiConfig {
    #[serde(default = "default_client_name")]
    pub client_name: String,
    #[serde(default = "default_input_port")]
    pub input_port: String,
    #[serde(default = "default_output_port")]
    pub output_port: String,
    /// Create virtual ports instead of connecting to existing ones
    #[serde(default = "default_true")]
    pub virtual_ports: bool,
}

/// How incoming MIDI is turned into trigger events
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InputConfig {
    #[serde(default = "default_input_kind")]
    pub kind: InputKind,
    /// Only accept messages on this channel (0-15)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<u8>,
    /// Velocity assigned to CC presses, which carry no pressure
    #[serde(default = "default_static_velocity")]
    pub static_velocity: u8,
    #[serde(default = "default_release_mode")]
    pub release: ReleaseMode,
}

/// Message family the controller sends for its switches
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Note,
    Cc,
}

/// How an in-progress ramp or hold notices that its switch was let go
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseMode {
    /// Any incoming event ends the active behavior
    AnyEvent,
    /// Only a release (or re-press) of the active trigger ends it
    Explicit,
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_string(),
                source,
            })?;

        Self::from_yaml(&contents)
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.input.validate()?;
        self.timing.validate()?;
        TriggerTable::build(&self.triggers)?;
        Ok(())
    }

    /// Build the immutable lookup table for the configured triggers
    pub fn trigger_table(&self) -> Result<TriggerTable, ConfigError> {
        TriggerTable::build(&self.triggers)
    }
}

impl InputConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(channel) = self.channel {
            if channel > 15 {
                return Err(ConfigError::InvalidInput(format!(
                    "channel filter {} is out of range (must be 0-15)",
                    channel
                )));
            }
        }
        if self.static_velocity > 127 {
            return Err(ConfigError::InvalidInput(format!(
                "static_velocity {} is out of range (must be 0-127)",
                self.static_velocity
            )));
        }
        Ok(())
    }
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            client_name: default_client_name(),
            input_port: default_input_port(),
            output_port: default_output_port(),
            virtual_ports: default_true(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            kind: default_input_kind(),
            channel: None,
            static_velocity: default_static_velocity(),
            release: default_release_mode(),
        }
    }
}

// Default value functions
fn default_client_name() -> String { "icontrol".to_string() }
fn default_input_port() -> String { "in 1".to_string() }
fn default_output_port() -> String { "out 1".to_string() }
fn default_true() -> bool { true }
fn default_input_kind() -> InputKind { InputKind::Note }
fn default_static_velocity() -> u8 { 100 }
fn default_release_mode() -> ReleaseMode { ReleaseMode::AnyEvent }

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const NANOPAD: &str = r#"
midi:
  client_name: "icontrol"
  input_port: "in 1"
  output_port: "out 1"

triggers:
  - { trigger: 36, target: 26, channel: 0, mode: up }
  - { trigger: 37, target: 26, channel: 0, mode: down }
  - { trigger: 40, target: 28, channel: 0, mode: up, paired: 29 }
  - { trigger: 41, target: 28, channel: 0, mode: down, paired: 29 }
  - { trigger: 44, target: 1, channel: 1, mode: up }
  - { trigger: 46, target: 30, channel: 0, mode: single, paired: 31 }
"#;

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_yaml(NANOPAD).unwrap();

        assert!(config.midi.virtual_ports);
        assert_eq!(config.input.kind, InputKind::Note);
        assert_eq!(config.input.release, ReleaseMode::AnyEvent);
        assert_eq!(config.timing.long_press_ms, 1500);
        assert_eq!(config.timing.program_change_slider_max, 15);
        assert_eq!(config.triggers.len(), 6);
        assert_eq!(config.triggers[0].paired_target(), None);
        assert_eq!(config.triggers[2].paired_target(), Some(29));
    }

    #[test]
    fn test_input_and_timing_overrides() {
        let yaml = r#"
input:
  kind: cc
  channel: 9
  static_velocity: 127
  release: explicit
timing:
  long_press_ms: 800
  speed: 35
triggers:
  - { trigger: 20, target: 7, channel: 3, mode: down }
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.input.kind, InputKind::Cc);
        assert_eq!(config.input.channel, Some(9));
        assert_eq!(config.input.release, ReleaseMode::Explicit);
        assert_eq!(config.timing.long_press_ms, 800);
        assert_eq!(config.timing.speed, 35.0);
        assert_eq!(config.timing.hold_sample_ms, 50);
    }

    #[test]
    fn test_duplicate_trigger_rejected() {
        let yaml = r#"
triggers:
  - { trigger: 36, target: 26, channel: 0, mode: up }
  - { trigger: 36, target: 27, channel: 0, mode: down }
"#;
        let err = AppConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateTrigger(36)));
    }

    #[test]
    fn test_bad_channel_filter_rejected() {
        let yaml = r#"
input:
  channel: 16
triggers: []
"#;
        let err = AppConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidInput(_)));
    }

    #[test]
    fn test_tiny_speed_rejected_at_load() {
        let yaml = r#"
timing:
  speed: 1.0e-20
triggers:
  - { trigger: 36, target: 26, channel: 0, mode: up }
"#;
        let err = AppConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTiming(_)));
    }

    #[test]
    fn test_unknown_mode_is_parse_error() {
        let yaml = r#"
triggers:
  - { trigger: 36, target: 26, channel: 0, mode: sideways }
"#;
        let err = AppConfig::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("icontrol.yaml");
        fs::write(&config_path, NANOPAD).unwrap();

        let config = AppConfig::load(&config_path.to_string_lossy())
            .await
            .unwrap();
        let table = config.trigger_table().unwrap();

        assert_eq!(table.len(), 6);
        assert_eq!(table.lookup(46).unwrap().mode, Mode::Single);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("missing.yaml");

        let err = AppConfig::load(&config_path.to_string_lossy())
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
