//! Sensor configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! port_name = "/dev/ttyUSB0"
//! baud_rate = 57600
//! data_timeout_ms = 8000
//! command_deadline_ms = 30000
//!
//! [matcher]
//! max_distance = 20.0
//! max_angle = 40.0
//! threshold = 12
//! ```

use std::path::Path;
use std::time::Duration;

use as608_core::constants;
use as608_matcher::MatchConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Serial link, image geometry and protocol timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Serial device path (default: /dev/ttyACM0)
    #[serde(default = "default_port_name")]
    pub port_name: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Transport read timeout; an empty read after this long is retried
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    #[serde(default = "default_image_width")]
    pub image_width: u32,

    #[serde(default = "default_image_height")]
    pub image_height: u32,

    /// Lines in the device parameter block
    #[serde(default = "default_parameter_lines")]
    pub parameter_lines: usize,

    /// Longest wait for a chunk payload (or parameter block) to arrive
    #[serde(default = "default_data_timeout_ms")]
    pub data_timeout_ms: u64,

    /// Cadence of the bytes-available poll
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Bound on a whole command, none by default
    #[serde(default)]
    pub command_deadline_ms: Option<u64>,

    #[serde(default)]
    pub matcher: MatchConfig,
}

fn default_port_name() -> String {
    "/dev/ttyACM0".to_string()
}

fn default_baud_rate() -> u32 {
    constants::DEFAULT_BAUD_RATE
}

fn default_read_timeout_ms() -> u64 {
    constants::DEFAULT_READ_TIMEOUT_MS
}

fn default_image_width() -> u32 {
    constants::IMAGE_WIDTH
}

fn default_image_height() -> u32 {
    constants::IMAGE_HEIGHT
}

fn default_parameter_lines() -> usize {
    constants::PARAMETER_LINES
}

fn default_data_timeout_ms() -> u64 {
    constants::DEFAULT_DATA_TIMEOUT_MS
}

fn default_poll_interval_ms() -> u64 {
    10
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            port_name: default_port_name(),
            baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout_ms(),
            image_width: default_image_width(),
            image_height: default_image_height(),
            parameter_lines: default_parameter_lines(),
            data_timeout_ms: default_data_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            command_deadline_ms: None,
            matcher: MatchConfig::default(),
        }
    }
}

impl SensorConfig {
    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration back as TOML
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port_name.trim().is_empty() {
            return Err(ConfigError::Validation("Port name cannot be empty".to_string()));
        }
        if self.baud_rate == 0 {
            return Err(ConfigError::Validation(
                "Baud rate must be greater than 0".to_string(),
            ));
        }
        if as608_core::packed_len(self.image_width, self.image_height).is_err() {
            return Err(ConfigError::Validation(format!(
                "Image {}x{} cannot be packed two pixels per byte",
                self.image_width, self.image_height
            )));
        }
        if self.parameter_lines == 0 {
            return Err(ConfigError::Validation(
                "Parameter block must have at least one line".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 || self.poll_interval_ms > self.data_timeout_ms {
            return Err(ConfigError::Validation(
                "Poll interval must be nonzero and within the data timeout".to_string(),
            ));
        }
        if self.command_deadline_ms == Some(0) {
            return Err(ConfigError::Validation(
                "Command deadline must be greater than 0".to_string(),
            ));
        }
        self.matcher
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        Ok(())
    }

    /// Packed byte count of one image (`width * height / 2`)
    pub fn expected_image_bytes(&self) -> usize {
        (self.image_width as usize * self.image_height as usize) / 2
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn data_timeout(&self) -> Duration {
        Duration::from_millis(self.data_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn command_deadline(&self) -> Option<Duration> {
        self.command_deadline_ms.map(Duration::from_millis)
    }
}
