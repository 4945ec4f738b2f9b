//! High-level error types

use std::time::Duration;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Core protocol error: {0}")]
    Core(#[from] as608_core::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] as608_transport::Error),

    #[error("Type error: {0}")]
    Types(#[from] as608_types::Error),

    #[error("Matcher error: {0}")]
    Matcher(#[from] as608_matcher::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Fewer bytes than announced arrived within the data timeout
    #[error("Timed out after {waited:?} waiting for {needed} bytes ({available} available)")]
    DataTimeout {
        waited: Duration,
        needed: usize,
        available: usize,
    },

    /// The caller-level command deadline elapsed
    #[error("Command deadline of {0:?} elapsed")]
    Deadline(Duration),
}

impl Error {
    /// Re-issuing the whole command from scratch might succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Core(e) => e.is_recoverable(),
            _ => false,
        }
    }

    /// The byte stream can no longer be trusted; close and re-initialize
    pub fn requires_reconnect(&self) -> bool {
        match self {
            Self::Core(e) => e.requires_reconnect(),
            Self::Transport(_) | Self::DataTimeout { .. } | Self::Deadline(_) => true,
            _ => false,
        }
    }
}
