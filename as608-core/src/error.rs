//! Error types for as608-core

/// Result type alias for as608 protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Status byte outside the documented device state table
    #[error("Unknown device state byte: 0x{0:02X}")]
    UnknownState(u8),

    /// Opcode outside the documented command table
    #[error("Unknown command opcode: 0x{0:02X}")]
    UnknownCommand(u8),

    /// Sensor reported a failed initialization
    #[error("Device initialization failed (state: {state})")]
    DeviceInit {
        state: crate::state::DeviceState,
    },

    /// Sensor reported failure or timeout for a single command
    #[error("Command {command} failed with device state {state}")]
    CommandFailed {
        command: crate::command::Command,
        state: crate::state::DeviceState,
    },

    /// Frame structure violated in the middle of a transfer
    #[error("Protocol desync: expected {expected}, received {received}")]
    ProtocolDesync {
        expected: &'static str,
        received: crate::state::DeviceState,
    },

    /// Transfer finished cleanly but with the wrong total size
    #[error("Image size mismatch: expected {expected} bytes, got {actual} bytes")]
    ImageSizeMismatch {
        expected: usize,
        actual: usize,
    },

    /// Geometry that cannot be packed two pixels per byte
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions {
        width: u32,
        height: u32,
    },

    /// Invalid session state
    #[error("Invalid session state: {0}")]
    InvalidSessionState(String),

    /// Session not initialized
    #[error("Session not initialized - run the initialization handshake first")]
    SessionNotInitialized,
}

impl Error {
    /// Check if error is recoverable (re-issuing the whole command might succeed)
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CommandFailed { .. } | Self::ImageSizeMismatch { .. }
        )
    }

    /// Check if error leaves the serial session unusable
    pub fn requires_reconnect(&self) -> bool {
        matches!(
            self,
            Self::DeviceInit { .. }
                | Self::ProtocolDesync { .. }
                | Self::UnknownState(_)
                | Self::SessionNotInitialized
        )
    }
}
