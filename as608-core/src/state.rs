//! Device status codes emitted by the sensor bridge

use std::fmt;

use crate::error::{Error, Result};

/// Single-byte status codes sent from the device to the host
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DeviceState {
    // Startup handshake
    Initializing = 0x00,
    InitializationComplete = 0x01,
    InitializationFailed = 0x02,

    // Command outcome
    CommandSuccess = 0x03,
    CommandFailed = 0x04,
    CommandTimeout = 0x05,
    NoFingerDetected = 0x06,

    // Image transfer framing
    DataStart = 0x07,
    DataEnd = 0x08,

    Idle = 0x69,
}

impl DeviceState {
    /// Get state name
    pub fn name(self) -> &'static str {
        match self {
            Self::Initializing => "Initializing",
            Self::InitializationComplete => "InitializationComplete",
            Self::InitializationFailed => "InitializationFailed",
            Self::CommandSuccess => "CommandSuccess",
            Self::CommandFailed => "CommandFailed",
            Self::CommandTimeout => "CommandTimeout",
            Self::NoFingerDetected => "NoFingerDetected",
            Self::DataStart => "DataStart",
            Self::DataEnd => "DataEnd",
            Self::Idle => "Idle",
        }
    }
}

impl From<DeviceState> for u8 {
    fn from(state: DeviceState) -> u8 {
        state as u8
    }
}

impl TryFrom<u8> for DeviceState {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(Self::Initializing),
            0x01 => Ok(Self::InitializationComplete),
            0x02 => Ok(Self::InitializationFailed),
            0x03 => Ok(Self::CommandSuccess),
            0x04 => Ok(Self::CommandFailed),
            0x05 => Ok(Self::CommandTimeout),
            0x06 => Ok(Self::NoFingerDetected),
            0x07 => Ok(Self::DataStart),
            0x08 => Ok(Self::DataEnd),
            0x69 => Ok(Self::Idle),
            _ => Err(Error::UnknownState(value)),
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_conversion() {
        assert_eq!(u8::from(DeviceState::DataStart), 0x07);
        assert_eq!(DeviceState::try_from(0x69).unwrap(), DeviceState::Idle);
    }

    #[test]
    fn test_every_known_byte_roundtrips() {
        for byte in (0x00..=0x08).chain([0x69]) {
            let state = DeviceState::try_from(byte).unwrap();
            assert_eq!(u8::from(state), byte);
        }
    }

    #[test]
    fn test_unknown_state() {
        assert!(matches!(
            DeviceState::try_from(0x09),
            Err(Error::UnknownState(0x09))
        ));
        assert!(DeviceState::try_from(0xFF).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(DeviceState::Idle.to_string(), "Idle(0x69)");
    }
}
