//! Host-to-device command opcodes

use std::fmt;

use crate::error::{Error, Result};

/// Command opcodes written by the host
///
/// The sensor firmware numbers match the AS608 instruction table; the bridge
/// adds two self-defined codes above 0x2F.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    /// Capture a fingerprint image into the sensor's image buffer
    GetImage = 0x01,

    /// Stream the image buffer to the host in framed chunks
    UpImage = 0x0A,

    /// Write one sensor register (followed by address and value bytes)
    WriteRegister = 0x0E,

    // Bridge commands
    Acknowledge = 0x30,
    PrintDeviceParameters = 0x31,
}

impl Command {
    /// Number of argument bytes written after the opcode
    pub fn argument_len(self) -> usize {
        match self {
            Self::WriteRegister => 2,
            _ => 0,
        }
    }

    /// Get command name
    pub fn name(self) -> &'static str {
        match self {
            Self::GetImage => "GetImage",
            Self::UpImage => "UpImage",
            Self::WriteRegister => "WriteReg",
            Self::Acknowledge => "Acknowledge",
            Self::PrintDeviceParameters => "PrintDeviceParameters",
        }
    }
}

impl From<Command> for u8 {
    fn from(cmd: Command) -> u8 {
        cmd as u8
    }
}

impl TryFrom<u8> for Command {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x01 => Ok(Self::GetImage),
            0x0A => Ok(Self::UpImage),
            0x0E => Ok(Self::WriteRegister),
            0x30 => Ok(Self::Acknowledge),
            0x31 => Ok(Self::PrintDeviceParameters),
            _ => Err(Error::UnknownCommand(value)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:02X})", self.name(), *self as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_conversion() {
        assert_eq!(u8::from(Command::GetImage), 0x01);
        assert_eq!(u8::from(Command::UpImage), 0x0A);
        assert_eq!(u8::from(Command::WriteRegister), 0x0E);
        assert_eq!(Command::try_from(0x0A).unwrap(), Command::UpImage);
    }

    #[test]
    fn test_argument_len() {
        assert_eq!(Command::WriteRegister.argument_len(), 2);
        assert_eq!(Command::GetImage.argument_len(), 0);
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!(
            Command::try_from(0x02),
            Err(Error::UnknownCommand(0x02))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Command::UpImage.to_string(), "UpImage(0x0A)");
    }
}
