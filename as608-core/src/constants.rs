//! Protocol constants

/// Baud rate the bridge firmware opens the host link with
pub const DEFAULT_BAUD_RATE: u32 = 57600;

/// Default transport read timeout (milliseconds)
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;

/// Default bound on waiting for a chunk payload to arrive (milliseconds)
pub const DEFAULT_DATA_TIMEOUT_MS: u64 = 5000;

/// Sensor image width in pixels
pub const IMAGE_WIDTH: u32 = 256;

/// Sensor image height in pixels
pub const IMAGE_HEIGHT: u32 = 288;

/// Packed image size on the wire (two pixels per byte)
pub const IMAGE_BYTES: usize = (IMAGE_WIDTH as usize * IMAGE_HEIGHT as usize) / 2;

/// Lines in the device parameter block
pub const PARAMETER_LINES: usize = 7;

/// Multiplier that stretches a 4-bit sample onto 0..=255
pub const NIBBLE_SCALE: u8 = 17;

/// Sensor system registers writable with `WriteReg`
pub mod registers {
    /// Data packet length selector (32 << N bytes)
    pub const PACKET_LENGTH: u8 = 6;
}
