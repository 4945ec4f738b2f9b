//! Transport layer for the AS608 serial bridge
//!
//! Provides the byte-stream abstraction the protocol engine drives, a
//! serial-port implementation and a scripted mock.

pub mod error;
pub mod mock;
pub mod serial;

pub use error::{Error, Result};
pub use mock::{MockHandle, MockTransport};
pub use serial::SerialTransport;

use async_trait::async_trait;
use bytes::BytesMut;

/// Ordered byte channel to the sensor bridge
///
/// Reads are bounded by the transport's own read timeout: an empty buffer
/// means nothing arrived in time, not an error.
#[async_trait]
pub trait Transport: Send {
    /// Open the link
    async fn open(&mut self) -> Result<()>;

    /// Close the link
    async fn close(&mut self) -> Result<()>;

    /// Check if open
    fn is_open(&self) -> bool;

    /// Write raw bytes
    async fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Read up to `max` bytes (possibly none)
    async fn read(&mut self, max: usize) -> Result<BytesMut>;

    /// Bytes already received and waiting to be read
    async fn bytes_available(&mut self) -> Result<usize>;

    /// Drop anything buffered in either direction
    async fn clear(&mut self) -> Result<()>;

    /// Human-readable endpoint name
    fn port_name(&self) -> String;
}
