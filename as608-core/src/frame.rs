//! Chunk framing for the image upload sub-protocol
//!
//! After `UpImage` the device answers with a run of frames and a final
//! success status:
//!
//! ```text
//! ┌───────────┬────────────┬───────────────┬───────────┐
//! │ DataStart │   Length   │    Payload    │  DataEnd  │  ... repeated
//! │  1 byte   │ 1 byte (L) │    L bytes    │  1 byte   │
//! └───────────┴────────────┴───────────────┴───────────┘
//! CommandSuccess                                          (terminator)
//! ```
//!
//! There are no checksums or sequence numbers, so any deviation from this
//! alternation abandons the transfer.

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::raster::RawImageBuffer;
use crate::state::DeviceState;

/// What the reader must do after a frame-leading status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStep {
    /// A chunk follows: read the length byte and payload
    Chunk,

    /// The device terminated the transfer
    Complete,
}

/// Sans-IO state of one image download
///
/// The caller feeds it the bytes it reads from the transport; the transfer
/// validates framing and owns the accumulated buffer until `finish`.
#[derive(Debug)]
pub struct ImageTransfer {
    buffer: RawImageBuffer,
    chunks: usize,
}

impl ImageTransfer {
    /// Start a transfer expecting `expected` payload bytes in total
    pub fn new(expected: usize) -> Self {
        Self {
            buffer: RawImageBuffer::new(expected),
            chunks: 0,
        }
    }

    /// Interpret the status byte that opens a frame (or ends the transfer)
    ///
    /// # Errors
    ///
    /// `UnknownState` for bytes outside the state table, `ProtocolDesync`
    /// for any known state other than `DataStart` / `CommandSuccess`.
    pub fn begin_frame(&mut self, byte: u8) -> Result<FrameStep> {
        match DeviceState::try_from(byte)? {
            DeviceState::DataStart => Ok(FrameStep::Chunk),
            DeviceState::CommandSuccess => {
                debug!(
                    chunks = self.chunks,
                    received = self.buffer.len(),
                    "Transfer terminated by device"
                );
                Ok(FrameStep::Complete)
            }
            other => Err(Error::ProtocolDesync {
                expected: "DataStart or CommandSuccess",
                received: other,
            }),
        }
    }

    /// Append a chunk payload
    pub fn accept_payload(&mut self, payload: &[u8]) {
        self.chunks += 1;
        self.buffer.extend(payload);
    }

    /// Check the status byte that must close every frame
    pub fn end_frame(&self, byte: u8) -> Result<()> {
        match DeviceState::try_from(byte)? {
            DeviceState::DataEnd => {
                trace!(chunk = self.chunks, "Frame closed");
                Ok(())
            }
            other => Err(Error::ProtocolDesync {
                expected: "DataEnd",
                received: other,
            }),
        }
    }

    /// Payload bytes received so far
    pub fn received(&self) -> usize {
        self.buffer.len()
    }

    /// Total payload bytes the transfer must deliver
    pub fn expected(&self) -> usize {
        self.buffer.expected()
    }

    /// Frames accepted so far
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Close the transfer, enforcing the exact total size
    pub fn finish(self) -> Result<RawImageBuffer> {
        if !self.buffer.is_complete() {
            return Err(Error::ImageSizeMismatch {
                expected: self.buffer.expected(),
                actual: self.buffer.len(),
            });
        }
        Ok(self.buffer)
    }
}
