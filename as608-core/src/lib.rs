//! # as608-core
//!
//! Core protocol implementation for AS608 fingerprint sensors behind a
//! serial bridge.
//!
//! This crate provides the low-level protocol primitives:
//! - Device state and command byte tables
//! - Chunk framing of the image upload
//! - Packed 4-bit image decoding
//! - Session bookkeeping (one command in flight)

pub mod command;
pub mod constants;
pub mod error;
pub mod frame;
pub mod raster;
pub mod session;
pub mod state;

pub use command::Command;
pub use error::{Error, Result};
pub use frame::{FrameStep, ImageTransfer};
pub use raster::{RawImageBuffer, decode, packed_len};
pub use session::{Session, SessionState};
pub use state::DeviceState;
