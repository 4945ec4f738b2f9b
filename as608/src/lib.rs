//! # as608
//!
//! Driver for AS608 optical fingerprint sensors behind a serial bridge, with
//! minutiae-based matching of the captured prints.
//!
//! ## Features
//!
//! - Async protocol engine: handshake, capture, chunked image upload
//! - Strict frame validation; a desynchronized link is abandoned
//! - Event channel for prompts and download progress
//! - TOML configuration
//! - Centroid alignment and greedy minutiae matching
//!
//! ## Quick Start
//!
//! ```no_run
//! use as608::{Sensor, SensorConfig, SensorEvent};
//!
//! #[tokio::main]
//! async fn main() -> as608::Result<()> {
//!     let mut sensor = Sensor::serial(SensorConfig::default());
//!     let mut events = sensor.subscribe();
//!
//!     tokio::spawn(async move {
//!         while let Some(event) = events.recv().await {
//!             if event == SensorEvent::FingerRequested {
//!                 println!("Place your finger on the sensor");
//!             }
//!         }
//!     });
//!
//!     sensor.connect().await?;
//!
//!     let image = sensor.capture_image().await?;
//!     image.save("capture.png").ok();
//!
//!     sensor.close().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod sensor;

// Re-exports
pub use config::{ConfigError, SensorConfig};
pub use error::{Error, Result};
pub use event::SensorEvent;
pub use sensor::Sensor;

// Re-export protocol and matching types
pub use as608_core::{Command, DeviceState, RawImageBuffer, Session, SessionState};
pub use as608_matcher::{
    DirectoryStore, EnrollmentStore, FeaturePipeline, Identification, MatchConfig, MemoryStore,
};
pub use as608_transport::{MockTransport, SerialTransport, Transport};
pub use as608_types::{DeviceParameters, FingerprintRecord, Minutia, MinutiaKind};
