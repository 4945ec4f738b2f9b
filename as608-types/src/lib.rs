//! Type definitions for as608

pub mod error;
pub mod minutia;
pub mod parameters;
pub mod record;

pub use error::{Error, Result};
pub use minutia::{Minutia, MinutiaKind, angle_difference, normalize_angle};
pub use parameters::DeviceParameters;
pub use record::{FingerprintRecord, RecordMetadata};
