//! Errors for shared value types

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Orientation that cannot be wrapped onto `[0, 360)`
    #[error("Minutia angle must be finite, got {0}")]
    NonFiniteAngle(f64),
}
