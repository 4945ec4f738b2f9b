//! Matcher errors

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Alignment needs at least one foreground pixel
    #[error("Cannot align an image with no foreground pixels")]
    EmptyRaster,

    #[error("Invalid match configuration: {0}")]
    Config(String),

    #[error("Feature extraction failed: {0}")]
    Pipeline(String),

    #[error("Enrollment store error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Metadata error: {0}")]
    Json(#[from] serde_json::Error),
}
