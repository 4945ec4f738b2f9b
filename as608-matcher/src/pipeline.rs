//! Record construction around external feature extraction
//!
//! Ridge enhancement, thinning and minutiae extraction are supplied by the
//! caller. This module only fixes the order they run in and aligns the
//! skeleton before features are taken from it.

use as608_types::{FingerprintRecord, Minutia};
use image::GrayImage;
use tracing::debug;

use crate::align::align;
use crate::error::Result;

/// Image processing stages provided by an external library
#[cfg_attr(test, mockall::automock)]
pub trait FeaturePipeline {
    /// Normalize contrast and ridge orientation of the raw capture
    fn enhance(&self, raw: &GrayImage) -> Result<GrayImage>;

    /// Thin ridges to one-pixel lines (nonzero = ridge)
    fn skeletonize(&self, enhanced: &GrayImage) -> Result<GrayImage>;

    /// Locate terminations and bifurcations on the aligned skeleton
    fn extract_minutiae(&self, aligned: &GrayImage) -> Result<Vec<Minutia>>;
}

/// Run enhance → skeletonize → align → extract and bundle the results
///
/// # Errors
///
/// Stage failures propagate unchanged; an empty skeleton yields `EmptyRaster`.
pub fn build_record<P>(raw: GrayImage, pipeline: &P) -> Result<FingerprintRecord>
where
    P: FeaturePipeline + ?Sized,
{
    let enhanced = pipeline.enhance(&raw)?;
    let skeleton = pipeline.skeletonize(&enhanced)?;
    let aligned = align(&skeleton)?;
    let minutiae = pipeline.extract_minutiae(&aligned)?;

    debug!(count = minutiae.len(), "Extracted minutiae");

    Ok(FingerprintRecord::new(raw, enhanced, skeleton, aligned, minutiae))
}
