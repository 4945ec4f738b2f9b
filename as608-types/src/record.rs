//! Fingerprint records

use chrono::{DateTime, Utc};
use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::minutia::{Minutia, MinutiaKind};

/// One captured or enrolled fingerprint
///
/// Holds every stage of the image pipeline plus the extracted minutiae.
/// Records are immutable; a new capture produces a new record.
#[derive(Debug, Clone, PartialEq)]
pub struct FingerprintRecord {
    raw: GrayImage,
    enhanced: GrayImage,
    skeleton: GrayImage,
    aligned: GrayImage,
    minutiae: Vec<Minutia>,
    label: Option<String>,
    captured_at: DateTime<Utc>,
}

/// Serializable summary stored next to the rasters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub label: Option<String>,
    pub captured_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    pub minutiae: Vec<Minutia>,
}

impl FingerprintRecord {
    pub fn new(
        raw: GrayImage,
        enhanced: GrayImage,
        skeleton: GrayImage,
        aligned: GrayImage,
        minutiae: Vec<Minutia>,
    ) -> Self {
        Self {
            raw,
            enhanced,
            skeleton,
            aligned,
            minutiae,
            label: None,
            captured_at: Utc::now(),
        }
    }

    /// Attach an identity label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Override the capture timestamp (used when reloading enrolled records)
    pub fn with_captured_at(mut self, captured_at: DateTime<Utc>) -> Self {
        self.captured_at = captured_at;
        self
    }

    pub fn raw(&self) -> &GrayImage {
        &self.raw
    }

    pub fn enhanced(&self) -> &GrayImage {
        &self.enhanced
    }

    pub fn skeleton(&self) -> &GrayImage {
        &self.skeleton
    }

    pub fn aligned(&self) -> &GrayImage {
        &self.aligned
    }

    /// Minutiae in extraction order (matching is order-sensitive)
    pub fn minutiae(&self) -> &[Minutia] {
        &self.minutiae
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn terminations(&self) -> impl Iterator<Item = &Minutia> {
        self.of_kind(MinutiaKind::Termination)
    }

    pub fn bifurcations(&self) -> impl Iterator<Item = &Minutia> {
        self.of_kind(MinutiaKind::Bifurcation)
    }

    fn of_kind(&self, kind: MinutiaKind) -> impl Iterator<Item = &Minutia> {
        self.minutiae.iter().filter(move |m| m.kind() == kind)
    }

    pub fn metadata(&self) -> RecordMetadata {
        RecordMetadata {
            label: self.label.clone(),
            captured_at: self.captured_at,
            width: self.raw.width(),
            height: self.raw.height(),
            minutiae: self.minutiae.clone(),
        }
    }
}
