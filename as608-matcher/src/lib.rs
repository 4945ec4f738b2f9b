//! # as608-matcher
//!
//! Minutiae-based verification and identification for AS608 captures.
//!
//! - Centroid alignment of skeleton rasters
//! - Greedy minutiae pairing with configurable tolerances
//! - One-to-many identification over an enrollment store
//! - Record construction around a pluggable feature pipeline

pub mod align;
pub mod config;
pub mod error;
pub mod identify;
pub mod minutiae;
pub mod pipeline;
pub mod store;

pub use align::{align, alignment_offset, centroid, translate};
pub use config::MatchConfig;
pub use error::{Error, Result};
pub use identify::{Identification, identify, score_all};
pub use minutiae::{equivalent, is_match, match_count, matched_pairs};
pub use pipeline::{FeaturePipeline, build_record};
pub use store::{DirectoryStore, EnrollmentStore, MemoryStore, render_minutiae};
