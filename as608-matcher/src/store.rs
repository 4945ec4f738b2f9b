//! Enrollment storage
//!
//! The directory layout keeps one folder per identity:
//!
//! ```text
//! <root>/<label>/original.png
//!               /enhanced.png
//!               /skeleton.png
//!               /aligned.png
//!               /result.png
//!               /minutiae.json
//! ```
//!
//! `result.png` is the aligned image with each minutia circled (terminations
//! red, bifurcations blue). It is written for inspection and never read back.

use std::fs;
use std::path::{Path, PathBuf};

use as608_types::{FingerprintRecord, Minutia, MinutiaKind, RecordMetadata};
use image::{GrayImage, ImageFormat, Rgb, RgbImage};
use tracing::{debug, warn};

use crate::error::{Error, Result};

const ORIGINAL: &str = "original.png";
const ENHANCED: &str = "enhanced.png";
const SKELETON: &str = "skeleton.png";
const ALIGNED: &str = "aligned.png";
const RESULT: &str = "result.png";
const METADATA: &str = "minutiae.json";

/// Files a directory must hold to be listed as an enrollment
const REQUIRED: [&str; 5] = [ORIGINAL, ENHANCED, SKELETON, ALIGNED, METADATA];

const MARKER_RADIUS: i64 = 3;
const TERMINATION_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BIFURCATION_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Persistent set of enrolled fingerprints keyed by identity label
pub trait EnrollmentStore {
    /// Persist `record` under `label`, replacing any previous enrollment
    fn save(&mut self, record: &FingerprintRecord, label: &str) -> Result<()>;

    /// Every enrolled record with its label, in listing order
    fn list_all(&self) -> Result<Vec<(String, FingerprintRecord)>>;
}

/// Labels become directory names, so path syntax is refused
fn validate_label(label: &str) -> Result<()> {
    let invalid = label.is_empty()
        || label == "."
        || label == ".."
        || label.contains(['/', '\\'])
        || label.chars().any(char::is_control);

    if invalid {
        return Err(Error::Store(format!("invalid identity label: {:?}", label)));
    }
    Ok(())
}

/// In-memory store, listing in enrollment order
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<(String, FingerprintRecord)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl EnrollmentStore for MemoryStore {
    fn save(&mut self, record: &FingerprintRecord, label: &str) -> Result<()> {
        validate_label(label)?;
        let record = record.clone().with_label(label);

        match self.records.iter_mut().find(|(l, _)| l == label) {
            Some(slot) => slot.1 = record,
            None => self.records.push((label.to_string(), record)),
        }
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<(String, FingerprintRecord)>> {
        Ok(self.records.clone())
    }
}

/// Store backed by one directory per label, listing in label order
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Open (and create if missing) a store rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load the enrollment for `label`, if present
    pub fn load(&self, label: &str) -> Result<Option<FingerprintRecord>> {
        validate_label(label)?;
        let dir = self.root.join(label);
        if !dir.join(ORIGINAL).is_file() {
            return Ok(None);
        }
        load_record(&dir, label).map(Some)
    }
}

/// Aligned image in colour with a circle drawn around every minutia
///
/// Markers falling partly or wholly outside the image are clipped.
pub fn render_minutiae(aligned: &GrayImage, minutiae: &[Minutia]) -> RgbImage {
    let mut out = RgbImage::from_fn(aligned.width(), aligned.height(), |x, y| {
        let v = aligned.get_pixel(x, y)[0];
        Rgb([v, v, v])
    });

    let r = MARKER_RADIUS;
    for m in minutiae {
        let color = match m.kind() {
            MinutiaKind::Termination => TERMINATION_COLOR,
            MinutiaKind::Bifurcation => BIFURCATION_COLOR,
        };

        for dy in -r..=r {
            for dx in -r..=r {
                if (dx * dx + dy * dy - r * r).abs() > r {
                    continue;
                }
                let x = i64::from(m.x()) + dx;
                let y = i64::from(m.y()) + dy;
                if let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) {
                    if x < out.width() && y < out.height() {
                        out.put_pixel(x, y, color);
                    }
                }
            }
        }
    }

    out
}

fn save_png(img: &GrayImage, path: &Path) -> Result<()> {
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

fn load_gray(path: &Path) -> Result<GrayImage> {
    Ok(image::open(path)?.to_luma8())
}

fn load_record(dir: &Path, label: &str) -> Result<FingerprintRecord> {
    let metadata: RecordMetadata = serde_json::from_slice(&fs::read(dir.join(METADATA))?)?;

    let record = FingerprintRecord::new(
        load_gray(&dir.join(ORIGINAL))?,
        load_gray(&dir.join(ENHANCED))?,
        load_gray(&dir.join(SKELETON))?,
        load_gray(&dir.join(ALIGNED))?,
        metadata.minutiae,
    )
    .with_label(label)
    .with_captured_at(metadata.captured_at);

    Ok(record)
}

impl EnrollmentStore for DirectoryStore {
    fn save(&mut self, record: &FingerprintRecord, label: &str) -> Result<()> {
        validate_label(label)?;

        let dir = self.root.join(label);
        fs::create_dir_all(&dir)?;

        save_png(record.raw(), &dir.join(ORIGINAL))?;
        save_png(record.enhanced(), &dir.join(ENHANCED))?;
        save_png(record.skeleton(), &dir.join(SKELETON))?;
        save_png(record.aligned(), &dir.join(ALIGNED))?;
        render_minutiae(record.aligned(), record.minutiae())
            .save_with_format(dir.join(RESULT), ImageFormat::Png)?;

        let mut metadata = record.metadata();
        metadata.label = Some(label.to_string());
        fs::write(dir.join(METADATA), serde_json::to_vec_pretty(&metadata)?)?;

        debug!(label = %label, path = %dir.display(), "Enrolled fingerprint");
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<(String, FingerprintRecord)>> {
        let mut labels = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(label) = entry.file_name().to_str() {
                labels.push(label.to_string());
            }
        }
        labels.sort();

        let mut records = Vec::with_capacity(labels.len());
        for label in labels {
            let dir = self.root.join(&label);
            if let Some(missing) = REQUIRED.iter().find(|f| !dir.join(f).is_file()) {
                warn!(label = %label, missing = %missing, "Skipping incomplete enrollment directory");
                continue;
            }
            match load_record(&dir, &label) {
                Ok(record) => records.push((label, record)),
                Err(e) => warn!(label = %label, error = %e, "Skipping unreadable enrollment"),
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use as608_types::Minutia;
    use image::Luma;
    use pretty_assertions::assert_eq;

    fn record(seed: u8) -> FingerprintRecord {
        let raw = GrayImage::from_fn(6, 4, |x, y| Luma([seed.wrapping_add((x * y) as u8)]));
        let mut skeleton = GrayImage::new(6, 4);
        skeleton.put_pixel(3, 2, Luma([255]));

        FingerprintRecord::new(
            raw.clone(),
            raw,
            skeleton.clone(),
            skeleton,
            vec![
                Minutia::termination(3, 2, 45.0).unwrap(),
                Minutia::bifurcation(1, 1, 300.0).unwrap(),
            ],
        )
    }

    #[test]
    fn test_directory_store_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = DirectoryStore::open(tmp.path()).unwrap();

        let original = record(10);
        store.save(&original, "bob").unwrap();
        store.save(&record(20), "alice").unwrap();

        let all = store.list_all().unwrap();
        let labels: Vec<&str> = all.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["alice", "bob"]);

        let (_, bob) = &all[1];
        assert_eq!(bob.raw(), original.raw());
        assert_eq!(bob.aligned(), original.aligned());
        assert_eq!(bob.minutiae(), original.minutiae());
        assert_eq!(bob.label(), Some("bob"));
        assert_eq!(bob.captured_at(), original.captured_at());

        assert!(tmp.path().join("bob").join("skeleton.png").is_file());
        assert!(tmp.path().join("bob").join("result.png").is_file());
    }

    #[test]
    fn test_damaged_entry_does_not_block_listing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = DirectoryStore::open(tmp.path()).unwrap();
        for label in ["ann", "ben", "cat"] {
            store.save(&record(7), label).unwrap();
        }

        fs::remove_file(tmp.path().join("ann").join("enhanced.png")).unwrap();
        fs::write(tmp.path().join("ben").join("aligned.png"), b"not a png").unwrap();

        let all = store.list_all().unwrap();
        let labels: Vec<&str> = all.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["cat"]);

        assert!(store.load("ben").is_err());
    }

    #[test]
    fn test_render_minutiae_marks_by_kind() {
        let aligned = GrayImage::from_pixel(20, 20, Luma([40]));
        let minutiae = vec![
            Minutia::termination(5, 5, 0.0).unwrap(),
            Minutia::bifurcation(14, 14, 0.0).unwrap(),
            Minutia::termination(-100, i32::MAX, 0.0).unwrap(),
        ];

        let out = render_minutiae(&aligned, &minutiae);

        assert_eq!(out.dimensions(), (20, 20));
        assert_eq!(*out.get_pixel(8, 5), TERMINATION_COLOR);
        assert_eq!(*out.get_pixel(5, 2), TERMINATION_COLOR);
        assert_eq!(*out.get_pixel(14, 17), BIFURCATION_COLOR);
        // Centres stay untouched
        assert_eq!(*out.get_pixel(5, 5), Rgb([40, 40, 40]));
        assert_eq!(*out.get_pixel(0, 19), Rgb([40, 40, 40]));
    }

    #[test]
    fn test_directory_store_overwrites_label() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = DirectoryStore::open(tmp.path()).unwrap();

        store.save(&record(1), "carol").unwrap();
        store.save(&record(99), "carol").unwrap();

        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].1.raw(), record(99).raw());
    }

    #[test]
    fn test_directory_store_load() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = DirectoryStore::open(tmp.path().join("db")).unwrap();

        assert!(store.load("nobody").unwrap().is_none());
        store.save(&record(5), "dave").unwrap();
        assert_eq!(store.load("dave").unwrap().unwrap().minutiae().len(), 2);
    }

    #[test]
    fn test_directory_store_skips_incomplete() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = DirectoryStore::open(tmp.path()).unwrap();
        store.save(&record(3), "erin").unwrap();
        fs::create_dir(tmp.path().join("stray")).unwrap();
        fs::write(tmp.path().join("notes.txt"), b"x").unwrap();

        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].0, "erin");
    }

    #[test]
    fn test_invalid_labels_rejected() {
        let mut store = MemoryStore::new();
        for label in ["", ".", "..", "a/b", "a\\b", "tab\there"] {
            assert!(matches!(store.save(&record(0), label), Err(Error::Store(_))));
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_replaces_and_keeps_order() {
        let mut store = MemoryStore::new();
        store.save(&record(1), "zed").unwrap();
        store.save(&record(2), "amy").unwrap();
        store.save(&record(3), "zed").unwrap();

        let all = store.list_all().unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(all[0].0, "zed");
        assert_eq!(all[0].1.raw(), record(3).raw());
        assert_eq!(all[0].1.label(), Some("zed"));
        assert_eq!(all[1].0, "amy");
    }
}
