//! One-to-many identification

use as608_types::{FingerprintRecord, Minutia};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::config::MatchConfig;
use crate::minutiae::match_count;

/// Best enrolled identity for a probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
    pub label: String,
    pub score: usize,
}

/// Score the probe against every enrolled record, preserving input order
///
/// Each score is `match_count(enrolled, probe)`. Comparisons share no state
/// and run on the rayon pool.
pub fn score_all(
    probe: &[Minutia],
    enrolled: &[(String, FingerprintRecord)],
    config: &MatchConfig,
) -> Vec<usize> {
    enrolled
        .par_iter()
        .map(|(_, record)| match_count(record.minutiae(), probe, config))
        .collect()
}

/// Pick the enrolled record with the highest score at or above the threshold
///
/// Records are considered in order and a score equal to the current best
/// replaces it, so ties go to the later record.
pub fn identify(
    probe: &[Minutia],
    enrolled: &[(String, FingerprintRecord)],
    config: &MatchConfig,
) -> Option<Identification> {
    let scores = score_all(probe, enrolled, config);

    let mut best: Option<(usize, usize)> = None;
    for (index, &score) in scores.iter().enumerate() {
        trace!(label = %enrolled[index].0, score, "Scored enrollment");
        let floor = best.map_or(config.threshold, |(_, s)| s);
        if score >= floor {
            best = Some((index, score));
        }
    }

    let result = best.map(|(index, score)| Identification {
        label: enrolled[index].0.clone(),
        score,
    });

    match &result {
        Some(id) => debug!(label = %id.label, score = id.score, "Identified fingerprint"),
        None => debug!(candidates = enrolled.len(), "No enrollment above threshold"),
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;
    use pretty_assertions::assert_eq;

    fn minutiae(n: usize, offset: i32) -> Vec<Minutia> {
        (0..n)
            .map(|i| Minutia::bifurcation(offset + (i as i32) * 40, 0, 0.0).unwrap())
            .collect()
    }

    fn enrolled(label: &str, minutiae: Vec<Minutia>) -> (String, FingerprintRecord) {
        let img = GrayImage::new(2, 2);
        let record = FingerprintRecord::new(img.clone(), img.clone(), img.clone(), img, minutiae)
            .with_label(label);
        (label.to_string(), record)
    }

    #[test]
    fn test_identify_picks_highest() {
        let probe = minutiae(20, 0);
        let gallery = vec![
            enrolled("alice", minutiae(13, 0)),
            enrolled("bob", minutiae(18, 0)),
            enrolled("carol", minutiae(20, 5000)),
        ];

        let id = identify(&probe, &gallery, &MatchConfig::strict()).unwrap();
        assert_eq!(id, Identification { label: "bob".into(), score: 18 });
    }

    #[test]
    fn test_tie_goes_to_later_record() {
        let probe = minutiae(14, 0);
        let gallery = vec![
            enrolled("first", minutiae(14, 0)),
            enrolled("second", minutiae(14, 0)),
        ];

        let id = identify(&probe, &gallery, &MatchConfig::strict()).unwrap();
        assert_eq!(id.label, "second");
    }

    #[test]
    fn test_below_threshold_is_unknown() {
        let probe = minutiae(11, 0);
        let gallery = vec![enrolled("alice", minutiae(11, 0))];

        assert_eq!(identify(&probe, &gallery, &MatchConfig::strict()), None);

        let lenient = MatchConfig::strict().with_threshold(11);
        assert_eq!(identify(&probe, &gallery, &lenient).unwrap().score, 11);
    }

    #[test]
    fn test_empty_gallery() {
        assert_eq!(identify(&minutiae(20, 0), &[], &MatchConfig::strict()), None);
    }

    #[test]
    fn test_score_all_preserves_order() {
        let probe = minutiae(10, 0);
        let gallery: Vec<_> = (0..200)
            .map(|i| enrolled(&format!("id{i}"), minutiae(i % 11, 0)))
            .collect();

        let scores = score_all(&probe, &gallery, &MatchConfig::strict());
        let expected: Vec<usize> = (0..gallery.len()).map(|i| (i % 11).min(10)).collect();
        assert_eq!(scores, expected);
    }
}
