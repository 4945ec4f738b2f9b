//! Minutiae pairing
//!
//! Two minutiae are equivalent when they share a type and lie within the
//! configured distance; terminations must also agree in orientation.
//! Bifurcation orientation is extracted too unreliably to be checked.
//!
//! Counting is greedy, not an optimal assignment: each minutia of the first
//! set claims the first unclaimed equivalent minutia of the second set, in
//! input order. A poor early pairing can take a minutia a later one needed,
//! so the count can fall below the maximum matching. Scores depend on that
//! exact order and are kept that way.

use as608_types::{Minutia, MinutiaKind};

use crate::config::MatchConfig;

/// Type-aware geometric equivalence
pub fn equivalent(a: &Minutia, b: &Minutia, config: &MatchConfig) -> bool {
    if a.kind() != b.kind() {
        return false;
    }

    if a.distance(b) > config.max_distance {
        return false;
    }

    match a.kind() {
        MinutiaKind::Termination => a.angle_difference(b) <= config.max_angle,
        MinutiaKind::Bifurcation => true,
    }
}

/// Greedy pairing as `(index in first, index in second)`
pub fn matched_pairs(
    first: &[Minutia],
    second: &[Minutia],
    config: &MatchConfig,
) -> Vec<(usize, usize)> {
    let mut consumed = vec![false; second.len()];
    let mut pairs = Vec::new();

    for (i, a) in first.iter().enumerate() {
        let hit = second
            .iter()
            .enumerate()
            .find(|&(j, b)| !consumed[j] && equivalent(a, b, config))
            .map(|(j, _)| j);

        if let Some(j) = hit {
            consumed[j] = true;
            pairs.push((i, j));
        }
    }

    pairs
}

/// Number of greedily paired minutiae
pub fn match_count(first: &[Minutia], second: &[Minutia], config: &MatchConfig) -> usize {
    matched_pairs(first, second, config).len()
}

/// Identity decision for a pairing count
pub fn is_match(count: usize, threshold: usize) -> bool {
    count >= threshold
}
