//! Matching tolerances

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tolerances for minutia equivalence and the identity decision
///
/// Two calibrations have been used with this sensor: 17.5 px / 30° and
/// 20 px / 40°. Neither is canonical, so both are exposed as presets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Largest position difference, in pixels, for two minutiae to pair up
    #[serde(default = "default_max_distance")]
    pub max_distance: f64,

    /// Largest orientation difference, in degrees (terminations only)
    #[serde(default = "default_max_angle")]
    pub max_angle: f64,

    /// Paired minutiae needed to declare the same finger
    #[serde(default = "default_threshold")]
    pub threshold: usize,
}

fn default_max_distance() -> f64 {
    17.5
}

fn default_max_angle() -> f64 {
    30.0
}

fn default_threshold() -> usize {
    12
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::strict()
    }
}

impl MatchConfig {
    /// 17.5 px / 30°
    pub fn strict() -> Self {
        Self {
            max_distance: default_max_distance(),
            max_angle: default_max_angle(),
            threshold: default_threshold(),
        }
    }

    /// 20 px / 40°
    pub fn relaxed() -> Self {
        Self {
            max_distance: 20.0,
            max_angle: 40.0,
            threshold: default_threshold(),
        }
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if !self.max_distance.is_finite() || self.max_distance < 0.0 {
            return Err(Error::Config(format!(
                "max_distance must be a non-negative number, got {}",
                self.max_distance
            )));
        }
        if !self.max_angle.is_finite() || !(0.0..=180.0).contains(&self.max_angle) {
            return Err(Error::Config(format!(
                "max_angle must lie in [0, 180], got {}",
                self.max_angle
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_presets() {
        let strict = MatchConfig::strict();
        assert_eq!((strict.max_distance, strict.max_angle, strict.threshold), (17.5, 30.0, 12));

        let relaxed = MatchConfig::relaxed();
        assert_eq!((relaxed.max_distance, relaxed.max_angle), (20.0, 40.0));
        assert_eq!(MatchConfig::default(), strict);
    }

    #[test]
    fn test_validate() {
        assert!(MatchConfig::strict().validate().is_ok());

        let negative = MatchConfig { max_distance: -1.0, ..MatchConfig::strict() };
        assert!(matches!(negative.validate(), Err(Error::Config(_))));

        let nan = MatchConfig { max_angle: f64::NAN, ..MatchConfig::strict() };
        assert!(nan.validate().is_err());

        let wide = MatchConfig { max_angle: 270.0, ..MatchConfig::strict() };
        assert!(wide.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: MatchConfig = serde_json::from_str(r#"{"threshold": 8}"#).unwrap();
        assert_eq!(config, MatchConfig::strict().with_threshold(8));
    }
}
