//! Ridge minutiae

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Minutia type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MinutiaKind {
    /// Ridge ending
    Termination,

    /// Ridge splitting in two
    Bifurcation,
}

impl fmt::Display for MinutiaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Termination => f.write_str("termination"),
            Self::Bifurcation => f.write_str("bifurcation"),
        }
    }
}

/// A ridge feature: position in pixels, orientation in degrees and type
///
/// The angle is always held in `[0, 360)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MinutiaRepr")]
pub struct Minutia {
    x: i32,
    y: i32,
    angle: f64,
    kind: MinutiaKind,
}

#[derive(Deserialize)]
struct MinutiaRepr {
    x: i32,
    y: i32,
    angle: f64,
    kind: MinutiaKind,
}

impl TryFrom<MinutiaRepr> for Minutia {
    type Error = Error;

    fn try_from(repr: MinutiaRepr) -> Result<Self> {
        Self::new(repr.x, repr.y, repr.angle, repr.kind)
    }
}

impl Minutia {
    /// Create a minutia, wrapping the angle onto `[0, 360)`
    ///
    /// # Errors
    ///
    /// `NonFiniteAngle` for NaN or infinite angles.
    pub fn new(x: i32, y: i32, angle: f64, kind: MinutiaKind) -> Result<Self> {
        if !angle.is_finite() {
            return Err(Error::NonFiniteAngle(angle));
        }

        Ok(Self {
            x,
            y,
            angle: normalize_angle(angle),
            kind,
        })
    }

    pub fn termination(x: i32, y: i32, angle: f64) -> Result<Self> {
        Self::new(x, y, angle, MinutiaKind::Termination)
    }

    pub fn bifurcation(x: i32, y: i32, angle: f64) -> Result<Self> {
        Self::new(x, y, angle, MinutiaKind::Bifurcation)
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    /// Orientation in degrees, `[0, 360)`
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn kind(&self) -> MinutiaKind {
        self.kind
    }

    /// Euclidean distance between the two positions
    pub fn distance(&self, other: &Minutia) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }

    /// Circular orientation difference, `[0, 180]`
    pub fn angle_difference(&self, other: &Minutia) -> f64 {
        angle_difference(self.angle, other.angle)
    }

    /// Same minutia shifted by `(dx, dy)`, saturating at the `i32` range
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..*self
        }
    }
}

impl fmt::Display for Minutia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@({}, {}) {:.1}°",
            self.kind, self.x, self.y, self.angle
        )
    }
}

/// Wrap an angle in degrees onto `[0, 360)`
pub fn normalize_angle(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Wrap-around angular distance in degrees, `|((a - b + 180) mod 360) - 180|`
///
/// Evaluated from `|a - b|` so that swapping the arguments gives the
/// bit-identical result.
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}
