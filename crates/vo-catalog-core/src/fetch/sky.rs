//! Sky positions and wavebands for registry queries.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::fetch::error::{
    FetchError, InvalidPositionSnafu, InvalidRadiusSnafu, UnknownWavebandSnafu,
};

/// An ICRS position in degrees.
///
/// Right ascension is normalized into `[0, 360)`; declination must lie in
/// `[-90, 90]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyPosition {
    ra_deg: f64,
    dec_deg: f64,
}

impl SkyPosition {
    /// Validate and normalize a position.
    pub fn new(ra_deg: f64, dec_deg: f64) -> Result<Self, FetchError> {
        ensure!(
            ra_deg.is_finite() && dec_deg.is_finite() && (-90.0..=90.0).contains(&dec_deg),
            InvalidPositionSnafu { ra_deg, dec_deg }
        );
        Ok(SkyPosition {
            ra_deg: ra_deg.rem_euclid(360.0),
            dec_deg,
        })
    }

    /// Right ascension in degrees.
    pub fn ra_deg(&self) -> f64 {
        self.ra_deg
    }

    /// Declination in degrees.
    pub fn dec_deg(&self) -> f64 {
        self.dec_deg
    }
}

impl fmt::Display for SkyPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:+.6})", self.ra_deg, self.dec_deg)
    }
}

pub(crate) fn check_radius(radius_deg: f64) -> Result<(), FetchError> {
    ensure!(
        radius_deg.is_finite() && radius_deg > 0.0 && radius_deg <= 180.0,
        InvalidRadiusSnafu { radius_deg }
    );
    Ok(())
}

/// Registry waveband vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Waveband {
    /// Radio.
    Radio,
    /// Millimeter.
    Millimeter,
    /// Infrared.
    Infrared,
    /// Optical.
    #[default]
    Optical,
    /// Ultraviolet.
    Uv,
    /// Extreme ultraviolet.
    Euv,
    /// X-ray.
    XRay,
    /// Gamma-ray.
    GammaRay,
}

impl Waveband {
    /// Every waveband.
    pub const ALL: [Waveband; 8] = [
        Waveband::Radio,
        Waveband::Millimeter,
        Waveband::Infrared,
        Waveband::Optical,
        Waveband::Uv,
        Waveband::Euv,
        Waveband::XRay,
        Waveband::GammaRay,
    ];

    /// Registry spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Waveband::Radio => "radio",
            Waveband::Millimeter => "millimeter",
            Waveband::Infrared => "infrared",
            Waveband::Optical => "optical",
            Waveband::Uv => "uv",
            Waveband::Euv => "euv",
            Waveband::XRay => "x-ray",
            Waveband::GammaRay => "gamma-ray",
        }
    }
}

impl fmt::Display for Waveband {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Waveband {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = s.trim().to_lowercase();
        Waveband::ALL
            .into_iter()
            .find(|w| w.as_str() == folded)
            .context(UnknownWavebandSnafu { name: s })
    }
}
