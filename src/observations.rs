//! # Angles-only observations
//!
//! An [`Observation`] is one astrometric measurement: an epoch, a right ascension and a
//! declination, together with the position of the **central body as seen from the observer**.
//!
//! ## Observer position convention
//!
//! The Gauss method writes the body position relative to the central body as
//!
//! ```text
//! r = ρ·L − R
//! ```
//!
//! where `ρ` is the slant range, `L` the line of sight and `R` the vector from the observer to
//! the central body. For heliocentric work `R` is therefore the **geocentric position of the
//! Sun** (equatorial, AU), which is how almanac tables list it.
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{Days, Degree, Hour, Radian, RADEG, RADH};
use crate::ref_system::line_of_sight;

/// A single angles-only observation.
///
/// Fields
/// -----------------
/// * `time`: Epoch on a continuous date scale, in days.
/// * `ra`: Right ascension in radians.
/// * `dec`: Declination in radians.
/// * `observer_position`: Vector from the observer to the central body (AU, equatorial).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub time: Days,
    pub ra: Radian,
    pub dec: Radian,
    pub observer_position: Vector3<f64>,
}

impl Observation {
    pub fn new(time: Days, ra: Radian, dec: Radian, observer_position: Vector3<f64>) -> Self {
        Observation {
            time,
            ra,
            dec,
            observer_position,
        }
    }

    /// Build an observation from right ascension in hours and declination in degrees.
    ///
    /// Arguments
    /// -----------------
    /// * `time`: Epoch in days.
    /// * `ra_hours`: Right ascension in hours.
    /// * `dec_degrees`: Declination in degrees.
    /// * `observer_position`: Vector from the observer to the central body (AU).
    ///
    /// Return
    /// ----------
    /// * An [`Observation`] with angles converted to radians.
    pub fn from_hours_degrees(
        time: Days,
        ra_hours: Hour,
        dec_degrees: Degree,
        observer_position: Vector3<f64>,
    ) -> Self {
        Observation::new(time, ra_hours * RADH, dec_degrees * RADEG, observer_position)
    }

    /// Unit vector from the observer toward the observed body.
    pub fn line_of_sight(&self) -> Vector3<f64> {
        line_of_sight(self.ra, self.dec)
    }
}

#[cfg(test)]
mod observations_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_hours_degrees() {
        let obs = Observation::from_hours_degrees(6370.57744, 6.0, -30.0, Vector3::zeros());

        assert_relative_eq!(obs.ra, std::f64::consts::FRAC_PI_2, epsilon = 1e-15);
        assert_relative_eq!(obs.dec, -std::f64::consts::FRAC_PI_6, epsilon = 1e-15);

        let l = obs.line_of_sight();
        assert_relative_eq!(l, Vector3::new(0.0, 0.75_f64.sqrt(), -0.5), epsilon = 1e-15);
    }
}
