//! # Elliptical orbits
//!
//! Elements `(t_p, a, e, i, Ω, ω)` with `a > 0` and `0 ≤ e < 1`.
//!
//! * Forward: the eccentric anomaly of a state follows in closed form from its perifocal
//!   coordinates, `E = atan2(y/b, x/a + e)`, then `M = E − e·sin E` and `t_p = t − M/n`.
//! * Inverse: Kepler's equation `E − e·sin E = M` is solved by Newton–Raphson.
//!
//! The mean motion is `n = k/a·√(μ/a)` radians per day.
use std::f64::consts::PI;

use log::trace;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::constants::DPI;
use crate::kepler::angle_diff;
use crate::orbit_errors::OrbitError;
use crate::orbit_type::{
    ElementsContext, OrbitType, OrbitalPlane, Orientation, PerifocalMotion, PerifocalState,
};

/// Classical elements of an elliptical orbit.
///
/// Fields
/// -----------------
/// * `perihelion_time`: Epoch of perihelion passage (days).
/// * `semi_major_axis`: Semi-major axis `a > 0` (AU).
/// * `eccentricity`: Eccentricity `0 ≤ e < 1`.
/// * `orientation`: Inclination, node and argument of perihelion in the ecliptic frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EllipticalElements {
    pub perihelion_time: f64,
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub orientation: Orientation,
}

impl EllipticalElements {
    /// Build a validated elliptical element set.
    ///
    /// Return
    /// ----------
    /// * `Err(OrbitError::InvalidElements)` unless `a > 0` and `0 ≤ e < 1`.
    pub fn new(
        perihelion_time: f64,
        semi_major_axis: f64,
        eccentricity: f64,
        orientation: Orientation,
    ) -> Result<Self, OrbitError> {
        let elements = EllipticalElements {
            perihelion_time,
            semi_major_axis,
            eccentricity,
            orientation,
        };
        elements.validate()?;
        Ok(elements)
    }

    fn validate(&self) -> Result<(), OrbitError> {
        if !(self.semi_major_axis > 0.0) || !self.semi_major_axis.is_finite() {
            return Err(OrbitError::InvalidElements(format!(
                "elliptical orbit needs a > 0 (got {})",
                self.semi_major_axis
            )));
        }
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(OrbitError::InvalidElements(format!(
                "elliptical orbit needs 0 <= e < 1 (got {})",
                self.eccentricity
            )));
        }
        Ok(())
    }

    /// Mean motion in radians per day.
    pub fn mean_motion(&self, ctx: &ElementsContext) -> f64 {
        let a = self.semi_major_axis;
        ctx.gauss_grav / a * (ctx.mu / a).sqrt()
    }

    /// Orbital period in days.
    pub fn period(&self, ctx: &ElementsContext) -> f64 {
        DPI / self.mean_motion(ctx)
    }

    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity.powi(2)).sqrt()
    }
}

/// Solve Kepler's equation `E − e·sin E = M` by Newton–Raphson.
///
/// Arguments
/// -----------------
/// * `mean_anomaly`: Mean anomaly `M` (radians, any range).
/// * `eccentricity`: Eccentricity `0 ≤ e < 1`.
/// * `eps`: Tolerance on the residual `|E − e·sin E − M|`.
/// * `max_it`: Maximum number of Newton steps.
///
/// Return
/// ----------
/// * `Ok(E)` with `E` in the neighbourhood of `[−π, π]`.
/// * `Err(OrbitError::AnomalySolveNonConvergent)` if the residual stays above `eps`.
///
/// Notes
/// ----------
/// * `M` is first reduced to `[−π, π]`.
/// * The iteration starts at `E₀ = M`, or at `±π` when `e > 0.8`.
/// * The residual is tested before the last update, so the returned anomaly is one Newton step
///   beyond the tolerance.
pub fn solve_kepler_equation(
    mean_anomaly: f64,
    eccentricity: f64,
    eps: f64,
    max_it: usize,
) -> Result<f64, OrbitError> {
    let mean_anomaly = angle_diff(mean_anomaly, 0.0);
    let mut ecc_anom = if eccentricity > 0.8 {
        PI.copysign(mean_anomaly)
    } else {
        mean_anomaly
    };

    let mut residual = f64::INFINITY;
    for iteration in 0..max_it {
        residual = ecc_anom - eccentricity * ecc_anom.sin() - mean_anomaly;
        ecc_anom -= residual / (1.0 - eccentricity * ecc_anom.cos());
        if residual.abs() <= eps {
            trace!("Kepler equation solved in {} iterations", iteration + 1);
            return Ok(ecc_anom);
        }
    }

    Err(OrbitError::AnomalySolveNonConvergent {
        orbit_type: OrbitType::Elliptical,
        iterations: max_it,
        residual: residual.abs(),
    })
}

impl PerifocalMotion for EllipticalElements {
    fn from_plane(plane: &OrbitalPlane, ctx: &ElementsContext) -> Result<Self, OrbitError> {
        let inv_a = plane.inv_semi_major_axis;
        if !(inv_a > 0.0) {
            return Err(OrbitError::DegenerateGeometry(format!(
                "elliptical branch with non-positive inverse semi-major axis ({inv_a:e})"
            )));
        }

        let ecc = plane.eccentricity;
        let a = 1.0 / inv_a;
        let b = a * (1.0 - ecc * ecc).sqrt();

        let (xb, yb) = (plane.perifocal_position.x, plane.perifocal_position.y);
        let ecc_anom = (yb / b).atan2(xb * inv_a + ecc);
        let mean_anom = ecc_anom - ecc * ecc_anom.sin();
        let n = ctx.gauss_grav / a * (ctx.mu / a).sqrt();

        Ok(EllipticalElements {
            perihelion_time: plane.epoch - mean_anom / n,
            semi_major_axis: a,
            eccentricity: ecc,
            orientation: plane.orientation,
        })
    }

    fn perifocal_state(
        &self,
        time: f64,
        ctx: &ElementsContext,
    ) -> Result<PerifocalState, OrbitError> {
        self.validate()?;

        let a = self.semi_major_axis;
        let ecc = self.eccentricity;
        let mean_anom = self.mean_motion(ctx) * (time - self.perihelion_time);
        let ecc_anom =
            solve_kepler_equation(mean_anom, ecc, ctx.anomaly_eps, ctx.anomaly_max_it)?;

        let (sin_e, cos_e) = ecc_anom.sin_cos();
        let b = self.semi_minor_axis();
        let r = a * (1.0 - ecc * cos_e);
        let rate = (ctx.mu / a).sqrt() / r;

        Ok(PerifocalState {
            position: Vector2::new(a * (cos_e - ecc), b * sin_e),
            velocity: Vector2::new(-a * rate * sin_e, b * rate * cos_e),
        })
    }

    fn orbit_type(&self) -> OrbitType {
        OrbitType::Elliptical
    }

    fn perihelion_time(&self) -> f64 {
        self.perihelion_time
    }

    fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    fn orientation(&self) -> &Orientation {
        &self.orientation
    }

    fn perihelion_distance(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity)
    }
}
