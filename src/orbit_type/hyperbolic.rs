//! # Hyperbolic orbits
//!
//! Elements `(t_p, a, e, i, Ω, ω)` with `a < 0` and `e > 1`.
//!
//! The hyperbolic anomaly `H` relates to time through `e·sinh H − H = M`, with the mean
//! motion `n = k/|a|·√(μ/|a|)`.
use log::trace;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::orbit_errors::OrbitError;
use crate::orbit_type::{
    ElementsContext, OrbitType, OrbitalPlane, Orientation, PerifocalMotion, PerifocalState,
};

/// Classical elements of a hyperbolic orbit.
///
/// Fields
/// -----------------
/// * `perihelion_time`: Epoch of perihelion passage (days).
/// * `semi_major_axis`: Semi-major axis `a < 0` (AU).
/// * `eccentricity`: Eccentricity `e > 1`.
/// * `orientation`: Inclination, node and argument of perihelion in the ecliptic frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperbolicElements {
    pub perihelion_time: f64,
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub orientation: Orientation,
}

impl HyperbolicElements {
    /// Build a validated hyperbolic element set.
    ///
    /// Return
    /// ----------
    /// * `Err(OrbitError::InvalidElements)` unless `a < 0` and `e > 1`.
    pub fn new(
        perihelion_time: f64,
        semi_major_axis: f64,
        eccentricity: f64,
        orientation: Orientation,
    ) -> Result<Self, OrbitError> {
        let elements = HyperbolicElements {
            perihelion_time,
            semi_major_axis,
            eccentricity,
            orientation,
        };
        elements.validate()?;
        Ok(elements)
    }

    fn validate(&self) -> Result<(), OrbitError> {
        if !(self.semi_major_axis < 0.0) || !self.semi_major_axis.is_finite() {
            return Err(OrbitError::InvalidElements(format!(
                "hyperbolic orbit needs a < 0 (got {})",
                self.semi_major_axis
            )));
        }
        if !(self.eccentricity > 1.0) || !self.eccentricity.is_finite() {
            return Err(OrbitError::InvalidElements(format!(
                "hyperbolic orbit needs e > 1 (got {})",
                self.eccentricity
            )));
        }
        Ok(())
    }

    /// Mean motion in radians per day.
    pub fn mean_motion(&self, ctx: &ElementsContext) -> f64 {
        let abs_a = -self.semi_major_axis;
        ctx.gauss_grav / abs_a * (ctx.mu / abs_a).sqrt()
    }

    /// Semi-minor axis `b = |a|·√(e² − 1)`.
    pub fn semi_minor_axis(&self) -> f64 {
        -self.semi_major_axis * (self.eccentricity.powi(2) - 1.0).sqrt()
    }
}

/// Solve the hyperbolic Kepler equation `e·sinh H − H = M` by Newton–Raphson.
///
/// Arguments
/// -----------------
/// * `mean_anomaly`: Hyperbolic mean anomaly `M`.
/// * `eccentricity`: `e > 1`.
/// * `eps`: Tolerance on the residual.
/// * `max_it`: Maximum number of Newton steps.
///
/// Return
/// ----------
/// * `Ok(H)`, or `Err(OrbitError::AnomalySolveNonConvergent)`.
///
/// Notes
/// ----------
/// * The iteration starts at `H₀ = asinh(M/e)`.
pub fn solve_hyperbolic_equation(
    mean_anomaly: f64,
    eccentricity: f64,
    eps: f64,
    max_it: usize,
) -> Result<f64, OrbitError> {
    let mut hyp_anom = (mean_anomaly / eccentricity).asinh();

    let mut residual = f64::INFINITY;
    for iteration in 0..max_it {
        residual = eccentricity * hyp_anom.sinh() - hyp_anom - mean_anomaly;
        hyp_anom -= residual / (eccentricity * hyp_anom.cosh() - 1.0);
        if residual.abs() <= eps {
            trace!("hyperbolic Kepler equation solved in {} iterations", iteration + 1);
            return Ok(hyp_anom);
        }
    }

    Err(OrbitError::AnomalySolveNonConvergent {
        orbit_type: OrbitType::Hyperbolic,
        iterations: max_it,
        residual: residual.abs(),
    })
}

impl PerifocalMotion for HyperbolicElements {
    fn from_plane(plane: &OrbitalPlane, ctx: &ElementsContext) -> Result<Self, OrbitError> {
        let inv_a = plane.inv_semi_major_axis;
        if !(inv_a < 0.0) {
            return Err(OrbitError::DegenerateGeometry(format!(
                "hyperbolic branch with non-negative inverse semi-major axis ({inv_a:e})"
            )));
        }

        let ecc = plane.eccentricity;
        let a = 1.0 / inv_a;
        let b = -a * (ecc * ecc - 1.0).sqrt();

        let hyp_anom = (plane.perifocal_position.y / b).asinh();
        let mean_anom = ecc * hyp_anom.sinh() - hyp_anom;
        let n = -ctx.gauss_grav * inv_a * (-ctx.mu * inv_a).sqrt();

        Ok(HyperbolicElements {
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
        let hyp_anom =
            solve_hyperbolic_equation(mean_anom, ecc, ctx.anomaly_eps, ctx.anomaly_max_it)?;

        let (sinh_h, cosh_h) = (hyp_anom.sinh(), hyp_anom.cosh());
        let b = self.semi_minor_axis();
        let r = a * (1.0 - ecc * cosh_h);
        let rate = (-ctx.mu / a).sqrt() / r;

        Ok(PerifocalState {
            position: Vector2::new(a * (cosh_h - ecc), b * sinh_h),
            velocity: Vector2::new(a * rate * sinh_h, b * rate * cosh_h),
        })
    }

    fn orbit_type(&self) -> OrbitType {
        OrbitType::Hyperbolic
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

#[cfg(test)]
mod hyperbolic_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hyperbolic_equation() {
        for (m, e) in [(0.0, 1.5), (0.4, 1.05), (-7.0, 2.0), (60.0, 3.0)] {
            let h = solve_hyperbolic_equation(m, e, 1e-9, 100).unwrap();
            assert_relative_eq!(e * h.sinh() - h, m, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_hyperbolic_state_energy() {
        let ctx = ElementsContext::heliocentric();
        let elements =
            HyperbolicElements::new(50.0, -3.0, 1.5, Orientation::new(1.1, 2.0, 0.7)).unwrap();

        for t in [-100.0, 50.0, 260.0] {
            let state = elements.perifocal_state(t, &ctx).unwrap();
            let r = state.position.norm();
            // vis-viva: v² = μ(2/r − 1/a)
            assert_relative_eq!(
                state.velocity.norm_squared(),
                2.0 / r + 1.0 / 3.0,
                epsilon = 1e-12
            );
        }

        let at_perihelion = elements.perifocal_state(50.0, &ctx).unwrap();
        assert_relative_eq!(at_perihelion.position.x, 1.5, epsilon = 1e-12);
        assert_relative_eq!(elements.perihelion_distance(), 1.5, epsilon = 1e-15);
    }

    #[test]
    fn test_invalid_elements() {
        let o = Orientation::new(0.1, 0.2, 0.3);
        assert!(HyperbolicElements::new(0.0, 3.0, 1.5, o).is_err());
        assert!(HyperbolicElements::new(0.0, -3.0, 0.5, o).is_err());
    }
}
