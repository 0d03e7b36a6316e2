//! # Parabolic orbits
//!
//! Elements `(t_p, q, e ≈ 1, i, Ω, ω)`.
//!
//! The motion is parameterized by `D = r·v/√μ` (equal to `√(2q)·tan(ν/2)`), which obeys
//! Barker's equation in scaled time:
//!
//! ```text
//! q·D + D³/6 = k·√μ·(t − t_p)
//! ```
use log::trace;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::orbit_errors::OrbitError;
use crate::orbit_type::{
    ElementsContext, OrbitType, OrbitalPlane, Orientation, PerifocalMotion, PerifocalState,
};

/// Classical elements of a parabolic orbit.
///
/// Fields
/// -----------------
/// * `perihelion_time`: Epoch of perihelion passage (days).
/// * `perihelion_distance`: Perihelion distance `q > 0` (AU).
/// * `eccentricity`: Eccentricity measured when the elements were derived, within the
///   parabolic tolerance of `1`. The inverse conversion treats the orbit as an exact parabola.
/// * `orientation`: Inclination, node and argument of perihelion in the ecliptic frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParabolicElements {
    pub perihelion_time: f64,
    pub perihelion_distance: f64,
    pub eccentricity: f64,
    pub orientation: Orientation,
}

impl ParabolicElements {
    /// Build a validated parabolic element set with `e = 1`.
    ///
    /// Return
    /// ----------
    /// * `Err(OrbitError::InvalidElements)` unless `q > 0`.
    pub fn new(
        perihelion_time: f64,
        perihelion_distance: f64,
        orientation: Orientation,
    ) -> Result<Self, OrbitError> {
        let elements = ParabolicElements {
            perihelion_time,
            perihelion_distance,
            eccentricity: 1.0,
            orientation,
        };
        elements.validate()?;
        Ok(elements)
    }

    fn validate(&self) -> Result<(), OrbitError> {
        if !(self.perihelion_distance > 0.0) || !self.perihelion_distance.is_finite() {
            return Err(OrbitError::InvalidElements(format!(
                "parabolic orbit needs q > 0 (got {})",
                self.perihelion_distance
            )));
        }
        Ok(())
    }
}

/// Solve Barker's cubic `q·D + D³/6 = M` by Newton–Raphson.
///
/// Arguments
/// -----------------
/// * `mean_anomaly`: Right-hand side `M = k·√μ·(t − t_p)`.
/// * `perihelion_distance`: `q > 0`.
/// * `eps`: Tolerance on the residual.
/// * `max_it`: Maximum number of Newton steps.
///
/// Return
/// ----------
/// * `Ok(D)`, or `Err(OrbitError::AnomalySolveNonConvergent)`.
///
/// Notes
/// ----------
/// * The iteration starts at `D₀ = M`. The cubic is monotonic, so Newton cannot stall.
pub fn solve_barker_equation(
    mean_anomaly: f64,
    perihelion_distance: f64,
    eps: f64,
    max_it: usize,
) -> Result<f64, OrbitError> {
    let q = perihelion_distance;
    let mut d = mean_anomaly;

    let mut residual = f64::INFINITY;
    for iteration in 0..max_it {
        residual = q * d + d.powi(3) / 6.0 - mean_anomaly;
        d -= residual / (q + 0.5 * d * d);
        if residual.abs() <= eps {
            trace!("Barker equation solved in {} iterations", iteration + 1);
            return Ok(d);
        }
    }

    Err(OrbitError::AnomalySolveNonConvergent {
        orbit_type: OrbitType::Parabolic,
        iterations: max_it,
        residual: residual.abs(),
    })
}

impl PerifocalMotion for ParabolicElements {
    fn from_plane(plane: &OrbitalPlane, ctx: &ElementsContext) -> Result<Self, OrbitError> {
        let sqrt_mu = ctx.mu.sqrt();
        let q = plane.semi_latus_rectum / (1.0 + plane.eccentricity);
        let d = plane.radial_velocity / sqrt_mu;
        let mean_anom = q * d + d.powi(3) / 6.0;

        Ok(ParabolicElements {
            perihelion_time: plane.epoch - mean_anom / (ctx.gauss_grav * sqrt_mu),
            perihelion_distance: q,
            eccentricity: plane.eccentricity,
            orientation: plane.orientation,
        })
    }

    fn perifocal_state(
        &self,
        time: f64,
        ctx: &ElementsContext,
    ) -> Result<PerifocalState, OrbitError> {
        self.validate()?;

        let sqrt_mu = ctx.mu.sqrt();
        let q = self.perihelion_distance;
        let mean_anom = ctx.gauss_grav * sqrt_mu * (time - self.perihelion_time);
        let d = solve_barker_equation(mean_anom, q, ctx.parabolic_eps, ctx.anomaly_max_it)?;

        let sqrt_2q = (2.0 * q).sqrt();
        let r = q + 0.5 * d * d;
        let rate = sqrt_mu / r;

        Ok(PerifocalState {
            position: Vector2::new(q - 0.5 * d * d, d * sqrt_2q),
            velocity: Vector2::new(-d * rate, rate * sqrt_2q),
        })
    }

    fn orbit_type(&self) -> OrbitType {
        OrbitType::Parabolic
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
        self.perihelion_distance
    }
}
