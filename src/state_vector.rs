//! # Cartesian state vectors
//!
//! A [`StateVector`] is an epoch with a position (AU) and a velocity (AU per scaled time unit,
//! i.e. per `1/k` days) in the equatorial working frame. It is what the Gauss refinement
//! produces and what the element conversions consume.
use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::Days;
use crate::kepler::{solve_universal_fg, KeplerSolverParams, LagrangeCoefficients};
use crate::orbit_errors::OrbitError;
use crate::orbit_type::{ElementsContext, KeplerElements};

/// Epoch, position and velocity of a body under two-body motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub epoch: Days,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl StateVector {
    pub fn new(epoch: Days, position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        StateVector {
            epoch,
            position,
            velocity,
        }
    }

    /// Convert the state into classical elements.
    ///
    /// See also
    /// ------------
    /// * [`KeplerElements::from_state`]
    pub fn to_elements(&self, ctx: &ElementsContext) -> Result<KeplerElements, OrbitError> {
        KeplerElements::from_state(self, ctx)
    }

    /// Evaluate classical elements at `time`.
    ///
    /// See also
    /// ------------
    /// * [`KeplerElements::to_state`]
    pub fn from_elements(
        time: Days,
        elements: &KeplerElements,
        ctx: &ElementsContext,
    ) -> Result<Self, OrbitError> {
        elements.to_state(time, ctx)
    }

    /// Propagate the state by `dt` days with the universal-variable f and g functions.
    ///
    /// Arguments
    /// -----------------
    /// * `dt`: Time interval in days (may be negative).
    /// * `mu`: Gravitational parameter in the scaled unit system.
    /// * `gauss_grav`: Gaussian constant converting days into scaled time.
    /// * `params`: Universal Kepler tolerance and iteration cap.
    ///
    /// Return
    /// ----------
    /// * The state at `epoch + dt`, or the error of [`solve_universal_fg`].
    pub fn propagate(
        &self,
        dt: Days,
        mu: f64,
        gauss_grav: f64,
        params: &KeplerSolverParams,
    ) -> Result<Self, OrbitError> {
        let coeffs: LagrangeCoefficients =
            solve_universal_fg(&self.position, &self.velocity, gauss_grav * dt, mu, params)?;
        let (position, velocity) = coeffs.apply(&self.position, &self.velocity);
        Ok(StateVector::new(self.epoch + dt, position, velocity))
    }

    /// Specific angular momentum `r × v`.
    pub fn angular_momentum(&self) -> Vector3<f64> {
        self.position.cross(&self.velocity)
    }

    /// Specific orbital energy `v²/2 − μ/r`.
    pub fn specific_energy(&self, mu: f64) -> f64 {
        0.5 * self.velocity.norm_squared() - mu / self.position.norm()
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "State vector @ epoch: {:.6}", self.epoch)?;
        writeln!(
            f,
            "  r = [{:+.10}, {:+.10}, {:+.10}] AU",
            self.position.x, self.position.y, self.position.z
        )?;
        write!(
            f,
            "  v = [{:+.10}, {:+.10}, {:+.10}] AU/(1/k d)",
            self.velocity.x, self.velocity.y, self.velocity.z
        )
    }
}
