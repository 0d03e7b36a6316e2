//! # Gauss orbit determination result
//!
//! This module defines [`GaussResult`], the outcome of the **Gauss initial orbit
//! determination method** applied to a triplet of astrometric observations.
//!
//! It bundles the heliocentric state at the light-time corrected middle epoch with the
//! diagnostics of the run: the chosen root of the distance equation, the final slant ranges,
//! the number of refinement iterations and the last range correction.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gauss_orbit::initial_orbit_determination::gauss_result::GaussResult;
//! use gauss_orbit::orbit_type::ElementsContext;
//!
//! fn handle_result(result: GaussResult) {
//!     println!("{result}");
//!     if let Ok(elements) = result.elements(&ElementsContext::heliocentric()) {
//!         println!("{elements}");
//!     }
//! }
//! ```
//!
//! ## See also
//!
//! - [`determine_orbit`](crate::initial_orbit_determination::determine_orbit)
//! - [`KeplerElements`] – Classical elements derived from the state.
use std::fmt;

use nalgebra::Vector3;

use crate::orbit_errors::OrbitError;
use crate::orbit_type::{ElementsContext, KeplerElements};
use crate::state_vector::StateVector;

/// Result of the Gauss initial orbit determination method.
///
/// Fields
/// -----------------
/// * `state`: Epoch `t₁` (light-time corrected), heliocentric position and velocity at the
///   middle observation, equatorial frame.
/// * `root`: Root `r₂` of the distance equation that seeded the refinement (AU).
/// * `slant_range`: Slant range `ρ₂` associated with `root` (AU).
/// * `ranges`: Slant ranges at the three epochs after refinement (AU).
/// * `iterations`: Number of refinement iterations, the converged one included.
/// * `final_dp`: Norm of the last range correction.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussResult {
    pub state: StateVector,
    pub root: f64,
    pub slant_range: f64,
    pub ranges: Vector3<f64>,
    pub iterations: usize,
    pub final_dp: f64,
}

impl GaussResult {
    /// Convert the state into classical elements.
    ///
    /// See also
    /// ------------
    /// * [`StateVector::to_elements`]
    pub fn elements(&self, ctx: &ElementsContext) -> Result<KeplerElements, OrbitError> {
        self.state.to_elements(ctx)
    }
}

impl fmt::Display for GaussResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Gauss solution ({} iterations, |dp| = {:.3e})",
            self.iterations, self.final_dp
        )?;
        writeln!(
            f,
            "  r2 = {:.9} AU, rho2 = {:.9} AU",
            self.root, self.slant_range
        )?;
        writeln!(
            f,
            "  P  = [{:.9}, {:.9}, {:.9}] AU",
            self.ranges[0], self.ranges[1], self.ranges[2]
        )?;
        write!(f, "{}", self.state)
    }
}

#[cfg(test)]
mod gauss_result_test {
    use super::*;

    #[test]
    fn test_display() {
        let result = GaussResult {
            state: StateVector::new(
                6378.558200430307,
                Vector3::new(0.5179953050915935, 2.1556086936333294, -0.4608030085248795),
                Vector3::new(-0.7187610783678979, 0.06805577375198091, 0.03512432684630462),
            ),
            root: 2.264906312526451,
            slant_range: 1.6782978155022739,
            ranges: Vector3::new(1.7350042307905804, 1.6776969854777, 1.6039253443027208),
            iterations: 18,
            final_dp: 6.4177e-8,
        };

        let text = format!("{result}");
        assert!(text.contains("18 iterations"));
        assert!(text.contains("r2 = 2.264906313 AU"));
        assert!(text.contains("State vector @ epoch: 6378.558200"));
    }
}
