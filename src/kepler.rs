//! # Universal Kepler propagator
//!
//! Two-body propagation with the **universal anomaly** `x`, valid for elliptical, parabolic
//! and hyperbolic motion without branching on the orbit type.
//!
//! ## Formulation
//!
//! With `r₀ = |r|`, `d₀ = r·v/√μ`, `α = 2/r₀ − |v|²/μ` (inverse semi-major axis) and the
//! universal functions `s_k(x; −α)` computed by [`s_funct`], the universal Kepler equation
//! reads
//!
//! ```text
//! F(x) = r₀·s₁ + d₀·s₂ + s₃ − √μ·h = 0
//! F'(x) = r₀·s₀ + d₀·s₁ + s₂ = r(h)
//! ```
//!
//! where `h` is the **scaled** time interval `k·Δt`. Once `x` is known the Lagrange
//! coefficients follow in closed form:
//!
//! ```text
//! f = 1 − s₂/r₀           g = (r₀·s₁ + d₀·s₂)/√μ
//! ḟ = −√μ·s₁/(r·r₀)        ġ = 1 − s₂/r
//! ```
//!
//! ## See also
//!
//! * [`solve_universal_fg`] – Newton–Raphson solve returning [`LagrangeCoefficients`].
//! * [`crate::state_vector::StateVector::propagate`] – Convenience wrapper on a state.
use log::trace;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::constants::DPI;
use crate::orbit_errors::OrbitError;

/// Tolerance and iteration cap of the universal Kepler Newton–Raphson solve.
///
/// Fields
/// -----------------
/// * `eps`: Convergence threshold on the residual `|F(x)|` (default `1e-7`).
/// * `max_iter`: Maximum number of Newton steps before giving up (default `500`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeplerSolverParams {
    pub eps: f64,
    pub max_iter: usize,
}

impl Default for KeplerSolverParams {
    fn default() -> Self {
        KeplerSolverParams {
            eps: 1e-7,
            max_iter: 500,
        }
    }
}

impl KeplerSolverParams {
    /// Check that the tolerance is strictly positive and at least one iteration is allowed.
    pub fn validate(&self) -> Result<(), OrbitError> {
        if !(self.eps > 0.0) {
            return Err(OrbitError::InvalidParameter(
                "kepler eps must be > 0".into(),
            ));
        }
        if self.max_iter == 0 {
            return Err(OrbitError::InvalidParameter(
                "kepler max_iter must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

/// Lagrange coefficients mapping a state `(r, v)` across a time interval.
///
/// ```text
/// r(t₀ + h) = f·r + g·v
/// v(t₀ + h) = ḟ·r + ġ·v
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LagrangeCoefficients {
    pub f: f64,
    pub g: f64,
    pub fdot: f64,
    pub gdot: f64,
}

impl LagrangeCoefficients {
    /// Coefficients of a zero-length interval.
    pub fn identity() -> Self {
        LagrangeCoefficients {
            f: 1.0,
            g: 0.0,
            fdot: 0.0,
            gdot: 1.0,
        }
    }

    /// Second-order truncation of the f and g series.
    ///
    /// This is the cheap estimate used to seed the Gauss refinement: with `u = μ/r³`,
    ///
    /// ```text
    /// f ≈ 1 − u·τ²/2        g ≈ τ·(1 − u·τ²/6)
    /// ḟ ≈ −u·τ              ġ ≈ 1 − u·τ²/2
    /// ```
    ///
    /// Arguments
    /// -----------------
    /// * `u`: The ratio `μ/r³` at the reference epoch.
    /// * `tau`: Scaled time interval.
    pub fn truncated(u: f64, tau: f64) -> Self {
        let tau2 = tau * tau;
        LagrangeCoefficients {
            f: 1.0 - 0.5 * u * tau2,
            g: tau * (1.0 - u * tau2 / 6.0),
            fdot: -u * tau,
            gdot: 1.0 - 0.5 * u * tau2,
        }
    }

    /// Apply the coefficients to a state and return the propagated `(position, velocity)`.
    pub fn apply(
        &self,
        position: &Vector3<f64>,
        velocity: &Vector3<f64>,
    ) -> (Vector3<f64>, Vector3<f64>) {
        (
            self.f * position + self.g * velocity,
            self.fdot * position + self.gdot * velocity,
        )
    }

    /// Determinant `f·ġ − ḟ·g`, equal to one for an exact two-body solution.
    pub fn wronskian(&self) -> f64 {
        self.f * self.gdot - self.fdot * self.g
    }
}

/// Evaluate the universal functions `s₀, s₁, s₂, s₃` of argument `psi` for the energy
/// parameter `alpha`.
///
/// They satisfy `s₀ = 1 + α·s₂` and `s₁ = ψ + α·s₃`; for `α < 0` they reduce to
/// `cos(√−α ψ)`, `sin(√−α ψ)/√−α`, … and for `α > 0` to their hyperbolic counterparts.
///
/// Arguments
/// -----------------
/// * `psi`: Universal anomaly.
/// * `alpha`: Energy parameter (minus the inverse semi-major axis in the scaled unit system).
///
/// Return
/// ----------
/// * `(s0, s1, s2, s3)`.
///
/// Notes
/// ----------
/// * For `|α·ψ²| < 100` the functions are summed directly as power series.
/// * Larger arguments are halved until the series is accurate, then doubled back with
///   `s₀(2ψ) = 2s₀² − 1` and `s₁(2ψ) = 2s₀s₁`.
pub(crate) fn s_funct(psi: f64, alpha: f64) -> (f64, f64, f64, f64) {
    const JMAX: usize = 70;
    const HALFMAX: usize = 30;
    const BETACONTR: f64 = 100.0;

    let epsilon = f64::EPSILON;
    let contr = 100.0 * epsilon;
    let overfl = 1.0 / epsilon;

    let beta = alpha * psi.powi(2);
    let mut s0: f64;
    let mut s1: f64;
    let s2: f64;
    let s3: f64;

    if beta.abs() < BETACONTR {
        let mut term2 = psi.powi(2) / 2.0;
        let mut term3 = term2 * psi / 3.0;
        let mut sum2 = term2;
        let mut sum3 = term3;

        for j in 1..=JMAX {
            term2 *= beta / ((2.0 * j as f64 + 1.0) * (2.0 * j as f64 + 2.0));
            sum2 += term2;
            if term2.abs() < contr || term2.abs() > overfl {
                break;
            }
        }

        for j in 1..=JMAX {
            term3 *= beta / ((2.0 * j as f64 + 2.0) * (2.0 * j as f64 + 3.0));
            sum3 += term3;
            if term3.abs() < contr || term3.abs() > overfl {
                break;
            }
        }

        s2 = sum2;
        s3 = sum3;
        s1 = psi + alpha * s3;
        s0 = 1.0 + alpha * s2;
    } else {
        // halve psi until the series argument is small enough
        let mut psi2 = psi;
        let mut nhalf = 0;
        let mut beta_half = beta;

        for _ in 0..HALFMAX {
            psi2 *= 0.5;
            nhalf += 1;
            beta_half = alpha * psi2.powi(2);
            if beta_half.abs() < BETACONTR {
                break;
            }
        }

        let mut term0 = 1.0;
        let mut term1 = psi2;
        s0 = 1.0;
        s1 = psi2;

        for j in 1..=JMAX {
            term0 *= beta_half / ((2 * j - 1) as f64 * (2 * j) as f64);
            s0 += term0;
            if term0.abs() < contr || term0.abs() > overfl {
                break;
            }
        }

        for j in 1..=JMAX {
            term1 *= beta_half / ((2 * j) as f64 * (2 * j + 1) as f64);
            s1 += term1;
            if term1.abs() < contr || term1.abs() > overfl {
                break;
            }
        }

        // duplication formulas
        for _ in 0..nhalf {
            let s02 = 2.0 * s0.powi(2) - 1.0;
            let s12 = 2.0 * s0 * s1;
            s0 = s02;
            s1 = s12;
        }

        s3 = (s1 - psi) / alpha;
        s2 = (s0 - 1.0) / alpha;
    }

    (s0, s1, s2, s3)
}

/// Return the principal value of an angle in `[0, 2π)`.
pub fn principal_angle(a: f64) -> f64 {
    a.rem_euclid(DPI)
}

/// Return the principal difference `a − b` in `[-π, π]`.
pub fn angle_diff(a: f64, b: f64) -> f64 {
    let a = principal_angle(a);
    let b = principal_angle(b);

    let mut diff = a - b;

    if diff > PI {
        diff -= DPI;
    } else if diff < -PI {
        diff += DPI;
    }

    diff
}

/// Solve the universal Kepler equation and return the Lagrange coefficients for a
/// two-body state propagated over a scaled time interval.
///
/// Arguments
/// -----------------
/// * `position`: Position vector `r` at the reference epoch (AU).
/// * `velocity`: Velocity vector `v` at the reference epoch (AU per scaled time unit).
/// * `h`: Signed **scaled** time interval `k·Δt`.
/// * `mu`: Gravitational parameter (`1` for heliocentric work in Gaussian units).
/// * `params`: Newton–Raphson tolerance and iteration cap.
///
/// Return
/// ----------
/// * `Ok(LagrangeCoefficients)` with `r(t₀+h) = f·r + g·v` and `v(t₀+h) = ḟ·r + ġ·v`.
/// * `Err(OrbitError::DegenerateGeometry)` if `|r| = 0` or `μ ≤ 0`.
/// * `Err(OrbitError::UniversalKeplerNonConvergence)` if `|F(x)|` does not drop below
///   `params.eps` within `params.max_iter` Newton steps.
///
/// Notes
/// ----------
/// * `h = 0` returns exactly `f = 1, g = 0, ḟ = 0, ġ = 1`.
/// * The initial guess is `x₀ = √μ·h/r₀`, the first-order expansion of the universal anomaly.
///   On hyperbolic arcs the logarithmic estimate of [`hyperbolic_guess`] replaces it when it
///   is closer to zero with the same sign.
/// * `F` increases with `x`, so every residual sign narrows a bracket on the root. A Newton
///   step leaving that bracket is replaced by its midpoint.
///
/// See also
/// ------------
/// * [`LagrangeCoefficients::apply`] – Build the propagated state.
pub fn solve_universal_fg(
    position: &Vector3<f64>,
    velocity: &Vector3<f64>,
    h: f64,
    mu: f64,
    params: &KeplerSolverParams,
) -> Result<LagrangeCoefficients, OrbitError> {
    let r0 = position.norm();
    if !(r0 > 0.0) || !r0.is_finite() {
        return Err(OrbitError::DegenerateGeometry(
            "universal Kepler: position vector has zero or non-finite length".into(),
        ));
    }
    if !(mu > 0.0) {
        return Err(OrbitError::DegenerateGeometry(
            "universal Kepler: gravitational parameter must be > 0".into(),
        ));
    }
    if h == 0.0 {
        return Ok(LagrangeCoefficients::identity());
    }

    let sqrt_mu = mu.sqrt();
    let d0 = position.dot(velocity) / sqrt_mu;
    let inv_a = 2.0 / r0 - velocity.norm_squared() / mu;
    let alpha = -inv_a;
    let ww = h * sqrt_mu;

    let mut x = ww / r0;
    if inv_a < 0.0 {
        if let Some(guess) = hyperbolic_guess(r0, d0 * sqrt_mu, inv_a, h, mu) {
            if guess * h > 0.0 && guess.abs() < x.abs() {
                x = guess;
            }
        }
    }
    let mut residual = f64::INFINITY;
    let (mut low, mut high) = (f64::NEG_INFINITY, f64::INFINITY);

    for iteration in 0..=params.max_iter {
        let (s0, s1, s2, s3) = s_funct(x, alpha);
        residual = r0 * s1 + d0 * s2 + s3 - ww;

        if residual.abs() < params.eps {
            let r = r0 * s0 + d0 * s1 + s2;
            trace!("universal Kepler converged: h = {h:.6e}, x = {x:.12}, {iteration} iterations");
            return Ok(LagrangeCoefficients {
                f: 1.0 - s2 / r0,
                g: (r0 * s1 + d0 * s2) / sqrt_mu,
                fdot: -sqrt_mu * s1 / (r * r0),
                gdot: 1.0 - s2 / r,
            });
        }
        if iteration == params.max_iter {
            break;
        }

        if residual < 0.0 {
            low = low.max(x);
        } else {
            high = high.min(x);
        }

        let derivative = r0 * s0 + d0 * s1 + s2;
        let mut next = x - residual / derivative;
        if !(next > low && next < high) && low.is_finite() && high.is_finite() {
            next = 0.5 * (low + high);
        }
        if !next.is_finite() {
            break;
        }
        x = next;
    }

    Err(OrbitError::UniversalKeplerNonConvergence {
        iterations: params.max_iter,
        residual: residual.abs(),
    })
}

/// Starting value of the universal anomaly on a long hyperbolic arc.
///
/// `rv` is `r·v` and `inv_a = 1/a < 0`. The estimate keeps only the dominant exponential
/// term of the hyperbolic Kepler equation, so it is poor for short arcs. `None` when the
/// logarithm is undefined.
fn hyperbolic_guess(r0: f64, rv: f64, inv_a: f64, h: f64, mu: f64) -> Option<f64> {
    let a = 1.0 / inv_a;
    let denom = rv + h.signum() * (-mu * a).sqrt() * (1.0 - r0 * inv_a);
    let arg = -2.0 * mu * h * inv_a / denom;
    if !(arg > 0.0) || !arg.is_finite() {
        return None;
    }
    let guess = h.signum() * (-a).sqrt() * arg.ln();
    guess.is_finite().then_some(guess)
}

#[cfg(test)]
mod kepler_test {

    use super::*;
    use approx::assert_relative_eq;

    fn pallas_state() -> (Vector3<f64>, Vector3<f64>) {
        (
            Vector3::new(0.5179953050915935, 2.1556086936333294, -0.4608030085248795),
            Vector3::new(-0.7187610783678979, 0.06805577375198091, 0.03512432684630462),
        )
    }

    #[test]
    fn test_s_funct() {
        let psi = -15.279808141051223;
        let alpha = -1.6298946008705195e-4;

        let (s0, s1, s2, s3) = s_funct(psi, alpha);

        assert_relative_eq!(s0, 0.9810334785583247, epsilon = 1e-14);
        assert_relative_eq!(s1, -15.183083836892674, epsilon = 1e-12);
        assert_relative_eq!(s2, 116.3665517484714, epsilon = 1e-10);
        assert_relative_eq!(s3, -593.4390119881925, epsilon = 1e-9);
    }

    #[test]
    fn test_s_funct_halving_elliptic() {
        // |alpha psi^2| = 144 goes through the duplication branch
        let (psi, alpha) = (12.0_f64, -1.0_f64);
        let (s0, s1, s2, s3) = s_funct(psi, alpha);

        assert_relative_eq!(s0, psi.cos(), epsilon = 1e-12);
        assert_relative_eq!(s1, psi.sin(), epsilon = 1e-12);
        assert_relative_eq!(s2, 1.0 - psi.cos(), epsilon = 1e-12);
        assert_relative_eq!(s3, psi - psi.sin(), epsilon = 1e-11);
    }

    #[test]
    fn test_s_funct_halving_hyperbolic() {
        let (psi, alpha) = (11.0_f64, 1.0_f64);
        let (s0, s1, _, _) = s_funct(psi, alpha);

        assert_relative_eq!(s0, psi.cosh(), max_relative = 1e-12);
        assert_relative_eq!(s1, psi.sinh(), max_relative = 1e-12);
    }

    #[test]
    fn test_angles() {
        assert_relative_eq!(principal_angle(-PI / 2.0), 1.5 * PI, epsilon = 1e-15);
        assert_relative_eq!(principal_angle(5.0 * PI), PI, epsilon = 1e-14);
        assert_relative_eq!(angle_diff(0.1, DPI - 0.1), 0.2, epsilon = 1e-14);
        assert_relative_eq!(angle_diff(DPI - 0.1, 0.1), -0.2, epsilon = 1e-14);
    }

    #[test]
    fn test_zero_interval_is_identity() {
        let (r, v) = pallas_state();
        let coeffs = solve_universal_fg(&r, &v, 0.0, 1.0, &KeplerSolverParams::default()).unwrap();

        assert_eq!(coeffs.f, 1.0);
        assert_eq!(coeffs.g, 0.0);
        assert_eq!(coeffs.fdot, 0.0);
        assert_eq!(coeffs.gdot, 1.0);
    }

    #[test]
    fn test_zero_radius_is_rejected() {
        let res = solve_universal_fg(
            &Vector3::zeros(),
            &Vector3::new(0.0, 1.0, 0.0),
            0.3,
            1.0,
            &KeplerSolverParams::default(),
        );
        assert!(matches!(res, Err(OrbitError::DegenerateGeometry(_))));
    }

    #[test]
    fn test_circular_orbit_quarter_period() {
        // unit circular orbit: a quarter period is h = π/2 in scaled time
        let r = Vector3::new(1.0, 0.0, 0.0);
        let v = Vector3::new(0.0, 1.0, 0.0);
        let coeffs =
            solve_universal_fg(&r, &v, PI / 2.0, 1.0, &KeplerSolverParams::default()).unwrap();
        let (r1, v1) = coeffs.apply(&r, &v);

        assert_relative_eq!(r1, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(v1, Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_forward_then_back() {
        let (r, v) = pallas_state();
        let params = KeplerSolverParams::default();

        for h in [0.3, -1.2, 5.0] {
            let fwd = solve_universal_fg(&r, &v, h, 1.0, &params).unwrap();
            assert_relative_eq!(fwd.wronskian(), 1.0, epsilon = 1e-9);

            let (r1, v1) = fwd.apply(&r, &v);
            let back = solve_universal_fg(&r1, &v1, -h, 1.0, &params).unwrap();
            let (r2, v2) = back.apply(&r1, &v1);

            assert_relative_eq!(r2, r, epsilon = 1e-6);
            assert_relative_eq!(v2, v, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_long_hyperbolic_arcs() {
        let r = Vector3::new(1.0, 0.0, 0.0);
        let cases = [
            (Vector3::new(0.0, 1.5, 0.0), 100.0),
            (Vector3::new(0.0, 1.5, 0.0), -100.0),
            (Vector3::new(0.0, 2.0, 0.0), 50.0),
            (Vector3::new(0.0, 1.7, 0.0), 100.0),
            (Vector3::new(0.0, 1.45, 0.0), 1000.0),
        ];
        // the logarithmic start reaches these roots in a handful of steps
        let params = KeplerSolverParams {
            eps: 1e-7,
            max_iter: 20,
        };

        for (v, h) in cases {
            let coeffs = solve_universal_fg(&r, &v, h, 1.0, &params).unwrap();
            assert_relative_eq!(coeffs.wronskian(), 1.0, epsilon = 1e-9);

            let (r1, v1) = coeffs.apply(&r, &v);
            let energy =
                |r: &Vector3<f64>, v: &Vector3<f64>| 0.5 * v.norm_squared() - 1.0 / r.norm();
            assert_relative_eq!(energy(&r1, &v1), energy(&r, &v), epsilon = 1e-6);
            assert_relative_eq!(r1.cross(&v1), r.cross(&v), epsilon = 1e-6);
            assert!(r1.norm() > r.norm());
        }
    }

    #[test]
    fn test_hyperbolic_guess_is_rejected_on_short_arcs() {
        // the logarithm changes sign for short arcs, the first-order start is kept
        let guess = hyperbolic_guess(1.0, 0.0, -0.25, 0.01, 1.0);
        assert!(guess.is_some_and(|g| g < 0.0));

        let r = Vector3::new(1.0, 0.0, 0.0);
        let v = Vector3::new(0.0, 1.5, 0.0);
        let coeffs =
            solve_universal_fg(&r, &v, 0.01, 1.0, &KeplerSolverParams::default()).unwrap();
        assert_relative_eq!(coeffs.g, 0.01, epsilon = 1e-6);
    }

    #[test]
    fn test_iteration_cap() {
        let (r, v) = pallas_state();
        let params = KeplerSolverParams {
            eps: 1e-7,
            max_iter: 1,
        };
        let res = solve_universal_fg(&r, &v, 5.0, 1.0, &params);
        assert!(matches!(
            res,
            Err(OrbitError::UniversalKeplerNonConvergence { iterations: 1, .. })
        ));
    }

    #[test]
    fn test_truncated_series_matches_full_solve_for_short_arcs() {
        let (r, v) = pallas_state();
        let tau = 0.01;
        let u = 1.0 / r.norm().powi(3);
        let full = solve_universal_fg(&r, &v, tau, 1.0, &KeplerSolverParams::default()).unwrap();
        let approx = LagrangeCoefficients::truncated(u, tau);

        assert_relative_eq!(full.f, approx.f, epsilon = 1e-6);
        assert_relative_eq!(full.g, approx.g, epsilon = 1e-6);
    }

    #[test]
    fn test_params_validation() {
        assert!(KeplerSolverParams::default().validate().is_ok());
        let bad = KeplerSolverParams {
            eps: 0.0,
            max_iter: 10,
        };
        assert!(bad.validate().is_err());
    }
}
