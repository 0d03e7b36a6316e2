//! # Gauss Method for Initial Orbit Determination
//!
//! This module provides the observation triplet and the **Gauss geometry** from which a
//! preliminary orbit is computed.
//!
//! ## Core structure: [`GaussObs`]
//!
//! The [`GaussObs`] struct encapsulates the data required by the Gauss algorithm:
//!
//! * Right ascension and declination angles `[rad]`,
//! * Observation epochs (days, strictly increasing),
//! * Observer-to-central-body vectors at each epoch (AU, equatorial), as the columns of a
//!   `3×3` matrix.
//!
//! ## Geometry: [`GaussGeometry`]
//!
//! With `L_i` the lines of sight, `R_i` the observer vectors and the scaled intervals
//! `τ = [k(t₀−t₁), k(t₂−t₀), k(t₂−t₁)]`:
//!
//! ```text
//! D[0][i] = R_i·(L₁×L₂)     D[1][i] = L₀·(R_i×L₂)     D[2][i] = L₀·(L₁×R_i)
//! D0 = L₀·(L₁×L₂)
//!
//! A₁ = τ₂/τ₁   B₁ = A₁(τ₁² − τ₂²)/6     A₃ = −τ₀/τ₁   B₃ = A₃(τ₁² − τ₀²)/6
//! AA = −(A₁·D[1][0] − D[1][1] + A₃·D[1][2])/D0
//! BB = −(B₁·D[1][0] + B₃·D[1][2])/D0
//! EE = −2·L₁·R₁     FF = |R₁|²
//! ```
//!
//! The heliocentric distance `x = r₂` at the middle epoch is a root of the octic
//!
//! ```text
//! C + x³·(B + x³·(A + x²)) = 0
//! A = −(AA² + AA·EE + FF)    B = −μ(2·AA·BB + BB·EE)    C = −μ²·BB²
//! ```
//!
//! and the slant range at the middle epoch is `ρ₂ = AA + μ·BB/x³`.
//!
//! ## Root selection
//!
//! Up to three positive roots can exist. [`GaussGeometry::solve_octic`] runs Newton–Raphson
//! from a caller-supplied guess and rejects a root outside the caller's bracket; it never
//! picks another root on its own. [`GaussGeometry::tabulate`] and
//! [`GaussGeometry::candidate_roots`] help choose the bracket.
//!
//! ## References
//!
//! * Boulet (1991) – *Methods of Orbit Determination for the Microcomputer*
//! * Milani & Gronchi (2010) – *Theory of Orbit Determination*
//!
//! ## See also
//!
//! - [`crate::initial_orbit_determination::refinement::GaussRefinement`]
//! - [`crate::initial_orbit_determination::determine_orbit`]
use aberth::aberth;
use aberth::StopReason;
use log::debug;
use nalgebra::{Matrix3, Vector3};
use smallvec::SmallVec;

use crate::constants::{Days, Degree, Hour, Radian, RADEG, RADH};
use crate::initial_orbit_determination::{IODParams, RootBracket};
use crate::observations::Observation;
use crate::orbit_errors::OrbitError;
use crate::ref_system::line_of_sight;

/// Observation triplet for Gauss's initial orbit determination (IOD).
///
/// Fields
/// -----------------
/// * `ra`: Right ascensions `[rad]` of the three observations.
/// * `dec`: Declinations `[rad]` of the three observations.
/// * `time`: Observation epochs in days, strictly increasing.
/// * `observer_position`: `3×3` matrix of observer-to-central-body vectors, with:
///   - **columns** = observation epochs (1 column per observation),
///   - **units** = astronomical units (AU),
///   - **frame** = equatorial, the same as the right ascensions.
///
/// See also
/// -------------
/// * [`GaussObs::with_observer_position`] – Constructor from radians.
/// * [`GaussObs::from_hours_degrees`] – Constructor from almanac units.
#[derive(Debug, PartialEq, Clone)]
pub struct GaussObs {
    pub(crate) ra: Vector3<Radian>,
    pub(crate) dec: Vector3<Radian>,
    pub(crate) time: Vector3<Days>,
    pub(crate) observer_position: Matrix3<f64>,
}

impl GaussObs {
    /// Create a new Gauss triplet from RA/DEC angles, epochs and observer positions.
    ///
    /// Arguments
    /// -----------------
    /// * `ra`: Right ascensions in radians.
    /// * `dec`: Declinations in radians.
    /// * `time`: Epochs in days.
    /// * `observer_position`: Observer-to-central-body vectors as columns (AU).
    ///
    /// Return
    /// ----------
    /// * `Err(OrbitError::InvalidObservations)` if a value is not finite or the epochs are not
    ///   strictly increasing.
    pub fn with_observer_position(
        ra: Vector3<Radian>,
        dec: Vector3<Radian>,
        time: Vector3<Days>,
        observer_position: Matrix3<f64>,
    ) -> Result<GaussObs, OrbitError> {
        let finite = ra.iter().all(|v| v.is_finite())
            && dec.iter().all(|v| v.is_finite())
            && time.iter().all(|v| v.is_finite())
            && observer_position.iter().all(|v| v.is_finite());
        if !finite {
            return Err(OrbitError::InvalidObservations(
                "angles, epochs and observer positions must be finite".into(),
            ));
        }
        if !(time[0] < time[1] && time[1] < time[2]) {
            return Err(OrbitError::InvalidObservations(format!(
                "epochs must be strictly increasing (got {}, {}, {})",
                time[0], time[1], time[2]
            )));
        }

        Ok(GaussObs {
            ra,
            dec,
            time,
            observer_position,
        })
    }

    /// Build a triplet from three [`Observation`]s, in time order.
    pub fn from_observations(observations: &[Observation; 3]) -> Result<GaussObs, OrbitError> {
        let [o0, o1, o2] = observations;
        GaussObs::with_observer_position(
            Vector3::new(o0.ra, o1.ra, o2.ra),
            Vector3::new(o0.dec, o1.dec, o2.dec),
            Vector3::new(o0.time, o1.time, o2.time),
            Matrix3::from_columns(&[
                o0.observer_position,
                o1.observer_position,
                o2.observer_position,
            ]),
        )
    }

    /// Build a triplet from almanac units: right ascension in hours, declination in degrees.
    ///
    /// Arguments
    /// -----------------
    /// * `time`: Epochs in days.
    /// * `ra_hours`: Right ascensions in hours.
    /// * `dec_degrees`: Declinations in degrees.
    /// * `observer_positions`: Observer-to-central-body vectors `[x, y, z]` (AU), one per epoch.
    pub fn from_hours_degrees(
        time: [Days; 3],
        ra_hours: [Hour; 3],
        dec_degrees: [Degree; 3],
        observer_positions: [[f64; 3]; 3],
    ) -> Result<GaussObs, OrbitError> {
        GaussObs::with_observer_position(
            Vector3::from(ra_hours) * RADH,
            Vector3::from(dec_degrees) * RADEG,
            Vector3::from(time),
            Matrix3::from_columns(&observer_positions.map(Vector3::from)),
        )
    }

    pub fn ra(&self) -> &Vector3<Radian> {
        &self.ra
    }

    pub fn dec(&self) -> &Vector3<Radian> {
        &self.dec
    }

    /// Observation epochs.
    pub fn time(&self) -> &Vector3<Days> {
        &self.time
    }

    /// Observer-to-central-body vectors, one column per epoch.
    pub fn observer_position(&self) -> &Matrix3<f64> {
        &self.observer_position
    }

    /// Construct the matrix of unit direction vectors for the observation triplet.
    ///
    /// Returns
    /// -------
    /// * `Matrix3<f64>` — column `i` is the line of sight `L_i` at epoch `i`.
    pub fn unit_matrix(&self) -> Matrix3<f64> {
        Matrix3::from_columns(&[
            line_of_sight(self.ra[0], self.dec[0]),
            line_of_sight(self.ra[1], self.dec[1]),
            line_of_sight(self.ra[2], self.dec[2]),
        ])
    }

    /// Build the Gauss geometry of the triplet.
    ///
    /// Arguments
    /// ---------
    /// * `params` – Provides `μ`, `k` and the coplanarity threshold `min_d0`.
    ///
    /// Returns
    /// --------
    /// * `Ok(GaussGeometry)` with the `D` matrix, `D0`, triangle constants and octic coefficients.
    /// * `Err(OrbitError::SingularDirectionMatrix)` if `|D0| ≤ min_d0`.
    pub fn geometry(&self, params: &IODParams) -> Result<GaussGeometry, OrbitError> {
        let los = self.unit_matrix();
        let l0 = los.column(0).into_owned();
        let l1 = los.column(1).into_owned();
        let l2 = los.column(2).into_owned();

        let l1_x_l2 = l1.cross(&l2);
        let d0 = l0.dot(&l1_x_l2);
        if !(d0.abs() > params.min_d0) {
            return Err(OrbitError::SingularDirectionMatrix(d0));
        }

        let mut d_matrix = Matrix3::zeros();
        for i in 0..3 {
            let r_i = self.observer_position.column(i).into_owned();
            d_matrix[(0, i)] = r_i.dot(&l1_x_l2);
            d_matrix[(1, i)] = l0.dot(&r_i.cross(&l2));
            d_matrix[(2, i)] = l0.dot(&l1.cross(&r_i));
        }

        let tau = scaled_intervals(&self.time, params.gauss_grav);
        let r1 = self.observer_position.column(1).into_owned();
        let ee = -2.0 * l1.dot(&r1);
        let ff = r1.norm_squared();

        let a1 = tau[2] / tau[1];
        let b1 = a1 * (tau[1].powi(2) - tau[2].powi(2)) / 6.0;
        let a3 = -tau[0] / tau[1];
        let b3 = a3 * (tau[1].powi(2) - tau[0].powi(2)) / 6.0;

        let aa = -(a1 * d_matrix[(1, 0)] - d_matrix[(1, 1)] + a3 * d_matrix[(1, 2)]) / d0;
        let bb = -(b1 * d_matrix[(1, 0)] + b3 * d_matrix[(1, 2)]) / d0;

        let mu = params.mu;
        Ok(GaussGeometry {
            line_of_sight: los,
            d_matrix,
            d0,
            tau,
            ee,
            ff,
            aa,
            bb,
            coeff_a: -(aa * aa + aa * ee + ff),
            coeff_b: -mu * (2.0 * aa * bb + bb * ee),
            coeff_c: -(mu * mu) * bb * bb,
            mu,
        })
    }
}

/// Scaled time intervals `[k(t₀−t₁), k(t₂−t₀), k(t₂−t₁)]`.
pub(crate) fn scaled_intervals(time: &Vector3<Days>, gauss_grav: f64) -> Vector3<f64> {
    Vector3::new(
        gauss_grav * (time[0] - time[1]),
        gauss_grav * (time[2] - time[0]),
        gauss_grav * (time[2] - time[1]),
    )
}

/// Coefficients of the Gauss method derived from one observation triplet.
///
/// Fields
/// -----------------
/// * `line_of_sight`: Unit vectors `L_i` as columns.
/// * `d_matrix`: `d_matrix[(i, j)] = D[i][j]`.
/// * `d0`: Triple product `L₀·(L₁×L₂)`.
/// * `tau`: Scaled intervals `[τ₀, τ₁, τ₂]` of the raw epochs.
/// * `ee`, `ff`: `−2·L₁·R₁` and `|R₁|²`.
/// * `aa`, `bb`: Triangle constants giving `ρ₂ = AA + μ·BB/r₂³`.
/// * `coeff_a`, `coeff_b`, `coeff_c`: Octic coefficients `A`, `B`, `C`.
/// * `mu`: Gravitational parameter used to build the coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussGeometry {
    pub line_of_sight: Matrix3<f64>,
    pub d_matrix: Matrix3<f64>,
    pub d0: f64,
    pub tau: Vector3<f64>,
    pub ee: f64,
    pub ff: f64,
    pub aa: f64,
    pub bb: f64,
    pub coeff_a: f64,
    pub coeff_b: f64,
    pub coeff_c: f64,
    pub mu: f64,
}

/// Root of the octic found by Newton–Raphson.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OcticRoot {
    /// Heliocentric distance `r₂` at the middle epoch (AU).
    pub x: f64,
    /// Slant range `ρ₂` at the middle epoch (AU).
    pub slant_range: f64,
    pub iterations: usize,
}

/// One row of the octic table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OcticSample {
    pub x: f64,
    pub slant_range: f64,
    pub residual: f64,
}

impl GaussGeometry {
    /// Evaluate the octic `C + x³·(B + x³·(A + x²))`.
    pub fn octic(&self, x: f64) -> f64 {
        let x3 = x.powi(3);
        self.coeff_c + x3 * (self.coeff_b + x3 * (self.coeff_a + x * x))
    }

    /// Derivative `x²·(3B + x³·(6A + 8x²))`.
    pub fn octic_derivative(&self, x: f64) -> f64 {
        x * x * (3.0 * self.coeff_b + x.powi(3) * (6.0 * self.coeff_a + 8.0 * x * x))
    }

    /// Slant range at the middle epoch for a heliocentric distance `x`.
    pub fn slant_range(&self, x: f64) -> f64 {
        self.aa + self.mu * self.bb / x.powi(3)
    }

    /// Coefficients of the octic in increasing degree `[c₀, …, c₈]`.
    pub fn polynomial(&self) -> [f64; 9] {
        [
            self.coeff_c,
            0.0,
            0.0,
            self.coeff_b,
            0.0,
            0.0,
            self.coeff_a,
            0.0,
            1.0,
        ]
    }

    /// Solve the octic by Newton–Raphson inside a bracket.
    ///
    /// Arguments
    /// ---------
    /// * `bracket` – Interval the root must belong to, and the starting guess.
    /// * `params` – `newton_eps` (threshold on the Newton step) and `newton_max_it`.
    ///
    /// Returns
    /// --------
    /// * `Ok(OcticRoot)` with the root, the slant range and the number of Newton steps.
    /// * `Err(OrbitError::RootNotFound)` if the iteration diverges, exhausts its cap or
    ///   converges outside the bracket.
    ///
    /// Remarks
    /// --------
    /// * Intermediate iterates may leave the bracket; only the converged root is checked.
    pub fn solve_octic(
        &self,
        bracket: &RootBracket,
        params: &IODParams,
    ) -> Result<OcticRoot, OrbitError> {
        bracket.validate()?;

        let mut x = bracket.guess;
        for iteration in 1..=params.newton_max_it {
            let dx = self.octic(x) / self.octic_derivative(x);
            if !dx.is_finite() {
                return Err(OrbitError::RootNotFound {
                    last: x,
                    iterations: iteration,
                });
            }
            x -= dx;

            if dx.abs() < params.newton_eps {
                if !bracket.contains(x) {
                    return Err(OrbitError::RootNotFound {
                        last: x,
                        iterations: iteration,
                    });
                }
                let slant_range = self.slant_range(x);
                debug!(
                    "Gauss octic root r2 = {x:.12} (rho2 = {slant_range:.12}) after {iteration} iterations"
                );
                return Ok(OcticRoot {
                    x,
                    slant_range,
                    iterations: iteration,
                });
            }
        }

        Err(OrbitError::RootNotFound {
            last: x,
            iterations: params.newton_max_it,
        })
    }

    /// Tabulate the octic across a bracket.
    ///
    /// Arguments
    /// ---------
    /// * `bracket` – Interval to sample.
    /// * `steps` – Number of sub-intervals (at least one); `steps + 1` samples are returned.
    ///
    /// Returns
    /// --------
    /// * Samples `(x, ρ₂(x), f(x))` from `low` to `high`. A sign change of `f` between two
    ///   rows locates a root, and a negative `ρ₂` flags a non-physical one.
    pub fn tabulate(&self, bracket: &RootBracket, steps: usize) -> Vec<OcticSample> {
        let steps = steps.max(1);
        let width = (bracket.high - bracket.low) / steps as f64;

        (0..=steps)
            .map(|i| {
                let x = bracket.low + i as f64 * width;
                OcticSample {
                    x,
                    slant_range: self.slant_range(x),
                    residual: self.octic(x),
                }
            })
            .collect()
    }

    /// Enumerate every positive real root of the octic with the Aberth–Ehrlich method.
    ///
    /// Arguments
    /// ---------
    /// * `params` – `aberth_max_iter`, `aberth_eps` and `root_imag_eps`.
    ///
    /// Returns
    /// --------
    /// * `Ok(roots)` sorted in increasing order; the caller chooses one and builds a
    ///   [`RootBracket`] around it.
    /// * `Err(OrbitError::PolynomialRootFindingFailed)` if the Aberth iteration fails.
    ///
    /// Remarks
    /// --------
    /// * A complex root counts as real when its imaginary part is below `root_imag_eps`.
    pub fn candidate_roots(&self, params: &IODParams) -> Result<SmallVec<[f64; 8]>, OrbitError> {
        let polynomial = self.polynomial();
        let roots = aberth(&polynomial, params.aberth_max_iter, params.aberth_eps);

        match roots.stop_reason {
            StopReason::Converged(_) | StopReason::MaxIteration(_) => {
                let mut positive: SmallVec<[f64; 8]> = roots
                    .iter()
                    .filter(|z| z.re > 0.0 && z.im.abs() < params.root_imag_eps)
                    .map(|z| z.re)
                    .collect();
                positive.sort_by(f64::total_cmp);
                Ok(positive)
            }
            StopReason::Failed(_) => Err(OrbitError::PolynomialRootFindingFailed),
        }
    }
}
