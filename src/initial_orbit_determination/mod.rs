//! # Initial Orbit Determination (IOD) parameters
//!
//! This module defines the [`IODParams`] configuration struct and its builder, the
//! [`RootBracket`] that selects the root of the Gauss distance equation, and the
//! [`determine_orbit`] entry point.
//!
//! ## Purpose
//!
//! The [`IODParams`] object centralizes every constant and numerical setting of the Gauss
//! pipeline:
//!
//! - Gravitational parameter `μ` and Gaussian constant `k` defining the scaled time unit,
//! - Light-time per AU used for the aberration correction of the epochs,
//! - Newton–Raphson tolerance and cap for the 8th-degree distance equation,
//! - Tolerance and cap of the refinement loop,
//! - Tolerance and cap of the universal Kepler solve called twice per refinement iteration,
//! - Aberth–Ehrlich settings for the optional enumeration of every positive root.
//!
//! ## Pipeline overview
//!
//! 1. **Geometry**
//!    The line-of-sight vectors, observer positions and scaled intervals give the `D` matrix,
//!    `D0`, the triangle constants `AA`, `BB` and the coefficients of the distance equation.
//!
//! 2. **Distance equation**
//!    `C + x³·(B + x³·(A + x²)) = 0` is solved by Newton–Raphson from the guess of the
//!    [`RootBracket`]. The root must lie inside the bracket.
//!
//! 3. **Refinement**
//!    Slant ranges, positions, middle-epoch velocity, light-time corrected epochs and f/g
//!    coefficients are iterated until the slant ranges stop moving.
//!
//! ## Example
//!
//! ```rust,no_run
//! use gauss_orbit::initial_orbit_determination::IODParams;
//!
//! let params = IODParams::builder()
//!     .newton_eps(1e-9)
//!     .correction_max_it(200)
//!     .kepler_eps(1e-10)
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## See also
//!
//! * [`crate::initial_orbit_determination::gauss::GaussObs`] – observation triplet & geometry
//! * [`crate::initial_orbit_determination::refinement::GaussRefinement`] – step-wise refinement session
//! * [`crate::initial_orbit_determination::gauss_result::GaussResult`] – converged state and diagnostics
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering::{Equal, Greater};
use std::fmt;

use crate::constants::{GAUSS_GRAV, LIGHT_TIME_AU, MU_SUN};
use crate::initial_orbit_determination::gauss::GaussObs;
use crate::initial_orbit_determination::gauss_result::GaussResult;
use crate::initial_orbit_determination::refinement::GaussRefinement;
use crate::kepler::KeplerSolverParams;
use crate::orbit_errors::OrbitError;

pub mod gauss;
pub mod gauss_result;
pub mod refinement;

/// Configuration parameters of the Gauss preliminary orbit determination.
///
/// Fields
/// -----------------
/// **Physical constants**
/// * `mu` – gravitational parameter in the scaled unit system (`1` for the Sun).
/// * `gauss_grav` – Gaussian constant `k`; intervals are scaled as `τ = k·Δt`.
/// * `light_time_per_au` – light travel time for 1 AU in days (aberration factor).
///
/// **Distance equation**
/// * `newton_eps` – stop when the Newton step `|Δx|` drops below this value.
/// * `newton_max_it` – maximum number of Newton steps.
/// * `min_d0` – smallest admissible `|D0|`; below it the lines of sight are coplanar.
///
/// **Refinement loop**
/// * `correction_eps` – stop when `‖Δp‖` drops below this value.
/// * `correction_max_it` – maximum number of refinement iterations.
/// * `kepler` – tolerance and cap of the universal Kepler solve.
///
/// **Root enumeration**
/// * `aberth_max_iter`, `aberth_eps` – Aberth–Ehrlich iteration cap and tolerance.
/// * `root_imag_eps` – maximum imaginary part for a complex root to count as real.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IODParams {
    // --- Physical constants ---
    pub mu: f64,
    pub gauss_grav: f64,
    pub light_time_per_au: f64,

    // --- Distance equation ---
    pub newton_eps: f64,
    pub newton_max_it: usize,
    pub min_d0: f64,

    // --- Refinement loop ---
    pub correction_eps: f64,
    pub correction_max_it: usize,
    pub kepler: KeplerSolverParams,

    // --- Root enumeration ---
    pub aberth_max_iter: u32,
    pub aberth_eps: f64,
    pub root_imag_eps: f64,
}

impl IODParams {
    /// Create a new [`IODParamsBuilder`] to configure custom parameters.
    ///
    /// # See also
    /// * [`IODParamsBuilder::build`] – Validation rules.
    pub fn builder() -> IODParamsBuilder {
        IODParamsBuilder::new()
    }
}

impl Default for IODParams {
    fn default() -> Self {
        IODParams {
            mu: MU_SUN,
            gauss_grav: GAUSS_GRAV,
            light_time_per_au: LIGHT_TIME_AU,

            newton_eps: 1e-7,
            newton_max_it: 100,
            min_d0: 1e-12,

            correction_eps: 1e-7,
            correction_max_it: 500,
            kepler: KeplerSolverParams::default(),

            aberth_max_iter: 100,
            aberth_eps: 1e-10,
            root_imag_eps: 1e-6,
        }
    }
}

/// Builder for [`IODParams`], with validation.
#[derive(Debug, Clone)]
pub struct IODParamsBuilder {
    params: IODParams,
}

impl Default for IODParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IODParamsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            params: IODParams::default(),
        }
    }

    // --- Physical constants ---
    pub fn mu(mut self, v: f64) -> Self {
        self.params.mu = v;
        self
    }
    pub fn gauss_grav(mut self, v: f64) -> Self {
        self.params.gauss_grav = v;
        self
    }
    pub fn light_time_per_au(mut self, v: f64) -> Self {
        self.params.light_time_per_au = v;
        self
    }

    // --- Distance equation ---
    pub fn newton_eps(mut self, v: f64) -> Self {
        self.params.newton_eps = v;
        self
    }
    pub fn newton_max_it(mut self, v: usize) -> Self {
        self.params.newton_max_it = v;
        self
    }
    pub fn min_d0(mut self, v: f64) -> Self {
        self.params.min_d0 = v;
        self
    }

    // --- Refinement loop ---
    pub fn correction_eps(mut self, v: f64) -> Self {
        self.params.correction_eps = v;
        self
    }
    pub fn correction_max_it(mut self, v: usize) -> Self {
        self.params.correction_max_it = v;
        self
    }
    pub fn kepler_eps(mut self, v: f64) -> Self {
        self.params.kepler.eps = v;
        self
    }
    pub fn kepler_max_it(mut self, v: usize) -> Self {
        self.params.kepler.max_iter = v;
        self
    }

    // --- Root enumeration ---
    pub fn aberth_max_iter(mut self, v: u32) -> Self {
        self.params.aberth_max_iter = v;
        self
    }
    pub fn aberth_eps(mut self, v: f64) -> Self {
        self.params.aberth_eps = v;
        self
    }
    pub fn root_imag_eps(mut self, v: f64) -> Self {
        self.params.root_imag_eps = v;
        self
    }

    // ---- Numeric helpers for PartialOrd (handle NaN as invalid) ----

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    /// Finalize the builder and produce an [`IODParams`] instance.
    ///
    /// Validation rules
    /// -----------------
    /// * `mu > 0`, `gauss_grav > 0` – the scaled unit system must be defined.
    /// * `light_time_per_au >= 0` – zero disables the aberration correction.
    /// * `newton_eps > 0`, `correction_eps > 0`, `kepler.eps > 0`, `aberth_eps > 0`.
    /// * `newton_max_it ≥ 1`, `correction_max_it ≥ 1`, `kepler.max_iter ≥ 1`, `aberth_max_iter ≥ 1`.
    /// * `min_d0 >= 0`, `root_imag_eps >= 0`.
    ///
    /// Returns
    /// -----------------
    /// * `Ok(IODParams)` if all values are valid.
    /// * `Err(OrbitError::InvalidParameter)` naming the first rule that fails.
    pub fn build(self) -> Result<IODParams, OrbitError> {
        let p = &self.params;

        // --- Strictly positive checks (> 0) ---
        if !Self::gt0(p.mu) || !Self::gt0(p.gauss_grav) {
            return Err(OrbitError::InvalidParameter(
                "mu and gauss_grav must be > 0".into(),
            ));
        }
        if !Self::gt0(p.newton_eps) {
            return Err(OrbitError::InvalidParameter(
                "newton_eps must be > 0".into(),
            ));
        }
        if !Self::gt0(p.correction_eps) {
            return Err(OrbitError::InvalidParameter(
                "correction_eps must be > 0".into(),
            ));
        }
        if !Self::gt0(p.aberth_eps) {
            return Err(OrbitError::InvalidParameter(
                "aberth_eps must be > 0".into(),
            ));
        }
        p.kepler.validate()?;

        // --- Basic non-negativity checks (accept zero) ---
        if !Self::ge0(p.light_time_per_au) {
            return Err(OrbitError::InvalidParameter(
                "light_time_per_au must be >= 0".into(),
            ));
        }
        if !Self::ge0(p.min_d0) || !Self::ge0(p.root_imag_eps) {
            return Err(OrbitError::InvalidParameter(
                "min_d0 and root_imag_eps must be >= 0".into(),
            ));
        }

        // --- Iteration counts (>= 1) ---
        if p.newton_max_it == 0 {
            return Err(OrbitError::InvalidParameter(
                "newton_max_it must be >= 1".into(),
            ));
        }
        if p.correction_max_it == 0 {
            return Err(OrbitError::InvalidParameter(
                "correction_max_it must be >= 1".into(),
            ));
        }
        if p.aberth_max_iter == 0 {
            return Err(OrbitError::InvalidParameter(
                "aberth_max_iter must be >= 1".into(),
            ));
        }

        Ok(self.params)
    }
}

impl fmt::Display for IODParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            const PARAM_COL: usize = 50; // width reserved for "name = value"
            writeln!(f, "Initial Orbit Determination Parameters")?;
            writeln!(f, "-------------------------------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            writeln!(f, "[Physical constants]")?;
            line!("mu                   = {:.6}", self.mu, "Gravitational parameter")?;
            line!(
                "gauss_grav           = {:.11}",
                self.gauss_grav,
                "Gaussian constant k"
            )?;
            line!(
                "light_time_per_au    = {:.6e} d",
                self.light_time_per_au,
                "Aberration factor"
            )?;

            writeln!(f, "\n[Distance equation]")?;
            line!(
                "newton_eps           = {:.1e}",
                self.newton_eps,
                "Tolerance on the Newton step"
            )?;
            line!(
                "newton_max_it        = {}",
                self.newton_max_it,
                "Max Newton–Raphson iterations"
            )?;
            line!(
                "min_d0               = {:.1e}",
                self.min_d0,
                "Coplanarity threshold on |D0|"
            )?;

            writeln!(f, "\n[Refinement loop]")?;
            line!(
                "correction_eps       = {:.1e}",
                self.correction_eps,
                "Tolerance on |Δp|"
            )?;
            line!(
                "correction_max_it    = {}",
                self.correction_max_it,
                "Max refinement iterations"
            )?;
            line!(
                "kepler_eps           = {:.1e}",
                self.kepler.eps,
                "Tolerance in universal Kepler solver"
            )?;
            line!(
                "kepler_max_it        = {}",
                self.kepler.max_iter,
                "Max universal Kepler iterations"
            )?;

            writeln!(f, "\n[Root enumeration]")?;
            line!(
                "aberth_max_iter      = {}",
                self.aberth_max_iter,
                "Max iterations for Aberth solver"
            )?;
            line!(
                "aberth_eps           = {:.1e}",
                self.aberth_eps,
                "Convergence tolerance for Aberth solver"
            )?;
            line!(
                "root_imag_eps        = {:.1e}",
                self.root_imag_eps,
                "Max imaginary part for promoted roots"
            )?;

            Ok(())
        } else {
            write!(
                f,
                "IODParams(mu={}, k={}, light_time={:.4e}d, newton_eps={:.1e}, correction_eps={:.1e}, correction_max_it={}, kepler_eps={:.1e})",
                self.mu,
                self.gauss_grav,
                self.light_time_per_au,
                self.newton_eps,
                self.correction_eps,
                self.correction_max_it,
                self.kepler.eps,
            )
        }
    }
}

/// Interval and starting point of the Newton–Raphson solve of the distance equation.
///
/// The distance equation can have up to three positive roots, and nothing in the
/// geometry tells which one is the physical orbit. The bracket is therefore a required input.
/// [`GaussGeometry::candidate_roots`](crate::initial_orbit_determination::gauss::GaussGeometry::candidate_roots)
/// and [`GaussGeometry::tabulate`](crate::initial_orbit_determination::gauss::GaussGeometry::tabulate)
/// help choose it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RootBracket {
    pub low: f64,
    pub high: f64,
    pub guess: f64,
}

impl RootBracket {
    /// Build a validated bracket.
    ///
    /// Return
    /// ----------
    /// * `Err(OrbitError::InvalidParameter)` unless `0 < low < high` and `low ≤ guess ≤ high`.
    pub fn new(low: f64, high: f64, guess: f64) -> Result<Self, OrbitError> {
        let bracket = RootBracket { low, high, guess };
        bracket.validate()?;
        Ok(bracket)
    }

    pub(crate) fn validate(&self) -> Result<(), OrbitError> {
        let ordered = self.low > 0.0 && self.low < self.high;
        let inside = self.low <= self.guess && self.guess <= self.high;
        if !(ordered && inside && self.high.is_finite()) {
            return Err(OrbitError::InvalidParameter(format!(
                "root bracket requires 0 < low < high and low <= guess <= high (got [{}, {}], guess {})",
                self.low, self.high, self.guess
            )));
        }
        Ok(())
    }

    pub fn contains(&self, x: f64) -> bool {
        self.low <= x && x <= self.high
    }
}

/// Determine a preliminary orbit from an observation triplet.
///
/// Arguments
/// -----------------
/// * `triplet`: Three time-ordered observations with their observer positions.
/// * `bracket`: Interval and guess selecting the root of the distance equation.
/// * `params`: Constants and solver settings.
///
/// Return
/// ----------
/// * `Ok(GaussResult)` with the state at the light-time corrected middle epoch.
/// * `Err(OrbitError::SingularDirectionMatrix)` for coplanar lines of sight.
/// * `Err(OrbitError::RootNotFound)` if the distance equation diverges or converges outside
///   the bracket.
/// * `Err(OrbitError::RefinementNonConvergent)` if the refinement hits its cap.
///
/// See also
/// ------------
/// * [`GaussRefinement`] – The same computation driven one iteration at a time.
pub fn determine_orbit(
    triplet: &GaussObs,
    bracket: &RootBracket,
    params: &IODParams,
) -> Result<GaussResult, OrbitError> {
    let session = GaussRefinement::new(triplet, bracket, params)?;
    let result = session.run()?;
    debug!(
        "Gauss orbit determined: epoch {:.6}, {} iterations, root {:.9}",
        result.state.epoch, result.iterations, result.root
    );
    Ok(result)
}
