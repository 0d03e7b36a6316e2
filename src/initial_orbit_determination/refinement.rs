//! # Iterative refinement of the Gauss solution
//!
//! Starting from a root `r₂` of the distance equation, the refinement alternates between
//! **ranges** and **Lagrange coefficients** until the slant ranges stop moving.
//!
//! ## Seed
//!
//! With `u = μ/r₂³`, the truncated series give `F_i ≈ 1 − u·τ_i²/2` and
//! `G_i ≈ τ_i·(1 − u·τ_i²/6)` for the outer intervals `τ₀` and `τ₂`. Then
//!
//! ```text
//! FG = F₀·G₂ − F₂·G₀
//! C  = [ G₂/FG, −1, −G₀/FG ]        D = [ −F₂/FG, 0, F₀/FG ]
//! ```
//!
//! ## One iteration
//!
//! 1. Slant ranges `P_i = Σ_j C_j·D[i][j] / (C_i·D0)` and heliocentric positions
//!    `r_i = P_i·L_i − R_i`.
//! 2. Middle velocity `v = D₀·r₀ + D₂·r₂`.
//! 3. `Δp = P − P_prev`.
//! 4. Light-time corrected epochs `t_i = t_i,raw − P_i·c⁻¹` and new intervals
//!    `τ₀ = k(t₀ − t₁)`, `τ₂ = k(t₂ − t₁)`.
//! 5. Exact f and g from `(r₁, v)` over `τ₀` and `τ₂`, averaged with the previous values.
//! 6. New `C` and `D` from the averaged coefficients.
//!
//! The loop stops once `|Δp| < correction_eps`; the state of that same iteration,
//! `(t₁, r₁, v)`, is the answer.
//!
//! ## Remarks
//!
//! * The averaging in step 5 damps the oscillation of the fixed point. The price is a slower
//!   contraction, visible as a geometric decay of `|Δp|`.
//! * [`GaussRefinement::advance`] exposes each iteration for diagnostics; [`GaussRefinement::run`]
//!   drives the loop to completion.
use log::{trace, warn};
use nalgebra::Vector3;

use crate::initial_orbit_determination::gauss::{
    scaled_intervals, GaussGeometry, GaussObs, OcticRoot,
};
use crate::initial_orbit_determination::gauss_result::GaussResult;
use crate::initial_orbit_determination::{IODParams, RootBracket};
use crate::kepler::{solve_universal_fg, LagrangeCoefficients};
use crate::orbit_errors::OrbitError;
use crate::state_vector::StateVector;

/// Snapshot of one refinement iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefinementStep {
    /// One-based iteration number.
    pub iteration: usize,
    /// Slant ranges `P` at the three epochs (AU).
    pub ranges: Vector3<f64>,
    /// Norm of the change of `P` since the previous iteration.
    pub dp_norm: f64,
    /// Light-time corrected middle epoch.
    pub epoch: f64,
    /// Heliocentric position at the middle epoch.
    pub position: Vector3<f64>,
    /// Velocity at the middle epoch, per scaled time unit.
    pub velocity: Vector3<f64>,
    pub converged: bool,
}

/// State of the Gauss refinement loop.
///
/// The session owns its inputs and can be stepped with [`advance`](GaussRefinement::advance)
/// or consumed with [`run`](GaussRefinement::run).
#[derive(Debug, Clone)]
pub struct GaussRefinement {
    triplet: GaussObs,
    params: IODParams,
    geometry: GaussGeometry,
    root: OcticRoot,
    f: [f64; 2],
    g: [f64; 2],
    c: [f64; 3],
    d: [f64; 3],
    p_prev: Vector3<f64>,
    iteration: usize,
    last_dp: f64,
    last: Option<RefinementStep>,
}

impl GaussRefinement {
    /// Build the geometry, solve the distance equation and seed the refinement.
    ///
    /// Arguments
    /// -----------------
    /// * `triplet`: Time-ordered observations.
    /// * `bracket`: Interval and guess for the root of the distance equation.
    /// * `params`: Constants and solver settings.
    ///
    /// Return
    /// ----------
    /// * The seeded session, or the error of [`GaussObs::geometry`] or
    ///   [`GaussGeometry::solve_octic`].
    pub fn new(
        triplet: &GaussObs,
        bracket: &RootBracket,
        params: &IODParams,
    ) -> Result<Self, OrbitError> {
        let geometry = triplet.geometry(params)?;
        let root = geometry.solve_octic(bracket, params)?;
        GaussRefinement::from_root(triplet, geometry, root, params)
    }

    /// Seed the refinement from an already solved root.
    ///
    /// Useful after choosing one of
    /// [`GaussGeometry::candidate_roots`] by hand.
    ///
    /// Return
    /// ----------
    /// * `Err(OrbitError::DegenerateGeometry)` if the root is not positive or the seed
    ///   coefficients are singular.
    pub fn from_root(
        triplet: &GaussObs,
        geometry: GaussGeometry,
        root: OcticRoot,
        params: &IODParams,
    ) -> Result<Self, OrbitError> {
        if !(root.x > 0.0) || !root.x.is_finite() {
            return Err(OrbitError::DegenerateGeometry(format!(
                "heliocentric distance must be positive (got {})",
                root.x
            )));
        }

        let u = params.mu / root.x.powi(3);
        let seed_0 = LagrangeCoefficients::truncated(u, geometry.tau[0]);
        let seed_2 = LagrangeCoefficients::truncated(u, geometry.tau[2]);

        let f = [seed_0.f, seed_2.f];
        let g = [seed_0.g, seed_2.g];
        let (c, d) = gauss_coefficients(f, g)?;

        Ok(GaussRefinement {
            triplet: triplet.clone(),
            params: *params,
            geometry,
            root,
            f,
            g,
            c,
            d,
            p_prev: Vector3::zeros(),
            iteration: 0,
            last_dp: f64::INFINITY,
            last: None,
        })
    }

    /// Perform one refinement iteration.
    ///
    /// Return
    /// ----------
    /// * `Ok(RefinementStep)` describing the iteration. Once a step has converged, later
    ///   calls return that same step without iterating.
    /// * `Err(OrbitError::RefinementNonConvergent)` when `correction_max_it` iterations have
    ///   run without convergence.
    /// * `Err(OrbitError::DegenerateGeometry)` if a coefficient `C_i` vanishes.
    /// * The error of [`solve_universal_fg`] if the propagation fails.
    pub fn advance(&mut self) -> Result<RefinementStep, OrbitError> {
        if let Some(step) = self.last.filter(|step| step.converged) {
            return Ok(step);
        }
        if self.iteration >= self.params.correction_max_it {
            warn!(
                "Gauss refinement stopped after {} iterations (|dp| = {:e})",
                self.iteration, self.last_dp
            );
            return Err(OrbitError::RefinementNonConvergent {
                iterations: self.iteration,
                last_dp: self.last_dp,
            });
        }

        if let Some(i) = self.c.iter().position(|c| *c == 0.0 || !c.is_finite()) {
            return Err(OrbitError::DegenerateGeometry(format!(
                "vanishing Gauss coefficient C{i} = {}",
                self.c[i]
            )));
        }

        let d_matrix = &self.geometry.d_matrix;
        let d0 = self.geometry.d0;
        let ranges = Vector3::from_fn(|i, _| {
            let weighted: f64 = (0..3).map(|j| self.c[j] * d_matrix[(i, j)]).sum();
            weighted / (self.c[i] * d0)
        });

        let los = &self.geometry.line_of_sight;
        let observer = &self.triplet.observer_position;
        let position =
            |i: usize| ranges[i] * los.column(i).into_owned() - observer.column(i).into_owned();
        let (r0, r1, r2) = (position(0), position(1), position(2));
        let velocity = self.d[0] * r0 + self.d[2] * r2;

        let dp_norm = (ranges - self.p_prev).norm();
        let corrected = self.triplet.time - self.params.light_time_per_au * ranges;
        let tau = scaled_intervals(&corrected, self.params.gauss_grav);

        // the session only changes once every fallible step has succeeded
        let (mut f, mut g) = (self.f, self.g);
        for (slot, h) in [tau[0], tau[2]].into_iter().enumerate() {
            let exact = solve_universal_fg(&r1, &velocity, h, self.params.mu, &self.params.kepler)?;
            f[slot] = 0.5 * (f[slot] + exact.f);
            g[slot] = 0.5 * (g[slot] + exact.g);
        }
        let (c, d) = gauss_coefficients(f, g)?;

        self.f = f;
        self.g = g;
        self.c = c;
        self.d = d;
        self.p_prev = ranges;
        self.iteration += 1;
        self.last_dp = dp_norm;
        let step = RefinementStep {
            iteration: self.iteration,
            ranges,
            dp_norm,
            epoch: corrected[1],
            position: r1,
            velocity,
            converged: dp_norm < self.params.correction_eps,
        };
        trace!(
            "Gauss refinement iteration {}: |dp| = {:e}, P = [{:.9}, {:.9}, {:.9}]",
            step.iteration,
            dp_norm,
            ranges[0],
            ranges[1],
            ranges[2]
        );
        self.last = Some(step);
        Ok(step)
    }

    /// Iterate until convergence and package the result.
    ///
    /// Return
    /// ----------
    /// * `Ok(GaussResult)` holding the state `(t₁, r₁, v)` of the converged iteration.
    /// * The first error raised by [`advance`](GaussRefinement::advance).
    pub fn run(mut self) -> Result<GaussResult, OrbitError> {
        loop {
            let step = self.advance()?;
            if step.converged {
                return Ok(GaussResult {
                    state: StateVector::new(step.epoch, step.position, step.velocity),
                    root: self.root.x,
                    slant_range: self.root.slant_range,
                    ranges: step.ranges,
                    iterations: step.iteration,
                    final_dp: step.dp_norm,
                });
            }
        }
    }

    pub fn geometry(&self) -> &GaussGeometry {
        &self.geometry
    }

    pub fn root(&self) -> &OcticRoot {
        &self.root
    }

    /// Number of completed iterations.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Current `C` coefficients.
    pub fn c_coefficients(&self) -> [f64; 3] {
        self.c
    }

    /// Current `D` coefficients.
    pub fn d_coefficients(&self) -> [f64; 3] {
        self.d
    }

    pub fn last_step(&self) -> Option<&RefinementStep> {
        self.last.as_ref()
    }
}

/// `C` and `D` coefficients of the Gauss method from the Lagrange `F` and `G` of the outer
/// observations.
fn gauss_coefficients(f: [f64; 2], g: [f64; 2]) -> Result<([f64; 3], [f64; 3]), OrbitError> {
    let [f0, f2] = f;
    let [g0, g2] = g;
    let fg = f0 * g2 - f2 * g0;
    if fg == 0.0 || !fg.is_finite() {
        return Err(OrbitError::DegenerateGeometry(format!(
            "singular Lagrange determinant F0*G2 - F2*G0 = {fg:e}"
        )));
    }

    Ok(([g2 / fg, -1.0, -g0 / fg], [-f2 / fg, 0.0, f0 / fg]))
}
