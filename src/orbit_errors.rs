use thiserror::Error;

use crate::orbit_type::OrbitType;

/// Errors raised by the Gauss solver, the universal Kepler propagator and the element
/// conversions.
///
/// The variants fall in three families:
///
/// * **Precondition violations** (degenerate geometry, malformed inputs, invalid parameters),
///   reported immediately and never retried.
/// * **Non-convergence** of one of the iterative solvers, each with its own variant so the
///   caller can decide whether to retry with another guess or bracket.
/// * **Root enumeration** failure of the optional Aberth–Ehrlich polynomial solve.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrbitError {
    #[error("Unit direction matrix is singular (D0 = {0:e}); lines of sight may be coplanar")]
    SingularDirectionMatrix(f64),

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Invalid observation triplet: {0}")]
    InvalidObservations(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid orbital elements: {0}")]
    InvalidElements(String),

    #[error(
        "Universal Kepler equation did not converge after {iterations} iterations (|F| = {residual:e})"
    )]
    UniversalKeplerNonConvergence { iterations: usize, residual: f64 },

    #[error("Gauss distance equation: no root found in bracket (last x = {last}, after {iterations} iterations)")]
    RootNotFound { last: f64, iterations: usize },

    #[error("Gauss refinement did not converge after {iterations} iterations (|Δp| = {last_dp:e})")]
    RefinementNonConvergent { iterations: usize, last_dp: f64 },

    #[error("{orbit_type} anomaly equation did not converge after {iterations} iterations (residual = {residual:e})")]
    AnomalySolveNonConvergent {
        orbit_type: OrbitType,
        iterations: usize,
        residual: f64,
    },

    #[error("Aberth–Ehrlich method failed to find acceptable complex roots")]
    PolynomialRootFindingFailed,
}
