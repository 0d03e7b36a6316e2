//! # gauss_orbit
//!
//! Preliminary orbit determination from three angles-only observations with the
//! **Gauss method**, a **universal-variable f and g propagator**, and the conversions
//! between Cartesian state vectors and **classical orbital elements**.
//!
//! ## Pipeline
//!
//! 1. Three [`Observation`](crate::observations::Observation)s are packed into a
//!    [`GaussObs`](crate::initial_orbit_determination::gauss::GaussObs) triplet.
//! 2. The Gauss geometry is built and its 8th-degree distance equation is solved by
//!    Newton–Raphson inside a caller-supplied [`RootBracket`](crate::initial_orbit_determination::RootBracket).
//! 3. A [`GaussRefinement`](crate::initial_orbit_determination::refinement::GaussRefinement)
//!    session iterates ranges, light-time corrected epochs and Lagrange coefficients until the
//!    slant ranges stabilize.
//! 4. The converged [`StateVector`](crate::state_vector::StateVector) is turned into
//!    [`KeplerElements`](crate::orbit_type::KeplerElements), which can in turn be propagated to
//!    any epoch.
//!
//! ## Example
//!
//! ```rust,no_run
//! use gauss_orbit::initial_orbit_determination::{determine_orbit, IODParams, RootBracket};
//! use gauss_orbit::initial_orbit_determination::gauss::GaussObs;
//! use gauss_orbit::orbit_type::ElementsContext;
//!
//! let triplet = GaussObs::from_hours_degrees(
//!     [6370.57744, 6378.56789, 6390.65113],
//!     [6.38029, 6.40793, 6.38762],
//!     [-24.25104, -26.48060, -29.48400],
//!     [
//!         [-0.7735829, -0.5704494, -0.2473703],
//!         [-0.6780640, -0.6624821, -0.2872733],
//!         [-0.5091536, -0.7766740, -0.3367798],
//!     ],
//! )
//! .unwrap();
//!
//! let bracket = RootBracket::new(2.0, 3.0, 2.3).unwrap();
//! let result = determine_orbit(&triplet, &bracket, &IODParams::default()).unwrap();
//! let elements = result.state.to_elements(&ElementsContext::heliocentric()).unwrap();
//! println!("{elements}");
//! ```
pub mod constants;
pub mod initial_orbit_determination;
pub mod kepler;
pub mod observations;
pub mod orbit_errors;
pub mod orbit_type;
pub mod ref_system;
pub mod state_vector;
