//! # Classical orbital elements
//!
//! This module defines the [`KeplerElements`] sum type and the conversions between a
//! Cartesian [`StateVector`] and the classical elements
//! `(type, t_p, a or q, e, i, Ω, ω)`.
//!
//! Each conic has its own module carrying only the fields relevant to it:
//!
//! - [`elliptical`](crate::orbit_type::elliptical) — semi-major axis `a > 0`, `e < 1`,
//!   Kepler's equation `E − e·sin E = M`.
//! - [`parabolic`](crate::orbit_type::parabolic) — perihelion distance `q`, `e ≈ 1`,
//!   Barker's cubic `q·D + D³/6 = M`.
//! - [`hyperbolic`](crate::orbit_type::hyperbolic) — semi-major axis `a < 0`, `e > 1`,
//!   `e·sinh H − H = M`.
//!
//! All three implement [`PerifocalMotion`], which is how [`KeplerElements`] dispatches both
//! conversion directions.
//!
//! ## Frames
//!
//! State vectors are given in an **equatorial** working frame. Elements are referred to the
//! **ecliptic**, obtained by rotating about the x axis by the obliquity
//! ([`ElementsContext::obliquity`]). A zero obliquity keeps elements in the working frame,
//! which is what body-centred (e.g. geocentric satellite) work needs.
//!
//! ## Typical workflow
//!
//! ```rust, no_run
//! use nalgebra::Vector3;
//! use gauss_orbit::orbit_type::{ElementsContext, KeplerElements};
//! use gauss_orbit::state_vector::StateVector;
//!
//! let ctx = ElementsContext::heliocentric();
//! let state = StateVector::new(
//!     6378.5582,
//!     Vector3::new(0.5180, 2.1556, -0.4608),
//!     Vector3::new(-0.7188, 0.0681, 0.0351),
//! );
//!
//! let elements = KeplerElements::from_state(&state, &ctx).unwrap();
//! let later = elements.to_state(6478.5582, &ctx).unwrap();
//! println!("{elements}\n{later}");
//! ```
use std::fmt;

use nalgebra::{Matrix3, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::constants::{Radian, DPI, GAUSS_GRAV, MU_SUN, OBLIQUITY_J2000, RADEG};
use crate::kepler::principal_angle;
use crate::orbit_errors::OrbitError;
use crate::ref_system::{ecliptic_to_equatorial, equatorial_to_ecliptic, perifocal_to_reference};
use crate::state_vector::StateVector;

use self::{
    elliptical::EllipticalElements, hyperbolic::HyperbolicElements, parabolic::ParabolicElements,
};

/// Elliptical orbits (`e < 1`).
pub mod elliptical;

/// Hyperbolic orbits (`e > 1`).
pub mod hyperbolic;

/// Parabolic orbits (`e ≈ 1`).
pub mod parabolic;

/// Relative threshold below which the node vector or the eccentricity is considered null.
const DEGENERACY_EPS: f64 = 1e-12;

/// A cosine of the argument of periapsis above `1 − PERIAPSIS_SNAP` snaps the argument to zero.
const PERIAPSIS_SNAP: f64 = 1e-6;

/// Conic family of an orbit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrbitType {
    Elliptical,
    Parabolic,
    Hyperbolic,
}

impl OrbitType {
    /// Classify an orbit from its eccentricity.
    ///
    /// Arguments
    /// -----------------
    /// * `eccentricity`: Orbital eccentricity `e ≥ 0`.
    /// * `tolerance`: Half-width of the parabolic band around `e = 1`.
    ///
    /// Return
    /// ----------
    /// * [`OrbitType::Parabolic`] if `|1 − e| ≤ tolerance`,
    /// * [`OrbitType::Elliptical`] if `e < 1 − tolerance`,
    /// * [`OrbitType::Hyperbolic`] otherwise.
    pub fn classify(eccentricity: f64, tolerance: f64) -> Self {
        if (1.0 - eccentricity).abs() <= tolerance {
            OrbitType::Parabolic
        } else if eccentricity < 1.0 {
            OrbitType::Elliptical
        } else {
            OrbitType::Hyperbolic
        }
    }
}

impl fmt::Display for OrbitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrbitType::Elliptical => "elliptical",
            OrbitType::Parabolic => "parabolic",
            OrbitType::Hyperbolic => "hyperbolic",
        };
        f.write_str(name)
    }
}

/// Orientation of the orbital plane and of the apsidal line in the ecliptic frame.
///
/// Fields
/// -----------------
/// * `inclination`: Inclination `i ∈ [0, π]` (radians).
/// * `ascending_node`: Longitude of the ascending node `Ω ∈ [0, 2π)` (radians).
/// * `periapsis_arg`: Argument of periapsis `ω ∈ [0, 2π)` (radians).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub inclination: Radian,
    pub ascending_node: Radian,
    pub periapsis_arg: Radian,
}

impl Orientation {
    pub fn new(inclination: Radian, ascending_node: Radian, periapsis_arg: Radian) -> Self {
        Orientation {
            inclination,
            ascending_node,
            periapsis_arg,
        }
    }

    /// Derive the orientation from the angular momentum and eccentricity vectors.
    ///
    /// Arguments
    /// -----------------
    /// * `angular_momentum`: `h = r × v` in the ecliptic frame (must be non-zero).
    /// * `eccentricity_vector`: Vector pointing to the periapsis with norm `e`.
    ///
    /// Return
    /// ----------
    /// * The [`Orientation`] `(i, Ω, ω)`.
    ///
    /// Notes
    /// ----------
    /// * `Ω` is resolved by the sign of the node vector `N = (−h_y, h_x, 0)`, `ω` by the sign
    ///   of `e_z`.
    /// * Cosines drifting outside `[−1, 1]` are clamped.
    /// * A cosine of `ω` above `1 − 1e-6` sets `ω = 0`.
    /// * Equatorial orbits (null node vector) get `Ω = 0` and `ω` measured from the x axis.
    /// * Circular orbits get `ω = 0`: the periapsis is then the ascending node.
    pub fn from_vectors(
        angular_momentum: &Vector3<f64>,
        eccentricity_vector: &Vector3<f64>,
    ) -> Self {
        let h_norm = angular_momentum.norm();
        let ecc = eccentricity_vector.norm();
        let circular = ecc <= DEGENERACY_EPS;

        let inclination = (angular_momentum.z / h_norm).clamp(-1.0, 1.0).acos();

        let node_vector = Vector3::new(-angular_momentum.y, angular_momentum.x, 0.0);
        let node_norm = node_vector.norm();

        if node_norm <= DEGENERACY_EPS * h_norm {
            let periapsis_arg = if circular {
                0.0
            } else {
                let sign = angular_momentum.z.signum();
                principal_angle((sign * eccentricity_vector.y).atan2(eccentricity_vector.x))
            };
            return Orientation::new(inclination, 0.0, periapsis_arg);
        }

        let mut ascending_node = (node_vector.x / node_norm).clamp(-1.0, 1.0).acos();
        if node_vector.y < 0.0 {
            ascending_node = DPI - ascending_node;
        }

        let periapsis_arg = if circular {
            0.0
        } else {
            let cos_w = (node_vector.dot(eccentricity_vector) / node_norm / ecc).clamp(-1.0, 1.0);
            if cos_w > 1.0 - PERIAPSIS_SNAP {
                0.0
            } else if eccentricity_vector.z < 0.0 {
                DPI - cos_w.acos()
            } else {
                cos_w.acos()
            }
        };

        Orientation::new(inclination, ascending_node, periapsis_arg)
    }

    /// Rotation from the perifocal frame to the ecliptic frame, `Rz(Ω)·Rx(i)·Rz(ω)`.
    pub fn perifocal_matrix(&self) -> Matrix3<f64> {
        perifocal_to_reference(self.inclination, self.ascending_node, self.periapsis_arg)
    }
}

/// Frame, gravitational constants and solver settings shared by both conversion directions.
///
/// Fields
/// -----------------
/// * `obliquity`: Angle between the working (equatorial) frame and the element frame.
/// * `mu`: Gravitational parameter in the scaled unit system.
/// * `gauss_grav`: Gaussian constant `k` relating days to scaled time.
/// * `ecc_tolerance`: Parabolic band half-width used by [`OrbitType::classify`].
/// * `parabolic_eps`: Residual tolerance of Barker's cubic.
/// * `anomaly_eps`: Residual tolerance of the elliptical and hyperbolic Kepler equations.
/// * `anomaly_max_it`: Iteration cap of every anomaly solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementsContext {
    pub obliquity: Radian,
    pub mu: f64,
    pub gauss_grav: f64,
    pub ecc_tolerance: f64,
    pub parabolic_eps: f64,
    pub anomaly_eps: f64,
    pub anomaly_max_it: usize,
}

impl Default for ElementsContext {
    fn default() -> Self {
        ElementsContext::heliocentric()
    }
}

impl ElementsContext {
    /// Heliocentric setting: J2000 obliquity, `μ = 1`, Gaussian constant `k`.
    pub fn heliocentric() -> Self {
        ElementsContext {
            obliquity: OBLIQUITY_J2000,
            mu: MU_SUN,
            gauss_grav: GAUSS_GRAV,
            ecc_tolerance: 1e-5,
            parabolic_eps: 1e-7,
            anomaly_eps: 1e-6,
            anomaly_max_it: 100,
        }
    }

    /// Body-centred setting: elements stay in the working frame (zero obliquity).
    pub fn body_centered(mu: f64, gauss_grav: f64) -> Self {
        ElementsContext {
            obliquity: 0.0,
            mu,
            gauss_grav,
            ..ElementsContext::heliocentric()
        }
    }

    pub fn with_obliquity(mut self, obliquity: Radian) -> Self {
        self.obliquity = obliquity;
        self
    }
    pub fn with_ecc_tolerance(mut self, tolerance: f64) -> Self {
        self.ecc_tolerance = tolerance;
        self
    }
    pub fn with_parabolic_eps(mut self, eps: f64) -> Self {
        self.parabolic_eps = eps;
        self
    }
    pub fn with_anomaly_eps(mut self, eps: f64) -> Self {
        self.anomaly_eps = eps;
        self
    }
    pub fn with_anomaly_max_it(mut self, max_it: usize) -> Self {
        self.anomaly_max_it = max_it;
        self
    }

    /// Check that every constant is finite and every tolerance usable.
    pub fn validate(&self) -> Result<(), OrbitError> {
        if !(self.mu > 0.0) || !(self.gauss_grav > 0.0) {
            return Err(OrbitError::InvalidParameter(
                "mu and gauss_grav must be > 0".into(),
            ));
        }
        if !self.obliquity.is_finite() {
            return Err(OrbitError::InvalidParameter(
                "obliquity must be finite".into(),
            ));
        }
        if !(self.ecc_tolerance >= 0.0) {
            return Err(OrbitError::InvalidParameter(
                "ecc_tolerance must be >= 0".into(),
            ));
        }
        if !(self.parabolic_eps > 0.0) || !(self.anomaly_eps > 0.0) {
            return Err(OrbitError::InvalidParameter(
                "anomaly tolerances must be > 0".into(),
            ));
        }
        if self.anomaly_max_it == 0 {
            return Err(OrbitError::InvalidParameter(
                "anomaly_max_it must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

/// Quantities shared by every conic when converting a state into elements.
///
/// All vectors are expressed in the ecliptic frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalPlane {
    /// Epoch of the state.
    pub epoch: f64,
    /// Distance `|r|`.
    pub radius: f64,
    /// Radial product `r·v`.
    pub radial_velocity: f64,
    /// Inverse semi-major axis `2/r − v²/μ`.
    pub inv_semi_major_axis: f64,
    /// Eccentricity `|e⃗|`.
    pub eccentricity: f64,
    /// Semi-latus rectum `|h|²/μ`.
    pub semi_latus_rectum: f64,
    /// Position in the perifocal frame `(x toward periapsis, y)`.
    pub perifocal_position: Vector2<f64>,
    pub orientation: Orientation,
}

impl OrbitalPlane {
    /// Reduce an equatorial state to its orbital-plane description.
    ///
    /// Arguments
    /// -----------------
    /// * `state`: Epoch, position and velocity in the working frame.
    /// * `ctx`: Obliquity and gravitational parameter.
    ///
    /// Return
    /// ----------
    /// * `Ok(OrbitalPlane)`.
    /// * `Err(OrbitError::DegenerateGeometry)` for a null position or a rectilinear
    ///   (zero angular momentum) trajectory.
    pub fn from_state(state: &StateVector, ctx: &ElementsContext) -> Result<Self, OrbitError> {
        let to_ecliptic = equatorial_to_ecliptic(ctx.obliquity);
        let r = to_ecliptic * state.position;
        let v = to_ecliptic * state.velocity;

        let radius = r.norm();
        if !(radius > 0.0) || !radius.is_finite() {
            return Err(OrbitError::DegenerateGeometry(
                "state vector has a null or non-finite position".into(),
            ));
        }

        let angular_momentum = r.cross(&v);
        let h2 = angular_momentum.norm_squared();
        if !(h2.sqrt() > DEGENERACY_EPS * radius * v.norm()) {
            return Err(OrbitError::DegenerateGeometry(
                "rectilinear trajectory: angular momentum is null".into(),
            ));
        }

        let v2 = v.norm_squared();
        let rv = r.dot(&v);
        let eccentricity_vector = (v2 / ctx.mu - 1.0 / radius) * r - (rv / ctx.mu) * v;
        let orientation = Orientation::from_vectors(&angular_momentum, &eccentricity_vector);

        let in_plane = orientation.perifocal_matrix().transpose() * r;

        Ok(OrbitalPlane {
            epoch: state.epoch,
            radius,
            radial_velocity: rv,
            inv_semi_major_axis: 2.0 / radius - v2 / ctx.mu,
            eccentricity: eccentricity_vector.norm(),
            semi_latus_rectum: h2 / ctx.mu,
            perifocal_position: Vector2::new(in_plane.x, in_plane.y),
            orientation,
        })
    }
}

/// Position and velocity in the perifocal frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerifocalState {
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
}

/// Common interface of the three conic element sets.
///
/// Each implementation owns its time mapping: the closed-form anomaly of a state in the
/// forward direction, and the Newton–Raphson anomaly solve in the inverse direction.
pub trait PerifocalMotion: Sized {
    /// Build the element set from an orbital-plane reduction of a state.
    fn from_plane(plane: &OrbitalPlane, ctx: &ElementsContext) -> Result<Self, OrbitError>;

    /// Position and velocity in the perifocal frame at `time`.
    fn perifocal_state(
        &self,
        time: f64,
        ctx: &ElementsContext,
    ) -> Result<PerifocalState, OrbitError>;

    fn orbit_type(&self) -> OrbitType;
    fn perihelion_time(&self) -> f64;
    fn eccentricity(&self) -> f64;
    fn orientation(&self) -> &Orientation;
    fn perihelion_distance(&self) -> f64;
}

/// Classical orbital elements, tagged by conic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum KeplerElements {
    Elliptical(EllipticalElements),
    Parabolic(ParabolicElements),
    Hyperbolic(HyperbolicElements),
}

impl KeplerElements {
    /// Convert a state vector into classical elements.
    ///
    /// The state is rotated into the ecliptic by `ctx.obliquity`, reduced to an
    /// [`OrbitalPlane`], classified with `ctx.ecc_tolerance` and handed to the matching conic.
    ///
    /// Arguments
    /// -----------------
    /// * `state`: Epoch, position (AU) and velocity (AU per scaled time unit), equatorial.
    /// * `ctx`: Frame, constants and tolerances.
    ///
    /// Return
    /// ----------
    /// * `Ok(KeplerElements)` of the variant selected by the eccentricity.
    /// * `Err(OrbitError::DegenerateGeometry)` for a null position or angular momentum.
    /// * `Err(OrbitError::InvalidParameter)` if `ctx` does not validate.
    ///
    /// See also
    /// ------------
    /// * [`KeplerElements::to_state`] – Inverse conversion.
    pub fn from_state(state: &StateVector, ctx: &ElementsContext) -> Result<Self, OrbitError> {
        ctx.validate()?;
        let plane = OrbitalPlane::from_state(state, ctx)?;

        Ok(
            match OrbitType::classify(plane.eccentricity, ctx.ecc_tolerance) {
                OrbitType::Elliptical => {
                    KeplerElements::Elliptical(EllipticalElements::from_plane(&plane, ctx)?)
                }
                OrbitType::Parabolic => {
                    KeplerElements::Parabolic(ParabolicElements::from_plane(&plane, ctx)?)
                }
                OrbitType::Hyperbolic => {
                    KeplerElements::Hyperbolic(HyperbolicElements::from_plane(&plane, ctx)?)
                }
            },
        )
    }

    /// Compute the state vector at `time`.
    ///
    /// Arguments
    /// -----------------
    /// * `time`: Target epoch in days.
    /// * `ctx`: Frame, constants and tolerances (must match the ones used to build the elements).
    ///
    /// Return
    /// ----------
    /// * `Ok(StateVector)` in the equatorial working frame.
    /// * `Err(OrbitError::AnomalySolveNonConvergent)` if the anomaly equation does not converge.
    /// * `Err(OrbitError::InvalidElements)` if the fields contradict the variant.
    pub fn to_state(&self, time: f64, ctx: &ElementsContext) -> Result<StateVector, OrbitError> {
        ctx.validate()?;
        let plane_state = match self {
            KeplerElements::Elliptical(el) => el.perifocal_state(time, ctx)?,
            KeplerElements::Parabolic(el) => el.perifocal_state(time, ctx)?,
            KeplerElements::Hyperbolic(el) => el.perifocal_state(time, ctx)?,
        };

        let to_working =
            ecliptic_to_equatorial(ctx.obliquity) * self.orientation().perifocal_matrix();
        let position = to_working * plane_state.position.push(0.0);
        let velocity = to_working * plane_state.velocity.push(0.0);

        Ok(StateVector::new(time, position, velocity))
    }

    pub fn orbit_type(&self) -> OrbitType {
        match self {
            KeplerElements::Elliptical(el) => el.orbit_type(),
            KeplerElements::Parabolic(el) => el.orbit_type(),
            KeplerElements::Hyperbolic(el) => el.orbit_type(),
        }
    }

    pub fn perihelion_time(&self) -> f64 {
        match self {
            KeplerElements::Elliptical(el) => el.perihelion_time(),
            KeplerElements::Parabolic(el) => el.perihelion_time(),
            KeplerElements::Hyperbolic(el) => el.perihelion_time(),
        }
    }

    pub fn eccentricity(&self) -> f64 {
        match self {
            KeplerElements::Elliptical(el) => el.eccentricity(),
            KeplerElements::Parabolic(el) => el.eccentricity(),
            KeplerElements::Hyperbolic(el) => el.eccentricity(),
        }
    }

    pub fn orientation(&self) -> &Orientation {
        match self {
            KeplerElements::Elliptical(el) => el.orientation(),
            KeplerElements::Parabolic(el) => el.orientation(),
            KeplerElements::Hyperbolic(el) => el.orientation(),
        }
    }

    pub fn perihelion_distance(&self) -> f64 {
        match self {
            KeplerElements::Elliptical(el) => el.perihelion_distance(),
            KeplerElements::Parabolic(el) => el.perihelion_distance(),
            KeplerElements::Hyperbolic(el) => el.perihelion_distance(),
        }
    }

    /// Size parameter of the conic: the semi-major axis `a` (negative for hyperbolas) or the
    /// perihelion distance `q` for parabolas.
    pub fn size(&self) -> f64 {
        match self {
            KeplerElements::Elliptical(el) => el.semi_major_axis,
            KeplerElements::Parabolic(el) => el.perihelion_distance,
            KeplerElements::Hyperbolic(el) => el.semi_major_axis,
        }
    }
}

impl fmt::Display for KeplerElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let orientation = self.orientation();
        let (size_label, size_name) = match self {
            KeplerElements::Parabolic(_) => ("q", "(perihelion distance)"),
            _ => ("a", "(semi-major axis)      "),
        };

        writeln!(f, "Classical Elements ({} orbit)", self.orbit_type())?;
        writeln!(f, "-------------------------------------------")?;
        writeln!(
            f,
            "  tp  (perihelion passage)    = {:.6}",
            self.perihelion_time()
        )?;
        writeln!(
            f,
            "  {size_label}   {size_name} = {:.6} AU",
            self.size()
        )?;
        writeln!(
            f,
            "  e   (eccentricity)          = {:.6}",
            self.eccentricity()
        )?;
        writeln!(
            f,
            "  i   (inclination)           = {:.6} rad ({:.6}°)",
            orientation.inclination,
            orientation.inclination / RADEG
        )?;
        writeln!(
            f,
            "  Ω   (longitude of node)     = {:.6} rad ({:.6}°)",
            orientation.ascending_node,
            orientation.ascending_node / RADEG
        )?;
        write!(
            f,
            "  ω   (argument of periapsis) = {:.6} rad ({:.6}°)",
            orientation.periapsis_arg,
            orientation.periapsis_arg / RADEG
        )
    }
}

#[cfg(test)]
mod orbit_type_test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_classify_boundaries() {
        let tol = 1e-5;
        assert_eq!(OrbitType::classify(1.0, tol), OrbitType::Parabolic);
        assert_eq!(OrbitType::classify(1.0 - 0.5 * tol, tol), OrbitType::Parabolic);
        assert_eq!(OrbitType::classify(1.0 + 0.5 * tol, tol), OrbitType::Parabolic);
        assert_eq!(OrbitType::classify(1.0 - 2.0 * tol, tol), OrbitType::Elliptical);
        assert_eq!(OrbitType::classify(1.0 + 2.0 * tol, tol), OrbitType::Hyperbolic);
        assert_eq!(OrbitType::classify(0.0, tol), OrbitType::Elliptical);
    }

    #[test]
    fn test_orientation_general() {
        // h along a tilted axis, eccentricity vector in the plane above the ecliptic
        let (i, node, w): (f64, f64, f64) = (0.7, 2.2, 1.3);
        let m = perifocal_to_reference(i, node, w);
        let h = m.column(2).into_owned() * 1.7;
        let e = m.column(0).into_owned() * 0.3;

        let orientation = Orientation::from_vectors(&h, &e);
        assert_relative_eq!(orientation.inclination, i, epsilon = 1e-12);
        assert_relative_eq!(orientation.ascending_node, node, epsilon = 1e-12);
        assert_relative_eq!(orientation.periapsis_arg, w, epsilon = 1e-12);
    }

    #[test]
    fn test_orientation_quadrants() {
        let (i, node, w): (f64, f64, f64) = (2.5, 4.0, 5.0);
        let m = perifocal_to_reference(i, node, w);
        let orientation =
            Orientation::from_vectors(&m.column(2).into_owned(), &(m.column(0) * 0.5));

        assert_relative_eq!(orientation.inclination, i, epsilon = 1e-12);
        assert_relative_eq!(orientation.ascending_node, node, epsilon = 1e-12);
        assert_relative_eq!(orientation.periapsis_arg, w, epsilon = 1e-12);
    }

    #[test]
    fn test_orientation_snaps_small_periapsis_arg() {
        let m = perifocal_to_reference(0.5, 1.0, 1e-4);
        let orientation =
            Orientation::from_vectors(&m.column(2).into_owned(), &(m.column(0) * 0.2));
        assert_eq!(orientation.periapsis_arg, 0.0);
    }

    #[test]
    fn test_orientation_equatorial_and_circular() {
        let h = Vector3::new(0.0, 0.0, 1.0);
        let e = Vector3::new(0.0, 0.1, 0.0);
        let prograde = Orientation::from_vectors(&h, &e);
        assert_eq!(prograde.inclination, 0.0);
        assert_eq!(prograde.ascending_node, 0.0);
        assert_relative_eq!(prograde.periapsis_arg, std::f64::consts::FRAC_PI_2, epsilon = 1e-15);

        let circular = Orientation::from_vectors(&Vector3::new(0.0, -0.4, 0.9), &Vector3::zeros());
        assert_eq!(circular.periapsis_arg, 0.0);
        assert!(circular.periapsis_arg.is_finite() && circular.ascending_node.is_finite());
    }

    #[test]
    fn test_rectilinear_state_is_rejected() {
        let state = StateVector::new(0.0, Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.3, 0.0, 0.0));
        let res = KeplerElements::from_state(&state, &ElementsContext::heliocentric());
        assert!(matches!(res, Err(OrbitError::DegenerateGeometry(_))));

        let zero = StateVector::new(0.0, Vector3::zeros(), Vector3::new(0.3, 0.0, 0.0));
        let res = KeplerElements::from_state(&zero, &ElementsContext::heliocentric());
        assert!(matches!(res, Err(OrbitError::DegenerateGeometry(_))));
    }

    #[test]
    fn test_circular_orbit_round_trip() {
        let ctx = ElementsContext::body_centered(1.0, GAUSS_GRAV);
        let state = StateVector::new(
            100.0,
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.6, 0.8),
        );
        let elements = KeplerElements::from_state(&state, &ctx).unwrap();
        assert_eq!(elements.orbit_type(), OrbitType::Elliptical);
        assert!(elements.eccentricity() < 1e-12);

        let back = elements.to_state(100.0, &ctx).unwrap();
        assert_relative_eq!(back.position, state.position, epsilon = 1e-10);
        assert_relative_eq!(back.velocity, state.velocity, epsilon = 1e-10);
    }

    #[test]
    fn test_context_validation() {
        assert!(ElementsContext::heliocentric().validate().is_ok());
        assert!(ElementsContext::heliocentric()
            .with_anomaly_max_it(0)
            .validate()
            .is_err());
        assert!(ElementsContext::heliocentric()
            .with_ecc_tolerance(f64::NAN)
            .validate()
            .is_err());
    }

    #[test]
    fn test_display_lists_type_and_degrees() {
        let elements = KeplerElements::Elliptical(EllipticalElements {
            perihelion_time: 6519.5,
            semi_major_axis: 2.77,
            eccentricity: 0.23,
            orientation: Orientation::new(0.6, 3.0, 5.4),
        });
        let text = format!("{elements}");
        assert!(text.contains("elliptical"));
        assert!(text.contains("2.770000 AU"));
        assert!(text.contains("34.377468°"));
    }
}
