//! # Reference frame rotations
//!
//! Elementary rotation matrices and the few frame changes needed by the orbit
//! determination pipeline:
//!
//! * equatorial ↔ ecliptic rotation by the obliquity `ε`,
//! * perifocal → ecliptic rotation by the orientation angles `(Ω, i, ω)`,
//! * right ascension / declination → line-of-sight unit vector.
//!
//! All matrices are `nalgebra::Matrix3<f64>` acting on column vectors.

use nalgebra::{Matrix3, Rotation3, Vector3};

use crate::constants::Radian;

/// Coordinate axis of an elementary rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Build the elementary rotation matrix of angle `alpha` about a coordinate axis.
///
/// Arguments
/// -----------------
/// * `alpha`: Rotation angle in radians (right-handed, counter-clockwise seen from the
///   positive end of the axis).
/// * `axis`: The coordinate axis to rotate about.
///
/// Return
/// ----------
/// * A `3×3` rotation matrix `R` such that `R * v` is `v` rotated by `alpha`.
///
/// See also
/// ------------
/// * [`equatorial_to_ecliptic`] – Rotation by `-ε` about X.
/// * [`perifocal_to_reference`] – Composition `Rz(Ω)·Rx(i)·Rz(ω)`.
pub fn rotmt(alpha: Radian, axis: Axis) -> Matrix3<f64> {
    let axis = match axis {
        Axis::X => Vector3::x_axis(),
        Axis::Y => Vector3::y_axis(),
        Axis::Z => Vector3::z_axis(),
    };

    Rotation3::from_axis_angle(&axis, alpha).into()
}

/// Rotation taking equatorial coordinates into ecliptic coordinates.
///
/// ```text
/// x' = x
/// y' =  y·cos ε + z·sin ε
/// z' = -y·sin ε + z·cos ε
/// ```
///
/// With `obliquity = 0` this is the identity, which is how body-centred frames are handled.
pub fn equatorial_to_ecliptic(obliquity: Radian) -> Matrix3<f64> {
    rotmt(-obliquity, Axis::X)
}

/// Inverse of [`equatorial_to_ecliptic`].
pub fn ecliptic_to_equatorial(obliquity: Radian) -> Matrix3<f64> {
    rotmt(obliquity, Axis::X)
}

/// Rotation from the perifocal frame (x toward the periapsis, z along the angular momentum)
/// to the reference (ecliptic) frame.
///
/// Arguments
/// -----------------
/// * `inclination`: Inclination `i` in radians.
/// * `ascending_node`: Longitude of the ascending node `Ω` in radians.
/// * `periapsis_arg`: Argument of periapsis `ω` in radians.
///
/// Return
/// ----------
/// * The matrix `Rz(Ω)·Rx(i)·Rz(ω)`. Its first two columns are the classical `P` and `Q`
///   vectors of the orbital plane.
pub fn perifocal_to_reference(
    inclination: Radian,
    ascending_node: Radian,
    periapsis_arg: Radian,
) -> Matrix3<f64> {
    rotmt(ascending_node, Axis::Z) * rotmt(inclination, Axis::X) * rotmt(periapsis_arg, Axis::Z)
}

/// Compute the line-of-sight unit vector from right ascension and declination.
///
/// Arguments
/// -----------------
/// * `ra`: Right ascension in radians.
/// * `dec`: Declination in radians.
///
/// Return
/// ----------
/// * `Vector3<f64>` - The unit direction vector `[x, y, z]`, where:
///   - `x = cos(ra) * cos(dec)`
///   - `y = sin(ra) * cos(dec)`
///   - `z = sin(dec)`
pub fn line_of_sight(ra: Radian, dec: Radian) -> Vector3<f64> {
    let cos_dec = dec.cos();
    Vector3::new(ra.cos() * cos_dec, ra.sin() * cos_dec, dec.sin())
}
