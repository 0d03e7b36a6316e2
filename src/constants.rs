//! # Constants and type definitions
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **type
//! aliases** shared by the Gauss solver, the universal Kepler propagator and the element
//! conversions.
//!
//! ## Overview
//!
//! - Gaussian gravitational constant and the derived scaled time unit
//! - Speed of light and the light-time per astronomical unit
//! - Mean obliquity of the ecliptic at J2000
//! - Unit conversions (degrees, hours, arcseconds ↔ radians)
//!
//! Times are expressed in days on a continuous date scale. The dynamical routines work with a
//! **scaled time** `τ = k·Δt` so that the heliocentric gravitational parameter is `μ = 1` and
//! velocities come out in AU per scaled time unit (`1/k` days).

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Arcseconds → radians
pub const RADSEC: f64 = std::f64::consts::PI / 648000.0;

/// Hours → radians
pub const RADH: f64 = DPI / 24.0;

/// Gaussian gravitational constant k (used in classical orbit dynamics)
pub const GAUSS_GRAV: f64 = 0.01720209895;

/// Heliocentric gravitational parameter in the Gaussian unit system (AU, scaled days, M☉)
pub const MU_SUN: f64 = 1.0;

/// Speed of light in km/s
pub const VLIGHT: f64 = 2.99792458e5;

/// Speed of light in astronomical units per day
pub const VLIGHT_AU: f64 = VLIGHT / AU * SECONDS_PER_DAY;

/// Light travel time for one astronomical unit, in days (the aberration factor)
pub const LIGHT_TIME_AU: f64 = 1.0 / VLIGHT_AU;

/// Mean obliquity of the ecliptic at J2000 in arcseconds (IAU 1976)
pub const OBLIQUITY_J2000_ARCSEC: ArcSec = 84_381.448;

/// Mean obliquity of the ecliptic at J2000 in radians
pub const OBLIQUITY_J2000: Radian = OBLIQUITY_J2000_ARCSEC * RADSEC;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in arcseconds
pub type ArcSec = f64;
/// Angle in radians
pub type Radian = f64;
/// Angle in hours of right ascension
pub type Hour = f64;
/// Epoch on a continuous date scale (e.g. truncated Julian Date), in days
pub type Days = f64;
