//! # Constants and type definitions for galdyn
//!
//! This module centralizes the **angular conversion factors**, the **J2000 Galactic
//! pole constants**, the **numerical tolerances** and the **type aliases** shared by
//! the proper-motion and orbit-analysis modules.
//!
//! ## Overview
//!
//! - Angle conversions (degrees ↔ radians); unit conversions of physical
//!   quantities live in [`crate::units`]
//! - Orientation of the Galactic frame with respect to ICRS
//! - Tolerances used by the classification and rotation code

// -------------------------------------------------------------------------------------------------
// Angle conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

// -------------------------------------------------------------------------------------------------
// Galactic frame orientation (J2000)
// -------------------------------------------------------------------------------------------------

/// Right ascension of the North Galactic Pole, J2000, in degrees
pub const NGP_RA_J2000: Degree = 192.85948;

/// Declination of the North Galactic Pole, J2000, in degrees
pub const NGP_DEC_J2000: Degree = 27.12825;

/// Galactic longitude of the North Celestial Pole, J2000, in degrees
pub const NCP_L_J2000: Degree = 122.93192;

// -------------------------------------------------------------------------------------------------
// Numerical tolerances
// -------------------------------------------------------------------------------------------------

/// Below this value of cos(b) the proper-motion rotation is undefined (Galactic pole)
pub const POLE_EPS: f64 = 1e-12;

/// Angular-momentum components smaller than this are treated as a sign flip
pub const CIRCULATION_ZERO_TOL: f64 = 1e-13;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
