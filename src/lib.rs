//! Galactic dynamics toolkit.
//!
//! * [`proper_motion`] – rotation of proper motions between the ICRS and Galactic
//!   tangent planes,
//! * [`dynamics`] and [`orbit_analyzer`] – angular momentum, loop/box classification,
//!   circulation alignment and period estimation of integrated orbits.
pub mod constants;
pub mod conversion;
pub mod dynamics;
pub mod galdyn_errors;
pub mod orbit_analyzer;
pub mod proper_motion;
pub mod ref_system;
pub mod units;
