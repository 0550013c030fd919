//! # Orbit analysis
//!
//! Tools operating on numerically integrated orbits:
//!
//! * [`phase_space`] – phase-space samples, single orbits and orbit batches, angular momentum,
//! * [`circulation`] – loop/box classification and alignment of the circulation axis with `z`,
//! * [`period`] – peak-to-peak period estimation of a scalar time series.
//!
//! No potential or integrator lives here; orbits are produced by a caller-provided
//! [`phase_space::OrbitIntegrator`] or built directly from sampled arrays.
pub mod circulation;
pub mod period;
pub mod phase_space;
