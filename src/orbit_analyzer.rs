//! # Orbit analyzer
//!
//! [`OrbitAnalyzer`] bundles the orbit-analysis operations of [`crate::dynamics`] behind
//! one configuration object, [`AnalysisParams`]:
//!
//! ```rust
//! use galdyn::orbit_analyzer::{AnalysisParams, OrbitAnalyzer};
//! use galdyn::dynamics::circulation::AmbiguityPolicy;
//!
//! let params: AnalysisParams =
//!     serde_json::from_str(r#"{ "circulation": { "ambiguity": "Error" } }"#).unwrap();
//! let analyzer = OrbitAnalyzer::new(params).unwrap();
//! assert_eq!(analyzer.params().circulation.ambiguity, AmbiguityPolicy::Error);
//! ```
use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::dynamics::circulation::{
    align_circulation_with_z, align_circulations_with_z, classify_orbit, classify_orbits,
    Circulation, CirculationParams,
};
use crate::dynamics::period::{peak_to_peak_period, radial_period, PeriodParams};
use crate::dynamics::phase_space::{Orbit, OrbitBatch, Trajectory};
use crate::galdyn_errors::GaldynError;

/// Configuration of every orbit-analysis step.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    pub circulation: CirculationParams,
    pub period: PeriodParams,
}

impl AnalysisParams {
    pub fn validate(&self) -> Result<(), GaldynError> {
        self.circulation.validate()?;
        self.period.validate()
    }
}

impl fmt::Display for AnalysisParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "{:#}\n{:#}", self.circulation, self.period)
        } else {
            write!(f, "AnalysisParams({}, {})", self.circulation, self.period)
        }
    }
}

/// Stateless orbit-analysis front end.
#[derive(Debug, Clone, Default)]
pub struct OrbitAnalyzer {
    params: AnalysisParams,
}

impl OrbitAnalyzer {
    /// Errors
    /// ------
    /// * [`GaldynError::InvalidParameter`] if `params` fails validation, which happens
    ///   with configurations read through serde.
    pub fn new(params: AnalysisParams) -> Result<Self, GaldynError> {
        params.validate()?;
        Ok(OrbitAnalyzer { params })
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    pub fn angular_momentum<T: Trajectory + ?Sized>(&self, orbit: &T) -> Vec<Vector3<f64>> {
        orbit.angular_momentum()
    }

    pub fn classify<T: Trajectory + ?Sized>(&self, orbit: &T) -> Result<Circulation, GaldynError> {
        classify_orbit(orbit, &self.params.circulation)
    }

    pub fn classify_batch(&self, batch: &OrbitBatch) -> Result<Vec<Circulation>, GaldynError> {
        classify_orbits(batch, &self.params.circulation)
    }

    /// Classify an orbit and relabel its axes so the circulation axis becomes `z`.
    pub fn align_with_z<T: Trajectory + ?Sized>(
        &self,
        orbit: &T,
    ) -> Result<(Circulation, Orbit), GaldynError> {
        let circulation = self.classify(orbit)?;
        let aligned = align_circulation_with_z(orbit, &circulation)?;
        Ok((circulation, aligned))
    }

    /// Batched [`OrbitAnalyzer::align_with_z`]; every orbit gets its own relabelling.
    pub fn align_batch_with_z(
        &self,
        batch: &OrbitBatch,
    ) -> Result<(Vec<Circulation>, OrbitBatch), GaldynError> {
        let circulations = self.classify_batch(batch)?;
        let aligned = align_circulations_with_z(batch, &circulations)?;
        Ok((circulations, aligned))
    }

    pub fn period(&self, times: &[f64], signal: &[f64]) -> Result<f64, GaldynError> {
        peak_to_peak_period(times, signal, &self.params.period)
    }

    pub fn radial_period<T: Trajectory + ?Sized>(&self, orbit: &T) -> Result<f64, GaldynError> {
        radial_period(orbit, &self.params.period)
    }
}
