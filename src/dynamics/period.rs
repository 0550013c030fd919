//! # Peak-to-peak period estimation
//!
//! The period of an oscillating time series is estimated from the spacing of its
//! extrema:
//!
//! 1. locate strict interior local maxima and minima (`s[i-1] < s[i] > s[i+1]` and
//!    the reverse),
//! 2. optionally refine each one with the vertex of the parabola through the three
//!    samples around it, which removes most of the sampling bias,
//! 3. take the time intervals between successive extrema **of the same kind**,
//! 4. aggregate them ([`PeriodAggregate`]).
//!
//! Averaging over maxima and minima separately cancels most of the drift caused by a
//! slow secondary modulation of the signal.
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dynamics::phase_space::Trajectory;
use crate::galdyn_errors::GaldynError;

/// How the peak-to-peak intervals are combined into a single period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PeriodAggregate {
    /// Mean interval of each kind of extremum, averaged over the kinds.
    #[default]
    Mean,
    /// Median of all same-kind intervals.
    Median,
}

/// Configuration of [`peak_to_peak_period`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodParams {
    /// Smallest accepted `|mean(maxima) − mean(minima)|`, in signal units.
    pub amplitude_threshold: f64,
    pub aggregate: PeriodAggregate,
    /// Refine extrema with a three-point parabolic fit.
    pub refine_extrema: bool,
    /// Accept a period measured on one kind of extremum when the other kind occurs
    /// fewer than twice.
    pub single_kind_fallback: bool,
}

impl PeriodParams {
    pub fn builder() -> PeriodParamsBuilder {
        PeriodParamsBuilder::new()
    }

    pub(crate) fn validate(&self) -> Result<(), GaldynError> {
        if !(self.amplitude_threshold.is_finite() && self.amplitude_threshold >= 0.0) {
            return Err(GaldynError::InvalidParameter(
                "amplitude_threshold must be finite and >= 0".into(),
            ));
        }
        Ok(())
    }
}

impl Default for PeriodParams {
    fn default() -> Self {
        PeriodParams {
            amplitude_threshold: 1e-2,
            aggregate: PeriodAggregate::Mean,
            refine_extrema: true,
            single_kind_fallback: false,
        }
    }
}

/// Builder for [`PeriodParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct PeriodParamsBuilder {
    params: PeriodParams,
}

impl PeriodParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amplitude_threshold(mut self, v: f64) -> Self {
        self.params.amplitude_threshold = v;
        self
    }

    pub fn aggregate(mut self, v: PeriodAggregate) -> Self {
        self.params.aggregate = v;
        self
    }

    pub fn refine_extrema(mut self, v: bool) -> Self {
        self.params.refine_extrema = v;
        self
    }

    pub fn single_kind_fallback(mut self, v: bool) -> Self {
        self.params.single_kind_fallback = v;
        self
    }

    pub fn build(self) -> Result<PeriodParams, GaldynError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

impl fmt::Display for PeriodParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Period Parameters")?;
            writeln!(f, "-----------------")?;
            writeln!(
                f,
                "  amplitude_threshold  = {:.3e}   # Smallest accepted peak-to-peak amplitude",
                self.amplitude_threshold
            )?;
            writeln!(
                f,
                "  aggregate            = {:?}        # Interval aggregation",
                self.aggregate
            )?;
            writeln!(
                f,
                "  refine_extrema       = {}       # Parabolic refinement of extrema",
                self.refine_extrema
            )?;
            writeln!(
                f,
                "  single_kind_fallback = {}      # Accept maxima-only or minima-only periods",
                self.single_kind_fallback
            )
        } else {
            write!(
                f,
                "PeriodParams(amplitude_threshold={:.3e}, aggregate={:?}, refine_extrema={}, single_kind_fallback={})",
                self.amplitude_threshold, self.aggregate, self.refine_extrema, self.single_kind_fallback
            )
        }
    }
}

/// A local extremum of a sampled signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extremum {
    pub time: f64,
    pub value: f64,
}

/// Local maxima and minima of a signal, in time order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extrema {
    pub maxima: Vec<Extremum>,
    pub minima: Vec<Extremum>,
}

/// Vertex of the parabola through `(t[i-1], a)`, `(t[i], b)`, `(t[i+1], c)`.
///
/// The offset is computed on a unit grid and mapped back with the spacing on the
/// side of the shift.
fn parabolic_vertex(t: &[f64], i: usize, a: f64, b: f64, c: f64) -> Extremum {
    let curvature = a - 2.0 * b + c;
    let offset = 0.5 * (a - c) / curvature;
    let step = if offset >= 0.0 {
        t[i + 1] - t[i]
    } else {
        t[i] - t[i - 1]
    };

    Extremum {
        time: t[i] + offset * step,
        value: b - 0.25 * (a - c) * offset,
    }
}

/// Find the strict interior extrema of `signal`.
///
/// `times` and `signal` must have the same length; the end points are never extrema.
pub fn find_extrema(times: &[f64], signal: &[f64], refine: bool) -> Extrema {
    let mut extrema = Extrema::default();

    for (i, (a, b, c)) in signal.iter().copied().tuple_windows().enumerate() {
        let i = i + 1;
        let is_max = a < b && b > c;
        let is_min = a > b && b < c;
        if !(is_max || is_min) {
            continue;
        }

        let extremum = if refine {
            parabolic_vertex(times, i, a, b, c)
        } else {
            Extremum {
                time: times[i],
                value: b,
            }
        };

        if is_max {
            extrema.maxima.push(extremum);
        } else {
            extrema.minima.push(extremum);
        }
    }

    extrema
}

fn intervals(extrema: &[Extremum]) -> Vec<f64> {
    extrema
        .iter()
        .tuple_windows()
        .map(|(a, b)| b.time - a.time)
        .collect()
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len() as f64;
    values.sum::<f64>() / n
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        0.5 * (values[mid - 1] + values[mid])
    } else {
        values[mid]
    }
}

/// Estimate the dominant period of a time series from its peak-to-peak spacing.
///
/// Arguments
/// ---------
/// * `times`: sample times, strictly increasing.
/// * `signal`: the observable sampled at `times`.
/// * `params`: amplitude threshold, aggregation and refinement settings.
///
/// Returns
/// -------
/// * The period, in the unit of `times`.
///
/// Errors
/// ------
/// * [`GaldynError::ShapeMismatch`] if `times` and `signal` differ in length.
/// * [`GaldynError::InvalidParameter`] if `times` is not strictly increasing.
/// * [`GaldynError::InsufficientData`] if maxima or minima occur fewer than twice. With
///   `params.single_kind_fallback`, only when neither kind occurs at least twice.
/// * [`GaldynError::NegligibleAmplitude`] if the mean maximum and mean minimum are closer
///   than `params.amplitude_threshold`.
pub fn peak_to_peak_period(
    times: &[f64],
    signal: &[f64],
    params: &PeriodParams,
) -> Result<f64, GaldynError> {
    params.validate()?;
    if times.len() != signal.len() {
        return Err(GaldynError::ShapeMismatch(format!(
            "{} times for {} signal samples",
            times.len(),
            signal.len()
        )));
    }
    if times.iter().tuple_windows().any(|(a, b)| b <= a) {
        return Err(GaldynError::InvalidParameter(
            "times must be strictly increasing".into(),
        ));
    }

    let Extrema { maxima, minima } = find_extrema(times, signal, params.refine_extrema);
    debug!(
        n_maxima = maxima.len(),
        n_minima = minima.len(),
        "located extrema"
    );

    if !maxima.is_empty() && !minima.is_empty() {
        let amplitude = (mean(maxima.iter().map(|e| e.value))
            - mean(minima.iter().map(|e| e.value)))
        .abs();
        if amplitude < params.amplitude_threshold {
            return Err(GaldynError::NegligibleAmplitude {
                amplitude,
                threshold: params.amplitude_threshold,
            });
        }
    }

    let per_kind: Vec<Vec<f64>> = [intervals(&maxima), intervals(&minima)]
        .into_iter()
        .filter(|dt| !dt.is_empty())
        .collect();

    let required_kinds = if params.single_kind_fallback { 1 } else { 2 };
    if per_kind.len() < required_kinds {
        return Err(GaldynError::InsufficientData(format!(
            "{} maxima and {} minima, at least two of {} kind are needed",
            maxima.len(),
            minima.len(),
            if params.single_kind_fallback { "one" } else { "each" }
        )));
    }
    if per_kind.len() == 1 {
        warn!("period estimated from a single kind of extremum");
    }

    let period = match params.aggregate {
        PeriodAggregate::Mean => mean(per_kind.iter().map(|dt| mean(dt.iter().copied()))),
        PeriodAggregate::Median => median(per_kind.into_iter().flatten().collect()),
    };

    debug!(period, "peak-to-peak period");
    Ok(period)
}

/// Period of the radial oscillation `|x(t)|` of an orbit.
pub fn radial_period<T: Trajectory + ?Sized>(
    orbit: &T,
    params: &PeriodParams,
) -> Result<f64, GaldynError> {
    peak_to_peak_period(orbit.times(), &orbit.radius(), params)
}
