//! # Orbit circulation
//!
//! An orbit *circulates* about a Cartesian axis when the angular-momentum component
//! along that axis keeps one sign for the whole integration. Orbits in triaxial
//! potentials fall in two broad families:
//!
//! * **loop** orbits circulate about exactly one axis,
//! * **box** orbits circulate about none (every component of `L` changes sign).
//!
//! [`classify_orbit`] returns one 0/1 flag per axis in a [`Circulation`], and
//! [`align_circulation_with_z`] relabels the Cartesian axes of an orbit so that
//! its circulation axis becomes `z`.
//!
//! ## Sign persistence
//!
//! For axis `k`, with `L₀ₖ` the first sample, a later sample `t` *agrees* when
//! `sign(Lₜₖ) = sign(L₀ₖ)` and `|Lₜₖ| ≥ zero_tolerance`. The axis circulates when the
//! number of agreeing samples is at least `⌈persistence_fraction · (T − 1)⌉`.
//! A first sample below the tolerance never circulates.
//!
//! ## Several circulating axes
//!
//! Bound orbits are not expected to circulate about two axes at once (a circular
//! orbit in an inclined plane does). [`AmbiguityPolicy`] selects between reporting
//! a box orbit with a warning, or failing with
//! [`GaldynError::AmbiguousClassification`].
use std::fmt;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::CIRCULATION_ZERO_TOL;
use crate::dynamics::phase_space::{Orbit, OrbitBatch, Trajectory};
use crate::galdyn_errors::GaldynError;

/// Cartesian axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn from_index(i: usize) -> Option<Axis> {
        Self::ALL.get(i).copied()
    }

    /// Cyclic relabelling of the axes that sends `self` to `z`.
    ///
    /// Component `j` of the relabelled vector is component `perm[j]` of the original.
    /// Cyclic permutations are proper rotations, so `L` keeps its handedness.
    fn cycle_to_z(self) -> [usize; 3] {
        match self {
            Axis::X => [1, 2, 0],
            Axis::Y => [2, 0, 1],
            Axis::Z => [0, 1, 2],
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// Per-axis circulation flags of one orbit: `1` for a circulating axis, `0` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Circulation {
    flags: [u8; 3],
}

impl Circulation {
    /// No circulation about any axis.
    pub const BOX: Circulation = Circulation { flags: [0, 0, 0] };

    /// Loop orbit about `axis`.
    pub fn loop_about(axis: Axis) -> Self {
        let mut flags = [0; 3];
        flags[axis.index()] = 1;
        Circulation { flags }
    }

    /// Errors
    /// ------
    /// * [`GaldynError::InvalidParameter`] if a flag is neither `0` nor `1`.
    pub fn from_flags(flags: [u8; 3]) -> Result<Self, GaldynError> {
        if flags.iter().any(|&f| f > 1) {
            return Err(GaldynError::InvalidParameter(format!(
                "circulation flags must be 0 or 1, got {flags:?}"
            )));
        }
        Ok(Circulation { flags })
    }

    pub fn flags(&self) -> [u8; 3] {
        self.flags
    }

    /// Number of circulating axes.
    pub fn sum(&self) -> u8 {
        self.flags.iter().sum()
    }

    pub fn is_box(&self) -> bool {
        self.sum() == 0
    }

    /// The circulation axis of a loop orbit, `None` for a box orbit or several flags.
    pub fn loop_axis(&self) -> Option<Axis> {
        match self.circulating_axes().as_slice() {
            [axis] => Some(*axis),
            _ => None,
        }
    }

    pub fn circulating_axes(&self) -> Vec<Axis> {
        Axis::ALL
            .into_iter()
            .filter(|axis| self.flags[axis.index()] == 1)
            .collect()
    }
}

impl fmt::Display for Circulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.is_box(), self.loop_axis()) {
            (true, _) => write!(f, "box"),
            (false, Some(axis)) => write!(f, "loop({axis})"),
            (false, None) => write!(f, "{:?}", self.flags),
        }
    }
}

/// What [`classify_orbit`] reports when several axes circulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AmbiguityPolicy {
    /// Log a warning and report a box orbit.
    #[default]
    Box,
    /// Fail with [`GaldynError::AmbiguousClassification`].
    Error,
}

/// Configuration of the sign-persistence test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CirculationParams {
    /// `|L|` below this value is treated as a sign flip.
    pub zero_tolerance: f64,

    /// Fraction of the `T − 1` later samples that must agree in sign with the first.
    pub persistence_fraction: f64,

    /// Minimum number of samples needed to classify an orbit.
    pub min_samples: usize,

    pub ambiguity: AmbiguityPolicy,
}

impl CirculationParams {
    pub fn builder() -> CirculationParamsBuilder {
        CirculationParamsBuilder::new()
    }

    fn required_agreements(&self, n_times: usize) -> usize {
        (self.persistence_fraction * (n_times - 1) as f64).ceil() as usize
    }
}

impl Default for CirculationParams {
    fn default() -> Self {
        CirculationParams {
            zero_tolerance: CIRCULATION_ZERO_TOL,
            persistence_fraction: 1.0,
            min_samples: 2,
            ambiguity: AmbiguityPolicy::Box,
        }
    }
}

/// Builder for [`CirculationParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct CirculationParamsBuilder {
    params: CirculationParams,
}

impl CirculationParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zero_tolerance(mut self, v: f64) -> Self {
        self.params.zero_tolerance = v;
        self
    }

    pub fn persistence_fraction(mut self, v: f64) -> Self {
        self.params.persistence_fraction = v;
        self
    }

    pub fn min_samples(mut self, v: usize) -> Self {
        self.params.min_samples = v;
        self
    }

    pub fn ambiguity(mut self, v: AmbiguityPolicy) -> Self {
        self.params.ambiguity = v;
        self
    }

    /// Errors
    /// ------
    /// * [`GaldynError::InvalidParameter`] if `zero_tolerance` is negative or not finite,
    ///   `persistence_fraction` is outside `(0, 1]`, or `min_samples < 2`.
    pub fn build(self) -> Result<CirculationParams, GaldynError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

impl CirculationParams {
    pub(crate) fn validate(&self) -> Result<(), GaldynError> {
        if !(self.zero_tolerance.is_finite() && self.zero_tolerance >= 0.0) {
            return Err(GaldynError::InvalidParameter(
                "zero_tolerance must be finite and >= 0".into(),
            ));
        }
        if !(self.persistence_fraction > 0.0 && self.persistence_fraction <= 1.0) {
            return Err(GaldynError::InvalidParameter(
                "persistence_fraction must lie in (0, 1]".into(),
            ));
        }
        if self.min_samples < 2 {
            return Err(GaldynError::InvalidParameter(
                "min_samples must be >= 2".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for CirculationParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            const PARAM_COL: usize = 40;
            writeln!(f, "Circulation Parameters")?;
            writeln!(f, "----------------------")?;

            macro_rules! line {
                ($fmt:expr, $val:expr, $comment:expr) => {{
                    let s = format!($fmt, $val);
                    let pad = if s.len() < PARAM_COL {
                        " ".repeat(PARAM_COL - s.len())
                    } else {
                        " ".to_string()
                    };
                    writeln!(f, "  {}{}# {}", s, pad, $comment)
                }};
            }

            line!(
                "zero_tolerance       = {:.1e}",
                self.zero_tolerance,
                "|L| treated as zero below this"
            )?;
            line!(
                "persistence_fraction = {:.3}",
                self.persistence_fraction,
                "Share of samples keeping the sign"
            )?;
            line!(
                "min_samples          = {}",
                self.min_samples,
                "Shortest classifiable orbit"
            )?;
            line!(
                "ambiguity            = {:?}",
                self.ambiguity,
                "Policy for several circulating axes"
            )
        } else {
            write!(
                f,
                "CirculationParams(zero_tolerance={:.1e}, persistence_fraction={:.3}, min_samples={}, ambiguity={:?})",
                self.zero_tolerance, self.persistence_fraction, self.min_samples, self.ambiguity
            )
        }
    }
}

fn circulates(l: &[Vector3<f64>], k: usize, tolerance: f64, required: usize) -> bool {
    let Some((first, rest)) = l.split_first() else {
        return false;
    };
    let l0 = first[k];
    if l0.abs() < tolerance {
        return false;
    }

    let agreeing = rest
        .iter()
        .filter(|li| li[k].signum() == l0.signum() && li[k].abs() >= tolerance)
        .count();
    agreeing >= required
}

/// Classify an orbit as a loop about one axis or a box orbit.
///
/// Arguments
/// ---------
/// * `orbit`: any sampled orbit.
/// * `params`: sign-persistence configuration.
///
/// Returns
/// -------
/// * A [`Circulation`] with at most one flag set.
///
/// Errors
/// ------
/// * [`GaldynError::InsufficientData`] with fewer than `params.min_samples` samples.
/// * [`GaldynError::AmbiguousClassification`] when several axes circulate and
///   `params.ambiguity` is [`AmbiguityPolicy::Error`].
/// * [`GaldynError::InvalidParameter`] for an invalid `params`.
pub fn classify_orbit<T: Trajectory + ?Sized>(
    orbit: &T,
    params: &CirculationParams,
) -> Result<Circulation, GaldynError> {
    params.validate()?;
    let n_times = orbit.n_times();
    if n_times < params.min_samples {
        return Err(GaldynError::InsufficientData(format!(
            "{n_times} samples, at least {} are needed to classify an orbit",
            params.min_samples
        )));
    }

    let l = orbit.angular_momentum();
    let required = params.required_agreements(n_times);
    let axes: Vec<Axis> = Axis::ALL
        .into_iter()
        .filter(|axis| circulates(&l, axis.index(), params.zero_tolerance, required))
        .collect();

    let circulation = match axes.len() {
        0 => Circulation::BOX,
        1 => Circulation::loop_about(axes[0]),
        _ => match params.ambiguity {
            AmbiguityPolicy::Box => {
                warn!(?axes, "circulation about several axes, reporting a box orbit");
                Circulation::BOX
            }
            AmbiguityPolicy::Error => return Err(GaldynError::AmbiguousClassification { axes }),
        },
    };

    debug!(%circulation, n_times, "classified orbit");
    Ok(circulation)
}

/// [`classify_orbit`] for every orbit of a batch.
pub fn classify_orbits(
    batch: &OrbitBatch,
    params: &CirculationParams,
) -> Result<Vec<Circulation>, GaldynError> {
    batch.iter().map(|orbit| classify_orbit(&orbit, params)).collect()
}

fn axis_cycle(circulation: &Circulation) -> Result<[usize; 3], GaldynError> {
    match circulation.circulating_axes().as_slice() {
        [] => Ok(Axis::Z.cycle_to_z()),
        [axis] => Ok(axis.cycle_to_z()),
        axes => Err(GaldynError::AmbiguousClassification {
            axes: axes.to_vec(),
        }),
    }
}

fn relabel(v: &Vector3<f64>, perm: [usize; 3]) -> Vector3<f64> {
    Vector3::new(v[perm[0]], v[perm[1]], v[perm[2]])
}

/// Relabel the Cartesian axes of an orbit so its circulation axis becomes `z`.
///
/// A loop about `x` is relabelled `(x, y, z) → (y, z, x)`, a loop about `y`
/// `(x, y, z) → (z, x, y)`; positions and velocities are relabelled together.
/// Box orbits and loops about `z` are returned unchanged.
///
/// Errors
/// ------
/// * [`GaldynError::AmbiguousClassification`] if `circulation` flags several axes.
pub fn align_circulation_with_z<T: Trajectory + ?Sized>(
    orbit: &T,
    circulation: &Circulation,
) -> Result<Orbit, GaldynError> {
    let perm = axis_cycle(circulation)?;
    Orbit::new(
        orbit.times().to_vec(),
        orbit.positions().iter().map(|x| relabel(x, perm)).collect(),
        orbit.velocities().iter().map(|v| relabel(v, perm)).collect(),
    )
}

/// [`align_circulation_with_z`] for every orbit of a batch, each with its own
/// classification.
///
/// Errors
/// ------
/// * [`GaldynError::ShapeMismatch`] if there is not exactly one [`Circulation`] per orbit.
pub fn align_circulations_with_z(
    batch: &OrbitBatch,
    circulations: &[Circulation],
) -> Result<OrbitBatch, GaldynError> {
    if circulations.len() != batch.n_orbits() {
        return Err(GaldynError::ShapeMismatch(format!(
            "{} circulations for {} orbits",
            circulations.len(),
            batch.n_orbits()
        )));
    }

    let capacity = batch.n_orbits() * batch.n_times();
    let mut positions = Vec::with_capacity(capacity);
    let mut velocities = Vec::with_capacity(capacity);
    for (orbit, circulation) in batch.iter().zip(circulations) {
        let perm = axis_cycle(circulation)?;
        positions.extend(orbit.positions().iter().map(|x| relabel(x, perm)));
        velocities.extend(orbit.velocities().iter().map(|v| relabel(v, perm)));
    }

    OrbitBatch::new(batch.times().to_vec(), positions, velocities, batch.n_orbits())
}
