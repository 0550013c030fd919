//! # Phase-space containers
//!
//! * [`PhaseSpacePosition`]: a single `(x, v)` sample.
//! * [`Orbit`]: one orbit, `T` samples sharing a time axis.
//! * [`OrbitBatch`]: `N` orbits sampled on one common time axis, stored contiguously
//!   (sample `t` of orbit `i` lives at index `i · T + t`). [`OrbitBatch::orbit`] hands out
//!   borrowed [`OrbitView`]s.
//!
//! Every container implementing [`Trajectory`] gets the per-sample angular momentum
//! `L = x × v`, the named Cartesian components, the galactocentric radius and the
//! physics-convention spherical representation ([`SphericalPhaseSpace`]) for free.
use nalgebra::Vector3;

use crate::constants::DPI;
use crate::galdyn_errors::GaldynError;

/// Position and velocity of a particle at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseSpacePosition {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

impl PhaseSpacePosition {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        PhaseSpacePosition { position, velocity }
    }

    /// Build from `[x, y, z, vx, vy, vz]`.
    pub fn from_array(w: [f64; 6]) -> Self {
        PhaseSpacePosition {
            position: Vector3::new(w[0], w[1], w[2]),
            velocity: Vector3::new(w[3], w[4], w[5]),
        }
    }

    /// Angular momentum `L = x × v`.
    pub fn angular_momentum(&self) -> Vector3<f64> {
        self.position.cross(&self.velocity)
    }

    /// Spherical coordinates and velocity components of this sample.
    pub fn to_spherical(&self) -> SphericalPhaseSpace {
        SphericalPhaseSpace::from_cartesian(&self.position, &self.velocity)
    }
}

/// Physics-convention spherical phase-space coordinates.
///
/// `theta` is the polar angle from `+z` in `[0, π]`, `phi` the azimuth in `[0, 2π)`.
/// The velocity components are projections of `v` on the local unit vectors
/// `r̂`, `φ̂`, `θ̂`, in the unit of the Cartesian velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalPhaseSpace {
    pub r: f64,
    pub phi: f64,
    pub theta: f64,
    pub v_r: f64,
    pub v_phi: f64,
    pub v_theta: f64,
}

impl SphericalPhaseSpace {
    /// At the origin the angles are set to zero and the basis is the one of `+z`.
    pub fn from_cartesian(x: &Vector3<f64>, v: &Vector3<f64>) -> Self {
        let r = x.norm();
        let theta = if r > 0.0 {
            (x.z / r).clamp(-1.0, 1.0).acos()
        } else {
            0.0
        };
        let phi = x.y.atan2(x.x).rem_euclid(DPI);

        let (sin_t, cos_t) = theta.sin_cos();
        let (sin_p, cos_p) = phi.sin_cos();
        let r_hat = Vector3::new(sin_t * cos_p, sin_t * sin_p, cos_t);
        let theta_hat = Vector3::new(cos_t * cos_p, cos_t * sin_p, -sin_t);
        let phi_hat = Vector3::new(-sin_p, cos_p, 0.0);

        SphericalPhaseSpace {
            r,
            phi,
            theta,
            v_r: v.dot(&r_hat),
            v_phi: v.dot(&phi_hat),
            v_theta: v.dot(&theta_hat),
        }
    }

    /// Back to Cartesian position and velocity.
    pub fn to_cartesian(&self) -> PhaseSpacePosition {
        let (sin_t, cos_t) = self.theta.sin_cos();
        let (sin_p, cos_p) = self.phi.sin_cos();
        let r_hat = Vector3::new(sin_t * cos_p, sin_t * sin_p, cos_t);
        let theta_hat = Vector3::new(cos_t * cos_p, cos_t * sin_p, -sin_t);
        let phi_hat = Vector3::new(-sin_p, cos_p, 0.0);

        PhaseSpacePosition::new(
            r_hat * self.r,
            r_hat * self.v_r + phi_hat * self.v_phi + theta_hat * self.v_theta,
        )
    }
}

fn component(samples: &[Vector3<f64>], k: usize) -> Vec<f64> {
    samples.iter().map(|s| s[k]).collect()
}

/// Read access to a sampled orbit.
pub trait Trajectory {
    fn times(&self) -> &[f64];

    fn positions(&self) -> &[Vector3<f64>];

    fn velocities(&self) -> &[Vector3<f64>];

    fn n_times(&self) -> usize {
        self.times().len()
    }

    fn phase_space_position(&self, t: usize) -> Option<PhaseSpacePosition> {
        Some(PhaseSpacePosition::new(
            *self.positions().get(t)?,
            *self.velocities().get(t)?,
        ))
    }

    /// Angular momentum at every sample.
    fn angular_momentum(&self) -> Vec<Vector3<f64>> {
        self.positions()
            .iter()
            .zip(self.velocities())
            .map(|(x, v)| x.cross(v))
            .collect()
    }

    fn x(&self) -> Vec<f64> {
        component(self.positions(), 0)
    }

    fn y(&self) -> Vec<f64> {
        component(self.positions(), 1)
    }

    fn z(&self) -> Vec<f64> {
        component(self.positions(), 2)
    }

    fn vx(&self) -> Vec<f64> {
        component(self.velocities(), 0)
    }

    fn vy(&self) -> Vec<f64> {
        component(self.velocities(), 1)
    }

    fn vz(&self) -> Vec<f64> {
        component(self.velocities(), 2)
    }

    /// Distance to the origin at every sample.
    fn radius(&self) -> Vec<f64> {
        self.positions().iter().map(|x| x.norm()).collect()
    }

    /// Spherical representation of every sample.
    fn spherical(&self) -> Vec<SphericalPhaseSpace> {
        self.positions()
            .iter()
            .zip(self.velocities())
            .map(|(x, v)| SphericalPhaseSpace::from_cartesian(x, v))
            .collect()
    }
}

fn check_sample_counts(n_times: usize, n_pos: usize, n_vel: usize) -> Result<(), GaldynError> {
    if n_pos != n_times || n_vel != n_times {
        return Err(GaldynError::ShapeMismatch(format!(
            "{n_times} times, {n_pos} positions and {n_vel} velocities"
        )));
    }
    Ok(())
}

/// A single orbit owning its samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Orbit {
    times: Vec<f64>,
    positions: Vec<Vector3<f64>>,
    velocities: Vec<Vector3<f64>>,
}

impl Orbit {
    /// Errors
    /// ------
    /// * [`GaldynError::ShapeMismatch`] unless the three vectors have the same length.
    pub fn new(
        times: Vec<f64>,
        positions: Vec<Vector3<f64>>,
        velocities: Vec<Vector3<f64>>,
    ) -> Result<Self, GaldynError> {
        check_sample_counts(times.len(), positions.len(), velocities.len())?;
        Ok(Orbit {
            times,
            positions,
            velocities,
        })
    }

    pub fn from_phase_space(
        times: Vec<f64>,
        samples: &[PhaseSpacePosition],
    ) -> Result<Self, GaldynError> {
        let (positions, velocities) = samples.iter().map(|w| (w.position, w.velocity)).unzip();
        Self::new(times, positions, velocities)
    }

    /// Split the orbit into its raw parts.
    pub fn into_parts(self) -> (Vec<f64>, Vec<Vector3<f64>>, Vec<Vector3<f64>>) {
        (self.times, self.positions, self.velocities)
    }
}

impl Trajectory for Orbit {
    fn times(&self) -> &[f64] {
        &self.times
    }

    fn positions(&self) -> &[Vector3<f64>] {
        &self.positions
    }

    fn velocities(&self) -> &[Vector3<f64>] {
        &self.velocities
    }
}

/// Borrowed view of one orbit inside an [`OrbitBatch`].
#[derive(Debug, Clone, Copy)]
pub struct OrbitView<'a> {
    times: &'a [f64],
    positions: &'a [Vector3<f64>],
    velocities: &'a [Vector3<f64>],
}

impl OrbitView<'_> {
    pub fn to_orbit(&self) -> Orbit {
        Orbit {
            times: self.times.to_vec(),
            positions: self.positions.to_vec(),
            velocities: self.velocities.to_vec(),
        }
    }
}

impl Trajectory for OrbitView<'_> {
    fn times(&self) -> &[f64] {
        self.times
    }

    fn positions(&self) -> &[Vector3<f64>] {
        self.positions
    }

    fn velocities(&self) -> &[Vector3<f64>] {
        self.velocities
    }
}

/// `N` orbits sampled on one shared time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitBatch {
    times: Vec<f64>,
    positions: Vec<Vector3<f64>>,
    velocities: Vec<Vector3<f64>>,
    n_orbits: usize,
}

impl OrbitBatch {
    /// Build a batch from flat storage, orbit-major.
    ///
    /// Arguments
    /// ---------
    /// * `times`: the shared time axis, length `T > 0`.
    /// * `positions`, `velocities`: `N · T` samples, sample `t` of orbit `i` at `i · T + t`.
    /// * `n_orbits`: `N`.
    ///
    /// Errors
    /// ------
    /// * [`GaldynError::ShapeMismatch`] if the time axis is empty or the sample counts
    ///   differ from `N · T`.
    pub fn new(
        times: Vec<f64>,
        positions: Vec<Vector3<f64>>,
        velocities: Vec<Vector3<f64>>,
        n_orbits: usize,
    ) -> Result<Self, GaldynError> {
        if times.is_empty() {
            return Err(GaldynError::ShapeMismatch(
                "an orbit batch needs a non-empty time axis".into(),
            ));
        }
        check_sample_counts(times.len() * n_orbits, positions.len(), velocities.len())?;

        Ok(OrbitBatch {
            times,
            positions,
            velocities,
            n_orbits,
        })
    }

    /// Gather orbits sharing the same time axis into a batch.
    ///
    /// Errors
    /// ------
    /// * [`GaldynError::ShapeMismatch`] if `orbits` is empty or the time axes differ.
    pub fn from_orbits<T: Trajectory>(orbits: &[T]) -> Result<Self, GaldynError> {
        let first = orbits.first().ok_or_else(|| {
            GaldynError::ShapeMismatch("cannot build an orbit batch from zero orbits".into())
        })?;
        let times = first.times().to_vec();

        let mut positions = Vec::with_capacity(times.len() * orbits.len());
        let mut velocities = Vec::with_capacity(times.len() * orbits.len());
        for (i, orbit) in orbits.iter().enumerate() {
            if orbit.times() != times.as_slice() {
                return Err(GaldynError::ShapeMismatch(format!(
                    "orbit {i} does not share the time axis of orbit 0"
                )));
            }
            positions.extend_from_slice(orbit.positions());
            velocities.extend_from_slice(orbit.velocities());
        }

        Self::new(times, positions, velocities, orbits.len())
    }

    pub fn n_orbits(&self) -> usize {
        self.n_orbits
    }

    pub fn n_times(&self) -> usize {
        self.times.len()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Borrow orbit `i`, or `None` if out of range.
    pub fn orbit(&self, i: usize) -> Option<OrbitView<'_>> {
        if i >= self.n_orbits {
            return None;
        }
        let range = i * self.n_times()..(i + 1) * self.n_times();
        Some(OrbitView {
            times: &self.times,
            positions: &self.positions[range.clone()],
            velocities: &self.velocities[range],
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = OrbitView<'_>> {
        let n_times = self.n_times();
        self.positions
            .chunks_exact(n_times)
            .zip(self.velocities.chunks_exact(n_times))
            .map(move |(positions, velocities)| OrbitView {
                times: &self.times,
                positions,
                velocities,
            })
    }

    /// Angular momentum of every orbit, one `Vec` of length `T` per orbit.
    pub fn angular_momentum(&self) -> Vec<Vec<Vector3<f64>>> {
        self.iter().map(|orbit| orbit.angular_momentum()).collect()
    }
}

/// Produces orbits from initial conditions.
///
/// The crate ships no potential or integration scheme; callers plug their own.
pub trait OrbitIntegrator {
    /// Integrate `n_steps` steps of size `dt` from `w0`. The returned orbit holds
    /// `n_steps + 1` samples, the first one being `w0` at `t = 0`.
    fn integrate(
        &self,
        w0: &PhaseSpacePosition,
        dt: f64,
        n_steps: usize,
    ) -> Result<Orbit, GaldynError>;

    /// Integrate several initial conditions on the same time grid.
    fn integrate_many(
        &self,
        w0: &[PhaseSpacePosition],
        dt: f64,
        n_steps: usize,
    ) -> Result<OrbitBatch, GaldynError> {
        let orbits = w0
            .iter()
            .map(|w| self.integrate(w, dt, n_steps))
            .collect::<Result<Vec<_>, _>>()?;
        OrbitBatch::from_orbits(&orbits)
    }
}
