#![allow(dead_code)]

use galdyn::dynamics::phase_space::{Orbit, OrbitIntegrator, PhaseSpacePosition};
use galdyn::galdyn_errors::GaldynError;
use nalgebra::Vector3;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Route the crate's `tracing` output to the test harness (`RUST_LOG` overrides the level).
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("galdyn=debug"));

    // several tests of the same binary race to install the subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_test_writer()
                .with_target(false)
                .compact(),
        )
        .try_init();
}

/// Triaxial logarithmic potential
/// `Φ = ½ v_c² ln(r_h² + x²/q1² + y²/q2² + z²/q3²)`.
#[derive(Debug, Clone, Copy)]
pub struct LogarithmicPotential {
    pub v_c: f64,
    pub r_h: f64,
    pub q: [f64; 3],
}

impl LogarithmicPotential {
    /// The flattened potential of Binney & Tremaine (2008), figures 3.8 and 3.9.
    pub fn binney_tremaine() -> Self {
        LogarithmicPotential {
            v_c: 1.0,
            r_h: 0.14,
            q: [1.0, 0.9, 1.0],
        }
    }

    fn scaled_r2(&self, x: &Vector3<f64>) -> f64 {
        self.r_h * self.r_h
            + (0..3)
                .map(|i| (x[i] / self.q[i]).powi(2))
                .sum::<f64>()
    }

    pub fn value(&self, x: &Vector3<f64>) -> f64 {
        0.5 * self.v_c * self.v_c * self.scaled_r2(x).ln()
    }

    pub fn acceleration(&self, x: &Vector3<f64>) -> Vector3<f64> {
        let s = self.scaled_r2(x);
        Vector3::from_fn(|i, _| -self.v_c * self.v_c * x[i] / (self.q[i] * self.q[i]) / s)
    }
}

/// Kick-drift-kick leapfrog.
#[derive(Debug, Clone, Copy)]
pub struct Leapfrog {
    pub potential: LogarithmicPotential,
}

impl OrbitIntegrator for Leapfrog {
    fn integrate(
        &self,
        w0: &PhaseSpacePosition,
        dt: f64,
        n_steps: usize,
    ) -> Result<Orbit, GaldynError> {
        let mut times = Vec::with_capacity(n_steps + 1);
        let mut positions = Vec::with_capacity(n_steps + 1);
        let mut velocities = Vec::with_capacity(n_steps + 1);

        let (mut x, mut v) = (w0.position, w0.velocity);
        let mut a = self.potential.acceleration(&x);
        times.push(0.0);
        positions.push(x);
        velocities.push(v);

        for step in 1..=n_steps {
            let v_half = v + a * (0.5 * dt);
            x += v_half * dt;
            a = self.potential.acceleration(&x);
            v = v_half + a * (0.5 * dt);

            times.push(step as f64 * dt);
            positions.push(x);
            velocities.push(v);
        }

        Orbit::new(times, positions, velocities)
    }
}

pub const DT: f64 = 0.05;
pub const N_STEPS: usize = 10_000;

pub fn leapfrog() -> Leapfrog {
    Leapfrog {
        potential: LogarithmicPotential::binney_tremaine(),
    }
}

/// Planar orbit launched from `(x, 0, 0)` with velocity `(vx, vy, 0)`, where `vy`
/// follows from the energy `E = -0.337` and the potential at the launch point.
pub fn make_known_orbit(x: f64, vx: f64) -> Orbit {
    let integrator = leapfrog();
    let energy = -0.337;
    let start = Vector3::new(x, 0.0, 0.0);
    let vy = (2.0 * (energy - integrator.potential.value(&start))).sqrt();

    let w0 = PhaseSpacePosition::new(start, Vector3::new(vx, vy, 0.0));
    integrator.integrate(&w0, DT, N_STEPS).unwrap()
}

/// Initial conditions of loops about x, y and z, followed by a box orbit.
pub fn loop_and_box_initial_conditions() -> [PhaseSpacePosition; 4] {
    [
        PhaseSpacePosition::from_array([0.0, 1.0, 0.0, 0.0, 0.0, 0.5]),
        PhaseSpacePosition::from_array([1.0, 0.0, 0.0, 0.0, 0.0, 0.5]),
        PhaseSpacePosition::from_array([1.0, 0.0, 0.0, 0.0, 0.5, 0.0]),
        PhaseSpacePosition::from_array([0.8, 0.4, 0.0, 0.0, 0.1, 0.0]),
    ]
}
