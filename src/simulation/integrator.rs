//! Fixed-step time integrators for the N-body system
//!
//! Provides a kick-drift-kick leapfrog step (the real-time default) and a
//! per-body rk4 step with an optional post-Newtonian term. Both are driven
//! through [`Integrator`], which owns the scratch buffers and the drift
//! correction counter across ticks.

use serde::Deserialize;

use super::forces::{Acceleration, PostNewtonianGravity};
use super::params::SimulationConfig;
use super::registry::BodyRegistry;
use super::stabilizers::{clamp_velocities, remove_drift, DriftCorrector};
use super::states::{Body, NVec3};

/// Which integration scheme advances the bodies
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    /// Symplectic kick-drift-kick, two force passes per step
    #[default]
    #[serde(rename = "leapfrog")]
    Leapfrog,

    /// Classical 4th-order Runge-Kutta, each body stepped against a snapshot
    #[serde(rename = "rk4")]
    Rk4,
}

/// What one call to [`Integrator::step`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepReport {
    pub bodies: usize,           // bodies in the step
    pub force_evaluations: usize, // full force passes (or rk4 stages)
    pub drift_corrected: bool,   // drift remover ran after this step
}

/// Advance bodies by one leapfrog step
///
/// `accels` is the caller-owned scratch buffer and must match `bodies` in
/// length. Velocities are not clamped here.
pub fn leapfrog_step<F>(bodies: &mut [Body], field: &F, accels: &mut [NVec3], dt: f64)
where
    F: Acceleration + ?Sized,
{
    let half_dt = 0.5 * dt;

    // a_n from x_n
    field.acceleration(bodies, accels);

    // Kick: v_n+1/2 = v_n + (dt/2) * a_n
    for (b, a) in bodies.iter_mut().zip(accels.iter()) {
        b.v += *a * half_dt;
    }

    // Drift: x_n+1 = x_n + dt * v_n+1/2
    for b in bodies.iter_mut() {
        b.x += b.v * dt;
    }

    // a_n+1 from x_n+1
    field.acceleration(bodies, accels);

    // Second kick: v_n+1 = v_n+1/2 + (dt/2) * a_n+1
    for (b, a) in bodies.iter_mut().zip(accels.iter()) {
        b.v += *a * half_dt;
    }
}

/// Scratch state for the rk4 scheme, reused across ticks
#[derive(Debug, Default)]
pub struct Rk4Scratch {
    positions: Vec<NVec3>,
    masses: Vec<f64>,
    next: Vec<(NVec3, NVec3)>,
}

impl Rk4Scratch {
    fn resize(&mut self, n: usize) {
        if self.positions.len() != n {
            self.positions.resize(n, NVec3::zeros());
            self.masses.resize(n, 0.0);
            self.next.resize(n, (NVec3::zeros(), NVec3::zeros()));
        }
    }
}

/// Advance bodies by one rk4 step
///
/// Every body is integrated on its own against the start-of-step positions
/// of the others; new states are written back only once all bodies are done.
/// This is not a coupled n-body rk4: the other bodies do not move during a
/// body's trial stages.
pub fn rk4_step(bodies: &mut [Body], field: &PostNewtonianGravity, scratch: &mut Rk4Scratch, dt: f64) {
    let n = bodies.len();
    scratch.resize(n);

    for (i, b) in bodies.iter().enumerate() {
        scratch.positions[i] = b.x;
        scratch.masses[i] = b.mass();
    }

    let half_dt = 0.5 * dt;
    let positions: &[NVec3] = &scratch.positions;
    let masses: &[f64] = &scratch.masses;
    let next = &mut scratch.next;
    let accel = |i: usize, x: NVec3, v: NVec3| field.acceleration_at(i, x, v, positions, masses);

    for (i, b) in bodies.iter().enumerate() {
        let x0 = b.x;
        let v0 = b.v;

        // k1 at t
        let k1_v = v0;
        let k1_a = accel(i, x0, v0);

        // k2 at t + dt/2 using k1
        let k2_v = v0 + k1_a * half_dt;
        let k2_a = accel(i, x0 + k1_v * half_dt, k2_v);

        // k3 at t + dt/2 using k2
        let k3_v = v0 + k2_a * half_dt;
        let k3_a = accel(i, x0 + k2_v * half_dt, k3_v);

        // k4 at t + dt using k3
        let k4_v = v0 + k3_a * dt;
        let k4_a = accel(i, x0 + k3_v * dt, k4_v);

        let avg_v = (k1_v + k2_v * 2.0 + k3_v * 2.0 + k4_v) / 6.0;
        let avg_a = (k1_a + k2_a * 2.0 + k3_a * 2.0 + k4_a) / 6.0;

        next[i] = (x0 + avg_v * dt, v0 + avg_a * dt);
    }

    for (b, (x, v)) in bodies.iter_mut().zip(next.iter()) {
        b.x = *x;
        b.v = *v;
    }
}

/// Owns everything that must outlive a single tick: the acceleration
/// buffer, rk4 scratch space and the drift correction counter
#[derive(Debug, Default)]
pub struct Integrator {
    scheme: Scheme,
    accels: Vec<NVec3>,
    rk4: Rk4Scratch,
    drift: DriftCorrector,
}

impl Integrator {
    pub fn new(scheme: Scheme) -> Self {
        Self {
            scheme,
            ..Self::default()
        }
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn set_scheme(&mut self, scheme: Scheme) {
        self.scheme = scheme;
    }

    /// Steps that actually integrated (two or more bodies)
    pub fn steps(&self) -> u64 {
        self.drift.ticks()
    }

    /// Forget the tick count, e.g. after a reset
    pub fn reset_counter(&mut self) {
        self.drift.reset();
    }

    /// Advance every body in `registry` by `dt`
    pub fn step(&mut self, registry: &mut BodyRegistry, cfg: &SimulationConfig, dt: f64) -> StepReport {
        self.step_bodies(registry.bodies_mut(), cfg, dt)
    }

    /// Advance `bodies` by `dt`; fewer than two bodies is a no-op
    pub fn step_bodies(&mut self, bodies: &mut [Body], cfg: &SimulationConfig, dt: f64) -> StepReport {
        let n = bodies.len();
        if n < 2 {
            return StepReport {
                bodies: n,
                ..StepReport::default()
            };
        }

        let force_evaluations = match self.scheme {
            Scheme::Leapfrog => {
                self.ensure_buffer(n);
                let field = gravity_field(cfg);
                leapfrog_step(bodies, &field, &mut self.accels, dt);
                2
            }
            Scheme::Rk4 => {
                let field = PostNewtonianGravity::from_config(cfg);
                rk4_step(bodies, &field, &mut self.rk4, dt);
                4
            }
        };

        clamp_velocities(bodies, cfg.max_velocity());

        let due = self.drift.tick(cfg.drift_interval());
        let drift_corrected = cfg.remove_com_drift() && due && remove_drift(bodies).is_some();

        StepReport {
            bodies: n,
            force_evaluations,
            drift_corrected,
        }
    }

    fn ensure_buffer(&mut self, n: usize) {
        if self.accels.len() != n {
            self.accels.resize(n, NVec3::zeros());
        }
    }
}

#[cfg(not(feature = "parallel"))]
fn gravity_field(cfg: &SimulationConfig) -> super::forces::NewtonianGravity {
    super::forces::NewtonianGravity::from_config(cfg)
}

#[cfg(feature = "parallel")]
fn gravity_field(cfg: &SimulationConfig) -> super::forces::NewtonianGravityPar {
    super::forces::NewtonianGravityPar(super::forces::NewtonianGravity::from_config(cfg))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_bodies() -> Vec<Body> {
        vec![
            Body::new(NVec3::new(-1.0, 0.0, 0.0), NVec3::new(0.0, 0.5, 0.0), 1.0, 1.0).unwrap(),
            Body::new(NVec3::new(1.0, 0.0, 0.0), NVec3::new(0.0, -0.5, 0.0), 1.0, 1.0).unwrap(),
        ]
    }

    #[test]
    fn buffer_follows_body_count() {
        let cfg = SimulationConfig::default();
        let mut integrator = Integrator::new(Scheme::Leapfrog);

        let mut bodies = two_bodies();
        integrator.step_bodies(&mut bodies, &cfg, 0.01);
        assert_eq!(integrator.accels.len(), 2);

        bodies.push(Body::at_rest(NVec3::new(0.0, 3.0, 0.0), 1.0).unwrap());
        integrator.step_bodies(&mut bodies, &cfg, 0.01);
        assert_eq!(integrator.accels.len(), 3);
    }

    #[test]
    fn single_body_is_left_untouched() {
        let cfg = SimulationConfig::default();
        let mut bodies = vec![two_bodies().remove(0)];
        let before = bodies.clone();

        for scheme in [Scheme::Leapfrog, Scheme::Rk4] {
            let mut integrator = Integrator::new(scheme);
            let report = integrator.step_bodies(&mut bodies, &cfg, 0.01);
            assert_eq!(report.force_evaluations, 0);
            assert_eq!(integrator.steps(), 0);
        }
        assert_eq!(bodies, before);
    }

    #[test]
    fn leapfrog_reports_two_passes_and_drift_interval() {
        let mut cfg = SimulationConfig::default();
        cfg.set_drift_interval(3).unwrap();
        let mut integrator = Integrator::new(Scheme::Leapfrog);
        let mut bodies = two_bodies();

        let reports: Vec<StepReport> = (0..6)
            .map(|_| integrator.step_bodies(&mut bodies, &cfg, 0.01))
            .collect();

        assert!(reports.iter().all(|r| r.force_evaluations == 2));
        let corrected: Vec<bool> = reports.iter().map(|r| r.drift_corrected).collect();
        assert_eq!(corrected, vec![false, false, true, false, false, true]);
    }

    #[test]
    fn rk4_clamps_velocity() {
        let mut cfg = SimulationConfig::unclamped(1.0).unwrap();
        cfg.set_max_velocity(0.25).unwrap();
        let mut integrator = Integrator::new(Scheme::Rk4);
        let mut bodies = two_bodies();

        integrator.step_bodies(&mut bodies, &cfg, 0.01);
        for b in &bodies {
            assert!((b.v.norm() - 0.25).abs() < 1e-12);
        }
    }
}
