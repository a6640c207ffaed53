//! Post-integration safeguards
//!
//! - `clamp_magnitude`   caps a vector's length, direction preserved
//! - `clamp_scalar`      caps a signed magnitude, inf included
//! - `remove_drift`      zeroes the system's net momentum
//! - `DriftCorrector`    decides on which ticks `remove_drift` runs
//!
//! Drift removal is numerical hygiene only: running it every tick would
//! fight the legitimate motion of a system with non-zero momentum, so it
//! runs every `drift_interval` ticks.

use crate::simulation::states::{Body, NVec3};

/// Scale `v` down to length `max` if it is longer; `max = inf` is a no-op
#[inline]
pub fn clamp_magnitude(v: NVec3, max: f64) -> NVec3 {
    let len2 = v.norm_squared();
    if len2 > max * max {
        v * (max / len2.sqrt())
    } else {
        v
    }
}

/// Limit a signed magnitude to `[-max, max]`; an infinite `value` lands on the bound
#[inline]
pub fn clamp_scalar(value: f64, max: f64) -> f64 {
    value.clamp(-max, max)
}

/// Clamp every body's speed to `max_velocity`
pub fn clamp_velocities(bodies: &mut [Body], max_velocity: f64) {
    if max_velocity.is_infinite() {
        return;
    }
    for b in bodies.iter_mut() {
        b.v = clamp_magnitude(b.v, max_velocity);
    }
}

/// Subtract the mass-weighted mean velocity from every body
///
/// Returns the drift velocity that was removed, or `None` when the total
/// mass is not positive
pub fn remove_drift(bodies: &mut [Body]) -> Option<NVec3> {
    let (momentum, mass) = bodies
        .iter()
        .fold((NVec3::zeros(), 0.0), |(p, m), b| (p + b.momentum(), m + b.mass()));

    if mass <= 0.0 {
        return None;
    }

    let drift = momentum / mass;
    for b in bodies.iter_mut() {
        b.v -= drift;
    }
    Some(drift)
}

/// Tick counter that fires every `interval` counted ticks
#[derive(Debug, Clone, Default)]
pub struct DriftCorrector {
    ticks: u64,
}

impl DriftCorrector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one tick; true when this tick is a multiple of `interval`
    pub fn tick(&mut self, interval: u32) -> bool {
        self.ticks += 1;
        self.ticks % u64::from(interval.max(1)) == 0
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn reset(&mut self) {
        self.ticks = 0;
    }
}
