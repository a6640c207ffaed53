//! Conservation diagnostics for a set of bodies.
//!
//! Tracks momentum and energy against a baseline to spot numerical drift.
//! Energies use the same softening as the force field so that a softened
//! run is compared against its own potential.

use crate::simulation::params::SimulationConfig;
use crate::simulation::states::{Body, NVec3};

/// Sum of m * v
pub fn total_momentum(bodies: &[Body]) -> NVec3 {
    bodies.iter().map(Body::momentum).sum()
}

pub fn total_mass(bodies: &[Body]) -> f64 {
    bodies.iter().map(Body::mass).sum()
}

/// Mass-weighted mean position, `None` for an empty set
pub fn center_of_mass(bodies: &[Body]) -> Option<NVec3> {
    let mass = total_mass(bodies);
    if mass <= 0.0 {
        return None;
    }
    let weighted: NVec3 = bodies.iter().map(|b| b.x * b.mass()).sum();
    Some(weighted / mass)
}

/// Sum of 1/2 m |v|^2
pub fn kinetic_energy(bodies: &[Body]) -> f64 {
    bodies.iter().map(|b| 0.5 * b.mass() * b.v.norm_squared()).sum()
}

/// Softened pair potential: -G m_i m_j / sqrt(|r|^2 + eps^2)
pub fn potential_energy(bodies: &[Body], g: f64, softening: f64) -> f64 {
    let eps2 = softening * softening;
    let mut energy = 0.0;
    for (i, bi) in bodies.iter().enumerate() {
        for bj in &bodies[i + 1..] {
            let d2 = (bj.x - bi.x).norm_squared() + eps2;
            if d2 > 0.0 {
                energy -= g * bi.mass() * bj.mass() / d2.sqrt();
            }
        }
    }
    energy
}

pub fn total_energy(bodies: &[Body], cfg: &SimulationConfig) -> f64 {
    kinetic_energy(bodies) + potential_energy(bodies, cfg.g(), cfg.softening())
}

/// Baseline quantities recorded at the start of a run
#[derive(Debug, Clone)]
pub struct ConservationState {
    pub baseline_energy: f64,
    pub baseline_momentum: NVec3,
}

impl ConservationState {
    pub fn new(bodies: &[Body], cfg: &SimulationConfig) -> Self {
        Self {
            baseline_energy: total_energy(bodies, cfg),
            baseline_momentum: total_momentum(bodies),
        }
    }
}

/// Drift from the baseline at the current tick
#[derive(Debug, Clone)]
pub struct ConservationMonitor {
    /// Relative energy error: |E - E0| / |E0|
    pub energy_error: f64,
    /// Absolute momentum error: p - p0
    pub momentum_error: NVec3,
}

impl ConservationMonitor {
    pub fn check(baseline: &ConservationState, bodies: &[Body], cfg: &SimulationConfig) -> Self {
        let energy = total_energy(bodies, cfg);

        // Relative error unless the baseline is ~0
        let energy_error = if baseline.baseline_energy.abs() > 1e-12 {
            (energy - baseline.baseline_energy).abs() / baseline.baseline_energy.abs()
        } else {
            (energy - baseline.baseline_energy).abs()
        };

        Self {
            energy_error,
            momentum_error: total_momentum(bodies) - baseline.baseline_momentum,
        }
    }

    pub fn is_violated(&self, energy_tol: f64, momentum_tol: f64) -> bool {
        self.energy_error > energy_tol || self.momentum_error.norm() > momentum_tol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_of_mass_is_mass_weighted() {
        let bodies = vec![
            Body::at_rest(NVec3::new(0.0, 0.0, 0.0), 3.0).unwrap(),
            Body::at_rest(NVec3::new(4.0, 0.0, 0.0), 1.0).unwrap(),
        ];
        assert_eq!(center_of_mass(&bodies), Some(NVec3::new(1.0, 0.0, 0.0)));
        assert_eq!(center_of_mass(&[]), None);
    }

    #[test]
    fn potential_of_unit_pair() {
        let bodies = vec![
            Body::at_rest(NVec3::zeros(), 1.0).unwrap(),
            Body::at_rest(NVec3::new(2.0, 0.0, 0.0), 1.0).unwrap(),
        ];
        assert!((potential_energy(&bodies, 1.0, 0.0) + 0.5).abs() < 1e-12);
    }
}
