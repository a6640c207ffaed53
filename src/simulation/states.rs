//! Core state types for the N-body simulation.
//!
//! Defines the physics-only body record and its handle:
//! - `Body`      mass, density, position and velocity in world frame
//! - `BodyId`    stable handle assigned by the registry
//! - `RestState` position/velocity snapshot used to reset a body
//!
//! Visual data (names, meshes) lives next to the body in the registry,
//! never inside it.

use std::f64::consts::PI;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::simulation::error::ConfigError;

pub type NVec3 = Vector3<f64>;

/// Handle of a body inside a [`BodyRegistry`](crate::simulation::registry::BodyRegistry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u64);

/// A massive point/sphere body
///
/// `mass` and `density` are private so every assignment goes through a
/// validating setter; position and velocity are plain fields the integrator
/// mutates in place
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub x: NVec3, // position
    pub v: NVec3, // velocity
    m: f64,       // mass, always > 0
    density: f64, // only used for the visual radius
}

impl Body {
    /// Build a body, rejecting non-positive mass or density
    pub fn new(x: NVec3, v: NVec3, m: f64, density: f64) -> Result<Self, ConfigError> {
        check_positive_mass(m)?;
        check_positive_density(density)?;
        Ok(Self { x, v, m, density })
    }

    /// Body at `x` with zero velocity and unit density
    pub fn at_rest(x: NVec3, m: f64) -> Result<Self, ConfigError> {
        Self::new(x, NVec3::zeros(), m, 1.0)
    }

    pub fn mass(&self) -> f64 {
        self.m
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    /// Assign a new mass; on rejection the previous mass is kept
    pub fn set_mass(&mut self, m: f64) -> Result<(), ConfigError> {
        check_positive_mass(m)?;
        self.m = m;
        Ok(())
    }

    /// Scale the mass by `factor` (mass editing from the UI)
    pub fn scale_mass(&mut self, factor: f64) -> Result<(), ConfigError> {
        self.set_mass(self.m * factor)
    }

    pub fn set_density(&mut self, density: f64) -> Result<(), ConfigError> {
        check_positive_density(density)?;
        self.density = density;
        Ok(())
    }

    /// Radius of a uniform sphere with this mass and density
    /// r = cbrt(3m / (4 pi rho))
    pub fn radius(&self) -> f64 {
        (3.0 * self.m / (4.0 * PI * self.density)).cbrt()
    }

    /// Linear momentum m * v
    pub fn momentum(&self) -> NVec3 {
        self.v * self.m
    }

    pub fn rest_state(&self) -> RestState {
        RestState {
            x: self.x,
            v: self.v,
        }
    }

    pub fn restore(&mut self, rest: &RestState) {
        self.x = rest.x;
        self.v = rest.v;
    }
}

/// Position and velocity a body returns to on reset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestState {
    pub x: NVec3,
    pub v: NVec3,
}

fn check_positive_mass(m: f64) -> Result<(), ConfigError> {
    if m.is_finite() && m > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveMass(m))
    }
}

fn check_positive_density(density: f64) -> Result<(), ConfigError> {
    if density.is_finite() && density > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveDensity(density))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_mass_keeps_previous_value() {
        let mut b = Body::at_rest(NVec3::zeros(), 2.0).unwrap();
        assert!(b.set_mass(0.0).is_err());
        assert!(b.set_mass(-3.0).is_err());
        assert!(b.set_mass(f64::NAN).is_err());
        assert_eq!(b.mass(), 2.0);

        b.set_mass(5.0).unwrap();
        assert_eq!(b.mass(), 5.0);
    }

    #[test]
    fn radius_of_unit_density_sphere() {
        let b = Body::new(NVec3::zeros(), NVec3::zeros(), 4.0 * PI / 3.0, 1.0).unwrap();
        assert!((b.radius() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn scale_mass_rejects_zero_factor() {
        let mut b = Body::at_rest(NVec3::zeros(), 1.5).unwrap();
        assert!(b.scale_mass(0.0).is_err());
        b.scale_mass(2.0).unwrap();
        assert_eq!(b.mass(), 3.0);
    }
}
