//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – integration scheme, dt ceiling and run length
//! - [`ParametersConfig`] – physical constants and safety limits
//! - [`BodyConfig`]       – initial state for each body
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! A two-body scenario matching these types:
//!
//! ```yaml
//! engine:
//!   integrator: "leapfrog"  # or "rk4"
//!   max_dt: 0.0333333       # frame deltas are clamped to this
//!   ticks: 600              # ticks to run from the command line
//!   tick_delta: 0.0166667   # frame delta fed to each tick
//!
//! parameters:
//!   G: 1.0                  # gravitational constant
//!   softening: 0.5          # added in quadrature to pair distances
//!   max_acceleration: 1000.0
//!   max_velocity: 500.0
//!   remove_com_drift: true
//!   drift_interval: 10
//!   speed_of_light: ~       # set to enable the post-Newtonian term (rk4)
//!
//! bodies:
//!   - name: "A"
//!     x: [ -1.0, 0.0, 0.0 ]
//!     v: [  0.0, 0.5, 0.0 ]
//!     m: 1.0
//!   - name: "B"
//!     x: [  1.0, 0.0, 0.0 ]
//!     v: [  0.0, -0.5, 0.0 ]
//!     m: 1.0
//! ```
//!
//! Omitted optional fields fall back to the runtime defaults. The scenario
//! builder validates every value through the runtime setters.

use serde::Deserialize;

use crate::simulation::engine::DEFAULT_MAX_DT;
use crate::simulation::integrator::Scheme;

fn default_max_dt() -> f64 {
    DEFAULT_MAX_DT
}

fn default_ticks() -> u64 {
    600
}

fn default_tick_delta() -> f64 {
    1.0 / 60.0
}

fn default_density() -> f64 {
    1.0
}

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone)]
pub struct EngineConfig {
    #[serde(default)]
    pub integrator: Scheme, // scheme used to advance the bodies
    #[serde(default = "default_max_dt")]
    pub max_dt: f64, // upper bound on the integrated dt
    #[serde(default = "default_ticks")]
    pub ticks: u64, // ticks the runner performs
    #[serde(default = "default_tick_delta")]
    pub tick_delta: f64, // frame delta handed to each tick
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            integrator: Scheme::default(),
            max_dt: default_max_dt(),
            ticks: default_ticks(),
            tick_delta: default_tick_delta(),
        }
    }
}

/// Physical constants and safety limits; `None` keeps the runtime default
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ParametersConfig {
    #[serde(rename = "G")]
    pub g: Option<f64>, // gravitational constant
    pub softening: Option<f64>,
    pub max_acceleration: Option<f64>, // .inf disables
    pub max_velocity: Option<f64>,     // .inf disables
    pub remove_com_drift: Option<bool>,
    pub drift_interval: Option<u32>,
    pub speed_of_light: Option<f64>,
    pub min_separation: Option<f64>,
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    #[serde(default)]
    pub name: Option<String>, // display name, defaults to Object_<n>
    #[serde(default)]
    pub mesh_id: Option<i64>, // visual mesh reference, not used by the physics
    pub x: [f64; 3],          // initial position
    #[serde(default)]
    pub v: [f64; 3], // initial velocity
    pub m: f64,      // mass
    #[serde(default = "default_density")]
    pub density: f64, // only drives the visual radius
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub parameters: ParametersConfig,
    #[serde(default)]
    pub bodies: Vec<BodyConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_reader(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_yaml_uses_defaults() {
        let cfg = ScenarioConfig::from_yaml_str(
            "bodies:\n  - x: [0.0, 0.0, 0.0]\n    m: 2.0\n",
        )
        .unwrap();

        assert_eq!(cfg.engine.integrator, Scheme::Leapfrog);
        assert_eq!(cfg.engine.max_dt, DEFAULT_MAX_DT);
        assert!(cfg.parameters.g.is_none());
        assert_eq!(cfg.bodies[0].v, [0.0; 3]);
        assert_eq!(cfg.bodies[0].density, 1.0);
    }

    #[test]
    fn parses_rk4_and_parameters() {
        let cfg = ScenarioConfig::from_yaml_str(
            r#"
engine:
  integrator: "rk4"
parameters:
  G: 0.5
  max_velocity: .inf
  speed_of_light: 30.0
bodies: []
"#,
        )
        .unwrap();

        assert_eq!(cfg.engine.integrator, Scheme::Rk4);
        assert_eq!(cfg.parameters.g, Some(0.5));
        assert_eq!(cfg.parameters.max_velocity, Some(f64::INFINITY));
        assert_eq!(cfg.parameters.speed_of_light, Some(30.0));
    }

    #[test]
    fn unknown_integrator_is_rejected() {
        assert!(ScenarioConfig::from_yaml_str("engine:\n  integrator: \"euler\"\n").is_err());
    }
}
