//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle:
//! - a `TickDriver` carrying engine settings and `SimulationConfig`
//! - a `BodyRegistry` holding the bodies at t = 0
//! - the rest states used by reset
//!
//! Every value passes through the runtime setters, so a scenario that builds
//! is a valid one.

use thiserror::Error;

use crate::configuration::config::{BodyConfig, ParametersConfig, ScenarioConfig};
use crate::simulation::engine::{Engine, TickDriver};
use crate::simulation::error::ConfigError;
use crate::simulation::integrator::StepReport;
use crate::simulation::params::SimulationConfig;
use crate::simulation::registry::{BodyRegistry, Visual};
use crate::simulation::states::{Body, BodyId, NVec3, RestState};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid engine settings: {0}")]
    Engine(#[source] ConfigError),

    #[error("invalid parameters: {0}")]
    Parameters(#[source] ConfigError),

    #[error("invalid body #{index}: {source}")]
    Body {
        index: usize,
        #[source]
        source: ConfigError,
    },
}

/// Runtime bundle constructed from a [`ScenarioConfig`]
#[derive(Debug)]
pub struct Scenario {
    pub driver: TickDriver,
    pub registry: BodyRegistry,
    pub rest: Vec<(BodyId, RestState)>,
    pub ticks: u64,
    pub tick_delta: f64,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self, ScenarioError> {
        // Engine (runtime) from EngineConfig
        let e_cfg = cfg.engine;
        let engine = Engine::new(e_cfg.integrator, e_cfg.max_dt).map_err(ScenarioError::Engine)?;
        if !(e_cfg.tick_delta.is_finite() && e_cfg.tick_delta > 0.0) {
            return Err(ScenarioError::Engine(ConfigError::NonPositiveTickDelta(e_cfg.tick_delta)));
        }

        // Parameters (runtime) from ParametersConfig
        let config = build_parameters(&cfg.parameters).map_err(ScenarioError::Parameters)?;

        // Bodies: map `BodyConfig` -> runtime `Body` using nalgebra vectors
        let mut registry = BodyRegistry::new();
        for (index, bc) in cfg.bodies.iter().enumerate() {
            let (body, visual) =
                build_body(index, bc).map_err(|source| ScenarioError::Body { index, source })?;
            registry.add(body, visual);
        }
        let rest = registry.rest_states();

        Ok(Self {
            driver: TickDriver::new(engine, config),
            registry,
            rest,
            ticks: e_cfg.ticks,
            tick_delta: e_cfg.tick_delta,
        })
    }

    /// Run one tick with the scenario's frame delta
    pub fn tick(&mut self) -> Option<StepReport> {
        self.driver.tick(&mut self.registry, self.tick_delta)
    }

    /// Put every body back to its initial state
    pub fn reset(&mut self) -> usize {
        self.driver.reset(&mut self.registry, &self.rest)
    }
}

fn build_parameters(p: &ParametersConfig) -> Result<SimulationConfig, ConfigError> {
    let mut cfg = SimulationConfig::default();
    if let Some(g) = p.g {
        cfg.set_g(g)?;
    }
    if let Some(s) = p.softening {
        cfg.set_softening(s)?;
    }
    if let Some(a) = p.max_acceleration {
        cfg.set_max_acceleration(a)?;
    }
    if let Some(v) = p.max_velocity {
        cfg.set_max_velocity(v)?;
    }
    if let Some(enabled) = p.remove_com_drift {
        cfg.set_remove_com_drift(enabled);
    }
    if let Some(k) = p.drift_interval {
        cfg.set_drift_interval(k)?;
    }
    if p.speed_of_light.is_some() {
        cfg.set_speed_of_light(p.speed_of_light)?;
    }
    if let Some(min) = p.min_separation {
        cfg.set_min_separation(min)?;
    }
    Ok(cfg)
}

fn build_body(index: usize, bc: &BodyConfig) -> Result<(Body, Visual), ConfigError> {
    let body = Body::new(NVec3::from(bc.x), NVec3::from(bc.v), bc.m, bc.density)?;
    let visual = Visual {
        name: bc.name.clone().unwrap_or_else(|| format!("Object_{}", index + 1)),
        mesh_id: bc.mesh_id,
    };
    Ok((body, visual))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_body_is_reported_with_index() {
        let cfg = ScenarioConfig::from_yaml_str(
            "bodies:\n  - x: [0.0, 0.0, 0.0]\n    m: 1.0\n  - x: [1.0, 0.0, 0.0]\n    m: -1.0\n",
        )
        .unwrap();

        match Scenario::build_scenario(cfg) {
            Err(ScenarioError::Body { index, source }) => {
                assert_eq!(index, 1);
                assert_eq!(source, ConfigError::NonPositiveMass(-1.0));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn negative_softening_is_rejected() {
        let cfg = ScenarioConfig::from_yaml_str("parameters:\n  softening: -1.0\n").unwrap();
        assert!(matches!(
            Scenario::build_scenario(cfg),
            Err(ScenarioError::Parameters(ConfigError::NegativeSoftening(_)))
        ));
    }

    #[test]
    fn non_positive_tick_delta_is_rejected() {
        for delta in ["0.0", "-0.01", ".nan"] {
            let cfg = ScenarioConfig::from_yaml_str(&format!("engine:\n  tick_delta: {delta}\n")).unwrap();
            assert!(
                matches!(
                    Scenario::build_scenario(cfg),
                    Err(ScenarioError::Engine(ConfigError::NonPositiveTickDelta(_)))
                ),
                "tick_delta {delta} accepted"
            );
        }
    }

    #[test]
    fn unnamed_bodies_get_default_names() {
        let cfg = ScenarioConfig::from_yaml_str(
            "bodies:\n  - x: [0.0, 0.0, 0.0]\n    m: 1.0\n  - name: Moon\n    x: [1.0, 0.0, 0.0]\n    m: 0.1\n",
        )
        .unwrap();
        let scenario = Scenario::build_scenario(cfg).unwrap();
        let names: Vec<&str> = scenario.registry.iter().map(|(_, _, v)| v.name.as_str()).collect();
        assert_eq!(names, vec!["Object_1", "Moon"]);
    }

    #[test]
    fn reset_restores_initial_state() {
        let cfg = ScenarioConfig::from_yaml_str(
            "bodies:\n  - x: [-1.0, 0.0, 0.0]\n    m: 1.0\n  - x: [1.0, 0.0, 0.0]\n    m: 1.0\n",
        )
        .unwrap();
        let mut scenario = Scenario::build_scenario(cfg).unwrap();
        let initial = scenario.registry.bodies().to_vec();

        for _ in 0..10 {
            scenario.tick();
        }
        assert_ne!(scenario.registry.bodies(), &initial[..]);

        assert_eq!(scenario.reset(), 2);
        assert_eq!(scenario.registry.bodies(), &initial[..]);
    }
}
