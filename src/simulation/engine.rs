//! Tick driver and runtime engine settings
//!
//! `Engine` selects the integration scheme and the dt ceiling. `TickDriver`
//! owns the integrator and exposes the control surface: pause/resume,
//! reset to supplied rest states, and clear.

use crate::simulation::error::ConfigError;
use crate::simulation::integrator::{Integrator, Scheme, StepReport};
use crate::simulation::params::SimulationConfig;
use crate::simulation::registry::BodyRegistry;
use crate::simulation::states::{BodyId, RestState};

/// Largest dt handed to the integrator (one 30 Hz frame)
pub const DEFAULT_MAX_DT: f64 = 1.0 / 30.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Engine {
    pub scheme: Scheme, // leapfrog or rk4
    max_dt: f64,        // frame deltas are clamped to this
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            scheme: Scheme::Leapfrog,
            max_dt: DEFAULT_MAX_DT,
        }
    }
}

impl Engine {
    pub fn new(scheme: Scheme, max_dt: f64) -> Result<Self, ConfigError> {
        let mut engine = Self {
            scheme,
            ..Self::default()
        };
        engine.set_max_dt(max_dt)?;
        Ok(engine)
    }

    pub fn max_dt(&self) -> f64 {
        self.max_dt
    }

    pub fn set_max_dt(&mut self, max_dt: f64) -> Result<(), ConfigError> {
        if !(max_dt.is_finite() && max_dt > 0.0) {
            return Err(ConfigError::NonPositiveMaxDt(max_dt));
        }
        self.max_dt = max_dt;
        Ok(())
    }

    /// dt actually integrated for a frame delta; `None` skips the tick
    pub fn clamp_dt(&self, frame_delta: f64) -> Option<f64> {
        if frame_delta.is_finite() && frame_delta > 0.0 {
            Some(frame_delta.min(self.max_dt))
        } else {
            None
        }
    }
}

/// Calls the integrator once per physics tick
#[derive(Debug)]
pub struct TickDriver {
    pub config: SimulationConfig,
    engine: Engine,
    integrator: Integrator,
    paused: bool,
}

impl TickDriver {
    pub fn new(engine: Engine, config: SimulationConfig) -> Self {
        Self {
            config,
            engine,
            integrator: Integrator::new(engine.scheme),
            paused: false,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn integrator(&self) -> &Integrator {
        &self.integrator
    }

    pub fn set_scheme(&mut self, scheme: Scheme) {
        self.engine.scheme = scheme;
        self.integrator.set_scheme(scheme);
    }

    /// Run one tick. While paused nothing is stepped, not even with dt = 0
    pub fn tick(&mut self, registry: &mut BodyRegistry, frame_delta: f64) -> Option<StepReport> {
        if self.paused {
            return None;
        }
        let dt = self.engine.clamp_dt(frame_delta)?;
        Some(self.integrator.step(registry, &self.config, dt))
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Flip the paused flag and return the new state
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Put every body with a supplied rest state back into it
    pub fn reset(&mut self, registry: &mut BodyRegistry, rest: &[(BodyId, RestState)]) -> usize {
        self.integrator.reset_counter();
        registry.reset(rest)
    }

    /// Remove every body from the registry
    pub fn clear(&mut self, registry: &mut BodyRegistry) {
        self.integrator.reset_counter();
        registry.clear();
    }
}
