//! Numerical and physical parameters for the simulation
//!
//! `SimulationConfig` holds the settings the integrator reads every tick:
//! - gravitational constant and softening (`g`, `softening`),
//! - safety clamps (`max_acceleration`, `max_velocity`),
//! - center-of-mass drift removal and its interval,
//! - the post-Newtonian speed of light and the RK4 minimum pair separation
//!
//! Fields are private; setters validate and keep the previous value when
//! a new one is rejected.

use crate::simulation::error::ConfigError;

pub const DEFAULT_G: f64 = 1.0;
pub const DEFAULT_SOFTENING: f64 = 0.5;
pub const DEFAULT_MAX_ACCELERATION: f64 = 1000.0;
pub const DEFAULT_MAX_VELOCITY: f64 = 500.0;
pub const DEFAULT_DRIFT_INTERVAL: u32 = 10;
pub const DEFAULT_MIN_SEPARATION: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    g: f64,                      // gravitational constant
    softening: f64,              // added in quadrature to pair distances
    max_acceleration: f64,       // per-pair acceleration clamp
    max_velocity: f64,           // per-body speed clamp
    remove_com_drift: bool,      // periodic momentum zeroing
    drift_interval: u32,         // ticks between drift corrections
    speed_of_light: Option<f64>, // enables the post-Newtonian term (rk4)
    min_separation: f64,         // rk4 skips closer pairs
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            g: DEFAULT_G,
            softening: DEFAULT_SOFTENING,
            max_acceleration: DEFAULT_MAX_ACCELERATION,
            max_velocity: DEFAULT_MAX_VELOCITY,
            remove_com_drift: true,
            drift_interval: DEFAULT_DRIFT_INTERVAL,
            speed_of_light: None,
            min_separation: DEFAULT_MIN_SEPARATION,
        }
    }
}

impl SimulationConfig {
    /// Plain Newtonian settings: no softening, no clamps, no drift removal
    pub fn unclamped(g: f64) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        cfg.set_g(g)?;
        cfg.softening = 0.0;
        cfg.max_acceleration = f64::INFINITY;
        cfg.max_velocity = f64::INFINITY;
        cfg.remove_com_drift = false;
        Ok(cfg)
    }

    pub fn g(&self) -> f64 {
        self.g
    }

    pub fn softening(&self) -> f64 {
        self.softening
    }

    pub fn max_acceleration(&self) -> f64 {
        self.max_acceleration
    }

    pub fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    pub fn remove_com_drift(&self) -> bool {
        self.remove_com_drift
    }

    pub fn drift_interval(&self) -> u32 {
        self.drift_interval
    }

    pub fn speed_of_light(&self) -> Option<f64> {
        self.speed_of_light
    }

    pub fn min_separation(&self) -> f64 {
        self.min_separation
    }

    pub fn set_g(&mut self, g: f64) -> Result<(), ConfigError> {
        if !g.is_finite() {
            return Err(ConfigError::InvalidGravitationalConstant(g));
        }
        self.g = g;
        Ok(())
    }

    pub fn set_softening(&mut self, softening: f64) -> Result<(), ConfigError> {
        if !(softening.is_finite() && softening >= 0.0) {
            return Err(ConfigError::NegativeSoftening(softening));
        }
        self.softening = softening;
        Ok(())
    }

    /// `f64::INFINITY` disables the clamp
    pub fn set_max_acceleration(&mut self, max: f64) -> Result<(), ConfigError> {
        self.max_acceleration = check_limit("acceleration", max)?;
        Ok(())
    }

    /// `f64::INFINITY` disables the clamp
    pub fn set_max_velocity(&mut self, max: f64) -> Result<(), ConfigError> {
        self.max_velocity = check_limit("velocity", max)?;
        Ok(())
    }

    pub fn set_remove_com_drift(&mut self, enabled: bool) {
        self.remove_com_drift = enabled;
    }

    pub fn set_drift_interval(&mut self, ticks: u32) -> Result<(), ConfigError> {
        if ticks == 0 {
            return Err(ConfigError::ZeroDriftInterval);
        }
        self.drift_interval = ticks;
        Ok(())
    }

    /// `None` turns the post-Newtonian correction off
    pub fn set_speed_of_light(&mut self, c: Option<f64>) -> Result<(), ConfigError> {
        if let Some(c) = c {
            if !(c.is_finite() && c > 0.0) {
                return Err(ConfigError::NonPositiveSpeedOfLight(c));
            }
        }
        self.speed_of_light = c;
        Ok(())
    }

    pub fn set_min_separation(&mut self, min: f64) -> Result<(), ConfigError> {
        if !(min.is_finite() && min >= 0.0) {
            return Err(ConfigError::NegativeMinSeparation(min));
        }
        self.min_separation = min;
        Ok(())
    }
}

fn check_limit(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    // NaN fails the comparison
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositiveLimit { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_setters_keep_previous_values() {
        let mut cfg = SimulationConfig::default();

        assert_eq!(cfg.set_softening(-0.1), Err(ConfigError::NegativeSoftening(-0.1)));
        assert_eq!(cfg.softening(), DEFAULT_SOFTENING);

        assert!(cfg.set_max_velocity(0.0).is_err());
        assert!(cfg.set_max_acceleration(f64::NAN).is_err());
        assert_eq!(cfg.max_velocity(), DEFAULT_MAX_VELOCITY);
        assert_eq!(cfg.max_acceleration(), DEFAULT_MAX_ACCELERATION);

        assert_eq!(cfg.set_drift_interval(0), Err(ConfigError::ZeroDriftInterval));
        assert_eq!(cfg.drift_interval(), DEFAULT_DRIFT_INTERVAL);

        assert!(cfg.set_speed_of_light(Some(-1.0)).is_err());
        assert_eq!(cfg.speed_of_light(), None);

        assert!(cfg.set_g(f64::INFINITY).is_err());
        assert_eq!(cfg.g(), DEFAULT_G);
    }

    #[test]
    fn infinity_disables_clamps() {
        let mut cfg = SimulationConfig::default();
        cfg.set_max_velocity(f64::INFINITY).unwrap();
        assert!(cfg.max_velocity().is_infinite());
    }
}
