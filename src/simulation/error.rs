//! Error types for the simulation core

use thiserror::Error;

/// A rejected configuration or body mutation
///
/// Returned by validating setters; the value being replaced is always kept
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("mass must be positive and finite, got {0}")]
    NonPositiveMass(f64),

    #[error("density must be positive and finite, got {0}")]
    NonPositiveDensity(f64),

    #[error("softening must be non-negative and finite, got {0}")]
    NegativeSoftening(f64),

    #[error("gravitational constant must be finite, got {0}")]
    InvalidGravitationalConstant(f64),

    #[error("{name} limit must be positive (infinity disables it), got {value}")]
    NonPositiveLimit { name: &'static str, value: f64 },

    #[error("drift correction interval must be at least one tick")]
    ZeroDriftInterval,

    #[error("speed of light must be positive and finite, got {0}")]
    NonPositiveSpeedOfLight(f64),

    #[error("minimum separation must be non-negative and finite, got {0}")]
    NegativeMinSeparation(f64),

    #[error("maximum timestep must be positive and finite, got {0}")]
    NonPositiveMaxDt(f64),

    #[error("tick delta must be positive and finite, got {0}")]
    NonPositiveTickDelta(f64),
}
