pub mod simulation;
pub mod configuration;
pub mod persistence;
pub mod benchmark;

pub use simulation::states::{Body, BodyId, NVec3, RestState};
pub use simulation::error::ConfigError;
pub use simulation::params::SimulationConfig;
pub use simulation::registry::{BodyRegistry, Visual};
pub use simulation::forces::{Acceleration, NewtonianGravity, PostNewtonianGravity};
#[cfg(feature = "parallel")]
pub use simulation::forces::NewtonianGravityPar;
pub use simulation::stabilizers::{clamp_magnitude, clamp_scalar, remove_drift, DriftCorrector};
pub use simulation::integrator::{leapfrog_step, rk4_step, Integrator, Scheme, StepReport};
pub use simulation::engine::{Engine, TickDriver};
pub use simulation::scenario::{Scenario, ScenarioError};

pub use configuration::config::{EngineConfig, ParametersConfig, BodyConfig, ScenarioConfig};

pub use persistence::store::{ObjectRecord, SimulationId, SimulationRecord, SimulationStore, StoreError};

pub use benchmark::benchmark::{bench_gravity, bench_leapfrog, bench_leapfrog_curve};
