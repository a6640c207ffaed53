pub mod states;
pub mod error;
pub mod params;
pub mod registry;
pub mod forces;
pub mod stabilizers;
pub mod integrator;
pub mod diagnostics;
pub mod engine;
pub mod scenario;
