//! Orchestrator - configures and drives one scheduling run
//!
//! See `engine.rs` for the run itself and `config.rs` for its inputs.

pub mod config;
pub mod engine;

pub use config::{SchedulerConfig, DEFAULT_NUM_WORKERS};
pub use engine::{Orchestrator, RunReport, SimulationError};
