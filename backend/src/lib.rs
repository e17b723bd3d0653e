//! Cluster Simulator Core - Rust Engine
//!
//! Deterministic simulation of a job scheduler: a dispatcher deals jobs
//! round-robin to a pool of workers, each worker runs its job in fixed time
//! slices under an execution ceiling, and a shared aggregator tallies
//! successes and failures by error code.
//!
//! # Architecture
//!
//! - **core**: Simulated time (integer microseconds)
//! - **rng**: Deterministic random number generation
//! - **sim**: Discrete-event engine with named mailboxes
//! - **models**: Domain types (Job, ErrorCode, Envelope, SimEvent)
//! - **error_model**: Historical error table and weighted sampler
//! - **arrivals**: Job generation
//! - **dispatcher**: Round-robin producer
//! - **worker**: Time-sliced job execution
//! - **aggregator**: Shared outcome counters and run summary
//! - **orchestrator**: Configuration and run driver
//!
//! # Critical Invariants
//!
//! 1. Every dispatched job gets exactly one outcome
//! 2. All randomness is deterministic (seeded RNG)
//! 3. A job whose load reaches the execution ceiling times out

// Module declarations
pub mod aggregator;
pub mod arrivals;
pub mod core;
pub mod dispatcher;
pub mod error_model;
pub mod models;
pub mod orchestrator;
pub mod rng;
pub mod sim;
pub mod worker;

// Re-exports for convenience
pub use crate::core::time::{SimClock, SimDuration, SimTime};
pub use aggregator::{ResultAggregator, RunSummary};
pub use arrivals::{JobGenerator, LoadDistribution};
pub use dispatcher::{round_robin_target, Dispatcher};
pub use error_model::{
    ErrorFrequencyTable, ErrorModel, ErrorModelError, InjectionPolicy, SitePolicy, TableError,
};
pub use models::{
    event::{EventLog, SimEvent},
    job::{ErrorCode, Job, JobError, JobId, JobOutcome},
    message::Envelope,
};
pub use orchestrator::{Orchestrator, RunReport, SchedulerConfig, SimulationError};
pub use rng::RngManager;
pub use sim::{EngineError, EngineStats, Simulation};
pub use worker::{ExecutionPolicy, Worker};
