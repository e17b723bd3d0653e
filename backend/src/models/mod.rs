//! Domain models for the cluster scheduler

pub mod event;
pub mod job;
pub mod message;

// Re-exports
pub use event::{EventLog, SimEvent};
pub use job::{ErrorCode, Job, JobError, JobId, JobOutcome};
pub use message::Envelope;
