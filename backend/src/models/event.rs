//! Event logging for simulation replay and auditing.
//!
//! Every significant step of a run is captured as a [`SimEvent`] stamped
//! with the simulated time at which it happened. The log lets tests and
//! tooling check dispatch order, per-inbox FIFO delivery and outcomes
//! without scraping log output.
//!
//! # Example
//!
//! ```rust
//! use cluster_simulator_core_rs::models::{EventLog, JobId, SimEvent};
//! use cluster_simulator_core_rs::SimTime;
//!
//! let mut log = EventLog::new();
//! log.log(SimEvent::JobDispatched {
//!     time: SimTime::START,
//!     job_id: JobId::from_sequence(0),
//!     worker: "worker0".to_string(),
//!     load: 3.5,
//! });
//!
//! assert_eq!(log.events_for_worker("worker0").len(), 1);
//! ```

use crate::core::time::{SimDuration, SimTime};
use crate::models::job::{ErrorCode, JobId};

/// Simulation event capturing a state change.
///
/// Events are logged in the order the engine executes them, which is the
/// simulated-time order.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// Worker actor started and is waiting on its inbox
    WorkerStarted { time: SimTime, worker: String },

    /// Dispatcher placed a job in a worker's inbox
    JobDispatched {
        time: SimTime,
        job_id: JobId,
        worker: String,
        load: f64,
    },

    /// Dispatcher placed the termination signal in a worker's inbox
    TerminationSent { time: SimTime, worker: String },

    /// Worker took a job out of its inbox
    JobReceived {
        time: SimTime,
        job_id: JobId,
        worker: String,
    },

    /// Job finished under the ceiling with no injected error
    JobCompleted {
        time: SimTime,
        job_id: JobId,
        worker: String,
        elapsed: SimDuration,
    },

    /// Job timed out or drew a historical error
    JobFailed {
        time: SimTime,
        job_id: JobId,
        worker: String,
        code: ErrorCode,
        elapsed: SimDuration,
    },

    /// Worker received the termination signal and left its loop
    WorkerExited { time: SimTime, worker: String },
}

impl SimEvent {
    /// Simulated time when this event occurred
    pub fn time(&self) -> SimTime {
        match self {
            SimEvent::WorkerStarted { time, .. } => *time,
            SimEvent::JobDispatched { time, .. } => *time,
            SimEvent::TerminationSent { time, .. } => *time,
            SimEvent::JobReceived { time, .. } => *time,
            SimEvent::JobCompleted { time, .. } => *time,
            SimEvent::JobFailed { time, .. } => *time,
            SimEvent::WorkerExited { time, .. } => *time,
        }
    }

    /// Short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            SimEvent::WorkerStarted { .. } => "WorkerStarted",
            SimEvent::JobDispatched { .. } => "JobDispatched",
            SimEvent::TerminationSent { .. } => "TerminationSent",
            SimEvent::JobReceived { .. } => "JobReceived",
            SimEvent::JobCompleted { .. } => "JobCompleted",
            SimEvent::JobFailed { .. } => "JobFailed",
            SimEvent::WorkerExited { .. } => "WorkerExited",
        }
    }

    /// Worker the event concerns (every event names one)
    pub fn worker(&self) -> &str {
        match self {
            SimEvent::WorkerStarted { worker, .. }
            | SimEvent::JobDispatched { worker, .. }
            | SimEvent::TerminationSent { worker, .. }
            | SimEvent::JobReceived { worker, .. }
            | SimEvent::JobCompleted { worker, .. }
            | SimEvent::JobFailed { worker, .. }
            | SimEvent::WorkerExited { worker, .. } => worker,
        }
    }

    /// Job ID if the event relates to a specific job
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            SimEvent::JobDispatched { job_id, .. } => Some(job_id),
            SimEvent::JobReceived { job_id, .. } => Some(job_id),
            SimEvent::JobCompleted { job_id, .. } => Some(job_id),
            SimEvent::JobFailed { job_id, .. } => Some(job_id),
            _ => None,
        }
    }
}

/// Append-only event log.
///
/// A thin wrapper around `Vec<E>`; the simulation engine is generic over
/// the event type, the scheduler uses [`SimEvent`].
#[derive(Debug, Clone)]
pub struct EventLog<E = SimEvent> {
    events: Vec<E>,
}

impl<E> Default for EventLog<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> EventLog<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, event: E) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[E] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.events.iter()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventLog<SimEvent> {
    /// Events of a specific type, in log order
    pub fn events_of_type(&self, event_type: &str) -> Vec<&SimEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Events concerning a specific worker, in log order
    pub fn events_for_worker(&self, worker: &str) -> Vec<&SimEvent> {
        self.events.iter().filter(|e| e.worker() == worker).collect()
    }

    /// Events concerning a specific job, in log order
    pub fn events_for_job(&self, job_id: &str) -> Vec<&SimEvent> {
        self.events
            .iter()
            .filter(|e| e.job_id().map(JobId::as_str) == Some(job_id))
            .collect()
    }
}
