//! Inbox messages
//!
//! Termination is its own variant, so no job name is reserved and workers
//! never compare strings to decide whether to stop.

use crate::models::job::Job;

/// A message delivered to a worker inbox
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// A real job; ownership moves to the receiving worker
    Job(Job),

    /// Sent once per worker after every job has been dispatched
    Terminate,
}

impl Envelope {
    pub fn is_terminate(&self) -> bool {
        matches!(self, Envelope::Terminate)
    }
}

impl From<Job> for Envelope {
    fn from(job: Job) -> Self {
        Envelope::Job(job)
    }
}
