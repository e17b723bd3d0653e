//! Worker actor
//!
//! A worker owns exactly one inbox and handles one message at a time:
//!
//! ```text
//!                 Job                    load exhausted / ceiling
//! WaitingForMessage ──► Processing ──────────────────────────────┐
//!        ▲  │                                                    │
//!        │  │ Terminate                            RecordingOutcome
//!        │  ▼                                                    │
//!        │ Exited                                                │
//!        └───────────────────────────────────────────────────────┘
//! ```
//!
//! `RecordingOutcome` never spans a suspension point: the outcome is
//! decided, written to the aggregator and logged inside the resume that
//! observed the end of processing.

mod execution;

pub use execution::{ExecutionPolicy, ExecutionTrace, SliceStep};

use crate::aggregator::ResultAggregator;
use crate::core::time::SimDuration;
use crate::error_model::ErrorModel;
use crate::models::event::SimEvent;
use crate::models::job::{ErrorCode, Job, JobOutcome};
use crate::models::message::Envelope;
use crate::rng::RngManager;
use crate::sim::{Actor, Context, Yield};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Observable worker states
#[derive(Debug, Clone, PartialEq)]
pub enum WorkerState {
    /// Parked on the inbox
    WaitingForMessage,

    /// Working through a job's load
    Processing {
        job: Job,
        load: SimDuration,
        elapsed: SimDuration,
    },

    /// Received the termination signal
    Exited,
}

/// A long-lived job processor
pub struct Worker {
    name: String,
    policy: ExecutionPolicy,

    /// `None` when error injection is disabled
    error_model: Option<Arc<ErrorModel>>,

    /// Private stream for injection draws
    rng: RngManager,

    aggregator: Arc<ResultAggregator>,
    state: WorkerState,
    started: bool,
    jobs_processed: u64,
}

impl Worker {
    pub fn new(
        name: impl Into<String>,
        policy: ExecutionPolicy,
        aggregator: Arc<ResultAggregator>,
        rng: RngManager,
    ) -> Self {
        Self {
            name: name.into(),
            policy,
            error_model: None,
            rng,
            aggregator,
            state: WorkerState::WaitingForMessage,
            started: false,
            jobs_processed: 0,
        }
    }

    /// Consult `model` once for every job that finishes under the ceiling
    pub fn with_error_model(mut self, model: Arc<ErrorModel>) -> Self {
        self.error_model = Some(model);
        self
    }

    pub fn state(&self) -> &WorkerState {
        &self.state
    }

    pub fn jobs_processed(&self) -> u64 {
        self.jobs_processed
    }

    fn accept(&mut self, job: Job, ctx: &mut Context<'_, Envelope, SimEvent>) {
        info!(
            worker = %self.name,
            job = %job.id(),
            load = job.load(),
            "Received job"
        );
        ctx.log(SimEvent::JobReceived {
            time: ctx.now(),
            job_id: job.id().clone(),
            worker: self.name.clone(),
        });
        self.state = WorkerState::Processing {
            load: self.policy.load_duration(job.load()),
            job,
            elapsed: SimDuration::ZERO,
        };
    }

    fn advance(&mut self, ctx: &mut Context<'_, Envelope, SimEvent>) -> Yield {
        let step = match &self.state {
            WorkerState::Processing { load, elapsed, .. } => self.policy.next_step(*load, *elapsed),
            WorkerState::WaitingForMessage => return Yield::Receive,
            WorkerState::Exited => return Yield::Exit,
        };

        match step {
            SliceStep::Advance(duration) => {
                if let WorkerState::Processing { elapsed, .. } = &mut self.state {
                    *elapsed += duration;
                }
                Yield::Sleep(duration)
            }
            SliceStep::Completed => {
                self.finish(false, ctx);
                Yield::Receive
            }
            SliceStep::TimedOut => {
                self.finish(true, ctx);
                Yield::Receive
            }
        }
    }

    fn finish(&mut self, timed_out: bool, ctx: &mut Context<'_, Envelope, SimEvent>) {
        let (mut job, elapsed) =
            match std::mem::replace(&mut self.state, WorkerState::WaitingForMessage) {
                WorkerState::Processing { job, elapsed, .. } => (job, elapsed),
                other => {
                    self.state = other;
                    return;
                }
            };

        let outcome = if timed_out {
            warn!(
                worker = %self.name,
                job = %job.id(),
                ceiling = %self.policy.ceiling,
                "Aborting job at execution ceiling"
            );
            JobOutcome::Error(ErrorCode::Timeout)
        } else {
            match &self.error_model {
                Some(model) => model.sample(&mut self.rng).into(),
                None => JobOutcome::Success,
            }
        };

        if let Err(err) = job.resolve(outcome) {
            error!(worker = %self.name, error = %err, "Job outcome already set");
            return;
        }
        if let Err(err) = self.aggregator.record(job.outcome()) {
            error!(worker = %self.name, error = %err, "Failed to record job outcome");
            return;
        }
        self.jobs_processed += 1;

        match job.outcome() {
            JobOutcome::Error(code) => {
                info!(
                    worker = %self.name,
                    job = %job.id(),
                    code = %code,
                    "Job finished with error code"
                );
                ctx.log(SimEvent::JobFailed {
                    time: ctx.now(),
                    job_id: job.id().clone(),
                    worker: self.name.clone(),
                    code: code.clone(),
                    elapsed,
                });
            }
            _ => {
                info!(
                    worker = %self.name,
                    job = %job.id(),
                    elapsed = elapsed.as_secs_f64(),
                    "Completed job"
                );
                ctx.log(SimEvent::JobCompleted {
                    time: ctx.now(),
                    job_id: job.id().clone(),
                    worker: self.name.clone(),
                    elapsed,
                });
            }
        }
    }
}

impl Actor<Envelope, SimEvent> for Worker {
    fn name(&self) -> &str {
        &self.name
    }

    fn resume(
        &mut self,
        delivered: Option<Envelope>,
        ctx: &mut Context<'_, Envelope, SimEvent>,
    ) -> Yield {
        if !self.started {
            self.started = true;
            info!(worker = %self.name, "Starting");
            ctx.log(SimEvent::WorkerStarted {
                time: ctx.now(),
                worker: self.name.clone(),
            });
        }

        match delivered {
            Some(Envelope::Terminate) => {
                self.state = WorkerState::Exited;
                info!(worker = %self.name, "Received termination signal. Exiting.");
                ctx.log(SimEvent::WorkerExited {
                    time: ctx.now(),
                    worker: self.name.clone(),
                });
                return Yield::Exit;
            }
            Some(Envelope::Job(job)) => self.accept(job, ctx),
            None => {}
        }

        self.advance(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::SimTime;
    use crate::error_model::{ErrorFrequencyTable, SitePolicy};
    use crate::models::job::JobId;
    use crate::sim::Simulation;
    use tracing_test::traced_test;

    /// Sends a fixed batch to one worker at t=0
    struct Feeder {
        target: String,
        batch: Vec<Envelope>,
    }

    impl Actor<Envelope, SimEvent> for Feeder {
        fn name(&self) -> &str {
            "feeder"
        }

        fn resume(&mut self, _: Option<Envelope>, ctx: &mut Context<'_, Envelope, SimEvent>) -> Yield {
            for envelope in self.batch.drain(..) {
                ctx.send(self.target.clone(), envelope);
            }
            Yield::Exit
        }
    }

    fn job(i: usize, load: f64) -> Envelope {
        Envelope::Job(Job::new(JobId::from_sequence(i), load))
    }

    fn run_worker(worker: Worker, batch: Vec<Envelope>) -> Simulation<Envelope, SimEvent> {
        let target = worker.name.clone();
        let mut sim = Simulation::new();
        sim.spawn(Box::new(worker)).unwrap();
        sim.spawn(Box::new(Feeder { target, batch })).unwrap();
        sim.run().unwrap();
        sim
    }

    #[test]
    fn test_jobs_run_back_to_back() {
        let aggregator = Arc::new(ResultAggregator::new());
        let worker = Worker::new("w", ExecutionPolicy::default(), aggregator.clone(), RngManager::new(1));

        let sim = run_worker(worker, vec![job(0, 2.5), job(1, 1.0), Envelope::Terminate]);

        assert_eq!(aggregator.total_success(), 2);
        assert_eq!(sim.now(), SimTime::from_micros(3_500_000));

        let completed = sim.events().events_of_type("JobCompleted");
        assert_eq!(completed.len(), 2);
        assert_eq!(completed[0].time(), SimTime::from_micros(2_500_000));
        assert_eq!(completed[1].job_id().map(|id| id.as_str()), Some("job1"));

        let exited = sim.events().events_of_type("WorkerExited");
        assert_eq!(exited.len(), 1);
        assert_eq!(exited[0].time(), SimTime::from_micros(3_500_000));
    }

    #[traced_test]
    #[test]
    fn test_overlong_job_times_out_at_ceiling() {
        let aggregator = Arc::new(ResultAggregator::new());
        let worker = Worker::new("w", ExecutionPolicy::default(), aggregator.clone(), RngManager::new(1));

        let sim = run_worker(worker, vec![job(0, 12.0), Envelope::Terminate]);

        assert_eq!(aggregator.total_success(), 0);
        assert_eq!(aggregator.failures_for(&ErrorCode::Timeout), 1);
        match sim.events().events_of_type("JobFailed")[0] {
            SimEvent::JobFailed { time, code, elapsed, .. } => {
                assert_eq!(*code, ErrorCode::Timeout);
                assert_eq!(*elapsed, SimDuration::from_secs(10));
                assert_eq!(*time, SimTime::from_micros(10_000_000));
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(logs_contain("Aborting job at execution ceiling"));
    }

    #[test]
    fn test_injection_only_for_completed_jobs() {
        let table = ErrorFrequencyTable::new().with_site("Q", [("137", 5)]);
        let model = ErrorModel::for_site(&table, "Q", 0, SitePolicy::Degrade).unwrap();
        let aggregator = Arc::new(ResultAggregator::new());
        let worker = Worker::new("w", ExecutionPolicy::default(), aggregator.clone(), RngManager::new(3))
            .with_error_model(Arc::new(model));

        run_worker(worker, vec![job(0, 1.0), job(1, 11.0), Envelope::Terminate]);

        assert_eq!(aggregator.failures_for(&ErrorCode::historical("137")), 1);
        assert_eq!(aggregator.failures_for(&ErrorCode::Timeout), 1);
        assert_eq!(aggregator.total_success(), 0);
    }

    #[test]
    fn test_load_a_hair_under_ceiling_succeeds() {
        let aggregator = Arc::new(ResultAggregator::new());
        let worker = Worker::new("w", ExecutionPolicy::default(), aggregator.clone(), RngManager::new(1));

        run_worker(worker, vec![job(0, 9.9999997), Envelope::Terminate]);

        assert_eq!(aggregator.total_success(), 1);
        assert_eq!(aggregator.failures_for(&ErrorCode::Timeout), 0);
    }

    #[test]
    fn test_terminate_first_leaves_jobs_unprocessed() {
        let aggregator = Arc::new(ResultAggregator::new());
        let worker = Worker::new("w", ExecutionPolicy::default(), aggregator.clone(), RngManager::new(1));

        let sim = run_worker(worker, vec![Envelope::Terminate, job(0, 1.0)]);

        assert_eq!(aggregator.completed(), 0);
        assert_eq!(sim.pending_messages("w"), Some(1));
    }
}
