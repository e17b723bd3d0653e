//! Round-robin job dispatcher
//!
//! Generates `num_jobs` jobs and places job `i` in the inbox of worker
//! `i mod W`. Once every job is out, one termination signal goes to each
//! worker in index order. Each worker therefore sees its jobs in
//! generation order with the sentinel last.

use crate::arrivals::JobGenerator;
use crate::core::time::SimDuration;
use crate::models::event::SimEvent;
use crate::models::message::Envelope;
use crate::rng::RngManager;
use crate::sim::{Actor, Context, Yield};
use tracing::info;

/// Actor name of the dispatcher
pub const DISPATCHER_NAME: &str = "dispatcher";

/// Index of the worker that receives job `seq`
///
/// # Panics
///
/// Panics if `num_workers` is zero.
pub fn round_robin_target(seq: usize, num_workers: usize) -> usize {
    assert!(num_workers > 0, "at least one worker is required");
    seq % num_workers
}

/// Number of jobs worker `index` receives out of `num_jobs`
///
/// # Panics
///
/// Panics if `num_workers` is zero.
pub fn jobs_for_worker(index: usize, num_jobs: usize, num_workers: usize) -> usize {
    assert!(num_workers > 0, "at least one worker is required");
    if index >= num_jobs {
        0
    } else {
        (num_jobs - index + num_workers - 1) / num_workers
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Jobs,
    Terminating { next: usize },
    Done,
}

/// Producer actor feeding every worker inbox
pub struct Dispatcher {
    workers: Vec<String>,
    num_jobs: usize,
    generator: JobGenerator,
    rng: RngManager,

    /// Simulated pause between consecutive sends
    interval: SimDuration,

    phase: Phase,
}

impl Dispatcher {
    pub fn new(
        workers: Vec<String>,
        num_jobs: usize,
        generator: JobGenerator,
        rng: RngManager,
    ) -> Self {
        Self {
            workers,
            num_jobs,
            generator,
            rng,
            interval: SimDuration::ZERO,
            phase: Phase::Jobs,
        }
    }

    pub fn with_interval(mut self, interval: SimDuration) -> Self {
        self.interval = interval;
        self
    }

    pub fn jobs_dispatched(&self) -> usize {
        self.generator.generated()
    }

    fn after_send(&self) -> Yield {
        if self.phase == Phase::Done {
            Yield::Exit
        } else {
            Yield::Sleep(self.interval)
        }
    }

    fn dispatch_job(&mut self, ctx: &mut Context<'_, Envelope, SimEvent>) {
        let job = self.generator.next_job(&mut self.rng);
        let seq = self.generator.generated() - 1;
        let worker = self.workers[round_robin_target(seq, self.workers.len())].clone();

        info!(job = %job.id(), worker = %worker, load = job.load(), "Dispatching job");
        ctx.log(SimEvent::JobDispatched {
            time: ctx.now(),
            job_id: job.id().clone(),
            worker: worker.clone(),
            load: job.load(),
        });
        ctx.send(worker, Envelope::Job(job));

        if self.generator.generated() >= self.num_jobs {
            self.phase = Phase::Terminating { next: 0 };
        }
    }

    fn dispatch_termination(&mut self, index: usize, ctx: &mut Context<'_, Envelope, SimEvent>) {
        let worker = self.workers[index].clone();
        ctx.log(SimEvent::TerminationSent {
            time: ctx.now(),
            worker: worker.clone(),
        });
        ctx.send(worker, Envelope::Terminate);

        self.phase = if index + 1 < self.workers.len() {
            Phase::Terminating { next: index + 1 }
        } else {
            Phase::Done
        };
    }
}

impl Actor<Envelope, SimEvent> for Dispatcher {
    fn name(&self) -> &str {
        DISPATCHER_NAME
    }

    fn resume(
        &mut self,
        _delivered: Option<Envelope>,
        ctx: &mut Context<'_, Envelope, SimEvent>,
    ) -> Yield {
        if self.phase == Phase::Jobs && self.num_jobs == 0 {
            self.phase = Phase::Terminating { next: 0 };
        }
        if matches!(self.phase, Phase::Terminating { .. }) && self.workers.is_empty() {
            self.phase = Phase::Done;
        }

        match self.phase {
            Phase::Jobs => self.dispatch_job(ctx),
            Phase::Terminating { next } => {
                if next == 0 {
                    info!(workers = self.workers.len(), "All jobs dispatched; sending termination signals");
                }
                self.dispatch_termination(next, ctx);
            }
            Phase::Done => return Yield::Exit,
        }

        self.after_send()
    }
}
