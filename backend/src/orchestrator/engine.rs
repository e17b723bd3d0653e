//! Orchestrator engine
//!
//! Wires the dispatcher, the worker pool and the shared aggregator into one
//! [`Simulation`] and turns the finished run into a [`RunReport`].

use crate::aggregator::{ResultAggregator, RunSummary};
use crate::arrivals::JobGenerator;
use crate::dispatcher::Dispatcher;
use crate::error_model::{
    ErrorFrequencyTable, ErrorModel, ErrorModelError, InjectionPolicy, TableError,
};
use crate::models::event::{EventLog, SimEvent};
use crate::models::message::Envelope;
use crate::rng::RngManager;
use crate::sim::{EngineError, EngineStats, Simulation};
use crate::worker::Worker;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::config::SchedulerConfig;

/// Stream index reserved for the dispatcher; workers use `0..W`
const DISPATCHER_STREAM: u64 = u64::MAX;

/// Errors that prevent a run from starting or finishing cleanly
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Site not found in error table: {0}")]
    SiteNotFound(String),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("Simulation engine error: {0}")]
    Engine(#[from] EngineError),

    /// Aggregated outcomes do not add up to the number of jobs
    #[error("Inconsistent results: {recorded} outcomes recorded for {expected} jobs")]
    Inconsistent { expected: u64, recorded: u64 },
}

impl From<ErrorModelError> for SimulationError {
    fn from(err: ErrorModelError) -> Self {
        match err {
            ErrorModelError::SiteNotFound(site) => SimulationError::SiteNotFound(site),
        }
    }
}

/// Everything a finished run produced
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub summary: RunSummary,
    pub stats: EngineStats,

    #[serde(skip)]
    pub events: EventLog<SimEvent>,
}

/// Single-use driver for one scheduling run
pub struct Orchestrator {
    config: SchedulerConfig,

    /// `None` when injection is disabled
    error_model: Option<Arc<ErrorModel>>,

    aggregator: Arc<ResultAggregator>,
}

impl Orchestrator {
    /// Validate `config` and prepare the error model for its site
    ///
    /// The site lookup happens even when injection is disabled so that a
    /// strict site policy rejects unknown sites before anything runs.
    pub fn new(
        config: SchedulerConfig,
        table: &ErrorFrequencyTable,
    ) -> Result<Self, SimulationError> {
        config.validate()?;

        let success_weight = config.injection.success_weight();
        let model = ErrorModel::for_site(table, &config.site, success_weight, config.site_policy)?;

        let error_model = match config.injection {
            InjectionPolicy::Disabled => None,
            InjectionPolicy::OnCompletion { .. } => Some(Arc::new(model)),
        };

        Ok(Self {
            config,
            error_model,
            aggregator: Arc::new(ResultAggregator::new()),
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn aggregator(&self) -> &Arc<ResultAggregator> {
        &self.aggregator
    }

    /// Names of the worker actors, in dispatch order
    pub fn worker_names(&self) -> Vec<String> {
        (0..self.config.num_workers)
            .map(|i| format!("worker{}", i))
            .collect()
    }

    /// Run every job to an outcome and summarize
    pub fn run(self) -> Result<RunReport, SimulationError> {
        let run_id = Uuid::new_v4();
        let root = RngManager::new(self.config.rng_seed);
        let workers = self.worker_names();

        info!(
            %run_id,
            jobs = self.config.num_jobs,
            workers = workers.len(),
            site = %self.config.site,
            seed = self.config.rng_seed,
            "Starting simulation"
        );

        let mut sim: Simulation<Envelope, SimEvent> = Simulation::new();

        for (i, name) in workers.iter().enumerate() {
            let mut worker = Worker::new(
                name.clone(),
                self.config.execution,
                Arc::clone(&self.aggregator),
                root.fork(i as u64),
            );
            if let Some(model) = &self.error_model {
                worker = worker.with_error_model(Arc::clone(model));
            }
            sim.spawn(Box::new(worker))?;
        }

        let dispatcher = Dispatcher::new(
            workers,
            self.config.num_jobs,
            JobGenerator::new(self.config.load_distribution),
            root.fork(DISPATCHER_STREAM),
        )
        .with_interval(self.config.dispatch_interval);
        sim.spawn(Box::new(dispatcher))?;

        let stats = sim.run()?;

        let expected = self.config.num_jobs as u64;
        let recorded = self.aggregator.completed();
        if recorded != expected {
            return Err(SimulationError::Inconsistent { expected, recorded });
        }

        let summary = self.aggregator.summary(expected);
        info!(
            %run_id,
            success = summary.total_success,
            failures = summary.total_failures,
            final_time = %stats.final_time,
            "Simulation finished"
        );

        Ok(RunReport {
            run_id,
            summary,
            stats,
            events: sim.into_events(),
        })
    }
}
