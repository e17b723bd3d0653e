use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use cluster_simulator_core_rs::{
    ErrorFrequencyTable, InjectionPolicy, Orchestrator, SchedulerConfig, SitePolicy,
};

#[derive(Parser, Debug)]
#[command(name = "cluster-sim")]
#[command(version)]
#[command(about = "Simulate a job scheduler driven by historical error frequencies")]
struct Args {
    /// JSON file mapping site name to error code occurrence counts
    #[arg(long)]
    input: PathBuf,

    /// Number of jobs to dispatch
    #[arg(long = "n")]
    num_jobs: usize,

    /// Site (queue) whose error profile is used
    #[arg(long)]
    queue: String,

    /// Size of the worker pool
    #[arg(long, default_value_t = cluster_simulator_core_rs::orchestrator::DEFAULT_NUM_WORKERS)]
    workers: usize,

    /// RNG seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Weight of success when drawing an outcome for a completed job.
    /// Enables error injection from the historical table.
    #[arg(long)]
    success_weight: Option<u64>,

    /// Fail when the queue is missing from the input table
    #[arg(long)]
    strict_site: bool,

    /// Only log errors
    #[arg(long)]
    mute: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn scheduler_config(&self, seed: u64) -> SchedulerConfig {
        let injection = match self.success_weight {
            Some(success_weight) => InjectionPolicy::OnCompletion { success_weight },
            None => InjectionPolicy::Disabled,
        };
        let site_policy = if self.strict_site {
            SitePolicy::Strict
        } else {
            SitePolicy::Degrade
        };

        SchedulerConfig::new(self.num_jobs, self.queue.clone())
            .with_workers(self.workers)
            .with_seed(seed)
            .with_injection(injection)
            .with_site_policy(site_policy)
    }
}

/// Notice printed when the queue has no entry in the error table
///
/// Goes to stdout with the report so it is visible under `--mute`.
fn missing_site_notice(table: &ErrorFrequencyTable, queue: &str) -> Option<String> {
    if table.contains_site(queue) {
        None
    } else {
        Some(format!("Site not found: {}", queue))
    }
}

fn init_logging(mute: bool) {
    let default_level = if mute { "error" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<()> {
    println!("Input File: {}", args.input.display());
    println!("Number of jobs: {}", args.num_jobs);
    println!("Queue Name: {}", args.queue);

    let table = ErrorFrequencyTable::from_path(&args.input)
        .with_context(|| format!("Could not load error table from {}", args.input.display()))?;
    if let Some(notice) = missing_site_notice(&table, &args.queue) {
        println!("{}", notice);
    }

    let seed = args.seed.unwrap_or_else(|| Uuid::new_v4().as_u128() as u64);
    let config = args.scheduler_config(seed);

    let report = Orchestrator::new(config, &table)
        .context("Invalid simulation configuration")?
        .run()
        .context("Simulation failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
        println!("{}", json);
    } else {
        println!("\n{}\n", report.summary);
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(args.mute);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_flags() {
        let args = Args::try_parse_from(["cluster-sim", "--input", "errors.json", "--n", "20", "--queue", "Q"]);
        let args = args.unwrap();
        assert_eq!(args.num_jobs, 20);
        assert_eq!(args.workers, 20);
        assert!(args.seed.is_none());
        assert!(!args.json);
    }

    #[test]
    fn test_missing_queue_is_rejected() {
        let result = Args::try_parse_from(["cluster-sim", "--input", "errors.json", "--n", "20"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_job_count_is_rejected() {
        let result =
            Args::try_parse_from(["cluster-sim", "--input", "e.json", "--n", "-3", "--queue", "Q"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_success_weight_enables_injection() {
        let args = Args::try_parse_from([
            "cluster-sim",
            "--input",
            "e.json",
            "--n",
            "5",
            "--queue",
            "Q",
            "--success-weight",
            "9",
            "--strict-site",
        ])
        .unwrap();
        let config = args.scheduler_config(7);
        assert_eq!(config.injection, InjectionPolicy::OnCompletion { success_weight: 9 });
        assert_eq!(config.site_policy, SitePolicy::Strict);
        assert_eq!(config.rng_seed, 7);
    }

    #[test]
    fn test_missing_site_notice() {
        let table = ErrorFrequencyTable::new().with_site("Q", [("137", 1)]);

        assert_eq!(missing_site_notice(&table, "Q"), None);
        assert_eq!(
            missing_site_notice(&table, "ELSEWHERE").as_deref(),
            Some("Site not found: ELSEWHERE")
        );
    }

    #[test]
    fn test_mute_does_not_suppress_missing_site_notice() {
        let args = Args::try_parse_from([
            "cluster-sim", "--input", "e.json", "--n", "1", "--queue", "ELSEWHERE", "--mute",
        ])
        .unwrap();
        assert!(args.mute);

        let notice = missing_site_notice(&ErrorFrequencyTable::new(), &args.queue);
        assert_eq!(notice.as_deref(), Some("Site not found: ELSEWHERE"));
    }

    #[test]
    fn test_injection_disabled_by_default() {
        let args = Args::try_parse_from(["cluster-sim", "--input", "e.json", "--n", "5", "--queue", "Q"])
            .unwrap();
        assert_eq!(args.scheduler_config(1).injection, InjectionPolicy::Disabled);
    }
}
