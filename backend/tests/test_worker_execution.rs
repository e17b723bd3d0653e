//! Time-sliced execution and the execution ceiling

use cluster_simulator_core_rs::worker::{ExecutionPolicy, SliceStep};
use cluster_simulator_core_rs::{
    ErrorFrequencyTable, LoadDistribution, Orchestrator, SchedulerConfig, SimDuration,
};
use proptest::prelude::*;

fn secs(s: f64) -> SimDuration {
    SimDuration::from_secs_f64(s)
}

#[test]
fn test_short_job_completes_at_its_load() {
    let trace = ExecutionPolicy::default().run_to_end(secs(3.0));
    assert!(!trace.timed_out);
    assert_eq!(trace.elapsed, secs(3.0));
    assert_eq!(trace.slices, 30);
}

#[test]
fn test_just_under_ceiling_completes() {
    let trace = ExecutionPolicy::default().run_to_end(secs(9.999));
    assert!(!trace.timed_out);
    assert_eq!(trace.elapsed, secs(9.999));
}

#[test]
fn test_load_within_a_microsecond_of_ceiling_completes() {
    let policy = ExecutionPolicy::default();
    for load in [9.9999995, 9.9999997, 9.9999999999] {
        let trace = policy.run_to_end(policy.load_duration(load));
        assert!(!trace.timed_out, "load {} < 10.0 timed out", load);
    }
}

#[test]
fn test_run_with_load_just_under_ceiling_succeeds() {
    let config = SchedulerConfig::new(1, "Q")
        .with_workers(1)
        .with_load_distribution(LoadDistribution::Fixed(9.9999997));

    let report = Orchestrator::new(config, &ErrorFrequencyTable::new())
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(report.summary.total_success, 1);
    assert_eq!(report.summary.total_failures, 0);
    assert!(report.summary.histogram.is_empty());
}

#[test]
fn test_exact_ceiling_times_out() {
    let trace = ExecutionPolicy::default().run_to_end(secs(10.0));
    assert!(trace.timed_out);
    assert_eq!(trace.elapsed, secs(10.0));
}

#[test]
fn test_long_job_stops_at_ceiling() {
    let trace = ExecutionPolicy::default().run_to_end(secs(14.7));
    assert!(trace.timed_out);
    assert_eq!(trace.elapsed, secs(10.0));
    assert_eq!(trace.slices, 100);
}

#[test]
fn test_next_step_sequence() {
    let policy = ExecutionPolicy::new(SimDuration::from_millis(500), SimDuration::from_secs(1));

    assert_eq!(
        policy.next_step(secs(0.7), SimDuration::ZERO),
        SliceStep::Advance(SimDuration::from_millis(500))
    );
    assert_eq!(
        policy.next_step(secs(0.7), SimDuration::from_millis(500)),
        SliceStep::Advance(SimDuration::from_millis(200))
    );
    assert_eq!(policy.next_step(secs(0.7), secs(0.7)), SliceStep::Completed);
    assert_eq!(policy.next_step(secs(3.0), secs(1.0)), SliceStep::TimedOut);
}

#[test]
fn test_custom_ceiling() {
    let policy = ExecutionPolicy::new(SimDuration::from_millis(100), SimDuration::from_secs(2));
    assert!(policy.run_to_end(secs(2.5)).timed_out);
    assert!(!policy.run_to_end(secs(1.5)).timed_out);
}

proptest! {
    #[test]
    fn prop_timeout_iff_load_reaches_ceiling(load_micros in 1u64..20_000_000) {
        let policy = ExecutionPolicy::default();
        let load = SimDuration::from_micros(load_micros);
        let trace = policy.run_to_end(load);

        prop_assert_eq!(trace.timed_out, load >= policy.ceiling);
        if trace.timed_out {
            prop_assert_eq!(trace.elapsed, policy.ceiling);
        } else {
            prop_assert_eq!(trace.elapsed, load);
        }
    }

    #[test]
    fn prop_timeout_iff_load_secs_reaches_ceiling(load in 0.000001f64..20.0) {
        let policy = ExecutionPolicy::default();
        let trace = policy.run_to_end(policy.load_duration(load));

        prop_assert_eq!(trace.timed_out, load >= 10.0, "load {}", load);
    }

    #[test]
    fn prop_elapsed_never_overshoots(load_micros in 1u64..20_000_000, slice_ms in 1u64..2_000) {
        let policy = ExecutionPolicy::new(SimDuration::from_millis(slice_ms), SimDuration::from_secs(10));
        let trace = policy.run_to_end(SimDuration::from_micros(load_micros));

        prop_assert!(trace.elapsed <= SimDuration::from_micros(load_micros));
        prop_assert!(trace.elapsed < policy.ceiling + SimDuration::from_millis(slice_ms));
    }
}
