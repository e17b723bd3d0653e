//! Tests for simulated time

use cluster_simulator_core_rs::{SimClock, SimDuration, SimTime};

#[test]
fn test_clock_starts_at_zero() {
    let clock = SimClock::new();
    assert_eq!(clock.now(), SimTime::START);
    assert_eq!(clock.now().as_secs_f64(), 0.0);
}

#[test]
fn test_advance_accumulates() {
    let mut clock = SimClock::new();

    clock.advance(SimDuration::from_millis(100));
    clock.advance(SimDuration::from_millis(250));

    assert_eq!(clock.now().as_micros(), 350_000);
}

#[test]
fn test_advance_to_same_instant_is_allowed() {
    let mut clock = SimClock::new();
    clock.advance_to(SimTime::from_micros(5));
    clock.advance_to(SimTime::from_micros(5));
    assert_eq!(clock.now().as_micros(), 5);
}

#[test]
fn test_hundred_slices_equal_ten_seconds() {
    let slice = SimDuration::from_secs_f64(0.1);
    let mut total = SimDuration::ZERO;
    for _ in 0..100 {
        total += slice;
    }
    assert_eq!(total, SimDuration::from_secs(10));
    assert_eq!(slice * 100, SimDuration::from_secs(10));
}

#[test]
fn test_from_secs_f64_rounds_to_micro() {
    assert_eq!(SimDuration::from_secs_f64(0.0000004).as_micros(), 0);
    assert_eq!(SimDuration::from_secs_f64(0.0000006).as_micros(), 1);
    assert_eq!(SimDuration::from_secs_f64(9.95).as_micros(), 9_950_000);
}

#[test]
fn test_duration_since() {
    let start = SimTime::from_micros(1_000_000);
    let later = start + SimDuration::from_millis(1_500);
    assert_eq!(later.duration_since(start), SimDuration::from_millis(1_500));
    assert_eq!(later - start, SimDuration::from_millis(1_500));
}

#[test]
fn test_saturating_sub_floors_at_zero() {
    let short = SimDuration::from_millis(100);
    let long = SimDuration::from_secs(1);
    assert!(short.saturating_sub(long).is_zero());
    assert_eq!(long.saturating_sub(short), SimDuration::from_millis(900));
}

#[test]
fn test_display_in_seconds() {
    assert_eq!(SimDuration::from_millis(2_500).to_string(), "2.500000s");
    assert_eq!(SimTime::from_micros(100).to_string(), "0.000100");
}
