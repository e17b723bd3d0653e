//! Deterministic random number generation
//!
//! Uses xorshift64* for fast, reproducible streams.
//! All randomness in the simulator (job loads, error injection) goes through
//! this module so that a seed fully determines a run.

mod xorshift;

pub use xorshift::RngManager;
