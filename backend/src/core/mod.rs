//! Core primitives shared by every simulation component

pub mod time;
