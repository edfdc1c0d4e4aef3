//! Simulation driver tests.

/// End-to-end scenario runs.
pub mod scenarios;
