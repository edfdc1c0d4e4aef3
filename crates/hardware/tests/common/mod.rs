//! Shared test infrastructure.

/// Geometry, pacing and run helpers.
pub mod harness;
