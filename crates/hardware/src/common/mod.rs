//! Common types shared throughout the global buffer oracle.
//!
//! This module provides the fundamental building blocks used by every component:
//! 1. **Address Types:** Global addresses and their bank decomposition.
//! 2. **Constants:** Word, row and stride geometry.
//! 3. **Error Handling:** Fatal configuration and run errors.
//! 4. **Stimulus:** A small seeded generator for reproducible random traffic.

/// Address type definitions (global address and bank location).
pub mod addr;

/// Geometry constants.
pub mod constants;

/// Error types.
pub mod error;

/// Seeded pseudo-random stimulus generator.
pub mod rng;

pub use addr::{BankLocation, GlbAddr};
pub use error::{ConfigError, Result, SimError};
pub use rng::XorShift;
