//! Verification: expectations, mismatches and the checking oracle.
//!
//! The streaming engine produces `Expectation`s; the `Oracle` compares them, the
//! serviced bank traffic, the register read-back and the final memory image against
//! the DUT and accumulates `Mismatch` records into a `RunReport`.

/// Checking oracle and its records.
pub mod oracle;

pub use oracle::{Expectation, Mismatch, MismatchKind, Oracle, RunReport, Target, Verdict};
