//! Global buffer verification oracle.
//!
//! This crate checks a multi-bank global buffer and its streaming IO controllers
//! against a cycle-accurate golden model:
//! 1. **Memory:** Banked word storage with masked row writes and registered reads.
//! 2. **Routing:** The switch-select policy granting contiguous bank runs to channels.
//! 3. **Golden model:** Per-channel address generators stepped in lockstep with the DUT.
//! 4. **Checking:** Per-cycle output comparison, bank-write checks, register read-back
//!    and an end-of-run memory sweep, collected into a pass/fail report.
//! 5. **Simulation:** The DUT signal boundary, a behavioral IO controller model and the
//!    phase-by-phase run driver.
//!
//! # Example
//!
//! ```
//! use glbsim_core::config::GlbConfig;
//! use glbsim_core::sim::{Scenario, Simulator};
//! use glbsim_core::soc::devices::IoControllerModel;
//!
//! let glb = GlbConfig::default().with_bank_addr_width(12);
//! let config = Scenario::Instream.config(glb).unwrap();
//! let dut = IoControllerModel::new(&config.glb);
//! let report = Simulator::new(&config, dut).unwrap().run().unwrap();
//! assert!(report.passed());
//! ```

/// Common types and constants (addresses, errors, stimulus generator).
pub mod common;
/// Run configuration (geometry, pacing, channel table).
pub mod config;
/// Golden model (address generators, channel table, streaming engine).
pub mod core;
/// Run driver (testbench, simulator, scenarios).
pub mod sim;
/// Hardware side (signals, memory, routing, registers, device model).
pub mod soc;
/// Run statistics.
pub mod stats;
/// Checking oracle and run report.
pub mod verify;

/// Root configuration type; use `Config::default()` or decode from JSON.
pub use crate::config::Config;
/// Top-level run driver.
pub use crate::sim::Simulator;
/// End-of-run verdict and diagnostics.
pub use crate::verify::RunReport;
