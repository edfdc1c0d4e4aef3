//! # Unit Components
//!
//! This module mirrors the crate layout: shared types, configuration, the hardware
//! side, the golden model, the oracle and the run driver.



/// Unit tests for the golden model (address generators, channel table, engine).
pub mod core;

/// Unit tests and end-to-end runs for the simulation driver.
pub mod sim;

/// Unit tests for the bank store, ports, routing policy, registers and device model.
pub mod soc;


/// Unit tests for the checking oracle.
pub mod verify;
