//! Simulation driver.
//!
//! Wires a DUT to its memory stub, runs the golden model alongside it and collects
//! the verdict.

/// Built-in scenarios.
pub mod scenario;

/// Phase-by-phase oracle run.
pub mod simulator;

/// DUT plus memory stub, advanced one clock at a time.
pub mod testbench;

pub use scenario::Scenario;
pub use simulator::Simulator;
pub use testbench::Testbench;
