//! Hardware-side components.
//!
//! This module organizes everything on the hardware side of the oracle: the DUT
//! signal boundary, the banked memory, the bank routing policy, the configuration
//! register protocol and the behavioral IO controller model.

/// Behavioral device models.
pub mod devices;

/// Bank switch-select routing policy.
pub mod interconnect;

/// Banked memory store and its registered ports.
pub mod memory;

/// Configuration register protocol.
pub mod registers;

/// DUT signal boundary traits.
pub mod traits;

pub use traits::{Clocked, Dut, Signal};
