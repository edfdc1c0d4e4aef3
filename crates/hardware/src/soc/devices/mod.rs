//! Device models.
//!
//! Implementations of [`Dut`](crate::soc::traits::Dut) that run without an RTL simulator.

/// Behavioral IO controller array.
pub mod io_controller;

pub use io_controller::{Fault, IoControllerModel};
