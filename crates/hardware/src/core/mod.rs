//! Golden model.
//!
//! This module contains the software replica of the IO controllers: the per-channel
//! address generator state machine, the validated channel table and the streaming
//! engine that advances them in lockstep with the DUT.

/// Per-channel address generator state machine.
pub mod addrgen;

/// Streaming engine driving the fabric side and stepping the golden model.
pub mod engine;

/// Validated channel table.
pub mod io_ctrl;

pub use addrgen::{AddrGen, ChannelState, Mode, Transfer};
pub use engine::{StreamingEngine, Stimulus};
pub use io_ctrl::IoCtrl;
