//! Configuration and simulation error definitions.
//!
//! This module defines the fatal error taxonomy of the oracle. It provides:
//! 1. **Configuration Errors:** Malformed scenarios (misalignment, bank oversubscription,
//!    out-of-range channels) that abort a run before any cycle is simulated.
//! 2. **Simulation Errors:** Run-level failures (cycle budget exhausted, unreadable scenario files).
//!
//! Verification mismatches are deliberately absent here: they are data, collected by
//! [`crate::verify::Oracle`] and reported at end of run.

use thiserror::Error;

use super::addr::GlbAddr;

/// Result type for oracle operations.
pub type Result<T> = std::result::Result<T, SimError>;

/// A malformed test scenario. Always fatal, always raised before simulation proceeds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A start or running address is not word-aligned.
    #[error("channel {channel}: address {addr} is not word aligned")]
    UnalignedAddress {
        /// Offending channel.
        channel: usize,
        /// Offending address.
        addr: GlbAddr,
    },

    /// A channel asked for more banks than remain after lower-numbered channels claimed theirs.
    #[error("channel {channel} cannot access {requested} banks ({available} available)")]
    BankOversubscribed {
        /// Offending channel.
        channel: usize,
        /// Banks requested.
        requested: u32,
        /// Banks still available to this channel.
        available: u32,
    },

    /// A channel id outside `0..num_channels`.
    #[error("channel {channel} out of range ({num_channels} channels configured)")]
    ChannelOutOfRange {
        /// Offending channel id.
        channel: usize,
        /// Configured channel count.
        num_channels: usize,
    },

    /// A streaming channel was configured without any banks.
    #[error("channel {channel} streams but was granted no banks")]
    NoBanksGranted {
        /// Offending channel.
        channel: usize,
    },

    /// A transfer touches more banks than the channel's span permits.
    #[error("channel {channel} touches {touched} banks but spans only {span}")]
    SpanExceeded {
        /// Offending channel.
        channel: usize,
        /// Banks the transfer would touch.
        touched: u32,
        /// Bank span configured for the channel.
        span: u32,
    },

    /// A transfer runs past the end of the global address space.
    #[error("channel {channel}: transfer of {num_words} words from {start} exceeds {limit:#x}")]
    AddressOutOfRange {
        /// Offending channel.
        channel: usize,
        /// Start address of the transfer.
        start: GlbAddr,
        /// Number of words in the transfer.
        num_words: u32,
        /// First address past the global buffer.
        limit: u64,
    },

    /// Two streaming channels touch the same bank.
    #[error("channel {channel} touches bank {bank}, already used by channel {other}")]
    BankConflict {
        /// Higher-numbered channel of the pair.
        channel: usize,
        /// Lower-numbered channel already using the bank.
        other: usize,
        /// First bank both channels touch.
        bank: u32,
    },

    /// Geometry the model cannot express.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A register id that is not part of the configuration register file.
    #[error("invalid register id {0}")]
    InvalidRegister(u32),
}

/// Errors that end a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// The scenario is malformed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The run did not complete within its cycle budget.
    #[error("run did not complete within {cycles} cycles")]
    Timeout {
        /// Cycle budget that was exhausted.
        cycles: u64,
    },

    /// A scenario description could not be decoded.
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    /// A scenario file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
