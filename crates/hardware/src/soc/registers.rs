//! Configuration register protocol.
//!
//! Each IO controller exposes a small register file addressed by
//! `(register_id << feature_width) | channel`. A transaction presents the address
//! with a write or read strobe for exactly one clock cycle and then deasserts.
//!
//! # Registers
//!
//! * `0`: MODE
//! * `1`: START_ADDR
//! * `2`: NUM_WORDS
//! * `3`: START_PULSE_EN
//! * `4`: DONE_PULSE_EN
//! * `5`: SWITCH_SEL

use std::fmt;

use tracing::{debug, error};

use crate::common::ConfigError;
use crate::config::GlbConfig;
use crate::soc::traits::{Clocked, Signal};

/// Configuration register identifiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum RegisterId {
    /// Channel mode (IDLE/INSTREAM/OUTSTREAM/SRAM).
    Mode = 0,
    /// Word-aligned start address.
    StartAddr = 1,
    /// Number of words to transfer.
    NumWords = 2,
    /// Start pulse enable.
    StartPulseEn = 3,
    /// Done pulse enable.
    DonePulseEn = 4,
    /// Bank switch-select mask.
    SwitchSel = 5,
}

impl RegisterId {
    /// Every register, in address order.
    pub const ALL: [Self; 6] = [
        Self::Mode,
        Self::StartAddr,
        Self::NumWords,
        Self::StartPulseEn,
        Self::DonePulseEn,
        Self::SwitchSel,
    ];

    /// Decodes a register id.
    pub fn from_id(id: u32) -> Result<Self, ConfigError> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or(ConfigError::InvalidRegister(id))
    }

    /// Raw register id.
    pub const fn id(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mode => "MODE",
            Self::StartAddr => "START_ADDR",
            Self::NumWords => "NUM_WORDS",
            Self::StartPulseEn => "START_PULSE_EN",
            Self::DonePulseEn => "DONE_PULSE_EN",
            Self::SwitchSel => "SWITCH_SEL",
        })
    }
}

/// Encodes and decodes flat configuration addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfigAddr {
    feature_width: u32,
}

impl ConfigAddr {
    /// Creates a codec for a feature field of `feature_width` bits.
    pub const fn new(feature_width: u32) -> Self {
        Self { feature_width }
    }

    /// Composes `(register << feature_width) | channel`.
    pub const fn encode(&self, channel: usize, register: RegisterId) -> u32 {
        (register.id() << self.feature_width) | channel as u32
    }

    /// Splits a flat address into `(channel, register_id)`.
    pub const fn decode(&self, addr: u32) -> (usize, u32) {
        let channel = addr & ((1 << self.feature_width) - 1);
        (channel as usize, addr >> self.feature_width)
    }
}

/// Issues single-cycle register transactions against a clocked DUT.
#[derive(Clone, Copy, Debug)]
pub struct ConfigPort {
    addr: ConfigAddr,
    num_channels: usize,
}

impl ConfigPort {
    /// Creates a port for a geometry.
    pub const fn new(config: &GlbConfig) -> Self {
        Self {
            addr: ConfigAddr::new(config.config_feature_width),
            num_channels: config.num_channels,
        }
    }

    fn check_channel(&self, channel: usize) -> Result<(), ConfigError> {
        if channel >= self.num_channels {
            let err = ConfigError::ChannelOutOfRange {
                channel,
                num_channels: self.num_channels,
            };
            error!("{err}");
            return Err(err);
        }
        Ok(())
    }

    /// Writes `value` into `register` of `channel` in one clock cycle.
    ///
    /// # Errors
    ///
    /// `ConfigError::ChannelOutOfRange` before touching the DUT if `channel` is not configured.
    pub fn write_register<C: Clocked + ?Sized>(
        &self,
        bench: &mut C,
        channel: usize,
        register: RegisterId,
        value: u32,
    ) -> Result<(), ConfigError> {
        self.check_channel(channel)?;
        debug!("config write ch{channel} {register} <= {value:#x}");
        bench.poke(Signal::ConfigEn, 1);
        bench.poke(Signal::ConfigWr, 1);
        bench.poke(Signal::ConfigAddr, u64::from(self.addr.encode(channel, register)));
        bench.poke(Signal::ConfigWrData, u64::from(value));
        bench.tick();
        bench.poke(Signal::ConfigEn, 0);
        bench.poke(Signal::ConfigWr, 0);
        Ok(())
    }

    /// Reads `register` of `channel` in one clock cycle and returns the registered read data.
    ///
    /// `expected` is driven on the write-data bus during the read; comparing it with the
    /// returned value is left to the caller.
    ///
    /// # Errors
    ///
    /// `ConfigError::ChannelOutOfRange` if `channel` is not configured.
    pub fn read_register<C: Clocked + ?Sized>(
        &self,
        bench: &mut C,
        channel: usize,
        register: RegisterId,
        expected: u32,
    ) -> Result<u32, ConfigError> {
        self.check_channel(channel)?;
        bench.poke(Signal::ConfigEn, 1);
        bench.poke(Signal::ConfigRd, 1);
        bench.poke(Signal::ConfigAddr, u64::from(self.addr.encode(channel, register)));
        bench.poke(Signal::ConfigWrData, u64::from(expected));
        bench.tick();
        bench.poke(Signal::ConfigEn, 0);
        bench.poke(Signal::ConfigRd, 0);
        let value = bench.peek(Signal::ConfigRdData) as u32;
        debug!("config read ch{channel} {register} = {value:#x} (expected {expected:#x})");
        Ok(value)
    }
}
