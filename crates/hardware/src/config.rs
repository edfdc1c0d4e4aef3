//! Configuration system for the global buffer oracle.
//!
//! This module defines the configuration structures used to parameterize a run. It provides:
//! 1. **Defaults:** Baseline global buffer geometry and run pacing constants.
//! 2. **Structures:** Geometry (`GlbConfig`), run pacing and stimulus (`RunConfig`) and the
//!    per-channel scenario table (`ChannelSpec`).
//! 3. **Loading:** JSON decoding from a string or a file.
//!
//! Use `Config::default()` for the reference geometry with an empty channel table, or
//! decode a scenario from JSON.

use std::path::Path;

use serde::Deserialize;

use crate::common::constants::{MAX_STORE_WORDS, ROW_BITS, WORD_BITS};
use crate::common::{ConfigError, GlbAddr, Result};
use crate::core::addrgen::Mode;

/// Default configuration constants.
///
/// These reproduce the reference global buffer: 32 banks of 128 KiB served by
/// 8 IO controllers, 64-bit bank rows and 16-bit fabric words.
mod defaults {
    /// Number of memory banks.
    pub const NUM_BANKS: usize = 32;

    /// Number of IO controller channels.
    pub const NUM_CHANNELS: usize = 8;

    /// Address bits covered by one bank (128 KiB).
    pub const BANK_ADDR_WIDTH: u32 = 17;

    /// Width of one bank row in bits.
    pub const BANK_DATA_WIDTH: u32 = 64;

    /// Width of one fabric word in bits.
    pub const CGRA_DATA_WIDTH: u32 = 16;

    /// Bits of the configuration address that select the channel.
    pub const CONFIG_FEATURE_WIDTH: u32 = 8;

    /// Bits of the configuration address that select the register.
    pub const CONFIG_REG_WIDTH: u32 = 8;

    /// Idle cycles between configuration and the start pulse.
    pub const SETTLE_CYCLES: u64 = 100;

    /// Cycles the fabric waits after the start pulse before producing writes.
    pub const APP_LATENCY: u64 = 100;

    /// Idle cycles checked after every channel has completed.
    pub const DRAIN_CYCLES: u64 = 100;

    /// Cycle budget for the streaming phase.
    pub const MAX_CYCLES: u64 = 1_000_000;

    /// Probability (percent) that the fabric presents a write on a given cycle.
    pub const WR_EN_PERCENT: u8 = 50;

    /// Stimulus seed.
    pub const SEED: u64 = 0x5EED_0F_61B;

    /// Mismatch records kept in the report; the rest are only counted.
    pub const MAX_REPORTED: usize = 64;
}

/// Global buffer geometry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GlbConfig {
    /// Number of memory banks.
    #[serde(default = "GlbConfig::default_num_banks")]
    pub num_banks: usize,
    /// Number of IO controller channels.
    #[serde(default = "GlbConfig::default_num_channels")]
    pub num_channels: usize,
    /// Address bits covered by one bank.
    #[serde(default = "GlbConfig::default_bank_addr_width")]
    pub bank_addr_width: u32,
    /// Bank row width in bits.
    #[serde(default = "GlbConfig::default_bank_data_width")]
    pub bank_data_width: u32,
    /// Fabric word width in bits.
    #[serde(default = "GlbConfig::default_cgra_data_width")]
    pub cgra_data_width: u32,
    /// Channel-select bits of a configuration address.
    #[serde(default = "GlbConfig::default_config_feature_width")]
    pub config_feature_width: u32,
    /// Register-select bits of a configuration address.
    #[serde(default = "GlbConfig::default_config_reg_width")]
    pub config_reg_width: u32,
}

impl GlbConfig {
    const fn default_num_banks() -> usize {
        defaults::NUM_BANKS
    }
    const fn default_num_channels() -> usize {
        defaults::NUM_CHANNELS
    }
    const fn default_bank_addr_width() -> u32 {
        defaults::BANK_ADDR_WIDTH
    }
    const fn default_bank_data_width() -> u32 {
        defaults::BANK_DATA_WIDTH
    }
    const fn default_cgra_data_width() -> u32 {
        defaults::CGRA_DATA_WIDTH
    }
    const fn default_config_feature_width() -> u32 {
        defaults::CONFIG_FEATURE_WIDTH
    }
    const fn default_config_reg_width() -> u32 {
        defaults::CONFIG_REG_WIDTH
    }

    /// Returns a copy with a different bank address width.
    #[must_use]
    pub const fn with_bank_addr_width(mut self, bank_addr_width: u32) -> Self {
        self.bank_addr_width = bank_addr_width;
        self
    }

    /// Number of banks in each channel's home group (the width of a switch-select mask).
    pub const fn banks_per_channel(&self) -> usize {
        self.num_banks / self.num_channels
    }

    /// Number of fabric words held by one bank.
    pub const fn words_per_bank(&self) -> usize {
        1 << (self.bank_addr_width - 1)
    }

    /// Size of the global address space in bytes.
    pub const fn address_limit(&self) -> u64 {
        (self.num_banks as u64) << self.bank_addr_width
    }

    /// Checks that the geometry is one the model can express.
    ///
    /// # Returns
    ///
    /// `Ok(())`, or `ConfigError::InvalidGeometry` describing the first problem found.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.cgra_data_width != WORD_BITS || self.bank_data_width != ROW_BITS {
            return Err(ConfigError::InvalidGeometry(format!(
                "data widths {}/{} unsupported (expected {}/{})",
                self.bank_data_width, self.cgra_data_width, ROW_BITS, WORD_BITS
            )));
        }
        if self.num_channels == 0 || self.num_banks == 0 || self.num_banks % self.num_channels != 0 {
            return Err(ConfigError::InvalidGeometry(format!(
                "{} banks cannot be split evenly across {} channels",
                self.num_banks, self.num_channels
            )));
        }
        if self.banks_per_channel() > 32 {
            return Err(ConfigError::InvalidGeometry(format!(
                "{} banks per channel do not fit a 32-bit switch-select mask",
                self.banks_per_channel()
            )));
        }
        if !(4..=30).contains(&self.bank_addr_width) {
            return Err(ConfigError::InvalidGeometry(format!(
                "bank address width {} outside 4..=30",
                self.bank_addr_width
            )));
        }
        if self.num_banks.saturating_mul(self.words_per_bank()) > MAX_STORE_WORDS {
            return Err(ConfigError::InvalidGeometry(format!(
                "{} banks of {} words exceed the {MAX_STORE_WORDS}-word store limit",
                self.num_banks,
                self.words_per_bank()
            )));
        }
        if self.address_limit() > u64::from(u32::MAX) + 1 {
            return Err(ConfigError::InvalidGeometry(format!(
                "{} banks of 2^{} bytes overflow a 32-bit address",
                self.num_banks, self.bank_addr_width
            )));
        }
        if self.config_feature_width >= 32
            || self.num_channels > (1usize << self.config_feature_width)
        {
            return Err(ConfigError::InvalidGeometry(format!(
                "{} channels do not fit a {}-bit feature field",
                self.num_channels, self.config_feature_width
            )));
        }
        if self.config_feature_width + self.config_reg_width > 32 {
            return Err(ConfigError::InvalidGeometry(format!(
                "configuration address of {} bits exceeds 32",
                self.config_feature_width + self.config_reg_width
            )));
        }
        Ok(())
    }
}

impl Default for GlbConfig {
    fn default() -> Self {
        Self {
            num_banks: defaults::NUM_BANKS,
            num_channels: defaults::NUM_CHANNELS,
            bank_addr_width: defaults::BANK_ADDR_WIDTH,
            bank_data_width: defaults::BANK_DATA_WIDTH,
            cgra_data_width: defaults::CGRA_DATA_WIDTH,
            config_feature_width: defaults::CONFIG_FEATURE_WIDTH,
            config_reg_width: defaults::CONFIG_REG_WIDTH,
        }
    }
}

/// Backpressure pattern driven onto the shared stall line during streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum StallPolicy {
    /// The stall line is never asserted.
    #[default]
    Never,
    /// Each streaming cycle is stalled with the given probability.
    Random {
        /// Stall probability in percent.
        percent: u8,
    },
    /// A single burst of `len` stalled cycles starting `start` cycles into streaming.
    Burst {
        /// Streaming cycle at which the burst begins.
        start: u64,
        /// Number of consecutive stalled cycles.
        len: u64,
    },
}

/// Initial contents of the banked memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum MemoryFill {
    /// Every word holds its own index within the bank.
    #[default]
    Index,
    /// Pseudo-random words derived from the run seed.
    Random,
}

/// Run pacing, stimulus and reporting settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunConfig {
    /// Stimulus seed; the same seed reproduces the same run.
    #[serde(default = "RunConfig::default_seed")]
    pub seed: u64,
    /// Idle cycles between configuration and the start pulse.
    #[serde(default = "RunConfig::default_settle_cycles")]
    pub settle_cycles: u64,
    /// Cycles after the start pulse before the fabric begins writing.
    #[serde(default = "RunConfig::default_app_latency")]
    pub app_latency: u64,
    /// Idle cycles checked after completion.
    #[serde(default = "RunConfig::default_drain_cycles")]
    pub drain_cycles: u64,
    /// Cycle budget for the streaming phase.
    #[serde(default = "RunConfig::default_max_cycles")]
    pub max_cycles: u64,
    /// Probability (percent) that the fabric presents a write on a cycle.
    #[serde(default = "RunConfig::default_wr_en_percent")]
    pub wr_en_percent: u8,
    /// Stall line pattern.
    #[serde(default)]
    pub stall: StallPolicy,
    /// Initial memory contents.
    #[serde(default)]
    pub fill: MemoryFill,
    /// Read back every configuration register after configuring.
    #[serde(default = "RunConfig::default_verify_registers")]
    pub verify_registers: bool,
    /// Mismatch records kept in the report.
    #[serde(default = "RunConfig::default_max_reported")]
    pub max_reported: usize,
}

impl RunConfig {
    const fn default_seed() -> u64 {
        defaults::SEED
    }
    const fn default_settle_cycles() -> u64 {
        defaults::SETTLE_CYCLES
    }
    const fn default_app_latency() -> u64 {
        defaults::APP_LATENCY
    }
    const fn default_drain_cycles() -> u64 {
        defaults::DRAIN_CYCLES
    }
    const fn default_max_cycles() -> u64 {
        defaults::MAX_CYCLES
    }
    const fn default_wr_en_percent() -> u8 {
        defaults::WR_EN_PERCENT
    }
    const fn default_verify_registers() -> bool {
        true
    }
    const fn default_max_reported() -> usize {
        defaults::MAX_REPORTED
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: defaults::SEED,
            settle_cycles: defaults::SETTLE_CYCLES,
            app_latency: defaults::APP_LATENCY,
            drain_cycles: defaults::DRAIN_CYCLES,
            max_cycles: defaults::MAX_CYCLES,
            wr_en_percent: defaults::WR_EN_PERCENT,
            stall: StallPolicy::Never,
            fill: MemoryFill::Index,
            verify_registers: true,
            max_reported: defaults::MAX_REPORTED,
        }
    }
}

/// One row of the scenario's channel table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelSpec {
    /// Channel id.
    pub id: usize,
    /// Streaming mode.
    pub mode: Mode,
    /// Word-aligned start address.
    #[serde(default)]
    pub start_addr: u32,
    /// Number of words to transfer.
    #[serde(default)]
    pub num_words: u32,
    /// Number of banks the channel may address.
    #[serde(default)]
    pub num_banks: u32,
    /// Whether the channel reacts to the global start pulse.
    #[serde(default = "ChannelSpec::default_pulse_en")]
    pub start_pulse_en: bool,
    /// Whether the channel raises a completion pulse.
    #[serde(default = "ChannelSpec::default_pulse_en")]
    pub done_pulse_en: bool,
}

impl ChannelSpec {
    const fn default_pulse_en() -> bool {
        true
    }

    /// Creates a spec with both pulse enables set.
    pub const fn new(id: usize, mode: Mode, start_addr: u32, num_words: u32, num_banks: u32) -> Self {
        Self {
            id,
            mode,
            start_addr,
            num_words,
            num_banks,
            start_pulse_en: true,
            done_pulse_en: true,
        }
    }

    /// Start address as a typed global address.
    pub const fn start(&self) -> GlbAddr {
        GlbAddr(self.start_addr)
    }
}

/// Root configuration: geometry, run settings and channel table.
///
/// # Examples
///
/// ```
/// use glbsim_core::config::{Config, StallPolicy};
/// use glbsim_core::core::addrgen::Mode;
///
/// let json = r#"{
///     "glb": { "bank_addr_width": 12 },
///     "run": { "seed": 7, "stall": { "Random": { "percent": 10 } } },
///     "channels": [
///         { "id": 0, "mode": "Instream", "start_addr": 100, "num_words": 64, "num_banks": 2 },
///         { "id": 4, "mode": "Outstream", "start_addr": 65636, "num_words": 64, "num_banks": 4,
///           "done_pulse_en": false }
///     ]
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.glb.num_banks, 32);
/// assert_eq!(config.glb.bank_addr_width, 12);
/// assert_eq!(config.run.stall, StallPolicy::Random { percent: 10 });
/// assert_eq!(config.channels[1].mode, Mode::Outstream);
/// assert!(config.channels[0].done_pulse_en);
/// assert!(!config.channels[1].done_pulse_en);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Global buffer geometry.
    #[serde(default)]
    pub glb: GlbConfig,
    /// Run pacing and stimulus.
    #[serde(default)]
    pub run: RunConfig,
    /// Channel table; channels not listed stay idle.
    #[serde(default)]
    pub channels: Vec<ChannelSpec>,
}

impl Config {
    /// Decodes a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and decodes a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
