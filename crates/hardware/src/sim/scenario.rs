//! Built-in scenarios.
//!
//! Ready-made channel tables for the common checks. Each takes the geometry to run
//! on so the same scenario can be exercised at a reduced bank size.

use std::fmt;
use std::str::FromStr;

use crate::common::ConfigError;
use crate::config::{ChannelSpec, Config, GlbConfig, RunConfig, StallPolicy};
use crate::core::addrgen::Mode;

/// A built-in scenario.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// Two INSTREAM channels and one OUTSTREAM channel streaming concurrently.
    IoController,
    /// One INSTREAM channel crossing a bank boundary under a stall burst.
    Instream,
    /// One OUTSTREAM channel crossing a bank boundary under a stall burst.
    Outstream,
}

impl Scenario {
    /// Every built-in scenario.
    pub const ALL: [Self; 3] = [Self::IoController, Self::Instream, Self::Outstream];

    /// Scenario name as accepted by `from_str`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::IoController => "io-controller",
            Self::Instream => "instream",
            Self::Outstream => "outstream",
        }
    }

    /// Builds the scenario for a geometry.
    ///
    /// # Errors
    ///
    /// `ConfigError::InvalidGeometry` if the geometry is invalid or too small to place
    /// the scenario's transfers.
    pub fn config(self, glb: GlbConfig) -> Result<Config, ConfigError> {
        glb.validate()?;
        match self {
            Self::IoController => io_controller(glb),
            Self::Instream => instream(glb),
            Self::Outstream => outstream(glb),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sc| sc.name() == s)
            .ok_or_else(|| format!("unknown scenario '{s}'"))
    }
}

fn does_not_fit(scenario: Scenario, glb: &GlbConfig) -> ConfigError {
    ConfigError::InvalidGeometry(format!(
        "scenario {scenario} does not fit {} banks of 2^{} bytes",
        glb.num_banks, glb.bank_addr_width
    ))
}

/// Address `offset` bytes past the start of `bank`, or `None` if it does not fit.
fn bank_addr(glb: &GlbConfig, bank: u32, offset: u32) -> Option<u32> {
    bank.checked_shl(glb.bank_addr_width)
        .filter(|base| base >> glb.bank_addr_width == bank)?
        .checked_add(offset)
}

/// Address `before` bytes ahead of the start of `bank`, or `None` if it does not fit.
fn before_bank(glb: &GlbConfig, bank: u32, before: u32) -> Option<u32> {
    bank_addr(glb, bank, 0)?.checked_sub(before)
}

/// Channel 0 INSTREAM from bank 5 plus a quarter bank plus 100 over 6 banks, channel 1
/// INSTREAM from bank 6 plus 100 over 2 banks, channel 4 OUTSTREAM from bank 16 plus
/// 100 over 16 banks; 1000 words each.
///
/// # Errors
///
/// `ConfigError::InvalidGeometry` if the start addresses cannot be formed.
pub fn io_controller(glb: GlbConfig) -> Result<Config, ConfigError> {
    let fail = || does_not_fit(Scenario::IoController, &glb);
    let quarter = glb
        .bank_addr_width
        .checked_sub(2)
        .and_then(|w| 1u32.checked_shl(w))
        .ok_or_else(fail)?;
    let ch0 = bank_addr(&glb, 5, 100).and_then(|a| a.checked_add(quarter)).ok_or_else(fail)?;
    let ch1 = bank_addr(&glb, 6, 100).ok_or_else(fail)?;
    let ch4 = bank_addr(&glb, 16, 100).ok_or_else(fail)?;
    let channels = vec![
        ChannelSpec::new(0, Mode::Instream, ch0, 1000, 6),
        ChannelSpec::new(1, Mode::Instream, ch1, 1000, 2),
        ChannelSpec::new(4, Mode::Outstream, ch4, 1000, 16),
    ];
    Ok(Config {
        glb,
        run: RunConfig::default(),
        channels,
    })
}

/// Channel 2 INSTREAM ending 128 words past the start of bank 9.
///
/// # Errors
///
/// `ConfigError::InvalidGeometry` if a bank is smaller than the 128 words before bank 9.
pub fn instream(glb: GlbConfig) -> Result<Config, ConfigError> {
    let start = before_bank(&glb, 9, 2 * 128).ok_or_else(|| does_not_fit(Scenario::Instream, &glb))?;
    Ok(Config {
        glb,
        run: RunConfig {
            stall: StallPolicy::Burst { start: 40, len: 12 },
            ..RunConfig::default()
        },
        channels: vec![ChannelSpec::new(2, Mode::Instream, start, 256, 2)],
    })
}

/// Channel 3 OUTSTREAM ending 128 words past the start of bank 13.
///
/// # Errors
///
/// `ConfigError::InvalidGeometry` if a bank is smaller than the 128 words before bank 13.
pub fn outstream(glb: GlbConfig) -> Result<Config, ConfigError> {
    let start = before_bank(&glb, 13, 2 * 128).ok_or_else(|| does_not_fit(Scenario::Outstream, &glb))?;
    Ok(Config {
        glb,
        run: RunConfig {
            stall: StallPolicy::Burst { start: 150, len: 12 },
            ..RunConfig::default()
        },
        channels: vec![ChannelSpec::new(3, Mode::Outstream, start, 256, 2)],
    })
}
