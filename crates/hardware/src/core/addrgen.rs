//! Address generator channel (golden model).
//!
//! One `AddrGen` mirrors one IO controller channel cycle by cycle. It provides:
//! 1. **Modes:** IDLE, INSTREAM, OUTSTREAM and SRAM, with their register encodings.
//! 2. **Lifecycle:** Idle -> Configured -> Active -> Done, armed by the start pulse.
//! 3. **INSTREAM:** A two-stage read pipeline. A row read issued on cycle N returns on
//!    cycle N+1 and is delivered on the first unstalled edge after it returns; a word
//!    caught by a stall is held and delivered once the stall clears.
//! 4. **OUTSTREAM:** One write accepted per unstalled cycle while words remain, then a
//!    single completion pulse on the following edge.
//!
//! The channel never touches a `BankStore` itself. `step` reports which global
//! address was delivered or accepted so the engine can read or write the golden
//! store against pre-cycle state.

use std::fmt;

use serde::Deserialize;

use crate::common::constants::WORD_BYTES;
use crate::common::{ConfigError, GlbAddr};
use crate::config::ChannelSpec;

/// Channel operating mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum Mode {
    /// Channel is inert.
    #[default]
    Idle,
    /// Reads from the banks and feeds the fabric.
    Instream,
    /// Accepts writes from the fabric into the banks.
    Outstream,
    /// Direct passthrough; configured but not checked.
    Sram,
}

impl Mode {
    /// MODE register encoding.
    pub const fn bits(self) -> u32 {
        match self {
            Self::Idle => 0,
            Self::Instream => 1,
            Self::Outstream => 2,
            Self::Sram => 3,
        }
    }

    /// Decodes a MODE register value; only the low two bits are significant.
    pub const fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            1 => Self::Instream,
            2 => Self::Outstream,
            3 => Self::Sram,
            _ => Self::Idle,
        }
    }

    /// Returns `true` for INSTREAM and OUTSTREAM.
    pub const fn is_streaming(self) -> bool {
        matches!(self, Self::Instream | Self::Outstream)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "IDLE",
            Self::Instream => "INSTREAM",
            Self::Outstream => "OUTSTREAM",
            Self::Sram => "SRAM",
        })
    }
}

/// Lifecycle state of a channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChannelState {
    /// Not configured, or configured as IDLE.
    #[default]
    Idle,
    /// Configured and waiting for the start pulse.
    Configured,
    /// Streaming.
    Active,
    /// Count exhausted; inert until reconfigured.
    Done,
}

/// What a channel did on one clock edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Transfer {
    /// INSTREAM: address of the word delivered to the fabric on this edge.
    pub delivered: Option<GlbAddr>,
    /// OUTSTREAM: address the fabric's write was accepted at on this edge.
    pub accepted: Option<GlbAddr>,
    /// OUTSTREAM: the completion pulse is raised after this edge.
    pub done: bool,
}

/// Golden state of one IO controller channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddrGen {
    id: usize,
    mode: Mode,
    start: GlbAddr,
    num_words: u32,
    span: u32,
    start_pulse_en: bool,
    done_pulse_en: bool,
    state: ChannelState,

    addr: GlbAddr,
    remaining: u32,

    issue_left: u32,
    in_flight: bool,
    held: bool,

    done_pending: bool,
    done_raised: bool,
}

impl AddrGen {
    /// Creates an idle channel with register reset values.
    pub const fn new(id: usize) -> Self {
        Self {
            id,
            mode: Mode::Idle,
            start: GlbAddr(0),
            num_words: 0,
            span: 0,
            start_pulse_en: true,
            done_pulse_en: true,
            state: ChannelState::Idle,
            addr: GlbAddr(0),
            remaining: 0,
            issue_left: 0,
            in_flight: false,
            held: false,
            done_pending: false,
            done_raised: false,
        }
    }

    /// Loads a channel's configuration.
    ///
    /// # Errors
    ///
    /// `ConfigError::UnalignedAddress` if the start address is not word aligned.
    pub fn configure(&mut self, spec: &ChannelSpec) -> Result<(), ConfigError> {
        if !spec.start().is_word_aligned() {
            return Err(ConfigError::UnalignedAddress {
                channel: self.id,
                addr: spec.start(),
            });
        }
        *self = Self {
            mode: spec.mode,
            start: spec.start(),
            num_words: spec.num_words,
            span: spec.num_banks,
            start_pulse_en: spec.start_pulse_en,
            done_pulse_en: spec.done_pulse_en,
            state: if spec.mode == Mode::Idle {
                ChannelState::Idle
            } else {
                ChannelState::Configured
            },
            ..Self::new(self.id)
        };
        Ok(())
    }

    /// Reacts to the start pulse.
    ///
    /// A configured streaming channel with its start pulse enabled and at least one bank
    /// becomes active. The arming edge itself moves no data. A transfer of zero words
    /// completes immediately without a pulse.
    pub const fn arm(&mut self) {
        if !matches!(self.state, ChannelState::Configured)
            || !self.mode.is_streaming()
            || !self.start_pulse_en
            || self.span == 0
        {
            return;
        }
        self.addr = self.start;
        self.remaining = self.num_words;
        self.issue_left = if matches!(self.mode, Mode::Instream) {
            self.num_words
        } else {
            0
        };
        self.in_flight = false;
        self.held = false;
        self.done_pending = false;
        self.done_raised = false;
        self.state = if self.num_words == 0 {
            ChannelState::Done
        } else {
            ChannelState::Active
        };
    }

    /// Advances the channel across one clock edge.
    ///
    /// # Arguments
    ///
    /// * `stalled` - The shared stall line was high for this cycle.
    /// * `wr_en` - The fabric presented a write to this channel this cycle.
    pub const fn step(&mut self, stalled: bool, wr_en: bool) -> Transfer {
        let mut transfer = Transfer {
            delivered: None,
            accepted: None,
            done: false,
        };
        match self.mode {
            Mode::Instream => {
                if !matches!(self.state, ChannelState::Active) {
                    return transfer;
                }
                let word = self.held || self.in_flight;
                if stalled {
                    self.held = word;
                    self.in_flight = false;
                    return transfer;
                }
                if word {
                    transfer.delivered = Some(self.addr);
                    self.advance();
                }
                self.held = false;
                self.in_flight = self.issue_left > 0;
                if self.in_flight {
                    self.issue_left -= 1;
                }
            }
            Mode::Outstream => {
                transfer.done = self.done_pending && self.done_pulse_en;
                if self.done_pending {
                    self.done_pending = false;
                    self.done_raised = true;
                }
                if !stalled && wr_en && matches!(self.state, ChannelState::Active) && self.remaining > 0 {
                    transfer.accepted = Some(self.addr);
                    self.advance();
                    self.done_pending = self.remaining == 0;
                }
            }
            Mode::Idle | Mode::Sram => {}
        }
        transfer
    }

    const fn advance(&mut self) {
        self.addr = GlbAddr(self.addr.0 + WORD_BYTES);
        self.remaining -= 1;
        if self.remaining == 0 {
            self.state = ChannelState::Done;
        }
    }

    /// Channel id.
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Configured mode.
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Lifecycle state.
    pub const fn state(&self) -> ChannelState {
        self.state
    }

    /// Configured start address.
    pub const fn start(&self) -> GlbAddr {
        self.start
    }

    /// Configured transfer length in words.
    pub const fn num_words(&self) -> u32 {
        self.num_words
    }

    /// Configured bank span.
    pub const fn span(&self) -> u32 {
        self.span
    }

    /// START_PULSE_EN register value.
    pub const fn start_pulse_en(&self) -> bool {
        self.start_pulse_en
    }

    /// DONE_PULSE_EN register value.
    pub const fn done_pulse_en(&self) -> bool {
        self.done_pulse_en
    }

    /// Running address of the next word to deliver or accept.
    pub const fn addr(&self) -> GlbAddr {
        self.addr
    }

    /// Words left to transfer.
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Returns `true` once the channel has delivered or accepted every word.
    pub const fn is_exhausted(&self) -> bool {
        matches!(self.state, ChannelState::Done)
    }

    /// Returns `true` if the completion pulse already fired (or was suppressed).
    pub const fn done_raised(&self) -> bool {
        self.done_raised
    }

    /// Returns `true` if the channel has nothing left to do, pulse included.
    ///
    /// Channels that never arm (idle, SRAM, start pulse disabled) count as complete.
    pub const fn is_complete(&self) -> bool {
        match self.state {
            ChannelState::Active => false,
            ChannelState::Done => !self.done_pending,
            ChannelState::Idle | ChannelState::Configured => true,
        }
    }
}
