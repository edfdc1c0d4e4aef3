//! IO controller channel table.
//!
//! Owns one `AddrGen` per channel and the routing decided for them. Building the
//! table is where every fatal configuration check happens, so a table that exists
//! is a scenario the simulator can run:
//! 1. **Channel ids:** Must lie in `0..num_channels`.
//! 2. **Alignment:** Start addresses must be word aligned.
//! 3. **Routing:** Streaming channels need at least one bank, and no channel may ask
//!    for more banks than the lower-numbered channels left over.
//! 4. **Extent:** A transfer must stay inside the global buffer and inside its span.
//! 5. **Isolation:** No two streaming channels may touch the same bank.

use std::ops::RangeInclusive;

use tracing::{debug, error};

use super::addrgen::{AddrGen, Mode};
use crate::common::constants::WORD_BYTES;
use crate::common::ConfigError;
use crate::config::{ChannelSpec, GlbConfig};
use crate::soc::interconnect::{SwitchSelect, SwitchWrite};
use crate::soc::registers::RegisterId;

/// The configured channel table.
#[derive(Clone, Debug)]
pub struct IoCtrl {
    channels: Vec<AddrGen>,
    configured: Vec<usize>,
    switch: SwitchSelect,
    masks: Vec<u32>,
    bank_addr_width: u32,
}

impl IoCtrl {
    /// Builds and validates the channel table.
    ///
    /// Channels missing from `specs` stay idle. A channel listed twice takes its last entry.
    ///
    /// # Errors
    ///
    /// The first `ConfigError` found, in channel order.
    pub fn new(glb: &GlbConfig, specs: &[ChannelSpec]) -> Result<Self, ConfigError> {
        let fail = |err: ConfigError| {
            error!("{err}");
            err
        };
        glb.validate().map_err(fail)?;

        let mut channels: Vec<AddrGen> = (0..glb.num_channels).map(AddrGen::new).collect();
        let mut configured = Vec::with_capacity(specs.len());
        for spec in specs {
            let Some(channel) = channels.get_mut(spec.id) else {
                return Err(fail(ConfigError::ChannelOutOfRange {
                    channel: spec.id,
                    num_channels: glb.num_channels,
                }));
            };
            channel.configure(spec).map_err(fail)?;
            configured.push(spec.id);
        }
        configured.sort_unstable();
        configured.dedup();

        let switch = SwitchSelect::new(glb);
        let spans: Vec<u32> = channels.iter().map(AddrGen::span).collect();
        for channel in &channels {
            if channel.mode().is_streaming() && channel.span() == 0 {
                return Err(fail(ConfigError::NoBanksGranted { channel: channel.id() }));
            }
        }
        switch.validate(&spans).map_err(fail)?;
        for channel in &channels {
            check_extent(glb, channel).map_err(fail)?;
        }
        check_bank_conflicts(glb, &channels).map_err(fail)?;

        let masks = switch.resolve(&spans);
        for (id, mask) in masks.iter().enumerate() {
            debug!("ch{id}: {} span {} switch_sel {mask:#b}", channels[id].mode(), spans[id]);
        }

        Ok(Self {
            channels,
            configured,
            switch,
            masks,
            bank_addr_width: glb.bank_addr_width,
        })
    }

    /// All channels, indexed by id.
    pub fn channels(&self) -> &[AddrGen] {
        &self.channels
    }

    /// Mutable access to all channels.
    pub fn channels_mut(&mut self) -> &mut [AddrGen] {
        &mut self.channels
    }

    /// Ids of channels listed in the scenario, ascending.
    pub fn configured(&self) -> &[usize] {
        &self.configured
    }

    /// Final switch-select mask of every channel.
    pub fn masks(&self) -> &[u32] {
        &self.masks
    }

    /// Bank address width of the geometry.
    pub const fn bank_addr_width(&self) -> u32 {
        self.bank_addr_width
    }

    /// Register writes that configure one channel, switch-select plan last.
    pub fn register_writes(&self, id: usize) -> Vec<(usize, RegisterId, u32)> {
        let ch = &self.channels[id];
        let mut writes = vec![
            (id, RegisterId::Mode, ch.mode().bits()),
            (id, RegisterId::StartAddr, ch.start().val()),
            (id, RegisterId::NumWords, ch.num_words()),
            (id, RegisterId::StartPulseEn, u32::from(ch.start_pulse_en())),
            (id, RegisterId::DonePulseEn, u32::from(ch.done_pulse_en())),
        ];
        writes.extend(
            self.switch
                .plan(id, ch.span())
                .into_iter()
                .map(|SwitchWrite { channel, mask }| (channel, RegisterId::SwitchSel, mask)),
        );
        writes
    }

    /// Value every register of `id` must read back after configuration.
    pub fn expected_register(&self, id: usize, register: RegisterId) -> u32 {
        let ch = &self.channels[id];
        match register {
            RegisterId::Mode => ch.mode().bits(),
            RegisterId::StartAddr => ch.start().val(),
            RegisterId::NumWords => ch.num_words(),
            RegisterId::StartPulseEn => u32::from(ch.start_pulse_en()),
            RegisterId::DonePulseEn => u32::from(ch.done_pulse_en()),
            RegisterId::SwitchSel => self.masks[id],
        }
    }

    /// Arms every channel on the start pulse.
    pub fn arm_all(&mut self) {
        for channel in &mut self.channels {
            channel.arm();
        }
    }

    /// Returns `true` once every channel has finished, pending pulses included.
    pub fn is_complete(&self) -> bool {
        self.channels.iter().all(AddrGen::is_complete)
    }

    /// Number of channels in a mode.
    pub fn count(&self, mode: Mode) -> usize {
        self.channels.iter().filter(|c| c.mode() == mode).count()
    }
}

/// Banks a streaming transfer reads or writes, first to last.
fn touched_banks(bank_addr_width: u32, channel: &AddrGen) -> Option<RangeInclusive<u32>> {
    if !channel.mode().is_streaming() || channel.num_words() == 0 {
        return None;
    }
    let start = channel.start().val();
    let last_word = u64::from(start) + u64::from(channel.num_words() - 1) * u64::from(WORD_BYTES);
    Some(start >> bank_addr_width..=(last_word >> bank_addr_width) as u32)
}

fn check_extent(glb: &GlbConfig, channel: &AddrGen) -> Result<(), ConfigError> {
    let Some(banks) = touched_banks(glb.bank_addr_width, channel) else {
        return Ok(());
    };
    let start = channel.start();
    let end = u64::from(start.val()) + u64::from(channel.num_words()) * u64::from(WORD_BYTES);
    let limit = glb.address_limit();
    if end > limit {
        return Err(ConfigError::AddressOutOfRange {
            channel: channel.id(),
            start,
            num_words: channel.num_words(),
            limit,
        });
    }
    let touched = banks.end() - banks.start() + 1;
    if touched > channel.span() {
        return Err(ConfigError::SpanExceeded {
            channel: channel.id(),
            touched,
            span: channel.span(),
        });
    }
    Ok(())
}

/// Rejects the first pair of streaming channels whose touched banks overlap.
fn check_bank_conflicts(glb: &GlbConfig, channels: &[AddrGen]) -> Result<(), ConfigError> {
    let ranges: Vec<(usize, RangeInclusive<u32>)> = channels
        .iter()
        .filter_map(|c| touched_banks(glb.bank_addr_width, c).map(|banks| (c.id(), banks)))
        .collect();
    for (i, (channel, banks)) in ranges.iter().enumerate() {
        for (other, theirs) in &ranges[..i] {
            let bank = *banks.start().max(theirs.start());
            if bank <= *banks.end().min(theirs.end()) {
                return Err(ConfigError::BankConflict {
                    channel: *channel,
                    other: *other,
                    bank,
                });
            }
        }
    }
    Ok(())
}
