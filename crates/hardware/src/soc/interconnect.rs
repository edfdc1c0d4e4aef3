//! Bank routing (switch-select) policy.
//!
//! This module maps a channel's requested bank count to the switch-select mask that
//! routes it onto the bank crossbar. It provides:
//! 1. **Mask encoding:** A contiguous run of `n` enables packed at the top of the
//!    channel's `banks_per_channel`-bit field (`1 -> 1000`, `2 -> 1100`, ...).
//! 2. **Cascade:** A request larger than one home group enables the whole field and
//!    withdraws every higher-numbered channel's grant.
//! 3. **Availability:** Banks are claimed in channel order; a channel may not ask for
//!    more than the lower-numbered channels left over.

use crate::common::ConfigError;
use crate::config::GlbConfig;

/// One switch-select register write produced by the policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwitchWrite {
    /// Channel whose switch-select register is written.
    pub channel: usize,
    /// Mask value written.
    pub mask: u32,
}

/// The switch-select policy for one global buffer geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwitchSelect {
    num_banks: usize,
    num_channels: usize,
    banks_per_channel: usize,
}

impl SwitchSelect {
    /// Creates the policy for a geometry.
    pub const fn new(config: &GlbConfig) -> Self {
        Self {
            num_banks: config.num_banks,
            num_channels: config.num_channels,
            banks_per_channel: config.banks_per_channel(),
        }
    }

    /// Width in bits of one switch-select mask.
    pub const fn width(&self) -> usize {
        self.banks_per_channel
    }

    /// Mask for a request of `requested` banks; saturates at all-ones.
    pub const fn mask(&self, requested: u32) -> u32 {
        let width = self.banks_per_channel as u32;
        let n = if requested > width { width } else { requested };
        let ones = ((1u64 << n) - 1) as u32;
        ones << (width - n)
    }

    /// Returns `true` if a request overflows one home group and cascades.
    pub const fn cascades(&self, requested: u32) -> bool {
        requested as usize > self.banks_per_channel
    }

    /// Register writes needed to grant `requested` banks to `channel`.
    ///
    /// The first write is the channel's own mask; a cascading request is followed by a
    /// zero mask for every higher-numbered channel, in ascending order.
    pub fn plan(&self, channel: usize, requested: u32) -> Vec<SwitchWrite> {
        let mut writes = vec![SwitchWrite {
            channel,
            mask: self.mask(requested),
        }];
        if self.cascades(requested) {
            writes.extend((channel + 1..self.num_channels).map(|c| SwitchWrite { channel: c, mask: 0 }));
        }
        writes
    }

    /// Final mask of every channel after applying each channel's plan in ascending order.
    ///
    /// # Arguments
    ///
    /// * `spans` - Requested bank count per channel, indexed by channel id.
    pub fn resolve(&self, spans: &[u32]) -> Vec<u32> {
        let mut masks = vec![0; self.num_channels];
        for (channel, &requested) in spans.iter().enumerate().take(self.num_channels) {
            for write in self.plan(channel, requested) {
                masks[write.channel] = write.mask;
            }
        }
        masks
    }

    /// Banks still available to `channel` after every lower-numbered channel claimed its span.
    pub fn available(&self, spans: &[u32], channel: usize) -> u32 {
        let claimed: u64 = spans.iter().take(channel).map(|&s| u64::from(s)).sum();
        (self.num_banks as u64).saturating_sub(claimed) as u32
    }

    /// Checks that no channel requests more banks than remain for it.
    ///
    /// # Returns
    ///
    /// `Ok(())`, or `ConfigError::BankOversubscribed` for the first offending channel.
    pub fn validate(&self, spans: &[u32]) -> Result<(), ConfigError> {
        for (channel, &requested) in spans.iter().enumerate() {
            let available = self.available(spans, channel);
            if requested > available {
                return Err(ConfigError::BankOversubscribed {
                    channel,
                    requested,
                    available,
                });
            }
        }
        Ok(())
    }
}
