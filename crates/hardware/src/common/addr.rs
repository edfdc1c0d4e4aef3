//! Global buffer address types.
//!
//! This module defines a strong type for addresses in the global buffer address
//! space and the decomposition of such an address into a bank location. It provides:
//! 1. **Type Safety:** Distinguishes global (all-bank) addresses from bank-relative offsets.
//! 2. **Alignment:** Word-alignment checks; unaligned addresses are configuration errors.
//! 3. **Decomposition:** Split into bank index, intra-bank offset, row and lane.

use std::fmt;

use super::constants::{ROW_SHIFT, WORD_BYTES, WORDS_PER_ROW};

/// A byte address in the global buffer address space spanning all banks.
///
/// The upper bits above `bank_addr_width` select the bank; the lower bits are the
/// byte offset inside that bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct GlbAddr(pub u32);

impl GlbAddr {
    /// Creates a new global address from a raw value.
    #[inline(always)]
    pub const fn new(addr: u32) -> Self {
        Self(addr)
    }

    /// Returns the raw address value.
    #[inline(always)]
    pub const fn val(self) -> u32 {
        self.0
    }

    /// Returns `true` if the address falls on a word boundary.
    #[inline(always)]
    pub const fn is_word_aligned(self) -> bool {
        self.0 % WORD_BYTES == 0
    }

    /// Returns the address of the next word.
    #[inline(always)]
    pub const fn next_word(self) -> Self {
        Self(self.0 + WORD_BYTES)
    }

    /// Splits the address into its bank and intra-bank offset.
    ///
    /// # Arguments
    ///
    /// * `bank_addr_width` - Number of address bits covered by one bank.
    ///
    /// # Returns
    ///
    /// The `BankLocation` this address maps to.
    #[inline]
    pub const fn decompose(self, bank_addr_width: u32) -> BankLocation {
        BankLocation {
            bank: (self.0 >> bank_addr_width) as usize,
            offset: self.0 & ((1 << bank_addr_width) - 1),
        }
    }
}

impl fmt::Display for GlbAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}

impl From<u32> for GlbAddr {
    fn from(addr: u32) -> Self {
        Self(addr)
    }
}

/// A location inside one bank: bank index plus byte offset within the bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BankLocation {
    /// Bank index.
    pub bank: usize,
    /// Byte offset within the bank.
    pub offset: u32,
}

impl BankLocation {
    /// Creates a bank location.
    pub const fn new(bank: usize, offset: u32) -> Self {
        Self { bank, offset }
    }

    /// Index of the word within the bank (`offset >> 1`).
    #[inline(always)]
    pub const fn word_index(self) -> usize {
        (self.offset / WORD_BYTES) as usize
    }

    /// Index of the wide row holding this word (`offset >> 3`).
    #[inline(always)]
    pub const fn row(self) -> usize {
        (self.offset >> ROW_SHIFT) as usize
    }

    /// Lane of the word within its row (0..4).
    #[inline(always)]
    pub const fn lane(self) -> usize {
        self.word_index() % WORDS_PER_ROW
    }

    /// Offset rounded down to the start of the row, as presented on a bank address port.
    #[inline(always)]
    pub const fn row_offset(self) -> u32 {
        (self.offset >> ROW_SHIFT) << ROW_SHIFT
    }

    /// Recomposes the global address of this location.
    #[inline]
    pub const fn to_global(self, bank_addr_width: u32) -> GlbAddr {
        GlbAddr(((self.bank as u32) << bank_addr_width) | self.offset)
    }
}

impl fmt::Display for BankLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bank {} offset {:#x}", self.bank, self.offset)
    }
}
