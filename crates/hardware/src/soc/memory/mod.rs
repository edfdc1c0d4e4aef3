//! Banked global buffer storage.
//!
//! This module implements the banked memory array. It provides:
//! 1. **BankStore:** Per-bank word arrays with row-granular masked writes and row reads.
//! 2. **Ports:** The registered bank-side read/write stage that serves a DUT (`port`).
//!
//! One `BankStore` is the golden model; a second one stands in for the physical
//! buffer the DUT writes into. Comparing the two at end of run is the final check.

/// Registered bank port stage serving the DUT's bank-side signals.
pub mod port;

use crate::common::BankLocation;
use crate::common::constants::{WORD_BITS, WORD_MASK, WORDS_PER_ROW};

/// A word-level difference between two stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WordDiff {
    /// Location of the differing word.
    pub loc: BankLocation,
    /// Word held by the left-hand store.
    pub left: u16,
    /// Word held by the right-hand store.
    pub right: u16,
}

/// The banked memory array: `num_banks` banks of `words_per_bank` 16-bit words.
///
/// Four consecutive words form one 64-bit row; lane 0 is the least significant word.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BankStore {
    banks: Vec<Vec<u16>>,
}

impl BankStore {
    /// Creates a zero-filled store.
    ///
    /// # Arguments
    ///
    /// * `num_banks` - Number of banks.
    /// * `words_per_bank` - Words per bank; rounded up to a whole number of rows.
    pub fn new(num_banks: usize, words_per_bank: usize) -> Self {
        let words = words_per_bank.div_ceil(WORDS_PER_ROW) * WORDS_PER_ROW;
        Self {
            banks: vec![vec![0; words]; num_banks],
        }
    }

    /// Number of banks.
    pub fn num_banks(&self) -> usize {
        self.banks.len()
    }

    /// Number of words per bank.
    pub fn words_per_bank(&self) -> usize {
        self.banks.first().map_or(0, Vec::len)
    }

    /// Number of rows per bank.
    pub fn rows_per_bank(&self) -> usize {
        self.words_per_bank() / WORDS_PER_ROW
    }

    /// Fills every word from a generator called with `(bank, word_index)`.
    pub fn fill_with(&mut self, mut f: impl FnMut(usize, usize) -> u16) {
        for (b, bank) in self.banks.iter_mut().enumerate() {
            for (i, word) in bank.iter_mut().enumerate() {
                *word = f(b, i);
            }
        }
    }

    /// Writes one row under a per-bit mask.
    ///
    /// Each of the four words only takes the bits enabled in its 16-bit slice of
    /// `bit_mask`; all other bits keep their prior value.
    ///
    /// # Arguments
    ///
    /// * `bank` - Bank index.
    /// * `row` - Row index within the bank.
    /// * `payload` - Row data, lane 0 in bits 15:0.
    /// * `bit_mask` - Bits of `payload` to store.
    pub fn write_row(&mut self, bank: usize, row: usize, payload: u64, bit_mask: u64) {
        let base = row * WORDS_PER_ROW;
        let words = &mut self.banks[bank][base..base + WORDS_PER_ROW];
        for (lane, word) in words.iter_mut().enumerate() {
            let shift = lane as u32 * WORD_BITS;
            let data = ((payload >> shift) & WORD_MASK) as u16;
            let mask = ((bit_mask >> shift) & WORD_MASK) as u16;
            *word = (*word & !mask) | (data & mask);
        }
    }

    /// Reads one row, assembling its four words with lane 0 in bits 15:0.
    pub fn read_row(&self, bank: usize, row: usize) -> u64 {
        let base = row * WORDS_PER_ROW;
        self.banks[bank][base..base + WORDS_PER_ROW]
            .iter()
            .enumerate()
            .fold(0, |acc, (lane, &w)| acc | (u64::from(w) << (lane as u32 * WORD_BITS)))
    }

    /// Reads the word at a bank location.
    #[inline]
    pub fn read_word(&self, loc: BankLocation) -> u16 {
        self.banks[loc.bank][loc.word_index()]
    }

    /// Writes the word at a bank location through the row path with a single-lane mask.
    #[inline]
    pub fn write_word(&mut self, loc: BankLocation, value: u16) {
        let shift = loc.lane() as u32 * WORD_BITS;
        self.write_row(loc.bank, loc.row(), u64::from(value) << shift, WORD_MASK << shift);
    }

    /// Lists words that differ from `other`, in bank then address order.
    ///
    /// Both stores must share the same geometry.
    pub fn diff(&self, other: &Self) -> Vec<WordDiff> {
        self.banks
            .iter()
            .zip(&other.banks)
            .enumerate()
            .flat_map(|(b, (l, r))| {
                l.iter()
                    .zip(r)
                    .enumerate()
                    .filter(|(_, (a, c))| a != c)
                    .map(move |(i, (&left, &right))| WordDiff {
                        loc: BankLocation::new(b, (i * 2) as u32),
                        left,
                        right,
                    })
            })
            .collect()
    }
}
