//! Global Buffer Constants.
//!
//! This module defines the fixed geometry constants shared by the golden model,
//! the memory stub and the behavioral DUT. It includes:
//! 1. **Word Constants:** Width and mask of the narrow fabric word.
//! 2. **Row Constants:** Number of words packed into one wide bank row.
//! 3. **Address Constants:** Byte stride between consecutive words and rows.

/// Width in bits of one fabric word (the smallest addressable unit).
pub const WORD_BITS: u32 = 16;

/// Mask selecting one fabric word.
pub const WORD_MASK: u64 = 0xFFFF;

/// Number of fabric words packed into one wide bank row.
pub const WORDS_PER_ROW: usize = 4;

/// Width in bits of one bank row.
pub const ROW_BITS: u32 = WORD_BITS * WORDS_PER_ROW as u32;

/// Byte stride between consecutive words; addresses advance by this per transfer.
pub const WORD_BYTES: u32 = 2;

/// Number of address bits below the row index (`log2(WORD_BYTES * WORDS_PER_ROW)`).
pub const ROW_SHIFT: u32 = 3;

/// Largest store the model allocates, in words across all banks (32 MiB).
pub const MAX_STORE_WORDS: usize = 1 << 24;
