//! Pseudo-random stimulus source.
//!
//! A 64-bit xorshift generator. Runs are reproducible from their seed, which is
//! all the stimulus needs.

/// Xorshift64 generator state.
#[derive(Clone, Debug)]
pub struct XorShift {
    state: u64,
}

impl XorShift {
    /// Creates a generator; a zero seed is replaced since xorshift would stay at zero forever.
    pub const fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 123456789 } else { seed },
        }
    }

    /// Returns the next 64-bit value.
    pub const fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Returns the next value truncated to a fabric word.
    pub const fn next_word(&mut self) -> u16 {
        self.next_u64() as u16
    }

    /// Returns `true` with roughly `percent`% probability.
    pub const fn chance(&mut self, percent: u8) -> bool {
        match percent {
            0 => false,
            100.. => true,
            p => self.next_u64() % 100 < p as u64,
        }
    }
}
