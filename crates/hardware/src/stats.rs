//! Run statistics.
//!
//! Counters collected over one oracle run:
//! 1. **Cycles:** Total, configuration and stalled cycles.
//! 2. **Traffic:** Words streamed in and written out, bank reads and writes serviced.
//! 3. **Checking:** Comparisons performed by the oracle.

use serde::Serialize;
use tracing::info;

/// Counters for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Clock cycles simulated.
    pub cycles: u64,
    /// Cycles spent on register writes and read-back.
    pub config_cycles: u64,
    /// Streaming cycles between the start pulse and completion.
    pub streaming_cycles: u64,
    /// Streaming cycles with the stall line high.
    pub stalled_cycles: u64,
    /// Words delivered to the fabric by INSTREAM channels.
    pub words_in: u64,
    /// Words accepted from the fabric by OUTSTREAM channels.
    pub words_out: u64,
    /// Row reads serviced by the memory stub.
    pub bank_reads: u64,
    /// Row writes serviced by the memory stub.
    pub bank_writes: u64,
    /// Comparisons performed by the oracle.
    pub comparisons: u64,
}

impl RunStats {
    /// Fraction of streaming cycles that were stalled.
    #[allow(clippy::cast_precision_loss)]
    pub fn stall_ratio(&self) -> f64 {
        if self.streaming_cycles == 0 {
            0.0
        } else {
            self.stalled_cycles as f64 / self.streaming_cycles as f64
        }
    }

    /// Logs the counters at `info` level.
    pub fn log(&self) {
        info!(
            cycles = self.cycles,
            config_cycles = self.config_cycles,
            streaming_cycles = self.streaming_cycles,
            stalled_cycles = self.stalled_cycles,
            "run timing"
        );
        info!(
            words_in = self.words_in,
            words_out = self.words_out,
            bank_reads = self.bank_reads,
            bank_writes = self.bank_writes,
            comparisons = self.comparisons,
            "run traffic"
        );
    }
}
