//! Checking oracle.
//!
//! The oracle never stops a run. Every comparison that fails becomes a `Mismatch`;
//! the first `max_reported` are kept (and logged), the rest are only counted. At end
//! of run the records fold into a `RunReport` whose verdict is `Fail` if anything
//! at all mismatched.

use std::fmt;

use tracing::warn;

use crate::common::BankLocation;
use crate::common::constants::{WORD_BITS, WORD_MASK, WORDS_PER_ROW};
use crate::soc::memory::BankStore;
use crate::soc::memory::port::BankTraffic;
use crate::soc::registers::RegisterId;
use crate::soc::traits::{Clocked, Signal};
use crate::stats::RunStats;

/// Classification of a failed comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MismatchKind {
    /// A fabric-side output differs from the golden model.
    Data,
    /// A channel kept asserting valid or done after it finished.
    Exhaustion,
    /// A bank write carried the wrong data for its address.
    BankWrite,
    /// The final memory image differs from the golden store.
    Memory,
    /// A configuration register read back the wrong value.
    Register,
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Data => "data",
            Self::Exhaustion => "exhaustion",
            Self::BankWrite => "bank-write",
            Self::Memory => "memory",
            Self::Register => "register",
        })
    }
}

/// What a mismatch was observed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// A DUT boundary signal.
    Signal(Signal),
    /// A word in the banked memory.
    Memory(BankLocation),
    /// A configuration register.
    Register(RegisterId),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal(s) => write!(f, "{s}"),
            Self::Memory(loc) => write!(f, "{loc}"),
            Self::Register(r) => write!(f, "{r}"),
        }
    }
}

/// A value the DUT must show on a signal after the current cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Expectation {
    /// Channel the signal belongs to.
    pub channel: usize,
    /// Signal to read.
    pub signal: Signal,
    /// Expected value.
    pub expected: u64,
    /// Classification if the comparison fails.
    pub kind: MismatchKind,
}

impl Expectation {
    /// Creates an expectation.
    pub const fn new(channel: usize, signal: Signal, expected: u64, kind: MismatchKind) -> Self {
        Self {
            channel,
            signal,
            expected,
            kind,
        }
    }
}

/// One failed comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mismatch {
    /// Classification.
    pub kind: MismatchKind,
    /// Cycle the comparison ran on.
    pub cycle: u64,
    /// Channel involved, if any.
    pub channel: Option<usize>,
    /// What was compared.
    pub target: Target,
    /// Golden value.
    pub expected: u64,
    /// Observed value.
    pub observed: u64,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[cycle {}] {} mismatch", self.cycle, self.kind)?;
        if let Some(ch) = self.channel {
            write!(f, " ch{ch}")?;
        }
        write!(
            f,
            " on {}: expected {:#x}, observed {:#x}",
            self.target, self.expected, self.observed
        )
    }
}

/// Outcome of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Every comparison matched.
    Pass,
    /// At least one comparison failed.
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        })
    }
}

/// End-of-run verdict with diagnostics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Pass/fail.
    pub verdict: Verdict,
    /// Stored mismatch records, in detection order.
    pub mismatches: Vec<Mismatch>,
    /// Every mismatch detected, stored or not.
    pub total_mismatches: u64,
    /// Run statistics.
    pub stats: RunStats,
}

impl RunReport {
    /// Returns `true` if the run passed.
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    /// Number of stored mismatches of one kind.
    pub fn count(&self, kind: MismatchKind) -> usize {
        self.mismatches.iter().filter(|m| m.kind == kind).count()
    }
}

/// Accumulates mismatches over a run.
#[derive(Clone, Debug)]
pub struct Oracle {
    max_reported: usize,
    mismatches: Vec<Mismatch>,
    total: u64,
    comparisons: u64,
}

impl Oracle {
    /// Creates an oracle keeping at most `max_reported` records.
    pub const fn new(max_reported: usize) -> Self {
        Self {
            max_reported,
            mismatches: Vec::new(),
            total: 0,
            comparisons: 0,
        }
    }

    /// Records a failed comparison.
    pub fn record(&mut self, mismatch: Mismatch) {
        self.total += 1;
        if self.mismatches.len() < self.max_reported {
            warn!("{mismatch}");
            self.mismatches.push(mismatch);
        }
    }

    fn compare(&mut self, mismatch: Mismatch) {
        self.comparisons += 1;
        if mismatch.expected != mismatch.observed {
            self.record(mismatch);
        }
    }

    /// Compares every expectation against the DUT's current outputs.
    ///
    /// A data expectation is skipped when the matching valid expectation already failed,
    /// so a missing word is reported once.
    pub fn check<C: Clocked + ?Sized>(&mut self, cycle: u64, bench: &C, expectations: &[Expectation]) {
        let mut valid_failed = None;
        for exp in expectations {
            let observed = bench.peek(exp.signal);
            match exp.signal {
                Signal::IoToCgraRdData(ch) if valid_failed == Some(ch) => continue,
                Signal::IoToCgraRdDataValid(ch) if observed != exp.expected => valid_failed = Some(ch),
                _ => {}
            }
            self.compare(Mismatch {
                kind: exp.kind,
                cycle,
                channel: Some(exp.channel),
                target: Target::Signal(exp.signal),
                expected: exp.expected,
                observed,
            });
        }
    }

    /// Checks every bank write serviced this cycle against the golden store.
    ///
    /// Only lanes whose bit-select slice is set are compared, word by word.
    pub fn check_bank_writes(&mut self, cycle: u64, traffic: &BankTraffic, golden: &BankStore) {
        for write in &traffic.writes {
            let row_base = write.loc.row_offset();
            for lane in 0..WORDS_PER_ROW {
                let shift = lane as u32 * WORD_BITS;
                if (write.bit_sel >> shift) & WORD_MASK == 0 {
                    continue;
                }
                let loc = BankLocation::new(write.loc.bank, row_base + (lane as u32) * 2);
                self.compare(Mismatch {
                    kind: MismatchKind::BankWrite,
                    cycle,
                    channel: None,
                    target: Target::Memory(loc),
                    expected: u64::from(golden.read_word(loc)),
                    observed: (write.data >> shift) & WORD_MASK,
                });
            }
        }
    }

    /// Compares a register read-back.
    pub fn check_register(&mut self, cycle: u64, channel: usize, register: RegisterId, expected: u32, observed: u32) {
        self.compare(Mismatch {
            kind: MismatchKind::Register,
            cycle,
            channel: Some(channel),
            target: Target::Register(register),
            expected: u64::from(expected),
            observed: u64::from(observed),
        });
    }

    /// Compares the DUT-side memory image with the golden store word by word.
    pub fn sweep(&mut self, cycle: u64, memory: &BankStore, golden: &BankStore) {
        self.comparisons += (golden.num_banks() * golden.words_per_bank()) as u64;
        for diff in golden.diff(memory) {
            self.record(Mismatch {
                kind: MismatchKind::Memory,
                cycle,
                channel: None,
                target: Target::Memory(diff.loc),
                expected: u64::from(diff.left),
                observed: u64::from(diff.right),
            });
        }
    }

    /// Stored mismatches.
    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }

    /// Every mismatch detected so far.
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Comparisons performed so far.
    pub const fn comparisons(&self) -> u64 {
        self.comparisons
    }

    /// Current verdict.
    pub const fn verdict(&self) -> Verdict {
        if self.total == 0 { Verdict::Pass } else { Verdict::Fail }
    }

    /// Folds the records into a report.
    pub fn into_report(self, mut stats: RunStats) -> RunReport {
        stats.comparisons = self.comparisons;
        RunReport {
            verdict: self.verdict(),
            mismatches: self.mismatches,
            total_mismatches: self.total,
            stats,
        }
    }
}
