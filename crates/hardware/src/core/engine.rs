//! Streaming engine.
//!
//! Drives the fabric side of every channel and advances the golden model one cycle
//! at a time. Each cycle has two halves:
//! 1. **Drive:** Before the clock edge, decide the stall line and each OUTSTREAM
//!    channel's write enable and payload, and poke them onto the DUT.
//! 2. **Step:** After the edge, advance every channel against the pre-cycle golden
//!    store, collect the expectations the oracle checks, and only then commit the
//!    writes accepted on this edge.
//!
//! Committing after all channels have been stepped keeps sibling channels isolated
//! within a cycle.

use tracing::debug;

use super::addrgen::{ChannelState, Mode};
use super::io_ctrl::IoCtrl;
use crate::common::{GlbAddr, XorShift};
use crate::config::{RunConfig, StallPolicy};
use crate::soc::memory::BankStore;
use crate::soc::traits::{Clocked, Signal};
use crate::verify::{Expectation, MismatchKind};

/// First payload word the fabric writes on every OUTSTREAM channel.
pub const PAYLOAD_BASE: u16 = 500;

/// Fabric inputs driven for one cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stimulus {
    /// Shared stall line.
    pub stall: bool,
    /// Write enable per channel.
    pub wr_en: Vec<bool>,
}

/// Golden-side counters accumulated while streaming.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineCounters {
    /// Cycles stepped since the start pulse.
    pub cycles: u64,
    /// Cycles with the stall line high.
    pub stalled_cycles: u64,
    /// Words delivered to the fabric.
    pub words_in: u64,
    /// Words accepted from the fabric.
    pub words_out: u64,
}

/// The cycle-by-cycle golden model of every channel.
#[derive(Debug)]
pub struct StreamingEngine {
    io: IoCtrl,
    rng: XorShift,
    stall: StallPolicy,
    wr_en_percent: u8,
    app_latency: u64,
    payloads: Vec<Vec<u16>>,
    next_payload: Vec<usize>,
    started: bool,
    stimulus: Stimulus,
    pending: Vec<(GlbAddr, u16)>,
    counters: EngineCounters,
}

impl StreamingEngine {
    /// Creates an engine over a validated channel table.
    ///
    /// Every OUTSTREAM channel writes `500 + i` as its `i`th word.
    pub fn new(io: IoCtrl, run: &RunConfig) -> Self {
        let payloads = io
            .channels()
            .iter()
            .map(|ch| {
                if ch.mode() == Mode::Outstream {
                    (0..ch.num_words()).map(|i| PAYLOAD_BASE.wrapping_add(i as u16)).collect()
                } else {
                    Vec::new()
                }
            })
            .collect();
        let n = io.channels().len();
        Self {
            io,
            rng: XorShift::new(run.seed),
            stall: run.stall,
            wr_en_percent: run.wr_en_percent,
            app_latency: run.app_latency,
            payloads,
            next_payload: vec![0; n],
            started: false,
            stimulus: Stimulus {
                stall: false,
                wr_en: vec![false; n],
            },
            pending: Vec::new(),
            counters: EngineCounters::default(),
        }
    }

    /// Replaces the words the fabric writes on `channel`.
    ///
    /// A payload shorter than the transfer leaves the channel waiting for data forever.
    pub fn set_payload(&mut self, channel: usize, payload: Vec<u16>) {
        self.payloads[channel] = payload;
    }

    /// The channel table.
    pub const fn io(&self) -> &IoCtrl {
        &self.io
    }

    /// Counters accumulated so far.
    pub const fn counters(&self) -> EngineCounters {
        self.counters
    }

    /// Inputs driven for the current cycle.
    pub const fn stimulus(&self) -> &Stimulus {
        &self.stimulus
    }

    /// Returns `true` once the start pulse has been applied.
    pub const fn started(&self) -> bool {
        self.started
    }

    /// Returns `true` once every channel has finished.
    pub fn is_complete(&self) -> bool {
        self.started && self.io.is_complete()
    }

    /// Applies the start pulse to the golden model. The arming edge moves no data.
    pub fn start(&mut self) {
        self.io.arm_all();
        self.started = true;
        for ch in self.io.channels() {
            if ch.state() == ChannelState::Active {
                debug!("ch{} armed: {} {} words from {}", ch.id(), ch.mode(), ch.num_words(), ch.start());
            }
        }
    }

    fn stalled(&mut self, cycle: u64) -> bool {
        match self.stall {
            StallPolicy::Never => false,
            StallPolicy::Random { percent } => self.rng.chance(percent),
            StallPolicy::Burst { start, len } => cycle >= start && cycle - start < len,
        }
    }

    /// Decides this cycle's fabric inputs and drives them onto `bench`.
    pub fn drive<C: Clocked + ?Sized>(&mut self, bench: &mut C) {
        let cycle = self.counters.cycles;
        let stall = self.started && self.stalled(cycle);
        bench.poke(Signal::GlcToIoStall, u64::from(stall));
        self.stimulus.stall = stall;

        for id in 0..self.stimulus.wr_en.len() {
            if self.io.channels()[id].mode() != Mode::Outstream {
                continue;
            }
            let next = self.next_payload[id];
            let word = self.payloads[id].get(next).copied();
            let wr_en = self.started
                && cycle >= self.app_latency
                && word.is_some()
                && self.rng.chance(self.wr_en_percent);
            bench.poke(Signal::CgraToIoWrEn(id), u64::from(wr_en));
            bench.poke(Signal::CgraToIoWrData(id), u64::from(word.unwrap_or(0)));
            self.stimulus.wr_en[id] = wr_en;
        }
    }

    /// Drives every fabric input low.
    pub fn quiesce<C: Clocked + ?Sized>(&mut self, bench: &mut C) {
        bench.poke(Signal::GlcToIoStall, 0);
        for id in 0..self.stimulus.wr_en.len() {
            bench.poke(Signal::CgraToIoWrEn(id), 0);
            self.stimulus.wr_en[id] = false;
        }
        self.stimulus.stall = false;
    }

    /// Advances every channel across the clock edge just applied.
    ///
    /// Reads come from `golden` as it stood before the edge; writes accepted on this
    /// edge are committed after every channel has been stepped.
    ///
    /// # Returns
    ///
    /// What the DUT's fabric-side outputs must read after the edge.
    pub fn step(&mut self, golden: &mut BankStore) -> Vec<Expectation> {
        let baw = self.io.bank_addr_width();
        let stall = self.stimulus.stall;
        let mut expectations = Vec::with_capacity(self.io.channels().len() * 2);

        for id in 0..self.io.channels().len() {
            let wr_en = self.stimulus.wr_en[id];
            let ch = &mut self.io.channels_mut()[id];
            let transfer = ch.step(stall, wr_en);
            let mode = ch.mode();

            if mode == Mode::Sram {
                continue;
            }

            match transfer.delivered {
                Some(addr) => {
                    let word = golden.read_word(addr.decompose(baw));
                    debug!("ch{id} deliver {addr} = {word:#06x}");
                    self.counters.words_in += 1;
                    expectations.push(Expectation::new(id, Signal::IoToCgraRdDataValid(id), 1, MismatchKind::Data));
                    expectations.push(Expectation::new(
                        id,
                        Signal::IoToCgraRdData(id),
                        u64::from(word),
                        MismatchKind::Data,
                    ));
                }
                None => {
                    let kind = if mode == Mode::Instream && ch.is_exhausted() {
                        MismatchKind::Exhaustion
                    } else {
                        MismatchKind::Data
                    };
                    expectations.push(Expectation::new(id, Signal::IoToCgraRdDataValid(id), 0, kind));
                }
            }

            let done_kind = if mode == Mode::Outstream && !transfer.done && ch.done_raised() {
                MismatchKind::Exhaustion
            } else {
                MismatchKind::Data
            };
            expectations.push(Expectation::new(
                id,
                Signal::CgraDonePulse(id),
                u64::from(transfer.done),
                done_kind,
            ));

            if let Some(addr) = transfer.accepted {
                let index = self.next_payload[id];
                let word = self.payloads[id].get(index).copied().unwrap_or(0);
                self.next_payload[id] = index + 1;
                self.counters.words_out += 1;
                debug!("ch{id} accept {addr} <= {word:#06x}");
                self.pending.push((addr, word));
            }
            if transfer.done {
                debug!("ch{id} done");
            }
        }

        for (addr, word) in self.pending.drain(..) {
            golden.write_word(addr.decompose(baw), word);
        }
        if self.started {
            self.counters.cycles += 1;
            if stall {
                self.counters.stalled_cycles += 1;
            }
        }
        expectations
    }
}
