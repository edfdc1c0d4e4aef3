//! Behavioral IO controller model.
//!
//! A cycle-based model of the IO controller array that implements [`Dut`]. It stands
//! in for the RTL so the oracle can run end to end, and it can be told to misbehave
//! (`Fault`) so the oracle's detection paths can be exercised.
//!
//! # Registers
//!
//! Per channel, addressed by `(register_id << feature_width) | channel`:
//!
//! * `0`: MODE (reset 0)
//! * `1`: START_ADDR (reset 0)
//! * `2`: NUM_WORDS (reset 0)
//! * `3`: START_PULSE_EN (reset 1)
//! * `4`: DONE_PULSE_EN (reset 1)
//! * `5`: SWITCH_SEL (reset 0)
//!
//! A read strobe registers the addressed value into `config_rd_data` on the edge.
//!
//! # Streaming
//!
//! * INSTREAM raises `io_to_bank_rd_en` combinationally on every unstalled cycle while
//!   reads remain. The row comes back on the next cycle's `bank_to_io_rd_data`; the
//!   word is delivered on the first unstalled edge after that, via a one-entry skid
//!   register when a stall intervenes.
//! * OUTSTREAM accepts `cgra_to_io_wr_en` on unstalled cycles while words remain and
//!   presents a single-lane bank write on the following cycle. The edge after the last
//!   acceptance raises `cgra_done_pulse` for one cycle if enabled.

use crate::common::constants::{WORD_BITS, WORD_BYTES, WORD_MASK};
use crate::common::{BankLocation, GlbAddr};
use crate::config::GlbConfig;
use crate::core::addrgen::Mode;
use crate::soc::registers::{ConfigAddr, RegisterId};
use crate::soc::traits::{Dut, Signal};

/// A deliberate defect injected into the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Flip bit 0 of the `word`th word (0-based) delivered on `channel`.
    CorruptRead {
        /// INSTREAM channel.
        channel: usize,
        /// Delivery index.
        word: u32,
    },
    /// Accept the `word`th write on `channel` without writing it to the banks.
    DropWrite {
        /// OUTSTREAM channel.
        channel: usize,
        /// Acceptance index.
        word: u32,
    },
    /// Raise the done pulse on `channel` a second time, one cycle after the first.
    ExtraDone {
        /// OUTSTREAM channel.
        channel: usize,
    },
    /// Keep streaming while the stall line is high.
    IgnoreStall,
}

/// Configuration registers of one channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ChannelRegs {
    mode: u32,
    start_addr: u32,
    num_words: u32,
    start_pulse_en: bool,
    done_pulse_en: bool,
    switch_sel: u32,
}

impl Default for ChannelRegs {
    fn default() -> Self {
        Self {
            mode: 0,
            start_addr: 0,
            num_words: 0,
            start_pulse_en: true,
            done_pulse_en: true,
            switch_sel: 0,
        }
    }
}

impl ChannelRegs {
    const fn get(&self, register: RegisterId) -> u32 {
        match register {
            RegisterId::Mode => self.mode,
            RegisterId::StartAddr => self.start_addr,
            RegisterId::NumWords => self.num_words,
            RegisterId::StartPulseEn => self.start_pulse_en as u32,
            RegisterId::DonePulseEn => self.done_pulse_en as u32,
            RegisterId::SwitchSel => self.switch_sel,
        }
    }

    const fn set(&mut self, register: RegisterId, value: u32) {
        match register {
            RegisterId::Mode => self.mode = value,
            RegisterId::StartAddr => self.start_addr = value,
            RegisterId::NumWords => self.num_words = value,
            RegisterId::StartPulseEn => self.start_pulse_en = value & 1 == 1,
            RegisterId::DonePulseEn => self.done_pulse_en = value & 1 == 1,
            RegisterId::SwitchSel => self.switch_sel = value,
        }
    }
}

/// Registered bank write presented by a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingWrite {
    loc: BankLocation,
    data: u64,
    bit_sel: u64,
}

/// Streaming state of one channel.
#[derive(Clone, Debug, Default)]
struct ChannelCore {
    active: bool,
    addr: u32,
    remaining: u32,

    issue_addr: u32,
    issue_left: u32,
    in_flight: Option<BankLocation>,
    held: Option<u16>,
    delivered: u32,

    accepted: u32,
    done_pending: bool,
    extra_done: bool,

    rd_data: u16,
    rd_valid: bool,
    done: bool,
    bank_write: Option<PendingWrite>,
}

/// Input pins of the model.
#[derive(Clone, Debug)]
struct Inputs {
    clk_en: bool,
    config_en: bool,
    config_wr: bool,
    config_rd: bool,
    config_addr: u32,
    config_wr_data: u32,
    start_pulse: bool,
    stall: bool,
    wr_en: Vec<bool>,
    wr_data: Vec<u16>,
    bank_rd_data: Vec<u64>,
}

/// Bank-side combinational outputs.
#[derive(Clone, Debug)]
struct BankOutputs {
    rd_en: Vec<bool>,
    rd_addr: Vec<u32>,
    wr: Vec<Option<PendingWrite>>,
}

/// Behavioral model of the IO controller array.
#[derive(Clone, Debug)]
pub struct IoControllerModel {
    bank_addr_width: u32,
    codec: ConfigAddr,
    regs: Vec<ChannelRegs>,
    cores: Vec<ChannelCore>,
    inputs: Inputs,
    banks: BankOutputs,
    config_rd_data: u32,
    faults: Vec<Fault>,
}

impl IoControllerModel {
    /// Creates a model in its reset state.
    pub fn new(config: &GlbConfig) -> Self {
        let channels = config.num_channels;
        let banks = config.num_banks;
        Self {
            bank_addr_width: config.bank_addr_width,
            codec: ConfigAddr::new(config.config_feature_width),
            regs: vec![ChannelRegs::default(); channels],
            cores: vec![ChannelCore::default(); channels],
            inputs: Inputs {
                clk_en: true,
                config_en: false,
                config_wr: false,
                config_rd: false,
                config_addr: 0,
                config_wr_data: 0,
                start_pulse: false,
                stall: false,
                wr_en: vec![false; channels],
                wr_data: vec![0; channels],
                bank_rd_data: vec![0; banks],
            },
            banks: BankOutputs {
                rd_en: vec![false; banks],
                rd_addr: vec![0; banks],
                wr: vec![None; banks],
            },
            config_rd_data: 0,
            faults: Vec::new(),
        }
    }

    /// Adds a fault.
    #[must_use]
    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.faults.push(fault);
        self
    }

    /// Faults currently injected.
    pub fn faults(&self) -> &[Fault] {
        &self.faults
    }

    fn ignores_stall(&self) -> bool {
        self.faults.contains(&Fault::IgnoreStall)
    }

    fn stalled(&self) -> bool {
        self.inputs.stall && !self.ignores_stall()
    }

    fn issues(&self, ch: usize) -> bool {
        let core = &self.cores[ch];
        Mode::from_bits(self.regs[ch].mode) == Mode::Instream
            && core.active
            && core.issue_left > 0
            && self.regs[ch].switch_sel != 0
            && !self.stalled()
    }

    fn locate(&self, addr: u32) -> BankLocation {
        GlbAddr(addr).decompose(self.bank_addr_width)
    }

    fn configure(&mut self) {
        if !self.inputs.config_en {
            return;
        }
        let (ch, id) = self.codec.decode(self.inputs.config_addr);
        let (Some(regs), Ok(register)) = (self.regs.get_mut(ch), RegisterId::from_id(id)) else {
            self.config_rd_data = 0;
            return;
        };
        if self.inputs.config_wr {
            regs.set(register, self.inputs.config_wr_data);
        } else if self.inputs.config_rd {
            self.config_rd_data = regs.get(register);
        }
    }

    fn arm(&mut self, ch: usize) -> bool {
        let regs = self.regs[ch];
        if !Mode::from_bits(regs.mode).is_streaming() || !regs.start_pulse_en || regs.switch_sel == 0 {
            return false;
        }
        self.cores[ch] = ChannelCore {
            active: regs.num_words > 0,
            addr: regs.start_addr,
            remaining: regs.num_words,
            issue_addr: regs.start_addr,
            issue_left: if Mode::from_bits(regs.mode) == Mode::Instream {
                regs.num_words
            } else {
                0
            },
            ..ChannelCore::default()
        };
        true
    }

    fn step_instream(&mut self, ch: usize) {
        let issued = self.issues(ch);
        let stalled = self.stalled();
        let rd_row = |loc: BankLocation| self.inputs.bank_rd_data[loc.bank];
        let returned = self.cores[ch]
            .in_flight
            .map(|loc| ((rd_row(loc) >> (loc.lane() as u32 * WORD_BITS)) & WORD_MASK) as u16);
        let issue_loc = self.locate(self.cores[ch].issue_addr);
        let corrupt = self.faults.iter().any(|f| {
            matches!(*f, Fault::CorruptRead { channel, word } if channel == ch && word == self.cores[ch].delivered)
        });

        let core = &mut self.cores[ch];
        core.rd_valid = false;
        if !core.active {
            return;
        }
        let word = core.held.take().or(returned);
        core.in_flight = None;
        if stalled {
            core.held = word;
            return;
        }
        if let Some(w) = word {
            core.rd_valid = true;
            core.rd_data = if corrupt { w ^ 1 } else { w };
            core.delivered += 1;
            core.addr += WORD_BYTES;
            core.remaining -= 1;
            if core.remaining == 0 {
                core.active = false;
            }
        }
        if issued {
            core.in_flight = Some(issue_loc);
            core.issue_addr += WORD_BYTES;
            core.issue_left -= 1;
        }
    }

    fn step_outstream(&mut self, ch: usize) {
        let stalled = self.stalled();
        let accept = self.inputs.wr_en[ch] && self.regs[ch].switch_sel != 0 && !stalled;
        let loc = self.locate(self.cores[ch].addr);
        let data = self.inputs.wr_data[ch];
        let drop = self.faults.iter().any(|f| {
            matches!(*f, Fault::DropWrite { channel, word } if channel == ch && word == self.cores[ch].accepted)
        });
        let extra = self.faults.contains(&Fault::ExtraDone { channel: ch });
        let done_pulse_en = self.regs[ch].done_pulse_en;

        let core = &mut self.cores[ch];
        core.done = core.done_pending && done_pulse_en;
        if core.extra_done {
            core.done = true;
            core.extra_done = false;
        } else if core.done_pending && extra {
            core.extra_done = true;
        }
        core.done_pending = false;
        core.bank_write = None;

        if core.active && core.remaining > 0 && accept {
            let shift = loc.lane() as u32 * WORD_BITS;
            if !drop {
                core.bank_write = Some(PendingWrite {
                    loc,
                    data: u64::from(data) << shift,
                    bit_sel: WORD_MASK << shift,
                });
            }
            core.accepted += 1;
            core.addr += WORD_BYTES;
            core.remaining -= 1;
            if core.remaining == 0 {
                core.active = false;
                core.done_pending = true;
            }
        }
    }
}

impl Dut for IoControllerModel {
    fn settle(&mut self) {
        self.banks.rd_en.fill(false);
        self.banks.wr.fill(None);
        for ch in 0..self.cores.len() {
            if self.issues(ch) {
                let loc = self.locate(self.cores[ch].issue_addr);
                self.banks.rd_en[loc.bank] = true;
                self.banks.rd_addr[loc.bank] = loc.row_offset();
            }
            if let Some(write) = self.cores[ch].bank_write {
                self.banks.wr[write.loc.bank] = Some(write);
            }
        }
    }

    fn advance_cycle(&mut self) {
        if self.inputs.clk_en {
            self.configure();
            for ch in 0..self.cores.len() {
                if self.inputs.start_pulse && self.arm(ch) {
                    continue;
                }
                match Mode::from_bits(self.regs[ch].mode) {
                    Mode::Instream => self.step_instream(ch),
                    Mode::Outstream => self.step_outstream(ch),
                    Mode::Idle | Mode::Sram => {
                        let core = &mut self.cores[ch];
                        core.rd_valid = false;
                        core.done = false;
                    }
                }
            }
        }
        self.settle();
    }

    fn read(&self, signal: Signal) -> u64 {
        let core = |ch: usize| self.cores.get(ch);
        let wr = |bank: usize| self.banks.wr.get(bank).copied().flatten();
        match signal {
            Signal::ClkEn => u64::from(self.inputs.clk_en),
            Signal::ConfigEn => u64::from(self.inputs.config_en),
            Signal::ConfigWr => u64::from(self.inputs.config_wr),
            Signal::ConfigRd => u64::from(self.inputs.config_rd),
            Signal::ConfigAddr => u64::from(self.inputs.config_addr),
            Signal::ConfigWrData => u64::from(self.inputs.config_wr_data),
            Signal::ConfigRdData => u64::from(self.config_rd_data),
            Signal::CgraStartPulse => u64::from(self.inputs.start_pulse),
            Signal::GlcToIoStall => u64::from(self.inputs.stall),
            Signal::CgraDonePulse(ch) => core(ch).map_or(0, |c| u64::from(c.done)),
            Signal::IoToCgraRdData(ch) => core(ch).map_or(0, |c| u64::from(c.rd_data)),
            Signal::IoToCgraRdDataValid(ch) => core(ch).map_or(0, |c| u64::from(c.rd_valid)),
            Signal::CgraToIoWrEn(ch) => self.inputs.wr_en.get(ch).map_or(0, |&v| u64::from(v)),
            Signal::CgraToIoWrData(ch) => self.inputs.wr_data.get(ch).map_or(0, |&v| u64::from(v)),
            Signal::IoToBankRdEn(b) => self.banks.rd_en.get(b).map_or(0, |&v| u64::from(v)),
            Signal::IoToBankRdAddr(b) => self.banks.rd_addr.get(b).map_or(0, |&v| u64::from(v)),
            Signal::BankToIoRdData(b) => self.inputs.bank_rd_data.get(b).copied().unwrap_or(0),
            Signal::IoToBankWrEn(b) => u64::from(wr(b).is_some()),
            Signal::IoToBankWrAddr(b) => wr(b).map_or(0, |w| u64::from(w.loc.offset)),
            Signal::IoToBankWrData(b) => wr(b).map_or(0, |w| w.data),
            Signal::IoToBankWrDataBitSel(b) => wr(b).map_or(0, |w| w.bit_sel),
        }
    }

    fn write(&mut self, signal: Signal, value: u64) {
        let bit = value & 1 == 1;
        match signal {
            Signal::ClkEn => self.inputs.clk_en = bit,
            Signal::ConfigEn => self.inputs.config_en = bit,
            Signal::ConfigWr => self.inputs.config_wr = bit,
            Signal::ConfigRd => self.inputs.config_rd = bit,
            Signal::ConfigAddr => self.inputs.config_addr = value as u32,
            Signal::ConfigWrData => self.inputs.config_wr_data = value as u32,
            Signal::CgraStartPulse => self.inputs.start_pulse = bit,
            Signal::GlcToIoStall => self.inputs.stall = bit,
            Signal::CgraToIoWrEn(ch) => {
                if let Some(v) = self.inputs.wr_en.get_mut(ch) {
                    *v = bit;
                }
            }
            Signal::CgraToIoWrData(ch) => {
                if let Some(v) = self.inputs.wr_data.get_mut(ch) {
                    *v = value as u16;
                }
            }
            Signal::BankToIoRdData(b) => {
                if let Some(v) = self.inputs.bank_rd_data.get_mut(b) {
                    *v = value;
                }
            }
            _ => {}
        }
    }
}
