//! # IO Controller Model Tests
//!
//! Drives the behavioral model through its testbench and checks register access,
//! INSTREAM read latency and stall handling, and OUTSTREAM bank writes and done pulses.

use glbsim_core::common::BankLocation;
use glbsim_core::config::GlbConfig;
use glbsim_core::core::addrgen::Mode;
use glbsim_core::sim::Testbench;
use glbsim_core::soc::devices::{Fault, IoControllerModel};
use glbsim_core::soc::memory::BankStore;
use glbsim_core::soc::registers::{ConfigPort, RegisterId};
use glbsim_core::soc::traits::{Clocked, Dut, Signal};
use pretty_assertions::assert_eq;

use crate::common::harness::{bank_base, small_glb};

struct Rig {
    glb: GlbConfig,
    port: ConfigPort,
    bench: Testbench<IoControllerModel>,
}

impl Rig {
    fn new(fill_index: bool) -> Self {
        let glb = small_glb();
        let mut memory = BankStore::new(glb.num_banks, glb.words_per_bank());
        if fill_index {
            memory.fill_with(|_, i| i as u16);
        }
        Self {
            port: ConfigPort::new(&glb),
            bench: Testbench::new(IoControllerModel::new(&glb), memory),
            glb,
        }
    }

    fn write(&mut self, channel: usize, register: RegisterId, value: u32) {
        self.port
            .write_register(&mut self.bench, channel, register, value)
            .unwrap();
    }

    fn read(&mut self, channel: usize, register: RegisterId) -> u32 {
        self.port
            .read_register(&mut self.bench, channel, register, 0)
            .unwrap()
    }

    fn setup(&mut self, channel: usize, mode: Mode, start: u32, words: u32, switch_sel: u32) {
        self.write(channel, RegisterId::Mode, mode.bits());
        self.write(channel, RegisterId::StartAddr, start);
        self.write(channel, RegisterId::NumWords, words);
        if switch_sel != 0 {
            self.write(channel, RegisterId::SwitchSel, switch_sel);
        }
    }

    fn pulse(&mut self) {
        self.bench.poke(Signal::CgraStartPulse, 1);
        self.bench.tick();
        self.bench.poke(Signal::CgraStartPulse, 0);
    }

    fn tick(&mut self) {
        self.bench.tick();
    }

    fn delivered(&self, channel: usize) -> Option<u16> {
        (self.bench.peek(Signal::IoToCgraRdDataValid(channel)) == 1)
            .then(|| self.bench.peek(Signal::IoToCgraRdData(channel)) as u16)
    }

    fn collect(&mut self, channel: usize, stalls: &[bool]) -> Vec<Option<u16>> {
        stalls
            .iter()
            .map(|&stall| {
                self.bench.poke(Signal::GlcToIoStall, u64::from(stall));
                self.tick();
                self.delivered(channel)
            })
            .collect()
    }
}

#[test]
fn register_reset_values() {
    let mut rig = Rig::new(false);
    assert_eq!(rig.read(3, RegisterId::Mode), 0);
    assert_eq!(rig.read(3, RegisterId::StartPulseEn), 1);
    assert_eq!(rig.read(3, RegisterId::DonePulseEn), 1);
    assert_eq!(rig.read(3, RegisterId::SwitchSel), 0);
}

#[test]
fn register_write_read_back() {
    let mut rig = Rig::new(false);
    rig.write(2, RegisterId::StartAddr, 0x1234);
    rig.write(5, RegisterId::SwitchSel, 0b1100);
    assert_eq!(rig.read(2, RegisterId::StartAddr), 0x1234);
    assert_eq!(rig.read(5, RegisterId::SwitchSel), 0b1100);
    assert_eq!(rig.read(2, RegisterId::SwitchSel), 0);
}

#[test]
fn unknown_register_is_ignored() {
    let mut rig = Rig::new(false);
    assert_eq!(rig.read(1, RegisterId::StartPulseEn), 1);
    let addr = (7u64 << rig.glb.config_feature_width) | 1;
    rig.bench.poke(Signal::ConfigEn, 1);
    rig.bench.poke(Signal::ConfigRd, 1);
    rig.bench.poke(Signal::ConfigAddr, addr);
    rig.tick();
    assert_eq!(rig.bench.peek(Signal::ConfigRdData), 0);
}

#[test]
fn clock_enable_low_freezes_registers() {
    let mut rig = Rig::new(false);
    rig.bench.poke(Signal::ClkEn, 0);
    rig.write(0, RegisterId::NumWords, 99);
    rig.bench.poke(Signal::ClkEn, 1);
    assert_eq!(rig.read(0, RegisterId::NumWords), 0);
}

#[test]
fn instream_words_arrive_one_cycle_after_the_row_read() {
    let mut rig = Rig::new(true);
    rig.setup(0, Mode::Instream, 0x100, 4, 0b1000);
    rig.pulse();
    assert_eq!(rig.delivered(0), None);

    let got = rig.collect(0, &[false; 6]);
    assert_eq!(got, vec![None, Some(128), Some(129), Some(130), Some(131), None]);
}

#[test]
fn instream_presents_row_aligned_read_address() {
    let mut rig = Rig::new(true);
    rig.setup(0, Mode::Instream, bank_base(3) + 0x0A, 2, 0b1000);
    rig.pulse();
    rig.bench.dut_mut().settle();
    assert_eq!(rig.bench.peek(Signal::IoToBankRdEn(3)), 1);
    assert_eq!(rig.bench.peek(Signal::IoToBankRdAddr(3)), 0x08);
    assert_eq!(rig.bench.peek(Signal::IoToBankRdEn(0)), 0);
}

#[test]
fn instream_stall_holds_the_returned_word() {
    let mut rig = Rig::new(true);
    rig.setup(0, Mode::Instream, 0x100, 4, 0b1000);
    rig.pulse();

    let got = rig.collect(0, &[false, false, true, false, false, false, false]);
    assert_eq!(
        got,
        vec![None, Some(128), None, Some(129), Some(130), Some(131), None]
    );
}

#[test]
fn channel_without_banks_ignores_start_pulse() {
    let mut rig = Rig::new(true);
    rig.setup(0, Mode::Instream, 0x100, 4, 0);
    rig.pulse();
    let got = rig.collect(0, &[false; 4]);
    assert!(got.iter().all(Option::is_none));
    assert_eq!(rig.bench.bank_reads(), 0);
}

#[test]
fn start_pulse_enable_gates_arming() {
    let mut rig = Rig::new(true);
    rig.setup(0, Mode::Instream, 0x100, 4, 0b1000);
    rig.write(0, RegisterId::StartPulseEn, 0);
    rig.pulse();
    let got = rig.collect(0, &[false; 4]);
    assert!(got.iter().all(Option::is_none));
}

#[test]
fn outstream_writes_land_one_cycle_after_acceptance() {
    let mut rig = Rig::new(false);
    let start = bank_base(1) + 8;
    rig.setup(1, Mode::Outstream, start, 2, 0b1000);
    rig.pulse();

    rig.bench.poke(Signal::CgraToIoWrEn(1), 1);
    rig.bench.poke(Signal::CgraToIoWrData(1), 0xAAAA);
    rig.tick();
    assert_eq!(rig.bench.peek(Signal::IoToBankWrEn(1)), 1);
    assert_eq!(rig.bench.peek(Signal::IoToBankWrAddr(1)), 8);
    assert_eq!(rig.bench.peek(Signal::IoToBankWrData(1)), 0xAAAA);
    assert_eq!(rig.bench.peek(Signal::IoToBankWrDataBitSel(1)), 0xFFFF);
    assert_eq!(rig.bench.memory().read_word(BankLocation::new(1, 8)), 0);

    rig.bench.poke(Signal::CgraToIoWrData(1), 0xBBBB);
    rig.tick();
    assert_eq!(rig.bench.memory().read_word(BankLocation::new(1, 8)), 0xAAAA);
    assert_eq!(rig.bench.peek(Signal::IoToBankWrAddr(1)), 10);
    assert_eq!(rig.bench.peek(Signal::IoToBankWrData(1)), 0xBBBB << 16);
    assert_eq!(rig.bench.peek(Signal::IoToBankWrDataBitSel(1)), 0xFFFF << 16);
    assert_eq!(rig.bench.peek(Signal::CgraDonePulse(1)), 0);

    rig.bench.poke(Signal::CgraToIoWrEn(1), 0);
    rig.tick();
    assert_eq!(rig.bench.memory().read_word(BankLocation::new(1, 10)), 0xBBBB);
    assert_eq!(rig.bench.peek(Signal::IoToBankWrEn(1)), 0);
    assert_eq!(rig.bench.peek(Signal::CgraDonePulse(1)), 1);

    rig.tick();
    assert_eq!(rig.bench.peek(Signal::CgraDonePulse(1)), 0);
    assert_eq!(rig.bench.bank_writes(), 2);
}

#[test]
fn outstream_refuses_writes_while_stalled() {
    let mut rig = Rig::new(false);
    rig.setup(1, Mode::Outstream, bank_base(1), 1, 0b1000);
    rig.pulse();

    rig.bench.poke(Signal::GlcToIoStall, 1);
    rig.bench.poke(Signal::CgraToIoWrEn(1), 1);
    rig.bench.poke(Signal::CgraToIoWrData(1), 0x1111);
    rig.tick();
    assert_eq!(rig.bench.peek(Signal::IoToBankWrEn(1)), 0);

    rig.bench.poke(Signal::GlcToIoStall, 0);
    rig.tick();
    assert_eq!(rig.bench.peek(Signal::IoToBankWrEn(1)), 1);
}

#[test]
fn done_pulse_enable_suppresses_pulse() {
    let mut rig = Rig::new(false);
    rig.setup(1, Mode::Outstream, bank_base(1), 1, 0b1000);
    rig.write(1, RegisterId::DonePulseEn, 0);
    rig.pulse();
    rig.bench.poke(Signal::CgraToIoWrEn(1), 1);
    for _ in 0..4 {
        rig.tick();
        assert_eq!(rig.bench.peek(Signal::CgraDonePulse(1)), 0);
    }
    assert_eq!(rig.bench.bank_writes(), 1);
}

#[test]
fn out_of_range_signals_read_zero() {
    let model = IoControllerModel::new(&GlbConfig::default());
    assert_eq!(model.read(Signal::IoToCgraRdData(99)), 0);
    assert_eq!(model.read(Signal::IoToBankWrEn(99)), 0);
    assert_eq!(model.read(Signal::ClkEn), 1);
}

#[test]
fn faults_accumulate() {
    let model = IoControllerModel::new(&small_glb())
        .with_fault(Fault::IgnoreStall)
        .with_fault(Fault::ExtraDone { channel: 2 });
    assert_eq!(model.faults(), &[Fault::IgnoreStall, Fault::ExtraDone { channel: 2 }]);
}
