//! # Configuration Register Protocol Tests
//!
//! Verifies register id decoding, flat address composition and the exact
//! cycle-by-cycle signal sequence of register transactions.

#![allow(unused_results)]

use glbsim_core::common::ConfigError;
use glbsim_core::config::GlbConfig;
use glbsim_core::soc::registers::{ConfigAddr, ConfigPort, RegisterId};
use glbsim_core::soc::traits::Signal;
use mockall::Sequence;
use mockall::predicate::eq;
use rstest::rstest;

use crate::common::mocks::clocked::{MockBench, RecordingBench};

#[rstest]
#[case(0, RegisterId::Mode)]
#[case(1, RegisterId::StartAddr)]
#[case(2, RegisterId::NumWords)]
#[case(3, RegisterId::StartPulseEn)]
#[case(4, RegisterId::DonePulseEn)]
#[case(5, RegisterId::SwitchSel)]
fn register_ids(#[case] id: u32, #[case] register: RegisterId) {
    assert_eq!(RegisterId::from_id(id), Ok(register));
    assert_eq!(register.id(), id);
}

#[test]
fn unknown_register_id() {
    assert_eq!(RegisterId::from_id(6), Err(ConfigError::InvalidRegister(6)));
}

#[test]
fn register_names() {
    assert_eq!(RegisterId::SwitchSel.to_string(), "SWITCH_SEL");
    assert_eq!(RegisterId::StartPulseEn.to_string(), "START_PULSE_EN");
}

#[test]
fn flat_address_layout() {
    let codec = ConfigAddr::new(8);
    assert_eq!(codec.encode(3, RegisterId::NumWords), 0x203);
    assert_eq!(codec.encode(0, RegisterId::Mode), 0);
    assert_eq!(codec.decode(0x203), (3, 2));
    assert_eq!(codec.decode(0x507), (7, 5));
}

#[test]
fn write_is_one_strobed_cycle() {
    let port = ConfigPort::new(&GlbConfig::default());
    let mut bench = MockBench::new();
    let mut seq = Sequence::new();

    bench
        .expect_poke()
        .with(eq(Signal::ConfigEn), eq(1))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    bench
        .expect_poke()
        .with(eq(Signal::ConfigWr), eq(1))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    bench
        .expect_poke()
        .with(eq(Signal::ConfigAddr), eq(0x102))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    bench
        .expect_poke()
        .with(eq(Signal::ConfigWrData), eq(0x1234))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    bench.expect_tick().times(1).in_sequence(&mut seq).return_const(());
    bench
        .expect_poke()
        .with(eq(Signal::ConfigEn), eq(0))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    bench
        .expect_poke()
        .with(eq(Signal::ConfigWr), eq(0))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());

    port.write_register(&mut bench, 2, RegisterId::StartAddr, 0x1234).unwrap();
}

#[test]
fn read_returns_registered_data() {
    let port = ConfigPort::new(&GlbConfig::default());
    let mut bench = MockBench::new();

    bench.expect_poke().return_const(());
    bench.expect_tick().times(1).return_const(());
    bench
        .expect_peek()
        .with(eq(Signal::ConfigRdData))
        .times(1)
        .return_const(0x42u64);

    assert_eq!(port.read_register(&mut bench, 1, RegisterId::NumWords, 0x42), Ok(0x42));
}

#[test]
fn read_drives_read_strobe_not_write() {
    let port = ConfigPort::new(&GlbConfig::default());
    let mut bench = RecordingBench::new();
    let _ = port.read_register(&mut bench, 4, RegisterId::SwitchSel, 0).unwrap();
    assert_eq!(bench.ticks, 1);
    assert_eq!(bench.peek_recorded(Signal::ConfigAddr), Some(0x504));
    assert_eq!(bench.peek_recorded(Signal::ConfigRd), Some(0));
    assert_eq!(bench.peek_recorded(Signal::ConfigWr), None);
}

#[test]
fn out_of_range_channel_never_touches_the_bench() {
    let port = ConfigPort::new(&GlbConfig::default());
    let mut bench = MockBench::new();
    assert_eq!(
        port.write_register(&mut bench, 8, RegisterId::Mode, 1),
        Err(ConfigError::ChannelOutOfRange {
            channel: 8,
            num_channels: 8,
        })
    );
    assert!(port.read_register(&mut bench, 9, RegisterId::Mode, 0).is_err());
}
