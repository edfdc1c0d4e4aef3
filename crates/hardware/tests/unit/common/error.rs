//! # Error Tests
//!
//! Verifies error messages and conversions.

use glbsim_core::common::{ConfigError, GlbAddr, SimError};

#[test]
fn unaligned_address_display() {
    let err = ConfigError::UnalignedAddress {
        channel: 2,
        addr: GlbAddr(0x65),
    };
    assert_eq!(err.to_string(), "channel 2: address 0x00000065 is not word aligned");
}

#[test]
fn oversubscription_display() {
    let err = ConfigError::BankOversubscribed {
        channel: 1,
        requested: 4,
        available: 2,
    };
    assert_eq!(err.to_string(), "channel 1 cannot access 4 banks (2 available)");
}

#[test]
fn channel_out_of_range_display() {
    let err = ConfigError::ChannelOutOfRange {
        channel: 9,
        num_channels: 8,
    };
    assert!(err.to_string().contains("channel 9 out of range"));
}

#[test]
fn bank_conflict_display() {
    let err = ConfigError::BankConflict {
        channel: 4,
        other: 1,
        bank: 6,
    };
    assert_eq!(err.to_string(), "channel 4 touches bank 6, already used by channel 1");
}

#[test]
fn config_error_converts_into_sim_error() {
    let err: SimError = ConfigError::NoBanksGranted { channel: 3 }.into();
    assert!(matches!(err, SimError::Config(ConfigError::NoBanksGranted { channel: 3 })));
    assert!(err.to_string().starts_with("configuration error:"));
}

#[test]
fn timeout_display() {
    let err = SimError::Timeout { cycles: 10 };
    assert_eq!(err.to_string(), "run did not complete within 10 cycles");
}

#[test]
fn parse_error_converts() {
    let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
    let err: SimError = json_err.into();
    assert!(matches!(err, SimError::Parse(_)));
}
