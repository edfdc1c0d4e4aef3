//! # End-to-End Scenario Tests
//!
//! Full oracle runs against the behavioral IO controller model: clean runs must pass,
//! and every injected fault must be caught and classified.

use glbsim_core::common::{BankLocation, ConfigError, GlbAddr, SimError};
use glbsim_core::config::{ChannelSpec, Config, GlbConfig, MemoryFill, StallPolicy};
use glbsim_core::core::addrgen::Mode;
use glbsim_core::sim::{Scenario, Simulator};
use glbsim_core::soc::devices::{Fault, IoControllerModel};
use glbsim_core::verify::MismatchKind;
use rstest::rstest;

use crate::common::harness::{bank_base, config_with, init_tracing, run, run_with_faults, small_glb};

fn mixed() -> Config {
    config_with(vec![
        ChannelSpec::new(0, Mode::Instream, 0x100, 40, 1),
        ChannelSpec::new(1, Mode::Outstream, bank_base(1) + 0x20, 40, 1),
    ])
}

#[test]
fn io_controller_scenario_passes() {
    let config = Scenario::IoController.config(small_glb()).unwrap();
    let report = run(&config).unwrap();
    assert!(report.passed(), "{:?}", report.mismatches);
    assert_eq!(report.stats.words_in, 2000);
    assert_eq!(report.stats.words_out, 1000);
    assert_eq!(report.stats.bank_writes, 1000);
    assert!(report.stats.config_cycles > 0);
}

#[test]
fn io_controller_scenario_passes_at_full_bank_size() {
    let config = Scenario::IoController.config(GlbConfig::default()).unwrap();
    assert_eq!(config.channels[0].start_addr, (5 << 17) + (1 << 15) + 100);
    assert_eq!(config.channels[2].start_addr, (16 << 17) + 100);
    let report = run(&config).unwrap();
    assert!(report.passed(), "{:?}", report.mismatches);
    assert_eq!(report.stats.words_in, 2000);
    assert_eq!(report.stats.words_out, 1000);
}

#[rstest]
#[case(Scenario::Instream)]
#[case(Scenario::Outstream)]
fn scenario_rejects_banks_too_small_to_place_it(#[case] scenario: Scenario) {
    let glb = GlbConfig::default().with_bank_addr_width(4);
    assert!(glb.validate().is_ok());
    assert!(matches!(scenario.config(glb), Err(ConfigError::InvalidGeometry(_))));
}

#[rstest]
#[case(Scenario::IoController)]
#[case(Scenario::Instream)]
#[case(Scenario::Outstream)]
fn scenario_rejects_invalid_geometry(#[case] scenario: Scenario) {
    let glb = GlbConfig::default().with_bank_addr_width(1);
    assert!(matches!(scenario.config(glb), Err(ConfigError::InvalidGeometry(_))));
}

#[rstest]
#[case(Scenario::IoController)]
#[case(Scenario::Instream)]
#[case(Scenario::Outstream)]
fn scenarios_pass_under_random_stalls(#[case] scenario: Scenario) {
    let mut config = scenario.config(small_glb()).unwrap();
    config.run.stall = StallPolicy::Random { percent: 25 };
    config.run.seed = 0xC0FFEE;
    let report = run(&config).unwrap();
    assert!(report.passed(), "{scenario}: {:?}", report.mismatches);
    assert!(report.stats.stalled_cycles > 0);
}

#[test]
fn burst_scenarios_pass() {
    for scenario in [Scenario::Instream, Scenario::Outstream] {
        let report = run(&scenario.config(small_glb()).unwrap()).unwrap();
        assert!(report.passed(), "{scenario}: {:?}", report.mismatches);
        assert_eq!(report.stats.stalled_cycles, 12);
    }
}

#[test]
fn random_memory_fill_passes() {
    let mut config = mixed();
    config.run.fill = MemoryFill::Random;
    let report = run(&config).unwrap();
    assert!(report.passed(), "{:?}", report.mismatches);
}

#[test]
fn register_read_back_is_checked() {
    let with = run(&mixed()).unwrap();
    let mut config = mixed();
    config.run.verify_registers = false;
    let without = run(&config).unwrap();
    assert!(with.passed() && without.passed());
    assert_eq!(with.stats.config_cycles - without.stats.config_cycles, 8 * 6);
}

#[test]
fn corrupted_read_is_a_data_mismatch() {
    let report = run_with_faults(&mixed(), &[Fault::CorruptRead { channel: 0, word: 7 }]).unwrap();
    assert!(!report.passed());
    assert_eq!(report.total_mismatches, 1);
    assert_eq!(report.count(MismatchKind::Data), 1);
    assert_eq!(report.mismatches[0].channel, Some(0));
}

#[test]
fn dropped_write_is_a_memory_mismatch() {
    let report = run_with_faults(&mixed(), &[Fault::DropWrite { channel: 1, word: 3 }]).unwrap();
    assert_eq!(report.total_mismatches, 1);
    assert_eq!(report.count(MismatchKind::Memory), 1);
    assert_eq!(report.mismatches[0].expected, 503);
    assert_eq!(report.stats.bank_writes, 39);
}

#[test]
fn repeated_done_is_an_exhaustion_mismatch() {
    let report = run_with_faults(&mixed(), &[Fault::ExtraDone { channel: 1 }]).unwrap();
    assert_eq!(report.total_mismatches, 1);
    assert_eq!(report.count(MismatchKind::Exhaustion), 1);
}

#[test]
fn ignoring_stall_is_caught() {
    let mut config = mixed();
    config.run.stall = StallPolicy::Burst { start: 10, len: 5 };
    let report = run_with_faults(&config, &[Fault::IgnoreStall]).unwrap();
    assert!(!report.passed());
}

#[test]
fn record_cap_limits_stored_mismatches() {
    let mut config = mixed();
    config.run.stall = StallPolicy::Random { percent: 50 };
    config.run.max_reported = 3;
    let report = run_with_faults(&config, &[Fault::IgnoreStall]).unwrap();
    assert_eq!(report.mismatches.len(), 3);
    assert!(report.total_mismatches > 3);
}

#[test]
fn cycle_budget_exhaustion_is_a_timeout() {
    let mut config = mixed();
    config.run.max_cycles = 10;
    let err = run(&config).unwrap_err();
    assert!(matches!(err, SimError::Timeout { cycles: 10 }));
}

#[test]
fn malformed_scenario_is_rejected_before_simulation() {
    let config = config_with(vec![ChannelSpec::new(0, Mode::Instream, 0x101, 4, 1)]);
    let err = run(&config).unwrap_err();
    assert!(matches!(
        err,
        SimError::Config(ConfigError::UnalignedAddress {
            channel: 0,
            addr: GlbAddr(0x101),
        })
    ));
}

#[test]
fn channel_ignoring_start_pulse_stays_quiet() {
    let mut gated = ChannelSpec::new(0, Mode::Instream, 0x100, 40, 1);
    gated.start_pulse_en = false;
    let config = config_with(vec![gated, ChannelSpec::new(1, Mode::Outstream, bank_base(1), 8, 1)]);
    let report = run(&config).unwrap();
    assert!(report.passed(), "{:?}", report.mismatches);
    assert_eq!(report.stats.words_in, 0);
    assert_eq!(report.stats.words_out, 8);
}

#[test]
fn same_seed_reproduces_the_run() {
    let mut config = mixed();
    config.run.stall = StallPolicy::Random { percent: 30 };
    config.run.wr_en_percent = 60;
    assert_eq!(run(&config).unwrap(), run(&config).unwrap());
}

#[test]
fn json_scenario_runs() {
    let json = r#"{
        "glb": { "bank_addr_width": 12 },
        "run": { "settle_cycles": 2, "app_latency": 0, "drain_cycles": 4 },
        "channels": [
            { "id": 3, "mode": "Outstream", "start_addr": 4096, "num_words": 16, "num_banks": 1 },
            { "id": 5, "mode": "Instream", "start_addr": 8192, "num_words": 16, "num_banks": 1 }
        ]
    }"#;
    let config = Config::from_json(json).unwrap();
    let report = run(&config).unwrap();
    assert!(report.passed(), "{:?}", report.mismatches);
    assert_eq!(report.stats.words_in + report.stats.words_out, 32);
}

#[test]
fn zero_word_transfer_completes_quietly() {
    let config = config_with(vec![ChannelSpec::new(2, Mode::Outstream, 0x40, 0, 1)]);
    let report = run(&config).unwrap();
    assert!(report.passed(), "{:?}", report.mismatches);
    assert_eq!(report.stats.bank_writes, 0);
}

fn outstream_sim() -> Simulator<IoControllerModel> {
    init_tracing();
    let config = config_with(vec![ChannelSpec::new(1, Mode::Outstream, bank_base(1), 2, 1)]);
    let mut sim = Simulator::new(&config, IoControllerModel::new(&config.glb)).unwrap();
    sim.engine_mut().set_payload(1, vec![0x1234, 0x5678]);
    sim.configure().unwrap();
    sim.idle(2);
    sim.start();
    sim.stream().unwrap();
    sim.idle(4);
    sim
}

#[test]
fn phases_can_be_driven_one_at_a_time() {
    let mut sim = outstream_sim();
    sim.sweep();
    assert_eq!(sim.golden().read_word(BankLocation::new(1, 2)), 0x5678);
    assert_eq!(sim.bench().memory(), sim.golden());
    assert_eq!(sim.oracle().total(), 0);
    assert_eq!(sim.stats().words_out, 2);
    assert_eq!(sim.stats().bank_writes, 2);
}

#[test]
fn sweep_catches_stray_memory_writes() {
    let mut sim = outstream_sim();
    sim.bench_mut()
        .memory_mut()
        .write_word(BankLocation::new(7, 0x40), 0xDEAD);
    sim.sweep();
    assert_eq!(sim.oracle().total(), 1);
    assert_eq!(sim.oracle().mismatches()[0].kind, MismatchKind::Memory);
    assert_eq!(sim.oracle().mismatches()[0].observed, 0xDEAD);
}
