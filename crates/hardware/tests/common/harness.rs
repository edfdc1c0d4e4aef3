use glbsim_core::common::Result;
use glbsim_core::config::{ChannelSpec, Config, GlbConfig, RunConfig};
use glbsim_core::sim::Simulator;
use glbsim_core::soc::devices::{Fault, IoControllerModel};
use glbsim_core::verify::RunReport;
use tracing_subscriber::EnvFilter;

/// Bank address width used by tests: 4 KiB banks keep the stores small.
pub const TEST_BANK_ADDR_WIDTH: u32 = 12;

/// Installs a test-writer subscriber once per process; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

/// Reference geometry with small banks.
pub fn small_glb() -> GlbConfig {
    GlbConfig::default().with_bank_addr_width(TEST_BANK_ADDR_WIDTH)
}

/// Start address of `bank` in the small geometry.
pub const fn bank_base(bank: u32) -> u32 {
    bank << TEST_BANK_ADDR_WIDTH
}

/// Short pacing with every write presented, so runs stay fast and predictable.
pub fn quick_run() -> RunConfig {
    RunConfig {
        settle_cycles: 4,
        app_latency: 3,
        drain_cycles: 16,
        max_cycles: 50_000,
        wr_en_percent: 100,
        ..RunConfig::default()
    }
}

/// Builds a config on the small geometry with quick pacing.
pub fn config_with(channels: Vec<ChannelSpec>) -> Config {
    Config {
        glb: small_glb(),
        run: quick_run(),
        channels,
    }
}

/// Runs `config` against the behavioral model with `faults` injected.
pub fn run_with_faults(config: &Config, faults: &[Fault]) -> Result<RunReport> {
    init_tracing();
    let dut = faults
        .iter()
        .fold(IoControllerModel::new(&config.glb), |dut, &f| dut.with_fault(f));
    Simulator::new(config, dut)?.run()
}

/// Runs `config` against a fault-free behavioral model.
pub fn run(config: &Config) -> Result<RunReport> {
    run_with_faults(config, &[])
}
