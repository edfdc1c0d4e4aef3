//! Global buffer oracle CLI.
//!
//! This binary runs a scenario against the behavioral IO controller model. It performs:
//! 1. **Scenario selection:** A JSON scenario file or one of the built-in scenarios.
//! 2. **Overrides:** Seed, random stall rate and bank size from the command line.
//! 3. **Verdict:** Prints a summary and exits 0 on pass, 1 on fail, 2 on a malformed scenario.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use glbsim_core::common::SimError;
use glbsim_core::config::{Config, GlbConfig, StallPolicy};
use glbsim_core::sim::{Scenario, Simulator};
use glbsim_core::soc::devices::IoControllerModel;
use glbsim_core::verify::RunReport;

#[derive(Parser, Debug)]
#[command(
    name = "glbsim",
    author,
    version,
    about = "Global buffer golden model and checking oracle",
    long_about = "Run a streaming scenario against the behavioral IO controller model and check every cycle against the golden model.\n\nExamples:\n  glbsim run\n  glbsim run --scenario instream --stall-percent 20\n  glbsim run --config scenario.json --seed 42\n  RUST_LOG=debug glbsim run --bank-addr-width 12"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scenario and print the verdict.
    Run {
        /// JSON scenario file (overrides --scenario).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Built-in scenario.
        #[arg(short, long, value_enum, default_value_t = ScenarioArg::IoController)]
        scenario: ScenarioArg,

        /// Stimulus seed.
        #[arg(long)]
        seed: Option<u64>,

        /// Stall the shared backpressure line on this percentage of cycles.
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        stall_percent: Option<u8>,

        /// Address bits per bank (built-in scenarios only).
        #[arg(long)]
        bank_addr_width: Option<u32>,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the built-in scenarios.
    List,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScenarioArg {
    IoController,
    Instream,
    Outstream,
}

impl From<ScenarioArg> for Scenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::IoController => Self::IoController,
            ScenarioArg::Instream => Self::Instream,
            ScenarioArg::Outstream => Self::Outstream,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            config,
            scenario,
            seed,
            stall_percent,
            bank_addr_width,
            json,
        } => {
            let config = match load(config, scenario.into(), bank_addr_width) {
                Ok(mut config) => {
                    if let Some(seed) = seed {
                        config.run.seed = seed;
                    }
                    if let Some(percent) = stall_percent {
                        config.run.stall = StallPolicy::Random { percent };
                    }
                    config
                }
                Err(e) => {
                    eprintln!("error: {e}");
                    return ExitCode::from(2);
                }
            };
            cmd_run(&config, json)
        }
        Commands::List => {
            for scenario in Scenario::ALL {
                println!("{scenario}");
            }
            ExitCode::SUCCESS
        }
    }
}

fn load(path: Option<PathBuf>, scenario: Scenario, bank_addr_width: Option<u32>) -> Result<Config, SimError> {
    if let Some(path) = path {
        return Config::from_file(path);
    }
    let mut glb = GlbConfig::default();
    if let Some(width) = bank_addr_width {
        glb = glb.with_bank_addr_width(width);
    }
    Ok(scenario.config(glb)?)
}

/// Runs one scenario on the behavioral model and maps the outcome to an exit code.
fn cmd_run(config: &Config, json: bool) -> ExitCode {
    let dut = IoControllerModel::new(&config.glb);
    let result = Simulator::new(config, dut).and_then(Simulator::run);
    match result {
        Ok(report) => {
            if json {
                print_json(&report);
            } else {
                print_summary(&report);
            }
            if report.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(SimError::Timeout { cycles }) => {
            eprintln!("FAIL: channels did not complete within {cycles} cycles");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

fn print_summary(report: &RunReport) {
    let s = &report.stats;
    println!("{}", report.verdict);
    println!(
        "  cycles {} (config {}, streaming {}, stalled {})",
        s.cycles, s.config_cycles, s.streaming_cycles, s.stalled_cycles
    );
    println!(
        "  words in {}  words out {}  bank reads {}  bank writes {}",
        s.words_in, s.words_out, s.bank_reads, s.bank_writes
    );
    println!(
        "  {} comparisons, {} mismatches",
        s.comparisons, report.total_mismatches
    );
    for m in &report.mismatches {
        println!("  {m}");
    }
    let hidden = report.total_mismatches.saturating_sub(report.mismatches.len() as u64);
    if hidden > 0 {
        println!("  ... {hidden} more not shown");
    }
}

fn print_json(report: &RunReport) {
    let mismatches: Vec<String> = report.mismatches.iter().map(ToString::to_string).collect();
    let value = serde_json::json!({
        "verdict": report.verdict.to_string(),
        "total_mismatches": report.total_mismatches,
        "mismatches": mismatches,
        "stats": report.stats,
    });
    println!("{value:#}");
}
