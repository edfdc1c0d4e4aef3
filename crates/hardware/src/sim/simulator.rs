//! Simulator: drives one complete oracle run.
//!
//! A run walks through fixed phases:
//! 1. **Configure:** One register write per cycle for every listed channel.
//! 2. **Read-back:** Optionally read every register back and check it.
//! 3. **Settle:** Idle cycles, outputs checked quiet.
//! 4. **Start:** One cycle with the start pulse high.
//! 5. **Stream:** Cycle until every channel completes or the budget runs out.
//! 6. **Drain:** Idle cycles checking nothing fires after completion.
//! 7. **Sweep:** Compare the DUT's memory image with the golden store.

use tracing::{error, info};

use super::testbench::Testbench;
use crate::common::{Result, SimError, XorShift};
use crate::config::{Config, MemoryFill, RunConfig};
use crate::core::engine::StreamingEngine;
use crate::core::io_ctrl::IoCtrl;
use crate::soc::memory::BankStore;
use crate::soc::registers::{ConfigPort, RegisterId};
use crate::soc::traits::{Clocked, Dut, Signal};
use crate::stats::RunStats;
use crate::verify::{Oracle, RunReport};

/// Seeds a store with the run's initial memory contents.
pub fn seed_memory(store: &mut BankStore, fill: MemoryFill, seed: u64) {
    match fill {
        MemoryFill::Index => store.fill_with(|_, i| i as u16),
        MemoryFill::Random => {
            let mut rng = XorShift::new(seed.rotate_left(32));
            store.fill_with(|_, _| rng.next_word());
        }
    }
}

/// Top-level oracle run: golden model, checking oracle and a DUT on its testbench.
#[derive(Debug)]
pub struct Simulator<D: Dut> {
    run: RunConfig,
    port: ConfigPort,
    bench: Testbench<D>,
    golden: BankStore,
    engine: StreamingEngine,
    oracle: Oracle,
    config_cycles: u64,
    streaming_cycles: u64,
}

impl<D: Dut> Simulator<D> {
    /// Validates `config` and wires `dut` to a freshly seeded memory stub.
    ///
    /// # Errors
    ///
    /// `SimError::Config` if the geometry or channel table is malformed; nothing has
    /// been simulated in that case.
    pub fn new(config: &Config, dut: D) -> Result<Self> {
        let io = IoCtrl::new(&config.glb, &config.channels)?;
        let mut golden = BankStore::new(config.glb.num_banks, config.glb.words_per_bank());
        seed_memory(&mut golden, config.run.fill, config.run.seed);
        let bench = Testbench::new(dut, golden.clone());
        Ok(Self {
            run: config.run.clone(),
            port: ConfigPort::new(&config.glb),
            bench,
            golden,
            engine: StreamingEngine::new(io, &config.run),
            oracle: Oracle::new(config.run.max_reported),
            config_cycles: 0,
            streaming_cycles: 0,
        })
    }

    /// The testbench.
    pub const fn bench(&self) -> &Testbench<D> {
        &self.bench
    }

    /// Mutable access to the testbench.
    pub const fn bench_mut(&mut self) -> &mut Testbench<D> {
        &mut self.bench
    }

    /// The golden store.
    pub const fn golden(&self) -> &BankStore {
        &self.golden
    }

    /// The streaming engine.
    pub const fn engine(&self) -> &StreamingEngine {
        &self.engine
    }

    /// Mutable access to the streaming engine.
    pub const fn engine_mut(&mut self) -> &mut StreamingEngine {
        &mut self.engine
    }

    /// The oracle.
    pub const fn oracle(&self) -> &Oracle {
        &self.oracle
    }

    /// Writes every listed channel's registers, switch-select plan last.
    ///
    /// # Errors
    ///
    /// Propagates register protocol errors.
    pub fn configure(&mut self) -> Result<()> {
        let io = self.engine.io();
        let writes: Vec<_> = io
            .configured()
            .iter()
            .flat_map(|&id| io.register_writes(id))
            .collect();
        info!("configuring {} channels ({} register writes)", io.configured().len(), writes.len());
        for (channel, register, value) in writes {
            self.port.write_register(&mut self.bench, channel, register, value)?;
            self.config_cycles += 1;
        }
        Ok(())
    }

    /// Reads back every register of every channel and checks it.
    ///
    /// # Errors
    ///
    /// Propagates register protocol errors.
    pub fn verify_registers(&mut self) -> Result<()> {
        info!("verifying configuration registers");
        for channel in 0..self.engine.io().channels().len() {
            for register in RegisterId::ALL {
                let expected = self.engine.io().expected_register(channel, register);
                let observed = self.port.read_register(&mut self.bench, channel, register, expected)?;
                self.config_cycles += 1;
                self.oracle
                    .check_register(self.bench.cycle(), channel, register, expected, observed);
            }
        }
        Ok(())
    }

    fn check_cycle(&mut self) {
        let cycle = self.bench.cycle();
        let traffic = self.bench.take_traffic();
        self.oracle.check_bank_writes(cycle, &traffic, &self.golden);
        let expectations = self.engine.step(&mut self.golden);
        self.oracle.check(cycle, &self.bench, &expectations);
    }

    /// Runs one checked cycle with fresh fabric stimulus.
    pub fn cycle(&mut self) {
        self.engine.drive(&mut self.bench);
        self.bench.tick();
        self.check_cycle();
    }

    /// Runs `cycles` checked cycles with every fabric input low.
    pub fn idle(&mut self, cycles: u64) {
        self.engine.quiesce(&mut self.bench);
        for _ in 0..cycles {
            self.bench.tick();
            self.check_cycle();
        }
    }

    /// Applies the start pulse for one checked cycle and arms the golden model.
    pub fn start(&mut self) {
        info!("start pulse at cycle {}", self.bench.cycle());
        self.engine.quiesce(&mut self.bench);
        self.bench.poke(Signal::CgraStartPulse, 1);
        self.bench.tick();
        self.check_cycle();
        self.bench.poke(Signal::CgraStartPulse, 0);
        self.engine.start();
    }

    /// Cycles until every channel completes.
    ///
    /// # Errors
    ///
    /// `SimError::Timeout` if the run's cycle budget is exhausted first.
    pub fn stream(&mut self) -> Result<()> {
        info!("streaming");
        while !self.engine.is_complete() {
            if self.streaming_cycles >= self.run.max_cycles {
                error!("channels still active after {} cycles", self.streaming_cycles);
                return Err(SimError::Timeout {
                    cycles: self.run.max_cycles,
                });
            }
            self.cycle();
            self.streaming_cycles += 1;
        }
        info!("all channels complete after {} cycles", self.streaming_cycles);
        Ok(())
    }

    /// Compares the DUT's memory image with the golden store.
    pub fn sweep(&mut self) {
        info!("final memory sweep");
        self.oracle
            .sweep(self.bench.cycle(), self.bench.memory(), &self.golden);
    }

    /// Statistics so far.
    pub fn stats(&self) -> RunStats {
        let counters = self.engine.counters();
        RunStats {
            cycles: self.bench.cycle(),
            config_cycles: self.config_cycles,
            streaming_cycles: self.streaming_cycles,
            stalled_cycles: counters.stalled_cycles,
            words_in: counters.words_in,
            words_out: counters.words_out,
            bank_reads: self.bench.bank_reads(),
            bank_writes: self.bench.bank_writes(),
            comparisons: self.oracle.comparisons(),
        }
    }

    /// Runs every phase and produces the verdict.
    ///
    /// # Errors
    ///
    /// Register protocol errors and `SimError::Timeout`. Mismatches are not errors;
    /// they are in the report.
    pub fn run(mut self) -> Result<RunReport> {
        self.configure()?;
        if self.run.verify_registers {
            self.verify_registers()?;
        }
        info!("settling for {} cycles", self.run.settle_cycles);
        self.idle(self.run.settle_cycles);
        self.start();
        self.stream()?;
        info!("draining for {} cycles", self.run.drain_cycles);
        self.idle(self.run.drain_cycles);
        self.sweep();

        let stats = self.stats();
        stats.log();
        let report = self.oracle.into_report(stats);
        info!(
            "{}: {} mismatches in {} comparisons",
            report.verdict, report.total_mismatches, report.stats.comparisons
        );
        Ok(report)
    }
}
