//! Testbench: a DUT wired to its memory stub.
//!
//! `Testbench` owns the DUT, the `BankStore` standing in for the physical global
//! buffer and the registered bank ports between them. One `tick` is one clock
//! cycle: settle, service the bank ports, clock edge.

use std::mem;

use crate::soc::memory::BankStore;
use crate::soc::memory::port::{BankPorts, BankTraffic};
use crate::soc::traits::{Clocked, Dut, Signal};

/// A DUT, its memory stub and a cycle counter.
#[derive(Debug)]
pub struct Testbench<D: Dut> {
    dut: D,
    memory: BankStore,
    ports: BankPorts,
    traffic: BankTraffic,
    cycle: u64,
    bank_reads: u64,
    bank_writes: u64,
}

impl<D: Dut> Testbench<D> {
    /// Wires `dut` to `memory` and enables its clock.
    pub fn new(mut dut: D, memory: BankStore) -> Self {
        dut.write(Signal::ClkEn, 1);
        dut.settle();
        let ports = BankPorts::new(memory.num_banks());
        Self {
            dut,
            memory,
            ports,
            traffic: BankTraffic::default(),
            cycle: 0,
            bank_reads: 0,
            bank_writes: 0,
        }
    }

    /// Cycles elapsed.
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// The DUT.
    pub const fn dut(&self) -> &D {
        &self.dut
    }

    /// Mutable access to the DUT.
    pub const fn dut_mut(&mut self) -> &mut D {
        &mut self.dut
    }

    /// The memory stub the DUT reads and writes.
    pub const fn memory(&self) -> &BankStore {
        &self.memory
    }

    /// Mutable access to the memory stub.
    pub const fn memory_mut(&mut self) -> &mut BankStore {
        &mut self.memory
    }

    /// Bank traffic serviced on the last tick, leaving an empty record behind.
    pub fn take_traffic(&mut self) -> BankTraffic {
        mem::take(&mut self.traffic)
    }

    /// Row reads serviced so far.
    pub const fn bank_reads(&self) -> u64 {
        self.bank_reads
    }

    /// Row writes serviced so far.
    pub const fn bank_writes(&self) -> u64 {
        self.bank_writes
    }

    /// Consumes the testbench, returning the DUT and the memory stub.
    pub fn into_parts(self) -> (D, BankStore) {
        (self.dut, self.memory)
    }
}

impl<D: Dut> Clocked for Testbench<D> {
    fn poke(&mut self, signal: Signal, value: u64) {
        self.dut.write(signal, value);
    }

    fn peek(&self, signal: Signal) -> u64 {
        self.dut.read(signal)
    }

    fn tick(&mut self) {
        self.dut.settle();
        self.traffic = self.ports.service(&mut self.dut, &mut self.memory);
        self.bank_reads += self.traffic.reads as u64;
        self.bank_writes += self.traffic.writes.len() as u64;
        self.dut.advance_cycle();
        self.cycle += 1;
    }
}
