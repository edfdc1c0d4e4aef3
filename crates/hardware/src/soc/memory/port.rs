//! Registered bank ports.
//!
//! This stage sits between a DUT's bank-side signals and a `BankStore`. Each cycle,
//! before the rising edge, it:
//! 1. **Writes:** Commits every asserted bank write with its bit-select mask.
//! 2. **Reads:** Drives read data for the enables sampled on the previous cycle.
//! 3. **Samples:** Latches this cycle's read enables and addresses into shadow registers.
//!
//! An address presented on cycle N therefore produces data on cycle N+1.

use tracing::debug;

use super::BankStore;
use crate::common::BankLocation;
use crate::soc::traits::{Dut, Signal};

/// A bank write serviced on one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BankWrite {
    /// Bank and intra-bank byte offset written.
    pub loc: BankLocation,
    /// Row data.
    pub data: u64,
    /// Bit-select mask.
    pub bit_sel: u64,
}

/// Bank traffic serviced on one cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BankTraffic {
    /// Writes committed this cycle.
    pub writes: Vec<BankWrite>,
    /// Number of read responses driven this cycle.
    pub reads: usize,
}

/// Shadow registers of the one-cycle registered read path, one slot per bank.
#[derive(Clone, Debug)]
pub struct BankPorts {
    rd_en_d1: Vec<bool>,
    rd_addr_d1: Vec<u32>,
}

impl BankPorts {
    /// Creates idle ports for `num_banks` banks.
    pub fn new(num_banks: usize) -> Self {
        Self {
            rd_en_d1: vec![false; num_banks],
            rd_addr_d1: vec![0; num_banks],
        }
    }

    /// Clears the read pipeline.
    pub fn reset(&mut self) {
        self.rd_en_d1.fill(false);
        self.rd_addr_d1.fill(0);
    }

    /// Returns `true` if a read for `bank` was sampled last cycle and is due this cycle.
    pub fn read_pending(&self, bank: usize) -> bool {
        self.rd_en_d1[bank]
    }

    /// Services one cycle of bank traffic for `dut` against `store`.
    ///
    /// Must run after the DUT has settled and before its clock edge.
    pub fn service<D: Dut + ?Sized>(&mut self, dut: &mut D, store: &mut BankStore) -> BankTraffic {
        let mut traffic = BankTraffic::default();

        for bank in 0..self.rd_en_d1.len() {
            if dut.read(Signal::IoToBankWrEn(bank)) == 1 {
                let offset = dut.read(Signal::IoToBankWrAddr(bank)) as u32;
                let data = dut.read(Signal::IoToBankWrData(bank));
                let bit_sel = dut.read(Signal::IoToBankWrDataBitSel(bank));
                let loc = BankLocation::new(bank, offset);
                store.write_row(bank, loc.row(), data, bit_sel);
                debug!("bank write {loc}: data {data:#018x} bit_sel {bit_sel:#018x}");
                traffic.writes.push(BankWrite { loc, data, bit_sel });
            }
        }

        for bank in 0..self.rd_en_d1.len() {
            if self.rd_en_d1[bank] {
                let loc = BankLocation::new(bank, self.rd_addr_d1[bank]);
                let data = store.read_row(bank, loc.row());
                dut.write(Signal::BankToIoRdData(bank), data);
                traffic.reads += 1;
            }
            self.rd_en_d1[bank] = dut.read(Signal::IoToBankRdEn(bank)) == 1;
            self.rd_addr_d1[bank] = dut.read(Signal::IoToBankRdAddr(bank)) as u32;
        }

        traffic
    }
}
