//! The DUT signal boundary.
//!
//! This module defines how the oracle talks to the simulated hardware. It provides:
//! 1. **Signals:** `Signal` names every port on the IO controller boundary, indexed by
//!    channel or bank where the port is replicated.
//! 2. **Dut:** Settle, clock and peek/poke access to a simulated device.
//! 3. **Clocked:** A DUT together with its memory stubs, advanced one whole cycle at a time.
//!
//! Signal values travel as `u64` regardless of their RTL width, the same way a
//! Verilated model exposes narrow ports as wider integers.

use std::fmt;

/// A port on the IO controller boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Signal {
    /// Global clock enable.
    ClkEn,
    /// Configuration transaction strobe.
    ConfigEn,
    /// Configuration write strobe.
    ConfigWr,
    /// Configuration read strobe.
    ConfigRd,
    /// Flat configuration address `(register_id << feature_width) | channel`.
    ConfigAddr,
    /// Configuration write data.
    ConfigWrData,
    /// Configuration read data, registered one cycle after a read strobe.
    ConfigRdData,
    /// Fabric start pulse shared by all channels.
    CgraStartPulse,
    /// Per-channel completion pulse.
    CgraDonePulse(usize),
    /// Shared backpressure line from the global controller.
    GlcToIoStall,
    /// Per-channel data streamed to the fabric.
    IoToCgraRdData(usize),
    /// Per-channel valid qualifying `IoToCgraRdData`.
    IoToCgraRdDataValid(usize),
    /// Per-channel write enable from the fabric.
    CgraToIoWrEn(usize),
    /// Per-channel write data from the fabric.
    CgraToIoWrData(usize),
    /// Per-bank read enable.
    IoToBankRdEn(usize),
    /// Per-bank read address (row-aligned intra-bank byte offset).
    IoToBankRdAddr(usize),
    /// Per-bank read data returned by the memory.
    BankToIoRdData(usize),
    /// Per-bank write enable.
    IoToBankWrEn(usize),
    /// Per-bank write address (intra-bank byte offset).
    IoToBankWrAddr(usize),
    /// Per-bank write data (one full row).
    IoToBankWrData(usize),
    /// Per-bank write bit-select mask.
    IoToBankWrDataBitSel(usize),
}

impl Signal {
    /// RTL port name without index.
    pub const fn port(self) -> &'static str {
        match self {
            Self::ClkEn => "clk_en",
            Self::ConfigEn => "config_en",
            Self::ConfigWr => "config_wr",
            Self::ConfigRd => "config_rd",
            Self::ConfigAddr => "config_addr",
            Self::ConfigWrData => "config_wr_data",
            Self::ConfigRdData => "config_rd_data",
            Self::CgraStartPulse => "cgra_start_pulse",
            Self::CgraDonePulse(_) => "cgra_done_pulse",
            Self::GlcToIoStall => "glc_to_io_stall",
            Self::IoToCgraRdData(_) => "io_to_cgra_rd_data",
            Self::IoToCgraRdDataValid(_) => "io_to_cgra_rd_data_valid",
            Self::CgraToIoWrEn(_) => "cgra_to_io_wr_en",
            Self::CgraToIoWrData(_) => "cgra_to_io_wr_data",
            Self::IoToBankRdEn(_) => "io_to_bank_rd_en",
            Self::IoToBankRdAddr(_) => "io_to_bank_rd_addr",
            Self::BankToIoRdData(_) => "bank_to_io_rd_data",
            Self::IoToBankWrEn(_) => "io_to_bank_wr_en",
            Self::IoToBankWrAddr(_) => "io_to_bank_wr_addr",
            Self::IoToBankWrData(_) => "io_to_bank_wr_data",
            Self::IoToBankWrDataBitSel(_) => "io_to_bank_wr_data_bit_sel",
        }
    }

    /// Channel or bank index of a replicated port.
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::CgraDonePulse(i)
            | Self::IoToCgraRdData(i)
            | Self::IoToCgraRdDataValid(i)
            | Self::CgraToIoWrEn(i)
            | Self::CgraToIoWrData(i)
            | Self::IoToBankRdEn(i)
            | Self::IoToBankRdAddr(i)
            | Self::BankToIoRdData(i)
            | Self::IoToBankWrEn(i)
            | Self::IoToBankWrAddr(i)
            | Self::IoToBankWrData(i)
            | Self::IoToBankWrDataBitSel(i) => Some(i),
            _ => None,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index() {
            Some(i) => write!(f, "{}[{}]", self.port(), i),
            None => f.write_str(self.port()),
        }
    }
}

/// A simulated device under test.
///
/// Implementors are cycle-based: inputs written with `write` are sampled on the
/// next `advance_cycle`, outputs read with `read` reflect the last `settle`.
pub trait Dut {
    /// Evaluates combinational logic so outputs reflect the current inputs and state.
    fn settle(&mut self);
    /// Applies one rising and one falling clock edge and settles the result.
    fn advance_cycle(&mut self);
    /// Reads the current value of a signal.
    fn read(&self, signal: Signal) -> u64;
    /// Drives an input signal.
    fn write(&mut self, signal: Signal, value: u64);
}

/// A DUT together with everything that must move when its clock ticks.
///
/// `tick` is the one clock-advance primitive higher layers use; it settles the DUT,
/// services any attached memory stubs and applies the clock edge.
pub trait Clocked {
    /// Drives an input signal.
    fn poke(&mut self, signal: Signal, value: u64);
    /// Reads the current value of a signal.
    fn peek(&self, signal: Signal) -> u64;
    /// Advances exactly one clock cycle.
    fn tick(&mut self);
}
