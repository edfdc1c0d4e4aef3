//! Unit tests for the hardware side.


/// Behavioral IO controller model.
pub mod io_controller;


/// Configuration register protocol.
pub mod registers;
