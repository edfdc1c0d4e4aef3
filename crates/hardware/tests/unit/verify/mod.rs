//! Unit tests for the checking oracle.
