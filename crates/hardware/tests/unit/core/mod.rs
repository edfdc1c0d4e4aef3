//! Unit tests for the golden model.
