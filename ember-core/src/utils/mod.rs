// src/utils/mod.rs
// Helpers shared by unit tests, integration tests and examples.

pub mod testing;
