// src/nn/layers/mod.rs
// Minimal leaf layers used to build and exercise containers.

pub mod identity;
pub mod linear;
pub mod relu;

// Re-export key layer structs
pub use identity::Identity;
pub use linear::Linear;
pub use relu::ReLU;
