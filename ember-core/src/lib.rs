// Declare the main modules of the crate
pub mod error;
pub mod nn;
pub mod utils;
pub mod variable;

// Re-export the core types so they are reachable as `ember_core::Variable`, etc.
pub use error::EmberError;
pub use nn::{Container, Module, ModuleWrapper, Sequential};
pub use variable::Variable;
