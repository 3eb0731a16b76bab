// src/nn/mod.rs
// Modules, containers and the parameter plumbing around them.

pub mod config;
pub mod container;
pub mod distributed;
pub mod init;
pub mod layers;
pub mod module; // Trait Module
pub mod sequential;
pub mod state;
pub mod wrapper;

// Re-export common items
pub use config::ModuleConfig;
pub use container::{Container, OrphanedParams};
pub use distributed::{sync_gradients, GradientReducer, MeanReducer};
pub use layers::{Identity, Linear, ReLU};
pub use module::{unary_forward, Module, ModuleParams, UnaryModule};
pub use sequential::Sequential;
pub use state::{load_state_dict, state_dict, ParamState, StateDict};
pub use wrapper::{share, ModuleRef, ModuleRefMut, ModuleWrapper, SharedModule};
