pub mod config;
pub mod memory_adapters;
pub mod state_machine;
pub mod types;
pub mod workflow;

pub use memory_adapters::*;
pub use state_machine::*;
pub use types::*;
pub use workflow::*;
