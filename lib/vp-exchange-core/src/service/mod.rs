pub mod error;
pub mod orchestrator;
