//! Runtime layer for the viewer dashboard.
//!
//! Owns the process-wide source cache and resolves user input into concrete
//! analysis requests.

pub mod data_manager;
pub mod orchestrator;

pub use viewer_core as core;
pub use viewer_data as data;
