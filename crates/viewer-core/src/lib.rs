//! Shared types for the viewer dashboard.
//!
//! Holds the observation model, the error type, CLI settings and the small
//! numeric and time helpers every other crate in the workspace builds on.

pub mod calculations;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{Result, ViewerError};
