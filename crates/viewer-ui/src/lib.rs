//! Terminal UI layer for the viewer dashboard.
//!
//! Provides themes, the header component, the bucket chart and summary table
//! views, and the application event loop built on top of [`ratatui`].

pub mod app;
pub mod chart_view;
pub mod components;
pub mod table_view;
pub mod themes;

pub use viewer_core as core;
