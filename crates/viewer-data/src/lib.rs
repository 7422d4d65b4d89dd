//! Data layer for the viewer dashboard.
//!
//! Reads viewer-count CSV files, averages samples into chart buckets,
//! computes daily summaries and aggregate rows, and writes the summary table
//! back out as CSV.

pub mod aggregator;
pub mod analysis;
pub mod export;
pub mod reader;
pub mod summary;
pub mod synthesizer;

pub use viewer_core as core;
