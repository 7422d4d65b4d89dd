//! Per-request aggregation pipeline.
//!
//! Filters a loaded [`ObservationSet`], then runs the bucketed averager, the
//! daily summary calculator and the aggregate row synthesizer, returning a
//! [`DashboardReport`] ready for the UI layer or an export.

use std::time::Instant;

use chrono::Local;
use serde::Serialize;
use tracing::debug;

use viewer_core::models::{AggregateMode, Filter, ObservationSet, SummaryRow, ViewMode};

use crate::aggregator::{hourly_average, BucketTable};
use crate::summary::{DailySummary, DailySummaryCalculator};
use crate::synthesizer::synthesize;

// ── Public types ──────────────────────────────────────────────────────────────

/// Everything one dashboard refresh needs to know.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardRequest {
    pub view: ViewMode,
    pub filter: Filter,
    pub aggregate: AggregateMode,
    pub calculator: DailySummaryCalculator,
}

impl DashboardRequest {
    /// Request with the view's default aggregate layout and the standard
    /// lunch and evening windows.
    pub fn new(view: ViewMode, filter: Filter) -> Self {
        Self {
            view,
            filter,
            aggregate: AggregateMode::for_view(view),
            calculator: DailySummaryCalculator::default(),
        }
    }

    pub fn with_aggregate(mut self, aggregate: AggregateMode) -> Self {
        self.aggregate = aggregate;
        self
    }
}

/// Metadata produced alongside the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportMetadata {
    /// ISO-8601 timestamp when this report was generated.
    pub generated_at: String,
    /// Rows in the loaded table.
    pub observations_total: usize,
    /// Rows that passed the filter.
    pub observations_matched: usize,
    /// Distinct channels among the matched rows.
    pub channels: usize,
    pub buckets: usize,
    pub daily_rows: usize,
    pub aggregate_rows: usize,
    /// Wall-clock seconds spent filtering.
    pub filter_time_seconds: f64,
    /// Wall-clock seconds spent in the three aggregation stages.
    pub aggregate_time_seconds: f64,
}

/// The complete output of [`analyze`].
#[derive(Debug, Clone)]
pub struct DashboardReport {
    pub request: DashboardRequest,
    /// Chart data.
    pub buckets: BucketTable,
    /// Per-channel, per-day statistics at full precision.
    pub daily: Vec<DailySummary>,
    /// Daily rows plus aggregate rows, in display order.
    pub table: Vec<SummaryRow>,
    pub metadata: ReportMetadata,
}

impl DashboardReport {
    /// `true` when the filter matched nothing.
    pub fn is_empty(&self) -> bool {
        self.metadata.observations_matched == 0
    }
}

// ── Public function ───────────────────────────────────────────────────────────

/// Run the full pipeline for one request.
///
/// 1. Apply the request's filter to `source`.
/// 2. Average into time buckets for the chart.
/// 3. Compute daily summaries.
/// 4. Synthesize aggregate rows.
///
/// An empty filter result is not an error: every stage returns an empty,
/// valid value.
pub fn analyze(source: &ObservationSet, request: &DashboardRequest) -> DashboardReport {
    // ── Step 1: Filter ────────────────────────────────────────────────────────
    let filter_start = Instant::now();
    let matched = source.filter(&request.filter);
    let filter_time = filter_start.elapsed().as_secs_f64();

    // ── Steps 2-4: Aggregate ──────────────────────────────────────────────────
    let aggregate_start = Instant::now();
    let buckets = hourly_average(&matched, request.view);
    let daily = request.calculator.summarize(&matched);
    let table = synthesize(&daily, request.aggregate);
    let aggregate_time = aggregate_start.elapsed().as_secs_f64();

    let mut channels: Vec<&str> = matched.iter().map(|o| o.channel.as_str()).collect();
    channels.sort_unstable();
    channels.dedup();

    let aggregate_rows = table.iter().filter(|r| r.is_aggregate()).count();

    let metadata = ReportMetadata {
        generated_at: Local::now().to_rfc3339(),
        observations_total: source.len(),
        observations_matched: matched.len(),
        channels: channels.len(),
        buckets: buckets.len(),
        daily_rows: daily.len(),
        aggregate_rows,
        filter_time_seconds: filter_time,
        aggregate_time_seconds: aggregate_time,
    };

    debug!(
        view = %request.view,
        matched = metadata.observations_matched,
        buckets = metadata.buckets,
        daily_rows = metadata.daily_rows,
        aggregate_rows,
        "analysis complete"
    );

    DashboardReport {
        request: request.clone(),
        buckets,
        daily,
        table,
        metadata,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use viewer_core::models::{RawObservation, RowKind};

    fn raw(channel: &str, ts: &str, count: f64) -> RawObservation {
        RawObservation {
            channel: channel.to_string(),
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M").unwrap(),
            viewer_count: count,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn source() -> ObservationSet {
        ObservationSet::derive(vec![
            raw("A", "2024-01-01 10:00", 100.0),
            raw("A", "2024-01-01 12:00", 200.0),
            raw("A", "2024-01-01 20:00", 300.0),
            raw("B", "2024-01-01 12:00", 50.0),
            raw("B", "2024-01-03 12:00", 70.0),
        ])
    }

    fn all_channels(start: &str, end: &str) -> Filter {
        Filter::new(None, date(start), date(end))
    }

    #[test]
    fn test_global_lunch_window_scenario() {
        let request = DashboardRequest::new(
            ViewMode::Compare,
            all_channels("2024-01-01", "2024-01-01"),
        )
        .with_aggregate(AggregateMode::Global);
        let report = analyze(&source(), &request);

        assert_eq!(report.daily.len(), 2);
        let global = report.table.last().unwrap();
        assert_eq!(global.kind, RowKind::GlobalMean);
        assert!((global.window_a_avg.unwrap() - 125.0).abs() < 1e-9);
        assert_eq!(global.window_b_avg, Some(300.0));
    }

    #[test]
    fn test_inverted_range_yields_empty_report() {
        let request = DashboardRequest::new(
            ViewMode::Compare,
            all_channels("2024-01-03", "2024-01-01"),
        );
        let report = analyze(&source(), &request);

        assert!(report.is_empty());
        assert!(report.buckets.is_empty());
        assert!(report.daily.is_empty());
        assert!(report.table.is_empty());
        assert_eq!(report.metadata.aggregate_rows, 0);
        assert_eq!(report.metadata.observations_total, 5);
    }

    #[test]
    fn test_single_view_defaults_to_global() {
        let filter = Filter::new(Some("A".to_string()), date("2024-01-01"), date("2024-01-03"));
        let report = analyze(&source(), &DashboardRequest::new(ViewMode::Single, filter));

        assert!(matches!(report.buckets, BucketTable::Hourly(_)));
        assert_eq!(report.buckets.len(), 3);
        assert_eq!(report.request.aggregate, AggregateMode::Global);
        assert_eq!(report.table.len(), 2);
        assert_eq!(report.metadata.channels, 1);
    }

    #[test]
    fn test_compare_view_defaults_to_per_channel() {
        let report = analyze(
            &source(),
            &DashboardRequest::new(ViewMode::Compare, all_channels("2024-01-01", "2024-01-03")),
        );

        assert!(matches!(report.buckets, BucketTable::ChannelDaily(_)));
        assert_eq!(report.metadata.aggregate_rows, 2);
        // A averages 200, B averages 60.
        assert_eq!(report.table[0].channel.as_deref(), Some("A"));
        assert_eq!(report.table[1].channel.as_deref(), Some("B"));
        assert_eq!(report.buckets.total_observations(), report.metadata.observations_matched);
    }

    #[test]
    fn test_metadata_populated() {
        let report = analyze(
            &source(),
            &DashboardRequest::new(ViewMode::Compare, all_channels("2024-01-01", "2024-01-03")),
        );
        let meta = &report.metadata;
        assert!(!meta.generated_at.is_empty());
        assert!(meta.filter_time_seconds >= 0.0);
        assert!(meta.aggregate_time_seconds >= 0.0);
        assert_eq!(meta.observations_matched, 5);
        assert_eq!(meta.channels, 2);
        assert_eq!(meta.daily_rows, 3);
    }

    #[test]
    fn test_analysis_does_not_mutate_source() {
        let set = source();
        let before = set.clone();
        let request =
            DashboardRequest::new(ViewMode::Single, all_channels("2024-01-01", "2024-01-01"));
        let first = analyze(&set, &request);
        let second = analyze(&set, &request);
        assert_eq!(set, before);
        assert_eq!(first.table, second.table);
    }
}
