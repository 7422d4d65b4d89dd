//! Request orchestration for the dashboard.
//!
//! Turns loosely specified user input (optional channel, optional date
//! bounds, view and aggregate choices) into a concrete
//! [`DashboardRequest`] against a shared source table and runs the
//! analysis pipeline on it.

use std::sync::Arc;

use chrono::NaiveDate;

use viewer_core::error::Result;
use viewer_core::models::{AggregateMode, Filter, ObservationSet, ViewMode};
use viewer_core::settings::Settings;
use viewer_data::analysis::{analyze, DashboardReport, DashboardRequest};

// ── Public types ──────────────────────────────────────────────────────────────

/// User-facing request parameters; every `None` is filled from the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    pub view: ViewMode,
    pub channel: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// `None` picks the view's default layout.
    pub aggregate: Option<AggregateMode>,
}

impl RequestParams {
    pub fn new(view: ViewMode) -> Self {
        Self {
            view,
            channel: None,
            start: None,
            end: None,
            aggregate: None,
        }
    }

    /// Read the request part of the CLI settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self {
            view: settings.view_mode()?,
            channel: settings.channel.clone(),
            start: settings.start,
            end: settings.end,
            aggregate: Some(settings.aggregate_mode()?),
        })
    }
}

// ── DashboardOrchestrator ─────────────────────────────────────────────────────

/// Runs requests against one shared, immutable source table.
///
/// Cloning is cheap; clones share the table.
#[derive(Debug, Clone)]
pub struct DashboardOrchestrator {
    source: Arc<ObservationSet>,
}

impl DashboardOrchestrator {
    pub fn new(source: Arc<ObservationSet>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &ObservationSet {
        &self.source
    }

    /// Fill the gaps in `params` from the source table.
    ///
    /// * Single view without a channel uses the first channel by name.
    /// * Missing date bounds use the table's earliest and latest dates.
    /// * Missing aggregate layout follows the view.
    pub fn resolve(&self, params: &RequestParams) -> DashboardRequest {
        let channel = match (&params.channel, params.view) {
            (Some(ch), _) => Some(ch.clone()),
            (None, ViewMode::Single) => self.source.channels().into_iter().next(),
            (None, ViewMode::Compare) => None,
        };

        if let Some(ch) = &channel {
            if !self.source.is_empty() && !self.source.iter().any(|o| &o.channel == ch) {
                tracing::warn!(channel = %ch, "channel not present in source data");
            }
        }

        // An empty table has no bounds; the widest range still matches nothing.
        let (first, last) = self
            .source
            .date_bounds()
            .unwrap_or((NaiveDate::MIN, NaiveDate::MAX));
        let start = params.start.unwrap_or(first);
        let end = params.end.unwrap_or(last);
        if start > end {
            tracing::warn!(%start, %end, "start date is after end date; nothing will match");
        }

        let aggregate = params
            .aggregate
            .unwrap_or_else(|| AggregateMode::for_view(params.view));

        DashboardRequest::new(params.view, Filter::new(channel, start, end))
            .with_aggregate(aggregate)
    }

    /// Resolve `params` and run the pipeline.
    pub fn run(&self, params: &RequestParams) -> DashboardReport {
        let request = self.resolve(params);
        tracing::debug!(
            view = %request.view,
            channel = ?request.filter.channel,
            start = %request.filter.start,
            end = %request.filter.end,
            aggregate = ?request.aggregate,
            "running dashboard request"
        );
        analyze(&self.source, &request)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
