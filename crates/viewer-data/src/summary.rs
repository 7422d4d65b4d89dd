//! Per-channel, per-day viewer statistics.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use viewer_core::calculations::MeanAccumulator;
use viewer_core::models::{HourWindow, Observation, RowKind, SummaryRow};

// ── DailySummary ──────────────────────────────────────────────────────────────

/// Statistics of one channel on one calendar date, at full precision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub channel: String,
    pub date: NaiveDate,
    /// Mean over every sample of the day.
    pub full_day_avg: f64,
    /// Mean over the first window, `None` when the window has no samples.
    pub window_a_avg: Option<f64>,
    /// Mean over the second window, `None` when the window has no samples.
    pub window_b_avg: Option<f64>,
    /// Samples that contributed to `full_day_avg`.
    pub observations: usize,
}

impl From<&DailySummary> for SummaryRow {
    fn from(d: &DailySummary) -> Self {
        SummaryRow {
            kind: RowKind::Daily,
            channel: Some(d.channel.clone()),
            date: Some(d.date),
            full_day_avg: d.full_day_avg,
            window_a_avg: d.window_a_avg,
            window_b_avg: d.window_b_avg,
        }
    }
}

// ── DailySummaryCalculator ────────────────────────────────────────────────────

/// Computes [`DailySummary`] rows for two fixed hour windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySummaryCalculator {
    pub window_a: HourWindow,
    pub window_b: HourWindow,
}

impl Default for DailySummaryCalculator {
    fn default() -> Self {
        Self {
            window_a: HourWindow::LUNCH,
            window_b: HourWindow::EVENING,
        }
    }
}

#[derive(Default)]
struct DayAccumulators {
    full_day: MeanAccumulator,
    window_a: MeanAccumulator,
    window_b: MeanAccumulator,
}

impl DailySummaryCalculator {
    pub fn new(window_a: HourWindow, window_b: HourWindow) -> Self {
        Self { window_a, window_b }
    }

    /// One row per `(channel, date)` present in `observations`, ordered by
    /// channel name then date.
    pub fn summarize(&self, observations: &[&Observation]) -> Vec<DailySummary> {
        let mut groups: BTreeMap<(&str, NaiveDate), DayAccumulators> = BTreeMap::new();

        for obs in observations {
            let acc = groups
                .entry((obs.channel.as_str(), obs.calendar_date))
                .or_default();
            acc.full_day.push(obs.viewer_count);
            if self.window_a.contains(obs.hour_of_day) {
                acc.window_a.push(obs.viewer_count);
            }
            if self.window_b.contains(obs.hour_of_day) {
                acc.window_b.push(obs.viewer_count);
            }
        }

        groups
            .into_iter()
            .filter_map(|((channel, date), acc)| {
                Some(DailySummary {
                    channel: channel.to_string(),
                    date,
                    full_day_avg: acc.full_day.mean()?,
                    window_a_avg: acc.window_a.mean(),
                    window_b_avg: acc.window_b.mean(),
                    observations: acc.full_day.count(),
                })
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
