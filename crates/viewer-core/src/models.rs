use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::time_utils::hour_of_day;

// ── Observation ───────────────────────────────────────────────────────────────

/// One viewer-count sample exactly as read from the source table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub channel: String,
    /// Wall-clock time of the sample, no timezone attached.
    pub timestamp: NaiveDateTime,
    pub viewer_count: f64,
}

/// A sample plus the calendar fields every aggregation groups on.
///
/// Built only through [`Observation::derive`], so `calendar_date` and
/// `hour_of_day` always agree with `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub channel: String,
    pub timestamp: NaiveDateTime,
    /// Concurrent viewers at `timestamp`, never negative.
    pub viewer_count: f64,
    /// Date part of `timestamp`.
    pub calendar_date: NaiveDate,
    /// Hour part of `timestamp` (0–23).
    pub hour_of_day: u8,
}

impl Observation {
    /// Attach the derived calendar fields to a raw sample.
    pub fn derive(raw: RawObservation) -> Self {
        Self {
            calendar_date: raw.timestamp.date(),
            hour_of_day: hour_of_day(&raw.timestamp),
            channel: raw.channel,
            timestamp: raw.timestamp,
            viewer_count: raw.viewer_count,
        }
    }
}

// ── ObservationSet ────────────────────────────────────────────────────────────

/// The immutable base table every request is computed from.
///
/// Rows keep their source order; nothing mutates the set after
/// construction, so one instance can be shared across threads behind an
/// `Arc` while each request builds its own [`filter`](Self::filter) view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSet {
    observations: Vec<Observation>,
}

impl ObservationSet {
    /// Derive calendar fields for every raw row.
    pub fn derive(raw: Vec<RawObservation>) -> Self {
        Self {
            observations: raw.into_iter().map(Observation::derive).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.observations
    }

    /// Distinct channel names, sorted ascending.
    pub fn channels(&self) -> Vec<String> {
        self.observations
            .iter()
            .map(|o| o.channel.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Earliest and latest calendar date present, or `None` when empty.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.observations.first()?.calendar_date;
        Some(self.observations.iter().fold((first, first), |(lo, hi), o| {
            (lo.min(o.calendar_date), hi.max(o.calendar_date))
        }))
    }

    /// Borrowing view of the rows matching `filter`, in source order.
    pub fn filter<'a>(&'a self, filter: &Filter) -> Vec<&'a Observation> {
        self.observations
            .iter()
            .filter(|o| filter.matches(o))
            .collect()
    }
}

impl<'a> IntoIterator for &'a ObservationSet {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

// ── Filter ────────────────────────────────────────────────────────────────────

/// Row predicate applied before any aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    /// `None` selects every channel.
    pub channel: Option<String>,
    /// Inclusive lower bound.
    pub start: NaiveDate,
    /// Inclusive upper bound. A bound earlier than `start` matches nothing.
    pub end: NaiveDate,
}

impl Filter {
    pub fn new(channel: Option<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            channel,
            start,
            end,
        }
    }

    /// `true` when `obs` falls inside the date range and channel selection.
    pub fn matches(&self, obs: &Observation) -> bool {
        if obs.calendar_date < self.start || obs.calendar_date > self.end {
            return false;
        }
        match &self.channel {
            Some(ch) => obs.channel == *ch,
            None => true,
        }
    }
}

// ── Modes ─────────────────────────────────────────────────────────────────────

/// Which aggregation path a request takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Hour-level curves for one channel.
    Single,
    /// Day-level means, one curve per channel.
    Compare,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Single => f.write_str("single"),
            ViewMode::Compare => f.write_str("compare"),
        }
    }
}

/// How aggregate rows are synthesized for the summary table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AggregateMode {
    /// One mean row over every daily row, appended last.
    Global,
    /// One mean row per channel, ranked and placed first.
    PerChannel,
}

impl AggregateMode {
    /// Default aggregate layout for a view.
    pub fn for_view(view: ViewMode) -> Self {
        match view {
            ViewMode::Single => AggregateMode::Global,
            ViewMode::Compare => AggregateMode::PerChannel,
        }
    }
}

// ── HourWindow ────────────────────────────────────────────────────────────────

/// Inclusive hour-of-day range used for a window average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourWindow {
    pub first: u8,
    pub last: u8,
}

impl HourWindow {
    /// Midday window, 11:00 up to (not including) 14:00.
    pub const LUNCH: HourWindow = HourWindow { first: 11, last: 13 };
    /// Prime-time window, 19:00 up to (not including) 22:00.
    pub const EVENING: HourWindow = HourWindow { first: 19, last: 21 };

    pub fn contains(&self, hour: u8) -> bool {
        (self.first..=self.last).contains(&hour)
    }

    /// Column label, e.g. `"11:00–14:00 avg"`.
    pub fn label(&self) -> String {
        format!("{:02}:00–{:02}:00 avg", self.first, self.last + 1)
    }
}

// ── SummaryRow ────────────────────────────────────────────────────────────────

/// Distinguishes literal per-day rows from synthesized mean rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    /// Statistics of one channel on one date.
    Daily,
    /// Mean across dates of one channel's daily rows.
    ChannelMean,
    /// Mean across every daily row in the request.
    GlobalMean,
}

impl RowKind {
    pub fn is_aggregate(self) -> bool {
        !matches!(self, RowKind::Daily)
    }

    /// Stable tag written to exports.
    pub fn as_str(self) -> &'static str {
        match self {
            RowKind::Daily => "daily",
            RowKind::ChannelMean => "channel_mean",
            RowKind::GlobalMean => "global_mean",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "daily" => Some(RowKind::Daily),
            "channel_mean" => Some(RowKind::ChannelMean),
            "global_mean" => Some(RowKind::GlobalMean),
            _ => None,
        }
    }
}

/// Label shown in the channel column of a global mean row.
pub const ALL_CHANNELS_LABEL: &str = "All channels";

/// One line of the final summary table.
///
/// Averages are stored at full precision; rounding happens at display and
/// export time. An undefined window average is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub kind: RowKind,
    /// `None` only for [`RowKind::GlobalMean`].
    pub channel: Option<String>,
    /// `Some` only for [`RowKind::Daily`].
    pub date: Option<NaiveDate>,
    pub full_day_avg: f64,
    pub window_a_avg: Option<f64>,
    pub window_b_avg: Option<f64>,
}

impl SummaryRow {
    pub fn is_aggregate(&self) -> bool {
        self.kind.is_aggregate()
    }

    /// Text for the channel column.
    pub fn channel_label(&self) -> &str {
        self.channel.as_deref().unwrap_or(ALL_CHANNELS_LABEL)
    }

    /// Text for the date column; aggregate rows read `"mean"`.
    pub fn date_label(&self) -> String {
        match self.date {
            Some(d) => d.format("%Y-%m-%d").to_string(),
            None => "mean".to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
