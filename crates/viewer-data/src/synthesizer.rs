//! Mean rows injected into the summary table.
//!
//! Every aggregate is a mean of daily means. An undefined window average on
//! a given day shrinks that field's divisor; it never counts as zero.

use viewer_core::calculations::{mean_of_defined, MeanAccumulator};
use viewer_core::models::{AggregateMode, RowKind, SummaryRow};

use crate::summary::DailySummary;

/// Build the final table: daily rows plus aggregate rows laid out per `mode`.
///
/// * [`AggregateMode::Global`]: daily rows, then one global mean row.
/// * [`AggregateMode::PerChannel`]: one mean row per channel, ranked by
///   descending full-day average (ties keep first-seen channel order), then
///   the daily rows.
///
/// No daily rows means no aggregate rows.
pub fn synthesize(daily: &[DailySummary], mode: AggregateMode) -> Vec<SummaryRow> {
    if daily.is_empty() {
        return Vec::new();
    }

    let daily_rows = daily.iter().map(SummaryRow::from);

    match mode {
        AggregateMode::Global => {
            let mut rows: Vec<SummaryRow> = daily_rows.collect();
            rows.extend(global_mean(daily));
            rows
        }
        AggregateMode::PerChannel => {
            let mut rows = channel_means(daily);
            rows.extend(daily_rows);
            rows
        }
    }
}

/// Mean of every daily row, labelled as the all-channels row.
pub fn global_mean(daily: &[DailySummary]) -> Option<SummaryRow> {
    mean_row(daily.iter(), RowKind::GlobalMean, None)
}

/// One mean row per channel, ranked by descending `full_day_avg`.
pub fn channel_means(daily: &[DailySummary]) -> Vec<SummaryRow> {
    // First-seen order, kept by the stable sort below.
    let mut channels: Vec<&str> = Vec::new();
    for d in daily {
        if !channels.contains(&d.channel.as_str()) {
            channels.push(d.channel.as_str());
        }
    }

    let mut rows: Vec<SummaryRow> = channels
        .into_iter()
        .filter_map(|ch| {
            mean_row(
                daily.iter().filter(|d| d.channel == ch),
                RowKind::ChannelMean,
                Some(ch.to_string()),
            )
        })
        .collect();

    rows.sort_by(|a, b| b.full_day_avg.total_cmp(&a.full_day_avg));
    rows
}

fn mean_row<'a, I>(days: I, kind: RowKind, channel: Option<String>) -> Option<SummaryRow>
where
    I: Iterator<Item = &'a DailySummary> + Clone,
{
    let full_day: MeanAccumulator = days.clone().map(|d| d.full_day_avg).collect();
    Some(SummaryRow {
        kind,
        channel,
        date: None,
        full_day_avg: full_day.mean()?,
        window_a_avg: mean_of_defined(days.clone().map(|d| d.window_a_avg)),
        window_b_avg: mean_of_defined(days.map(|d| d.window_b_avg)),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(channel: &str, d: u32, full: f64, a: Option<f64>, b: Option<f64>) -> DailySummary {
        DailySummary {
            channel: channel.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
            full_day_avg: full,
            window_a_avg: a,
            window_b_avg: b,
            observations: 1,
        }
    }

    // ── Global ────────────────────────────────────────────────────────────────

    #[test]
    fn test_global_row_appended_last() {
        let daily = vec![
            day("A", 1, 200.0, Some(200.0), Some(300.0)),
            day("B", 1, 50.0, Some(50.0), None),
        ];
        let rows = synthesize(&daily, AggregateMode::Global);

        assert_eq!(rows.len(), 3);
        assert!(rows[..2].iter().all(|r| r.kind == RowKind::Daily));
        let mean = rows.last().unwrap();
        assert_eq!(mean.kind, RowKind::GlobalMean);
        assert!(mean.channel.is_none());
        assert!(mean.date.is_none());
        assert!((mean.full_day_avg - 125.0).abs() < 1e-9);
        assert_eq!(mean.window_a_avg, Some(125.0));
        // B's undefined evening window is excluded, not averaged as zero.
        assert_eq!(mean.window_b_avg, Some(300.0));
    }

    #[test]
    fn test_global_all_windows_undefined() {
        let daily = vec![day("A", 1, 10.0, None, None), day("A", 2, 20.0, None, None)];
        let mean = global_mean(&daily).unwrap();
        assert!(mean.window_a_avg.is_none());
        assert!(mean.window_b_avg.is_none());
        assert!((mean.full_day_avg - 15.0).abs() < 1e-9);
    }

    // ── PerChannel ────────────────────────────────────────────────────────────

    #[test]
    fn test_channel_rows_ranked_before_daily() {
        let daily = vec![
            day("A", 1, 10.0, None, None),
            day("A", 2, 30.0, None, None),
            day("B", 1, 100.0, None, None),
            day("C", 1, 50.0, None, None),
        ];
        let rows = synthesize(&daily, AggregateMode::PerChannel);

        assert_eq!(rows.len(), 3 + 4);
        let ranked: Vec<(&str, f64)> = rows[..3]
            .iter()
            .map(|r| (r.channel.as_deref().unwrap(), r.full_day_avg))
            .collect();
        assert_eq!(ranked, vec![("B", 100.0), ("C", 50.0), ("A", 20.0)]);
        assert!(rows[..3].iter().all(|r| r.kind == RowKind::ChannelMean));
        assert!(rows[3..].iter().all(|r| r.kind == RowKind::Daily));
    }

    #[test]
    fn test_channel_ties_keep_first_seen_order() {
        let daily = vec![
            day("Z", 1, 40.0, None, None),
            day("M", 1, 40.0, None, None),
            day("A", 1, 40.0, None, None),
        ];
        let names: Vec<String> = channel_means(&daily)
            .into_iter()
            .filter_map(|r| r.channel)
            .collect();
        assert_eq!(names, vec!["Z", "M", "A"]);
    }

    #[test]
    fn test_channel_window_mean_excludes_undefined_days() {
        let daily = vec![
            day("A", 1, 100.0, Some(90.0), None),
            day("A", 2, 100.0, None, Some(30.0)),
            day("A", 3, 100.0, Some(110.0), None),
        ];
        let row = &channel_means(&daily)[0];
        assert_eq!(row.window_a_avg, Some(100.0));
        assert_eq!(row.window_b_avg, Some(30.0));
    }

    #[test]
    fn test_channel_mean_is_mean_of_daily_means() {
        // Day 1 had many samples, day 2 few: the aggregate weights days equally.
        let mut heavy = day("A", 1, 10.0, None, None);
        heavy.observations = 100;
        let light = day("A", 2, 30.0, None, None);
        let row = &channel_means(&[heavy, light])[0];
        assert!((row.full_day_avg - 20.0).abs() < 1e-9);
    }

    // ── Empty ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_empty_daily_yields_no_rows() {
        assert!(synthesize(&[], AggregateMode::Global).is_empty());
        assert!(synthesize(&[], AggregateMode::PerChannel).is_empty());
        assert!(global_mean(&[]).is_none());
    }
}
