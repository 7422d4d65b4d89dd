//! Time-bucketed viewer averages for the dashboard chart.
//!
//! Single-channel views average by `(date, hour)`; comparison views average
//! by `(date, channel)`. Buckets only ever come from observations that
//! exist, so a gap in the data stays a gap rather than becoming a zero.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use viewer_core::calculations::MeanAccumulator;
use viewer_core::models::{Observation, ViewMode};

// ── Buckets ───────────────────────────────────────────────────────────────────

/// Mean viewers of one channel during one hour of one day.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyBucket {
    pub date: NaiveDate,
    pub hour: u8,
    pub mean_viewers: f64,
    /// Number of samples averaged into this bucket.
    pub observations: usize,
}

/// Mean viewers of one channel over one day.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDayBucket {
    pub date: NaiveDate,
    pub channel: String,
    pub mean_viewers: f64,
    pub observations: usize,
}

/// Output of the averager; the variant follows the view mode.
#[derive(Debug, Clone, PartialEq)]
pub enum BucketTable {
    Hourly(Vec<HourlyBucket>),
    ChannelDaily(Vec<ChannelDayBucket>),
}

/// One named line of the chart. `x` is the hour of day for hourly tables
/// and the day number (`NaiveDate::num_days_from_ce`) for daily ones.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketSeries {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

impl BucketTable {
    pub fn len(&self) -> usize {
        match self {
            BucketTable::Hourly(b) => b.len(),
            BucketTable::ChannelDaily(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of bucket sizes; equals the number of input observations.
    pub fn total_observations(&self) -> usize {
        match self {
            BucketTable::Hourly(b) => b.iter().map(|x| x.observations).sum(),
            BucketTable::ChannelDaily(b) => b.iter().map(|x| x.observations).sum(),
        }
    }

    /// Regroup buckets into chart lines: one per date for hourly tables, one
    /// per channel for daily tables. Lines are ordered by name, points by x.
    pub fn series(&self) -> Vec<BucketSeries> {
        let mut lines: BTreeMap<String, Vec<(f64, f64)>> = BTreeMap::new();
        match self {
            BucketTable::Hourly(buckets) => {
                for b in buckets {
                    lines
                        .entry(b.date.format("%Y-%m-%d").to_string())
                        .or_default()
                        .push((f64::from(b.hour), b.mean_viewers));
                }
            }
            BucketTable::ChannelDaily(buckets) => {
                for b in buckets {
                    lines
                        .entry(b.channel.clone())
                        .or_default()
                        .push((f64::from(b.date.num_days_from_ce()), b.mean_viewers));
                }
            }
        }

        // Buckets arrive sorted by date first, so per-line points are already
        // in x order.
        lines
            .into_iter()
            .map(|(name, points)| BucketSeries { name, points })
            .collect()
    }
}

// ── BucketedAverager ──────────────────────────────────────────────────────────

/// Shorthand for [`BucketedAverager::average`].
pub fn hourly_average(observations: &[&Observation], mode: ViewMode) -> BucketTable {
    BucketedAverager::average(observations, mode)
}

/// Stateless helper that groups observations into averaged buckets.
pub struct BucketedAverager;

impl BucketedAverager {
    /// Average by the key the view mode calls for.
    pub fn average(observations: &[&Observation], mode: ViewMode) -> BucketTable {
        match mode {
            ViewMode::Single => BucketTable::Hourly(Self::hourly(observations)),
            ViewMode::Compare => BucketTable::ChannelDaily(Self::daily_by_channel(observations)),
        }
    }

    /// Group by `(calendar_date, hour_of_day)`, ordered by date then hour.
    ///
    /// Meant for a single channel's observations; samples from several
    /// channels in the same hour are pooled.
    pub fn hourly(observations: &[&Observation]) -> Vec<HourlyBucket> {
        let mut groups: BTreeMap<(NaiveDate, u8), MeanAccumulator> = BTreeMap::new();
        for obs in observations {
            groups
                .entry((obs.calendar_date, obs.hour_of_day))
                .or_default()
                .push(obs.viewer_count);
        }

        groups
            .into_iter()
            .filter_map(|((date, hour), acc)| {
                Some(HourlyBucket {
                    date,
                    hour,
                    mean_viewers: acc.mean()?,
                    observations: acc.count(),
                })
            })
            .collect()
    }

    /// Group by `(calendar_date, channel)`, ordered by date then channel name.
    pub fn daily_by_channel(observations: &[&Observation]) -> Vec<ChannelDayBucket> {
        let mut groups: BTreeMap<(NaiveDate, &str), MeanAccumulator> = BTreeMap::new();
        for obs in observations {
            groups
                .entry((obs.calendar_date, obs.channel.as_str()))
                .or_default()
                .push(obs.viewer_count);
        }

        groups
            .into_iter()
            .filter_map(|((date, channel), acc)| {
                Some(ChannelDayBucket {
                    date,
                    channel: channel.to_string(),
                    mean_viewers: acc.mean()?,
                    observations: acc.count(),
                })
            })
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use viewer_core::models::RawObservation;

    fn obs(channel: &str, ts: &str, count: f64) -> Observation {
        Observation::derive(RawObservation {
            channel: channel.to_string(),
            timestamp: NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M").unwrap(),
            viewer_count: count,
        })
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample() -> Vec<Observation> {
        vec![
            obs("A", "2024-01-02 12:10", 300.0),
            obs("A", "2024-01-01 12:00", 100.0),
            obs("A", "2024-01-01 12:30", 200.0),
            obs("A", "2024-01-01 09:45", 40.0),
            obs("B", "2024-01-01 20:00", 10.0),
        ]
    }

    // ── hourly ────────────────────────────────────────────────────────────────

    #[test]
    fn test_hourly_groups_and_orders() {
        let data = sample();
        let refs: Vec<&Observation> = data.iter().filter(|o| o.channel == "A").collect();
        let buckets = BucketedAverager::hourly(&refs);

        let keys: Vec<(NaiveDate, u8)> = buckets.iter().map(|b| (b.date, b.hour)).collect();
        assert_eq!(
            keys,
            vec![
                (date("2024-01-01"), 9),
                (date("2024-01-01"), 12),
                (date("2024-01-02"), 12),
            ]
        );
        assert!((buckets[1].mean_viewers - 150.0).abs() < 1e-9);
        assert_eq!(buckets[1].observations, 2);
    }

    #[test]
    fn test_hourly_never_materializes_empty_hours() {
        let data = sample();
        let refs: Vec<&Observation> = data.iter().filter(|o| o.channel == "A").collect();
        let buckets = BucketedAverager::hourly(&refs);
        // Only hours that have samples appear.
        assert!(buckets.iter().all(|b| b.observations > 0));
        assert!(!buckets.iter().any(|b| b.hour == 10 || b.hour == 11));
    }

    #[test]
    fn test_hourly_empty_input() {
        assert!(BucketedAverager::hourly(&[]).is_empty());
    }

    // ── daily_by_channel ──────────────────────────────────────────────────────

    #[test]
    fn test_daily_by_channel_orders_by_date_then_channel() {
        let data = sample();
        let refs: Vec<&Observation> = data.iter().collect();
        let buckets = BucketedAverager::daily_by_channel(&refs);

        let keys: Vec<(NaiveDate, &str)> = buckets
            .iter()
            .map(|b| (b.date, b.channel.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (date("2024-01-01"), "A"),
                (date("2024-01-01"), "B"),
                (date("2024-01-02"), "A"),
            ]
        );
        // (100 + 200 + 40) / 3
        assert!((buckets[0].mean_viewers - 113.333_333).abs() < 1e-5);
    }

    // ── BucketTable ───────────────────────────────────────────────────────────

    #[test]
    fn test_bucket_sizes_sum_to_input_count() {
        let data = sample();
        let refs: Vec<&Observation> = data.iter().collect();
        for mode in [ViewMode::Single, ViewMode::Compare] {
            let table = BucketedAverager::average(&refs, mode);
            assert_eq!(table.total_observations(), refs.len());
        }
    }

    #[test]
    fn test_average_variant_follows_mode() {
        let data = sample();
        let refs: Vec<&Observation> = data.iter().collect();
        assert!(matches!(
            BucketedAverager::average(&refs, ViewMode::Single),
            BucketTable::Hourly(_)
        ));
        assert!(matches!(
            BucketedAverager::average(&refs, ViewMode::Compare),
            BucketTable::ChannelDaily(_)
        ));
    }

    #[test]
    fn test_series_hourly_one_line_per_date() {
        let data = sample();
        let refs: Vec<&Observation> = data.iter().filter(|o| o.channel == "A").collect();
        let series = BucketedAverager::average(&refs, ViewMode::Single).series();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "2024-01-01");
        assert_eq!(series[0].points, vec![(9.0, 40.0), (12.0, 150.0)]);
        assert_eq!(series[1].name, "2024-01-02");
    }

    #[test]
    fn test_series_daily_one_line_per_channel() {
        let data = sample();
        let refs: Vec<&Observation> = data.iter().collect();
        let series = BucketedAverager::average(&refs, ViewMode::Compare).series();

        let names: Vec<&str> = series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        let a_days: Vec<f64> = series[0].points.iter().map(|p| p.0).collect();
        assert_eq!(
            a_days,
            vec![
                f64::from(date("2024-01-01").num_days_from_ce()),
                f64::from(date("2024-01-02").num_days_from_ce()),
            ]
        );
    }

    #[test]
    fn test_hourly_average_matches_averager() {
        let data = sample();
        let refs: Vec<&Observation> = data.iter().collect();
        assert_eq!(
            hourly_average(&refs, ViewMode::Compare),
            BucketedAverager::average(&refs, ViewMode::Compare)
        );
    }

    #[test]
    fn test_empty_table() {
        let table = hourly_average(&[], ViewMode::Compare);
        assert!(table.is_empty());
        assert_eq!(table.total_observations(), 0);
        assert!(table.series().is_empty());
    }
}
