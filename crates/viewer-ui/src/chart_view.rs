//! Line chart of bucketed viewer averages.
//!
//! Hourly tables draw one line per date over hours 0–23; channel-daily tables
//! draw one line per channel over the selected dates.

use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use viewer_core::formatting::format_number;
use viewer_data::aggregator::{BucketSeries, BucketTable};

use crate::themes::Theme;

/// Axis ranges and tick labels for one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartAxes {
    pub x_title: &'static str,
    pub x_bounds: [f64; 2],
    pub x_labels: Vec<String>,
    pub y_bounds: [f64; 2],
    pub y_labels: Vec<String>,
}

impl ChartAxes {
    /// Axes fitted to `series`. The y axis always starts at zero.
    pub fn fit(table: &BucketTable, series: &[BucketSeries]) -> Self {
        let y_max = series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.1))
            .fold(0.0_f64, f64::max);
        let y_top = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };
        let y_labels = [0.0, y_top / 2.0, y_top]
            .iter()
            .map(|v| format_number(*v, 0))
            .collect();

        match table {
            BucketTable::Hourly(_) => ChartAxes {
                x_title: "Hour",
                x_bounds: [0.0, 23.0],
                x_labels: ["0", "6", "12", "18", "23"].map(String::from).to_vec(),
                y_bounds: [0.0, y_top],
                y_labels,
            },
            BucketTable::ChannelDaily(_) => {
                let (lo, hi) = series
                    .iter()
                    .flat_map(|s| s.points.iter().map(|p| p.0))
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                        (lo.min(x), hi.max(x))
                    });
                let (lo, hi) = if lo.is_finite() { (lo, hi) } else { (0.0, 0.0) };
                // A single day still needs a non-empty range.
                let hi = if hi > lo { hi } else { lo + 1.0 };
                ChartAxes {
                    x_title: "Date",
                    x_bounds: [lo, hi],
                    x_labels: vec![day_label(lo), day_label(hi)],
                    y_bounds: [0.0, y_top],
                    y_labels,
                }
            }
        }
    }
}

/// `MM-DD` for a day number produced by `NaiveDate::num_days_from_ce`.
fn day_label(day: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(day as i32)
        .map(|d| d.format("%m-%d").to_string())
        .unwrap_or_default()
}

/// Render the bucket chart into `area`.
pub fn render_chart(frame: &mut Frame, area: Rect, title: &str, table: &BucketTable, theme: &Theme) {
    let series = table.series();
    let axes = ChartAxes::fit(table, &series);

    let datasets: Vec<Dataset> = series
        .iter()
        .enumerate()
        .map(|(i, s)| {
            Dataset::default()
                .name(s.name.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(theme.series_color(i)))
                .data(&s.points)
        })
        .collect();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(Span::styled(
                    format!(" {} ", title),
                    theme.header.add_modifier(Modifier::BOLD),
                )),
        )
        .x_axis(
            Axis::default()
                .title(axes.x_title)
                .style(theme.chart_axis)
                .bounds(axes.x_bounds)
                .labels(axes.x_labels),
        )
        .y_axis(
            Axis::default()
                .title("Avg viewers")
                .style(theme.chart_axis)
                .bounds(axes.y_bounds)
                .labels(axes.y_labels),
        );

    frame.render_widget(chart, area);
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use viewer_data::aggregator::{ChannelDayBucket, HourlyBucket};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn hourly() -> BucketTable {
        BucketTable::Hourly(vec![
            HourlyBucket {
                date: date(1),
                hour: 12,
                mean_viewers: 100.0,
                observations: 1,
            },
            HourlyBucket {
                date: date(1),
                hour: 20,
                mean_viewers: 300.0,
                observations: 2,
            },
        ])
    }

    fn daily(days: &[u32]) -> BucketTable {
        BucketTable::ChannelDaily(
            days.iter()
                .map(|d| ChannelDayBucket {
                    date: date(*d),
                    channel: "A".to_string(),
                    mean_viewers: 50.0,
                    observations: 1,
                })
                .collect(),
        )
    }

    #[test]
    fn test_hourly_axes() {
        let table = hourly();
        let axes = ChartAxes::fit(&table, &table.series());
        assert_eq!(axes.x_bounds, [0.0, 23.0]);
        assert!((axes.y_bounds[1] - 330.0).abs() < 1e-9);
        assert_eq!(axes.y_labels.first().map(String::as_str), Some("0"));
    }

    #[test]
    fn test_daily_axes_span_dates() {
        let table = daily(&[1, 5]);
        let axes = ChartAxes::fit(&table, &table.series());
        assert_eq!(axes.x_bounds[0], f64::from(date(1).num_days_from_ce()));
        assert_eq!(axes.x_bounds[1], f64::from(date(5).num_days_from_ce()));
        assert_eq!(axes.x_labels, vec!["01-01", "01-05"]);
    }

    #[test]
    fn test_single_day_gets_nonempty_range() {
        let table = daily(&[3]);
        let axes = ChartAxes::fit(&table, &table.series());
        assert!(axes.x_bounds[1] > axes.x_bounds[0]);
    }

    #[test]
    fn test_empty_table_axes() {
        let table = BucketTable::ChannelDaily(Vec::new());
        let axes = ChartAxes::fit(&table, &[]);
        assert_eq!(axes.y_bounds, [0.0, 1.0]);
        assert!(axes.x_bounds[1] > axes.x_bounds[0]);
    }

    #[test]
    fn test_render_chart_does_not_panic() {
        let theme = Theme::dark();
        for table in [hourly(), daily(&[1, 2, 3]), BucketTable::Hourly(Vec::new())] {
            let backend = TestBackend::new(80, 20);
            let mut terminal = Terminal::new(backend).unwrap();
            terminal
                .draw(|frame| {
                    let area = frame.area();
                    render_chart(frame, area, "Viewers", &table, &theme);
                })
                .unwrap();
        }
    }
}
