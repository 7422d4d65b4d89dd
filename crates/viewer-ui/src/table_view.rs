//! Daily summary table for the dashboard TUI and `--print` output.
//!
//! One row per [`SummaryRow`]; synthesized mean rows use the theme's
//! aggregate style and undefined averages render as `-`.

use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use viewer_core::formatting::format_average;
use viewer_core::models::{HourWindow, SummaryRow};

use crate::themes::Theme;

const MIN_CHANNEL_WIDTH: usize = 8;
const DATE_WIDTH: u16 = 12;
const NUMBER_WIDTH: u16 = 18;

/// Column titles for a table computed with the given windows.
pub fn header_labels(window_a: HourWindow, window_b: HourWindow) -> [String; 5] {
    [
        "Channel".to_string(),
        "Date".to_string(),
        "Daily avg".to_string(),
        window_a.label(),
        window_b.label(),
    ]
}

/// Display text of each cell in `row`.
pub fn row_cells(row: &SummaryRow) -> [String; 5] {
    [
        row.channel_label().to_string(),
        row.date_label(),
        format_average(Some(row.full_day_avg)),
        format_average(row.window_a_avg),
        format_average(row.window_b_avg),
    ]
}

/// Terminal columns needed by the widest channel label.
fn channel_width(rows: &[SummaryRow]) -> usize {
    rows.iter()
        .map(|r| r.channel_label().width())
        .chain(std::iter::once("Channel".width()))
        .max()
        .unwrap_or(0)
        .max(MIN_CHANNEL_WIDTH)
}

/// Render the summary table into `area`.
pub fn render_summary_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    rows: &[SummaryRow],
    windows: (HourWindow, HourWindow),
    theme: &Theme,
) {
    let header_cells = header_labels(windows.0, windows.1)
        .into_iter()
        .map(|h| Cell::from(h).style(theme.table_header));
    let header = Row::new(header_cells).height(1);

    let mut daily_index = 0usize;
    let table_rows: Vec<Row> = rows
        .iter()
        .map(|row| {
            let style = if row.is_aggregate() {
                theme.aggregate_row
            } else {
                daily_index += 1;
                if daily_index % 2 == 1 {
                    theme.table_row
                } else {
                    theme.table_row_alt
                }
            };
            Row::new(row_cells(row).map(Cell::from)).style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(channel_width(rows) as u16 + 2),
        Constraint::Length(DATE_WIDTH),
        Constraint::Length(NUMBER_WIDTH),
        Constraint::Length(NUMBER_WIDTH),
        Constraint::Length(NUMBER_WIDTH),
    ];

    let table = Table::new(table_rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.table_border)
                .title(format!(" {} ", title)),
        )
        .style(theme.text);

    frame.render_widget(table, area);
}

/// Render a "no data" placeholder when the filter matched nothing.
pub fn render_no_data(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No viewer data in the selected range", theme.warning)),
        Line::from(""),
        Line::from(Span::styled(
            "Check --channel, --start and --end against the source file.",
            theme.dim,
        )),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(ratatui::text::Text::from(text)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Daily Summary "),
        ),
        area,
    );
}

// ── Plain text ────────────────────────────────────────────────────────────────

/// Aligned plain-text rendering for non-interactive output.
///
/// Text columns are left-aligned, numbers right-aligned. Widths are measured
/// in terminal columns so wide (CJK) channel names line up.
pub fn render_plain_table(rows: &[SummaryRow], windows: (HourWindow, HourWindow)) -> String {
    let header = header_labels(windows.0, windows.1);
    let body: Vec<[String; 5]> = rows.iter().map(row_cells).collect();

    let mut widths = header.clone().map(|h| h.width());
    for cells in &body {
        for (w, cell) in widths.iter_mut().zip(cells) {
            *w = (*w).max(cell.width());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for cells in &body {
        push_line(&mut out, cells, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, w))| {
            let pad = " ".repeat(w.saturating_sub(cell.width()));
            if i < 2 {
                format!("{cell}{pad}")
            } else {
                format!("{pad}{cell}")
            }
        })
        .collect();
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::themes::Theme;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use viewer_core::models::RowKind;

    const WINDOWS: (HourWindow, HourWindow) = (HourWindow::LUNCH, HourWindow::EVENING);

    fn make_rows() -> Vec<SummaryRow> {
        vec![
            SummaryRow {
                kind: RowKind::Daily,
                channel: Some("頻道一".to_string()),
                date: NaiveDate::from_ymd_opt(2024, 1, 15),
                full_day_avg: 1520.0,
                window_a_avg: Some(1800.456),
                window_b_avg: None,
            },
            SummaryRow {
                kind: RowKind::GlobalMean,
                channel: None,
                date: None,
                full_day_avg: 1520.0,
                window_a_avg: Some(1800.456),
                window_b_avg: None,
            },
        ]
    }

    fn draw(rows: &[SummaryRow], theme: &Theme) -> ratatui::buffer::Buffer {
        let backend = TestBackend::new(100, 10);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_summary_table(frame, area, "Daily Summary", rows, WINDOWS, theme);
            })
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn buffer_text(buffer: &ratatui::buffer::Buffer) -> String {
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    // ── Cells ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_row_cells_format() {
        let rows = make_rows();
        assert_eq!(
            row_cells(&rows[0]),
            [
                "頻道一".to_string(),
                "2024-01-15".to_string(),
                "1,520.00".to_string(),
                "1,800.46".to_string(),
                "-".to_string(),
            ]
        );
        let mean = row_cells(&rows[1]);
        assert_eq!(mean[0], "All channels");
        assert_eq!(mean[1], "mean");
    }

    #[test]
    fn test_channel_width_uses_display_columns() {
        let mut rows = make_rows();
        rows[0].channel = Some("頻道一頻道一頻道一".to_string());
        // Nine CJK characters take eighteen columns.
        assert_eq!(channel_width(&rows[..1]), 18);
        assert_eq!(channel_width(&[]), MIN_CHANNEL_WIDTH);
    }

    // ── Render ────────────────────────────────────────────────────────────────

    #[test]
    fn test_render_summary_table_shows_rows() {
        let buffer = draw(&make_rows(), &Theme::dark());
        let text = buffer_text(&buffer);
        assert!(text.contains("Daily Summary"));
        assert!(text.contains("All channels"));
        assert!(text.contains("1,520.00"));
    }

    #[test]
    fn test_aggregate_row_uses_aggregate_style() {
        let theme = Theme::dark();
        let buffer = draw(&make_rows(), &theme);
        // Border (1) + header (1) + daily row (1) puts the mean row on y = 3.
        let cell = &buffer[(2, 3)];
        assert_eq!(cell.fg, theme.aggregate_row.fg.unwrap());
        let daily = &buffer[(2, 2)];
        assert_ne!(daily.fg, theme.aggregate_row.fg.unwrap());
    }

    #[test]
    fn test_render_empty_rows_does_not_panic() {
        draw(&[], &Theme::light());
    }

    #[test]
    fn test_render_no_data_does_not_panic() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        let theme = Theme::dark();

        terminal
            .draw(|frame| {
                let area = frame.area();
                render_no_data(frame, area, &theme);
            })
            .unwrap();
    }

    // ── Plain text ────────────────────────────────────────────────────────────

    #[test]
    fn test_plain_table_alignment() {
        let text = render_plain_table(&make_rows(), WINDOWS);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Channel"));
        assert!(lines[1].starts_with("---"));
        assert!(lines[2].starts_with("頻道一"));
        assert!(lines[3].starts_with("All channels"));
        // Right-aligned numbers end in the same column on every data line.
        assert_eq!(lines[2].width(), lines[3].width());
        assert!(lines[2].ends_with("-"));
    }

    #[test]
    fn test_plain_table_header_only_when_empty() {
        let text = render_plain_table(&[], WINDOWS);
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("11:00–14:00 avg"));
    }
}
