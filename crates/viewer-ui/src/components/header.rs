use crate::themes::Theme;
use ratatui::text::{Line, Span};
use viewer_data::analysis::DashboardReport;

/// Application title shown on the first header line.
pub const TITLE: &str = "LIVE VIEWER DASHBOARD";

/// Width of the `=` separator under the title.
const SEPARATOR_WIDTH: usize = 60;

/// Dashboard header rendering three lines:
///
/// 1. Application title.
/// 2. A 60-column `=` separator.
/// 3. Request summary in `[ view | channel | start → end | N samples ]` format.
pub struct Header<'a> {
    pub report: &'a DashboardReport,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(report: &'a DashboardReport, theme: &'a Theme) -> Self {
        Self { report, theme }
    }

    /// Lines to draw; always exactly [`Header::HEIGHT`] of them.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let filter = &self.report.request.filter;
        let channel = filter.channel.as_deref().unwrap_or("all channels");
        let range = format!(
            "{} → {}",
            filter.start.format("%Y-%m-%d"),
            filter.end.format("%Y-%m-%d")
        );
        let samples = format!("{} samples", self.report.metadata.observations_matched);
        let sep = || Span::styled(" | ", self.theme.label);

        vec![
            Line::from(Span::styled(TITLE, self.theme.header)),
            Line::from(Span::styled(
                "=".repeat(SEPARATOR_WIDTH),
                self.theme.separator,
            )),
            Line::from(vec![
                Span::styled("[ ", self.theme.label),
                Span::styled(self.report.request.view.to_string(), self.theme.text),
                sep(),
                Span::styled(channel.to_string(), self.theme.text),
                sep(),
                Span::styled(range, self.theme.text),
                sep(),
                Span::styled(samples, self.theme.dim),
                Span::styled(" ]", self.theme.label),
            ]),
        ]
    }

    pub const HEIGHT: u16 = 3;
}

// ── Tests ─────────────────────────────────────────────────────────────────────
