//! Application state and TUI event loop for the viewer dashboard.
//!
//! [`App`] owns the theme and quit flag and draws one [`DashboardReport`]:
//! header on top, bucket chart in the middle, summary table below.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    widgets::Paragraph,
    Frame, Terminal,
};

use viewer_core::models::ViewMode;
use viewer_data::analysis::DashboardReport;

use crate::chart_view;
use crate::components::header::Header;
use crate::table_view;
use crate::themes::Theme;

const TICK_RATE: Duration = Duration::from_millis(250);

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    /// Active colour theme.
    pub theme: Theme,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    pub fn new(theme_name: &str) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            should_quit: false,
        }
    }

    // ── Public event loop ─────────────────────────────────────────────────────

    /// Show `report` until the user presses `q`, `Q`, or `Ctrl+C`.
    ///
    /// Blocks the calling thread. The terminal is restored even when drawing
    /// or event polling fails.
    pub fn run_dashboard(mut self, report: &DashboardReport) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal, report);

        // Restore terminal state unconditionally.
        restore_terminal()?;
        terminal.show_cursor()?;

        result
    }

    /// Apply one key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            _ => {}
        }
    }

    /// Draw the whole dashboard for `report` into `frame`.
    pub fn render(&self, frame: &mut Frame, report: &DashboardReport) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(Header::HEIGHT),
                Constraint::Percentage(50),
                Constraint::Min(5),
            ])
            .split(frame.area());

        let header = Header::new(report, &self.theme);
        frame.render_widget(Paragraph::new(header.to_lines()), chunks[0]);

        if report.is_empty() {
            let body = chunks[1].union(chunks[2]);
            table_view::render_no_data(frame, body, &self.theme);
            return;
        }

        chart_view::render_chart(
            frame,
            chunks[1],
            &chart_title(report),
            &report.buckets,
            &self.theme,
        );

        let calc = &report.request.calculator;
        table_view::render_summary_table(
            frame,
            chunks[2],
            "Daily Summary",
            &report.table,
            (calc.window_a, calc.window_b),
            &self.theme,
        );
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        report: &DashboardReport,
    ) -> io::Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.render(frame, report))?;

            if event::poll(TICK_RATE)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }
}

/// Leave raw mode and the alternate screen.
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

fn chart_title(report: &DashboardReport) -> String {
    match report.request.view {
        ViewMode::Single => format!(
            "{}: hourly average viewers",
            report.request.filter.channel.as_deref().unwrap_or("All channels")
        ),
        ViewMode::Compare => "Daily average viewers by channel".to_string(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
