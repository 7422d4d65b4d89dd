use ratatui::style::{Color, Modifier, Style};

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`. Background values
/// 0–6 are considered dark; 7–15 light. Absent or unparseable values yield
/// [`BackgroundType::Unknown`].
pub fn detect_background() -> BackgroundType {
    background_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

fn background_from_colorfgbg(value: Option<&str>) -> BackgroundType {
    let Some(bg) = value.and_then(|v| v.split(';').next_back()) else {
        return BackgroundType::Unknown;
    };
    match bg.parse::<u8>() {
        Ok(n) if n <= 6 => BackgroundType::Dark,
        Ok(_) => BackgroundType::Light,
        Err(_) => BackgroundType::Unknown,
    }
}

/// Gold used to set synthesized mean rows apart on dark terminals.
const GOLD: Color = Color::Rgb(255, 215, 0);
/// Darker gold that stays legible on light terminals.
const DARK_GOLD: Color = Color::Rgb(184, 134, 11);

/// Every style the dashboard renders with.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub warning: Style,

    // ── Chart ────────────────────────────────────────────────────────────────
    pub chart_axis: Style,
    /// Line colours, cycled when there are more series than entries.
    pub series: Vec<Color>,

    // ── Table ────────────────────────────────────────────────────────────────
    pub table_header: Style,
    pub table_border: Style,
    pub table_row: Style,
    pub table_row_alt: Style,
    /// Channel and global mean rows.
    pub aggregate_row: Style,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            warning: Style::default().fg(Color::Yellow),

            chart_axis: Style::default().fg(Color::Gray),
            series: vec![
                Color::Cyan,
                Color::Magenta,
                Color::Green,
                Color::LightRed,
                Color::LightBlue,
                Color::Yellow,
                Color::LightGreen,
                Color::LightMagenta,
            ],

            table_header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::DarkGray),
            table_row: Style::default().fg(Color::White),
            table_row_alt: Style::default().fg(Color::Gray),
            aggregate_row: Style::default().fg(GOLD).add_modifier(Modifier::BOLD),
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),
            warning: Style::default().fg(Color::Red),

            chart_axis: Style::default().fg(Color::DarkGray),
            series: vec![
                Color::Blue,
                Color::Magenta,
                Color::Green,
                Color::Red,
                Color::Cyan,
                Color::DarkGray,
            ],

            table_header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            table_border: Style::default().fg(Color::Gray),
            table_row: Style::default().fg(Color::Black),
            table_row_alt: Style::default().fg(Color::DarkGray),
            aggregate_row: Style::default()
                .fg(DARK_GOLD)
                .add_modifier(Modifier::BOLD),
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Construct a theme by name. Falls back to `auto_detect` for unknown
    /// names, including `"auto"`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Colour of the `index`-th chart line.
    pub fn series_color(&self, index: usize) -> Color {
        if self.series.is_empty() {
            return Color::Reset;
        }
        self.series[index % self.series.len()]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
