/// Number of decimal places used whenever an average is shown or exported.
pub const DISPLAY_DECIMALS: u32 = 2;

/// Placeholder rendered for an undefined average.
pub const MISSING: &str = "-";

/// Round `value` to `decimals` places, half away from zero.
///
/// # Examples
///
/// ```
/// use viewer_core::formatting::round_to;
///
/// assert_eq!(round_to(123.456, 2), 123.46);
/// assert_eq!(round_to(-0.125, 1), -0.1);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    // Nudge by a relative epsilon so midpoints stored as x.xx4999… round up.
    let nudged = value.abs() * factor * (1.0 + f64::EPSILON);
    nudged.round().copysign(value) / factor
}

/// Format a number with thousands separators and a fixed number of decimal
/// places.
///
/// # Examples
///
/// ```
/// use viewer_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5, 1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let rounded = round_to(value.abs(), decimals);
    let plain = format!("{:.prec$}", rounded, prec = decimals as usize);
    let (int_part, frac_part) = match plain.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (plain.as_str(), None),
    };

    let mut out = String::new();
    if value < 0.0 && rounded != 0.0 {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if let Some(f) = frac_part {
        out.push('.');
        out.push_str(f);
    }
    out
}

/// Render an optional average for a table cell: two decimals with
/// separators, or [`MISSING`] when undefined.
///
/// # Examples
///
/// ```
/// use viewer_core::formatting::format_average;
///
/// assert_eq!(format_average(Some(1520.0)), "1,520.00");
/// assert_eq!(format_average(None), "-");
/// ```
pub fn format_average(value: Option<f64>) -> String {
    match value {
        Some(v) => format_number(v, DISPLAY_DECIMALS),
        None => MISSING.to_string(),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    let digits: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
