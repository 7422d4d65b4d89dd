//! Mean arithmetic shared by every aggregation stage.

// ── MeanAccumulator ───────────────────────────────────────────────────────────

/// Running sum and count for an unweighted arithmetic mean.
///
/// An accumulator that never saw a value has no mean: [`mean`] returns
/// `None` rather than `0.0` or `NaN`.
///
/// [`mean`]: MeanAccumulator::mean
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one value.
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// Add a value that may be undefined. `None` leaves both the sum and the
    /// divisor untouched.
    pub fn push_defined(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.push(v);
        }
    }

    /// Number of values added so far.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean of the values added so far, or `None` if there were none.
    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

impl FromIterator<f64> for MeanAccumulator {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut acc = Self::new();
        for v in iter {
            acc.push(v);
        }
        acc
    }
}

/// Mean of the defined values in `values`, or `None` when none are defined.
pub fn mean_of_defined<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut acc = MeanAccumulator::new();
    for v in values {
        acc.push_defined(v);
    }
    acc.mean()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
