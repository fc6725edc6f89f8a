use super::constants::PROGRESS_DECIMALS;

/// Drops progress reports whose rounded value has not changed since the last one.
///
/// Downloads and transcodes emit far more updates than an operator can read;
/// rounding to [`PROGRESS_DECIMALS`] places keeps the log readable.
#[derive(Debug, Default)]
pub struct ProgressThrottle {
    last: Option<f64>,
}

impl ProgressThrottle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe `done` of `total` units. Returns the rounded fraction when it
    /// should be reported, `None` when unchanged or when `total` is unknown (0).
    pub fn observe(&mut self, done: u64, total: u64) -> Option<f64> {
        if total == 0 {
            return None;
        }
        self.observe_fraction(done as f64 / total as f64)
    }

    /// Observe a fraction in `0.0..=1.0`. Out-of-range values are clamped.
    pub fn observe_fraction(&mut self, fraction: f64) -> Option<f64> {
        if !fraction.is_finite() {
            return None;
        }
        let rounded = round_to(fraction.clamp(0.0, 1.0), PROGRESS_DECIMALS);
        if self.last == Some(rounded) {
            return None;
        }
        self.last = Some(rounded);
        Some(rounded)
    }

    pub fn last(&self) -> Option<f64> {
        self.last
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
