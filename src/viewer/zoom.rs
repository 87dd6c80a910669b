//! Zoom state for PDF rendering
//!
//! Holds the scale factor applied to every page surface and enforces the
//! lower bound that keeps surface dimensions from degenerating.

/// Zoom scale for the viewer, 1.0 = 100%.
#[derive(Debug)]
pub struct Zoom {
    /// Current zoom factor (1.0 = 100%)
    pub factor: f64,
}

impl Default for Zoom {
    fn default() -> Self {
        Self { factor: 1.0 }
    }
}

impl Zoom {
    /// Additive zoom step per action - 10%
    pub const STEP: f64 = 0.1;
    /// Minimum allowed zoom factor
    pub const MIN_SCALE: f64 = 0.1;

    /// Returns the current zoom factor
    #[must_use]
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Zoom percentage for the indicator, e.g. "120%"
    #[must_use]
    pub fn percent(&self) -> String {
        format!("{:.0}%", self.factor * 100.0)
    }

    /// Zoom in by one step. There is no upper bound.
    ///
    /// Returns true when the factor changed (always, for zooming in), so
    /// callers know a relayout is due.
    pub fn step_in(&mut self) -> bool {
        self.factor = Self::clamp_factor(self.factor + Self::STEP);
        true
    }

    /// Zoom out by one step, clamped at [`Zoom::MIN_SCALE`].
    ///
    /// Returns false when the factor is already at the floor; the request
    /// is a no-op, not an error, and no relayout should fire.
    pub fn step_out(&mut self) -> bool {
        let next = Self::clamp_factor(self.factor - Self::STEP);
        if (next - self.factor).abs() < f64::EPSILON {
            return false;
        }
        self.factor = next;
        true
    }

    /// Clamp factor to valid range, handling NaN/Inf
    #[must_use]
    pub fn clamp_factor(factor: f64) -> f64 {
        if !factor.is_finite() {
            1.0
        } else {
            factor.max(Self::MIN_SCALE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_steps_in_reach_150_percent() {
        let mut zoom = Zoom::default();
        for _ in 0..5 {
            assert!(zoom.step_in());
        }
        assert!((zoom.factor() - 1.5).abs() < 1e-9);
        assert_eq!(zoom.percent(), "150%");
    }

    #[test]
    fn step_out_is_idempotent_at_the_floor() {
        let mut zoom = Zoom::default();
        while zoom.step_out() {}

        assert!((zoom.factor() - Zoom::MIN_SCALE).abs() < 1e-9);

        // Further attempts leave the factor untouched.
        assert!(!zoom.step_out());
        assert!(!zoom.step_out());
        assert!((zoom.factor() - Zoom::MIN_SCALE).abs() < 1e-9);
    }

    #[test]
    fn step_out_reports_whether_a_relayout_is_due() {
        let mut zoom = Zoom::default();
        assert!(zoom.step_out());
        assert!((zoom.factor() - 0.9).abs() < 1e-9);
    }

    #[test]
    fn clamp_factor_recovers_from_non_finite_values() {
        assert!((Zoom::clamp_factor(f64::NAN) - 1.0).abs() < 1e-9);
        assert!((Zoom::clamp_factor(f64::INFINITY) - 1.0).abs() < 1e-9);
        assert!((Zoom::clamp_factor(0.0) - Zoom::MIN_SCALE).abs() < 1e-9);
    }

    #[test]
    fn percent_rounds_to_whole_numbers() {
        let mut zoom = Zoom::default();
        assert_eq!(zoom.percent(), "100%");
        zoom.step_in();
        zoom.step_in();
        assert_eq!(zoom.percent(), "120%");
    }
}
