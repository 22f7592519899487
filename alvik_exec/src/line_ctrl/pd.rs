//! Proportional-derivative controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PD controller.
///
/// The derivative is taken per tick (`error - last_error`), the loop runs at
/// a fixed cadence so no wall-clock delta is needed. The caller owns
/// `last_error` and must refresh it exactly once per tick, after calling
/// [`PdController::correction`] - a derivative computed against an error from
/// two ticks ago is a defect.
#[derive(Debug, Serialize, Clone)]
pub struct PdController {
    /// Proportional gain
    k_p: f64,

    /// Derivative gain
    k_d: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PdController {
    /// Create a new controller with the given gains.
    pub fn new(k_p: f64, k_d: f64) -> Self {
        Self { k_p, k_d }
    }

    /// Get the correction for the given error and the previous tick's error.
    pub fn correction(&self, error: f64, last_error: f64) -> f64 {
        self.k_p * error + self.k_d * (error - last_error)
    }

    /// Overwrite the gains, keeping any which are `None`.
    ///
    /// Updates are whole-value replacements applied strictly between ticks,
    /// never mid-computation.
    pub fn set_gains(&mut self, k_p: Option<f64>, k_d: Option<f64>) {
        if let Some(k_p) = k_p {
            self.k_p = k_p;
        }
        if let Some(k_d) = k_d {
            self.k_d = k_d;
        }
    }

    /// The proportional gain currently in use.
    pub fn k_p(&self) -> f64 {
        self.k_p
    }

    /// The derivative gain currently in use.
    pub fn k_d(&self) -> f64 {
        self.k_d
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_repeated_error_has_no_derivative_term() {
        let pd = PdController::new(60.0, 15.0);

        // With error == last_error the correction is purely proportional
        assert_eq!(pd.correction(0.5, 0.5), 60.0 * 0.5);
        assert_eq!(pd.correction(-0.25, -0.25), 60.0 * -0.25);
    }

    #[test]
    fn test_derivative_term() {
        let pd = PdController::new(0.0, 15.0);

        assert!((pd.correction(0.5, 0.3) - 3.0).abs() < 1e-9);
        assert!((pd.correction(0.3, 0.5) + 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_gains_keeps_unset_values() {
        let mut pd = PdController::new(60.0, 15.0);

        pd.set_gains(Some(80.0), None);
        assert_eq!(pd.k_p(), 80.0);
        assert_eq!(pd.k_d(), 15.0);

        pd.set_gains(None, Some(5.0));
        assert_eq!(pd.k_p(), 80.0);
        assert_eq!(pd.k_d(), 5.0);
    }
}
