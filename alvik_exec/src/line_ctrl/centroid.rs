//! Centroid estimation for the line sensor array

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Estimate the signed lateral error of the line from the three sensor
/// readings.
///
/// The readings are combined into a weighted centroid with position weights
/// left = 1, center = 2, right = 3, and the error is the centroid's offset
/// from the centre weight. Positive error means the line is to the robot's
/// left. An all-zero frame (line lost under every sensor) is a defined case
/// and returns zero rather than dividing by zero.
pub fn centroid_error(left: u16, center: u16, right: u16) -> f64 {
    let sum_weight = (left as f64) + (center as f64) + (right as f64);

    if sum_weight == 0.0 {
        return 0.0;
    }

    let sum_values = (left as f64) + 2.0 * (center as f64) + 3.0 * (right as f64);

    2.0 - sum_values / sum_weight
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_all_zero_frame_gives_zero_error() {
        assert_eq!(centroid_error(0, 0, 0), 0.0);
    }

    #[test]
    fn test_symmetric_frame_gives_zero_error() {
        assert_eq!(centroid_error(100, 100, 100), 0.0);
        assert_eq!(centroid_error(400, 800, 400), 0.0);
    }

    #[test]
    fn test_sign_convention() {
        // Line fully under the left sensor
        assert_eq!(centroid_error(500, 0, 0), 1.0);

        // Line fully under the right sensor
        assert_eq!(centroid_error(0, 0, 500), -1.0);
    }

    #[test]
    fn test_monotonic_toward_right_bias() {
        // Growing the right reading must monotonically decrease the error
        let mut prev = centroid_error(300, 300, 0);
        for right in (100..=800).step_by(100) {
            let error = centroid_error(300, 300, right);
            assert!(
                error < prev,
                "error {} not below {} at right = {}",
                error,
                prev,
                right
            );
            prev = error;
        }
    }

    #[test]
    fn test_error_bounded_by_one() {
        for &(l, c, r) in &[(800, 0, 0), (0, 800, 0), (0, 0, 800), (800, 800, 800)] {
            let error = centroid_error(l, c, r);
            assert!(error.abs() <= 1.0);
        }
    }
}
