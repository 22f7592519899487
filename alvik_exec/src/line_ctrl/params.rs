//! Parameters structure for LineCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for line-following control.
///
/// The defaults mirror the tuning the robot was commissioned with.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    // ---- CONTROLLER ----
    /// Initial proportional gain.
    pub kp: f64,

    /// Initial derivative gain.
    pub kd: f64,

    /// Wheel speed with zero correction applied.
    pub base_speed: f64,

    /// Upper clamp for the commanded wheel speeds.
    pub max_speed: f64,

    // ---- TURN OVERRIDE ----
    /// Wheel speed magnitude used while pivoting.
    pub turn_speed: f64,

    /// A sensor at or above this reading sees the line.
    pub line_threshold: u16,

    /// A side sensor above this reading triggers the slow-down override.
    /// Must be greater than `line_threshold`.
    pub slow_down_threshold: u16,

    /// Interval between centre-sensor polls during a pivot.
    ///
    /// Units: milliseconds
    pub pivot_poll_ms: u64,

    /// Maximum number of centre-sensor polls before a pivot is declared
    /// failed.
    pub pivot_max_polls: u32,

    // ---- RECOVERY ----
    /// Wheel speed magnitude of the reverse pulse when the line is lost.
    pub recovery_speed: f64,

    /// Duration of the reverse pulse.
    ///
    /// Units: milliseconds
    pub recovery_pulse_ms: u64,

    /// Duration of the full stop after the reverse pulse.
    ///
    /// Units: milliseconds
    pub recovery_stop_ms: u64,

    // ---- INDICATION ----
    /// Corrections larger than this light the correction LED.
    pub correction_led_threshold: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            kp: 60.0,
            kd: 15.0,
            base_speed: 25.0,
            max_speed: 60.0,
            turn_speed: 15.0,
            line_threshold: 250,
            slow_down_threshold: 400,
            pivot_poll_ms: 10,
            pivot_max_polls: 400,
            recovery_speed: 10.0,
            recovery_pulse_ms: 100,
            recovery_stop_ms: 100,
            correction_led_threshold: 0.2,
        }
    }
}
