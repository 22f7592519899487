//! Turn-override detection and open-loop manoeuvre execution

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Serialize;
use std::thread;
use std::time::Duration;

// Internal
use super::{LineCtrlError, Params};
use crate::eqpt::Alvik;
use comms_if::eqpt::LineSensorFrame;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The manoeuvre selected for a sensor frame.
///
/// `Follow` means no discrete override matched and the PD correction applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mnvr {
    Follow,
    PivotLeft,
    PivotRight,
    SlowLeft,
    SlowRight,
    Recover,
}

impl Default for Mnvr {
    fn default() -> Self {
        Mnvr::Follow
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Report on a completed pivot manoeuvre.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PivotReport {
    /// Number of centre-sensor polls it took to re-acquire the line.
    pub polls: u32,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Test the discrete turn-override conditions against a sensor frame.
///
/// The override conditions take precedence over the PD law, in this order:
/// sharp turns, slow-down bias, lost line. Frames matching none of them fall
/// through to `Follow`.
pub fn detect(frame: &LineSensorFrame, params: &Params) -> Mnvr {
    let t = params.line_threshold;
    let s = params.slow_down_threshold;
    let (l, c, r) = (frame.left, frame.center, frame.right);

    if l > t && c < t && r < t {
        Mnvr::PivotLeft
    } else if r > t && c < t && l < t {
        Mnvr::PivotRight
    } else if l > s && c > t && r < t {
        Mnvr::SlowLeft
    } else if r > s && c > t && l < t {
        Mnvr::SlowRight
    } else if l < t && c < t && r < t {
        Mnvr::Recover
    } else {
        Mnvr::Follow
    }
}

/// Execute a pivot until the centre sensor re-acquires the line.
///
/// This is a blocking sub-loop: telemetry and parameter updates are suspended
/// while it runs. The wait is bounded by physical motion, not wall-clock
/// time, but a stuck sensor would hang the loop forever so the poll count is
/// capped; exceeding the cap brakes the wheels and raises a timeout fault.
pub fn exec_pivot<E: Alvik>(
    eqpt: &mut E,
    mnvr: Mnvr,
    params: &Params,
) -> Result<PivotReport, LineCtrlError> {
    let (left, right) = match mnvr {
        Mnvr::PivotLeft => (-params.turn_speed, params.turn_speed),
        Mnvr::PivotRight => (params.turn_speed, -params.turn_speed),
        other => return Err(LineCtrlError::InvalidMnvr(other)),
    };

    eqpt.set_wheel_speeds(left, right)?;

    for polls in 1..=params.pivot_max_polls {
        thread::sleep(Duration::from_millis(params.pivot_poll_ms));

        let frame = eqpt.read_line_sensors()?;
        if frame.center >= params.line_threshold {
            debug!("Pivot complete after {} polls", polls);
            return Ok(PivotReport { polls });
        }
    }

    eqpt.brake()?;
    Err(LineCtrlError::PivotTimeout(params.pivot_max_polls))
}

/// Execute the lost-line recovery manoeuvre.
///
/// A brief reverse pulse, then a full stop, after which the caller resumes
/// normal sensing on the next tick. This is the last-resort default, not an
/// error.
pub fn exec_recovery<E: Alvik>(eqpt: &mut E, params: &Params) -> Result<(), LineCtrlError> {
    eqpt.set_wheel_speeds(-params.recovery_speed, -params.recovery_speed)?;
    thread::sleep(Duration::from_millis(params.recovery_pulse_ms));

    eqpt.set_wheel_speeds(0.0, 0.0)?;
    thread::sleep(Duration::from_millis(params.recovery_stop_ms));

    Ok(())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn params() -> Params {
        Params::default()
    }

    #[test]
    fn test_sharp_left_takes_precedence_over_pd() {
        let frame = LineSensorFrame::new(300, 100, 50);
        assert_eq!(detect(&frame, &params()), Mnvr::PivotLeft);
    }

    #[test]
    fn test_sharp_right_mirrors_sharp_left() {
        let frame = LineSensorFrame::new(50, 100, 300);
        assert_eq!(detect(&frame, &params()), Mnvr::PivotRight);
    }

    #[test]
    fn test_slow_down_bias_left() {
        let frame = LineSensorFrame::new(450, 300, 100);
        assert_eq!(detect(&frame, &params()), Mnvr::SlowLeft);
    }

    #[test]
    fn test_slow_down_bias_right() {
        let frame = LineSensorFrame::new(100, 300, 450);
        assert_eq!(detect(&frame, &params()), Mnvr::SlowRight);
    }

    #[test]
    fn test_line_lost_triggers_recovery() {
        let frame = LineSensorFrame::new(50, 50, 50);
        assert_eq!(detect(&frame, &params()), Mnvr::Recover);
    }

    #[test]
    fn test_centred_line_follows() {
        let frame = LineSensorFrame::new(100, 600, 100);
        assert_eq!(detect(&frame, &params()), Mnvr::Follow);
    }

    #[test]
    fn test_side_bias_below_slow_threshold_follows() {
        // Left sensor sees the line but is not saturated, the PD law is
        // expected to handle this
        let frame = LineSensorFrame::new(320, 500, 80);
        assert_eq!(detect(&frame, &params()), Mnvr::Follow);
    }
}
