//! Implementations for the LineCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace};
use serde::Serialize;

// Internal
use super::{centroid_error, mnvr, LineCtrlError, LineCtrlInitError, Mnvr, Params, PdController};
use comms_if::eqpt::{LineSensorFrame, WheelCommand};
use comms_if::param::ParamUpdate;
use util::{
    archive::{Archived, Archiver},
    maths::clamp,
    module::State,
    params,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Line-following control module state.
///
/// The module owns the controller gains and the previous tick's error. The
/// gains are the only data mutated from outside the tick's sequential flow
/// (by [`LineCtrl::apply_param_update`]), and the driver applies updates
/// strictly between ticks so the PD computation never sees a half-replaced
/// gain pair.
pub struct LineCtrl {
    params: Params,

    pd: PdController,

    last_error: f64,

    report: StatusReport,

    output: OutputData,

    arch_output: Archiver,
}

/// Input data to line control.
#[derive(Default, Debug, Clone, Copy)]
pub struct InputData {
    /// The sensor frame taken at the start of this cycle.
    pub frame: LineSensorFrame,
}

/// Output from line control that the driver must act on.
#[derive(Default, Debug, Clone, Copy, Serialize)]
pub struct OutputData {
    /// The manoeuvre selected for this cycle. `Follow`, `SlowLeft` and
    /// `SlowRight` are satisfied by applying `cmd`; pivots and recovery are
    /// blocking manoeuvres the driver executes through the equipment
    /// boundary.
    pub mnvr: Mnvr,

    /// Wheel speed demand for this cycle. For pivots this holds the signed
    /// pivot speeds, for recovery it is zero.
    pub cmd: WheelCommand,

    /// Centroid error of the sensor frame.
    pub error: f64,

    /// Per-tick derivative of the error.
    pub derivative: f64,

    /// PD correction applied to the base speed.
    pub control: f64,
}

/// Status report for LineCtrl processing.
#[derive(Default, Debug, Clone, Copy, Serialize)]
pub struct StatusReport {
    /// True if the left speed demand hit the clamp.
    pub left_speed_limited: bool,

    /// True if the right speed demand hit the clamp.
    pub right_speed_limited: bool,

    /// True if the frame showed no line under any sensor.
    pub line_lost: bool,

    /// True if a pivot manoeuvre was selected.
    pub pivoting: bool,
}

/// Flat per-cycle record written to the session archive.
#[derive(Serialize)]
struct ArchRecord {
    time_s: f64,
    mnvr: Mnvr,
    error: f64,
    derivative: f64,
    control: f64,
    left_speed: f64,
    right_speed: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for LineCtrl {
    fn default() -> Self {
        Self::with_params(Params::default())
    }
}

impl LineCtrl {
    /// Create a module with the given parameters and no archive, as used by
    /// the tests. The executable initialises through `State::init` instead.
    pub fn with_params(params: Params) -> Self {
        let pd = PdController::new(params.kp, params.kd);

        Self {
            params,
            pd,
            last_error: 0.0,
            report: StatusReport::default(),
            output: OutputData::default(),
            arch_output: Archiver::default(),
        }
    }

    /// Apply a parameter update recieved from the ground.
    ///
    /// Must be called between ticks, never during `proc`.
    pub fn apply_param_update(&mut self, update: &ParamUpdate) {
        if update.is_empty() {
            debug!("Empty parameter update ignored");
            return;
        }

        self.pd.set_gains(update.kp, update.kd);

        if update.ki.is_some() {
            debug!("Ignoring ki in parameter update, the controller is PD only");
        }

        info!(
            "Controller gains updated: kp = {}, kd = {}",
            self.pd.k_p(),
            self.pd.k_d()
        );
    }

    /// The proportional gain currently in use.
    pub fn kp(&self) -> f64 {
        self.pd.k_p()
    }

    /// The derivative gain currently in use.
    pub fn kd(&self) -> f64 {
        self.pd.k_d()
    }

    /// The previous tick's error.
    pub fn last_error(&self) -> f64 {
        self.last_error
    }

    /// The module parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }
}

impl State for LineCtrl {
    type InitData = &'static str;
    type InitError = LineCtrlInitError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = LineCtrlError;

    /// Initialise the LineCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        self.params = params::load(init_data)?;
        self.pd = PdController::new(self.params.kp, self.params.kd);

        self.arch_output = Archiver::from_path(session, "line_ctrl/output.csv")
            .map_err(|e| LineCtrlInitError::ArchInitError(e.to_string()))?;

        Ok(())
    }

    /// Perform cyclic processing of line control.
    ///
    /// The input frame is mapped to a manoeuvre and a wheel command. The
    /// centroid error is computed on every cycle, including override cycles,
    /// so the derivative never spans more than one tick.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        // Clear the status report
        self.report = StatusReport::default();

        let frame = &input_data.frame;

        let error = centroid_error(frame.left, frame.center, frame.right);
        let derivative = error - self.last_error;
        let control = self.pd.correction(error, self.last_error);

        let mnvr = mnvr::detect(frame, &self.params);

        let cmd = match mnvr {
            Mnvr::Follow => {
                let raw_left = self.params.base_speed - control;
                let raw_right = self.params.base_speed + control;

                let left = clamp(raw_left, 0.0, self.params.max_speed);
                let right = clamp(raw_right, 0.0, self.params.max_speed);

                self.report.left_speed_limited = raw_left != left;
                self.report.right_speed_limited = raw_right != right;

                WheelCommand::new(left, right)
            }
            Mnvr::SlowLeft => {
                WheelCommand::new(self.params.base_speed / 2.0, self.params.base_speed)
            }
            Mnvr::SlowRight => {
                WheelCommand::new(self.params.base_speed, self.params.base_speed / 2.0)
            }
            Mnvr::PivotLeft => {
                self.report.pivoting = true;
                WheelCommand::new(-self.params.turn_speed, self.params.turn_speed)
            }
            Mnvr::PivotRight => {
                self.report.pivoting = true;
                WheelCommand::new(self.params.turn_speed, -self.params.turn_speed)
            }
            Mnvr::Recover => {
                self.report.line_lost = true;
                WheelCommand::stop()
            }
        };

        // The previous error must be refreshed exactly once per tick, after
        // the derivative has been taken
        self.last_error = error;

        let output = OutputData {
            mnvr,
            cmd,
            error,
            derivative,
            control,
        };
        self.output = output;

        trace!(
            "LineCtrl output:\n    mnvr: {:?}\n    cmd: ({:.2}, {:.2})",
            output.mnvr,
            output.cmd.left_speed,
            output.cmd.right_speed
        );

        Ok((output, self.report))
    }
}

impl Archived for LineCtrl {
    fn write(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.arch_output.serialise(ArchRecord {
            time_s: session::get_elapsed_seconds(),
            mnvr: self.output.mnvr,
            error: self.output.error,
            derivative: self.output.derivative,
            control: self.output.control,
            left_speed: self.output.cmd.left_speed,
            right_speed: self.output.cmd.right_speed,
        })
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn centred_frame() -> InputData {
        InputData {
            frame: LineSensorFrame::new(100, 600, 100),
        }
    }

    #[test]
    fn test_centred_line_drives_straight_at_base_speed() {
        let mut ctrl = LineCtrl::default();

        let (output, report) = ctrl.proc(&centred_frame()).unwrap();

        assert_eq!(output.mnvr, Mnvr::Follow);
        assert_eq!(output.error, 0.0);
        assert_eq!(output.cmd.left_speed, 25.0);
        assert_eq!(output.cmd.right_speed, 25.0);
        assert!(!report.left_speed_limited);
        assert!(!report.right_speed_limited);
    }

    #[test]
    fn test_follow_speeds_always_clamped() {
        // Gains large enough to drive the raw demands far out of range
        let mut params = Params::default();
        params.kp = 10_000.0;
        let mut ctrl = LineCtrl::with_params(params);

        let input = InputData {
            frame: LineSensorFrame::new(320, 500, 80),
        };
        let (output, report) = ctrl.proc(&input).unwrap();

        assert_eq!(output.mnvr, Mnvr::Follow);
        assert!(output.cmd.left_speed >= 0.0 && output.cmd.left_speed <= 60.0);
        assert!(output.cmd.right_speed >= 0.0 && output.cmd.right_speed <= 60.0);
        assert!(report.left_speed_limited || report.right_speed_limited);
    }

    #[test]
    fn test_slow_down_bias_halves_inner_wheel() {
        let mut ctrl = LineCtrl::default();

        let input = InputData {
            frame: LineSensorFrame::new(450, 300, 100),
        };
        let (output, _) = ctrl.proc(&input).unwrap();

        assert_eq!(output.mnvr, Mnvr::SlowLeft);
        assert_eq!(output.cmd.left_speed, 12.5);
        assert_eq!(output.cmd.right_speed, 25.0);
    }

    #[test]
    fn test_pivot_command_uses_signed_speeds() {
        let mut ctrl = LineCtrl::default();

        let input = InputData {
            frame: LineSensorFrame::new(300, 100, 50),
        };
        let (output, report) = ctrl.proc(&input).unwrap();

        assert_eq!(output.mnvr, Mnvr::PivotLeft);
        assert_eq!(output.cmd.left_speed, -15.0);
        assert_eq!(output.cmd.right_speed, 15.0);
        assert!(report.pivoting);
    }

    #[test]
    fn test_lost_line_reported() {
        let mut ctrl = LineCtrl::default();

        let input = InputData {
            frame: LineSensorFrame::new(50, 50, 50),
        };
        let (output, report) = ctrl.proc(&input).unwrap();

        assert_eq!(output.mnvr, Mnvr::Recover);
        assert_eq!(output.cmd, WheelCommand::stop());
        assert!(report.line_lost);
    }

    #[test]
    fn test_last_error_updated_every_tick() {
        let mut ctrl = LineCtrl::default();

        // A biased frame, then a centred one: the second tick's derivative
        // must span exactly one tick
        let biased = InputData {
            frame: LineSensorFrame::new(500, 300, 0),
        };
        let (first, _) = ctrl.proc(&biased).unwrap();
        assert_eq!(ctrl.last_error(), first.error);

        let (second, _) = ctrl.proc(&centred_frame()).unwrap();
        assert_eq!(second.derivative, second.error - first.error);
        assert_eq!(ctrl.last_error(), second.error);
    }

    #[test]
    fn test_param_update_applies_kp_only() {
        let mut ctrl = LineCtrl::default();

        let update = ParamUpdate::from_json(r#"{"kp": 80.0}"#).unwrap();
        ctrl.apply_param_update(&update);

        assert_eq!(ctrl.kp(), 80.0);
        assert_eq!(ctrl.kd(), 15.0);
    }

    #[test]
    fn test_param_update_with_ki_leaves_pd_gains() {
        let mut ctrl = LineCtrl::default();

        let update = ParamUpdate::from_json(r#"{"ki": 3.0}"#).unwrap();
        ctrl.apply_param_update(&update);

        assert_eq!(ctrl.kp(), 60.0);
        assert_eq!(ctrl.kd(), 15.0);
    }
}
