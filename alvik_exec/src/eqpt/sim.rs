//! # Simulated equipment
//!
//! [`SimAlvik`] implements the equipment boundary without hardware. It serves
//! two purposes: scripted sensor frames for the unit and integration tests,
//! and a small lateral-offset plant model so the executable can be run on a
//! desk and produce believable telemetry.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use std::collections::VecDeque;

// Internal
use comms_if::eqpt::{DistanceFrame, ImuFrame, LineSensorFrame};
use util::maths::lin_map;

use super::{Alvik, EqptError, LedColour};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Lateral positions of the three sensors in track units. Positive is to the
/// robot's left.
const SENSOR_POSITIONS: [f64; 3] = [0.6, 0.0, -0.6];

/// Half-width of a sensor's view of the line, in track units.
const SENSOR_WIDTH: f64 = 0.8;

/// Peak reading of a sensor centred on the line.
const SENSOR_PEAK: f64 = 800.0;

/// How far the line moves per unit of wheel speed differential, per read.
const STEER_GAIN: f64 = 0.004;

/// Sideways drift of the track per read, which makes the plant behave like a
/// gentle constant curve.
const TRACK_DRIFT: f64 = 0.02;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command issued to the simulated equipment, recorded for the tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimCmd {
    Wheels(f64, f64),
    Brake,
    Leds(LedColour, LedColour),
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The lateral-offset plant model.
///
/// `offset` is the position of the line relative to the robot's centreline,
/// positive to the robot's left. Driving the right wheel faster than the left
/// turns the robot left and so reduces a positive offset.
struct TrackPlant {
    offset: f64,
}

/// Simulated Alvik equipment.
pub struct SimAlvik {
    /// Frames returned by `read_line_sensors` before the plant takes over.
    scripted_frames: VecDeque<LineSensorFrame>,

    /// Last frame returned, repeated once a script runs dry.
    last_frame: LineSensorFrame,

    plant: Option<TrackPlant>,

    /// Everything commanded of the equipment, in order.
    pub cmd_log: Vec<SimCmd>,

    touch_ok_script: VecDeque<bool>,
    touch_cancel_script: VecDeque<bool>,

    distance: Option<DistanceFrame>,
    fit_imu: bool,

    last_wheels: (f64, f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TrackPlant {
    fn step(&mut self, left_speed: f64, right_speed: f64) -> LineSensorFrame {
        self.offset += TRACK_DRIFT;
        self.offset -= (right_speed - left_speed) * STEER_GAIN;

        let mut readings = [0u16; 3];
        for (i, pos) in SENSOR_POSITIONS.iter().enumerate() {
            let dist = (self.offset - pos).abs();
            readings[i] = if dist >= SENSOR_WIDTH {
                0
            } else {
                lin_map((SENSOR_WIDTH, 0.0), (0.0, SENSOR_PEAK), dist) as u16
            };
        }

        LineSensorFrame::new(readings[0], readings[1], readings[2])
    }
}

impl SimAlvik {
    /// Create a simulation which replays the given frames, then repeats the
    /// last one.
    pub fn scripted(frames: Vec<LineSensorFrame>) -> Self {
        Self {
            scripted_frames: frames.into(),
            last_frame: LineSensorFrame::default(),
            plant: None,
            cmd_log: Vec::new(),
            touch_ok_script: VecDeque::new(),
            touch_cancel_script: VecDeque::new(),
            distance: None,
            fit_imu: false,
            last_wheels: (0.0, 0.0),
        }
    }

    /// Create a simulation driving the lateral-offset plant, starting on the
    /// line, with distance and IMU sensors fitted.
    ///
    /// The touch script presses the ok button once so the driver's start
    /// gating is exercised.
    pub fn on_track() -> Self {
        let mut sim = Self::scripted(Vec::new());
        sim.plant = Some(TrackPlant { offset: 0.0 });
        sim.touch_ok_script = vec![true, false, true].into();
        sim.distance = Some(DistanceFrame {
            top: 500,
            bottom: 45,
            left: 320,
            center_left: 300,
            center: 280,
            center_right: 300,
            right: 320,
        });
        sim.fit_imu = true;
        sim
    }

    /// Append frames to the sensor script.
    pub fn push_frames(&mut self, frames: &[LineSensorFrame]) {
        self.scripted_frames.extend(frames.iter().copied());
    }

    /// Script the ok button state for successive polls.
    pub fn script_touch_ok(&mut self, presses: &[bool]) {
        self.touch_ok_script.extend(presses.iter().copied());
    }

    /// Script the cancel button state for successive polls.
    pub fn script_touch_cancel(&mut self, presses: &[bool]) {
        self.touch_cancel_script.extend(presses.iter().copied());
    }

    /// The wheel speeds most recently commanded.
    pub fn last_wheels(&self) -> (f64, f64) {
        self.last_wheels
    }
}

impl Alvik for SimAlvik {
    fn read_line_sensors(&mut self) -> Result<LineSensorFrame, EqptError> {
        if let Some(frame) = self.scripted_frames.pop_front() {
            self.last_frame = frame;
            return Ok(frame);
        }

        if let Some(ref mut plant) = self.plant {
            let (left, right) = self.last_wheels;
            self.last_frame = plant.step(left, right);
        }

        Ok(self.last_frame)
    }

    fn read_distance(&mut self) -> Result<Option<DistanceFrame>, EqptError> {
        Ok(self.distance)
    }

    fn read_imu(&mut self) -> Result<Option<ImuFrame>, EqptError> {
        if !self.fit_imu {
            return Ok(None);
        }

        // Flat ground, gravity on z, yaw rate proportional to the wheel
        // differential
        let (left, right) = self.last_wheels;
        Ok(Some(ImuFrame {
            accel_x: 0.0,
            accel_y: 0.0,
            accel_z: 1.0,
            gyro_x: 0.0,
            gyro_y: 0.0,
            gyro_z: (right - left) * 2.0,
        }))
    }

    fn set_wheel_speeds(&mut self, left: f64, right: f64) -> Result<(), EqptError> {
        self.last_wheels = (left, right);
        self.cmd_log.push(SimCmd::Wheels(left, right));
        Ok(())
    }

    fn brake(&mut self) -> Result<(), EqptError> {
        self.last_wheels = (0.0, 0.0);
        self.cmd_log.push(SimCmd::Brake);
        Ok(())
    }

    fn touch_ok(&mut self) -> Result<bool, EqptError> {
        Ok(self.touch_ok_script.pop_front().unwrap_or(false))
    }

    fn touch_cancel(&mut self) -> Result<bool, EqptError> {
        Ok(self.touch_cancel_script.pop_front().unwrap_or(false))
    }

    fn set_leds(&mut self, left: LedColour, right: LedColour) -> Result<(), EqptError> {
        self.cmd_log.push(SimCmd::Leds(left, right));
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_scripted_frames_replay_then_hold() {
        let mut sim = SimAlvik::scripted(vec![
            LineSensorFrame::new(1, 2, 3),
            LineSensorFrame::new(4, 5, 6),
        ]);

        assert_eq!(sim.read_line_sensors().unwrap(), LineSensorFrame::new(1, 2, 3));
        assert_eq!(sim.read_line_sensors().unwrap(), LineSensorFrame::new(4, 5, 6));
        // Script exhausted, last frame is held
        assert_eq!(sim.read_line_sensors().unwrap(), LineSensorFrame::new(4, 5, 6));
    }

    #[test]
    fn test_plant_centred_on_line_at_start() {
        let mut sim = SimAlvik::on_track();
        let frame = sim.read_line_sensors().unwrap();

        // Straight over the line: centre reading dominates both sides
        assert!(frame.center > frame.left);
        assert!(frame.center > frame.right);
    }

    #[test]
    fn test_plant_line_moves_left_when_driving_straight() {
        let mut sim = SimAlvik::on_track();
        sim.set_wheel_speeds(25.0, 25.0).unwrap();

        let mut frame = LineSensorFrame::default();
        for _ in 0..30 {
            frame = sim.read_line_sensors().unwrap();
        }

        // The track drifts to the robot's left when uncorrected
        assert!(frame.left > frame.right);
    }
}
