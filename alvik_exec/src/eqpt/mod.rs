//! # Equipment boundary
//!
//! The control loop talks to the robot hardware exclusively through the
//! [`Alvik`] trait: line sensors, the optional distance/IMU sensors, the two
//! wheel motors, the touch buttons and the status LEDs. Equipment faults are
//! the only fatal error class - the driver brakes and exits when one is
//! raised.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod sim;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{DistanceFrame, ImuFrame, LineSensorFrame};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Colour of a status LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedColour {
    Off,
    Blue,
    Green,
    Red,
}

/// Possible errors raised by the equipment drivers.
#[derive(Debug, thiserror::Error)]
pub enum EqptError {
    #[error("Could not read the line sensor array: {0}")]
    SensorReadError(String),

    #[error("Could not command the wheel motors: {0}")]
    MotorCmdError(String),

    #[error("Could not read the touch buttons: {0}")]
    ButtonReadError(String),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The hardware driver boundary.
///
/// All operations are fallible; a returned [`EqptError`] is propagated to the
/// loop's outer boundary, which commands a brake before the process exits.
pub trait Alvik {
    /// Read the three line-following sensors.
    fn read_line_sensors(&mut self) -> Result<LineSensorFrame, EqptError>;

    /// Read the time-of-flight distance array, `None` if not fitted.
    fn read_distance(&mut self) -> Result<Option<DistanceFrame>, EqptError>;

    /// Read the IMU, `None` if not fitted.
    fn read_imu(&mut self) -> Result<Option<ImuFrame>, EqptError>;

    /// Command the wheel speeds. Signed values drive the wheel backwards.
    fn set_wheel_speeds(&mut self, left: f64, right: f64) -> Result<(), EqptError>;

    /// Actively brake both wheels.
    fn brake(&mut self) -> Result<(), EqptError>;

    /// True while the ok (start) touch button is pressed.
    fn touch_ok(&mut self) -> Result<bool, EqptError>;

    /// True while the cancel (stop) touch button is pressed.
    fn touch_cancel(&mut self) -> Result<bool, EqptError>;

    /// Set the colour of the two status LEDs.
    fn set_leds(&mut self, left: LedColour, right: LedColour) -> Result<(), EqptError>;
}
