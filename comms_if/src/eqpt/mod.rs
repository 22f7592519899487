//! # Equipment data types
//!
//! Data produced by and commanded to the robot's equipment. These types are
//! shared between the robot executable and the ground-side tools, so they
//! live in the communications interface rather than in the executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A snapshot of the three line-following sensors.
///
/// Readings are raw non-negative values, higher meaning more line (black)
/// under the sensor. A frame is taken once per control cycle and never
/// mutated.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineSensorFrame {
    pub left: u16,
    pub center: u16,
    pub right: u16,
}

/// A snapshot of the time-of-flight distance array.
///
/// Field names are renamed on the wire to the `ToF_*` convention the ground
/// dashboard expects.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DistanceFrame {
    #[serde(rename = "ToF_T")]
    pub top: u16,

    #[serde(rename = "ToF_B")]
    pub bottom: u16,

    #[serde(rename = "ToF_L")]
    pub left: u16,

    #[serde(rename = "ToF_CL")]
    pub center_left: u16,

    #[serde(rename = "ToF_C")]
    pub center: u16,

    #[serde(rename = "ToF_CR")]
    pub center_right: u16,

    #[serde(rename = "ToF_R")]
    pub right: u16,
}

/// A snapshot of the inertial measurement unit.
///
/// Units: acceleration in g, angular rate in degrees/second. Attitude angles
/// are not computed on the robot, that derivation is the consumer's concern.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct ImuFrame {
    pub accel_x: f64,
    pub accel_y: f64,
    pub accel_z: f64,
    pub gyro_x: f64,
    pub gyro_y: f64,
    pub gyro_z: f64,
}

/// A speed demand for the two drive wheels.
///
/// Speeds produced by the line controller are clamped into `[0, max_speed]`.
/// Pivot manoeuvres command signed speeds, which is a distinct open-loop mode
/// rather than a violation of that invariant.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, PartialEq)]
pub struct WheelCommand {
    pub left_speed: f64,
    pub right_speed: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LineSensorFrame {
    pub fn new(left: u16, center: u16, right: u16) -> Self {
        Self {
            left,
            center,
            right,
        }
    }

    /// The frame as a `[left, center, right]` array, the wire format used in
    /// telemetry.
    pub fn as_array(&self) -> [u16; 3] {
        [self.left, self.center, self.right]
    }
}

impl WheelCommand {
    pub fn new(left_speed: f64, right_speed: f64) -> Self {
        Self {
            left_speed,
            right_speed,
        }
    }

    /// A command which stops both wheels.
    pub fn stop() -> Self {
        Self::default()
    }
}
