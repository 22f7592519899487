//! # Telemetry messages
//!
//! A [`TmPacket`] is the flat snapshot of sensor and control state the robot
//! publishes once per telemetry cycle. Consumers must tolerate missing
//! optional keys (the distance and IMU fields are only present when the
//! hardware provides them); there is no schema versioning.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::eqpt::{DistanceFrame, ImuFrame};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Format of the `timestamp` field. The ground dashboard parses timestamps
/// with this exact format, keep the two in sync.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Telemetry packet published by the robot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmPacket {
    /// Seconds elapsed since the session epoch.
    pub time_s: f64,

    /// Wall-clock timestamp formatted with [`TIMESTAMP_FORMAT`].
    pub timestamp: String,

    /// Raw line sensor readings, `[left, center, right]`.
    pub line_sensors: [u16; 3],

    /// Commanded left wheel speed.
    pub left_speed: f64,

    /// Commanded right wheel speed.
    pub right_speed: f64,

    /// Centroid error fed to the controller.
    pub error: f64,

    /// Per-tick error derivative.
    pub derivative: f64,

    /// PD correction applied to the base speed.
    pub control: f64,

    /// Proportional gain in use this cycle.
    pub kp: f64,

    /// Derivative gain in use this cycle.
    pub kd: f64,

    /// Time-of-flight distance readings, absent if the sensor is not fitted.
    /// A `None` frame is flattened to no keys at all, not to nulls.
    #[serde(flatten)]
    pub distance: Option<DistanceFrame>,

    /// IMU readings, absent if the sensor is not fitted.
    #[serde(flatten)]
    pub imu: Option<ImuFrame>,
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::eqpt::LineSensorFrame;

    fn packet(distance: Option<DistanceFrame>, imu: Option<ImuFrame>) -> TmPacket {
        TmPacket {
            time_s: 1.25,
            timestamp: "2026-01-01 12:00:00".into(),
            line_sensors: LineSensorFrame::new(100, 300, 100).as_array(),
            left_speed: 25.0,
            right_speed: 25.0,
            error: 0.0,
            derivative: 0.0,
            control: 0.0,
            kp: 60.0,
            kd: 15.0,
            distance,
            imu,
        }
    }

    #[test]
    fn test_required_keys_present_without_optionals() {
        let value = serde_json::to_value(packet(None, None)).unwrap();
        let map = value.as_object().unwrap();

        for key in &[
            "time_s",
            "timestamp",
            "line_sensors",
            "left_speed",
            "right_speed",
            "error",
            "derivative",
            "control",
            "kp",
            "kd",
        ] {
            assert!(map.contains_key(*key), "missing required key {}", key);
        }

        // Optional frames must be absent entirely, not null
        assert!(!map.contains_key("ToF_T"));
        assert!(!map.contains_key("accel_x"));
    }

    #[test]
    fn test_distance_fields_flattened_with_wire_names() {
        let distance = DistanceFrame {
            top: 1,
            bottom: 2,
            left: 3,
            center_left: 4,
            center: 5,
            center_right: 6,
            right: 7,
        };
        let value = serde_json::to_value(packet(Some(distance), None)).unwrap();
        let map = value.as_object().unwrap();

        assert_eq!(map["ToF_T"], 1);
        assert_eq!(map["ToF_CL"], 4);
        assert_eq!(map["ToF_R"], 7);
    }

    #[test]
    fn test_roundtrip_with_imu() {
        let imu = ImuFrame {
            accel_x: 0.01,
            accel_y: -0.02,
            accel_z: 1.0,
            gyro_x: 0.0,
            gyro_y: 0.0,
            gyro_z: 5.0,
        };
        let json = serde_json::to_string(&packet(None, Some(imu))).unwrap();
        let parsed: TmPacket = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.imu, Some(imu));
        assert_eq!(parsed.line_sensors, [100, 300, 100]);
    }
}
