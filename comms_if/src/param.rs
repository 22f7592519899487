//! # Parameter-update messages
//!
//! The ground can retune the controller while the robot is driving by
//! publishing a JSON object on the parameter channel. Any subset of the gain
//! keys may be present; unknown keys are ignored so newer ground tools can
//! talk to older robots.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A live update of the controller gains.
///
/// `ki` is carried for wire compatibility with ground tools that tune a full
/// PID, the robot's PD law does not use it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kp: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ki: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kd: Option<f64>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum ParamParseError {
    #[error("Parameter update contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ParamUpdate {
    /// Parse an update from a JSON packet.
    pub fn from_json(json_str: &str) -> Result<Self, ParamParseError> {
        serde_json::from_str(json_str).map_err(ParamParseError::InvalidJson)
    }

    /// True if the update carries no gains at all.
    pub fn is_empty(&self) -> bool {
        self.kp.is_none() && self.ki.is_none() && self.kd.is_none()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_subset_of_keys() {
        let update = ParamUpdate::from_json(r#"{"kp": 80.0}"#).unwrap();

        assert_eq!(update.kp, Some(80.0));
        assert_eq!(update.ki, None);
        assert_eq!(update.kd, None);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let update = ParamUpdate::from_json(r#"{"kd": 10.0, "windup_limit": 3.0}"#).unwrap();

        assert_eq!(update.kd, Some(10.0));
        assert!(update.kp.is_none());
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(ParamUpdate::from_json("{kp: 80").is_err());
        assert!(ParamUpdate::from_json("80.0").is_err());
    }

    #[test]
    fn test_empty_object_is_empty_update() {
        let update = ParamUpdate::from_json("{}").unwrap();
        assert!(update.is_empty());
    }
}
