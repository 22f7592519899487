//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software: the typed
//! telemetry and parameter-update messages exchanged between the robot and
//! the ground, the equipment data types they carry, and the monitored socket
//! abstraction both sides are built on.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Equipment data types (sensor frames and wheel commands)
pub mod eqpt;

/// Network module
pub mod net;

/// Parameter-update messages recieved from the ground
pub mod param;

/// Telemetry messages published by the robot
pub mod tm;
