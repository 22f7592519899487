//! # Line-following control module
//!
//! Line control keeps the robot on a black line using the three downward
//! facing line sensors. A weighted centroid of the readings gives a signed
//! lateral error which a PD controller turns into a differential speed
//! correction for the two wheels.
//!
//! A continuous PD law cannot reliably execute a 90 degree corner: it either
//! undershoots and never leaves the turn, or oscillates across it. Discrete
//! sensor patterns therefore override the controller: a dominant side sensor
//! with a dark centre triggers an open-loop pivot whose exit condition is the
//! centre sensor re-acquiring the line, a saturated side sensor with the
//! centre still on the line halves the inner wheel's speed, and an all-dark
//! frame triggers a reverse-and-stop recovery manoeuvre.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod centroid;
mod mnvr;
mod params;
mod pd;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use centroid::centroid_error;
pub use mnvr::{detect, exec_pivot, exec_recovery, Mnvr, PivotReport};
pub use params::Params;
pub use pd::PdController;
pub use state::{InputData, LineCtrl, OutputData, StatusReport};

use crate::eqpt::EqptError;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during LineCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum LineCtrlError {
    #[error("Pivot manoeuvre did not re-acquire the line within {0} polls")]
    PivotTimeout(u32),

    #[error("Manoeuvre {0:?} is not a pivot")]
    InvalidMnvr(Mnvr),

    #[error("Equipment fault during manoeuvre: {0}")]
    Eqpt(#[from] EqptError),
}

/// Possible errors that can occur during LineCtrl initialisation.
#[derive(Debug, thiserror::Error)]
pub enum LineCtrlInitError {
    #[error("Could not load the parameters: {0}")]
    ParamLoadError(#[from] util::params::LoadError),

    #[error("Could not create the archive: {0}")]
    ArchInitError(String),
}
