//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;

use crate::line_ctrl;
use comms_if::eqpt::{DistanceFrame, ImuFrame};

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// The driver's run mode.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum RunMode {
    /// Waiting for the start button, motors stopped.
    WaitStart,

    /// Cyclic line-following is active.
    Running,

    /// The stop button was pressed, motors braked until the start button is
    /// pressed again.
    Paused,
}

impl Default for RunMode {
    fn default() -> Self {
        RunMode::WaitStart
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if telemetry shall be published on this cycle
    pub is_tm_cycle: bool,

    /// Session elapsed time at the start of the cycle
    pub elapsed_s: f64,

    /// Current run mode
    pub mode: RunMode,

    // LineCtrl
    pub line_ctrl: line_ctrl::LineCtrl,
    pub line_ctrl_input: line_ctrl::InputData,
    pub line_ctrl_output: line_ctrl::OutputData,
    pub line_ctrl_status_rpt: line_ctrl::StatusReport,

    // Optional sensor frames
    pub distance: Option<DistanceFrame>,
    pub imu: Option<ImuFrame>,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Change the run mode, logging the transition.
    pub fn set_mode(&mut self, mode: RunMode) {
        if self.mode != mode {
            info!("Run mode: {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle, and
    /// sets the telemetry cycle flag. Telemetry is published every
    /// `tm_cycle_divisor` cycles.
    pub fn cycle_start(&mut self, tm_cycle_divisor: u128) {
        self.is_tm_cycle = self.num_cycles % tm_cycle_divisor == 0;

        self.line_ctrl_input = line_ctrl::InputData::default();
        self.line_ctrl_output = line_ctrl::OutputData::default();
        self.line_ctrl_status_rpt = line_ctrl::StatusReport::default();
        self.distance = None;
        self.imu = None;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_tm_cycle_gating() {
        let mut ds = DataStore::default();

        let mut tm_cycles = 0;
        for cycle in 0..10u128 {
            ds.num_cycles = cycle;
            ds.cycle_start(5);
            if ds.is_tm_cycle {
                tm_cycles += 1;
            }
        }

        // Cycles 0 and 5 of the ten
        assert_eq!(tm_cycles, 2);
    }
}
