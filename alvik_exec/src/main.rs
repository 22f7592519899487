//! Main robot-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logging, parameters and modules
//!     - Wait for the start button
//!     - Main loop:
//!         - Button gating (pause / abort)
//!         - Parameter update processing
//!         - System input acquisition:
//!             - Line sensing
//!             - Distance and IMU sensing
//!         - Line control processing
//!         - Manoeuvre execution (wheel command, pivot or recovery)
//!         - Telemetry publication (rate limited)
//!         - Cycle management
//!
//! Whatever the exit path - operator abort, equipment fault, pivot timeout -
//! the motors are braked before the process terminates.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use alvik_lib::{
    data_store::{DataStore, RunMode},
    eqpt::{sim::SimAlvik, Alvik, EqptError, LedColour},
    line_ctrl::{self, Mnvr},
    param_client::{ParamClient, ParamClientError},
    tm_server::{self, TmServer},
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::net::NetParams;
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one control cycle.
const CYCLE_PERIOD_S: f64 = 0.10;

/// Telemetry is published every this many cycles, which gives the 0.5 s
/// minimum inter-publish interval at the 0.1 s cycle period.
const TM_CYCLE_DIVISOR: u128 = 5;

/// Poll period while waiting for the start button.
const BUTTON_POLL_MS: u64 = 50;

/// Poll period while paused.
const PAUSE_POLL_MS: u64 = 100;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("alvik_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Alvik Line Follower Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    // ---- INITIALISE MODULES ----

    ds.line_ctrl
        .init("line_ctrl.toml", &session)
        .wrap_err("Failed to initialise LineCtrl")?;
    info!("LineCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE NETWORK ----

    info!("Initialising network");

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let mut tm_server = {
        let s = TmServer::new(&zmq_ctx, &net_params).wrap_err("Failed to initialise TmServer")?;
        info!("TmServer initialised");
        s
    };

    let param_client = {
        let c =
            ParamClient::new(&zmq_ctx, &net_params).wrap_err("Failed to initialise ParamClient")?;
        info!("ParamClient initialised");
        c
    };

    info!("Network initialisation complete");

    // ---- INITIALISE EQUIPMENT ----

    // No hardware in the loop, drive the simulated equipment.
    let mut eqpt = SimAlvik::on_track();
    info!("Simulated equipment initialised");

    // ---- MAIN LOOP ----

    let result = run(&mut ds, &mut eqpt, &mut tm_server, &param_client);

    // ---- SHUTDOWN ----

    // The motors must never be left running, whatever the exit path was.
    if let Err(e) = eqpt.brake() {
        warn!("Could not brake the wheels on exit: {}", e);
    }

    if result.is_ok() {
        info!("End of execution");
    }

    result
}

/// The driver's cyclic loop, entered once the start button is pressed.
///
/// Returns `Ok(())` on operator abort (both touch buttons held); any
/// equipment fault or pivot timeout propagates out as an error. The caller
/// brakes the wheels in both cases.
fn run<E: Alvik>(
    ds: &mut DataStore,
    eqpt: &mut E,
    tm_server: &mut TmServer,
    param_client: &ParamClient,
) -> Result<(), Report> {
    wait_for_start(eqpt)?;
    ds.set_mode(RunMode::Running);

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        ds.elapsed_s = session::get_elapsed_seconds();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(TM_CYCLE_DIVISOR);

        // ---- BUTTON GATING ----

        let ok_pressed = eqpt.touch_ok()?;
        let cancel_pressed = eqpt.touch_cancel()?;

        if ok_pressed && cancel_pressed {
            info!("Operator abort requested, stopping");
            eqpt.brake()?;
            return Ok(());
        }

        if cancel_pressed {
            ds.set_mode(RunMode::Paused);
            pause_until_restart(eqpt)?;
            ds.set_mode(RunMode::Running);
            continue;
        }

        // ---- PARAMETER PROCESSING ----

        // Updates are applied before control processing, so the PD law never
        // reads a half-replaced gain pair.
        loop {
            match param_client.poll() {
                Ok(Some(update)) => ds.line_ctrl.apply_param_update(&update),
                Ok(None) => break,
                // A malformed update is discarded and the loop carries on
                Err(e @ ParamClientError::ParseError(_)) => {
                    warn!("Discarding parameter update: {}", e)
                }
                Err(e) => {
                    warn!("ParamClient error: {}", e);
                    break;
                }
            }
        }

        // ---- DATA INPUT ----

        ds.line_ctrl_input.frame = eqpt.read_line_sensors()?;
        ds.distance = eqpt.read_distance()?;
        ds.imu = eqpt.read_imu()?;

        // ---- CONTROL ALGORITHM PROCESSING ----

        match ds.line_ctrl.proc(&ds.line_ctrl_input) {
            Ok((o, r)) => {
                ds.line_ctrl_output = o;
                ds.line_ctrl_status_rpt = r;
            }
            Err(e) => warn!("Error during LineCtrl processing: {}", e),
        };

        // ---- MANOEUVRE EXECUTION ----

        match ds.line_ctrl_output.mnvr {
            Mnvr::Follow | Mnvr::SlowLeft | Mnvr::SlowRight => {
                let cmd = ds.line_ctrl_output.cmd;
                eqpt.set_wheel_speeds(cmd.left_speed, cmd.right_speed)?;

                // Red-left indicates an active correction, green means
                // centred
                let threshold = ds.line_ctrl.params().correction_led_threshold;
                if ds.line_ctrl_output.control.abs() > threshold {
                    eqpt.set_leds(LedColour::Red, LedColour::Off)?;
                } else {
                    eqpt.set_leds(LedColour::Green, LedColour::Green)?;
                }
            }
            Mnvr::PivotLeft | Mnvr::PivotRight => {
                // Blocking until the centre sensor re-acquires the line
                let report =
                    line_ctrl::exec_pivot(eqpt, ds.line_ctrl_output.mnvr, ds.line_ctrl.params())?;
                debug!("Line re-acquired after {} pivot polls", report.polls);
            }
            Mnvr::Recover => {
                line_ctrl::exec_recovery(eqpt, ds.line_ctrl.params())?;
            }
        }

        // ---- TELEMETRY ----

        if ds.is_tm_cycle {
            let packet = tm_server::packet_from_datastore(ds);
            match tm_server.send(&packet) {
                Ok(_) => (),
                Err(e) => warn!("TmServer error: {}", e),
            };

            if let Err(e) = ds.line_ctrl.write() {
                warn!("Could not archive LineCtrl output: {}", e);
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }
}

/// Block until the start button is pressed.
///
/// Debounced by fixed-interval polling: a button still held from a previous
/// press must be released before a new press arms the loop.
fn wait_for_start<E: Alvik>(eqpt: &mut E) -> Result<(), EqptError> {
    info!("Waiting for the start button...");
    eqpt.set_leds(LedColour::Blue, LedColour::Blue)?;

    while eqpt.touch_ok()? {
        thread::sleep(Duration::from_millis(BUTTON_POLL_MS));
    }
    while !eqpt.touch_ok()? {
        thread::sleep(Duration::from_millis(BUTTON_POLL_MS));
    }

    info!("Start button pressed");
    Ok(())
}

/// Brake and hold until the start button is pressed again.
fn pause_until_restart<E: Alvik>(eqpt: &mut E) -> Result<(), EqptError> {
    loop {
        eqpt.set_leds(LedColour::Blue, LedColour::Blue)?;
        eqpt.brake()?;

        if eqpt.touch_ok()? {
            break;
        }

        thread::sleep(Duration::from_millis(PAUSE_POLL_MS));
    }

    Ok(())
}
