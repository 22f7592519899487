//! Integration tests driving the line controller against the simulated
//! equipment.

use alvik_lib::{
    eqpt::{sim::SimAlvik, sim::SimCmd, Alvik},
    line_ctrl::{self, InputData, LineCtrl, LineCtrlError, Mnvr, Params},
};
use comms_if::eqpt::LineSensorFrame;
use util::module::State;

/// Manoeuvre parameters shortened so the blocking sub-loops don't slow the
/// test run down.
fn fast_params() -> Params {
    Params {
        pivot_poll_ms: 1,
        pivot_max_polls: 5,
        recovery_pulse_ms: 1,
        recovery_stop_ms: 1,
        ..Params::default()
    }
}

#[test]
fn pivot_exits_when_centre_reacquires_the_line() {
    let params = fast_params();
    let mut sim = SimAlvik::scripted(vec![
        // Centre stays dark for two polls, then picks the line up
        LineSensorFrame::new(0, 100, 0),
        LineSensorFrame::new(0, 120, 0),
        LineSensorFrame::new(0, 300, 0),
    ]);

    let report = line_ctrl::exec_pivot(&mut sim, Mnvr::PivotLeft, &params).unwrap();

    assert_eq!(report.polls, 3);
    assert_eq!(
        sim.cmd_log.first(),
        Some(&SimCmd::Wheels(-params.turn_speed, params.turn_speed))
    );
    // The pivot leaves the wheels turning, the next cycle commands them
    assert!(!sim.cmd_log.contains(&SimCmd::Brake));
}

#[test]
fn stuck_centre_sensor_surfaces_a_timeout_fault() {
    let params = fast_params();
    // No scripted frames: the sim holds an all-dark frame forever
    let mut sim = SimAlvik::scripted(Vec::new());

    let result = line_ctrl::exec_pivot(&mut sim, Mnvr::PivotRight, &params);

    match result {
        Err(LineCtrlError::PivotTimeout(polls)) => assert_eq!(polls, params.pivot_max_polls),
        other => panic!("expected PivotTimeout, got {:?}", other),
    }

    // The failed pivot must not leave the wheels spinning
    assert_eq!(sim.cmd_log.last(), Some(&SimCmd::Brake));
}

#[test]
fn recovery_is_a_reverse_pulse_then_a_full_stop() {
    let params = fast_params();
    let mut sim = SimAlvik::scripted(Vec::new());

    line_ctrl::exec_recovery(&mut sim, &params).unwrap();

    assert_eq!(
        sim.cmd_log,
        vec![
            SimCmd::Wheels(-params.recovery_speed, -params.recovery_speed),
            SimCmd::Wheels(0.0, 0.0),
        ]
    );
}

#[test]
fn lost_line_recovers_then_resumes_following() {
    let params = fast_params();
    let mut ctrl = LineCtrl::with_params(params.clone());
    let mut sim = SimAlvik::scripted(vec![
        LineSensorFrame::new(50, 50, 50),
        LineSensorFrame::new(100, 600, 100),
    ]);

    // First cycle: line fully lost, the recovery manoeuvre runs
    let frame = sim.read_line_sensors().unwrap();
    let (output, report) = ctrl.proc(&InputData { frame }).unwrap();
    assert_eq!(output.mnvr, Mnvr::Recover);
    assert!(report.line_lost);
    line_ctrl::exec_recovery(&mut sim, &params).unwrap();

    // Second cycle: sensing has resumed and the line is back
    let frame = sim.read_line_sensors().unwrap();
    let (output, report) = ctrl.proc(&InputData { frame }).unwrap();
    assert_eq!(output.mnvr, Mnvr::Follow);
    assert!(!report.line_lost);
}

#[test]
fn closed_loop_holds_the_line_on_a_drifting_track() {
    let mut ctrl = LineCtrl::default();
    let mut sim = SimAlvik::on_track();

    let mut last_output = None;

    for _ in 0..200 {
        let frame = sim.read_line_sensors().unwrap();
        let (output, _) = ctrl.proc(&InputData { frame }).unwrap();

        // The gentle curve must never force the controller into a discrete
        // manoeuvre
        assert_eq!(output.mnvr, Mnvr::Follow, "override fired at {:?}", frame);

        sim.set_wheel_speeds(output.cmd.left_speed, output.cmd.right_speed)
            .unwrap();
        last_output = Some(output);
    }

    // After settling, the error stays small and the line stays under the
    // centre sensor
    let output = last_output.unwrap();
    assert!(
        output.error.abs() < 0.2,
        "error did not settle: {}",
        output.error
    );
}
