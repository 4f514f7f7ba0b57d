//! # Hardware Checkout Executable
//!
//! This executable brings up a board adapter and exercises every capability
//! group of the hardware contract once, on a host machine:
//! - IMU init and snapshot reads
//! - receiver channel reads
//! - serial loop-back echo
//! - motor throttle ramp through the motor abstraction
//! - status indicator toggles
//! - optional sensor probing (sonar, barometer)
//!
//! It runs against the simulated board; a concrete flight board would slot in
//! behind the same contract.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Parameters for the checkout executable.
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use log::{info, warn};

// Internal
use board_if::board::{Board, Capability, StatusIndicator};
use board_if::motor::{ChannelClaims, Motor};
use params::HwchkExecParams;
use sim_board::{PulseMotor, SimBoard, SimBoardParams};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    // ---- EARLY INITIALISATION ----

    color_eyre::install()?;

    // Initialise session
    let session = Session::new("hwchk_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Hardware Checkout Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    info!("Initialising...");

    // ---- LOAD PARAMETERS ----

    let exec_params: HwchkExecParams = util::params::load_or_default("hwchk_exec.toml")?;
    let board_params: SimBoardParams = util::params::load_or_default("sim_board.toml")?;

    info!("Parameters loaded");

    // ---- BOARD BRING-UP ----

    let num_motors = board_params.num_motors;
    let num_rc_channels = board_params.num_rc_channels;

    let mut board = SimBoard::new(board_params).wrap_err("Failed to construct the board")?;

    let timing = board.init();
    info!(
        "Board up: loop period {} us, gyro calibration window {} ms",
        timing.loop_period_us, timing.gyro_calib_ms
    );

    let scale = board.imu_init();
    info!(
        "IMU up: acc_1g = {} counts, gyro_scale = {:e}",
        scale.acc_1g, scale.gyro_scale
    );

    // Claim every motor channel and bring the motors up
    let mut claims = ChannelClaims::new(num_motors);
    let mut motors = Vec::with_capacity(num_motors);
    for index in 0..num_motors {
        let channel = claims
            .claim(index)
            .wrap_err("Failed to claim motor channel")?;
        let mut motor = PulseMotor::new(channel);
        motor.init().wrap_err("Failed to initialise motor")?;
        motors.push(motor);
    }

    info!("{} motors initialised", motors.len());

    // Probe the optional sensor fit
    for cap in Capability::ALL.iter().filter(|c| c.is_optional()) {
        info!(
            "Optional capability {:?}: {}",
            cap,
            if board.capability_fitted(*cap) {
                "fitted"
            } else {
                "not fitted"
            }
        );
    }
    let sonar_fitted = board.sonar_init(0);
    let baro_fitted = board.baro_init();

    // Seed the serial loop-back so the echo check has traffic to chew on
    board.push_serial_rx(b"hwchk serial loop-back\n");

    // ---- CHECKOUT LOOP ----

    info!(
        "Entering checkout loop: {} cycles, {} ramp steps",
        exec_params.num_cycles, exec_params.motor_ramp_steps
    );

    let start_us = board.get_micros();

    for cycle in 0..exec_params.num_cycles {
        // Sensor pull phase
        let imu = board.imu_read();
        log::trace!("cycle {}: imu {:?}", cycle, imu);

        for channel in 0..num_rc_channels {
            let pulse = board.read_rc_channel(channel);
            log::trace!("cycle {}: rc[{}] = {} us", cycle, channel, pulse);
        }

        if sonar_fitted {
            board.sonar_update(0);
            log::trace!("cycle {}: sonar {} ", cycle, board.sonar_distance(0));
        }
        if baro_fitted {
            board.baro_update();
            log::trace!("cycle {}: baro {}", cycle, board.baro_pressure());
        }

        // Serial echo: write back everything available this cycle
        while board.serial_available() > 0 {
            let byte = board.serial_read_byte();
            board.serial_write_byte(byte);
        }

        // Actuation push phase: ramp the motors and forward the commanded
        // pulses down the board's motor path
        let ramp_steps = exec_params.motor_ramp_steps.max(1);
        let throttle = (cycle % ramp_steps) as f64 / ramp_steps as f64;
        for motor in motors.iter_mut() {
            motor.write(throttle);
            board.write_motor(motor.channel().index(), motor.pulse_us());
        }

        // Status indication
        board.set_status(StatusIndicator::Armed(cycle % 2 == 0));
        board.set_status(StatusIndicator::Aux((cycle % 4) as u8));
    }

    let elapsed_us = board.get_micros() - start_us;

    // ---- SUMMARY ----

    info!("Checkout loop complete in {} us", elapsed_us);

    let echoed = board.drain_serial_tx();
    info!("Serial echo returned {} bytes", echoed.len());

    for motor in motors.iter() {
        info!(
            "Motor {}: last pulse {} us",
            motor.channel().index(),
            motor.pulse_us()
        );
    }

    if board.violation_count() > 0 {
        warn!(
            "{} contract violations flagged during checkout",
            board.violation_count()
        );
    } else {
        info!("No contract violations flagged");
    }

    info!("Checkout complete");

    Ok(())
}
