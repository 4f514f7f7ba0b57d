//! # Simulated board adapter
//!
//! Implements the full [`Board`] contract with in-memory peripherals:
//! scripted IMU and receiver values, a loop-back serial transport, a motor
//! bank with pulse read-back, status LED state and a monotonic clock derived
//! from [`std::time::Instant`].
//!
//! On top of the contract the adapter exposes a scripting/read-back surface
//! for tests and the checkout executable, plus a contract-violation counter
//! which flags out-of-order calls (`imu_read` before `imu_init`, serial read
//! with nothing available) instead of faulting.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use std::collections::VecDeque;
use std::time::Instant;
use thiserror::Error;

// Internal
use crate::params::{ParamsError, SimBoardParams};
use board_if::board::{
    Board, BoardTiming, Capability, ImuReading, ImuScale, StatusIndicator, BARO_NONE,
    RC_NEUTRAL_US, RC_PULSE_MAX_US, RC_PULSE_MIN_US, SONAR_NONE,
};
use board_if::motor::{MOTOR_PULSE_MAX_US, MOTOR_PULSE_MIN_US};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Target sensor loop period reported by `init`, in microseconds.
pub const LOOP_PERIOD_US: u32 = 3500;

/// Gyro bias calibration duration reported by `init`, in milliseconds.
pub const GYRO_CALIB_MS: u32 = 3500;

/// Accelerometer counts per g (8 g full scale on the reference sensor).
pub const ACC_1G: u16 = 4096;

/// Gyro sensitivity reported by `imu_init`, radians/second per LSB.
pub const GYRO_SCALE: f32 = 4256e-12;

/// Fixed divisor applied to raw gyro counts on every read, matching the
/// declared [`GYRO_SCALE`] sensitivity.
pub const GYRO_RAW_DIVISOR: i16 = 4;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The simulated board. See the [module documentation](self) for an overview.
pub struct SimBoard {
    params: SimBoardParams,

    /// Reference point of the monotonic microsecond clock.
    epoch: Instant,

    initialised: bool,
    imu_initialised: bool,

    accel_raw: [i16; 3],
    gyro_raw: [i16; 3],

    /// Decoded receiver pulses, indexed by 1-based wire channel number.
    /// Element 0 is unused; the 0-based contract index is offset by one on
    /// read, matching the wire numbering of the original PPM decoder.
    rc_pulses: Vec<u16>,

    serial_rx: VecDeque<u8>,
    serial_tx: VecDeque<u8>,

    motor_pulses: Vec<u16>,

    armed_led: bool,
    aux_status: u8,

    reboot_requested: bool,

    sonar_pending: Vec<u16>,
    sonar_latest: Vec<u16>,
    baro_pending: i32,
    baro_latest: i32,

    violations: u32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur constructing a [`SimBoard`].
#[derive(Debug, Error)]
pub enum SimBoardError {
    #[error("Loaded parameters are invalid: {0}")]
    ParamsInvalid(#[from] ParamsError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimBoard {
    /// Create a new simulated board from the given parameters.
    pub fn new(params: SimBoardParams) -> Result<Self, SimBoardError> {
        params.are_valid()?;

        Ok(SimBoard {
            epoch: Instant::now(),
            initialised: false,
            imu_initialised: false,
            accel_raw: [0; 3],
            gyro_raw: [0; 3],
            rc_pulses: vec![RC_NEUTRAL_US; params.num_rc_channels + 1],
            serial_rx: VecDeque::new(),
            serial_tx: VecDeque::new(),
            motor_pulses: vec![MOTOR_PULSE_MIN_US; params.num_motors],
            armed_led: false,
            aux_status: 0,
            reboot_requested: false,
            sonar_pending: vec![SONAR_NONE; params.num_sonars],
            sonar_latest: vec![SONAR_NONE; params.num_sonars],
            baro_pending: BARO_NONE,
            baro_latest: BARO_NONE,
            violations: 0,
            params,
        })
    }

    // ---- SCRIPTING SURFACE ----

    /// Script the next raw IMU sample returned by `imu_read`.
    pub fn set_imu_sample(&mut self, accel: [i16; 3], gyro: [i16; 3]) {
        self.accel_raw = accel;
        self.gyro_raw = gyro;
    }

    /// Script a decoded receiver pulse on a 1-based wire channel.
    ///
    /// Pulses outside the valid receiver range are discarded, as a real
    /// decoder would reject a malformed frame.
    pub fn set_rc_pulse(&mut self, wire_channel: usize, pulse_us: u16) {
        if !(RC_PULSE_MIN_US..=RC_PULSE_MAX_US).contains(&pulse_us) {
            return;
        }

        if wire_channel >= 1 && wire_channel < self.rc_pulses.len() {
            self.rc_pulses[wire_channel] = pulse_us;
        }
    }

    /// Queue bytes on the serial receive side.
    pub fn push_serial_rx(&mut self, bytes: &[u8]) {
        self.serial_rx.extend(bytes);
    }

    /// Script the next distance latched by `sonar_update` on a sonar unit.
    pub fn set_sonar_distance(&mut self, index: usize, distance: u16) {
        if let Some(d) = self.sonar_pending.get_mut(index) {
            *d = distance;
        }
    }

    /// Script the next pressure latched by `baro_update`.
    pub fn set_baro_pressure(&mut self, pressure: i32) {
        self.baro_pending = pressure;
    }

    // ---- READ-BACK SURFACE ----

    /// The last pulse commanded on a motor channel, if it exists.
    pub fn motor_pulse(&self, index: usize) -> Option<u16> {
        self.motor_pulses.get(index).copied()
    }

    /// Drain everything written to the serial transmit side.
    pub fn drain_serial_tx(&mut self) -> Vec<u8> {
        self.serial_tx.drain(..).collect()
    }

    /// Current armed LED state.
    pub fn armed_led(&self) -> bool {
        self.armed_led
    }

    /// Current auxiliary mode indicator.
    pub fn aux_status(&self) -> u8 {
        self.aux_status
    }

    /// Whether `reboot` has been requested.
    pub fn reboot_requested(&self) -> bool {
        self.reboot_requested
    }

    /// Number of contract violations flagged so far.
    pub fn violation_count(&self) -> u32 {
        self.violations
    }

    /// Whether a capability is fitted on this board.
    ///
    /// Required capabilities are always fitted; optional ones depend on the
    /// board parameters.
    pub fn capability_fitted(&self, cap: Capability) -> bool {
        match cap {
            Capability::Sonar => self.params.num_sonars > 0,
            Capability::Barometer => self.params.baro_fitted,
            _ => true,
        }
    }

    fn flag_violation(&mut self, what: &str) {
        self.violations += 1;
        warn!("Contract violation: {}", what);
    }
}

impl Board for SimBoard {
    fn init(&mut self) -> BoardTiming {
        if self.initialised {
            // No re-init contract is defined, so a second call is safe but
            // does no further bring-up.
            warn!("Board already initialised");
        } else {
            info!(
                "Simulated board up: {} motors, {} receiver channels",
                self.params.num_motors, self.params.num_rc_channels
            );
            self.initialised = true;
        }

        BoardTiming {
            loop_period_us: LOOP_PERIOD_US,
            gyro_calib_ms: GYRO_CALIB_MS,
        }
    }

    fn imu_init(&mut self) -> ImuScale {
        self.imu_initialised = true;

        ImuScale {
            acc_1g: ACC_1G,
            gyro_scale: GYRO_SCALE,
        }
    }

    fn imu_read(&mut self) -> ImuReading {
        if !self.imu_initialised {
            self.flag_violation("imu_read before imu_init");
            return ImuReading::default();
        }

        ImuReading {
            accel: self.accel_raw,
            gyro: [
                self.gyro_raw[0] / GYRO_RAW_DIVISOR,
                self.gyro_raw[1] / GYRO_RAW_DIVISOR,
                self.gyro_raw[2] / GYRO_RAW_DIVISOR,
            ],
        }
    }

    fn write_motor(&mut self, index: usize, pulse_us: u16) {
        match self.motor_pulses.get_mut(index) {
            Some(p) => {
                *p = pulse_us.max(MOTOR_PULSE_MIN_US).min(MOTOR_PULSE_MAX_US);
            }
            // Out-of-range index is ignored, never a fault
            None => trace!("write_motor to nonexistent channel {}", index),
        }
    }

    fn read_rc_channel(&mut self, channel: usize) -> u16 {
        // 0-based contract index to 1-based wire channel
        match self.rc_pulses.get(channel + 1) {
            Some(pulse) => *pulse,
            None => RC_NEUTRAL_US,
        }
    }

    fn serial_available(&mut self) -> usize {
        self.serial_rx.len()
    }

    fn serial_read_byte(&mut self) -> u8 {
        match self.serial_rx.pop_front() {
            Some(byte) => byte,
            None => {
                self.flag_violation("serial_read_byte with nothing available");
                0
            }
        }
    }

    fn serial_write_byte(&mut self, byte: u8) {
        self.serial_tx.push_back(byte);
    }

    fn set_status(&mut self, status: StatusIndicator) {
        match status {
            StatusIndicator::Armed(armed) => self.armed_led = armed,
            StatusIndicator::Aux(aux) => self.aux_status = aux,
        }
    }

    fn get_micros(&mut self) -> u64 {
        self.epoch.elapsed().as_micros() as u64
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(ms as u64));
    }

    fn reboot(&mut self) {
        // The simulation has nothing to reset; record the request so callers
        // can observe that return does not imply a reset occurred.
        info!("Reboot requested");
        self.reboot_requested = true;
    }

    fn sonar_init(&mut self, index: usize) -> bool {
        index < self.params.num_sonars
    }

    fn sonar_update(&mut self, index: usize) {
        if let Some(pending) = self.sonar_pending.get(index) {
            self.sonar_latest[index] = *pending;
        }
    }

    fn sonar_distance(&mut self, index: usize) -> u16 {
        match self.sonar_latest.get(index) {
            Some(d) => *d,
            None => SONAR_NONE,
        }
    }

    fn baro_init(&mut self) -> bool {
        self.params.baro_fitted
    }

    fn baro_update(&mut self) {
        if self.params.baro_fitted {
            self.baro_latest = self.baro_pending;
        }
    }

    fn baro_pressure(&mut self) -> i32 {
        if self.params.baro_fitted {
            self.baro_latest
        } else {
            BARO_NONE
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn board() -> SimBoard {
        SimBoard::new(SimBoardParams::default()).unwrap()
    }

    #[test]
    fn test_init_reports_reference_timing() {
        let mut board = board();

        let timing = board.init();
        assert_eq!(timing.loop_period_us, 3500);
        assert_eq!(timing.gyro_calib_ms, 3500);

        // A second init is safe and reports the same constants
        assert_eq!(board.init(), timing);
    }

    #[test]
    fn test_imu_scale_round_trip() {
        let mut board = board();
        board.init();

        let scale = board.imu_init();
        assert_eq!(scale.acc_1g, 4096);
        assert_eq!(scale.gyro_scale, 4256e-12);

        // Raw gyro counts are divided by the documented fixed divisor
        board.set_imu_sample([0, 0, 4096], [0, 0, 800]);
        let reading = board.imu_read();
        assert_eq!(reading.accel, [0, 0, 4096]);
        assert_eq!(reading.gyro, [0, 0, 200]);
    }

    #[test]
    fn test_imu_read_before_init_flagged() {
        let mut board = board();
        board.init();
        board.set_imu_sample([1, 2, 3], [4, 5, 6]);

        assert_eq!(board.imu_read(), ImuReading::default());
        assert_eq!(board.violation_count(), 1);

        // Once initialised the scripted sample comes through
        board.imu_init();
        assert_eq!(board.imu_read().accel, [1, 2, 3]);
        assert_eq!(board.violation_count(), 1);
    }

    #[test]
    fn test_rc_neutral_before_any_pulse() {
        let mut board = board();
        board.init();

        for channel in 0..8 {
            assert_eq!(board.read_rc_channel(channel), RC_NEUTRAL_US);
        }
    }

    #[test]
    fn test_rc_wire_channel_offset() {
        let mut board = board();
        board.init();

        // Contract channel 2 reads wire channel 3
        board.set_rc_pulse(3, 1750);
        assert_eq!(board.read_rc_channel(2), 1750);
        assert_eq!(board.read_rc_channel(3), RC_NEUTRAL_US);

        // Malformed pulses are discarded, last known value stands
        board.set_rc_pulse(3, 2500);
        assert_eq!(board.read_rc_channel(2), 1750);

        // Out-of-range contract channel returns neutral
        assert_eq!(board.read_rc_channel(100), RC_NEUTRAL_US);
    }

    #[test]
    fn test_motor_write_read_back() {
        let mut board = board();
        board.init();

        board.write_motor(0, 1420);
        assert_eq!(board.motor_pulse(0), Some(1420));

        // Values are clamped into the motor pulse range
        board.write_motor(1, 500);
        board.write_motor(2, 2500);
        assert_eq!(board.motor_pulse(1), Some(1000));
        assert_eq!(board.motor_pulse(2), Some(2000));

        // Out-of-range index ignored silently
        board.write_motor(100, 1500);
        assert_eq!(board.violation_count(), 0);
    }

    #[test]
    fn test_serial_fifo_order() {
        let mut board = board();
        board.init();

        board.push_serial_rx(b"abc");
        assert_eq!(board.serial_available(), 3);
        assert_eq!(board.serial_read_byte(), b'a');
        assert_eq!(board.serial_read_byte(), b'b');
        assert_eq!(board.serial_read_byte(), b'c');
        assert_eq!(board.serial_available(), 0);

        board.serial_write_byte(b'x');
        board.serial_write_byte(b'y');
        assert_eq!(board.drain_serial_tx(), b"xy");
    }

    #[test]
    fn test_serial_read_empty_flagged() {
        let mut board = board();
        board.init();

        assert_eq!(board.serial_read_byte(), 0);
        assert_eq!(board.violation_count(), 1);
    }

    #[test]
    fn test_status_indicators_isolated() {
        let mut board = board();
        board.init();
        board.imu_init();
        board.set_imu_sample([1, 2, 3], [40, 80, 120]);
        board.write_motor(0, 1600);
        board.push_serial_rx(b"z");

        let imu_before = board.imu_read();

        board.set_status(StatusIndicator::Armed(true));
        board.set_status(StatusIndicator::Aux(2));

        // Indicator state updated...
        assert!(board.armed_led());
        assert_eq!(board.aux_status(), 2);

        // ...but sensor and actuator state untouched
        assert_eq!(board.imu_read(), imu_before);
        assert_eq!(board.motor_pulse(0), Some(1600));
        assert_eq!(board.serial_available(), 1);
    }

    #[test]
    fn test_sonar_absent_by_default() {
        let mut board = board();
        board.init();

        assert!(!board.sonar_init(0));
        assert!(!board.capability_fitted(Capability::Sonar));

        for _ in 0..5 {
            board.sonar_update(0);
            assert_eq!(board.sonar_distance(0), SONAR_NONE);
        }
    }

    #[test]
    fn test_sonar_fitted_latches_on_update() {
        let mut board = SimBoard::new(SimBoardParams {
            num_sonars: 1,
            ..Default::default()
        })
        .unwrap();
        board.init();

        assert!(board.sonar_init(0));
        assert!(!board.sonar_init(1));
        assert!(board.capability_fitted(Capability::Sonar));

        // Scripted value only visible after an update cycle
        board.set_sonar_distance(0, 123);
        assert_eq!(board.sonar_distance(0), SONAR_NONE);
        board.sonar_update(0);
        assert_eq!(board.sonar_distance(0), 123);
    }

    #[test]
    fn test_baro_tri_state() {
        let mut absent = board();
        absent.init();
        assert!(!absent.baro_init());
        absent.set_baro_pressure(101_325);
        absent.baro_update();
        assert_eq!(absent.baro_pressure(), BARO_NONE);

        let mut fitted = SimBoard::new(SimBoardParams {
            baro_fitted: true,
            ..Default::default()
        })
        .unwrap();
        fitted.init();
        assert!(fitted.baro_init());
        fitted.set_baro_pressure(101_325);
        fitted.baro_update();
        assert_eq!(fitted.baro_pressure(), 101_325);
    }

    #[test]
    fn test_micros_monotonic() {
        let mut board = board();
        board.init();

        let t0 = board.get_micros();
        let t1 = board.get_micros();
        assert!(t1 >= t0);
    }

    #[test]
    fn test_reboot_is_observable_no_op() {
        let mut board = board();
        board.init();

        assert!(!board.reboot_requested());
        board.reboot();
        assert!(board.reboot_requested());

        // The board is still usable, return does not imply reset
        board.write_motor(0, 1500);
        assert_eq!(board.motor_pulse(0), Some(1500));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let result = SimBoard::new(SimBoardParams {
            num_motors: 0,
            ..Default::default()
        });
        assert!(result.is_err());
    }
}
