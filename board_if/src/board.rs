//! # Board capability contract
//!
//! A board adapter normalises a set of heterogeneous, partially-present
//! peripherals into one fixed interface. Required capabilities (IMU, motors,
//! receiver, serial, status indication, timing) must be implemented by every
//! adapter. Optional capabilities (sonar, barometer) default to a degenerate
//! "fitted but measuring nothing" implementation, so the control core can
//! poll them uniformly: capability absence is data, not an error.
//!
//! All per-tick operations are sentinel-based and infallible. This boundary
//! runs inside a hard real-time loop where raising and unwinding is
//! unacceptable, so degenerate conditions are expressed as agreed return
//! values rather than error paths. Staleness detection (a frozen sensor) is
//! the control core's job, via timestamps from [`Board::get_micros`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Minimum valid receiver pulse width in microseconds.
pub const RC_PULSE_MIN_US: u16 = 900;

/// Maximum valid receiver pulse width in microseconds.
pub const RC_PULSE_MAX_US: u16 = 2100;

/// Neutral receiver pulse width in microseconds. This is the defined value of
/// a receiver channel before any pulse has been decoded.
pub const RC_NEUTRAL_US: u16 = 1500;

/// Sentinel distance returned by [`Board::sonar_distance`] when no sonar is
/// fitted.
pub const SONAR_NONE: u16 = 0;

/// Sentinel pressure returned by [`Board::baro_pressure`] when no barometer
/// is fitted.
pub const BARO_NONE: i32 = 0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Timing constants reported by [`Board::init`], which the control core's
/// loop scheduler and startup calibration routine must honour.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardTiming {
    /// Target period of the sensor loop in microseconds.
    pub loop_period_us: u32,

    /// Duration the gyro bias calibration should run for at startup, in
    /// milliseconds.
    pub gyro_calib_ms: u32,
}

/// Scale constants reported by [`Board::imu_init`].
///
/// Fixed for the lifetime of one adapter instance. They must be read once at
/// init before any [`Board::imu_read`] call is meaningful.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ImuScale {
    /// The accelerometer count representing 1 g.
    pub acc_1g: u16,

    /// Gyro sensitivity, radians/second per LSB of a gyro sample.
    pub gyro_scale: f32,
}

/// One snapshot read of the inertial sensor, in raw counts.
///
/// Interpretation of the counts is fixed by the [`ImuScale`] constants plus
/// any fixed integer divisor the adapter documents on the gyro axes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImuReading {
    /// 3-axis acceleration samples.
    pub accel: [i16; 3],

    /// 3-axis angular rate samples.
    pub gyro: [i16; 3],
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A visible status indicator demand.
///
/// Setting an indicator is a pure side effect: it never fails, never blocks,
/// and never alters sensor or actuator state.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusIndicator {
    /// Whether the vehicle is armed.
    Armed(bool),

    /// The current auxiliary mode.
    Aux(u8),
}

/// The fixed set of capabilities a board adapter may provide.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Imu,
    Motors,
    ReceiverInput,
    Serial,
    StatusLed,
    Timing,
    Sonar,
    Barometer,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The contract every concrete board adapter implements.
///
/// One instance is exclusively owned by the control core for the process
/// lifetime. All operations other than [`Board::delay_ms`] must complete in
/// bounded, short time so the loop period reported by [`Board::init`] is met
/// deterministically.
pub trait Board {
    /// One-time bring-up of all required peripherals.
    ///
    /// Must be called exactly once per process lifetime, before any other
    /// operation. Returns the timing constants the control core must honour.
    fn init(&mut self) -> BoardTiming;

    /// Configure the inertial sensor's measurement ranges and sample rates.
    ///
    /// Must be called before the first [`Board::imu_read`]. Returns the scale
    /// constants which are fixed for the lifetime of the adapter.
    fn imu_init(&mut self) -> ImuScale;

    /// Non-blocking snapshot read of the inertial sensor.
    ///
    /// Returns the most recent samples available from the sensor, never
    /// waiting for a new one. No filtering or unit conversion is performed
    /// beyond the fixed integer divisor the adapter documents.
    fn imu_read(&mut self) -> ImuReading;

    /// Command actuator `index` to output the given pulse width.
    ///
    /// An out-of-range index is ignored silently. This runs in the
    /// hard-real-time loop, so it must never panic.
    fn write_motor(&mut self, index: usize, pulse_us: u16);

    /// Latest decoded pulse value for a receiver channel.
    ///
    /// Channel indices are 0-based at this boundary. If no new pulse has
    /// arrived the last known value is returned; before any pulse has been
    /// decoded the value is [`RC_NEUTRAL_US`]. Never blocks.
    fn read_rc_channel(&mut self, channel: usize) -> u16;

    /// Number of bytes waiting on the serial transport.
    fn serial_available(&mut self) -> usize;

    /// Read one byte from the serial transport.
    ///
    /// Only valid when [`Board::serial_available`] returned a non-zero count.
    /// Calling with nothing available is a contract violation, not a
    /// recoverable error.
    fn serial_read_byte(&mut self) -> u8;

    /// Write one byte to the serial transport.
    fn serial_write_byte(&mut self, byte: u8);

    /// Set a visible status indicator.
    fn set_status(&mut self, status: StatusIndicator);

    /// Monotonic microsecond clock.
    fn get_micros(&mut self) -> u64;

    /// Blocking sleep for the given number of milliseconds.
    ///
    /// For startup and calibration windows only. Calling this inside the
    /// steady-state control loop blows the loop period budget.
    fn delay_ms(&mut self, ms: u32);

    /// Request a hardware reset.
    ///
    /// May be a no-op on boards without reset capability; returning does not
    /// imply a reset occurred.
    fn reboot(&mut self);

    // ---- OPTIONAL CAPABILITIES ----
    //
    // The default implementations are the degenerate "not fitted" state.
    // Presence is fixed: an adapter reports it once at init and must not
    // transition afterwards.

    /// Initialise sonar unit `index`, returning whether it is fitted.
    fn sonar_init(&mut self, _index: usize) -> bool {
        false
    }

    /// Trigger a sonar measurement cycle. No-op when not fitted.
    fn sonar_update(&mut self, _index: usize) {}

    /// Latest sonar distance, or [`SONAR_NONE`] when not fitted.
    fn sonar_distance(&mut self, _index: usize) -> u16 {
        SONAR_NONE
    }

    /// Initialise the barometer, returning whether it is fitted.
    fn baro_init(&mut self) -> bool {
        false
    }

    /// Trigger a barometer measurement cycle. No-op when not fitted.
    fn baro_update(&mut self) {}

    /// Latest barometric pressure, or [`BARO_NONE`] when not fitted.
    fn baro_pressure(&mut self) -> i32 {
        BARO_NONE
    }
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Capability {
    /// All capabilities, in reporting order.
    pub const ALL: [Capability; 8] = [
        Capability::Imu,
        Capability::Motors,
        Capability::ReceiverInput,
        Capability::Serial,
        Capability::StatusLed,
        Capability::Timing,
        Capability::Sonar,
        Capability::Barometer,
    ];

    /// Whether an adapter may report this capability as not fitted.
    ///
    /// Required capabilities must be implemented by every adapter; only
    /// optional ones may be degenerate.
    pub fn is_optional(&self) -> bool {
        matches!(self, Capability::Sonar | Capability::Barometer)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// A board with no overrides gets the degenerate optional-sensor
    /// implementations: init reports not fitted and reads return sentinels
    /// forever.
    struct BareBoard;

    impl Board for BareBoard {
        fn init(&mut self) -> BoardTiming {
            BoardTiming {
                loop_period_us: 1000,
                gyro_calib_ms: 1000,
            }
        }
        fn imu_init(&mut self) -> ImuScale {
            ImuScale {
                acc_1g: 1,
                gyro_scale: 1.0,
            }
        }
        fn imu_read(&mut self) -> ImuReading {
            ImuReading::default()
        }
        fn write_motor(&mut self, _index: usize, _pulse_us: u16) {}
        fn read_rc_channel(&mut self, _channel: usize) -> u16 {
            RC_NEUTRAL_US
        }
        fn serial_available(&mut self) -> usize {
            0
        }
        fn serial_read_byte(&mut self) -> u8 {
            0
        }
        fn serial_write_byte(&mut self, _byte: u8) {}
        fn set_status(&mut self, _status: StatusIndicator) {}
        fn get_micros(&mut self) -> u64 {
            0
        }
        fn delay_ms(&mut self, _ms: u32) {}
        fn reboot(&mut self) {}
    }

    #[test]
    fn test_optional_defaults_degenerate() {
        let mut board = BareBoard;

        assert!(!board.sonar_init(0));
        assert!(!board.baro_init());

        // Sentinels hold regardless of call count
        for _ in 0..10 {
            board.sonar_update(0);
            board.baro_update();
            assert_eq!(board.sonar_distance(0), SONAR_NONE);
            assert_eq!(board.baro_pressure(), BARO_NONE);
        }
    }

    #[test]
    fn test_capability_optionality() {
        let optional: Vec<_> = Capability::ALL
            .iter()
            .filter(|c| c.is_optional())
            .collect();

        assert_eq!(optional, [&Capability::Sonar, &Capability::Barometer]);
    }
}
