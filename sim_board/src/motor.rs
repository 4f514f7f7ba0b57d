//! # Simulated motor implementations
//!
//! Two [`Motor`] variants usable without flight hardware:
//!
//! - [`SimMotor`]: a logging motor which records the last commanded
//!   normalised throttle, for exercising the actuation path in tests
//! - [`PulseMotor`]: the servo-pulse technology, mapping normalised throttle
//!   onto a microsecond pulse width between configurable endpoints
//!
//! Both clamp a `write` before `init` to idle output and count it as a
//! contract violation rather than faulting.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::warn;

// Internal
use board_if::motor::{Motor, MotorChannel, MotorError, MOTOR_PULSE_MAX_US, MOTOR_PULSE_MIN_US};
use util::maths::{clamp, lin_map};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A logging motor recording the last commanded throttle.
pub struct SimMotor {
    channel: MotorChannel,
    initialised: bool,
    throttle: f64,
    violations: u32,
}

/// A servo-pulse motor mapping throttle onto a pulse width.
pub struct PulseMotor {
    channel: MotorChannel,
    initialised: bool,
    min_us: u16,
    max_us: u16,
    pulse_us: u16,
    violations: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimMotor {
    /// Create a logging motor on the given channel binding.
    pub fn new(channel: MotorChannel) -> Self {
        SimMotor {
            channel,
            initialised: false,
            throttle: 0.0,
            violations: 0,
        }
    }

    /// The last commanded throttle, idle (0.0) before the first valid write.
    pub fn throttle(&self) -> f64 {
        self.throttle
    }

    /// Number of writes clamped because the motor wasn't initialised.
    pub fn violation_count(&self) -> u32 {
        self.violations
    }
}

impl Motor for SimMotor {
    fn init(&mut self) -> Result<(), MotorError> {
        self.initialised = true;
        self.throttle = 0.0;
        Ok(())
    }

    fn write(&mut self, throttle: f64) {
        if !self.initialised {
            self.violations += 1;
            warn!(
                "Motor channel {} written before init, clamping to idle",
                self.channel.index()
            );
            self.throttle = 0.0;
            return;
        }

        self.throttle = clamp(&throttle, &0.0, &1.0);
    }

    fn channel(&self) -> &MotorChannel {
        &self.channel
    }
}

impl PulseMotor {
    /// Create a servo-pulse motor with the standard 1000-2000 us endpoints.
    pub fn new(channel: MotorChannel) -> Self {
        Self::with_endpoints(channel, MOTOR_PULSE_MIN_US, MOTOR_PULSE_MAX_US)
    }

    /// Create a servo-pulse motor with custom endpoints, for ESCs calibrated
    /// to a narrower throttle range.
    pub fn with_endpoints(channel: MotorChannel, min_us: u16, max_us: u16) -> Self {
        PulseMotor {
            channel,
            initialised: false,
            min_us,
            max_us,
            pulse_us: min_us,
            violations: 0,
        }
    }

    /// The last commanded pulse width, idle before the first valid write.
    pub fn pulse_us(&self) -> u16 {
        self.pulse_us
    }

    /// Number of writes clamped because the motor wasn't initialised.
    pub fn violation_count(&self) -> u32 {
        self.violations
    }
}

impl Motor for PulseMotor {
    fn init(&mut self) -> Result<(), MotorError> {
        self.initialised = true;
        self.pulse_us = self.min_us;
        Ok(())
    }

    fn write(&mut self, throttle: f64) {
        if !self.initialised {
            self.violations += 1;
            warn!(
                "Motor channel {} written before init, clamping to idle",
                self.channel.index()
            );
            self.pulse_us = self.min_us;
            return;
        }

        let throttle = clamp(&throttle, &0.0, &1.0);
        self.pulse_us = lin_map(
            (0.0, 1.0),
            (self.min_us as f64, self.max_us as f64),
            throttle,
        )
        .round() as u16;
    }

    fn channel(&self) -> &MotorChannel {
        &self.channel
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use board_if::motor::ChannelClaims;

    #[test]
    fn test_sim_motor_write_read_back() {
        let mut claims = ChannelClaims::new(4);
        let mut motor = SimMotor::new(claims.claim(0).unwrap());

        motor.init().unwrap();
        motor.write(0.42);
        assert_eq!(motor.throttle(), 0.42);

        // Out-of-range throttle clamps
        motor.write(1.5);
        assert_eq!(motor.throttle(), 1.0);
        motor.write(-0.5);
        assert_eq!(motor.throttle(), 0.0);
    }

    #[test]
    fn test_write_before_init_clamps_to_idle() {
        let mut claims = ChannelClaims::new(4);
        let mut motor = SimMotor::new(claims.claim(0).unwrap());

        motor.write(0.9);
        assert_eq!(motor.throttle(), 0.0);
        assert_eq!(motor.violation_count(), 1);

        motor.init().unwrap();
        motor.write(0.9);
        assert_eq!(motor.throttle(), 0.9);
        assert_eq!(motor.violation_count(), 1);
    }

    #[test]
    fn test_pulse_motor_mapping() {
        let mut claims = ChannelClaims::new(4);
        let mut motor = PulseMotor::new(claims.claim(1).unwrap());

        motor.init().unwrap();
        assert_eq!(motor.pulse_us(), 1000);

        motor.write(0.5);
        assert_eq!(motor.pulse_us(), 1500);
        motor.write(1.0);
        assert_eq!(motor.pulse_us(), 2000);
        motor.write(0.0);
        assert_eq!(motor.pulse_us(), 1000);
    }

    #[test]
    fn test_pulse_motor_custom_endpoints() {
        let mut claims = ChannelClaims::new(4);
        let mut motor = PulseMotor::with_endpoints(claims.claim(1).unwrap(), 1100, 1900);

        motor.init().unwrap();
        motor.write(0.5);
        assert_eq!(motor.pulse_us(), 1500);
        motor.write(1.0);
        assert_eq!(motor.pulse_us(), 1900);
    }

    #[test]
    fn test_channels_cannot_be_shared() {
        let mut claims = ChannelClaims::new(2);

        let _a = SimMotor::new(claims.claim(0).unwrap());
        // Constructing a second motor on channel 0 fails at the claim
        assert!(claims.claim(0).is_err());

        let b = PulseMotor::new(claims.claim(1).unwrap());
        assert_eq!(b.channel().index(), 1);
    }
}
