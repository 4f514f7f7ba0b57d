//! # Motor abstraction
//!
//! A motor is a polymorphic actuator: an exclusively owned channel binding
//! plus two operations, `init` and `write`. Concrete implementations cover
//! different actuation technologies (servo-pulse PWM, ESC protocols,
//! simulated motors) and the control core drives them all uniformly.
//!
//! Channel exclusivity is enforced at construction time through
//! [`ChannelClaims`], not by runtime locking: the execution context is a
//! single-threaded cooperative loop with no concurrent access to begin with.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Pulse width commanded for zero throttle, in microseconds.
pub const MOTOR_PULSE_MIN_US: u16 = 1000;

/// Pulse width commanded for full throttle, in microseconds.
pub const MOTOR_PULSE_MAX_US: u16 = 2000;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An exclusive binding to one physical motor channel.
///
/// Can only be obtained from [`ChannelClaims::claim`], which hands out each
/// index at most once. The type is deliberately not `Clone`/`Copy`: holding a
/// `MotorChannel` is holding the channel.
#[derive(Debug, PartialEq, Eq)]
pub struct MotorChannel {
    index: usize,
}

/// Registry of motor channel claims for one board.
///
/// Created at board bring-up with the board's actuator count. Constructing
/// two motors on the same channel index is a programming error and is
/// rejected here rather than silently tolerated.
pub struct ChannelClaims {
    claimed: Vec<bool>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors associated with motor construction and initialisation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MotorError {
    #[error("Motor channel {0} is already claimed")]
    ChannelClaimed(usize),

    #[error("Motor channel {0} does not exist on this board")]
    InvalidChannel(usize),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for driving motors.
///
/// Lifecycle is `{uninitialised -> initialised}`: [`Motor::init`] must be
/// called exactly once before the first [`Motor::write`]. A `write` before
/// `init` clamps the output to idle (implementations document this), never
/// undefined behaviour.
pub trait Motor {
    /// Configure the owned channel. Must be called before `write`.
    fn init(&mut self) -> Result<(), MotorError>;

    /// Command instantaneous output.
    ///
    /// `throttle` is normalised: 0.0 is idle, 1.0 is full output; values
    /// outside that range are clamped. Must be safe to call at full
    /// control-loop rate without allocation or blocking.
    fn write(&mut self, throttle: f64);

    /// The channel this motor is bound to.
    fn channel(&self) -> &MotorChannel;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MotorChannel {
    /// The 0-based channel index this binding refers to.
    pub fn index(&self) -> usize {
        self.index
    }
}

impl ChannelClaims {
    /// Create a claims registry for a board with `num_channels` actuators.
    pub fn new(num_channels: usize) -> Self {
        ChannelClaims {
            claimed: vec![false; num_channels],
        }
    }

    /// Claim a channel, returning its exclusive binding.
    ///
    /// Fails if the index is out of range or the channel has already been
    /// claimed by another motor.
    pub fn claim(&mut self, index: usize) -> Result<MotorChannel, MotorError> {
        match self.claimed.get_mut(index) {
            Some(claimed) => {
                if *claimed {
                    return Err(MotorError::ChannelClaimed(index));
                }

                *claimed = true;
                Ok(MotorChannel { index })
            }
            None => Err(MotorError::InvalidChannel(index)),
        }
    }

    /// Number of channels managed by this registry.
    pub fn num_channels(&self) -> usize {
        self.claimed.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_claim_is_exclusive() {
        let mut claims = ChannelClaims::new(4);

        let chan = claims.claim(2).unwrap();
        assert_eq!(chan.index(), 2);

        // Second claim on the same index is a programming error
        assert_eq!(claims.claim(2), Err(MotorError::ChannelClaimed(2)));

        // Other channels are unaffected
        assert!(claims.claim(3).is_ok());
    }

    #[test]
    fn test_claim_rejects_out_of_range() {
        let mut claims = ChannelClaims::new(4);

        assert_eq!(claims.claim(4), Err(MotorError::InvalidChannel(4)));
        assert_eq!(claims.num_channels(), 4);
    }
}
