//! # Simulated board parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Configuration of the simulated board's fitted peripherals.
///
/// All fields default to the reference quadcopter fit: 4 motors, 8 receiver
/// channels, no optional sensors.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimBoardParams {
    /// Number of motor channels on the board.
    pub num_motors: usize,

    /// Number of receiver channels decoded by the board.
    pub num_rc_channels: usize,

    /// Number of sonar units fitted. Zero means the sonar capability reports
    /// not fitted and returns sentinel readings.
    pub num_sonars: usize,

    /// Whether a barometer is fitted.
    pub baro_fitted: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors from validating a [`SimBoardParams`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("A board must have at least one motor channel")]
    NoMotors,

    #[error("A board must have at least one receiver channel")]
    NoRcChannels,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimBoardParams {
    fn default() -> Self {
        SimBoardParams {
            num_motors: 4,
            num_rc_channels: 8,
            num_sonars: 0,
            baro_fitted: false,
        }
    }
}

impl SimBoardParams {
    /// Check that the parameters describe a usable board.
    pub fn are_valid(&self) -> Result<(), ParamsError> {
        if self.num_motors == 0 {
            return Err(ParamsError::NoMotors);
        }

        if self.num_rc_channels == 0 {
            return Err(ParamsError::NoRcChannels);
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let params = SimBoardParams::default();

        assert!(params.are_valid().is_ok());
        assert_eq!(params.num_motors, 4);
        assert_eq!(params.num_rc_channels, 8);
        assert_eq!(params.num_sonars, 0);
        assert!(!params.baro_fitted);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = SimBoardParams {
            num_motors: 0,
            ..Default::default()
        };
        assert_eq!(params.are_valid(), Err(ParamsError::NoMotors));

        let params = SimBoardParams {
            num_rc_channels: 0,
            ..Default::default()
        };
        assert_eq!(params.are_valid(), Err(ParamsError::NoRcChannels));
    }
}
