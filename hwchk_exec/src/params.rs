//! # Hardware Checkout Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HwchkExecParams {
    /// Number of checkout loop cycles to run.
    pub num_cycles: usize,

    /// Number of steps in the motor throttle ramp.
    pub motor_ramp_steps: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for HwchkExecParams {
    fn default() -> Self {
        HwchkExecParams {
            num_cycles: 25,
            motor_ramp_steps: 8,
        }
    }
}
