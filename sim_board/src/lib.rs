//! # Simulated board crate
//!
//! Reference implementation of the [`board_if`] hardware contract, backed
//! entirely by in-memory peripherals. It serves two purposes:
//!
//! - a checkout target for exercising the control-side code paths on a host
//!   machine, without any flight hardware attached
//! - the adapter against which the contract's testable properties are
//!   verified (scripted sensors, read-back actuators, call tracing)

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// The simulated board adapter.
pub mod board;

/// Simulated motor implementations.
pub mod motor;

/// Parameters for the simulated board.
pub mod params;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use board::*;
pub use motor::*;
pub use params::*;
