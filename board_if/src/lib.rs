//! # Board interface crate.
//!
//! Provides the hardware abstraction boundary between the flight-control core
//! and a concrete board. The control core owns exactly one [`board::Board`]
//! implementation for the process lifetime and drives all hardware through
//! it, so it never has to special-case hardware identity.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// The board capability contract implemented by every board adapter.
pub mod board;

/// The polymorphic motor abstraction and its channel-claim registry.
pub mod motor;
