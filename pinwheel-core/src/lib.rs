//! Board-agnostic core logic for the Pinwheel hardware core
//!
//! This crate contains the parts of the core that do not touch registers
//! directly and can therefore be tested on the host:
//!
//! - Channel-multiplexed edge interrupt dispatcher (`attachInterrupt`)
//! - Pin-slot allocation shared by the dispatcher and PWM
//! - Analog resolution selection and bit-width rescaling

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod analog;
pub mod interrupts;
pub mod slots;

pub use interrupts::{AttachError, Callback, Dispatcher, EdgeMode};
pub use slots::PinSlots;
