//! nRF52-specific HAL for the Pinwheel core
//!
//! Register-level implementations of the `pinwheel-hal` traits plus the
//! Arduino-shaped free functions built on them:
//!
//! - GPIO pin configuration and digital I/O
//! - GPIOTE channel bank and the process-wide edge interrupt dispatcher
//! - NVIC line control
//! - SAADC one-shot sampling (`analogRead`)
//! - PWM module allocation (`analogWrite`)
//! - UART with an interrupt-fed receive ring
//! - SPI and TWIM (I2C) masters
//!
//! Every driver is blocking and polls event registers. Only the GPIOTE and
//! UART drivers take an interrupt line.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]

#[cfg(feature = "defmt")]
macro_rules! trace {
    ($($arg:tt)*) => { defmt::trace!($($arg)*) };
}

#[cfg(not(feature = "defmt"))]
macro_rules! trace {
    ($($arg:tt)*) => {{
        let _ = ($($arg)*);
    }};
}

#[cfg(feature = "defmt")]
macro_rules! debug {
    ($($arg:tt)*) => { defmt::debug!($($arg)*) };
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:tt)*) => {{
        let _ = ($($arg)*);
    }};
}

mod regs;

pub mod gpio;
pub mod gpiote;
pub mod interrupts;
pub mod nvic;
pub mod pwm;
pub mod saadc;
pub mod spi;
pub mod twi;
pub mod uart;

pub use gpio::{digital_read, digital_write, pin_mode, Pin};
pub use interrupts::{attach_interrupt, detach_interrupt, on_gpiote_interrupt};
pub use nvic::{Irq, Nvic};
