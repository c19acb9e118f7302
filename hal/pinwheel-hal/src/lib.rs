//! Pinwheel Hardware Abstraction Layer
//!
//! This crate defines the hardware contracts the Pinwheel core is written
//! against. Chip crates (nRF52 today) implement them over memory-mapped
//! registers; the core logic only ever sees these traits, which is what lets
//! the interrupt dispatcher run against mocks on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (pinwheel-firmware, etc.)  │
//! └─────────────────────────────────────────┘
//!            │                     │
//!            ▼                     ▼
//! ┌────────────────────┐  ┌────────────────────┐
//! │   pinwheel-core    │  │ pinwheel-hal-nrf52 │
//! │ (dispatcher, PWM   │◄─┤ (register drivers, │
//! │  slots, rescaling) │  │  GPIOTE vector)    │
//! └────────────────────┘  └────────────────────┘
//!            │                     │
//!            └──────────┬──────────┘
//!                       ▼
//! ┌─────────────────────────────────────────┐
//! │  pinwheel-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`edge::EdgeChannelBank`] - Edge-detect channel bank (GPIOTE)
//! - [`interrupt::InterruptController`] - Interrupt line control (NVIC)
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication
//! - [`i2c::I2cBus`] - I2C bus operations
//! - [`spi::SpiBus`] - SPI bus operations

#![no_std]
#![deny(unsafe_code)]

pub mod edge;
pub mod gpio;
pub mod i2c;
pub mod interrupt;
pub mod spi;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use edge::{EdgeChannelBank, Polarity};
pub use gpio::{InputPin, Level, OutputPin, PinMode};
pub use i2c::I2cBus;
pub use interrupt::InterruptController;
pub use spi::SpiBus;
pub use uart::{UartRx, UartTx};
