//! SPI bus abstractions
//!
//! Provides traits for SPI master operations that can be implemented
//! by chip-specific HALs, and the Arduino `SPISettings` vocabulary.

/// Arduino `SPI_MODE0` code
pub const SPI_MODE0: u8 = 0x02;
/// Arduino `SPI_MODE1` code
pub const SPI_MODE1: u8 = 0x00;
/// Arduino `SPI_MODE2` code
pub const SPI_MODE2: u8 = 0x03;
/// Arduino `SPI_MODE3` code
pub const SPI_MODE3: u8 = 0x01;

/// SPI bus master
///
/// Provides basic SPI transfer operations for communicating with
/// peripheral devices.
pub trait SpiBus {
    /// Error type for SPI operations
    type Error;

    /// Transfer data (simultaneous read/write)
    ///
    /// Writes data from `write` buffer while reading into `read` buffer.
    /// Both buffers must be the same length.
    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error>;

    /// Write data without reading
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data (writes zeros)
    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Transfer data in place
    ///
    /// Writes data from buffer while reading into the same buffer.
    fn transfer_in_place(&mut self, data: &mut [u8]) -> Result<(), Self::Error>;
}

/// Transaction settings, the equivalent of Arduino's `SPISettings`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiSettings {
    /// Maximum clock frequency in Hz
    ///
    /// Chips pick the fastest rate they support at or below this, never a
    /// faster one. On nRF52 a 200 kHz request runs at 125 kHz, where Arduino's
    /// stock nRF5 core would pick 250 kHz. Requests below the slowest rate get
    /// the slowest rate.
    pub clock: u32,
    /// Bit order on the wire
    pub bit_order: BitOrder,
    /// Clock polarity and phase
    pub mode: Mode,
}

impl Default for SpiSettings {
    fn default() -> Self {
        Self {
            clock: 4_000_000, // 4 MHz
            bit_order: BitOrder::MsbFirst,
            mode: Mode::Mode0,
        }
    }
}

impl SpiSettings {
    /// Settings with an explicit clock, order and mode
    pub const fn new(clock: u32, bit_order: BitOrder, mode: Mode) -> Self {
        Self {
            clock,
            bit_order,
            mode,
        }
    }
}

/// Bit order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// Most significant bit first
    MsbFirst,
    /// Least significant bit first
    LsbFirst,
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl Mode {
    /// Translate an Arduino `SPI_MODEn` code
    pub const fn from_arduino(code: u8) -> Option<Self> {
        match code {
            SPI_MODE0 => Some(Mode::Mode0),
            SPI_MODE1 => Some(Mode::Mode1),
            SPI_MODE2 => Some(Mode::Mode2),
            SPI_MODE3 => Some(Mode::Mode3),
            _ => None,
        }
    }
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }
}
