//! P0 GPIO port: pin configuration and digital I/O
//!
//! Pins outside the port (32 and up) are ignored by every function here,
//! matching how the Arduino surface treats unknown pins.

use core::convert::Infallible;

use embedded_hal::digital;
use pinwheel_hal::gpio::{InputPin, Level, OutputPin, PinMode};

use crate::regs::Reg;

const P0: usize = 0x5000_0000;

const OUT: usize = 0x504;
const OUTSET: usize = 0x508;
const OUTCLR: usize = 0x50C;
const IN: usize = 0x510;
const PIN_CNF: usize = 0x700;

/// Number of pins on P0
pub const PIN_COUNT: u32 = 32;

// PIN_CNF fields
const DIR_OUTPUT: u32 = 1 << 0;
const INPUT_DISCONNECT: u32 = 1 << 1;
const PULL_DOWN: u32 = 1 << 2;
const PULL_UP: u32 = 3 << 2;
const DRIVE_S0D1: u32 = 6 << 8;

/// `PIN_CNF` word for an Arduino pin mode
pub const fn pin_cnf(mode: PinMode) -> u32 {
    match mode {
        PinMode::Input => 0,
        PinMode::InputPullUp => PULL_UP,
        PinMode::InputPullDown => PULL_DOWN,
        PinMode::Output => DIR_OUTPUT | INPUT_DISCONNECT,
    }
}

/// `PIN_CNF` word for an I2C line: input buffer connected, pull-up,
/// standard-0 / disconnect-1 drive
pub const I2C_PIN_CNF: u32 = PULL_UP | DRIVE_S0D1;

fn reg(offset: usize) -> Reg {
    // SAFETY: P0 register block
    unsafe { Reg::at(P0, offset) }
}

fn mask(pin: u32) -> Option<u32> {
    (pin < PIN_COUNT).then(|| 1 << pin)
}

/// Write a raw `PIN_CNF` word
pub(crate) fn configure(pin: u32, cnf: u32) {
    if pin < PIN_COUNT {
        reg(PIN_CNF + 4 * pin as usize).write(cnf);
    }
}

/// Configure `pin` for an Arduino mode code
///
/// Unknown codes leave the pin alone.
pub fn pin_mode(pin: u32, mode: u32) {
    if let Some(mode) = PinMode::from_arduino(mode) {
        configure(pin, pin_cnf(mode));
    }
}

/// Drive `pin` low for `LOW` (0), high for anything else
pub fn digital_write(pin: u32, value: u32) {
    write_level(pin, Level::from_arduino(value));
}

/// Sample the input buffer of `pin`
pub fn digital_read(pin: u32) -> Level {
    match mask(pin) {
        Some(bit) => Level::from(reg(IN).read() & bit != 0),
        None => Level::Low,
    }
}

fn write_level(pin: u32, level: Level) {
    if let Some(bit) = mask(pin) {
        match level {
            Level::High => reg(OUTSET).write(bit),
            Level::Low => reg(OUTCLR).write(bit),
        }
    }
}

/// Handle to one P0 pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pin {
    pin: u32,
}

impl Pin {
    /// Handle for `pin`, if it exists on P0
    pub const fn new(pin: u32) -> Option<Self> {
        if pin < PIN_COUNT {
            Some(Self { pin })
        } else {
            None
        }
    }

    /// Pin number
    pub const fn number(&self) -> u32 {
        self.pin
    }

    /// Reconfigure the pin
    pub fn set_mode(&mut self, mode: PinMode) {
        configure(self.pin, pin_cnf(mode));
    }

    fn bit(&self) -> u32 {
        1 << self.pin
    }
}

impl OutputPin for Pin {
    fn set_high(&mut self) {
        write_level(self.pin, Level::High);
    }

    fn set_low(&mut self) {
        write_level(self.pin, Level::Low);
    }

    fn is_set_high(&self) -> bool {
        reg(OUT).read() & self.bit() != 0
    }
}

impl InputPin for Pin {
    fn is_high(&self) -> bool {
        digital_read(self.pin) == Level::High
    }
}

impl digital::ErrorType for Pin {
    type Error = Infallible;
}

impl digital::OutputPin for Pin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        OutputPin::set_low(self);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        OutputPin::set_high(self);
        Ok(())
    }
}

impl digital::StatefulOutputPin for Pin {
    fn is_set_high(&mut self) -> Result<bool, Infallible> {
        Ok(OutputPin::is_set_high(self))
    }

    fn is_set_low(&mut self) -> Result<bool, Infallible> {
        Ok(OutputPin::is_set_low(self))
    }
}

impl digital::InputPin for Pin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(InputPin::is_high(self))
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(InputPin::is_low(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_cnf_words() {
        assert_eq!(pin_cnf(PinMode::Input), 0x0);
        assert_eq!(pin_cnf(PinMode::InputPullUp), 0xC);
        assert_eq!(pin_cnf(PinMode::InputPullDown), 0x4);
        assert_eq!(pin_cnf(PinMode::Output), 0x3);
        assert_eq!(I2C_PIN_CNF, 0x60C);
    }

    #[test]
    fn test_pin_range() {
        assert!(Pin::new(31).is_some());
        assert!(Pin::new(32).is_none());
        assert_eq!(mask(32), None);
        assert_eq!(mask(5), Some(0x20));
    }
}
