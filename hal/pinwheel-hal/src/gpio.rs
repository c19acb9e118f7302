//! GPIO pin abstractions
//!
//! Provides traits for digital input and output pins, plus the pin mode and
//! logic level vocabulary shared by `pinMode`/`digitalWrite`/`digitalRead`.

/// Arduino `INPUT` mode code
pub const INPUT: u32 = 0x0;
/// Arduino `OUTPUT` mode code
pub const OUTPUT: u32 = 0x1;
/// Arduino `INPUT_PULLUP` mode code
pub const INPUT_PULLUP: u32 = 0x2;
/// Arduino `INPUT_PULLDOWN` mode code
pub const INPUT_PULLDOWN: u32 = 0x3;

/// Arduino `LOW` level code
pub const LOW: u32 = 0x0;
/// Arduino `HIGH` level code
pub const HIGH: u32 = 0x1;

/// Pin direction and bias
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Floating input
    Input,
    /// Push-pull output
    Output,
    /// Input with internal pull-up
    InputPullUp,
    /// Input with internal pull-down
    InputPullDown,
}

impl PinMode {
    /// Translate an Arduino mode code
    ///
    /// Unknown codes return `None`; `pinMode` treats that as "do nothing".
    pub const fn from_arduino(code: u32) -> Option<Self> {
        match code {
            INPUT => Some(PinMode::Input),
            OUTPUT => Some(PinMode::Output),
            INPUT_PULLUP => Some(PinMode::InputPullUp),
            INPUT_PULLDOWN => Some(PinMode::InputPullDown),
            _ => None,
        }
    }

    /// Whether the pin drives its output
    pub const fn is_output(self) -> bool {
        matches!(self, PinMode::Output)
    }
}

/// Digital logic level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Translate an Arduino level value
    ///
    /// Only `LOW` (0) is low; every other value drives high.
    pub const fn from_arduino(value: u32) -> Self {
        if value == LOW {
            Level::Low
        } else {
            Level::High
        }
    }

    /// Arduino code for this level
    pub const fn as_arduino(self) -> u32 {
        match self {
            Level::Low => LOW,
            Level::High => HIGH,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Toggle the pin state
    fn toggle(&mut self) {
        if self.is_set_high() {
            self.set_low();
        } else {
            self.set_high();
        }
    }

    /// Drive the pin to a specific level
    fn set_level(&mut self, level: Level) {
        match level {
            Level::High => self.set_high(),
            Level::Low => self.set_low(),
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }

    /// Read the pin as a [`Level`]
    fn level(&self) -> Level {
        Level::from(self.is_high())
    }
}

/// Pin that can be used for both input and output
pub trait IoPin: OutputPin + InputPin {}

// Blanket implementation for types that implement both traits
impl<T: OutputPin + InputPin> IoPin for T {}
