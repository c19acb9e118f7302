//! GPIOTE channel bank
//!
//! Each channel can watch one pin in event mode. `EVENTS_IN[n]` latches an
//! edge on channel `n` and `INTENSET`/`INTENCLR` bit `n` routes it to the
//! GPIOTE interrupt line.

use pinwheel_hal::edge::{EdgeChannelBank, Polarity};

use crate::regs::Reg;

const GPIOTE: usize = 0x4000_6000;

const EVENTS_IN: usize = 0x100;
const INTENSET: usize = 0x304;
const INTENCLR: usize = 0x308;
const CONFIG: usize = 0x510;

/// Number of GPIOTE channels
#[cfg(not(feature = "nrf51"))]
pub const GPIOTE_CHANNELS: usize = 8;

/// Number of GPIOTE channels
#[cfg(feature = "nrf51")]
pub const GPIOTE_CHANNELS: usize = 4;

// CONFIG fields
const MODE_MASK: u32 = 0b11;
const MODE_EVENT: u32 = 1;
const PSEL_SHIFT: u32 = 8;
const PSEL_MASK: u32 = 0x1F << PSEL_SHIFT;
const POLARITY_SHIFT: u32 = 16;
const POLARITY_MASK: u32 = 0b11 << POLARITY_SHIFT;

/// Replace the pin and polarity fields of a `CONFIG` word, keeping its mode
pub const fn edge_config(config: u32, pin: u32, polarity: Polarity) -> u32 {
    (config & !(PSEL_MASK | POLARITY_MASK))
        | ((pin << PSEL_SHIFT) & PSEL_MASK)
        | (polarity.bits() << POLARITY_SHIFT)
}

/// `CONFIG` word with event mode switched on or off
pub const fn with_event_mode(config: u32, enabled: bool) -> u32 {
    if enabled {
        (config & !MODE_MASK) | MODE_EVENT
    } else {
        config & !MODE_MASK
    }
}

/// The GPIOTE peripheral
#[derive(Debug, Default)]
pub struct Gpiote {
    _private: (),
}

impl Gpiote {
    /// Handle to the peripheral
    ///
    /// Only one handle should drive the channels; the dispatcher in
    /// [`crate::interrupts`] owns the one the firmware uses.
    pub const fn new() -> Self {
        Self { _private: () }
    }

    fn reg(&self, offset: usize) -> Reg {
        // SAFETY: GPIOTE register block
        unsafe { Reg::at(GPIOTE, offset) }
    }

    fn config(&self, channel: usize) -> Reg {
        self.reg(CONFIG + 4 * channel)
    }

    fn event(&self, channel: usize) -> Reg {
        self.reg(EVENTS_IN + 4 * channel)
    }
}

impl EdgeChannelBank for Gpiote {
    fn configure_edge_detect(&mut self, channel: usize, pin: u32, polarity: Polarity) {
        self.config(channel)
            .modify(|config| edge_config(config, pin, polarity));
    }

    fn enable_channel_event(&mut self, channel: usize) {
        self.config(channel)
            .modify(|config| with_event_mode(config, true));
    }

    fn disable_channel_event(&mut self, channel: usize) {
        self.config(channel)
            .modify(|config| with_event_mode(config, false));
    }

    fn is_channel_event_pending(&self, channel: usize) -> bool {
        self.event(channel).read() != 0
    }

    fn clear_channel_event(&mut self, channel: usize) {
        self.event(channel).write(0);
    }

    fn is_channel_interrupt_enabled(&self, channel: usize) -> bool {
        self.reg(INTENSET).read() & (1 << channel) != 0
    }

    fn enable_channel_interrupt(&mut self, mask: u32) {
        self.reg(INTENSET).write(mask);
    }

    fn disable_channel_interrupt(&mut self, mask: u32) {
        self.reg(INTENCLR).write(mask);
    }
}
