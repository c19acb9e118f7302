//! SPI master (legacy SPI peripheral, one byte per `READY`)

use pinwheel_hal::gpio::PinMode;
use pinwheel_hal::spi::{BitOrder, Mode, Phase, Polarity, SpiBus, SpiSettings};

use crate::gpio::{configure, pin_cnf};
use crate::regs::{wait_and_clear, Reg};

const EVENTS_READY: usize = 0x108;
const ENABLE: usize = 0x500;
const PSELSCK: usize = 0x508;
const PSELMOSI: usize = 0x50C;
const PSELMISO: usize = 0x510;
const RXD: usize = 0x518;
const TXD: usize = 0x51C;
const FREQUENCY: usize = 0x524;
const CONFIG: usize = 0x554;

const ENABLE_SPI: u32 = 1;

const CONFIG_LSB_FIRST: u32 = 1 << 0;
const CONFIG_CPHA_TRAILING: u32 = 1 << 1;
const CONFIG_CPOL_ACTIVE_LOW: u32 = 1 << 2;

/// Serial instance; each is shared with the TWI master of the same number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiInstance {
    Spi0,
    Spi1,
}

impl SpiInstance {
    const fn base(self) -> usize {
        match self {
            SpiInstance::Spi0 => 0x4000_3000,
            SpiInstance::Spi1 => 0x4000_4000,
        }
    }
}

/// `FREQUENCY` value for the fastest supported rate not above `clock`
///
/// Requests below 125 kHz still run at 125 kHz.
pub const fn frequency_register(clock: u32) -> u32 {
    if clock < 250_000 {
        0x0200_0000 // 125 kHz
    } else if clock < 500_000 {
        0x0400_0000 // 250 kHz
    } else if clock < 1_000_000 {
        0x0800_0000 // 500 kHz
    } else if clock < 2_000_000 {
        0x1000_0000 // 1 MHz
    } else if clock < 4_000_000 {
        0x2000_0000 // 2 MHz
    } else if clock < 8_000_000 {
        0x4000_0000 // 4 MHz
    } else {
        0x8000_0000 // 8 MHz
    }
}

/// Clock for an Arduino `SPI_CLOCK_DIVn` divider of the 16 MHz system clock
pub const fn clock_for_divider(div: u8) -> u32 {
    if div >= 128 {
        125_000
    } else if div >= 64 {
        250_000
    } else if div >= 32 {
        500_000
    } else if div >= 16 {
        1_000_000
    } else if div >= 8 {
        2_000_000
    } else if div >= 4 {
        4_000_000
    } else {
        8_000_000
    }
}

/// `CONFIG` word for a bit order and mode
pub fn config_register(bit_order: BitOrder, mode: Mode) -> u32 {
    let (polarity, phase): (Polarity, Phase) = mode.into();
    let mut config = 0;
    if bit_order == BitOrder::LsbFirst {
        config |= CONFIG_LSB_FIRST;
    }
    if phase == Phase::CaptureOnSecondTransition {
        config |= CONFIG_CPHA_TRAILING;
    }
    if polarity == Polarity::IdleHigh {
        config |= CONFIG_CPOL_ACTIVE_LOW;
    }
    config
}

/// SPI master driver
pub struct Spi {
    base: usize,
    sck: u32,
    mosi: u32,
    miso: u32,
    settings: SpiSettings,
}

impl Spi {
    pub fn new(instance: SpiInstance, sck: u32, mosi: u32, miso: u32) -> Self {
        Self {
            base: instance.base(),
            sck,
            mosi,
            miso,
            settings: SpiSettings::default(),
        }
    }

    fn reg(&self, offset: usize) -> Reg {
        // SAFETY: base comes from `SpiInstance`
        unsafe { Reg::at(self.base, offset) }
    }

    /// Claim the pins and start with default settings
    pub fn begin(&mut self) {
        configure(self.sck, pin_cnf(PinMode::Output));
        configure(self.mosi, pin_cnf(PinMode::Output));
        configure(self.miso, pin_cnf(PinMode::Input));

        self.reg(PSELSCK).write(self.sck);
        self.reg(PSELMOSI).write(self.mosi);
        self.reg(PSELMISO).write(self.miso);

        self.apply(SpiSettings::default());
    }

    /// Reconfigure for one transaction
    pub fn begin_transaction(&mut self, settings: SpiSettings) {
        self.apply(settings);
    }

    pub fn end_transaction(&mut self) {}

    pub fn end(&mut self) {
        self.reg(ENABLE).write(0);
    }

    pub fn set_bit_order(&mut self, bit_order: BitOrder) {
        self.apply(SpiSettings {
            bit_order,
            ..self.settings
        });
    }

    /// Select an Arduino `SPI_MODEn`; unknown codes are ignored
    pub fn set_data_mode(&mut self, code: u8) {
        if let Some(mode) = Mode::from_arduino(code) {
            self.apply(SpiSettings {
                mode,
                ..self.settings
            });
        }
    }

    pub fn set_clock_divider(&mut self, div: u8) {
        self.apply(SpiSettings {
            clock: clock_for_divider(div),
            ..self.settings
        });
    }

    pub fn settings(&self) -> SpiSettings {
        self.settings
    }

    fn apply(&mut self, settings: SpiSettings) {
        self.settings = settings;
        self.reg(ENABLE).write(0);
        self.reg(CONFIG)
            .write(config_register(settings.bit_order, settings.mode));
        self.reg(FREQUENCY).write(frequency_register(settings.clock));
        self.reg(ENABLE).write(ENABLE_SPI);
    }

    /// Exchange one byte
    pub fn transfer(&mut self, byte: u8) -> u8 {
        self.reg(TXD).write(u32::from(byte));
        wait_and_clear(self.reg(EVENTS_READY));
        self.reg(RXD).read() as u8
    }

    /// Exchange a 16-bit word, high byte first unless LSB-first
    pub fn transfer16(&mut self, word: u16) -> u16 {
        let [hi, lo] = word.to_be_bytes();
        match self.settings.bit_order {
            BitOrder::MsbFirst => {
                let hi = self.transfer(hi);
                let lo = self.transfer(lo);
                u16::from_be_bytes([hi, lo])
            }
            BitOrder::LsbFirst => {
                let lo = self.transfer(lo);
                let hi = self.transfer(hi);
                u16::from_be_bytes([hi, lo])
            }
        }
    }
}

impl SpiBus for Spi {
    type Error = core::convert::Infallible;

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        for (rx, &tx) in read.iter_mut().zip(write) {
            *rx = Spi::transfer(self, tx);
        }
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        for &byte in data {
            Spi::transfer(self, byte);
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        for byte in buf.iter_mut() {
            *byte = Spi::transfer(self, 0);
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, data: &mut [u8]) -> Result<(), Self::Error> {
        for byte in data.iter_mut() {
            *byte = Spi::transfer(self, *byte);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_rounds_down() {
        assert_eq!(frequency_register(4_000_000), 0x4000_0000);
        assert_eq!(frequency_register(3_999_999), 0x2000_0000);
        assert_eq!(frequency_register(16_000_000), 0x8000_0000);
        assert_eq!(frequency_register(1), 0x0200_0000);
    }

    #[test]
    fn test_frequency_between_rates_never_exceeds_request() {
        assert_eq!(frequency_register(200_000), 0x0200_0000);
        assert_eq!(frequency_register(250_000), 0x0400_0000);
        assert_eq!(frequency_register(6_000_000), 0x4000_0000);
    }

    #[test]
    fn test_clock_dividers() {
        assert_eq!(clock_for_divider(128), 125_000);
        assert_eq!(clock_for_divider(16), 1_000_000);
        assert_eq!(clock_for_divider(4), 4_000_000);
        assert_eq!(clock_for_divider(2), 8_000_000);
    }

    #[test]
    fn test_config_register() {
        assert_eq!(config_register(BitOrder::MsbFirst, Mode::Mode0), 0b000);
        assert_eq!(config_register(BitOrder::MsbFirst, Mode::Mode1), 0b010);
        assert_eq!(config_register(BitOrder::MsbFirst, Mode::Mode2), 0b100);
        assert_eq!(config_register(BitOrder::LsbFirst, Mode::Mode3), 0b111);
    }
}
