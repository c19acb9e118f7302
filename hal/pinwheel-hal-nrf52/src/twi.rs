//! I2C master on the TWIM peripheral
//!
//! Arduino `Wire` shape: writes are staged with `begin_transmission` /
//! `write` and sent by `end_transmission`; `request_from` fills a receive
//! buffer that `read` drains. Transfers go through EasyDMA straight from
//! the driver's own buffers and poll events to completion.

use core::sync::atomic::{compiler_fence, Ordering};

use heapless::Vec;
use pinwheel_hal::i2c::{I2cBus, I2cConfig};

use crate::gpio::{configure, I2C_PIN_CNF};
use crate::regs::{is_set, trigger, Reg};

const TASKS_STARTRX: usize = 0x000;
const TASKS_STARTTX: usize = 0x008;
const TASKS_STOP: usize = 0x014;
const TASKS_SUSPEND: usize = 0x01C;
const TASKS_RESUME: usize = 0x020;
const EVENTS_STOPPED: usize = 0x104;
const EVENTS_ERROR: usize = 0x124;
const EVENTS_SUSPENDED: usize = 0x148;
const EVENTS_RXSTARTED: usize = 0x14C;
const EVENTS_TXSTARTED: usize = 0x150;
const EVENTS_LASTRX: usize = 0x15C;
const EVENTS_LASTTX: usize = 0x160;
const ERRORSRC: usize = 0x4C4;
const ENABLE: usize = 0x500;
const PSEL_SCL: usize = 0x508;
const PSEL_SDA: usize = 0x50C;
const FREQUENCY: usize = 0x524;
const RXD_PTR: usize = 0x534;
const RXD_MAXCNT: usize = 0x538;
const RXD_AMOUNT: usize = 0x53C;
const TXD_PTR: usize = 0x544;
const TXD_MAXCNT: usize = 0x548;
const ADDRESS: usize = 0x588;

const ENABLE_TWIM: u32 = 6;

const ERRORSRC_ANACK: u32 = 1 << 1;
const ERRORSRC_DNACK: u32 = 1 << 2;

/// Transmit and receive buffer size
pub const BUFFER_SIZE: usize = 64;

/// TWIM instance; each is shared with the SPI master of the same number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TwiInstance {
    Twim0,
    Twim1,
}

impl TwiInstance {
    const fn base(self) -> usize {
        match self {
            TwiInstance::Twim0 => 0x4000_3000,
            TwiInstance::Twim1 => 0x4000_4000,
        }
    }
}

/// Failed `end_transmission`, in Arduino status-code order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cError {
    /// More bytes were written than the transmit buffer holds (1)
    DataTooLong,
    /// Address not acknowledged (2)
    AddressNack,
    /// Data byte not acknowledged (3)
    DataNack,
    /// Anything else (4)
    Other,
}

impl I2cError {
    /// Arduino `endTransmission` status code
    pub const fn code(self) -> u8 {
        match self {
            I2cError::DataTooLong => 1,
            I2cError::AddressNack => 2,
            I2cError::DataNack => 3,
            I2cError::Other => 4,
        }
    }

    /// Error for an `ERRORSRC` value
    pub const fn from_errorsrc(src: u32) -> Self {
        if src == ERRORSRC_ANACK {
            I2cError::AddressNack
        } else if src == ERRORSRC_DNACK {
            I2cError::DataNack
        } else {
            I2cError::Other
        }
    }
}

/// `FREQUENCY` value for a requested bus clock
///
/// Up to 100 kHz runs at 100 kHz, up to 250 kHz at 250 kHz, anything
/// faster at 400 kHz.
pub const fn frequency_register(hz: u32) -> u32 {
    if hz <= 100_000 {
        0x0198_0000
    } else if hz <= 250_000 {
        0x0400_0000
    } else {
        0x0640_0000
    }
}

/// TWIM driver
pub struct Twi {
    base: usize,
    scl: u32,
    sda: u32,
    tx: Vec<u8, BUFFER_SIZE>,
    tx_address: u8,
    transmitting: bool,
    overflowed: bool,
    rx: [u8; BUFFER_SIZE],
    rx_len: usize,
    rx_pos: usize,
}

impl Twi {
    pub const fn new(instance: TwiInstance, scl: u32, sda: u32) -> Self {
        Self {
            base: instance.base(),
            scl,
            sda,
            tx: Vec::new(),
            tx_address: 0,
            transmitting: false,
            overflowed: false,
            rx: [0; BUFFER_SIZE],
            rx_len: 0,
            rx_pos: 0,
        }
    }

    fn reg(&self, offset: usize) -> Reg {
        // SAFETY: base comes from `TwiInstance`
        unsafe { Reg::at(self.base, offset) }
    }

    /// Start as bus master at the standard rate
    pub fn begin(&mut self) {
        configure(self.scl, I2C_PIN_CNF);
        configure(self.sda, I2C_PIN_CNF);

        self.reg(FREQUENCY)
            .write(frequency_register(I2cConfig::STANDARD.frequency));
        self.reg(ENABLE).write(ENABLE_TWIM);
        self.reg(PSEL_SCL).write(self.scl);
        self.reg(PSEL_SDA).write(self.sda);

        debug!("twi: master on scl {=u32} sda {=u32}", self.scl, self.sda);
    }

    /// Change the bus clock
    pub fn set_clock(&mut self, hz: u32) {
        self.reg(ENABLE).write(0);
        self.reg(FREQUENCY).write(frequency_register(hz));
        self.reg(ENABLE).write(ENABLE_TWIM);
    }

    pub fn end(&mut self) {
        self.reg(ENABLE).write(0);
    }

    /// Start staging a write to `address`
    pub fn begin_transmission(&mut self, address: u8) {
        self.tx_address = address;
        self.tx.clear();
        self.transmitting = true;
        self.overflowed = false;
    }

    /// Stage one byte; returns 1 if stored, 0 if not begun or full
    pub fn write(&mut self, byte: u8) -> usize {
        if !self.transmitting {
            return 0;
        }
        match self.tx.push(byte) {
            Ok(()) => 1,
            Err(_) => {
                self.overflowed = true;
                0
            }
        }
    }

    /// Stage a slice; returns how many bytes fit
    pub fn write_all(&mut self, data: &[u8]) -> usize {
        data.iter().take_while(|&&byte| self.write(byte) == 1).count()
    }

    /// Send the staged bytes, ending with STOP or leaving the bus suspended
    ///
    /// A transmission that overflowed the buffer is not sent.
    pub fn end_transmission(&mut self, stop: bool) -> Result<(), I2cError> {
        self.transmitting = false;
        if self.overflowed {
            return Err(I2cError::DataTooLong);
        }

        self.reg(ADDRESS).write(u32::from(self.tx_address));
        self.reg(TXD_PTR).write(self.tx.as_ptr() as u32);
        self.reg(TXD_MAXCNT).write(self.tx.len() as u32);
        compiler_fence(Ordering::SeqCst);

        trigger(self.reg(TASKS_RESUME));
        trigger(self.reg(TASKS_STARTTX));
        self.wait_or_error(EVENTS_TXSTARTED);
        self.wait_or_error(EVENTS_LASTTX);

        self.finish(stop).map_err(I2cError::from_errorsrc)
    }

    /// Read up to `quantity` bytes from `address` into the receive buffer
    ///
    /// Returns the number of bytes the peripheral actually clocked in.
    pub fn request_from(&mut self, address: u8, quantity: usize, stop: bool) -> usize {
        self.rx_len = 0;
        self.rx_pos = 0;
        if quantity == 0 {
            return 0;
        }
        let quantity = quantity.min(BUFFER_SIZE);

        self.reg(ADDRESS).write(u32::from(address));
        self.reg(RXD_PTR).write(self.rx.as_mut_ptr() as u32);
        self.reg(RXD_MAXCNT).write(quantity as u32);
        compiler_fence(Ordering::SeqCst);

        trigger(self.reg(TASKS_RESUME));
        trigger(self.reg(TASKS_STARTRX));
        self.wait_or_error(EVENTS_RXSTARTED);
        self.wait_or_error(EVENTS_LASTRX);

        // Errors only shorten the read; the amount says how far it got
        let _ = self.finish(stop);
        compiler_fence(Ordering::SeqCst);

        self.rx_len = (self.reg(RXD_AMOUNT).read() as usize).min(quantity);
        self.rx_len
    }

    /// Bytes left in the receive buffer
    pub fn available(&self) -> usize {
        self.rx_len - self.rx_pos
    }

    pub fn peek(&self) -> Option<u8> {
        (self.rx_pos < self.rx_len).then(|| self.rx[self.rx_pos])
    }

    pub fn read(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.rx_pos += 1;
        Some(byte)
    }

    fn wait_or_error(&self, event: usize) {
        while !is_set(self.reg(event)) && !is_set(self.reg(EVENTS_ERROR)) {
            core::hint::spin_loop();
        }
        self.reg(event).write(0);
    }

    /// Stop or suspend the bus, then report and clear any error source
    fn finish(&self, stop: bool) -> Result<(), u32> {
        let errored = is_set(self.reg(EVENTS_ERROR));

        let (task, event) = if stop || errored {
            (TASKS_STOP, EVENTS_STOPPED)
        } else {
            (TASKS_SUSPEND, EVENTS_SUSPENDED)
        };
        trigger(self.reg(task));
        while !is_set(self.reg(event)) {
            core::hint::spin_loop();
        }
        self.reg(event).write(0);

        if !errored {
            return Ok(());
        }
        self.reg(EVENTS_ERROR).write(0);
        let src = self.reg(ERRORSRC).read();
        self.reg(ERRORSRC).write(src);
        Err(src)
    }
}

impl I2cBus for Twi {
    type Error = I2cError;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), I2cError> {
        self.begin_transmission(address);
        self.write_all(data);
        self.end_transmission(true)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), I2cError> {
        if buf.len() > BUFFER_SIZE {
            return Err(I2cError::DataTooLong);
        }
        if self.request_from(address, buf.len(), true) != buf.len() {
            return Err(I2cError::Other);
        }
        buf.copy_from_slice(&self.rx[..buf.len()]);
        self.rx_pos = self.rx_len;
        Ok(())
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), I2cError> {
        self.begin_transmission(address);
        self.write_all(write_data);
        self.end_transmission(false)?;
        I2cBus::read(self, address, read_buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_buckets() {
        assert_eq!(frequency_register(50_000), 0x0198_0000);
        assert_eq!(frequency_register(100_000), 0x0198_0000);
        assert_eq!(frequency_register(100_001), 0x0400_0000);
        assert_eq!(frequency_register(400_000), 0x0640_0000);
        assert_eq!(frequency_register(1_000_000), 0x0640_0000);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(I2cError::from_errorsrc(ERRORSRC_ANACK), I2cError::AddressNack);
        assert_eq!(I2cError::from_errorsrc(ERRORSRC_DNACK), I2cError::DataNack);
        assert_eq!(I2cError::from_errorsrc(1), I2cError::Other);
        assert_eq!(I2cError::DataTooLong.code(), 1);
        assert_eq!(I2cError::Other.code(), 4);
    }

    #[test]
    fn test_write_requires_begin() {
        let mut twi = Twi::new(TwiInstance::Twim0, 27, 26);
        assert_eq!(twi.write(0x42), 0);
        twi.begin_transmission(0x50);
        assert_eq!(twi.write(0x42), 1);
    }

    #[test]
    fn test_staging_stops_at_buffer_size() {
        let mut twi = Twi::new(TwiInstance::Twim0, 27, 26);
        twi.begin_transmission(0x50);
        assert_eq!(twi.write_all(&[0xAA; BUFFER_SIZE + 8]), BUFFER_SIZE);
        assert!(twi.overflowed);
        assert_eq!(twi.end_transmission(true), Err(I2cError::DataTooLong));
        // The failed transmission ended the staging session
        assert_eq!(twi.write(1), 0);
    }

    #[test]
    fn test_zero_length_request_touches_nothing() {
        let mut twi = Twi::new(TwiInstance::Twim1, 27, 26);
        assert_eq!(twi.request_from(0x50, 0, true), 0);
        assert_eq!(twi.available(), 0);
        assert_eq!(twi.read(), None);
    }
}
