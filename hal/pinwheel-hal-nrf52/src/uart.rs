//! UART0 with an interrupt-fed receive ring
//!
//! Transmit is blocking, one byte per `TXDRDY`. Received bytes are moved
//! from `RXD` into a 64-byte ring by [`Uart::on_interrupt`]; the read side
//! also polls the hardware itself, so reads make progress even while the
//! caller holds the lock that keeps the handler out.

use heapless::Deque;
use pinwheel_hal::gpio::PinMode;
use pinwheel_hal::interrupt::InterruptController;
use pinwheel_hal::uart::{Parity, UartConfig, UartRx, UartTx};

use crate::gpio::{configure, pin_cnf};
use crate::nvic::{Irq, Nvic};
use crate::regs::{is_set, trigger, wait_and_clear, Reg};

const UART0: usize = 0x4000_2000;

const TASKS_STARTRX: usize = 0x000;
const TASKS_STOPRX: usize = 0x004;
const TASKS_STARTTX: usize = 0x008;
const TASKS_STOPTX: usize = 0x00C;
const EVENTS_RXDRDY: usize = 0x108;
const EVENTS_TXDRDY: usize = 0x11C;
const EVENTS_ERROR: usize = 0x124;
const INTENSET: usize = 0x304;
const INTENCLR: usize = 0x308;
const ERRORSRC: usize = 0x480;
const ENABLE: usize = 0x500;
const PSELRTS: usize = 0x508;
const PSELTXD: usize = 0x50C;
const PSELCTS: usize = 0x510;
const PSELRXD: usize = 0x514;
const RXD: usize = 0x518;
const TXD: usize = 0x51C;
const BAUDRATE: usize = 0x524;
const CONFIG: usize = 0x56C;

const ENABLE_UART: u32 = 4;
const DISCONNECTED: u32 = 0xFFFF_FFFF;
const INT_RXDRDY: u32 = 1 << 2;
const INT_ERROR: u32 = 1 << 9;
const CONFIG_PARITY_INCLUDED: u32 = 0x7 << 1;

/// Logical priority of the UART line
pub const UART_PRIORITY: u8 = 3;

/// Receive ring capacity
pub const RX_BUFFER_SIZE: usize = 64;

/// `BAUDRATE` value for the slowest supported rate at or above `baud`
///
/// Anything above 921600 runs at 1 Mbaud.
pub const fn baudrate_register(baud: u32) -> u32 {
    match baud {
        0..=1_200 => 0x0004_F000,
        1_201..=2_400 => 0x0009_D000,
        2_401..=4_800 => 0x0013_B000,
        4_801..=9_600 => 0x0027_5000,
        9_601..=14_400 => 0x003B_0000,
        14_401..=19_200 => 0x004E_A000,
        19_201..=28_800 => 0x0075_F000,
        28_801..=38_400 => 0x009D_5000,
        38_401..=57_600 => 0x00EB_F000,
        57_601..=76_800 => 0x013A_9000,
        76_801..=115_200 => 0x01D7_E000,
        115_201..=230_400 => 0x03AF_B000,
        230_401..=250_000 => 0x0400_0000,
        250_001..=460_800 => 0x075F_7000,
        460_801..=921_600 => 0x0EBE_D000,
        _ => 0x1000_0000,
    }
}

/// Receive error latched in `ERRORSRC`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartError {
    Overrun,
    Parity,
    Framing,
    Break,
}

impl UartError {
    /// Most significant error in an `ERRORSRC` value
    pub const fn from_errorsrc(src: u32) -> Option<Self> {
        if src & 0b0001 != 0 {
            Some(UartError::Overrun)
        } else if src & 0b0010 != 0 {
            Some(UartError::Parity)
        } else if src & 0b0100 != 0 {
            Some(UartError::Framing)
        } else if src & 0b1000 != 0 {
            Some(UartError::Break)
        } else {
            None
        }
    }
}

impl embedded_io::Error for UartError {
    fn kind(&self) -> embedded_io::ErrorKind {
        embedded_io::ErrorKind::Other
    }
}

/// UART0 driver
pub struct Uart {
    tx_pin: u32,
    rx_pin: u32,
    rx: Deque<u8, RX_BUFFER_SIZE>,
    error: Option<UartError>,
    nvic: Nvic,
}

impl Uart {
    /// Driver for UART0 on the given pins; nothing is touched until `begin`
    pub const fn new(tx_pin: u32, rx_pin: u32) -> Self {
        Self {
            tx_pin,
            rx_pin,
            rx: Deque::new(),
            error: None,
            nvic: Nvic::new(),
        }
    }

    fn reg(&self, offset: usize) -> Reg {
        // SAFETY: UART0 register block
        unsafe { Reg::at(UART0, offset) }
    }

    /// Configure and start the port, then unmask its interrupt
    pub fn begin(&mut self, config: UartConfig) {
        configure(self.tx_pin, pin_cnf(PinMode::Output));
        configure(self.rx_pin, pin_cnf(PinMode::Input));

        self.reg(PSELTXD).write(self.tx_pin);
        self.reg(PSELRXD).write(self.rx_pin);
        self.reg(PSELRTS).write(DISCONNECTED);
        self.reg(PSELCTS).write(DISCONNECTED);

        let parity = match config.parity {
            Parity::None => 0,
            Parity::Even => CONFIG_PARITY_INCLUDED,
        };
        self.reg(CONFIG).write(parity);
        self.reg(BAUDRATE).write(baudrate_register(config.baudrate));
        self.reg(ENABLE).write(ENABLE_UART);

        self.reg(EVENTS_RXDRDY).write(0);
        self.reg(EVENTS_TXDRDY).write(0);
        trigger(self.reg(TASKS_STARTRX));
        trigger(self.reg(TASKS_STARTTX));

        self.reg(INTENSET).write(INT_RXDRDY | INT_ERROR);

        self.nvic.clear_pending(Irq::Uart0);
        self.nvic.set_priority(Irq::Uart0, UART_PRIORITY);
        self.nvic.enable_line(Irq::Uart0);

        debug!("uart: {=u32} baud on tx {=u32} rx {=u32}", config.baudrate, self.tx_pin, self.rx_pin);
    }

    /// Stop the port and release its pins
    pub fn end(&mut self) {
        self.nvic.disable_line(Irq::Uart0);
        self.reg(INTENCLR).write(INT_RXDRDY | INT_ERROR);

        trigger(self.reg(TASKS_STOPRX));
        trigger(self.reg(TASKS_STOPTX));
        self.reg(ENABLE).write(0);

        self.reg(PSELTXD).write(DISCONNECTED);
        self.reg(PSELRXD).write(DISCONNECTED);

        self.rx.clear();
        self.error = None;
    }

    /// Body of the UART0 interrupt vector
    pub fn on_interrupt(&mut self) {
        self.poll_rx();
    }

    fn poll_rx(&mut self) {
        if is_set(self.reg(EVENTS_ERROR)) {
            let src = self.reg(ERRORSRC).read();
            self.reg(ERRORSRC).write(src);
            self.reg(EVENTS_ERROR).write(0);
            self.error = self.error.or(UartError::from_errorsrc(src));
        }

        if is_set(self.reg(EVENTS_RXDRDY)) {
            self.reg(EVENTS_RXDRDY).write(0);
            let byte = self.reg(RXD).read() as u8;
            // Full ring drops the new byte
            let _ = self.rx.push_back(byte);
        }
    }

    /// Bytes waiting in the ring
    pub fn available(&self) -> usize {
        self.rx.len()
    }

    /// Next byte without consuming it
    pub fn peek(&self) -> Option<u8> {
        self.rx.front().copied()
    }

    /// Take the next byte, if any
    pub fn read(&mut self) -> Option<u8> {
        self.poll_rx();
        self.rx.pop_front()
    }

    /// Send one byte, blocking until it is on the wire
    pub fn write_byte(&mut self, byte: u8) {
        self.reg(TXD).write(u32::from(byte));
        wait_and_clear(self.reg(EVENTS_TXDRDY));
    }

    /// Take and clear the latched receive error
    pub fn take_error(&mut self) -> Option<UartError> {
        self.error.take()
    }

    fn next_byte(&mut self) -> Result<u8, UartError> {
        loop {
            if let Some(err) = self.error.take() {
                return Err(err);
            }
            if let Some(byte) = self.read() {
                return Ok(byte);
            }
            core::hint::spin_loop();
        }
    }
}

impl UartTx for Uart {
    type Error = UartError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), UartError> {
        for &byte in data {
            self.write_byte(byte);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), UartError> {
        Ok(())
    }
}

impl UartRx for Uart {
    type Error = UartError;

    fn read_blocking(&mut self, buf: &mut [u8]) -> Result<usize, UartError> {
        for slot in buf.iter_mut() {
            *slot = self.next_byte()?;
        }
        Ok(buf.len())
    }
}

impl embedded_io::ErrorType for Uart {
    type Error = UartError;
}

impl embedded_io::Read for Uart {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, UartError> {
        if buf.is_empty() {
            return Ok(0);
        }

        buf[0] = self.next_byte()?;
        let mut count = 1;
        while count < buf.len() {
            match Uart::read(self) {
                Some(byte) => {
                    buf[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }
}

impl embedded_io::Write for Uart {
    fn write(&mut self, buf: &[u8]) -> Result<usize, UartError> {
        self.write_blocking(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), UartError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baudrate_rounds_up() {
        assert_eq!(baudrate_register(9_600), 0x0027_5000);
        assert_eq!(baudrate_register(9_601), 0x003B_0000);
        assert_eq!(baudrate_register(115_200), 0x01D7_E000);
        assert_eq!(baudrate_register(300), 0x0004_F000);
        assert_eq!(baudrate_register(250_000), 0x0400_0000);
        assert_eq!(baudrate_register(2_000_000), 0x1000_0000);
    }

    #[test]
    fn test_errorsrc_priority() {
        assert_eq!(UartError::from_errorsrc(0), None);
        assert_eq!(UartError::from_errorsrc(0b0100), Some(UartError::Framing));
        assert_eq!(UartError::from_errorsrc(0b1101), Some(UartError::Overrun));
        assert_eq!(UartError::from_errorsrc(0b1000), Some(UartError::Break));
    }

    #[test]
    fn test_new_port_is_idle() {
        let uart = Uart::new(6, 8);
        assert_eq!(uart.available(), 0);
        assert_eq!(uart.peek(), None);
    }
}
