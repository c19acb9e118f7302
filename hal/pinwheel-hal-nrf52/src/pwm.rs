//! PWM modules behind `analogWrite`
//!
//! The three PWM modules are handed out per pin with the same
//! first-free-or-own policy as GPIOTE channels. Each module drives its pin
//! on output 0 from a one-word sequence that is refreshed continuously, so
//! updating the duty is a matter of rewriting that word and restarting.

use core::cell::RefCell;
use core::sync::atomic::{compiler_fence, AtomicU16, AtomicU32, Ordering};

use cortex_m::interrupt::{self, Mutex};
use pinwheel_core::analog::{pwm_counter_top, DEFAULT_WRITE_RESOLUTION};
use pinwheel_core::PinSlots;

use crate::gpio::PIN_COUNT;
use crate::regs::{trigger, Reg};

/// Number of PWM modules
pub const PWM_MODULES: usize = 3;

const PWM_BASES: [usize; PWM_MODULES] = [0x4001_C000, 0x4002_1000, 0x4002_2000];

const TASKS_SEQSTART0: usize = 0x008;
const ENABLE: usize = 0x500;
const MODE: usize = 0x504;
const COUNTERTOP: usize = 0x508;
const PRESCALER: usize = 0x50C;
const DECODER: usize = 0x510;
const LOOP: usize = 0x514;
const SEQ0_PTR: usize = 0x520;
const SEQ0_CNT: usize = 0x524;
const SEQ0_REFRESH: usize = 0x528;
const SEQ0_ENDDELAY: usize = 0x52C;
const PSEL_OUT: usize = 0x560;

const OUTPUTS: usize = 4;
const DISCONNECTED: u32 = 0xFFFF_FFFF;

const MODE_UP: u32 = 0;
const PRESCALER_DIV_1: u32 = 0; // 16 MHz
const DECODER_COMMON_REFRESH: u32 = 0;

/// Why `analogWrite` left the output alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmError {
    /// Pin is not on P0
    InvalidPin,
    /// Every module drives some other pin
    NoFreeModule,
}

static MODULES: Mutex<RefCell<PinSlots<(), PWM_MODULES>>> =
    Mutex::new(RefCell::new(PinSlots::new()));

static SEQUENCES: [AtomicU16; PWM_MODULES] =
    [AtomicU16::new(0), AtomicU16::new(0), AtomicU16::new(0)];

static WRITE_RESOLUTION: AtomicU32 = AtomicU32::new(DEFAULT_WRITE_RESOLUTION);

/// Arduino `analogWriteResolution`
pub fn analog_write_resolution(bits: u32) {
    WRITE_RESOLUTION.store(bits, Ordering::Relaxed);
}

/// Compare value for `value` under a counter top
///
/// Values above the top saturate; bit 15 (polarity) is never set.
pub const fn duty(value: u32, top: u16) -> u16 {
    if value > top as u32 {
        top
    } else {
        value as u16
    }
}

/// Arduino `analogWrite`; failures are dropped
pub fn analog_write(pin: u32, value: u32) {
    if let Err(err) = try_analog_write(pin, value) {
        trace!("analog_write: pin {=u32} dropped ({})", pin, err);
    }
}

/// `analogWrite` reporting the module used
pub fn try_analog_write(pin: u32, value: u32) -> Result<usize, PwmError> {
    if pin >= PIN_COUNT {
        return Err(PwmError::InvalidPin);
    }

    let module = interrupt::free(|cs| MODULES.borrow(cs).borrow_mut().claim(pin, ()))
        .ok_or(PwmError::NoFreeModule)?;

    let top = pwm_counter_top(WRITE_RESOLUTION.load(Ordering::Relaxed));
    SEQUENCES[module].store(duty(value, top), Ordering::Relaxed);

    start(module, pin, top);
    Ok(module)
}

fn start(module: usize, pin: u32, top: u16) {
    // SAFETY: PWM register blocks
    let reg = |offset| unsafe { Reg::at(PWM_BASES[module], offset) };

    reg(PSEL_OUT).write(pin);
    for output in 1..OUTPUTS {
        reg(PSEL_OUT + 4 * output).write(DISCONNECTED);
    }

    reg(ENABLE).write(1);
    reg(MODE).write(MODE_UP);
    reg(PRESCALER).write(PRESCALER_DIV_1);
    reg(COUNTERTOP).write(u32::from(top));
    reg(LOOP).write(0);
    reg(DECODER).write(DECODER_COMMON_REFRESH);
    reg(SEQ0_PTR).write(SEQUENCES[module].as_ptr() as u32);
    reg(SEQ0_CNT).write(1);
    reg(SEQ0_REFRESH).write(1);
    reg(SEQ0_ENDDELAY).write(0);

    compiler_fence(Ordering::SeqCst);
    trigger(reg(TASKS_SEQSTART0));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duty_saturates_at_top() {
        assert_eq!(duty(0, 255), 0);
        assert_eq!(duty(128, 255), 128);
        assert_eq!(duty(300, 255), 255);
        assert_eq!(duty(u32::MAX, 0x7FFF), 0x7FFF);
    }

    #[test]
    fn test_invalid_pin_claims_nothing() {
        assert_eq!(try_analog_write(40, 10), Err(PwmError::InvalidPin));
    }
}
