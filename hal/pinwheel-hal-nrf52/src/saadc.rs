//! SAADC one-shot sampling behind `analogRead`
//!
//! Every read programs channel 0 from scratch, takes one single-ended
//! sample into a stack word by EasyDMA, and rescales it with
//! [`AnalogConfig::scale_sample`].

use core::ptr;
use core::sync::atomic::{compiler_fence, AtomicBool, AtomicU32, Ordering};

use pinwheel_core::analog::{AnalogConfig, AnalogReference, DEFAULT_READ_RESOLUTION};

use crate::regs::{trigger, wait_and_clear, Reg};

const SAADC: usize = 0x4000_7000;

const TASKS_START: usize = 0x000;
const TASKS_SAMPLE: usize = 0x004;
const TASKS_STOP: usize = 0x008;
const EVENTS_STARTED: usize = 0x100;
const EVENTS_END: usize = 0x104;
const EVENTS_STOPPED: usize = 0x114;
const ENABLE: usize = 0x500;
const CH0_PSELP: usize = 0x510;
const CH0_PSELN: usize = 0x514;
const CH0_CONFIG: usize = 0x518;
const RESOLUTION: usize = 0x5F0;
const RESULT_PTR: usize = 0x62C;
const RESULT_MAXCNT: usize = 0x630;

const PSEL_NC: u32 = 0;

// CH.CONFIG: gain 1, 3 us acquisition, single ended, no resistors
const GAIN1: u32 = 5 << 8;
const REFSEL_SHIFT: u32 = 12;

static READ_RESOLUTION: AtomicU32 = AtomicU32::new(DEFAULT_READ_RESOLUTION);
static VDD4_REFERENCE: AtomicBool = AtomicBool::new(false);

/// Analog input a pin is wired to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AnalogInput {
    Ain1 = 1,
    Ain2 = 2,
    Ain4 = 4,
    Ain5 = 5,
    Ain6 = 6,
    Ain7 = 7,
}

impl AnalogInput {
    /// Input behind a P0 pin, if the pin has one
    pub const fn for_pin(pin: u32) -> Option<Self> {
        match pin {
            3 => Some(AnalogInput::Ain1),
            4 => Some(AnalogInput::Ain2),
            28 => Some(AnalogInput::Ain4),
            29 => Some(AnalogInput::Ain5),
            30 => Some(AnalogInput::Ain6),
            31 => Some(AnalogInput::Ain7),
            _ => None,
        }
    }

    /// `PSELP` value; 0 is reserved for "not connected"
    pub const fn psel(self) -> u32 {
        self as u32 + 1
    }
}

/// `CH[n].CONFIG` word for a reference
pub const fn channel_config(reference: AnalogReference) -> u32 {
    let refsel = match reference {
        AnalogReference::Internal => 0,
        AnalogReference::Vdd4 => 1,
    };
    GAIN1 | (refsel << REFSEL_SHIFT)
}

/// Arduino `analogReadResolution`
pub fn analog_read_resolution(bits: u32) {
    READ_RESOLUTION.store(bits, Ordering::Relaxed);
}

/// Arduino `analogReference`
pub fn analog_reference(reference: AnalogReference) {
    VDD4_REFERENCE.store(reference == AnalogReference::Vdd4, Ordering::Relaxed);
}

fn current_config() -> AnalogConfig {
    let reference = if VDD4_REFERENCE.load(Ordering::Relaxed) {
        AnalogReference::Vdd4
    } else {
        AnalogReference::Internal
    };
    AnalogConfig {
        read_resolution: READ_RESOLUTION.load(Ordering::Relaxed),
        reference,
        ..AnalogConfig::DEFAULT
    }
}

fn reg(offset: usize) -> Reg {
    // SAFETY: SAADC register block
    unsafe { Reg::at(SAADC, offset) }
}

/// Arduino `analogRead`; pins without an analog input read 0
pub fn analog_read(pin: u32) -> u32 {
    let Some(input) = AnalogInput::for_pin(pin) else {
        return 0;
    };
    let config = current_config();
    let mut sample: i16 = 0;

    reg(RESOLUTION).write(config.adc_resolution().register_value());
    reg(ENABLE).write(1);
    reg(CH0_CONFIG).write(channel_config(config.reference));
    reg(CH0_PSELP).write(input.psel());
    reg(CH0_PSELN).write(PSEL_NC);
    reg(RESULT_PTR).write(ptr::addr_of_mut!(sample) as u32);
    reg(RESULT_MAXCNT).write(1);

    compiler_fence(Ordering::SeqCst);

    trigger(reg(TASKS_START));
    wait_and_clear(reg(EVENTS_STARTED));
    trigger(reg(TASKS_SAMPLE));
    wait_and_clear(reg(EVENTS_END));
    trigger(reg(TASKS_STOP));
    wait_and_clear(reg(EVENTS_STOPPED));

    compiler_fence(Ordering::SeqCst);

    reg(CH0_PSELP).write(PSEL_NC);
    reg(ENABLE).write(0);

    // SAFETY: EasyDMA finished writing before STOPPED
    let sample = unsafe { ptr::read_volatile(ptr::addr_of!(sample)) };
    config.scale_sample(sample)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analog_pin_map() {
        assert_eq!(AnalogInput::for_pin(3), Some(AnalogInput::Ain1));
        assert_eq!(AnalogInput::for_pin(4), Some(AnalogInput::Ain2));
        assert_eq!(AnalogInput::for_pin(28), Some(AnalogInput::Ain4));
        assert_eq!(AnalogInput::for_pin(31), Some(AnalogInput::Ain7));
        assert_eq!(AnalogInput::for_pin(2), None);
        assert_eq!(AnalogInput::for_pin(5), None);
    }

    #[test]
    fn test_psel_skips_not_connected() {
        assert_eq!(AnalogInput::Ain1.psel(), 2);
        assert_eq!(AnalogInput::Ain7.psel(), 8);
    }

    #[test]
    fn test_channel_config() {
        assert_eq!(channel_config(AnalogReference::Internal), 0x0500);
        assert_eq!(channel_config(AnalogReference::Vdd4), 0x1500);
    }

    #[test]
    fn test_unmapped_pin_reads_zero_without_hardware() {
        assert_eq!(analog_read(0), 0);
    }
}
