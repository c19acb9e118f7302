//! Analog resolution bookkeeping for `analogRead` / `analogWrite`
//!
//! The ADC only samples at 8, 10, 12 or 14 bits and the PWM counter top is
//! 15 bits wide, while sketches ask for whatever resolution they like. This
//! module picks the hardware setting and rescales values between the two.

use core::cmp::Ordering;

/// `analogRead` resolution until changed
pub const DEFAULT_READ_RESOLUTION: u32 = 10;

/// `analogWrite` resolution until changed
pub const DEFAULT_WRITE_RESOLUTION: u32 = 8;

/// Widest PWM counter top, in bits
pub const MAX_PWM_BITS: u32 = 15;

/// Rescale `value` from `from` bits to `to` bits
///
/// Narrowing drops low bits, widening shifts in zeros. Shifts of 32 or more
/// yield 0.
pub fn map_resolution(value: u32, from: u32, to: u32) -> u32 {
    match from.cmp(&to) {
        Ordering::Equal => value,
        Ordering::Greater => value.checked_shr(from - to).unwrap_or(0),
        Ordering::Less => value.checked_shl(to - from).unwrap_or(0),
    }
}

/// ADC sample width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AdcResolution {
    Bits8 = 0,
    Bits10 = 1,
    Bits12 = 2,
    Bits14 = 3,
}

impl AdcResolution {
    /// Smallest hardware width covering `bits`
    pub const fn for_requested(bits: u32) -> Self {
        if bits <= 8 {
            AdcResolution::Bits8
        } else if bits <= 10 {
            AdcResolution::Bits10
        } else if bits <= 12 {
            AdcResolution::Bits12
        } else {
            AdcResolution::Bits14
        }
    }

    /// Width in bits
    pub const fn bits(self) -> u32 {
        match self {
            AdcResolution::Bits8 => 8,
            AdcResolution::Bits10 => 10,
            AdcResolution::Bits12 => 12,
            AdcResolution::Bits14 => 14,
        }
    }

    /// `RESOLUTION` register value
    pub const fn register_value(self) -> u32 {
        self as u32
    }
}

/// ADC reference voltage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnalogReference {
    /// Internal 0.6 V reference (`AR_DEFAULT`, `AR_INTERNAL`)
    #[default]
    Internal,
    /// VDD / 4 (`AR_VDD4`)
    Vdd4,
}

/// Analog read/write settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AnalogConfig {
    /// Bits returned by `analogRead`
    pub read_resolution: u32,
    /// Bits expected by `analogWrite`
    pub write_resolution: u32,
    /// ADC reference
    pub reference: AnalogReference,
}

impl Default for AnalogConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl AnalogConfig {
    pub const DEFAULT: Self = Self {
        read_resolution: DEFAULT_READ_RESOLUTION,
        write_resolution: DEFAULT_WRITE_RESOLUTION,
        reference: AnalogReference::Internal,
    };

    /// Hardware width used for reads
    pub const fn adc_resolution(&self) -> AdcResolution {
        AdcResolution::for_requested(self.read_resolution)
    }

    /// Turn a raw signed sample into an `analogRead` result
    ///
    /// Single-ended samples can read slightly negative near ground; those
    /// clamp to 0.
    pub fn scale_sample(&self, raw: i16) -> u32 {
        let value = u32::try_from(raw).unwrap_or(0);
        map_resolution(value, self.adc_resolution().bits(), self.read_resolution)
    }

    /// PWM `COUNTERTOP` for the write resolution
    pub const fn pwm_counter_top(&self) -> u16 {
        pwm_counter_top(self.write_resolution)
    }
}

/// Counter top giving `bits` of duty resolution, clamped to 1..=15 bits
pub const fn pwm_counter_top(bits: u32) -> u16 {
    let bits = if bits == 0 {
        1
    } else if bits > MAX_PWM_BITS {
        MAX_PWM_BITS
    } else {
        bits
    };
    ((1u32 << bits) - 1) as u16
}
