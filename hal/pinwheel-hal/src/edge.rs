//! Edge-detect channel bank abstraction
//!
//! Microcontrollers with a task/event GPIO block (nRF GPIOTE and friends)
//! expose a small, fixed number of channels, each of which can watch one pin
//! for one kind of edge. This trait is the register-level contract the
//! interrupt dispatcher in `pinwheel-core` drives.
//!
//! Channel indices are `0..N` where N is the size of the bank; interrupt
//! enable masks use bit `n` for channel `n` (see [`channel_mask`]).

/// Edge polarity a channel watches for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Polarity {
    /// Low-to-high transition
    LoToHi = 1,
    /// High-to-low transition
    HiToLo = 2,
    /// Any transition
    Toggle = 3,
}

impl Polarity {
    /// Raw polarity field value
    pub const fn bits(self) -> u32 {
        self as u32
    }
}

/// Interrupt-enable mask bit for a channel
pub const fn channel_mask(channel: usize) -> u32 {
    1 << channel
}

/// Bank of hardware edge-detect channels
///
/// Implementations must be bounded-time and non-blocking: every method is
/// called either from base context with the owning interrupt line masked,
/// or from the interrupt handler itself.
pub trait EdgeChannelBank {
    /// Point `channel` at `pin` and select the edge polarity
    ///
    /// Does not start event generation; see [`enable_channel_event`](Self::enable_channel_event).
    fn configure_edge_detect(&mut self, channel: usize, pin: u32, polarity: Polarity);

    /// Start generating events on `channel`
    fn enable_channel_event(&mut self, channel: usize);

    /// Stop generating events on `channel`
    fn disable_channel_event(&mut self, channel: usize);

    /// Check whether `channel` has a latched edge event
    fn is_channel_event_pending(&self, channel: usize) -> bool;

    /// Clear the latched edge event on `channel`
    fn clear_channel_event(&mut self, channel: usize);

    /// Check whether `channel` raises the bank's interrupt
    fn is_channel_interrupt_enabled(&self, channel: usize) -> bool;

    /// Enable the interrupt for every channel whose bit is set in `mask`
    fn enable_channel_interrupt(&mut self, mask: u32);

    /// Disable the interrupt for every channel whose bit is set in `mask`
    fn disable_channel_interrupt(&mut self, mask: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_mask() {
        assert_eq!(channel_mask(0), 0b0001);
        assert_eq!(channel_mask(3), 0b1000);
        assert_eq!(channel_mask(7), 0x80);
    }

    #[test]
    fn test_polarity_field_values() {
        assert_eq!(Polarity::LoToHi.bits(), 1);
        assert_eq!(Polarity::HiToLo.bits(), 2);
        assert_eq!(Polarity::Toggle.bits(), 3);
    }
}
