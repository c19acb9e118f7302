//! Fixed-capacity pin-to-slot allocation
//!
//! Several nRF peripherals come as a small bank of identical units that
//! are handed out per pin: GPIOTE channels for `attachInterrupt`, PWM
//! modules for `analogWrite`. Both use the same policy: a pin that already
//! holds a unit keeps it, otherwise it takes the first free unit in index
//! order. A pin never holds two units.

/// A bound slot: the pin it serves and its per-slot payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Slot<T> {
    /// Logical pin the slot is bound to
    pub pin: u32,
    /// Payload stored with the binding
    pub value: T,
}

/// Fixed bank of `N` slots, each free or bound to exactly one pin
///
/// Slot index equals the hardware unit index; there is no indirection.
#[derive(Debug, Clone)]
pub struct PinSlots<T, const N: usize> {
    slots: [Option<Slot<T>>; N],
}

impl<T: Copy, const N: usize> Default for PinSlots<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, const N: usize> PinSlots<T, N> {
    /// Create a bank with every slot free
    pub const fn new() -> Self {
        Self { slots: [None; N] }
    }

    /// Number of slots in the bank
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Index of the slot bound to `pin`, if any
    pub fn find(&self, pin: u32) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, Some(s) if s.pin == pin))
    }

    /// Index the next [`claim`](Self::claim) of `pin` would use
    ///
    /// The slot already bound to `pin`, else the first free slot.
    pub fn candidate(&self, pin: u32) -> Option<usize> {
        self.find(pin)
            .or_else(|| self.slots.iter().position(Option::is_none))
    }

    /// Bind `pin` to the slot it already holds, else the first free slot
    ///
    /// Rebinding overwrites the payload in place. Returns `None` with the
    /// bank untouched when every slot serves another pin.
    pub fn claim(&mut self, pin: u32, value: T) -> Option<usize> {
        let index = self.candidate(pin)?;
        self.slots[index] = Some(Slot { pin, value });
        Some(index)
    }

    /// Free the slot bound to `pin`
    ///
    /// Returns the freed index and its payload, or `None` if `pin` held no
    /// slot. At most one slot is freed.
    pub fn release(&mut self, pin: u32) -> Option<(usize, T)> {
        let index = self.find(pin)?;
        let slot = self.slots[index].take()?;
        Some((index, slot.value))
    }

    /// The slot at `index`, or `None` when free or out of range
    pub fn get(&self, index: usize) -> Option<&Slot<T>> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Pin bound at `index`
    pub fn pin_at(&self, index: usize) -> Option<u32> {
        self.get(index).map(|slot| slot.pin)
    }

    /// Check whether the slot at `index` is free
    pub fn is_free(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(None))
    }

    /// Number of free slots
    pub fn free_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }

    /// Free every slot
    pub fn clear(&mut self) {
        self.slots = [None; N];
    }

    /// Iterate over `(index, slot)` for the bound slots, in index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Slot<T>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|s| (index, s)))
    }
}
