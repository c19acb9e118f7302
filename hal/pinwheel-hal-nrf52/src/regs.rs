//! Volatile access to 32-bit peripheral registers

use core::ptr::{read_volatile, write_volatile};

/// One memory-mapped 32-bit register
#[derive(Clone, Copy)]
pub(crate) struct Reg {
    addr: *mut u32,
}

impl Reg {
    /// Register at `base + offset`
    ///
    /// # Safety
    /// `base + offset` must be a valid, aligned peripheral register address.
    pub(crate) const unsafe fn at(base: usize, offset: usize) -> Self {
        Self {
            addr: (base + offset) as *mut u32,
        }
    }

    pub(crate) fn read(self) -> u32 {
        // SAFETY: address validated at construction
        unsafe { read_volatile(self.addr) }
    }

    pub(crate) fn write(self, value: u32) {
        // SAFETY: address validated at construction
        unsafe { write_volatile(self.addr, value) }
    }

    pub(crate) fn modify(self, f: impl FnOnce(u32) -> u32) {
        self.write(f(self.read()));
    }
}

/// Fire a task register
pub(crate) fn trigger(task: Reg) {
    task.write(1);
}

/// Check an event register
pub(crate) fn is_set(event: Reg) -> bool {
    event.read() != 0
}

/// Spin until an event fires, then clear it
pub(crate) fn wait_and_clear(event: Reg) {
    while !is_set(event) {
        core::hint::spin_loop();
    }
    event.write(0);
}
