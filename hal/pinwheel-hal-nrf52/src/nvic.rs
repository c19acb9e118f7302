//! NVIC line control for nRF52 peripherals
//!
//! Also home to [`GpioteLineMutex`], the lock that guards state shared with
//! the GPIOTE handler by masking only that line.

use core::cell::Cell;
use core::sync::atomic::{compiler_fence, Ordering};

use cortex_m::interrupt::{self, InterruptNumber, Mutex};
use cortex_m::peripheral::NVIC;
use embassy_sync::blocking_mutex::raw::RawMutex;
use pinwheel_hal::interrupt::InterruptController;

/// Priority bits implemented by the nRF52 NVIC
pub const NVIC_PRIO_BITS: u8 = 3;

/// Peripheral interrupt lines used by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Irq {
    Uart0 = 2,
    Gpiote = 6,
}

// SAFETY: discriminants are nRF52832 device interrupt numbers
unsafe impl InterruptNumber for Irq {
    fn number(self) -> u16 {
        self as u16
    }
}

/// Logical priority (0 most urgent) to the NVIC's 8-bit field
///
/// Levels beyond the implemented bits saturate at the least urgent level.
pub const fn hw_priority(level: u8) -> u8 {
    let max = (1 << NVIC_PRIO_BITS) - 1;
    let level = if level > max { max } else { level };
    level << (8 - NVIC_PRIO_BITS)
}

/// Mask bookkeeping for a line held by nested lock sections
///
/// While held, unmask requests are deferred to the outermost release so the
/// line cannot fire inside the section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineGate {
    depth: u8,
    unmask_on_release: bool,
}

impl LineGate {
    pub const fn new() -> Self {
        Self {
            depth: 0,
            unmask_on_release: false,
        }
    }

    /// Enter a section; `enabled` is the line state just before masking
    pub fn enter(&mut self, enabled: bool) {
        if self.depth == 0 {
            self.unmask_on_release = enabled;
        }
        self.depth = self.depth.saturating_add(1);
    }

    pub fn is_held(&self) -> bool {
        self.depth > 0
    }

    /// Record a mask request
    pub fn request_mask(&mut self) {
        self.unmask_on_release = false;
    }

    /// Record an unmask request; returns whether to unmask right now
    pub fn request_unmask(&mut self) -> bool {
        if self.is_held() {
            self.unmask_on_release = true;
            false
        } else {
            true
        }
    }

    /// Leave a section; returns whether to unmask right now
    pub fn exit(&mut self) -> bool {
        self.depth = self.depth.saturating_sub(1);
        !self.is_held() && self.unmask_on_release
    }
}

static GPIOTE_GATE: Mutex<Cell<LineGate>> = Mutex::new(Cell::new(LineGate::new()));

fn with_gpiote_gate<R>(f: impl FnOnce(&mut LineGate) -> R) -> R {
    interrupt::free(|cs| {
        let cell = GPIOTE_GATE.borrow(cs);
        let mut gate = cell.get();
        let result = f(&mut gate);
        cell.set(gate);
        result
    })
}

/// Blocking raw mutex that masks only the GPIOTE line
///
/// Sections nest. Unmasks requested through [`Nvic`] inside a section take
/// effect when the outermost section ends. Callers must run in thread mode
/// or in the GPIOTE handler; other interrupts are not excluded.
pub struct GpioteLineMutex {
    _private: (),
}

// SAFETY: the two permitted contexts are thread mode and the GPIOTE handler.
// Thread mode holds the lock with GPIOTE masked, so the handler cannot run;
// the handler is never preempted by thread mode.
unsafe impl RawMutex for GpioteLineMutex {
    const INIT: Self = Self { _private: () };

    fn lock<R>(&self, f: impl FnOnce() -> R) -> R {
        let enabled = NVIC::is_enabled(Irq::Gpiote);
        NVIC::mask(Irq::Gpiote);
        with_gpiote_gate(|gate| gate.enter(enabled));
        compiler_fence(Ordering::SeqCst);

        let result = f();

        compiler_fence(Ordering::SeqCst);
        if with_gpiote_gate(LineGate::exit) {
            // SAFETY: the line was enabled before the section or enabled from
            // inside it, with its state fully written
            unsafe { NVIC::unmask(Irq::Gpiote) }
        }
        result
    }
}

/// The core's NVIC, driven through the associated functions of
/// [`cortex_m::peripheral::NVIC`]
#[derive(Debug, Default)]
pub struct Nvic {
    _private: (),
}

impl Nvic {
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl InterruptController for Nvic {
    type Line = Irq;

    fn disable_line(&mut self, line: Irq) {
        NVIC::mask(line);
        if line == Irq::Gpiote {
            with_gpiote_gate(LineGate::request_mask);
        }
    }

    fn clear_pending(&mut self, line: Irq) {
        NVIC::unpend(line);
    }

    fn set_priority(&mut self, line: Irq, level: u8) {
        // SAFETY: only the priority register of `line` is written, and only
        // while the line is masked during setup
        unsafe {
            let mut peripherals = cortex_m::Peripherals::steal();
            peripherals.NVIC.set_priority(line, hw_priority(level));
        }
    }

    fn enable_line(&mut self, line: Irq) {
        if line == Irq::Gpiote && !with_gpiote_gate(LineGate::request_unmask) {
            return;
        }
        // SAFETY: every line this crate unmasks has its handler and state set
        // up before the call
        unsafe { NVIC::unmask(line) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hw_priority() {
        assert_eq!(hw_priority(0), 0x00);
        assert_eq!(hw_priority(1), 0x20);
        assert_eq!(hw_priority(3), 0x60);
        assert_eq!(hw_priority(7), 0xE0);
        assert_eq!(hw_priority(15), 0xE0);
    }

    #[test]
    fn test_gate_defers_unmask_until_outermost_exit() {
        let mut gate = LineGate::new();
        gate.enter(false);
        gate.enter(false);

        assert!(!gate.request_unmask());
        assert!(!gate.exit());
        assert!(gate.exit());
        assert!(!gate.is_held());
    }

    #[test]
    fn test_gate_restores_prior_state() {
        let mut gate = LineGate::new();
        gate.enter(true);
        assert!(gate.exit());

        gate.enter(false);
        assert!(!gate.exit());
    }

    #[test]
    fn test_gate_mask_inside_section_wins() {
        let mut gate = LineGate::new();
        gate.enter(true);
        gate.request_mask();
        assert!(!gate.exit());
    }

    #[test]
    fn test_gate_open_applies_unmask_immediately() {
        let mut gate = LineGate::new();
        assert!(gate.request_unmask());
    }

    #[test]
    fn test_irq_numbers() {
        assert_eq!(Irq::Gpiote.number(), 6);
        assert_eq!(Irq::Uart0.number(), 2);
    }
}
