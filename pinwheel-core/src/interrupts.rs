//! Channel-multiplexed edge interrupt dispatcher
//!
//! Backs `attachInterrupt`/`detachInterrupt`. The chip has a small bank of
//! edge-detect channels (8 GPIOTE channels on nRF52) but any pin may ask for
//! an interrupt, so channels are handed out on demand:
//!
//! ```text
//! attach(pin, cb, mode) ──► channel table ──► bank: configure / enable
//!                               ▲
//! edge on pin ──► line IRQ ──► on_interrupt: scan 0..N, call cb, clear event
//! ```
//!
//! # Concurrency
//!
//! There are two contexts: base (application) code, which calls
//! [`Dispatcher::attach`] and [`Dispatcher::detach`], and the dispatcher's
//! interrupt line, which calls [`Dispatcher::on_interrupt`]. Attach and detach
//! mask that one line for the whole table update, including the channel
//! register writes, so the handler sees every slot either fully old or fully
//! new. Edges that arrive meanwhile stay pending and are serviced on unmask.
//!
//! Callbacks run inside the handler at the line's priority. They must not
//! call `attach`/`detach` or wait on anything this line has to deliver.
//!
//! # Errors
//!
//! An unknown mode code or a full bank leaves everything untouched. The
//! Arduino-facing wrapper drops the [`AttachError`]; it is reported here so
//! callers that care can tell "bound" from "dropped".

use core::sync::atomic::{compiler_fence, Ordering};

use heapless::Vec;
use pinwheel_hal::edge::{channel_mask, EdgeChannelBank, Polarity};
use pinwheel_hal::interrupt::InterruptController;

use crate::slots::PinSlots;

/// Arduino `CHANGE` mode code
pub const CHANGE: u32 = 2;
/// Arduino `FALLING` mode code
pub const FALLING: u32 = 3;
/// Arduino `RISING` mode code
pub const RISING: u32 = 4;

/// Priority the dispatcher's line is configured at unless overridden
pub const DEFAULT_PRIORITY: u8 = 1;

/// Zero-argument interrupt callback
pub type Callback = fn();

/// Which edges trigger a callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeMode {
    /// Low-to-high
    Rising,
    /// High-to-low
    Falling,
    /// Either edge
    Change,
}

impl EdgeMode {
    /// Translate an Arduino mode code (`RISING`, `FALLING`, `CHANGE`)
    pub const fn from_arduino(code: u32) -> Option<Self> {
        match code {
            RISING => Some(EdgeMode::Rising),
            FALLING => Some(EdgeMode::Falling),
            CHANGE => Some(EdgeMode::Change),
            _ => None,
        }
    }

    /// Arduino code for this mode
    pub const fn as_arduino(self) -> u32 {
        match self {
            EdgeMode::Rising => RISING,
            EdgeMode::Falling => FALLING,
            EdgeMode::Change => CHANGE,
        }
    }

    /// Hardware polarity for this mode
    pub const fn polarity(self) -> Polarity {
        match self {
            EdgeMode::Rising => Polarity::LoToHi,
            EdgeMode::Falling => Polarity::HiToLo,
            EdgeMode::Change => Polarity::Toggle,
        }
    }
}

impl From<EdgeMode> for Polarity {
    fn from(mode: EdgeMode) -> Self {
        mode.polarity()
    }
}

/// Why an attach left the table untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttachError {
    /// Mode code is not `RISING`, `FALLING` or `CHANGE`
    InvalidMode,
    /// Every channel is bound to some other pin
    NoFreeChannel,
    /// The table is already in use further up the stack, e.g. an attach
    /// from inside a callback; only shared handles report this
    Busy,
}

/// What a bound channel does when its edge fires
#[derive(Debug, Clone, Copy)]
pub struct Binding {
    /// Called from interrupt context
    pub callback: Callback,
    /// Edge the channel was programmed for
    pub mode: EdgeMode,
}

/// Edge interrupt dispatcher over a bank of `N` channels
///
/// `B` is the channel bank, `C` the interrupt controller owning the bank's
/// line. Channel index `i` in the table is hardware channel `i`.
pub struct Dispatcher<B, C: InterruptController, const N: usize> {
    bank: B,
    controller: C,
    line: C::Line,
    priority: u8,
    channels: PinSlots<Binding, N>,
    initialized: bool,
}

impl<B: EdgeChannelBank, C: InterruptController, const N: usize> Dispatcher<B, C, N> {
    /// Create a dispatcher for `line` at [`DEFAULT_PRIORITY`]
    ///
    /// Touches no hardware; the line is set up by the first attach.
    pub const fn new(bank: B, controller: C, line: C::Line) -> Self {
        Self::with_priority(bank, controller, line, DEFAULT_PRIORITY)
    }

    /// Create a dispatcher for `line` at an explicit priority
    pub const fn with_priority(bank: B, controller: C, line: C::Line, priority: u8) -> Self {
        Self {
            bank,
            controller,
            line,
            priority,
            channels: PinSlots::new(),
            initialized: false,
        }
    }

    /// Check whether the line has been set up
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// One-time setup of the table and the interrupt line
    ///
    /// Runs implicitly on the first attach; later calls do nothing.
    pub fn initialize(&mut self) {
        if self.initialized {
            return;
        }

        self.controller.disable_line(self.line);
        self.controller.clear_pending(self.line);
        self.channels.clear();
        self.controller.set_priority(self.line, self.priority);
        self.controller.enable_line(self.line);

        self.initialized = true;
    }

    /// Bind `callback` to edges on `pin`
    ///
    /// A pin that is already bound keeps its channel and gets the new
    /// callback and mode. Otherwise the first free channel is taken.
    /// Returns the channel index.
    pub fn attach(
        &mut self,
        pin: u32,
        callback: Callback,
        mode: EdgeMode,
    ) -> Result<usize, AttachError> {
        self.initialize();

        self.controller.disable_line(self.line);
        compiler_fence(Ordering::SeqCst);
        let result = self.bind(pin, Binding { callback, mode });
        compiler_fence(Ordering::SeqCst);
        self.controller.enable_line(self.line);

        result
    }

    /// [`attach`](Self::attach) with an Arduino mode code
    ///
    /// The line is still initialized when the code is unknown; only the
    /// table and channels are left alone.
    pub fn attach_raw(
        &mut self,
        pin: u32,
        callback: Callback,
        mode: u32,
    ) -> Result<usize, AttachError> {
        self.initialize();

        let mode = EdgeMode::from_arduino(mode).ok_or(AttachError::InvalidMode)?;
        self.attach(pin, callback, mode)
    }

    /// Caller must have the line masked
    fn bind(&mut self, pin: u32, binding: Binding) -> Result<usize, AttachError> {
        let rebinding = self.channels.find(pin).is_some();
        let channel = self
            .channels
            .claim(pin, binding)
            .ok_or(AttachError::NoFreeChannel)?;

        if !rebinding {
            // Left over from an edge that raced an earlier detach
            self.bank.clear_channel_event(channel);
        }

        self.bank
            .configure_edge_detect(channel, pin, binding.mode.polarity());
        self.bank.enable_channel_event(channel);
        self.bank.enable_channel_interrupt(channel_mask(channel));

        Ok(channel)
    }

    /// Stop delivering edges on `pin`
    ///
    /// Returns the freed channel, or `None` if `pin` was not bound.
    pub fn detach(&mut self, pin: u32) -> Option<usize> {
        if !self.initialized {
            return None;
        }

        self.controller.disable_line(self.line);
        compiler_fence(Ordering::SeqCst);
        let released = self.channels.release(pin).map(|(channel, _)| {
            self.bank.disable_channel_event(channel);
            self.bank.disable_channel_interrupt(channel_mask(channel));
            channel
        });
        compiler_fence(Ordering::SeqCst);
        self.controller.enable_line(self.line);

        released
    }

    /// Service every pending channel, in index order
    ///
    /// Call from the line's interrupt handler. Bound channels get their
    /// callback before the event is cleared. A free channel with a latched
    /// event (its pin was detached mid-edge) is only cleared.
    pub fn on_interrupt(&mut self) {
        for channel in 0..N {
            if !self.bank.is_channel_event_pending(channel) {
                continue;
            }

            let binding = self.channels.get(channel).map(|slot| slot.value);

            if self.bank.is_channel_interrupt_enabled(channel) {
                if let Some(binding) = binding {
                    (binding.callback)();
                }
                self.bank.clear_channel_event(channel);
            } else if binding.is_none() {
                // Detach turned INTEN off; drop the edge it raced
                self.bank.clear_channel_event(channel);
            }
        }
    }

    /// Number of channels in the bank
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of unbound channels
    pub fn free_channels(&self) -> usize {
        self.channels.free_count()
    }

    /// Channel bound to `pin`
    pub fn channel_for(&self, pin: u32) -> Option<usize> {
        self.channels.find(pin)
    }

    /// Pin bound to `channel`
    pub fn pin_at(&self, channel: usize) -> Option<u32> {
        self.channels.pin_at(channel)
    }

    /// Binding on `channel`
    pub fn binding_at(&self, channel: usize) -> Option<Binding> {
        self.channels.get(channel).map(|slot| slot.value)
    }

    /// Snapshot of `(channel, pin)` for every bound channel
    pub fn bindings(&self) -> Vec<(usize, u32), N> {
        self.channels
            .iter()
            .map(|(channel, slot)| (channel, slot.pin))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        Configure(usize, u32, Polarity),
        EnableEvent(usize),
        DisableEvent(usize),
        ClearEvent(usize),
        EnableInt(u32),
        DisableInt(u32),
        MaskLine,
        ClearPending,
        Priority(u8),
        UnmaskLine,
    }

    type Log = Rc<RefCell<std::vec::Vec<Op>>>;

    struct MockBank {
        log: Log,
        pending: [bool; 4],
        config: [Option<(u32, Polarity)>; 4],
        events: [bool; 4],
        intenset: u32,
    }

    impl EdgeChannelBank for MockBank {
        fn configure_edge_detect(&mut self, channel: usize, pin: u32, polarity: Polarity) {
            self.config[channel] = Some((pin, polarity));
            self.log.borrow_mut().push(Op::Configure(channel, pin, polarity));
        }

        fn enable_channel_event(&mut self, channel: usize) {
            self.events[channel] = true;
            self.log.borrow_mut().push(Op::EnableEvent(channel));
        }

        fn disable_channel_event(&mut self, channel: usize) {
            self.events[channel] = false;
            self.log.borrow_mut().push(Op::DisableEvent(channel));
        }

        fn is_channel_event_pending(&self, channel: usize) -> bool {
            self.pending[channel]
        }

        fn clear_channel_event(&mut self, channel: usize) {
            self.pending[channel] = false;
            self.log.borrow_mut().push(Op::ClearEvent(channel));
        }

        fn is_channel_interrupt_enabled(&self, channel: usize) -> bool {
            self.intenset & channel_mask(channel) != 0
        }

        fn enable_channel_interrupt(&mut self, mask: u32) {
            self.intenset |= mask;
            self.log.borrow_mut().push(Op::EnableInt(mask));
        }

        fn disable_channel_interrupt(&mut self, mask: u32) {
            self.intenset &= !mask;
            self.log.borrow_mut().push(Op::DisableInt(mask));
        }
    }

    struct MockNvic {
        log: Log,
        enabled: bool,
    }

    impl InterruptController for MockNvic {
        type Line = u16;

        fn disable_line(&mut self, line: u16) {
            assert_eq!(line, LINE);
            self.enabled = false;
            self.log.borrow_mut().push(Op::MaskLine);
        }

        fn clear_pending(&mut self, _line: u16) {
            self.log.borrow_mut().push(Op::ClearPending);
        }

        fn set_priority(&mut self, _line: u16, level: u8) {
            self.log.borrow_mut().push(Op::Priority(level));
        }

        fn enable_line(&mut self, line: u16) {
            assert_eq!(line, LINE);
            self.enabled = true;
            self.log.borrow_mut().push(Op::UnmaskLine);
        }
    }

    const LINE: u16 = 6;

    type TestDispatcher = Dispatcher<MockBank, MockNvic, 4>;

    fn dispatcher() -> (TestDispatcher, Log) {
        let log: Log = Rc::new(RefCell::new(std::vec::Vec::new()));
        let bank = MockBank {
            log: log.clone(),
            pending: [false; 4],
            config: [None; 4],
            events: [false; 4],
            intenset: 0,
        };
        let nvic = MockNvic {
            log: log.clone(),
            enabled: false,
        };
        (Dispatcher::new(bank, nvic, LINE), log)
    }

    macro_rules! counting_callback {
        ($name:ident, $counter:ident) => {
            static $counter: AtomicU32 = AtomicU32::new(0);
            fn $name() {
                $counter.fetch_add(1, Ordering::SeqCst);
            }
        };
    }

    fn fire(d: &mut TestDispatcher, channel: usize) {
        d.bank.pending[channel] = true;
        d.on_interrupt();
    }

    fn nop() {}

    #[test]
    fn test_first_attach_initializes_line() {
        let (mut d, log) = dispatcher();
        assert!(!d.is_initialized());

        d.attach(5, nop, EdgeMode::Rising).unwrap();

        assert!(d.is_initialized());
        assert!(d.controller.enabled);
        assert_eq!(
            &log.borrow()[..4],
            &[Op::MaskLine, Op::ClearPending, Op::Priority(1), Op::UnmaskLine]
        );
    }

    #[test]
    fn test_initialization_runs_once() {
        let (mut d, log) = dispatcher();
        d.attach(5, nop, EdgeMode::Rising).unwrap();
        d.attach(6, nop, EdgeMode::Rising).unwrap();
        d.initialize();

        let inits = log
            .borrow()
            .iter()
            .filter(|op| matches!(op, Op::Priority(_)))
            .count();
        assert_eq!(inits, 1);
    }

    #[test]
    fn test_custom_priority() {
        let (d, log) = dispatcher();
        let mut d: TestDispatcher = Dispatcher::with_priority(d.bank, d.controller, LINE, 3);
        d.attach(5, nop, EdgeMode::Rising).unwrap();
        assert!(log.borrow().contains(&Op::Priority(3)));
    }

    #[test]
    fn test_channel_update_happens_with_line_masked() {
        let (mut d, log) = dispatcher();
        d.initialize();
        log.borrow_mut().clear();

        assert_eq!(d.attach(5, nop, EdgeMode::Falling), Ok(0));

        assert_eq!(
            *log.borrow(),
            [
                Op::MaskLine,
                Op::ClearEvent(0),
                Op::Configure(0, 5, Polarity::HiToLo),
                Op::EnableEvent(0),
                Op::EnableInt(0b1),
                Op::UnmaskLine,
            ]
        );

        log.borrow_mut().clear();
        assert_eq!(d.detach(5), Some(0));
        assert_eq!(
            *log.borrow(),
            [
                Op::MaskLine,
                Op::DisableEvent(0),
                Op::DisableInt(0b1),
                Op::UnmaskLine,
            ]
        );
    }

    #[test]
    fn test_distinct_pins_get_distinct_channels() {
        let (mut d, _) = dispatcher();
        for (i, pin) in [11, 3, 27, 8].into_iter().enumerate() {
            assert_eq!(d.attach(pin, nop, EdgeMode::Change), Ok(i));
        }
        assert_eq!(d.free_channels(), 0);
        assert_eq!(d.channel_for(27), Some(2));
    }

    #[test]
    fn test_four_channel_scenario() {
        counting_callback!(cb_a, A_HITS);
        counting_callback!(cb_b, B_HITS);
        counting_callback!(cb_c, C_HITS);

        let (mut d, _) = dispatcher();
        assert_eq!(d.attach_raw(5, cb_a, RISING), Ok(0));
        assert_eq!(d.attach_raw(6, cb_b, FALLING), Ok(1));
        assert_eq!(d.detach(5), Some(0));
        assert_eq!(d.attach_raw(7, cb_c, CHANGE), Ok(0));

        assert_eq!(d.pin_at(0), Some(7));
        assert_eq!(d.pin_at(1), Some(6));
        assert_eq!(d.pin_at(2), None);
        assert_eq!(d.pin_at(3), None);
        assert_eq!(d.binding_at(0).map(|b| b.mode), Some(EdgeMode::Change));
        assert_eq!(d.binding_at(1).map(|b| b.mode), Some(EdgeMode::Falling));
        assert_eq!(d.bank.config[0], Some((7, Polarity::Toggle)));

        fire(&mut d, 0);
        fire(&mut d, 1);
        assert_eq!(A_HITS.load(Ordering::SeqCst), 0);
        assert_eq!(B_HITS.load(Ordering::SeqCst), 1);
        assert_eq!(C_HITS.load(Ordering::SeqCst), 1);

        let bound = d.bindings();
        assert_eq!(bound.as_slice(), &[(0, 7), (1, 6)]);
    }

    #[test]
    fn test_rebind_keeps_channel_and_replaces_callback() {
        counting_callback!(cb1, CB1_HITS);
        counting_callback!(cb2, CB2_HITS);

        let (mut d, _) = dispatcher();
        d.attach(9, nop, EdgeMode::Rising).unwrap();
        assert_eq!(d.attach(4, cb1, EdgeMode::Rising), Ok(1));
        assert_eq!(d.attach(4, cb2, EdgeMode::Falling), Ok(1));

        assert_eq!(d.free_channels(), 2);
        assert_eq!(d.bank.config[1], Some((4, Polarity::HiToLo)));

        fire(&mut d, 1);
        fire(&mut d, 1);
        assert_eq!(CB1_HITS.load(Ordering::SeqCst), 0);
        assert_eq!(CB2_HITS.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_exhaustion_leaves_table_unchanged() {
        counting_callback!(late, LATE_HITS);

        let (mut d, log) = dispatcher();
        for pin in 0..4 {
            d.attach(pin, nop, EdgeMode::Rising).unwrap();
        }
        let before = d.bindings();
        log.borrow_mut().clear();

        assert_eq!(
            d.attach(20, late, EdgeMode::Rising),
            Err(AttachError::NoFreeChannel)
        );

        assert_eq!(d.bindings(), before);
        assert_eq!(d.channel_for(20), None);
        // Only the mask/unmask bracket touched hardware
        assert_eq!(*log.borrow(), [Op::MaskLine, Op::UnmaskLine]);

        for channel in 0..4 {
            fire(&mut d, channel);
        }
        assert_eq!(LATE_HITS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_detach_twice_is_idempotent() {
        let (mut d, log) = dispatcher();
        d.attach(5, nop, EdgeMode::Rising).unwrap();

        assert_eq!(d.detach(5), Some(0));
        let after_first = log.borrow().len();
        let intenset = d.bank.intenset;

        assert_eq!(d.detach(5), None);
        assert_eq!(d.free_channels(), 4);
        assert_eq!(d.bank.intenset, intenset);
        // Second call only brackets the scan
        assert_eq!(&log.borrow()[after_first..], &[Op::MaskLine, Op::UnmaskLine]);
    }

    #[test]
    fn test_detach_before_any_attach_touches_nothing() {
        let (mut d, log) = dispatcher();
        assert_eq!(d.detach(0), None);
        assert!(log.borrow().is_empty());
        assert!(!d.is_initialized());
    }

    #[test]
    fn test_invalid_mode_is_noop() {
        counting_callback!(cb, INVALID_HITS);

        let (mut d, log) = dispatcher();
        assert_eq!(d.attach_raw(5, cb, 1), Err(AttachError::InvalidMode));

        assert!(d.is_initialized());
        assert_eq!(d.free_channels(), 4);
        assert!(!log
            .borrow()
            .iter()
            .any(|op| matches!(op, Op::Configure(..) | Op::EnableInt(_))));

        for channel in 0..4 {
            fire(&mut d, channel);
        }
        assert_eq!(INVALID_HITS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_dispatch_in_channel_order() {
        static SEQ: AtomicU32 = AtomicU32::new(1);
        static CH0_AT: AtomicU32 = AtomicU32::new(0);
        static CH2_AT: AtomicU32 = AtomicU32::new(0);
        fn cb0() {
            CH0_AT.store(SEQ.fetch_add(1, Ordering::SeqCst), Ordering::SeqCst);
        }
        fn cb2() {
            CH2_AT.store(SEQ.fetch_add(1, Ordering::SeqCst), Ordering::SeqCst);
        }

        let (mut d, _) = dispatcher();
        d.attach(30, cb0, EdgeMode::Rising).unwrap();
        d.attach(31, nop, EdgeMode::Rising).unwrap();
        d.attach(2, cb2, EdgeMode::Rising).unwrap();

        d.bank.pending[2] = true;
        d.bank.pending[0] = true;
        d.on_interrupt();

        let ch0 = CH0_AT.load(Ordering::SeqCst);
        let ch2 = CH2_AT.load(Ordering::SeqCst);
        assert!(ch0 != 0 && ch2 != 0);
        assert!(ch0 < ch2);
        assert_eq!(d.bank.pending, [false; 4]);
    }

    #[test]
    fn test_only_pending_channels_are_serviced() {
        counting_callback!(quiet, QUIET_HITS);
        counting_callback!(loud, LOUD_HITS);

        let (mut d, log) = dispatcher();
        d.attach(1, quiet, EdgeMode::Rising).unwrap();
        d.attach(2, loud, EdgeMode::Rising).unwrap();
        log.borrow_mut().clear();

        fire(&mut d, 1);

        assert_eq!(QUIET_HITS.load(Ordering::SeqCst), 0);
        assert_eq!(LOUD_HITS.load(Ordering::SeqCst), 1);
        assert_eq!(*log.borrow(), [Op::ClearEvent(1)]);
    }

    #[test]
    fn test_detached_pending_event_is_cleared_without_callback() {
        counting_callback!(cb, DANGLING_HITS);

        let (mut d, _) = dispatcher();
        d.attach(5, cb, EdgeMode::Rising).unwrap();

        d.bank.pending[0] = true;
        d.detach(5);
        d.on_interrupt();

        assert_eq!(DANGLING_HITS.load(Ordering::SeqCst), 0);
        assert!(!d.bank.pending[0]);
    }

    #[test]
    fn test_bound_channel_with_interrupt_off_is_left_pending() {
        counting_callback!(cb, MASKED_HITS);

        let (mut d, log) = dispatcher();
        let channel = d.attach(5, cb, EdgeMode::Rising).unwrap();
        d.bank.intenset &= !channel_mask(channel);
        log.borrow_mut().clear();

        fire(&mut d, channel);

        assert_eq!(MASKED_HITS.load(Ordering::SeqCst), 0);
        assert!(d.bank.pending[channel]);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_shared_table_refuses_attach_from_callback() {
        std::thread_local! {
            static SHARED: RefCell<Option<TestDispatcher>> = const { RefCell::new(None) };
        }
        static REFUSED: AtomicU32 = AtomicU32::new(0);
        fn reenter() {
            SHARED.with(|cell| match cell.try_borrow_mut() {
                Ok(_) => {}
                Err(_) => {
                    REFUSED.fetch_add(1, Ordering::SeqCst);
                }
            });
        }

        let (mut d, _) = dispatcher();
        d.attach(5, reenter, EdgeMode::Rising).unwrap();
        SHARED.with(|cell| *cell.borrow_mut() = Some(d));

        SHARED.with(|cell| {
            let mut guard = cell.borrow_mut();
            if let Some(d) = guard.as_mut() {
                fire(d, 0);
                assert!(!d.bank.pending[0]);
                assert_eq!(d.channel_for(5), Some(0));
            }
        });

        assert_eq!(REFUSED.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fresh_bind_drops_stale_event() {
        counting_callback!(cb, STALE_HITS);

        let (mut d, _) = dispatcher();
        d.attach(5, nop, EdgeMode::Rising).unwrap();
        d.detach(5);

        // Edge latched after detach, before anything serviced the bank
        d.bank.pending[0] = true;
        d.attach(8, cb, EdgeMode::Rising).unwrap();
        d.on_interrupt();

        assert_eq!(STALE_HITS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_reattach_after_detach_may_move() {
        let (mut d, _) = dispatcher();
        d.attach(5, nop, EdgeMode::Rising).unwrap();
        d.attach(6, nop, EdgeMode::Rising).unwrap();
        d.detach(5);
        d.detach(6);
        d.attach(7, nop, EdgeMode::Rising).unwrap();

        // Pin 6 is free to land on any unbound channel
        let channel = d.attach(6, nop, EdgeMode::Rising).unwrap();
        assert_ne!(Some(channel), d.channel_for(7));
        assert_eq!(d.channel_for(6), Some(1));
    }

    #[test]
    fn test_edge_mode_codes() {
        assert_eq!(EdgeMode::from_arduino(RISING), Some(EdgeMode::Rising));
        assert_eq!(EdgeMode::from_arduino(FALLING), Some(EdgeMode::Falling));
        assert_eq!(EdgeMode::from_arduino(CHANGE), Some(EdgeMode::Change));
        assert_eq!(EdgeMode::from_arduino(0), None);
        assert_eq!(Polarity::from(EdgeMode::Rising), Polarity::LoToHi);
        assert_eq!(EdgeMode::Change.as_arduino(), CHANGE);
    }
}
