//! Process-wide edge interrupt dispatcher
//!
//! The GPIOTE vector is a fixed entry point, so the channel table is one
//! static instance reached only through the functions below. Firmware binds
//! the vector with the device crate's attribute:
//!
//! ```ignore
//! #[interrupt]
//! fn GPIOTE() {
//!     pinwheel_hal_nrf52::on_gpiote_interrupt();
//! }
//! ```
//!
//! The table sits behind a [`GpioteLineMutex`], so thread mode and the
//! GPIOTE handler never hold it at once. A call that finds the table already
//! borrowed (an attach from inside a callback) is dropped, as is a call from
//! any other interrupt handler.

use core::cell::RefCell;

use cortex_m::peripheral::scb::VectActive;
use cortex_m::peripheral::SCB;
use embassy_sync::blocking_mutex::Mutex;
use pinwheel_core::interrupts::{AttachError, Callback, Dispatcher, EdgeMode};

use crate::gpiote::{Gpiote, GPIOTE_CHANNELS};
use crate::nvic::{GpioteLineMutex, Irq, Nvic};

type GpioteDispatcher = Dispatcher<Gpiote, Nvic, GPIOTE_CHANNELS>;

static DISPATCHER: Mutex<GpioteLineMutex, RefCell<GpioteDispatcher>> =
    Mutex::new(RefCell::new(Dispatcher::new(
        Gpiote::new(),
        Nvic::new(),
        Irq::Gpiote,
    )));

/// Thread mode or the GPIOTE handler
fn in_dispatcher_context() -> bool {
    match SCB::vect_active() {
        VectActive::ThreadMode => true,
        VectActive::Interrupt { irqn } => u16::from(irqn) == Irq::Gpiote as u16,
        _ => false,
    }
}

fn with_dispatcher<R>(f: impl FnOnce(&mut GpioteDispatcher) -> R) -> Option<R> {
    if !in_dispatcher_context() {
        return None;
    }
    DISPATCHER.lock(|cell| cell.try_borrow_mut().ok().map(|mut d| f(&mut *d)))
}

/// Arduino `attachInterrupt`
///
/// `mode` is `RISING`, `FALLING` or `CHANGE`. Unknown modes and a full bank
/// are ignored.
pub fn attach_interrupt(pin: u32, callback: Callback, mode: u32) {
    let result = with_dispatcher(|d| d.attach_raw(pin, callback, mode))
        .unwrap_or(Err(AttachError::Busy));
    log_attach(pin, result);
}

/// Typed attach that reports why a binding was dropped
pub fn attach_edge(pin: u32, callback: Callback, mode: EdgeMode) -> Result<usize, AttachError> {
    let result =
        with_dispatcher(|d| d.attach(pin, callback, mode)).unwrap_or(Err(AttachError::Busy));
    log_attach(pin, result);
    result
}

fn log_attach(pin: u32, result: Result<usize, AttachError>) {
    match result {
        Ok(channel) => trace!("attach: pin {=u32} on channel {=usize}", pin, channel),
        Err(err) => trace!("attach: pin {=u32} dropped ({})", pin, err),
    }
}

/// Arduino `detachInterrupt`; unbound pins are ignored
pub fn detach_interrupt(pin: u32) {
    match with_dispatcher(|d| d.detach(pin)) {
        Some(Some(channel)) => trace!("detach: pin {=u32} freed channel {=usize}", pin, channel),
        Some(None) => {}
        None => trace!("detach: pin {=u32} dropped, dispatcher busy", pin),
    }
}

/// Channel currently serving `pin`
///
/// Always `None` from inside a callback.
pub fn interrupt_channel(pin: u32) -> Option<usize> {
    if !in_dispatcher_context() {
        return None;
    }
    DISPATCHER.lock(|cell| match cell.try_borrow() {
        Ok(d) => d.channel_for(pin),
        // Inside a callback the handler holds the table mutably
        Err(_) => None,
    })
}

/// Body of the GPIOTE interrupt vector
pub fn on_gpiote_interrupt() {
    if with_dispatcher(GpioteDispatcher::on_interrupt).is_none() {
        debug!("gpiote: dispatcher busy, events left pending");
    }
}
