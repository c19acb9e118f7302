//! Pinwheel - nRF52 DK demo firmware
//!
//! Exercises the Arduino-style surface on the development kit:
//!
//! - Buttons 1-3 are bound with `attach_interrupt` and toggle LEDs 1-3
//! - Button 4 steps the PWM brightness of LED 4 through `analog_write`
//! - UART0 echoes whatever it receives and reports button counts
//! - AIN1 (P0.03) is sampled with `analog_read` once per report

#![no_std]
#![no_main]

use core::cell::RefCell;

use cortex_m_rt::entry;
use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use nrf52832_pac::interrupt;
use portable_atomic::{AtomicU32, Ordering};
use {defmt_rtt as _, panic_probe as _};

use pinwheel_core::interrupts::{CHANGE, FALLING};
use pinwheel_hal::gpio::{OutputPin, HIGH, INPUT_PULLUP, OUTPUT};
use pinwheel_hal::uart::{UartConfig, UartTx};
use pinwheel_hal_nrf52::interrupts::interrupt_channel;
use pinwheel_hal_nrf52::pwm::analog_write;
use pinwheel_hal_nrf52::saadc::analog_read;
use pinwheel_hal_nrf52::uart::Uart;
use pinwheel_hal_nrf52::{attach_interrupt, digital_write, pin_mode, Pin};

// nRF52 DK wiring; LEDs are active low
const BUTTONS: [u32; 4] = [13, 14, 15, 16];
const LEDS: [u32; 4] = [17, 18, 19, 20];
const UART_TX: u32 = 6;
const UART_RX: u32 = 8;
const SENSE_PIN: u32 = 3;

const BRIGHTNESS_STEPS: u32 = 8;
const REPORT_CYCLES: u32 = 64_000_000; // ~1 s at 64 MHz

static SERIAL: Mutex<CriticalSectionRawMutex, RefCell<Uart>> =
    Mutex::new(RefCell::new(Uart::new(UART_TX, UART_RX)));

static PRESSES: [AtomicU32; 4] = [
    AtomicU32::new(0),
    AtomicU32::new(0),
    AtomicU32::new(0),
    AtomicU32::new(0),
];

fn toggle_led(index: usize) {
    PRESSES[index].fetch_add(1, Ordering::Relaxed);
    if let Some(mut led) = Pin::new(LEDS[index]) {
        led.toggle();
    }
}

fn on_button1() {
    toggle_led(0);
}

fn on_button2() {
    toggle_led(1);
}

fn on_button3() {
    toggle_led(2);
}

fn on_button4() {
    PRESSES[3].fetch_add(1, Ordering::Relaxed);
}

fn brightness(presses: u32) -> u32 {
    // 8-bit default resolution, inverted for the active-low LED
    let level = (presses % BRIGHTNESS_STEPS) * (255 / (BRIGHTNESS_STEPS - 1));
    255 - level
}

#[entry]
fn main() -> ! {
    info!("Pinwheel demo starting...");

    for &led in &LEDS[..3] {
        pin_mode(led, OUTPUT);
        digital_write(led, HIGH);
    }
    for &button in &BUTTONS {
        pin_mode(button, INPUT_PULLUP);
    }

    attach_interrupt(BUTTONS[0], on_button1, FALLING);
    attach_interrupt(BUTTONS[1], on_button2, FALLING);
    attach_interrupt(BUTTONS[2], on_button3, CHANGE);
    attach_interrupt(BUTTONS[3], on_button4, FALLING);

    for &button in &BUTTONS {
        match interrupt_channel(button) {
            Some(channel) => info!("button pin {} on GPIOTE channel {}", button, channel),
            None => warn!("button pin {} not bound", button),
        }
    }

    SERIAL.lock(|serial| {
        let mut serial = serial.borrow_mut();
        serial.begin(UartConfig::new(115_200));
        let _ = serial.write_blocking(b"pinwheel ready\r\n");
    });

    let mut last_level = u32::MAX;
    let mut idle = 0u32;

    loop {
        let level = brightness(PRESSES[3].load(Ordering::Relaxed));
        if level != last_level {
            analog_write(LEDS[3], level);
            last_level = level;
        }

        SERIAL.lock(|serial| {
            let mut serial = serial.borrow_mut();
            while let Some(byte) = serial.read() {
                serial.write_byte(byte);
            }
            if let Some(err) = serial.take_error() {
                warn!("uart receive error: {}", Debug2Format(&err));
            }
        });

        idle += 1;
        if idle == REPORT_CYCLES / 1_000 {
            idle = 0;
            let sense = analog_read(SENSE_PIN);
            info!(
                "presses {} {} {} {}, AIN1 {}",
                PRESSES[0].load(Ordering::Relaxed),
                PRESSES[1].load(Ordering::Relaxed),
                PRESSES[2].load(Ordering::Relaxed),
                PRESSES[3].load(Ordering::Relaxed),
                sense
            );
        }

        cortex_m::asm::delay(1_000);
    }
}

#[interrupt]
fn GPIOTE() {
    pinwheel_hal_nrf52::on_gpiote_interrupt();
}

#[interrupt]
fn UARTE0_UART0() {
    SERIAL.lock(|serial| serial.borrow_mut().on_interrupt());
}
