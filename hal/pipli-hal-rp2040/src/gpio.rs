//! GPIO wrappers
//!
//! Newtypes over the embassy pin drivers so they can implement the
//! `pipli-hal` pin traits.

use embassy_rp::gpio::{Input, Level, Output, Pin, Pull};
use embassy_rp::Peri;

/// Push-pull output (vibration motor driver, status LED)
pub struct Rp2040Output<'d>(Output<'d>);

impl<'d> Rp2040Output<'d> {
    /// Configure `pin` as an output, initially low
    pub fn new(pin: Peri<'d, impl Pin>) -> Self {
        Self(Output::new(pin, Level::Low))
    }
}

impl pipli_hal::OutputPin for Rp2040Output<'_> {
    fn set_high(&mut self) {
        self.0.set_high();
    }

    fn set_low(&mut self) {
        self.0.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.0.is_set_high()
    }
}

/// Digital input (button, bridge STATE line)
pub struct Rp2040Input<'d>(Input<'d>);

impl<'d> Rp2040Input<'d> {
    /// Configure `pin` as an input with the given pull
    pub fn new(pin: Peri<'d, impl Pin>, pull: Pull) -> Self {
        Self(Input::new(pin, pull))
    }

    /// Wait for the next edge
    pub async fn wait_for_any_edge(&mut self) {
        self.0.wait_for_any_edge().await;
    }
}

impl pipli_hal::InputPin for Rp2040Input<'_> {
    fn is_high(&self) -> bool {
        self.0.is_high()
    }
}
