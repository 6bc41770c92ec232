//! Status LED task
//!
//! Lit while a phone is connected; every received payload blinks it.

use defmt::*;
use embassy_time::Timer;
use pipli_hal_rp2040::gpio::Rp2040Output;
use pipli_hal_rp2040::pipli_hal::OutputPin;

use crate::channels::{LedCommand, LED_CMD};

const BLINK_MS: u64 = 80;

#[embassy_executor::task]
pub async fn led_task(mut led: Rp2040Output<'static>) {
    info!("LED task started");

    let mut connected = false;

    loop {
        match LED_CMD.receive().await {
            LedCommand::Connected(up) => {
                connected = up;
                led.set_state(up);
            }
            LedCommand::Blink => {
                led.set_state(!connected);
                Timer::after_millis(BLINK_MS).await;
                led.set_state(connected);
            }
        }
    }
}
