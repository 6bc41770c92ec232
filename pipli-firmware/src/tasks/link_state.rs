//! Bridge connection monitor
//!
//! The BLE bridge drives its STATE pin high while a phone is connected.
//! Edges are turned into link events for the controller.

use core::sync::atomic::Ordering;

use defmt::*;
use pipli_core::LinkEvent;
use pipli_hal_rp2040::gpio::Rp2040Input;
use pipli_hal_rp2040::pipli_hal::InputPin;

use crate::channels::{LedCommand, LED_CMD, LINK_EVENTS, LINK_UP};

#[embassy_executor::task]
pub async fn link_state_task(mut state_pin: Rp2040Input<'static>) {
    info!("Link state task started");

    let mut connected = false;

    loop {
        let now_connected = state_pin.is_high();
        if now_connected != connected {
            connected = now_connected;
            LINK_UP.store(connected, Ordering::Relaxed);
            LED_CMD.send(LedCommand::Connected(connected)).await;

            let event = if connected {
                LinkEvent::Connected
            } else {
                LinkEvent::Disconnected
            };
            debug!("Link state: {}", connected);
            LINK_EVENTS.send(event).await;
        }

        state_pin.wait_for_any_edge().await;
    }
}
