//! Bridge UART receive task
//!
//! Assembles the byte stream from the BLE bridge into payloads and queues
//! them for the controller. A payload ends at a newline/NUL or when the
//! line stays quiet for the configured idle gap.

use alloc::vec::Vec;

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embassy_time::{with_timeout, Duration};
use embedded_io_async::Read;

use pipli_core::LinkEvent;
use pipli_protocol::PayloadAssembler;

use crate::channels::{LedCommand, LED_CMD, LINK_EVENTS};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

#[embassy_executor::task]
pub async fn link_rx_task(mut rx: BufferedUartRx, idle_gap_ms: u32) {
    info!("Link RX task started");

    let idle_gap = Duration::from_millis(u64::from(idle_gap_ms));
    let mut assembler = PayloadAssembler::new();
    let mut buf = [0u8; RX_BUF_SIZE];
    let mut complete: Vec<Vec<u8>> = Vec::new();

    loop {
        let read = if assembler.is_pending() {
            match with_timeout(idle_gap, rx.read(&mut buf)).await {
                Ok(read) => read,
                Err(_) => {
                    if let Some(payload) = assembler.flush() {
                        trace!("Line idle, payload complete");
                        deliver(payload).await;
                    }
                    continue;
                }
            }
        } else {
            rx.read(&mut buf).await
        };

        match read {
            Ok(0) => {}
            Ok(n) => {
                trace!("RX: {} bytes", n);
                if let Err(e) = assembler.feed_bytes(&buf[..n], |p| complete.push(p)) {
                    warn!("Payload dropped: {:?}", e);
                }
                for payload in complete.drain(..) {
                    deliver(payload).await;
                }
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}

/// Queue a payload for the controller
///
/// Waits while the controller is busy (e.g. pacing a report); the UART
/// buffer holds incoming bytes meanwhile.
async fn deliver(payload: Vec<u8>) {
    debug!("Payload: {} bytes", payload.len());
    let _ = LED_CMD.try_send(LedCommand::Blink);
    LINK_EVENTS.send(LinkEvent::Payload(payload)).await;
}
