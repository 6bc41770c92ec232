//! BLE-UART bridge transmitter
//!
//! The bridge module forwards UART bytes to the connected phone as
//! notifications and raises its STATE pin while a phone is connected. The
//! firmware mirrors that pin into an atomic flag; this side only reads it.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_io::Write;
use pipli_hal::{LinkError, Transport};
use pipli_protocol::MAX_CHUNK_SIZE;

/// Outbound half of the bridge
pub struct BleUartLink<W> {
    tx: W,
    connected: &'static AtomicBool,
}

impl<W: Write> BleUartLink<W> {
    pub fn new(tx: W, connected: &'static AtomicBool) -> Self {
        Self { tx, connected }
    }
}

impl<W: Write> Transport for BleUartLink<W> {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    fn send_chunk(&mut self, chunk: &[u8]) -> Result<(), LinkError> {
        if !self.is_connected() {
            return Err(LinkError::NotConnected);
        }
        if chunk.len() > MAX_CHUNK_SIZE {
            return Err(LinkError::ChunkTooLarge);
        }
        self.tx.write_all(chunk).map_err(|_| LinkError::Write)?;
        self.tx.flush().map_err(|_| LinkError::Write)
    }
}
