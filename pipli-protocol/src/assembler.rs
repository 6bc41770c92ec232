//! Inbound payload assembly for the BLE-UART bridge.
//!
//! The bridge forwards whatever the app writes to the characteristic as a
//! raw byte stream, so payload boundaries have to be recovered here:
//! - a `\n` or NUL byte ends the current payload
//! - otherwise the caller ends it with [`PayloadAssembler::flush`] once the
//!   line has been idle for the configured gap
//!
//! Because `\n` is a boundary, schedules must be sent as compact
//! single-line JSON; a pretty-printed document arrives as fragments that
//! are each rejected.
//!
//! Payloads longer than [`MAX_PAYLOAD_SIZE`] are dropped whole; the bytes up
//! to the next boundary are discarded so the tail is never mistaken for a
//! fresh payload.

use alloc::vec::Vec;

/// Maximum inbound payload size in bytes
///
/// Holds a full-capacity schedule as the app sends it, `med_id` and
/// `ref_time` included (about 2.4 KiB).
pub const MAX_PAYLOAD_SIZE: usize = 4096;

/// Payload terminator bytes
const TERMINATORS: [u8; 2] = [b'\n', 0];

/// Errors that can occur during payload assembly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AssembleError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssembleState {
    /// Nothing buffered
    Empty,
    /// Collecting payload bytes
    Receiving,
    /// Oversized payload, dropping bytes until the next boundary
    Discarding,
}

/// Accumulates link bytes into complete payloads
#[derive(Debug, Clone)]
pub struct PayloadAssembler {
    state: AssembleState,
    buffer: heapless::Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Default for PayloadAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadAssembler {
    /// Create an empty assembler
    pub const fn new() -> Self {
        Self {
            state: AssembleState::Empty,
            buffer: heapless::Vec::new(),
        }
    }

    /// Drop any partial payload
    pub fn reset(&mut self) {
        self.state = AssembleState::Empty;
        self.buffer.clear();
    }

    /// Whether bytes are waiting for a boundary
    pub fn is_pending(&self) -> bool {
        self.state != AssembleState::Empty
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(payload))` when a terminator completes a non-empty
    /// payload, `Ok(None)` when more bytes are needed, or `Err` the moment a
    /// payload overflows.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Vec<u8>>, AssembleError> {
        if TERMINATORS.contains(&byte) {
            return Ok(self.take());
        }

        match self.state {
            AssembleState::Discarding => Ok(None),
            AssembleState::Empty | AssembleState::Receiving => {
                if self.buffer.push(byte).is_err() {
                    self.buffer.clear();
                    self.state = AssembleState::Discarding;
                    return Err(AssembleError::PayloadTooLarge);
                }
                self.state = AssembleState::Receiving;
                Ok(None)
            }
        }
    }

    /// Feed a slice of bytes, handing every completed payload to `on_payload`
    ///
    /// Overflow is reported after the whole slice has been consumed.
    pub fn feed_bytes(
        &mut self,
        bytes: &[u8],
        mut on_payload: impl FnMut(Vec<u8>),
    ) -> Result<(), AssembleError> {
        let mut result = Ok(());
        for &byte in bytes {
            match self.feed(byte) {
                Ok(Some(payload)) => on_payload(payload),
                Ok(None) => {}
                Err(e) => result = Err(e),
            }
        }
        result
    }

    /// End the current payload because the line went idle
    pub fn flush(&mut self) -> Option<Vec<u8>> {
        self.take()
    }

    fn take(&mut self) -> Option<Vec<u8>> {
        let payload = match self.state {
            AssembleState::Receiving if !self.buffer.is_empty() => Some(self.buffer.to_vec()),
            _ => None,
        };
        self.reset();
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newline_terminates_payload() {
        let mut asm = PayloadAssembler::new();
        let mut out = Vec::new();
        asm.feed_bytes(b"update\n", |p| out.push(p)).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0], b"update");
        assert!(!asm.is_pending());
    }

    #[test]
    fn test_two_payloads_in_one_read() {
        let mut asm = PayloadAssembler::new();
        let mut out = Vec::new();
        asm.feed_bytes(b"update\0[]\n", |p| out.push(p)).unwrap();

        assert_eq!(out, [b"update".to_vec(), b"[]".to_vec()]);
    }

    #[test]
    fn test_idle_flush() {
        let mut asm = PayloadAssembler::new();
        asm.feed_bytes(b"[{\"id\":\"A\",", |_| panic!("no terminator yet"))
            .unwrap();
        asm.feed_bytes(b"\"times\":[\"0\"]}]", |_| panic!("no terminator yet"))
            .unwrap();
        assert!(asm.is_pending());

        let payload = asm.flush().unwrap();
        assert_eq!(payload, b"[{\"id\":\"A\",\"times\":[\"0\"]}]");
        assert!(asm.flush().is_none());
    }

    #[test]
    fn test_empty_lines_are_ignored() {
        let mut asm = PayloadAssembler::new();
        assert_eq!(asm.feed(b'\n'), Ok(None));
        assert_eq!(asm.feed(0), Ok(None));
        assert!(!asm.is_pending());
    }

    #[test]
    fn test_oversized_payload_is_dropped_until_boundary() {
        let mut asm = PayloadAssembler::new();
        let big = [b'x'; MAX_PAYLOAD_SIZE + 10];

        let mut out = Vec::new();
        let result = asm.feed_bytes(&big, |p| out.push(p));
        assert_eq!(result, Err(AssembleError::PayloadTooLarge));
        assert!(out.is_empty());

        // Tail of the oversized payload is swallowed by the terminator
        asm.feed_bytes(b"tail\nupdate\n", |p| out.push(p)).unwrap();
        assert_eq!(out, [b"update".to_vec()]);
    }

    #[test]
    fn test_flush_after_overflow_yields_nothing() {
        let mut asm = PayloadAssembler::new();
        let big = [b'x'; MAX_PAYLOAD_SIZE + 1];
        let _ = asm.feed_bytes(&big, |_| {});

        assert!(asm.flush().is_none());
        assert!(!asm.is_pending());
    }
}
