//! Wireless link abstraction
//!
//! Only the outbound half lives here. Inbound payloads arrive asynchronously
//! and are queued by the firmware as events for the controller.

/// Errors from the link transmitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// No peer is connected
    NotConnected,
    /// The chunk is larger than the link accepts in one packet
    ChunkTooLarge,
    /// The underlying write failed
    Write,
}

/// Outbound side of the wireless link
///
/// Implementations deliver chunks reliably and in order within one
/// connection; there is no acknowledgement or reassembly at this level.
pub trait Transport {
    /// Whether a peer is currently connected
    fn is_connected(&self) -> bool;

    /// Send one chunk, blocking until it has been handed to the radio
    fn send_chunk(&mut self, chunk: &[u8]) -> Result<(), LinkError>;
}
