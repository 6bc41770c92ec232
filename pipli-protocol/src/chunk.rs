//! Outbound chunking
//!
//! A serialized report is usually larger than one BLE packet. It is cut into
//! fixed-stride pieces that the link sends in order; the receiver simply
//! concatenates them.

use core::slice::Chunks;

/// Default chunk size, matches the negotiated MTU of the companion app
pub const DEFAULT_CHUNK_SIZE: usize = 200;

/// Largest chunk a single notification can carry (ATT MTU 247 minus header)
pub const MAX_CHUNK_SIZE: usize = 244;

/// Iterator over the chunks of one outbound payload
#[derive(Debug, Clone)]
pub struct ReportChunks<'a> {
    inner: Chunks<'a, u8>,
    stride: usize,
}

impl<'a> ReportChunks<'a> {
    /// Split `payload` into chunks of at most `chunk_size` bytes
    ///
    /// `chunk_size` is clamped to `1..=MAX_CHUNK_SIZE`.
    pub fn new(payload: &'a [u8], chunk_size: usize) -> Self {
        let stride = chunk_size.clamp(1, MAX_CHUNK_SIZE);
        Self {
            inner: payload.chunks(stride),
            stride,
        }
    }

    /// Effective chunk size after clamping
    pub fn stride(&self) -> usize {
        self.stride
    }
}

impl<'a> Iterator for ReportChunks<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for ReportChunks<'_> {}
