//! Monotonic clock abstraction

/// Free-running millisecond counter
///
/// The reading only ever increases within one power cycle and starts again
/// from zero after a reboot. Nothing in the firmware relates it to calendar
/// time.
pub trait Clock {
    /// Milliseconds since this power cycle started
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
