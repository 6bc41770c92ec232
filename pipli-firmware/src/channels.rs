//! Inter-task communication channels
//!
//! Defines the statics shared between Embassy tasks.

use core::sync::atomic::AtomicBool;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use pipli_core::LinkEvent;

/// Channel capacity for link events
const LINK_EVENT_CHANNEL_SIZE: usize = 4;

/// Channel capacity for LED commands
const LED_CHANNEL_SIZE: usize = 4;

/// Connection, disconnection and payloads from the BLE bridge
///
/// Drained by the controller between ticks.
pub static LINK_EVENTS: Channel<CriticalSectionRawMutex, LinkEvent, LINK_EVENT_CHANNEL_SIZE> =
    Channel::new();

/// Mirror of the bridge STATE pin, read by the transmitter before each chunk
pub static LINK_UP: AtomicBool = AtomicBool::new(false);

/// Status LED commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum LedCommand {
    /// Steady on while a phone is connected
    Connected(bool),
    /// Short blink for a received payload
    Blink,
}

pub static LED_CMD: Channel<CriticalSectionRawMutex, LedCommand, LED_CHANNEL_SIZE> =
    Channel::new();

/// Tick from the tick task, carries milliseconds since boot
pub static TICK_SIGNAL: Signal<CriticalSectionRawMutex, u64> = Signal::new();
