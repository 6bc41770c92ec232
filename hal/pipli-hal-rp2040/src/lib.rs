//! RP2040-specific HAL for the Pipli reminder
//!
//! This crate provides RP2040 implementations of the shared `pipli-hal`
//! traits:
//!
//! - Flash storage driver (sequential-storage map in the last 64 KiB)
//! - GPIO wrappers for the vibration motor and button
//! - Embassy time driver as the monotonic clock
//! - BLE-UART bridge transmitter

#![no_std]

pub mod clock;
pub mod flash;
pub mod gpio;
pub mod link;

// Re-export shared traits from pipli-hal for convenience
pub use pipli_hal;
pub use pipli_hal::{FlashStorage as FlashStorageTrait, StorageKey};
