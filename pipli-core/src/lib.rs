//! Board-agnostic core logic for the Pipli medication reminder
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Schedule document model, ingestion and persistence
//! - Earliest-due selection
//! - Counter journal and reboot reconciliation
//! - State machine and the owning reminder context
//! - Configuration types and the device.toml parser
//!
//! Hardware is reached only through the `pipli-hal` traits, so every piece
//! runs on the host under test with in-memory fakes.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod fmt;

mod checksum;
#[cfg(test)]
mod testing;

pub mod config;
pub mod journal;
pub mod reconcile;
pub mod reminder;
pub mod schedule;
pub mod state;

pub use reminder::{Devices, LinkEvent, Reminder, ReportError};
pub use schedule::{Millis, ScheduleDocument, ScheduleStore};
pub use state::{Event, State};
