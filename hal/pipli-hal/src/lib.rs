//! Pipli Hardware Abstraction Layer
//!
//! This crate defines the collaborator traits the reminder core is written
//! against. Chip-specific HALs implement them for real hardware and the core's
//! tests implement them with in-memory fakes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pipli-core (Reminder, ScheduleStore)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pipli-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │  pipli-hal-   │
//!             │    rp2040     │
//!             └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`clock::Clock`] - Free-running millisecond counter
//! - [`flash::FlashStorage`] - Persistent key-value blobs
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Vibration motor and button
//! - [`link::Transport`] - Outbound side of the wireless link

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod flash;
pub mod gpio;
pub mod link;

// Re-export key traits at crate root for convenience
pub use clock::Clock;
pub use flash::{FlashError, FlashStorage, StorageKey};
pub use gpio::{InputPin, OutputPin};
pub use link::{LinkError, Transport};
