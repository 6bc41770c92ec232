//! Reminder state machine
//!
//! Defines the authoritative sequencing of a reminder cycle.
//! The state machine is explicit, finite, and deterministic; side effects
//! live in [`crate::reminder::Reminder`].

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::State;
