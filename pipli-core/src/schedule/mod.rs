//! Schedule document, store and due selection
//!
//! A schedule is a list of medications, each with dose offsets (seconds)
//! measured from the moment the schedule was accepted. The store owns the
//! single live document; the selector answers "which dose is next" by
//! rescanning it from scratch every time.

pub mod document;
pub mod selector;
pub mod store;

pub use document::{
    Medication, Millis, ScheduleDocument, SlotRef, TimeSlot, MAX_ID_LEN, MAX_MEDICATIONS,
    MAX_SLOTS,
};
pub use selector::{select, DueSlot};
pub use store::{
    parse_schedule, persist, restore, IndexError, ParseError, RestoreError, ScheduleStore,
    StorageError,
};
